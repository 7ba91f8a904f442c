use crate::api::Backend;
use crate::controls::dispatch::{dispatch, report, Dispatched, RequestGate};
use crate::models::{ItemId, LikeOutcome};
use crate::state::AppState;
use crate::util::dom::{
    closest, item_id_of, on_click, query_all_in_document, query_one, set_class, set_text,
    ACTIVE_CLASS, LIKE_BUTTON, LIKE_COUNT, LIKE_ICON, ROW_LIKE_COUNT,
};
use crate::util::{log_error, log_warn};
use leptos::task::spawn_local;
use web_sys::{Element, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
pub(crate) enum HeartGlyph {
    #[strum(serialize = "♥")]
    Filled,
    #[strum(serialize = "♡")]
    Outline,
}

/// What a like control shows, derived only from the server's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LikeView {
    pub active: bool,
    pub glyph: HeartGlyph,
    pub count_text: String,
}

impl From<LikeOutcome> for LikeView {
    fn from(out: LikeOutcome) -> Self {
        Self {
            active: out.liked,
            glyph: if out.liked {
                HeartGlyph::Filled
            } else {
                HeartGlyph::Outline
            },
            count_text: out.count.to_string(),
        }
    }
}

/// Every element showing this button's like count.
///
/// Card layout keeps the count inside the button; table layout keeps it in the
/// row's likes cell. Both are collected when both exist.
pub(crate) fn like_count_targets(button: &Element) -> Vec<Element> {
    let mut targets: Vec<Element> = Vec::new();

    if let Some(own) = query_one(button, LIKE_COUNT) {
        targets.push(own);
    }

    if let Some(cell) = closest(button, "tr").and_then(|row| query_one(&row, ROW_LIKE_COUNT)) {
        if !targets.contains(&cell) {
            targets.push(cell);
        }
    }

    targets
}

/// Rewrite the bare glyph text in front of the count, leaving every element
/// child of the button in place.
fn set_leading_glyph(button: &Element, glyph: &str) {
    let children = button.child_nodes();
    let glyph_node = (0..children.length())
        .filter_map(|i| children.item(i))
        .find(|n| {
            n.node_type() == Node::TEXT_NODE
                && !n.text_content().unwrap_or_default().trim().is_empty()
        });

    match glyph_node {
        Some(node) => node.set_text_content(Some(&format!("{glyph} "))),
        None => {
            if let Err(e) = button.prepend_with_str_1(&format!("{glyph} ")) {
                log_error("like", format!("glyph insert failed: {e:?}"));
            }
        }
    }
}

pub(crate) fn apply_like_view(button: &Element, view: &LikeView) {
    // Locate everything before writing anything.
    let icon = query_one(button, LIKE_ICON);
    let own_count = query_one(button, LIKE_COUNT);
    let counts = like_count_targets(button);

    set_class(button, ACTIVE_CLASS, view.active);

    match (icon, own_count) {
        (Some(icon), _) => set_text(&icon, view.glyph.as_ref()),
        (None, None) => set_text(button, view.glyph.as_ref()),
        (None, Some(_)) => set_leading_glyph(button, view.glyph.as_ref()),
    }

    for target in &counts {
        set_text(target, &view.count_text);
    }
}

pub(crate) async fn toggle_like<B: Backend>(
    backend: &B,
    gate: &RequestGate,
    button: &Element,
    id: &ItemId,
) -> Dispatched {
    dispatch(gate, format!("like:{id}"), backend.toggle_like(id), |out| {
        apply_like_view(button, &LikeView::from(out))
    })
    .await
}

pub(crate) fn bind_like_buttons(state: &AppState) -> usize {
    let mut bound = 0;

    for button in query_all_in_document(LIKE_BUTTON) {
        let Some(id) = item_id_of(&button) else {
            log_warn("like", "like button without data-post-id");
            continue;
        };

        let state = state.clone();
        let el = button.clone();
        let res = on_click(&button, move |_ev| {
            let state = state.clone();
            let el = el.clone();
            let id = id.clone();
            spawn_local(async move {
                let outcome = toggle_like(&state.api, &state.gate, &el, &id).await;
                report("like", id.as_str(), &outcome);
            });
        });

        match res {
            Ok(()) => bound += 1,
            Err(e) => log_error("like", format!("bind failed: {e:?}")),
        }
    }

    bound
}
