use crate::api::Backend;
use crate::controls::dispatch::{dispatch, report, Dispatched, RequestGate};
use crate::models::{FavoriteOutcome, ItemId};
use crate::state::{AppState, PageContext};
use crate::util::dom::{
    as_html, closest, item_id_of, on_click, query_all_in_document, query_one, set_class,
    set_text, ACTIVE_CLASS, FAVORITE_BUTTON, FAVORITE_ICON, ITEM_CONTAINER, REMOVE_TRANSITION_MS,
};
use crate::util::{log_error, log_warn};
use leptos::task::spawn_local;
use leptos_dom::helpers::set_timeout;
use std::time::Duration;
use web_sys::Element;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
pub(crate) enum StarGlyph {
    #[strum(serialize = "★")]
    Filled,
    #[strum(serialize = "☆")]
    Outline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FavoriteView {
    pub active: bool,
    pub glyph: StarGlyph,
    /// Take the item's row/card out of view after the fade.
    pub remove_container: bool,
}

impl FavoriteView {
    pub fn new(out: FavoriteOutcome, page: &PageContext) -> Self {
        Self {
            active: out.favorited,
            glyph: if out.favorited {
                StarGlyph::Filled
            } else {
                StarGlyph::Outline
            },
            remove_container: page.removes_unfavorited() && !out.favorited,
        }
    }
}

/// Fade and shrink, then detach once the transition has run.
///
/// The timer cannot be cancelled; if something else removed the element
/// first, the late removal does nothing.
pub(crate) fn fade_out_and_remove(container: Element) {
    if let Some(el) = as_html(&container) {
        let style = el.style();
        let secs = REMOVE_TRANSITION_MS as f64 / 1000.0;
        let _ = style.set_property(
            "transition",
            &format!("opacity {secs}s ease, transform {secs}s ease"),
        );
        let _ = style.set_property("opacity", "0");
        let _ = style.set_property("transform", "scale(0.95)");
    }

    set_timeout(
        move || {
            if container.is_connected() {
                container.remove();
            }
        },
        Duration::from_millis(REMOVE_TRANSITION_MS),
    );
}

pub(crate) fn apply_favorite_view(button: &Element, view: &FavoriteView) {
    let container = if view.remove_container {
        closest(button, ITEM_CONTAINER)
    } else {
        None
    };

    set_class(button, ACTIVE_CLASS, view.active);
    match query_one(button, FAVORITE_ICON) {
        Some(icon) => set_text(&icon, view.glyph.as_ref()),
        None => set_text(button, view.glyph.as_ref()),
    }

    if let Some(container) = container {
        fade_out_and_remove(container);
    }
}

pub(crate) async fn toggle_favorite<B: Backend>(
    backend: &B,
    gate: &RequestGate,
    page: &PageContext,
    button: &Element,
    id: &ItemId,
) -> Dispatched {
    dispatch(
        gate,
        format!("favorite:{id}"),
        backend.toggle_favorite(id),
        |out| apply_favorite_view(button, &FavoriteView::new(out, page)),
    )
    .await
}

pub(crate) fn bind_favorite_buttons(state: &AppState) -> usize {
    let mut bound = 0;

    for button in query_all_in_document(FAVORITE_BUTTON) {
        let Some(id) = item_id_of(&button) else {
            log_warn("favorite", "favorite button without data-post-id");
            continue;
        };

        let state = state.clone();
        let el = button.clone();
        let res = on_click(&button, move |_ev| {
            let state = state.clone();
            let el = el.clone();
            let id = id.clone();
            spawn_local(async move {
                let outcome =
                    toggle_favorite(&state.api, &state.gate, &state.page, &el, &id).await;
                report("favorite", id.as_str(), &outcome);
            });
        });

        match res {
            Ok(()) => bound += 1,
            Err(e) => log_error("favorite", format!("bind failed: {e:?}")),
        }
    }

    bound
}
