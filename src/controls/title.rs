//! Admin inline rename: the title cell becomes an input until saved or cancelled.

use crate::api::Backend;
use crate::models::{ItemId, RenameOutcome, RenameRequest};
use crate::state::AppState;
use crate::util::dom::{
    add_listener, alert, closest, item_id_of, on_click, query_all_in_document, query_one,
    reload_page, ACTIONS_CELL, CANCEL_TITLE_BUTTON, DELETE_FORM, EDIT_TITLE_BUTTON,
    SAVE_TITLE_BUTTON, TITLE_CELL, TITLE_INPUT,
};
use crate::util::{escape_html, log_debug, log_error, log_warn, trailing_path_segment};
use leptos::task::spawn_local;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlInputElement, Node};

const RENAME_FAILED: &str = "Failed to rename the post.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RenameDecision {
    /// Nothing to send; put the row back as it was.
    Cancel,
    Commit(String),
}

pub(crate) fn decide_rename(original: &str, edited: &str) -> RenameDecision {
    let edited = edited.trim();
    if edited.is_empty() || edited == original.trim() {
        RenameDecision::Cancel
    } else {
        RenameDecision::Commit(edited.to_string())
    }
}

pub(crate) async fn commit_rename<B: Backend>(
    backend: &B,
    id: &ItemId,
    title: String,
) -> Result<RenameOutcome, String> {
    backend
        .rename_title(id, &RenameRequest { title })
        .await
        .map_err(|e| e.user_message(RENAME_FAILED))
}

/// Item id for a row: the trigger's or row's `data-post-id`, else the id at the
/// end of the row's delete form action.
pub(crate) fn resolve_row_item_id(trigger: &Element, row: &Element) -> Option<ItemId> {
    item_id_of(trigger).or_else(|| item_id_of(row)).or_else(|| {
        let action = query_one(row, DELETE_FORM)?.get_attribute("action")?;
        trailing_path_segment(&action).and_then(|s| ItemId::parse(&s))
    })
}

/// Move every child out of `el`, keeping the nodes (and their listeners).
fn detach_children(el: &Element) -> Result<Vec<Node>, JsValue> {
    let mut nodes = Vec::new();
    while let Some(child) = el.first_child() {
        nodes.push(el.remove_child(&child)?);
    }
    Ok(nodes)
}

fn reattach_children(el: &Element, nodes: &[Node]) {
    el.set_inner_html("");
    for node in nodes {
        if let Err(e) = el.append_child(node) {
            log_error("title", format!("restore failed: {e:?}"));
        }
    }
}

struct InlineEdit {
    state: AppState,
    title_cell: Element,
    actions_cell: Element,
    id: ItemId,
    original: String,
    title_nodes: Vec<Node>,
    actions_nodes: Vec<Node>,
}

impl InlineEdit {
    fn input(&self) -> Option<HtmlInputElement> {
        query_one(&self.title_cell, TITLE_INPUT).and_then(|el| el.dyn_into().ok())
    }

    /// Put the original cell contents back; the edit trigger keeps its listener.
    fn cancel(&self) {
        reattach_children(&self.title_cell, &self.title_nodes);
        reattach_children(&self.actions_cell, &self.actions_nodes);
    }

    fn set_saving(&self, saving: bool) {
        if let Some(save) = query_one(&self.actions_cell, SAVE_TITLE_BUTTON) {
            let _ = save.toggle_attribute_with_force("disabled", saving);
        }
    }

    /// The title to send, or `None` after restoring the row when there is
    /// nothing to send.
    fn pending_title(&self) -> Option<String> {
        let edited = self.input().map(|i| i.value()).unwrap_or_default();
        match decide_rename(&self.original, &edited) {
            RenameDecision::Cancel => {
                self.cancel();
                None
            }
            RenameDecision::Commit(title) => Some(title),
        }
    }

    fn settle(&self, result: Result<RenameOutcome, String>) {
        match result {
            Ok(out) => {
                log_debug(
                    "title",
                    format!("{} renamed to {:?}", self.id, out.new_title.unwrap_or_default()),
                );
                reload_page();
            }
            Err(msg) => {
                log_error("title", format!("{}: {msg}", self.id));
                alert(&msg);
                self.set_saving(false);
            }
        }
    }

    fn save(this: &Rc<Self>) {
        let Some(title) = this.pending_title() else {
            return;
        };

        this.set_saving(true);
        let this = Rc::clone(this);
        spawn_local(async move {
            let result = commit_rename(&this.state.api, &this.id, title).await;
            this.settle(result);
        });
    }
}

/// Swap the row's title and actions cells for the editor. `None` when the
/// row is already being edited.
fn begin_edit(
    state: &AppState,
    row: &Element,
    id: &ItemId,
) -> Result<Option<Rc<InlineEdit>>, JsValue> {
    let title_cell =
        query_one(row, TITLE_CELL).ok_or_else(|| JsValue::from_str("row has no title cell"))?;
    let actions_cell =
        query_one(row, ACTIONS_CELL).ok_or_else(|| JsValue::from_str("row has no actions cell"))?;

    if query_one(&title_cell, TITLE_INPUT).is_some() {
        return Ok(None);
    }

    let original = title_cell
        .text_content()
        .unwrap_or_default()
        .trim()
        .to_string();

    let edit = Rc::new(InlineEdit {
        state: state.clone(),
        title_cell: title_cell.clone(),
        actions_cell: actions_cell.clone(),
        id: id.clone(),
        title_nodes: detach_children(&title_cell)?,
        actions_nodes: detach_children(&actions_cell)?,
        original,
    });

    title_cell.set_inner_html(&format!(
        r#"<input type="text" class="title-input" value="{}">"#,
        escape_html(&edit.original)
    ));
    actions_cell.set_inner_html(
        r#"<button type="button" class="save-title-btn">Save</button> <button type="button" class="cancel-title-btn">Cancel</button>"#,
    );

    if let Some(save) = query_one(&actions_cell, SAVE_TITLE_BUTTON) {
        let e = Rc::clone(&edit);
        on_click(&save, move |_| InlineEdit::save(&e))?;
    }
    if let Some(cancel) = query_one(&actions_cell, CANCEL_TITLE_BUTTON) {
        let e = Rc::clone(&edit);
        on_click(&cancel, move |_| e.cancel())?;
    }
    if let Some(input) = edit.input() {
        let e = Rc::clone(&edit);
        add_listener(&input, "keydown", move |ev| {
            let Some(ev) = ev.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            match ev.key().as_str() {
                "Enter" => {
                    ev.prevent_default();
                    InlineEdit::save(&e);
                }
                "Escape" => e.cancel(),
                _ => {}
            }
        })?;
        let _ = input.focus();
        input.select();
    }

    Ok(Some(edit))
}

fn bind_trigger(state: &AppState, trigger: &Element) -> Result<(), JsValue> {
    let Some(row) = closest(trigger, "tr") else {
        log_warn("title", "edit trigger outside a table row");
        return Ok(());
    };
    let Some(id) = resolve_row_item_id(trigger, &row) else {
        log_warn("title", "could not resolve post id for row");
        return Ok(());
    };

    let state = state.clone();
    on_click(trigger, move |_| {
        if let Err(e) = begin_edit(&state, &row, &id) {
            log_error("title", format!("{id}: {e:?}"));
        }
    })
}

pub(crate) fn bind_title_editors(state: &AppState) -> usize {
    if !state.page.allows_title_edit() {
        return 0;
    }

    query_all_in_document(EDIT_TITLE_BUTTON)
        .iter()
        .filter(|trigger| match bind_trigger(state, trigger) {
            Ok(()) => true,
            Err(e) => {
                log_error("title", format!("bind failed: {e:?}"));
                false
            }
        })
        .count()
}
