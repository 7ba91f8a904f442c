//! Selectors the server templates agree on, plus thin `web_sys` helpers.

use crate::models::ItemId;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, EventTarget, HtmlElement};

pub(crate) const POST_ID_ATTR: &str = "data-post-id";
pub(crate) const ACTIVE_CLASS: &str = "active";

pub(crate) const LIKE_BUTTON: &str = ".like-btn";
pub(crate) const LIKE_ICON: &str = ".like-icon";
pub(crate) const LIKE_COUNT: &str = ".like-count";
pub(crate) const ROW_LIKE_COUNT: &str = ".likes-cell .like-count";

pub(crate) const FAVORITE_BUTTON: &str = ".favorite-btn";
pub(crate) const FAVORITE_ICON: &str = ".favorite-icon";
/// Nearest of these is the item's visual container.
pub(crate) const ITEM_CONTAINER: &str = "tr, .card";
pub(crate) const REMOVE_TRANSITION_MS: u64 = 500;

pub(crate) const ACCORDION_HEADER: &str = ".accordion-header";
pub(crate) const ACCORDION_BOUND_ATTR: &str = "data-accordion-bound";
/// `<div id="tag-accordion" data-source="api">` on the create page.
pub(crate) const CREATE_ACCORDION_ID: &str = "tag-accordion";

pub(crate) const EDIT_POST_BUTTON: &str = ".edit-post-btn";
pub(crate) const EDIT_MODAL_ROOT_ID: &str = "edit-modal-root";
pub(crate) const CHECKED_TAGS: &str = "input[name='tags']:checked";

pub(crate) const EDIT_TITLE_BUTTON: &str = ".edit-title-btn";
pub(crate) const TITLE_CELL: &str = ".title-cell";
pub(crate) const ACTIONS_CELL: &str = ".actions-cell";
pub(crate) const DELETE_FORM: &str = "form[action*='/delete/']";
pub(crate) const TITLE_INPUT: &str = ".title-input";
pub(crate) const SAVE_TITLE_BUTTON: &str = ".save-title-btn";
pub(crate) const CANCEL_TITLE_BUTTON: &str = ".cancel-title-btn";

pub(crate) fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|w| w.document())
}

fn collect(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(collect)
        .unwrap_or_default()
}

pub(crate) fn query_all_in_document(selector: &str) -> Vec<Element> {
    document()
        .and_then(|d| d.query_selector_all(selector).ok())
        .map(collect)
        .unwrap_or_default()
}

pub(crate) fn query_one(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub(crate) fn closest(el: &Element, selector: &str) -> Option<Element> {
    el.closest(selector).ok().flatten()
}

pub(crate) fn item_id_of(el: &Element) -> Option<ItemId> {
    el.get_attribute(POST_ID_ATTR)
        .and_then(|raw| ItemId::parse(&raw))
}

pub(crate) fn set_class(el: &Element, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

pub(crate) fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub(crate) fn as_html(el: &Element) -> Option<HtmlElement> {
    el.clone().dyn_into::<HtmlElement>().ok()
}

/// Attach a listener for the life of the page.
pub(crate) fn add_listener(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let cb = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

pub(crate) fn on_click(el: &Element, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    add_listener(el, "click", handler)
}

pub(crate) fn alert(message: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.alert_with_message(message);
    }
}

pub(crate) fn reload_page() {
    if let Some(w) = web_sys::window() {
        let _ = w.location().reload();
    }
}
