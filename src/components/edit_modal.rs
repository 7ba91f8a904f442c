use crate::accordion::{bind_accordions, generate_accordion_html};
use crate::api::{ApiError, Backend};
use crate::cache::TaxonomyCache;
use crate::models::{EditPostRequest, ItemId, TagId};
use crate::state::AppState;
use crate::util::dom::{
    alert, document, item_id_of, on_click, query_all, query_all_in_document, reload_page,
    CHECKED_TAGS, EDIT_MODAL_ROOT_ID, EDIT_POST_BUTTON,
};
use crate::util::{log_debug, log_error, log_warn};
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use std::collections::BTreeSet;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};

const TAGS_FAILED: &str = "Failed to load tags.";
const DETAILS_FAILED: &str = "Failed to load post details.";
const UPDATE_FAILED: &str = "Failed to update the post.";
const UPDATED: &str = "Post updated.";

/// Closed -> Loading -> Open -> (Submitting -> Closed | Open)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum ModalPhase {
    #[default]
    Closed,
    /// Fetching; nothing is shown yet.
    Loading(ItemId),
    Open(ItemId),
    Submitting(ItemId),
}

impl ModalPhase {
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            ModalPhase::Closed => None,
            ModalPhase::Loading(id) | ModalPhase::Open(id) | ModalPhase::Submitting(id) => Some(id),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, ModalPhase::Open(_) | ModalPhase::Submitting(_))
    }

    pub fn start_loading(&self, id: ItemId) -> Option<Self> {
        match self {
            ModalPhase::Closed => Some(ModalPhase::Loading(id)),
            _ => None,
        }
    }

    /// `None` when the modal was closed (or reopened) while the fetch ran.
    pub fn finish_loading(&self, id: &ItemId) -> Option<Self> {
        match self {
            ModalPhase::Loading(current) if current == id => Some(ModalPhase::Open(id.clone())),
            _ => None,
        }
    }

    pub fn start_submit(&self) -> Option<Self> {
        match self {
            ModalPhase::Open(id) => Some(ModalPhase::Submitting(id.clone())),
            _ => None,
        }
    }

    pub fn submit_failed(&self) -> Option<Self> {
        match self {
            ModalPhase::Submitting(id) => Some(ModalPhase::Open(id.clone())),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EditForm {
    pub title: String,
    pub accordion_html: String,
}

#[derive(Debug)]
pub(crate) enum OpenError {
    Taxonomy(ApiError),
    Details(ApiError),
}

impl OpenError {
    pub fn user_message(&self) -> String {
        match self {
            OpenError::Taxonomy(_) => TAGS_FAILED.to_string(),
            OpenError::Details(e) => e.user_message(DETAILS_FAILED),
        }
    }
}

impl std::fmt::Display for OpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenError::Taxonomy(e) => write!(f, "taxonomy: {e}"),
            OpenError::Details(e) => write!(f, "details: {e}"),
        }
    }
}

/// Everything the form needs before it may be shown. The taxonomy comes from
/// the cache and is fetched only on the first miss.
pub(crate) async fn load_edit_form<B: Backend>(
    backend: &B,
    cache: &TaxonomyCache,
    id: &ItemId,
) -> Result<EditForm, OpenError> {
    let taxonomy = cache
        .get_or_fetch(backend)
        .await
        .map_err(OpenError::Taxonomy)?;
    let details = backend
        .post_details(id)
        .await
        .map_err(OpenError::Details)?;

    let selected: BTreeSet<TagId> = details.selected_tags.into_iter().collect();
    Ok(EditForm {
        title: details.title,
        accordion_html: generate_accordion_html(&taxonomy, &selected),
    })
}

pub(crate) async fn submit_edit<B: Backend>(
    backend: &B,
    id: &ItemId,
    title: String,
    tags: Vec<TagId>,
) -> Result<(), String> {
    let req = EditPostRequest {
        title: title.trim().to_string(),
        tags,
    };
    backend
        .edit_post(id, &req)
        .await
        .map(|_| ())
        .map_err(|e| e.user_message(UPDATE_FAILED))
}

pub(crate) fn checked_tag_ids(root: &Element) -> Vec<TagId> {
    query_all(root, CHECKED_TAGS)
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
        .filter_map(|input| input.value().trim().parse::<TagId>().ok())
        .collect()
}

#[derive(Clone)]
pub(crate) struct EditModalController {
    state: AppState,
    pub phase: RwSignal<ModalPhase>,
    pub title: RwSignal<String>,
    pub accordion_html: RwSignal<String>,
}

impl EditModalController {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            phase: RwSignal::new(ModalPhase::Closed),
            title: RwSignal::new(String::new()),
            accordion_html: RwSignal::new(String::new()),
        }
    }

    pub fn open(&self, id: ItemId) {
        let Some(loading) = self.phase.get_untracked().start_loading(id.clone()) else {
            log_debug("edit", format!("ignoring open for {id}: modal busy"));
            return;
        };
        self.phase.set(loading);

        let this = self.clone();
        spawn_local(async move {
            let loaded = load_edit_form(&this.state.api, &this.state.taxonomy, &id).await;

            let Some(open) = this.phase.get_untracked().finish_loading(&id) else {
                log_debug("edit", format!("dropping late load for {id}"));
                return;
            };

            match loaded {
                Ok(form) => {
                    this.title.set(form.title);
                    this.accordion_html.set(form.accordion_html);
                    this.phase.set(open);
                }
                Err(e) => {
                    log_error("edit", format!("{id}: {e}"));
                    alert(&e.user_message());
                    this.phase.set(ModalPhase::Closed);
                }
            }
        });
    }

    pub fn submit(&self, tags: Vec<TagId>) {
        let Some((id, title)) = self.begin_submit() else {
            return;
        };

        let this = self.clone();
        spawn_local(async move {
            let result = submit_edit(&this.state.api, &id, title, tags).await;
            this.finish_submit(&id, result);
        });
    }

    /// Open -> Submitting; yields what to send.
    fn begin_submit(&self) -> Option<(ItemId, String)> {
        let phase = self.phase.get_untracked();
        let id = phase.item().cloned()?;
        self.phase.set(phase.start_submit()?);
        Some((id, self.title.get_untracked()))
    }

    fn finish_submit(&self, id: &ItemId, result: Result<(), String>) {
        match result {
            Ok(()) => {
                alert(UPDATED);
                reload_page();
            }
            Err(msg) => {
                log_error("edit", format!("{id}: {msg}"));
                alert(&msg);
                // The form keeps what the user typed.
                if let Some(open) = self.phase.get_untracked().submit_failed() {
                    self.phase.set(open);
                }
            }
        }
    }

    pub fn close(&self) {
        self.phase.set(ModalPhase::Closed);
        self.title.set(String::new());
        self.accordion_html.set(String::new());
    }
}

#[component]
pub(crate) fn EditModal(controller: EditModalController) -> impl IntoView {
    let form_ref: NodeRef<html::Form> = NodeRef::new();
    let tags_ref: NodeRef<html::Div> = NodeRef::new();

    let phase = controller.phase;
    let title = controller.title;
    let accordion_html = controller.accordion_html;

    // Markup and header binding change together; only this subtree is scanned.
    Effect::new(move |_| {
        let markup = accordion_html.get();
        if let Some(el) = tags_ref.get() {
            el.set_inner_html(&markup);
            bind_accordions(&el);
        }
    });

    let c = controller.clone();
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && c.phase.get_untracked().is_visible() {
            c.close();
        }
    });

    let c = controller.clone();
    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let tags = form_ref
            .get_untracked()
            .map(|form| checked_tag_ids(&form))
            .unwrap_or_default();
        c.submit(tags);
    };

    // Clicks inside the dialog bubble up with a different target.
    let c = controller.clone();
    let on_backdrop = move |ev: web_sys::MouseEvent| {
        if ev.target() == ev.current_target() {
            c.close();
        }
    };

    let c = controller.clone();
    let on_cancel = move |_: web_sys::MouseEvent| c.close();

    let visible = move || phase.get().is_visible();
    let submitting = move || matches!(phase.get(), ModalPhase::Submitting(_));

    view! {
        <div
            class="modal-backdrop"
            data-state=move || if visible() { "open" } else { "closed" }
            style:display=move || if visible() { "flex" } else { "none" }
            on:click=on_backdrop
        >
            <div class="modal" role="dialog" aria-modal="true">
                <h2 class="modal-title">"Edit post"</h2>
                <form class="edit-form" node_ref=form_ref on:submit=on_submit>
                    <label for="edit-title">"Title"</label>
                    <input
                        id="edit-title"
                        class="edit-title-input"
                        type="text"
                        name="title"
                        prop:value=move || title.get()
                        on:input=move |ev| title.set(event_target_value(&ev))
                    />
                    <div class="tag-accordion" node_ref=tags_ref></div>
                    <div class="modal-actions">
                        <button type="button" class="cancel-btn" on:click=on_cancel>"Cancel"</button>
                        <button type="submit" class="save-btn" disabled=submitting>
                            {move || if submitting() { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

/// Mount the modal into the page's host element, if the page has one.
pub(crate) fn mount_edit_modal(state: &AppState) -> Option<EditModalController> {
    let host = document()?.get_element_by_id(EDIT_MODAL_ROOT_ID)?;
    let host = host.dyn_into::<web_sys::HtmlElement>().ok()?;

    let controller = EditModalController::new(state.clone());
    let c = controller.clone();
    leptos::mount::mount_to(host, move || view! { <EditModal controller=c /> }).forget();
    Some(controller)
}

pub(crate) fn bind_edit_triggers(controller: &EditModalController) -> usize {
    let mut bound = 0;

    for trigger in query_all_in_document(EDIT_POST_BUTTON) {
        let Some(id) = item_id_of(&trigger) else {
            log_warn("edit", "edit button without data-post-id");
            continue;
        };

        let c = controller.clone();
        match on_click(&trigger, move |ev| {
            ev.prevent_default();
            c.open(id.clone());
        }) {
            Ok(()) => bound += 1,
            Err(e) => log_error("edit", format!("bind failed: {e:?}")),
        }
    }

    bound
}


// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::api::fake::{rejected, FakeBackend};
    use crate::api::ApiClient;
    use crate::models::{Tag, TagCategory};
    use crate::state::PageContext;
    use crate::util::dom::{query_one, ACCORDION_HEADER};
    use crate::util::test_support::{click, mount, silence_alerts, sleep_ms};
    use any_spawner::Executor;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn categories() -> Vec<TagCategory> {
        vec![TagCategory {
            category_name: "A".to_string(),
            tags: [1, 3, 7, 8]
                .into_iter()
                .map(|id| Tag { id, name: format!("t{id}") })
                .collect(),
        }]
    }

    fn controller() -> EditModalController {
        EditModalController::new(AppState::new(
            ApiClient::new("http://127.0.0.1:9".to_string()),
            PageContext::from_path("/"),
        ))
    }

    /// Mount `EditModal` on a fresh host and show it for item 42.
    fn open_modal(controller: &EditModalController) -> Element {
        let _ = Executor::init_wasm_bindgen();
        let host = mount("");
        let host_el: web_sys::HtmlElement = host.clone().dyn_into().expect("html");
        let c = controller.clone();
        leptos::mount::mount_to(host_el, move || view! { <EditModal controller=c /> }).forget();

        controller.title.set("Hello".to_string());
        let selected: BTreeSet<TagId> = [3].into_iter().collect();
        controller
            .accordion_html
            .set(generate_accordion_html(&categories(), &selected));
        controller.phase.set(ModalPhase::Open(ItemId::parse("42").unwrap()));
        host
    }

    fn backdrop_state(host: &Element) -> Option<String> {
        query_one(host, ".modal-backdrop").and_then(|el| el.get_attribute("data-state"))
    }

    #[wasm_bindgen_test]
    fn test_checked_tags_read_back_from_generated_markup() {
        let host = mount("");
        let selected: BTreeSet<TagId> = [3, 7].into_iter().collect();
        host.set_inner_html(&generate_accordion_html(&categories(), &selected));

        assert_eq!(checked_tag_ids(&host), vec![3, 7]);
    }

    #[wasm_bindgen_test]
    async fn test_injected_accordion_headers_are_bound() {
        let c = controller();
        let host = open_modal(&c);
        sleep_ms(20).await;

        let header = query_one(&host, ACCORDION_HEADER).expect("injected header");
        assert!(header.has_attribute(crate::util::dom::ACCORDION_BOUND_ATTR));
        click(&header);

        let panel = query_one(&host, ".accordion-content").expect("panel");
        let panel: web_sys::HtmlElement = panel.dyn_into().expect("html");
        assert!(panel
            .style()
            .get_property_value("max-height")
            .unwrap_or_default()
            .ends_with("px"));
        assert_eq!(checked_tag_ids(&host), vec![3]);
    }

    #[wasm_bindgen_test]
    async fn test_click_inside_dialog_keeps_modal_open() {
        let c = controller();
        let host = open_modal(&c);
        sleep_ms(20).await;
        assert_eq!(backdrop_state(&host).as_deref(), Some("open"));

        click(&query_one(&host, ".modal").expect("dialog"));
        click(&query_one(&host, ".modal-title").expect("heading"));
        sleep_ms(20).await;

        assert!(c.phase.get_untracked().is_visible());
        assert_eq!(backdrop_state(&host).as_deref(), Some("open"));
    }

    #[wasm_bindgen_test]
    async fn test_backdrop_click_closes_and_clears_form() {
        let c = controller();
        let host = open_modal(&c);
        sleep_ms(20).await;

        click(&query_one(&host, ".modal-backdrop").expect("backdrop"));
        sleep_ms(20).await;

        assert_eq!(c.phase.get_untracked(), ModalPhase::Closed);
        assert_eq!(c.title.get_untracked(), "");
        assert_eq!(c.accordion_html.get_untracked(), "");
        assert_eq!(backdrop_state(&host).as_deref(), Some("closed"));
        assert!(query_one(&host, ACCORDION_HEADER).is_none());
    }

    #[wasm_bindgen_test]
    async fn test_cancel_button_closes() {
        let c = controller();
        let host = open_modal(&c);
        sleep_ms(20).await;

        click(&query_one(&host, ".cancel-btn").expect("cancel"));

        assert_eq!(c.phase.get_untracked(), ModalPhase::Closed);
        assert_eq!(c.title.get_untracked(), "");
    }

    #[wasm_bindgen_test]
    async fn test_failed_submit_reopens_with_typed_title() {
        silence_alerts();
        let c = controller();
        let host = open_modal(&c);
        sleep_ms(20).await;
        c.title.set("Edited title".to_string());

        let (id, title) = c.begin_submit().expect("open modal submits");
        assert!(matches!(c.phase.get_untracked(), ModalPhase::Submitting(_)));
        assert!(c.begin_submit().is_none());

        let backend = FakeBackend::default();
        backend
            .edits
            .borrow_mut()
            .push_back(Err(rejected("Title is required")));
        c.finish_submit(&id, submit_edit(&backend, &id, title, vec![3]).await);
        sleep_ms(20).await;

        assert_eq!(c.phase.get_untracked(), ModalPhase::Open(id));
        assert_eq!(c.title.get_untracked(), "Edited title");
        let input: HtmlInputElement = query_one(&host, ".edit-title-input")
            .expect("input")
            .dyn_into()
            .expect("input element");
        assert_eq!(input.value(), "Edited title");
        assert_eq!(backdrop_state(&host).as_deref(), Some("open"));
    }
}
