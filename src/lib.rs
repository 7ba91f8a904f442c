mod accordion;
mod api;
mod cache;
mod components;
mod controls;
mod models;
mod state;
mod util;

use crate::state::AppState;
use crate::util::dom::document;
use crate::util::log_debug;
use any_spawner::Executor;
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

/// One pass over the server-rendered page: every control is bound exactly once.
fn init_page() {
    let state = AppState::from_env();
    log_debug(
        "init",
        format!("view={} api={}", state.page.view, state.api.base_url),
    );

    controls::bind_all(&state);

    let accordions = accordion::bind_accordions_in_document();
    let edit_triggers = components::edit_modal::mount_edit_modal(&state)
        .map(|controller| components::edit_modal::bind_edit_triggers(&controller))
        .unwrap_or(0);
    log_debug(
        "init",
        format!("bound accordion={accordions} edit={edit_triggers}"),
    );

    spawn_local(accordion::render_create_accordion(state));
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    // Nothing is mounted on most pages, so the task executor is started here.
    let _ = Executor::init_wasm_bindgen();

    let Some(doc) = document() else {
        return;
    };

    if doc.ready_state() == "loading" {
        let cb = Closure::once_into_js(init_page);
        let _ = doc.add_event_listener_with_callback("DOMContentLoaded", cb.unchecked_ref());
    } else {
        init_page();
    }
}
