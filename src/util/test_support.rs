//! Browser test helpers shared by the `wasm_tests` modules.

use super::dom::document;
use wasm_bindgen::JsValue;
use web_sys::Element;

/// Append a fresh host `<div>` holding `html` to the body.
pub(crate) fn mount(html: &str) -> Element {
    let doc = document().expect("document");
    let host = doc.create_element("div").expect("div");
    host.set_inner_html(html);
    doc.body().expect("body").append_child(&host).expect("append");
    host
}

pub(crate) async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("timeout");
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.expect("sleep");
}

/// Replace `window.alert` with a no-op so failure paths don't block the runner.
pub(crate) fn silence_alerts() {
    let window = web_sys::window().expect("window");
    js_sys::Reflect::set(
        &window,
        &JsValue::from_str("alert"),
        &js_sys::Function::new_no_args(""),
    )
    .expect("stub alert");
}

pub(crate) fn click(el: &Element) {
    use wasm_bindgen::JsCast;
    el.clone()
        .dyn_into::<web_sys::HtmlElement>()
        .expect("html element")
        .click();
}
