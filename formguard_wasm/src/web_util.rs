use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::web_document::web_window;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;


// Modal markup follows Bootstrap conventions (`.modal`, `.show`, `aria-hidden`), but the glue
// drives it directly instead of going through Bootstrap's JS.
pub fn set_modal_shown(modal: &web_sys::Element, shown: bool) -> JsResult<()> {
    modal.class_list().toggle_with_force("show", shown)?;
    modal.set_attribute("aria-hidden", if shown { "false" } else { "true" })?;
    if let Some(html) = modal.dyn_ref::<web_sys::HtmlElement>() {
        html.style().set_property("display", if shown { "block" } else { "none" })?;
    }
    Ok(())
}

pub fn is_modal_shown(modal: &web_sys::Element) -> bool { modal.has_class("show") }

pub fn scroll_into_view(e: &web_sys::Element) {
    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    options.set_block(web_sys::ScrollLogicalPosition::Center);
    e.scroll_into_view_with_scroll_into_view_options(&options);
}

pub fn focus_first_field(container: &web_sys::Element) -> JsResult<()> {
    let first = container.find("input:not([type=hidden]), select, textarea")?;
    if let Some(html) = first.and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok()) {
        html.focus()?;
    }
    Ok(())
}

pub fn set_timeout(millis: i32, callback: impl FnOnce() + 'static) -> JsResult<()> {
    let closure = Closure::once_into_js(callback);
    web_window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), millis)?;
    Ok(())
}

// Shows a notification element for a few seconds.
pub fn flash_element(e: &web_sys::Element, class: &str, millis: i32) -> JsResult<()> {
    e.class_list().add_1(class)?;
    let e = e.clone();
    let class = class.to_owned();
    set_timeout(millis, move || {
        let _ = e.class_list().remove_1(&class);
    })
}
