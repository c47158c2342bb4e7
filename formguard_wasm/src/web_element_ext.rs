use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;

use crate::web_error_handling::{JsResult, log_listener_error};
use crate::web_iterators::ElementListIterator;


pub trait WebElementExt {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element>;

    fn has_class(&self, class: &str) -> bool;
    fn has_any_class<'a>(&self, classes: impl IntoIterator<Item = &'a String>) -> bool;

    // Visibility through the inline `display` style: this is how server templates hide template
    // rows, so reading and writing it the same way keeps both in agreement.
    fn is_displayed(&self) -> bool;
    fn set_displayed(&self, displayed: bool) -> JsResult<()>;

    fn find(&self, selectors: &str) -> JsResult<Option<web_sys::Element>>;
    fn find_all(&self, selectors: &str) -> JsResult<ElementListIterator>;

    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()>;

    fn dispatch_custom_event(&self, event_type: &str) -> JsResult<()>;
}

impl WebElementExt for web_sys::Element {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element> {
        self.set_attribute(name, value)?;
        Ok(self)
    }

    fn has_class(&self, class: &str) -> bool { self.class_list().contains(class) }

    fn has_any_class<'a>(&self, classes: impl IntoIterator<Item = &'a String>) -> bool {
        classes.into_iter().any(|class| self.has_class(class))
    }

    fn is_displayed(&self) -> bool {
        match self.dyn_ref::<web_sys::HtmlElement>() {
            Some(html) => {
                html.style().get_property_value("display").ok().as_deref() != Some("none")
            }
            None => true,
        }
    }

    fn set_displayed(&self, displayed: bool) -> JsResult<()> {
        if let Some(html) = self.dyn_ref::<web_sys::HtmlElement>() {
            if displayed {
                html.style().remove_property("display")?;
            } else {
                html.style().set_property("display", "none")?;
            }
        }
        Ok(())
    }

    fn find(&self, selectors: &str) -> JsResult<Option<web_sys::Element>> {
        self.query_selector(selectors)
    }
    fn find_all(&self, selectors: &str) -> JsResult<ElementListIterator> {
        self.query_selector_all(selectors).map(|list| list.into())
    }

    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()> {
        listen_and_forget(self, event_type, listener)
    }

    fn dispatch_custom_event(&self, event_type: &str) -> JsResult<()> {
        let init = web_sys::CustomEventInit::new();
        init.set_bubbles(true);
        let event = web_sys::CustomEvent::new_with_event_init_dict(event_type, &init)?;
        self.dispatch_event(&event)?;
        Ok(())
    }
}

// The listeners live as long as the page: every element they are attached to is part of the
// initial markup or the document itself. Errors are logged rather than thrown into the browser.
//
// TODO: Store the closures next to `DirtyTracker` and drop them on `pagehide` if the glue is ever
// used in a single-page app where it could be initialized more than once.
pub fn listen_and_forget<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget, event_type: &str,
    mut listener: impl FnMut(E) -> JsResult<()> + 'static,
) -> JsResult<()> {
    let name = event_type.to_owned();
    let closure = Closure::<dyn FnMut(E)>::new(move |event: E| {
        log_listener_error(&name, listener(event));
    });
    target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// The element an event originated from, if it is an element at all.
pub fn event_target_element(event: &web_sys::Event) -> Option<web_sys::Element> {
    event.target().and_then(|target| target.dyn_into::<web_sys::Element>().ok())
}
