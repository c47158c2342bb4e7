use crate::rust_error;
use crate::web_error_handling::JsResult;
use crate::web_iterators::ElementListIterator;


pub struct WebDocument(web_sys::Document);

impl WebDocument {
    pub fn raw(&self) -> &web_sys::Document { &self.0 }

    pub fn body(&self) -> JsResult<web_sys::HtmlElement> {
        self.0.body().ok_or_else(|| rust_error!("Cannot find document body"))
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<web_sys::Element> {
        self.0.get_element_by_id(element_id)
    }

    pub fn query_selector(&self, selectors: &str) -> JsResult<Option<web_sys::Element>> {
        self.0.query_selector(selectors)
    }
    pub fn query_selector_all(&self, selectors: &str) -> JsResult<ElementListIterator> {
        self.0.query_selector_all(selectors).map(|list| list.into())
    }

    pub fn create_element(&self, local_name: &str) -> JsResult<web_sys::Element> {
        self.0.create_element(local_name)
    }

    pub fn is_loading(&self) -> bool {
        self.0.ready_state() == "loading"
    }
}

pub fn web_document() -> JsResult<WebDocument> {
    let document = web_window()?
        .document()
        .ok_or_else(|| rust_error!("Cannot find document"))?;
    Ok(WebDocument(document))
}

pub fn web_window() -> JsResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| rust_error!("Cannot find window"))
}

// Native `confirm`. A blocked dialog counts as "no".
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn navigate_to(url: &str) -> JsResult<()> { web_window()?.location().set_href(url) }
