// Loads small forms into a modal and submits them in the background.
//
// Each load or submit gets a `RequestToken`; when a response arrives for a token that is no longer
// current (another link was clicked, or the modal was closed), it is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use formguard::ajax::{
    AJAX_HEADER_NAME, AJAX_HEADER_VALUE, RequestToken, RequestTracker, SubmitResult,
    parse_form_response, parse_submit_response, row_element_id,
};
use formguard::config::AjaxModalConfig;
use formguard::{AjaxError, GlueConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::web_document::{web_document, web_window};
use crate::web_element_ext::{WebElementExt, event_target_element, listen_and_forget};
use crate::web_error_handling::{JsResult, describe_js_error, log_listener_error};
use crate::web_util::{is_modal_shown, set_modal_shown};


const ERROR_CLASS: &str = "ajax-modal-error";

thread_local! {
    static REQUESTS: RefCell<RequestTracker> = RefCell::new(RequestTracker::new());
}

fn issue_token() -> RequestToken { REQUESTS.with(|r| r.borrow_mut().issue()) }
fn is_current(token: RequestToken) -> bool { REQUESTS.with(|r| r.borrow().is_current(token)) }
fn invalidate_requests() { REQUESTS.with(|r| r.borrow_mut().invalidate()) }

#[derive(Clone)]
struct AjaxModal {
    config: Rc<GlueConfig>,
    modal: web_sys::Element,
    title: Option<web_sys::Element>,
    body: web_sys::Element,
}

impl AjaxModal {
    fn settings(&self) -> &AjaxModalConfig { &self.config.ajax_modal }

    fn show(&self) -> JsResult<()> {
        if !is_modal_shown(&self.modal) {
            set_modal_shown(&self.modal, true)?;
        }
        Ok(())
    }

    fn hide(&self) -> JsResult<()> {
        if is_modal_shown(&self.modal) {
            set_modal_shown(&self.modal, false)?;
        }
        Ok(())
    }

    // Shown above the current body content so that a half-filled form survives a failed submit.
    fn show_error(&self, err: &AjaxError) -> JsResult<()> {
        log::warn!("AJAX modal request failed: {err}");
        let error_node = match self.body.find(&format!(".{ERROR_CLASS}"))? {
            Some(node) => node,
            None => {
                let node = web_document()?
                    .create_element("div")?
                    .with_attribute("class", &format!("alert alert-danger {ERROR_CLASS}"))?
                    .with_attribute("role", "alert")?;
                self.body.prepend_with_node_1(&node)?;
                node
            }
        };
        error_node.set_text_content(Some(&self.settings().network_error_message));
        self.show()
    }

    fn set_submitting(&self, submitting: bool) -> JsResult<()> {
        let selectors = "button[type=submit], input[type=submit], button:not([type])";
        for button in self.body.find_all(selectors)? {
            if submitting {
                button.set_attribute("disabled", "")?;
            } else {
                button.remove_attribute("disabled")?;
            }
        }
        Ok(())
    }
}

pub fn install(config: Rc<GlueConfig>) -> JsResult<()> {
    let document = web_document()?;
    let settings = &config.ajax_modal;
    let Some(modal) = document.get_element_by_id(&settings.modal_id) else {
        log::debug!("AJAX modal \"{}\" not found", settings.modal_id);
        return Ok(());
    };
    let Some(body) = modal.find(".modal-body")? else {
        log::warn!("AJAX modal \"{}\" has no .modal-body", settings.modal_id);
        return Ok(());
    };
    let title = modal.find(".modal-title")?;
    let ajax_modal = AjaxModal { config: Rc::clone(&config), modal, title, body };

    {
        let ajax_modal = ajax_modal.clone();
        listen_and_forget(document.raw(), "click", move |event: web_sys::Event| {
            on_link_click(&ajax_modal, event)
        })?;
    }
    {
        let body = ajax_modal.body.clone();
        let ajax_modal = ajax_modal.clone();
        body.add_event_listener_and_forget("submit", move |event: web_sys::Event| {
            on_form_submit(&ajax_modal, event)
        })?;
    }
    for close_button in ajax_modal.modal.find_all("[data-bs-dismiss=\"modal\"], .btn-close")? {
        let ajax_modal = ajax_modal.clone();
        close_button.add_event_listener_and_forget("click", move |event: web_sys::Event| {
            event.prevent_default();
            invalidate_requests();
            ajax_modal.hide()
        })?;
    }
    Ok(())
}

fn on_link_click(ajax_modal: &AjaxModal, event: web_sys::Event) -> JsResult<()> {
    let Some(target) = event_target_element(&event) else {
        return Ok(());
    };
    let Some(link) = target.closest(&format!(".{}", ajax_modal.settings().link_class))? else {
        return Ok(());
    };
    event.prevent_default();
    let Some(url) = link.get_attribute("href").filter(|href| !href.trim().is_empty()) else {
        log::warn!("AJAX modal link without href");
        return Ok(());
    };
    let title = link
        .get_attribute(&ajax_modal.settings().title_attr)
        .or_else(|| link.text_content())
        .map(|t| t.trim().to_owned())
        .unwrap_or_default();

    let token = issue_token();
    let ajax_modal = ajax_modal.clone();
    spawn_local(async move {
        let result = fetch_text(&url, "GET", None).await;
        if !is_current(token) {
            log::debug!("Dropping superseded response for {url}");
            return;
        }
        log_listener_error("ajax-modal-load", apply_load(&ajax_modal, &title, result));
    });
    Ok(())
}

fn apply_load(
    ajax_modal: &AjaxModal, title: &str, result: Result<String, AjaxError>,
) -> JsResult<()> {
    if let Some(title_node) = &ajax_modal.title {
        title_node.set_text_content(Some(title));
    }
    match result.and_then(|body| parse_form_response(&body)) {
        Ok(response) => {
            ajax_modal.body.set_inner_html(&response.html);
            ajax_modal.show()
        }
        Err(err) => {
            // Whatever the body holds belongs to an earlier request.
            ajax_modal.body.set_inner_html("");
            ajax_modal.show_error(&err)
        }
    }
}

fn on_form_submit(ajax_modal: &AjaxModal, event: web_sys::Event) -> JsResult<()> {
    let Some(target) = event_target_element(&event) else {
        return Ok(());
    };
    if target.id() != ajax_modal.settings().form_id {
        return Ok(());
    }
    event.prevent_default();
    let form: web_sys::HtmlFormElement = target.dyn_into()?;
    let action = match form.get_attribute("action").filter(|a| !a.trim().is_empty()) {
        Some(_) => form.action(),
        None => web_window()?.location().href()?,
    };
    let form_data = web_sys::FormData::new_with_form(&form)?;
    ajax_modal.set_submitting(true)?;

    let token = issue_token();
    let ajax_modal = ajax_modal.clone();
    spawn_local(async move {
        let result = fetch_text(&action, "POST", Some(&form_data)).await;
        if !is_current(token) {
            log::debug!("Dropping superseded submit response for {action}");
            return;
        }
        log_listener_error("ajax-modal-submit", apply_submit(&ajax_modal, result));
    });
    Ok(())
}

fn apply_submit(ajax_modal: &AjaxModal, result: Result<String, AjaxError>) -> JsResult<()> {
    let result = result.and_then(|body| parse_submit_response(&body));
    match result {
        Ok(SubmitResult::Saved { object_id, row_html }) => {
            ajax_modal.hide()?;
            let Some(row_html) = row_html else {
                return Ok(());
            };
            let document = web_document()?;
            let existing_row = object_id
                .as_ref()
                .map(|id| row_element_id(&ajax_modal.settings().row_id_prefix, id))
                .and_then(|id| document.get_element_by_id(&id));
            match existing_row {
                Some(row) => row.set_outer_html(&row_html),
                None => match document.query_selector(&ajax_modal.settings().table_body_selector)? {
                    Some(table_body) => table_body.insert_adjacent_html("beforeend", &row_html)?,
                    None => log::warn!(
                        "Table body \"{}\" not found, saved row not shown",
                        ajax_modal.settings().table_body_selector
                    ),
                },
            }
            Ok(())
        }
        Ok(SubmitResult::Invalid { html }) => {
            ajax_modal.body.set_inner_html(&html);
            Ok(())
        }
        Err(err) => {
            ajax_modal.set_submitting(false)?;
            ajax_modal.show_error(&err)
        }
    }
}

fn js_network_error(err: wasm_bindgen::JsValue) -> AjaxError {
    AjaxError::Network(describe_js_error(&err))
}

async fn fetch_text(
    url: &str, method: &str, body: Option<&web_sys::FormData>,
) -> Result<String, AjaxError> {
    let init = web_sys::RequestInit::new();
    init.set_method(method);
    let headers = web_sys::Headers::new().map_err(js_network_error)?;
    headers.set(AJAX_HEADER_NAME, AJAX_HEADER_VALUE).map_err(js_network_error)?;
    init.set_headers(&headers);
    if let Some(body) = body {
        init.set_body(body);
    }
    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(js_network_error)?;
    let window = web_window().map_err(js_network_error)?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_network_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_network_error)?;
    if !response.ok() {
        return Err(AjaxError::HttpStatus(response.status()));
    }
    let text = JsFuture::from(response.text().map_err(js_network_error)?)
        .await
        .map_err(js_network_error)?;
    text.as_string()
        .ok_or_else(|| AjaxError::MalformedResponse("response body is not text".to_owned()))
}
