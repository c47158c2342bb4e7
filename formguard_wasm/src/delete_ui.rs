use std::rc::Rc;

use formguard::GlueConfig;
use formguard::delete_button::DeleteRequest;
use wasm_bindgen::JsCast;

use crate::web_document::{confirm, web_document};
use crate::web_element_ext::{WebElementExt, event_target_element, listen_and_forget};
use crate::web_error_handling::JsResult;


// Delegated, so that buttons in table rows inserted by the AJAX modal work as well.
pub fn install(config: Rc<GlueConfig>) -> JsResult<()> {
    let document = web_document()?;
    listen_and_forget(document.raw(), "click", move |event: web_sys::Event| {
        let settings = &config.delete_button;
        let Some(target) = event_target_element(&event) else {
            return Ok(());
        };
        let Some(button) = target.closest(&format!(".{}", settings.button_class))? else {
            return Ok(());
        };
        event.prevent_default();
        let request = DeleteRequest::from_data(
            button.get_attribute(&settings.url_attr).as_deref(),
            button.get_attribute(&settings.csrf_token_attr).as_deref(),
        );
        let Some(request) = request else {
            log::warn!("Delete button without \"{}\"", settings.url_attr);
            return Ok(());
        };
        if !confirm(&settings.confirm_message) {
            return Ok(());
        }
        submit_delete(&request)
    })
}

fn submit_delete(request: &DeleteRequest) -> JsResult<()> {
    let document = web_document()?;
    let form: web_sys::HtmlFormElement = document
        .create_element("form")?
        .with_attribute("method", "POST")?
        .with_attribute("action", &request.url)?
        .dyn_into()?;
    form.set_displayed(false)?;
    for (name, value) in request.form_fields() {
        let input = document
            .create_element("input")?
            .with_attribute("type", "hidden")?
            .with_attribute("name", name)?
            .with_attribute("value", value)?;
        form.append_child(&input)?;
    }
    document.body()?.append_child(&form)?;
    log::info!("Deleting via POST {}", request.url);
    form.submit()
}
