// Browser tests for unsaved-changes protection. Run with
// `wasm-pack test --headless --firefox formguard_wasm`.
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use formguard::GlueConfig;
use formguard_wasm::form_protect;
use formguard_wasm::web_document::{web_document, web_window};
use formguard_wasm::web_element_ext::{WebElementExt, listen_and_forget};
use formguard_wasm::web_util::is_modal_shown;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);


const PAGE_HTML: &str = r#"
<form id="site-form" data-form-name="site" data-form-label="site form">
  <input type="text" name="name" id="name" value="Creek">
  <input type="hidden" name="next" id="next" value="">
  <button type="button" class="btn-cancel" id="cancel">Cancel</button>
</form>
<a href="/equipment/" id="away">Equipment</a>
<div class="modal" id="unsavedChangesModal" style="display: none">
  <p id="unsavedChangesMessage"></p>
  <button id="stayOnPageBtn">Stay</button>
  <button id="leaveWithoutSavingBtn">Leave</button>
  <button id="saveAndContinueBtn">Save</button>
</div>
"#;

fn element(id: &str) -> web_sys::Element { web_document().unwrap().get_element_by_id(id).unwrap() }

fn click(id: &str) { element(id).dyn_into::<web_sys::HtmlElement>().unwrap().click(); }

fn modal_shown() -> bool { is_modal_shown(&element("unsavedChangesModal")) }

// Installs protection on a fresh page. A window listener cancels whatever default action is left
// after the page's own listeners ran, so a failing test cannot navigate the test runner away.
fn setup(html: &str) {
    web_document().unwrap().body().unwrap().set_inner_html(html);
    listen_and_forget(&web_window().unwrap(), "click", |event: web_sys::Event| {
        event.prevent_default();
        Ok(())
    })
    .unwrap();
    form_protect::install(Rc::new(GlueConfig::default())).unwrap();
}

fn edit_name(value: &str) {
    let input = element("name").dyn_into::<web_sys::HtmlInputElement>().unwrap();
    input.set_value(value);
    form_protect::refresh(&input).unwrap();
}

#[wasm_bindgen_test]
fn clean_form_does_not_show_modal() {
    setup(PAGE_HTML);
    click("away");
    assert!(!modal_shown());
}

#[wasm_bindgen_test]
fn dirty_link_click_shows_modal_with_message() {
    setup(PAGE_HTML);
    edit_name("Pond");
    assert!(form_protect::is_dirty("site"));

    click("away");
    assert!(modal_shown());
    assert_eq!(
        element("unsavedChangesMessage").text_content().as_deref(),
        Some("You have unsaved changes in the site form.")
    );

    click("stayOnPageBtn");
    assert!(!modal_shown());
    assert!(form_protect::is_dirty("site"));
}

#[wasm_bindgen_test]
fn reverted_edit_does_not_show_modal() {
    setup(PAGE_HTML);
    edit_name("Pond");
    edit_name("Creek");
    click("away");
    assert!(!modal_shown());
}

#[wasm_bindgen_test]
fn save_and_continue_sets_next_and_submits() {
    setup(PAGE_HTML);
    let submits = Rc::new(Cell::new(0));
    {
        let submits = Rc::clone(&submits);
        element("site-form")
            .add_event_listener_and_forget("submit", move |event: web_sys::Event| {
                event.prevent_default();
                submits.set(submits.get() + 1);
                Ok(())
            })
            .unwrap();
    }
    edit_name("Pond");
    click("away");
    click("saveAndContinueBtn");

    assert_eq!(submits.get(), 1);
    let next = element("next").dyn_into::<web_sys::HtmlInputElement>().unwrap();
    assert_eq!(next.value(), "/equipment/");
    assert!(!modal_shown());
    assert!(!form_protect::is_dirty("site"));
}

#[wasm_bindgen_test]
fn save_and_continue_without_next_field_still_submits() {
    setup(&PAGE_HTML.replace(r#"<input type="hidden" name="next" id="next" value="">"#, ""));
    let submits = Rc::new(Cell::new(0));
    {
        let submits = Rc::clone(&submits);
        element("site-form")
            .add_event_listener_and_forget("submit", move |event: web_sys::Event| {
                event.prevent_default();
                submits.set(submits.get() + 1);
                Ok(())
            })
            .unwrap();
    }
    edit_name("Pond");
    click("away");
    click("saveAndContinueBtn");

    assert_eq!(submits.get(), 1);
    assert!(!form_protect::is_dirty("site"));
}

#[wasm_bindgen_test]
fn leave_replays_cancel_click_once() {
    setup(PAGE_HTML);
    let clicks = Rc::new(Cell::new(0));
    {
        let clicks = Rc::clone(&clicks);
        element("cancel")
            .add_event_listener_and_forget("click", move |_: web_sys::Event| {
                clicks.set(clicks.get() + 1);
                Ok(())
            })
            .unwrap();
    }
    edit_name("Pond");
    click("cancel");
    assert!(modal_shown());
    assert_eq!(clicks.get(), 1);

    click("leaveWithoutSavingBtn");
    // The replayed click reaches the page's own handler without being guarded again.
    assert_eq!(clicks.get(), 2);
    assert!(!modal_shown());
    assert!(!form_protect::is_dirty("site"));
}
