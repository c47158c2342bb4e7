// Unsaved-changes protection: tracks `form[data-form-name]` forms and intercepts navigation away
// from the page while any of them is dirty.
//
// Listeners never capture form elements: the form is recovered from the event, so a form removed
// from the page can be collected.

use std::cell::RefCell;
use std::rc::Rc;

use formguard::config::FormProtectConfig;
use formguard::guard::{ChoiceOutcome, unsaved_changes_message};
use formguard::{
    ClickTarget, DirtyState, DirtyTracker, FieldSnapshot, GlueConfig, GuardAction, GuardDecision,
    ModalChoice, NavigationCandidate, NavigationGuard,
};
use wasm_bindgen::JsCast;

use crate::web_document::{WebDocument, confirm, navigate_to, web_document, web_window};
use crate::web_element_ext::{WebElementExt, event_target_element, listen_and_forget};
use crate::web_error_handling::JsResult;
use crate::web_fields::capture;
use crate::web_util::set_modal_shown;


struct FormProtect {
    config: Rc<GlueConfig>,
    tracker: DirtyTracker,
    guard: NavigationGuard,
    // Clicked element without a URL, repeated if the user chooses to leave.
    deferred_element: Option<web_sys::HtmlElement>,
    replaying: bool,
}

thread_local! {
    static STATE: RefCell<Option<FormProtect>> = const { RefCell::new(None) };
}

// Never call back into the page from inside `f`: DOM calls may dispatch events synchronously and
// the listeners need the state again.
fn with_state<R>(f: impl FnOnce(&mut FormProtect) -> R) -> Option<R> {
    STATE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn tracked_form_selector(config: &FormProtectConfig) -> String {
    format!("form[{}]", config.form_name_attr)
}

fn tracked_forms(
    document: &WebDocument, config: &FormProtectConfig,
) -> JsResult<Vec<(web_sys::Element, String)>> {
    Ok(document
        .query_selector_all(&tracked_form_selector(config))?
        .filter_map(|form| {
            let name = form.get_attribute(&config.form_name_attr)?;
            Some((form, name))
        })
        .collect())
}

fn find_tracked_form(
    config: &FormProtectConfig, form_name: &str,
) -> JsResult<Option<web_sys::Element>> {
    let document = web_document()?;
    Ok(tracked_forms(&document, config)?
        .into_iter()
        .find(|(_, name)| name == form_name)
        .map(|(form, _)| form))
}

// The tracked form containing `element` (or being it), with its name.
fn enclosing_tracked_form(
    config: &FormProtectConfig, element: &web_sys::Element,
) -> JsResult<Option<(web_sys::Element, String)>> {
    let Some(form) = element.closest(&tracked_form_selector(config))? else {
        return Ok(None);
    };
    Ok(form.get_attribute(&config.form_name_attr).map(|name| (form, name)))
}

pub fn install(config: Rc<GlueConfig>) -> JsResult<()> {
    let document = web_document()?;
    let protect_config = &config.form_protect;
    let forms = tracked_forms(&document, protect_config)?;

    let mut tracker = DirtyTracker::new(config.dirty_policy);
    for (form, name) in &forms {
        let label = form.get_attribute(&protect_config.form_label_attr).unwrap_or_default();
        tracker.track(name, &label, capture(form)?);
    }
    log::debug!("Tracking {} form(s) for unsaved changes", forms.len());

    STATE.with(|cell| {
        *cell.borrow_mut() = Some(FormProtect {
            config: Rc::clone(&config),
            tracker,
            guard: NavigationGuard::new(),
            deferred_element: None,
            replaying: false,
        })
    });

    for (form, _) in &forms {
        form.add_event_listener_and_forget("input", on_form_edit)?;
        form.add_event_listener_and_forget("change", on_form_edit)?;
        form.add_event_listener_and_forget("submit", on_form_submit)?;
    }
    listen_and_forget(document.raw(), "click", on_click)?;
    listen_and_forget(&web_window()?.into(), "beforeunload", on_before_unload)?;

    match document.get_element_by_id(&protect_config.modal_id) {
        Some(modal) => {
            for (button_id, choice) in [
                (&protect_config.stay_button_id, ModalChoice::Stay),
                (&protect_config.leave_button_id, ModalChoice::Leave),
                (&protect_config.save_button_id, ModalChoice::SaveAndContinue),
            ] {
                if let Some(button) = modal.find(&format!("#{button_id}"))? {
                    button.add_event_listener_and_forget("click", move |event: web_sys::Event| {
                        event.prevent_default();
                        on_choice(choice)
                    })?;
                }
            }
        }
        None if !forms.is_empty() => {
            log::warn!(
                "Unsaved changes modal \"{}\" not found, falling back to confirm()",
                protect_config.modal_id
            );
        }
        None => {}
    }
    Ok(())
}

fn form_from_event(event: &web_sys::Event) -> Option<(web_sys::Element, String)> {
    let form = event.current_target()?.dyn_into::<web_sys::Element>().ok()?;
    let attr = with_state(|s| s.config.form_protect.form_name_attr.clone())?;
    let name = form.get_attribute(&attr)?;
    Some((form, name))
}

fn on_form_edit(event: web_sys::Event) -> JsResult<()> {
    let Some((form, name)) = form_from_event(&event) else {
        return Ok(());
    };
    let live = capture(&form)?;
    let state = with_state(|s| s.tracker.on_edit(&name, &live)).flatten();
    log::trace!("Form \"{name}\" edited: {state:?}");
    Ok(())
}

fn on_form_submit(event: web_sys::Event) -> JsResult<()> {
    let Some((form, name)) = form_from_event(&event) else {
        return Ok(());
    };
    let live = capture(&form)?;
    with_state(|s| s.tracker.mark_clean(&name, live));
    log::debug!("Form \"{name}\" submitted, marked clean");
    Ok(())
}

fn click_target(config: &FormProtectConfig, element: &web_sys::Element) -> ClickTarget {
    ClickTarget {
        href: element.get_attribute("href"),
        download: element.has_attribute("download"),
        bypass: element.has_attribute(&config.bypass_attr),
        cancel: element.has_class(&config.cancel_class),
        exempt: element.has_any_class(&config.exempt_classes),
    }
}

fn on_click(event: web_sys::MouseEvent) -> JsResult<()> {
    if event.default_prevented() {
        return Ok(());
    }
    let Some(element) = event_target_element(&event) else {
        return Ok(());
    };
    let Some(element) = element.closest("a, button")? else {
        return Ok(());
    };
    if with_state(|s| std::mem::take(&mut s.replaying)).unwrap_or(false) {
        return Ok(());
    }
    let Some(config) = with_state(|s| Rc::clone(&s.config)) else {
        return Ok(());
    };
    let Some(candidate) = click_target(&config.form_protect, &element).classify() else {
        return Ok(());
    };
    prune_detached_forms(&config.form_protect)?;

    let deferred = with_state(|s| {
        if s.guard.guard(&s.tracker, candidate) == GuardDecision::Proceed {
            return None;
        }
        s.deferred_element = element.clone().dyn_into::<web_sys::HtmlElement>().ok();
        let label = s.tracker.active_form().map(|f| f.label().to_owned()).unwrap_or_default();
        Some(unsaved_changes_message(&config.form_protect.message_template, &label))
    })
    .flatten();
    let Some(message) = deferred else {
        return Ok(());
    };

    event.prevent_default();
    let document = web_document()?;
    match document.get_element_by_id(&config.form_protect.modal_id) {
        Some(modal) => {
            let message_selector = format!("#{}", config.form_protect.message_id);
            if let Some(message_node) = modal.find(&message_selector)? {
                message_node.set_text_content(Some(&message));
            }
            set_modal_shown(&modal, true)
        }
        None => on_choice(if confirm(&message) { ModalChoice::Leave } else { ModalChoice::Stay }),
    }
}

fn on_choice(choice: ModalChoice) -> JsResult<()> {
    let Some((outcome, deferred_element, config)) = with_state(|s| {
        let outcome = s.guard.choose(&mut s.tracker, choice);
        (outcome, s.deferred_element.take(), Rc::clone(&s.config))
    }) else {
        return Ok(());
    };
    let ChoiceOutcome { action, modal_changed } = outcome;
    if modal_changed {
        if let Some(modal) = web_document()?.get_element_by_id(&config.form_protect.modal_id) {
            set_modal_shown(&modal, false)?;
        }
    }
    match action {
        GuardAction::None => Ok(()),
        GuardAction::Navigate(url) => navigate_to(&url),
        GuardAction::ReplayClick => {
            if let Some(element) = deferred_element {
                with_state(|s| s.replaying = true);
                element.click();
                with_state(|s| s.replaying = false);
            }
            Ok(())
        }
        GuardAction::SubmitForm { form_name, next } => {
            save_and_continue(&config.form_protect, &form_name, next.as_deref())
        }
    }
}

fn save_and_continue(
    config: &FormProtectConfig, form_name: &str, next: Option<&str>,
) -> JsResult<()> {
    let Some(form) = find_tracked_form(config, form_name)? else {
        log::warn!("Form \"{form_name}\" disappeared before it could be saved");
        return Ok(());
    };
    if let Some(next) = next {
        let next_input = form.find(&format!("input[name=\"{}\"]", config.next_field_name))?;
        match next_input.and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok()) {
            Some(input) => input.set_value(next),
            None => log::debug!("Form \"{form_name}\" has no redirect field, server decides"),
        }
    }
    let form: web_sys::HtmlFormElement = form.dyn_into()?;
    // `requestSubmit` runs validation and fires `submit`, which marks the form clean.
    if form.request_submit().is_err() {
        let live = capture(&form)?;
        with_state(|s| s.tracker.mark_clean(form_name, live));
        form.submit()?;
    }
    Ok(())
}

fn on_before_unload(event: web_sys::BeforeUnloadEvent) -> JsResult<()> {
    let decision = with_state(|s| s.guard.guard(&s.tracker, NavigationCandidate::Unload));
    if decision == Some(GuardDecision::Deferred) {
        // The browser shows its own prompt; custom text is ignored by modern browsers.
        event.prevent_default();
        event.set_return_value("");
    }
    Ok(())
}

fn prune_detached_forms(config: &FormProtectConfig) -> JsResult<()> {
    let names: Vec<String> =
        tracked_forms(&web_document()?, config)?.into_iter().map(|(_, name)| name).collect();
    with_state(|s| s.tracker.retain_forms(names.iter().map(String::as_str)));
    Ok(())
}

// Called for rows inserted after page load: their blank values join the baseline of the
// enclosing tracked form and `updated` (the row counter) replaces its old baseline, so adding a
// row alone does not make the form dirty.
pub fn extend_baseline(
    row: &web_sys::Element, row_snapshot: FieldSnapshot, updated: FieldSnapshot,
) -> JsResult<()> {
    let Some(config) = with_state(|s| Rc::clone(&s.config)) else {
        return Ok(());
    };
    let Some((_, name)) = enclosing_tracked_form(&config.form_protect, row)? else {
        return Ok(());
    };
    with_state(|s| {
        s.tracker.extend_snapshot(&name, row_snapshot);
        s.tracker.rebase_snapshot(&name, updated);
    });
    Ok(())
}

// Re-evaluates the form containing `element` after a programmatic change, which fires no
// `input` event.
pub fn refresh(element: &web_sys::Element) -> JsResult<Option<DirtyState>> {
    let Some(config) = with_state(|s| Rc::clone(&s.config)) else {
        return Ok(None);
    };
    let Some((form, name)) = enclosing_tracked_form(&config.form_protect, element)? else {
        return Ok(None);
    };
    let live = capture(&form)?;
    Ok(with_state(|s| s.tracker.on_edit(&name, &live)).flatten())
}

pub fn any_dirty() -> bool { with_state(|s| s.tracker.any_dirty()).unwrap_or(false) }

pub fn is_dirty(form_name: &str) -> bool {
    with_state(|s| s.tracker.is_dirty(form_name)).unwrap_or(false)
}

pub fn mark_clean(form_name: &str) -> JsResult<()> {
    let Some(config) = with_state(|s| Rc::clone(&s.config)) else {
        return Ok(());
    };
    if let Some(form) = find_tracked_form(&config.form_protect, form_name)? {
        let live = capture(&form)?;
        with_state(|s| s.tracker.mark_clean(form_name, live));
    }
    Ok(())
}
