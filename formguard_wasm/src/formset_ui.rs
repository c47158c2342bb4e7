// Add/remove buttons of dynamic formsets. See `formguard::formset` for the markup contract.
//
// Missing pieces of markup (container, template, counter) turn the buttons into no-ops.

use std::rc::Rc;

use formguard::config::FormsetConfig;
use formguard::field::{AFFIRMATIVE, FieldState};
use formguard::formset::{parse_row_index, total_forms_name};
use formguard::{AddRowOutcome, FieldSnapshot, FormsetGroup, GlueConfig, RemoveRowOutcome, Row};
use itertools::Itertools;
use wasm_bindgen::JsCast;

use crate::form_protect;
use crate::web_document::{confirm, web_document};
use crate::web_element_ext::{WebElementExt, event_target_element, listen_and_forget};
use crate::web_error_handling::JsResult;
use crate::web_fields::{read_field, read_fields, write_field};
use crate::web_util::{flash_element, focus_first_field, scroll_into_view};


pub const ROW_ADDED_EVENT: &str = "formguard:row-added";

const TOAST_MILLIS: i32 = 5000;
const HIGHLIGHT_MILLIS: i32 = 2000;

// A formset as found on the page, with the planning model built from it.
struct DomFormset {
    container: web_sys::Element,
    template: web_sys::Element,
    total_forms: web_sys::HtmlInputElement,
    // Parallel to `group.rows()`.
    row_elements: Vec<web_sys::Element>,
    group: FormsetGroup,
}

impl DomFormset {
    fn read(config: &FormsetConfig, prefix: &str) -> JsResult<Option<Self>> {
        let document = web_document()?;
        let Some(container) = document.get_element_by_id(&config.container_id(prefix)) else {
            log::debug!("Formset \"{prefix}\": container not found");
            return Ok(None);
        };
        let Some(template) = document.get_element_by_id(&config.template_id(prefix)) else {
            log::debug!("Formset \"{prefix}\": template row not found");
            return Ok(None);
        };
        // The management form is usually rendered inside the container, but not always.
        let total_forms_selector = format!("input[name=\"{}\"]", total_forms_name(prefix));
        let total_forms = match container.find(&total_forms_selector)? {
            Some(input) => Some(input),
            None => document.query_selector(&total_forms_selector)?,
        }
        .and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok());
        let Some(total_forms) = total_forms else {
            log::debug!("Formset \"{prefix}\": TOTAL_FORMS field not found");
            return Ok(None);
        };
        let Ok(total) = total_forms.value().trim().parse::<usize>() else {
            log::warn!(
                "Formset \"{prefix}\": TOTAL_FORMS is not a number: {:?}",
                total_forms.value()
            );
            return Ok(None);
        };

        let template_fields = read_fields(&template)?.into_iter().map(|(_, state)| state).collect();
        let mut row_elements = Vec::new();
        let mut rows = Vec::new();
        let row_elements_found = container.find_all(&format!(".{}", config.row_class))?;
        for (position, element) in row_elements_found.enumerate() {
            if element.id() == template.id() {
                continue;
            }
            rows.push(read_row(prefix, &element, position)?);
            row_elements.push(element);
        }
        let group = FormsetGroup::new(prefix, rows, total, template_fields);
        Ok(Some(DomFormset { container, template, total_forms, row_elements, group }))
    }

    fn row_element(&self, index: usize) -> Option<&web_sys::Element> {
        let position = self.group.rows().iter().position(|r| r.index == index)?;
        self.row_elements.get(position)
    }
}

fn read_row(prefix: &str, element: &web_sys::Element, position: usize) -> JsResult<Row> {
    let fields: Vec<FieldState> =
        read_fields(element)?.into_iter().map(|(_, state)| state).collect();
    let index = fields
        .iter()
        .find_map(|f| parse_row_index(prefix, &f.name))
        .unwrap_or(position);
    let deleted = fields
        .iter()
        .find(|f| f.is_delete_flag())
        .is_some_and(|f| if f.kind.is_checkable() { f.checked } else { is_affirmative(&f.value) });
    let mut row = Row::new(index, fields);
    row.deleted = deleted;
    row.hidden = !element.is_displayed();
    Ok(row)
}

fn is_affirmative(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

pub fn install(config: Rc<GlueConfig>) -> JsResult<()> {
    let document = web_document()?;
    let add_buttons = document
        .query_selector_all(&format!(".{}", config.formset.add_button_class))?
        .collect_vec();
    for button in &add_buttons {
        let config = Rc::clone(&config);
        button.add_event_listener_and_forget("click", move |event: web_sys::Event| {
            event.prevent_default();
            let button = event
                .current_target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok());
            let Some(button) = button else {
                return Ok(());
            };
            match button.get_attribute(&config.formset.prefix_attr) {
                Some(prefix) => add_row(&config.formset, &prefix),
                None => {
                    log::warn!("Add-row button without \"{}\"", config.formset.prefix_attr);
                    Ok(())
                }
            }
        })?;
    }
    // Delegated, so that remove buttons inside rows added later work too.
    listen_and_forget(document.raw(), "click", move |event: web_sys::Event| {
        let Some(target) = event_target_element(&event) else {
            return Ok(());
        };
        let remove_selector = format!(".{}", config.formset.remove_button_class);
        let Some(button) = target.closest(&remove_selector)? else {
            return Ok(());
        };
        event.prevent_default();
        remove_row(&config.formset, &button)
    })?;
    log::debug!("Formset glue installed, {} add button(s)", add_buttons.len());
    Ok(())
}

pub fn add_row(config: &FormsetConfig, prefix: &str) -> JsResult<()> {
    let Some(mut formset) = DomFormset::read(config, prefix)? else {
        return Ok(());
    };
    match formset.group.add_row() {
        AddRowOutcome::RejectedEmptyRow(position) => {
            log::debug!("Formset \"{prefix}\": not adding a row while row {position} is empty");
            if let Some(toast) = web_document()?.get_element_by_id(&config.toast_id) {
                flash_element(&toast, "show", TOAST_MILLIS)?;
            }
            if let Some(row) = formset.row_elements.get(position) {
                scroll_into_view(row);
                flash_element(row, &config.highlight_class, HIGHLIGHT_MILLIS)?;
                focus_first_field(row)?;
            }
            Ok(())
        }
        AddRowOutcome::Added(row) => {
            let new_row = insert_row(config, &formset, &row)?;
            formset.total_forms.set_value(&formset.group.total_forms().to_string());
            let counter = FieldSnapshot::capture(read_field(&formset.total_forms).as_ref());
            form_protect::extend_baseline(&new_row, row.snapshot(), counter)?;
            new_row.dispatch_custom_event(ROW_ADDED_EVENT)?;
            log::debug!("Formset \"{prefix}\": added row {}", row.index);
            Ok(())
        }
    }
}

fn insert_row(
    config: &FormsetConfig, formset: &DomFormset, row: &Row,
) -> JsResult<web_sys::Element> {
    let new_row: web_sys::Element = formset.template.clone_node_with_deep(true)?.dyn_into()?;
    new_row.remove_attribute("id")?;
    new_row.set_displayed(true)?;
    if !new_row.has_class(&config.row_class) {
        new_row.class_list().add_1(&config.row_class)?;
    }
    // The clone has the template's fields in the same document order, which is the order
    // `reindex_row` saw them in.
    let elements = read_fields(&new_row)?;
    if elements.len() != row.fields.len() {
        log::warn!(
            "Template fields changed while adding a row: {} vs {}",
            elements.len(),
            row.fields.len()
        );
    }
    for ((element, _), field) in elements.iter().zip(&row.fields) {
        write_field(element, field)?;
    }
    for message in new_row.find_all(&config.validation_message_selector)? {
        message.set_inner_html("");
        message.set_displayed(false)?;
    }
    formset.container.insert_before(&new_row, Some(&formset.template))?;
    Ok(new_row)
}

pub fn remove_row(config: &FormsetConfig, button: &web_sys::Element) -> JsResult<()> {
    let Some(row_element) = button.closest(&format!(".{}", config.row_class))? else {
        return Ok(());
    };
    let Some(prefix) = button
        .get_attribute(&config.prefix_attr)
        .or_else(|| prefix_from_ancestors(&row_element))
    else {
        log::debug!("Remove button outside of any formset");
        return Ok(());
    };
    let Some(mut formset) = DomFormset::read(config, &prefix)? else {
        return Ok(());
    };
    let Some(position) = formset.row_elements.iter().position(|e| e == &row_element) else {
        return Ok(());
    };
    let index = formset.group.rows()[position].index;
    match formset.group.remove_row(index, || confirm(&config.remove_confirm_message)) {
        RemoveRowOutcome::NotFound | RemoveRowOutcome::Declined => Ok(()),
        RemoveRowOutcome::SoftDeleted => {
            let Some(element) = formset.row_element(index).cloned() else {
                return Ok(());
            };
            let Some(row) = formset.group.row(index) else {
                return Ok(());
            };
            soft_delete(&element, row)?;
            form_protect::refresh(&element)?;
            log::debug!("Formset \"{prefix}\": row {index} marked for deletion");
            Ok(())
        }
    }
}

// Sets the deletion flag (creating it if the row has none) and hides the row. The row's fields
// stay in the form.
fn soft_delete(element: &web_sys::Element, row: &Row) -> JsResult<()> {
    let Some(flag) = row.delete_field() else {
        return Ok(());
    };
    let existing = read_fields(element)?.into_iter().find(|(_, state)| state.is_delete_flag());
    match existing {
        Some((flag_element, state)) => {
            if let Some(input) = flag_element.dyn_ref::<web_sys::HtmlInputElement>() {
                if state.kind.is_checkable() {
                    input.set_checked(true);
                } else {
                    input.set_value(AFFIRMATIVE);
                }
            }
        }
        None => {
            let input = web_document()?
                .create_element("input")?
                .with_attribute("type", "hidden")?
                .with_attribute("name", &flag.name)?
                .with_attribute("value", AFFIRMATIVE)?;
            element.append_child(&input)?;
        }
    }
    element.set_displayed(false)
}

fn prefix_from_ancestors(row: &web_sys::Element) -> Option<String> {
    let container = row.closest("[id$=\"-formset\"]").ok()??;
    container.id().strip_suffix("-formset").map(str::to_owned)
}
