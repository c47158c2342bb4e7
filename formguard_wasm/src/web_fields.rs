use formguard::field::{FieldKind, FieldState};
use formguard::snapshot::FieldSnapshot;
use wasm_bindgen::JsCast;

use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;
use crate::web_iterators::HtmlCollectionIterator;


pub const FIELD_SELECTORS: &str = "input, select, textarea";

// Reads a form control. `None` for elements that are not form controls.
pub fn read_field(element: &web_sys::Element) -> Option<FieldState> {
    if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
        let kind = FieldKind::from_input_type(&input.type_());
        return Some(
            FieldState::new(input.name(), kind, input.value())
                .with_id(input.id())
                .with_checked(input.checked()),
        );
    }
    if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
        if select.multiple() {
            return Some(
                FieldState::new(select.name(), FieldKind::SelectMultiple, "")
                    .with_id(select.id())
                    .with_selected(selected_values(select)),
            );
        }
        return Some(
            FieldState::new(select.name(), FieldKind::Select, select.value()).with_id(select.id()),
        );
    }
    if let Some(textarea) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        return Some(
            FieldState::new(textarea.name(), FieldKind::Textarea, textarea.value())
                .with_id(textarea.id()),
        );
    }
    None
}

// Writes name, id, value and checked state back. Values of file inputs can only be cleared.
pub fn write_field(element: &web_sys::Element, field: &FieldState) -> JsResult<()> {
    set_or_remove_attribute(element, "name", &field.name)?;
    set_or_remove_attribute(element, "id", &field.id)?;
    if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
        if field.kind.is_checkable() {
            input.set_checked(field.checked);
        } else if field.kind != FieldKind::File || field.value.is_empty() {
            input.set_value(&field.value);
        }
    } else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
        if field.kind == FieldKind::SelectMultiple {
            for option in options(select) {
                option.set_selected(field.selected.contains(&option.value()));
            }
        } else {
            select.set_value(&field.value);
        }
    } else if let Some(textarea) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
        textarea.set_value(&field.value);
    }
    Ok(())
}

fn options(select: &web_sys::HtmlSelectElement) -> Vec<web_sys::HtmlOptionElement> {
    // `HtmlOptionsCollection` derefs to `HtmlCollection`.
    let options: &web_sys::HtmlCollection = &select.options();
    HtmlCollectionIterator::from(options.clone())
        .filter_map(|e| e.dyn_into::<web_sys::HtmlOptionElement>().ok())
        .collect()
}

fn selected_values(select: &web_sys::HtmlSelectElement) -> Vec<String> {
    options(select).into_iter().filter(|o| o.selected()).map(|o| o.value()).collect()
}

fn set_or_remove_attribute(element: &web_sys::Element, name: &str, value: &str) -> JsResult<()> {
    if value.is_empty() {
        element.remove_attribute(name)
    } else {
        element.set_attribute(name, value)
    }
}

pub fn field_elements(container: &web_sys::Element) -> JsResult<Vec<web_sys::Element>> {
    Ok(container.find_all(FIELD_SELECTORS)?.collect())
}

// Elements paired with their state, in document order.
pub fn read_fields(container: &web_sys::Element) -> JsResult<Vec<(web_sys::Element, FieldState)>> {
    Ok(field_elements(container)?
        .into_iter()
        .filter_map(|element| read_field(&element).map(|state| (element, state)))
        .collect())
}

pub fn capture(container: &web_sys::Element) -> JsResult<FieldSnapshot> {
    let fields = read_fields(container)?;
    Ok(FieldSnapshot::capture(fields.iter().map(|(_, state)| state)))
}
