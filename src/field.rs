use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};


// Mirrors the `type` attribute of form controls. Unknown `<input>` types (e.g. "email", "date")
// behave like text for all our purposes, hence the `default` fallback in `from_input_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    Text,
    Hidden,
    Checkbox,
    Radio,
    File,
    Select,
    // `<select multiple>`; the DOM reports its type as "select-multiple".
    #[strum(serialize = "select-multiple")]
    SelectMultiple,
    Textarea,
    Submit,
    Reset,
    Button,
    Image,
}

impl FieldKind {
    pub fn from_input_type(input_type: &str) -> Self {
        input_type.trim().to_ascii_lowercase().parse().unwrap_or(FieldKind::Text)
    }

    pub fn is_checkable(self) -> bool { matches!(self, FieldKind::Checkbox | FieldKind::Radio) }

    // Controls that never carry user data.
    pub fn is_action(self) -> bool {
        matches!(self, FieldKind::Submit | FieldKind::Reset | FieldKind::Button | FieldKind::Image)
    }
}

// Live state of a single named form control, as read from the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub name: String,
    pub id: String,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    // Values of the selected options; only used by `SelectMultiple`.
    pub selected: Vec<String>,
}

impl FieldState {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        FieldState {
            name: name.into(),
            id: String::new(),
            kind,
            value: value.into(),
            checked: false,
            selected: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
    pub fn with_selected<S: Into<String>>(mut self, selected: impl IntoIterator<Item = S>) -> Self {
        self.selected = selected.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_trackable(&self) -> bool { !self.name.is_empty() && !self.kind.is_action() }

    pub fn is_delete_flag(&self) -> bool { self.name.ends_with(DELETE_SUFFIX) }

    // Whether the user has put anything into the field. Checkables count only when checked:
    // their `value` attribute is static markup.
    pub fn has_data(&self) -> bool {
        match self.kind {
            FieldKind::Checkbox | FieldKind::Radio => self.checked,
            FieldKind::SelectMultiple => !self.selected.is_empty(),
            _ => !self.value.trim().is_empty(),
        }
    }

    // Resets the field the way a freshly cloned row should look.
    pub fn clear(&mut self) {
        match self.kind {
            FieldKind::Checkbox | FieldKind::Radio => self.checked = false,
            FieldKind::SelectMultiple => self.selected.clear(),
            _ => self.value.clear(),
        }
    }

    // What this control contributes to the submitted value of its name. Checkables keep their
    // markup `value`, so they contribute it only while checked.
    pub fn submitted_values(&self) -> Vec<String> {
        match self.kind {
            FieldKind::Checkbox | FieldKind::Radio => {
                if self.checked { vec![self.value.clone()] } else { Vec::new() }
            }
            FieldKind::SelectMultiple => self.selected.clone(),
            _ => vec![self.value.clone()],
        }
    }
}

pub const DELETE_SUFFIX: &str = "-DELETE";
pub const TOTAL_FORMS_SUFFIX: &str = "-TOTAL_FORMS";

// Value Django's `CheckboxInput` interprets as true.
pub const AFFIRMATIVE: &str = "on";
