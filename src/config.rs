//! Page-level configuration. Every field has a default matching the markup conventions of the
//! server-rendered templates, so an empty JSON object (or no configuration at all) is valid.

use serde::{Deserialize, Serialize};

use crate::dirty::DirtyPolicy;
use crate::error::GlueError;


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlueConfig {
    pub log_level: LogLevel,
    pub dirty_policy: DirtyPolicy,
    pub form_protect: FormProtectConfig,
    pub formset: FormsetConfig,
    pub ajax_modal: AjaxModalConfig,
    pub delete_button: DeleteButtonConfig,
}

impl GlueConfig {
    pub fn from_json(json: &str) -> Result<Self, GlueError> {
        if json.trim().is_empty() {
            return Ok(GlueConfig::default());
        }
        serde_json::from_str(json).map_err(|err| GlueError::Config(err.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormProtectConfig {
    // Forms carrying this attribute are tracked; its value names the form.
    pub form_name_attr: String,
    pub form_label_attr: String,
    pub modal_id: String,
    pub message_id: String,
    pub stay_button_id: String,
    pub leave_button_id: String,
    pub save_button_id: String,
    pub message_template: String,
    pub bypass_attr: String,
    pub cancel_class: String,
    pub exempt_classes: Vec<String>,
    pub next_field_name: String,
}

impl Default for FormProtectConfig {
    fn default() -> Self {
        FormProtectConfig {
            form_name_attr: "data-form-name".to_owned(),
            form_label_attr: "data-form-label".to_owned(),
            modal_id: "unsavedChangesModal".to_owned(),
            message_id: "unsavedChangesMessage".to_owned(),
            stay_button_id: "stayOnPageBtn".to_owned(),
            leave_button_id: "leaveWithoutSavingBtn".to_owned(),
            save_button_id: "saveAndContinueBtn".to_owned(),
            message_template: "You have unsaved changes in the {label}.".to_owned(),
            bypass_attr: "data-bypass-protect".to_owned(),
            cancel_class: "btn-cancel".to_owned(),
            exempt_classes: vec!["btn-delete".to_owned(), "ajax-modal-link".to_owned()],
            next_field_name: "next".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsetConfig {
    pub add_button_class: String,
    pub remove_button_class: String,
    pub prefix_attr: String,
    pub row_class: String,
    pub toast_id: String,
    pub highlight_class: String,
    pub remove_confirm_message: String,
    pub validation_message_selector: String,
}

impl Default for FormsetConfig {
    fn default() -> Self {
        FormsetConfig {
            add_button_class: "add-form-row".to_owned(),
            remove_button_class: "remove-form-row".to_owned(),
            prefix_attr: "data-formset-prefix".to_owned(),
            row_class: "formset-row".to_owned(),
            toast_id: "formset-toast".to_owned(),
            highlight_class: "formset-row-highlight".to_owned(),
            remove_confirm_message: "This row contains data. Remove it?".to_owned(),
            validation_message_selector: ".invalid-feedback, .help-block, .errorlist".to_owned(),
        }
    }
}

impl FormsetConfig {
    pub fn container_id(&self, prefix: &str) -> String { format!("{prefix}-formset") }
    pub fn template_id(&self, prefix: &str) -> String { format!("{prefix}-empty-form") }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AjaxModalConfig {
    pub modal_id: String,
    pub link_class: String,
    pub form_id: String,
    pub title_attr: String,
    pub table_body_selector: String,
    pub row_id_prefix: String,
    pub network_error_message: String,
}

impl Default for AjaxModalConfig {
    fn default() -> Self {
        AjaxModalConfig {
            modal_id: "ajaxModal".to_owned(),
            link_class: "ajax-modal-link".to_owned(),
            form_id: "ajaxForm".to_owned(),
            title_attr: "data-modal-title".to_owned(),
            table_body_selector: "#equipment-table tbody".to_owned(),
            row_id_prefix: "equip-row-".to_owned(),
            network_error_message: "Could not reach the server. Please try again.".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteButtonConfig {
    pub button_class: String,
    pub url_attr: String,
    pub csrf_token_attr: String,
    pub confirm_message: String,
}

impl Default for DeleteButtonConfig {
    fn default() -> Self {
        DeleteButtonConfig {
            button_class: "btn-delete".to_owned(),
            url_attr: "data-delete-url".to_owned(),
            csrf_token_attr: "data-csrf-token".to_owned(),
            confirm_message: "Are you sure you want to delete this item?".to_owned(),
        }
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(GlueConfig::from_json("").unwrap(), GlueConfig::default());
        assert_eq!(GlueConfig::from_json("{}").unwrap(), GlueConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = GlueConfig::from_json(
            r#"{"log_level": "debug", "dirty_policy": "any_edit", "formset": {"toast_id": "t"}}"#,
        )
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.dirty_policy, DirtyPolicy::AnyEdit);
        assert_eq!(config.formset.toast_id, "t");
        assert_eq!(config.formset.row_class, "formset-row");
        assert_eq!(config.formset.container_id("doi"), "doi-formset");
    }

    #[test]
    fn invalid_config() {
        assert!(matches!(GlueConfig::from_json("{"), Err(GlueError::Config(_))));
        assert!(matches!(
            GlueConfig::from_json(r#"{"dirty_policy": "sometimes"}"#),
            Err(GlueError::Config(_))
        ));
    }
}
