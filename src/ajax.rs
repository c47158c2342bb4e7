//! Wire contract of the AJAX modal: a `GET` that returns the form markup and a form-encoded
//! `POST` that either saves the object (and returns its table row) or returns the form again
//! with validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AjaxError;


pub const AJAX_HEADER_NAME: &str = "X-Requested-With";
pub const AJAX_HEADER_VALUE: &str = "XMLHttpRequest";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalFormResponse {
    pub html: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ObjectId::Int(id) => write!(f, "{id}"),
            ObjectId::Str(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalSubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub object_id: Option<ObjectId>,
    #[serde(default)]
    pub row_html: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitResult {
    // The object was saved. Without `row_html` there is nothing to put into the table.
    Saved { object_id: Option<ObjectId>, row_html: Option<String> },
    // Validation failed; the modal body is replaced with the re-rendered form.
    Invalid { html: String },
}

pub fn parse_form_response(body: &str) -> Result<ModalFormResponse, AjaxError> {
    serde_json::from_str(body).map_err(|err| AjaxError::MalformedResponse(err.to_string()))
}

pub fn parse_submit_response(body: &str) -> Result<SubmitResult, AjaxError> {
    let response: ModalSubmitResponse =
        serde_json::from_str(body).map_err(|err| AjaxError::MalformedResponse(err.to_string()))?;
    if response.success {
        Ok(SubmitResult::Saved { object_id: response.object_id, row_html: response.row_html })
    } else {
        match response.html {
            Some(html) => Ok(SubmitResult::Invalid { html }),
            None => Err(AjaxError::MalformedResponse(
                "failed submission without form markup".to_owned(),
            )),
        }
    }
}

pub fn row_element_id(row_id_prefix: &str, object_id: &ObjectId) -> String {
    format!("{row_id_prefix}{object_id}")
}

// Identifies one modal request. Only the most recently issued token is current: a response that
// arrives for an older one has been superseded by a later click and must be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Clone, Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn new() -> Self { Self::default() }

    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool { token.0 == self.latest }

    // Makes every outstanding token stale, e.g. when the modal is closed.
    pub fn invalidate(&mut self) { self.latest += 1; }
}
