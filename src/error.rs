use std::fmt;


#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AjaxError {
    Network(String),
    HttpStatus(u16),
    MalformedResponse(String),
}

impl fmt::Display for AjaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AjaxError::Network(message) => write!(f, "Network error: {message}"),
            AjaxError::HttpStatus(status) => write!(f, "Server responded with status {status}"),
            AjaxError::MalformedResponse(message) => write!(f, "Malformed response: {message}"),
        }
    }
}

impl std::error::Error for AjaxError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GlueError {
    Config(String),
}

impl fmt::Display for GlueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GlueError::Config(message) => write!(f, "Invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for GlueError {}
