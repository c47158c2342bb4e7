// Django's CSRF middleware looks for the token under this name in POST bodies.
pub const CSRF_FIELD_NAME: &str = "csrfmiddlewaretoken";

// A POST that a delete button performs after the user confirms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteRequest {
    pub url: String,
    pub csrf_token: String,
}

impl DeleteRequest {
    // From the button's `data-delete-url` and `data-csrf-token`. Without a URL there is nothing to
    // post to; a missing token is sent empty and left for the server to reject.
    pub fn from_data(url: Option<&str>, csrf_token: Option<&str>) -> Option<Self> {
        let url = url.map(str::trim).filter(|url| !url.is_empty())?;
        Some(DeleteRequest {
            url: url.to_owned(),
            csrf_token: csrf_token.unwrap_or_default().to_owned(),
        })
    }

    pub fn form_fields(&self) -> [(&str, &str); 1] { [(CSRF_FIELD_NAME, self.csrf_token.as_str())] }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_url() {
        assert_eq!(DeleteRequest::from_data(None, Some("t")), None);
        assert_eq!(DeleteRequest::from_data(Some("  "), Some("t")), None);
        let request = DeleteRequest::from_data(Some("/equipment/3/delete/"), None).unwrap();
        assert_eq!(request.form_fields(), [("csrfmiddlewaretoken", "")]);
    }
}
