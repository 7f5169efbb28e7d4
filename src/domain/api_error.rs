use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A failure reported by (or about a response from) the Textfully API.
///
/// `status_code` is `0` when no HTTP response was obtained (a timeout). `raw_response` is only set
/// when the response body could not be decoded, and carries the decoder's message.
pub struct ApiError {
    pub status_code: u16,
    pub error_type: String,
    pub message: String,
    pub raw_response: Option<String>,
}

impl ApiError {
    /// Error decoded from a well-formed `{"error": {"type", "message"}}` envelope.
    pub fn new(status_code: u16, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error_type: error_type.into(),
            message: message.into(),
            raw_response: None,
        }
    }

    /// Error for a response body that did not decode as expected.
    pub fn undecodable(
        status_code: u16,
        message: impl Into<String>,
        raw_response: impl Into<String>,
    ) -> Self {
        Self {
            status_code,
            error_type: String::new(),
            message: message.into(),
            raw_response: Some(raw_response.into()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_type.is_empty() {
            write!(f, "textfully: {}", self.message)
        } else {
            write!(f, "textfully: {} (type: {})", self.message, self.error_type)
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn display_includes_type_when_present() {
        let err = ApiError::new(400, "validation_error", "Invalid input");
        assert_eq!(
            err.to_string(),
            "textfully: Invalid input (type: validation_error)"
        );
    }

    #[test]
    fn display_omits_empty_type() {
        let err = ApiError::new(500, "", "Something went wrong");
        assert_eq!(err.to_string(), "textfully: Something went wrong");
    }

    #[test]
    fn undecodable_keeps_raw_response() {
        let err = ApiError::undecodable(200, "invalid JSON response", "EOF while parsing");
        assert_eq!(err.status_code, 200);
        assert!(err.error_type.is_empty());
        assert_eq!(err.raw_response.as_deref(), Some("EOF while parsing"));
    }
}
