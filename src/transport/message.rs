use serde::Deserialize;

use crate::domain::{MessageRequest, MessageResponse};

// Any JSON object or `null` decodes (`{}`, a proxy's own object); missing or null
// parts are left empty.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Body of the `error` object in a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceError {
    pub error_type: String,
    pub message: String,
}

pub fn encode_message(request: &MessageRequest) -> Result<String, serde_json::Error> {
    serde_json::to_string(request)
}

pub fn decode_message_response(body: &str) -> Result<MessageResponse, serde_json::Error> {
    serde_json::from_str(body)
}

pub fn decode_error_envelope(body: &str) -> Result<ServiceError, serde_json::Error> {
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(body)?;
    let error = envelope.unwrap_or_default().error.unwrap_or_default();
    Ok(ServiceError {
        error_type: error.error_type.unwrap_or_default(),
        message: error.message.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::domain::PhoneNumber;

    use super::*;

    #[test]
    fn encode_uses_snake_case_fields() {
        let request =
            MessageRequest::new(PhoneNumber::new("+16175555555").unwrap(), "Hello, world!");
        let json = encode_message(&request).unwrap();
        assert_eq!(
            json,
            r#"{"phone_number":"+16175555555","text":"Hello, world!"}"#
        );
    }

    #[test]
    fn request_survives_json_round_trip() {
        for text in [
            "Hello 👋 World 🌍",
            "Line 1\nLine 2\r\nLine 3",
            r#"He said "hi" and left \ "#,
            "",
        ] {
            let request = MessageRequest::new(PhoneNumber::new("+447911123456").unwrap(), text);
            let json = encode_message(&request).unwrap();
            let decoded: MessageRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, request);
        }
    }

    #[test]
    fn request_decoding_revalidates_phone_number() {
        let err = serde_json::from_str::<MessageRequest>(
            r#"{"phone_number":"0617","text":"hi"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid phone number format"));
    }

    #[test]
    fn decode_message_response_parses_rfc3339_timestamp() {
        let body = r#"{"id":"msg_123","status":"sent","created_at":"2024-01-01T00:00:00Z"}"#;
        let response = decode_message_response(body).unwrap();
        assert_eq!(response.id, "msg_123");
        assert_eq!(response.status, "sent");
        assert_eq!(
            response.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn decode_message_response_converts_offsets_to_utc() {
        let body = r#"{"id":"msg_1","status":"queued","created_at":"2024-01-01T02:30:00+02:00"}"#;
        let response = decode_message_response(body).unwrap();
        assert_eq!(
            response.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap()
        );
    }

    #[test]
    fn decode_message_response_rejects_malformed_bodies() {
        for body in [
            "",
            "{invalid json",
            r#"{"id":"msg_1","status":"sent"}"#,
            r#"{"id":"msg_1","status":"sent","created_at":"yesterday"}"#,
        ] {
            assert!(decode_message_response(body).is_err(), "accepted {body:?}");
        }
    }

    #[test]
    fn decode_error_envelope_reads_type_and_message() {
        let body = r#"{"error":{"type":"authentication_error","message":"Invalid API key"}}"#;
        let error = decode_error_envelope(body).unwrap();
        assert_eq!(
            error,
            ServiceError {
                error_type: "authentication_error".to_owned(),
                message: "Invalid API key".to_owned(),
            }
        );
    }

    #[test]
    fn decode_error_envelope_defaults_missing_fields() {
        let error = decode_error_envelope(r#"{"error":{"message":"boom"}}"#).unwrap();
        assert!(error.error_type.is_empty());
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn decode_error_envelope_accepts_bodies_without_error_object() {
        for body in [
            "{}",
            "null",
            r#"{"message":"Bad gateway"}"#,
            r#"{"error":null}"#,
            r#"{"error":{"type":null,"message":null}}"#,
        ] {
            assert_eq!(
                decode_error_envelope(body).unwrap(),
                ServiceError::default(),
                "body {body:?}"
            );
        }
    }

    #[test]
    fn decode_error_envelope_rejects_malformed_json() {
        assert!(decode_error_envelope("{invalid error json").is_err());
        assert!(decode_error_envelope("").is_err());
        assert!(decode_error_envelope("<html>502 Bad Gateway</html>").is_err());
    }
}
