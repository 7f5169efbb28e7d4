use serde::{Deserialize, Serialize};

use crate::domain::value::PhoneNumber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single text message to be sent.
///
/// `text` is passed through untouched: length and content limits are enforced by the
/// service, not by this crate.
pub struct MessageRequest {
    pub phone_number: PhoneNumber,
    pub text: String,
}

impl MessageRequest {
    pub fn new(phone_number: PhoneNumber, text: impl Into<String>) -> Self {
        Self {
            phone_number,
            text: text.into(),
        }
    }
}
