use std::fmt;
use std::sync::LazyLock;

use phonenumber::country;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

// `[0-9]` rather than `\d`: the regex crate treats `\d` as any Unicode digit.
static E164: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("E.164 pattern is valid")
});

#[derive(Clone, PartialEq, Eq, Hash)]
/// Textfully API key, sent as `Authorization: Bearer <key>`.
///
/// Construction never fails; an empty key is reported by the client when a call is made.
/// `Debug` output is redacted.
pub struct ApiKey(String);

impl ApiKey {
    /// Environment variable read by [`crate::TextfullyClient::from_env`].
    pub const ENV: &'static str = "TEXTFULLY_API_KEY";

    /// Wrap a key, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_owned())
    }

    /// `true` when no usable key was provided.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("ApiKey(<empty>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// Destination phone number in E.164 form (`+` then 2 to 15 digits, no leading zero).
///
/// The input is matched as given: no trimming or normalization happens in [`PhoneNumber::new`].
/// Use [`PhoneNumber::parse`] to normalize national formats first.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// JSON field name used by Textfully (`phone_number`).
    pub const FIELD: &'static str = "phone_number";

    /// Validate an E.164 phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if !E164.is_match(&value) {
            return Err(ValidationError::InvalidPhoneNumber { input: value });
        }
        Ok(Self(value))
    }

    /// Parse a number in any format `phonenumber` understands and normalize it to E.164.
    ///
    /// `default_region` is used when the input has no explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, trimmed).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: trimmed.to_owned(),
            }
        })?;
        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Self::new(e164)
    }

    /// Borrow the E.164 string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_accepts_e164() {
        for input in ["+16175555555", "+12", "+447911123456", "+123456789012345"] {
            let phone = PhoneNumber::new(input).unwrap();
            assert_eq!(phone.as_str(), input);
        }
    }

    #[test]
    fn phone_number_rejects_non_e164() {
        for input in [
            "",
            "+",
            "+1",
            "16175555555",
            "+06175555555",
            "+1234567890123456",
            "+1617555555a",
            "+1 617 555 5555",
            " +16175555555",
            "+16175555555\n",
            "+١٦١٧٥٥٥٥٥٥٥",
        ] {
            let err = PhoneNumber::new(input).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidPhoneNumber {
                    input: input.to_owned()
                }
            );
        }
    }

    #[test]
    fn phone_number_parse_normalizes_national_format() {
        let phone = PhoneNumber::parse(Some(country::Id::US), " (617) 555-5555 ").unwrap();
        assert_eq!(phone.as_str(), "+16175555555");
    }

    #[test]
    fn phone_number_parse_rejects_blank_and_garbage() {
        assert_eq!(
            PhoneNumber::parse(None, "   ").unwrap_err(),
            ValidationError::Empty {
                field: PhoneNumber::FIELD
            }
        );
        assert!(matches!(
            PhoneNumber::parse(None, "not a number"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
    }

    #[test]
    fn api_key_is_trimmed_and_redacted() {
        let key = ApiKey::new("  tx_secret \n");
        assert_eq!(key.as_str(), "tx_secret");
        assert!(!key.is_empty());
        assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");

        let empty = ApiKey::new("   ");
        assert!(empty.is_empty());
        assert_eq!(format!("{empty:?}"), "ApiKey(<empty>)");
    }
}
