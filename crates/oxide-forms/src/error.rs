//! Error types for forms.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a bind operation.
#[derive(Debug, Error)]
pub enum FormError {
    /// The request body exceeds the configured ceiling. `size` is the
    /// declared length, or the bytes received once the stream crossed it.
    #[error("request body of {size} bytes exceeds the limit of {limit} bytes")]
    BodyTooLarge { size: u64, limit: u64 },

    /// The multipart stream is malformed or oversized.
    #[error("failed to decode multipart body: {0}")]
    Multipart(#[from] multer::Error),

    /// The URL-encoded body is malformed.
    #[error("failed to decode url-encoded body: {0}")]
    UrlEncoded(#[from] serde_urlencoded::de::Error),

    /// An uploaded part could not be read.
    #[error("failed to read uploaded part {key}: {source}")]
    Part {
        key: String,
        #[source]
        source: multer::Error,
    },

    /// A form schema does not describe a valid form.
    #[error("invalid form schema: {0}")]
    Schema(String),

    /// A form schema is not valid JSON.
    #[error("failed to parse form schema: {0}")]
    Json(#[from] serde_json::Error),

    /// A schema file or the request body stream could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

/// Typed codes for validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Required,
    StringMin,
    StringMax,
    NumberMin,
    NumberMax,
    Email,
    Invalid,
}

impl ErrorCode {
    /// Returns the stable wire name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::StringMin => "stringMin",
            Self::StringMax => "stringMax",
            Self::NumberMin => "numberMin",
            Self::NumberMax => "numberMax",
            Self::Email => "email",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-field validation outcome. Never aborts a bind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// A validator rejected the value.
    #[error("{message}")]
    Rule { code: ErrorCode, message: String },

    /// A pattern could not be compiled, so the value could not be checked.
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

impl FieldError {
    /// Returns the validation code, or `None` for pattern engine errors.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Rule { code, .. } => Some(*code),
            Self::Pattern(_) => None,
        }
    }

    /// Returns whether this is a pattern engine error.
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern(_))
    }
}

impl Serialize for FieldError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FieldError", 2)?;
        match self {
            Self::Rule { code, message } => {
                state.serialize_field("code", code.as_str())?;
                state.serialize_field("message", message)?;
            }
            Self::Pattern(err) => {
                state.serialize_field("code", "pattern")?;
                state.serialize_field("message", &err.to_string())?;
            }
        }
        state.end()
    }
}

/// Human-readable messages attached to each [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorMessages {
    pub required: String,
    pub string_min: String,
    pub string_max: String,
    pub number_min: String,
    pub number_max: String,
    pub email: String,
    pub invalid: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            required: "field is required".to_string(),
            string_min: "field value is too short".to_string(),
            string_max: "field value is too long".to_string(),
            number_min: "field value is too low".to_string(),
            number_max: "field value is too high".to_string(),
            email: "email is invalid".to_string(),
            invalid: "field is invalid".to_string(),
        }
    }
}

impl ErrorMessages {
    /// Returns the message for a code.
    pub fn get(&self, code: ErrorCode) -> &str {
        match code {
            ErrorCode::Required => &self.required,
            ErrorCode::StringMin => &self.string_min,
            ErrorCode::StringMax => &self.string_max,
            ErrorCode::NumberMin => &self.number_min,
            ErrorCode::NumberMax => &self.number_max,
            ErrorCode::Email => &self.email,
            ErrorCode::Invalid => &self.invalid,
        }
    }

    /// Overrides the message for a code.
    #[must_use]
    pub fn with(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        let slot = match code {
            ErrorCode::Required => &mut self.required,
            ErrorCode::StringMin => &mut self.string_min,
            ErrorCode::StringMax => &mut self.string_max,
            ErrorCode::NumberMin => &mut self.number_min,
            ErrorCode::NumberMax => &mut self.number_max,
            ErrorCode::Email => &mut self.email,
            ErrorCode::Invalid => &mut self.invalid,
        };
        *slot = message.into();
        self
    }

    /// Builds the field error for a code.
    pub fn error(&self, code: ErrorCode) -> FieldError {
        FieldError::Rule {
            code,
            message: self.get(code).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        let messages = ErrorMessages::default();
        assert_eq!(messages.get(ErrorCode::Required), "field is required");
        assert_eq!(messages.get(ErrorCode::Email), "email is invalid");
    }

    #[test]
    fn test_override_message() {
        let messages = ErrorMessages::default().with(ErrorCode::Required, "Please fill this in.");
        let err = messages.error(ErrorCode::Required);
        assert_eq!(err.code(), Some(ErrorCode::Required));
        assert_eq!(err.to_string(), "Please fill this in.");
    }

    #[test]
    fn test_partial_messages_from_json() {
        let messages: ErrorMessages = serde_json::from_str(r#"{"stringMin": "too short"}"#).unwrap();
        assert_eq!(messages.string_min, "too short");
        assert_eq!(messages.required, "field is required");
    }

    #[test]
    fn test_pattern_error_has_no_code() {
        let err: FieldError = regex::Regex::new("(").unwrap_err().into();
        assert!(err.is_pattern());
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_field_error_serializes_code() {
        let json = serde_json::to_value(ErrorMessages::default().error(ErrorCode::NumberMax)).unwrap();
        assert_eq!(json["code"], "numberMax");
        assert_eq!(json["message"], "field value is too high");
    }
}
