//! Field validators.
//!
//! A field carries an ordered chain of [`Validator`]s. The
//! [`ValidatorEngine`] runs every validator in the chain against the field's
//! typed [`Value`] and collects every error; nothing short-circuits between
//! validators.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ErrorMessages, FieldError};
use crate::value::{Multipart, Value};

/// Pattern used by [`Validator::Email`].
///
/// Unanchored: a value passes when it contains an address anywhere, so
/// `Ada <ada@example.com>` is accepted.
pub const EMAIL_PATTERN: &str = r"[-A-Za-z0-9!#$%&'*+/=?^_`{|}~]+(?:\.[-A-Za-z0-9!#$%&'*+/=?^_`{|}~]+)*@(?:[A-Za-z0-9](?:[-A-Za-z0-9]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[-A-Za-z0-9]*[A-Za-z0-9])?";

/// Smallest float accepted by a required number field.
const REQUIRED_FLOAT_MIN: f64 = 0.01;

/// Smallest integer accepted by a required number field.
const REQUIRED_INT_MIN: i64 = 1;

/// A validation rule attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Validator {
    /// The value must be present: non-empty strings and files, numbers above
    /// zero, `true` for booleans.
    Required,
    /// Lower bound: string length or numeric value.
    Min { value: i64 },
    /// Upper bound: string length or numeric value.
    Max { value: i64 },
    /// The string must look like an email address.
    Email,
    /// The string must match a caller-supplied regular expression.
    Custom { pattern: String },
}

impl Validator {
    /// Creates a required validator.
    pub fn required() -> Self {
        Self::Required
    }

    /// Creates a lower-bound validator.
    pub fn min(value: i64) -> Self {
        Self::Min { value }
    }

    /// Creates an upper-bound validator.
    pub fn max(value: i64) -> Self {
        Self::Max { value }
    }

    /// Creates an email validator.
    pub fn email() -> Self {
        Self::Email
    }

    /// Creates a validator matching a custom regular expression.
    ///
    /// The pattern is compiled when the validator runs; a malformed pattern
    /// is reported as a [`FieldError::Pattern`] on the field.
    pub fn custom(pattern: impl Into<String>) -> Self {
        Self::Custom {
            pattern: pattern.into(),
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn violated<T: PartialOrd>(self, value: T, limit: T) -> bool {
        match self {
            Self::Min => value < limit,
            Self::Max => value > limit,
        }
    }

    fn string_code(self) -> ErrorCode {
        match self {
            Self::Min => ErrorCode::StringMin,
            Self::Max => ErrorCode::StringMax,
        }
    }

    fn number_code(self) -> ErrorCode {
        match self {
            Self::Min => ErrorCode::NumberMin,
            Self::Max => ErrorCode::NumberMax,
        }
    }
}

/// Evaluates validator chains against typed values.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorEngine<'a> {
    messages: &'a ErrorMessages,
}

impl<'a> ValidatorEngine<'a> {
    /// Creates an engine reporting errors with the given messages.
    pub fn new(messages: &'a ErrorMessages) -> Self {
        Self { messages }
    }

    /// Runs every validator in order and returns all errors produced.
    pub fn validate(&self, validators: &[Validator], value: &Value) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for validator in validators {
            match validator {
                Validator::Required => self.required(value, &mut errors),
                Validator::Min { value: limit } => self.bound(Bound::Min, *limit, value, &mut errors),
                Validator::Max { value: limit } => self.bound(Bound::Max, *limit, value, &mut errors),
                Validator::Email => {
                    self.pattern(EMAIL_PATTERN, ErrorCode::Email, value, &mut errors);
                }
                Validator::Custom { pattern } => {
                    self.pattern(pattern, ErrorCode::Invalid, value, &mut errors);
                }
            }
        }
        errors
    }

    fn required(&self, value: &Value, errors: &mut Vec<FieldError>) {
        let present = match value {
            Value::String(v) => !v.is_empty(),
            Value::Int(v) => *v >= REQUIRED_INT_MIN,
            Value::Float(v) => *v >= REQUIRED_FLOAT_MIN,
            Value::Bool(v) => *v,
            Value::File(v) => !v.is_empty(),
            Value::Strings(v) => all_present(v, |s| !s.is_empty()),
            Value::Ints(v) => all_present(v, |n| *n >= REQUIRED_INT_MIN),
            Value::Floats(v) => all_present(v, |n| *n >= REQUIRED_FLOAT_MIN),
            Value::Bools(v) => all_present(v, |b| *b),
            Value::Files(v) => all_present(v, |f: &Multipart| !f.is_empty()),
        };
        if !present {
            errors.push(self.messages.error(ErrorCode::Required));
        }
    }

    fn bound(&self, bound: Bound, limit: i64, value: &Value, errors: &mut Vec<FieldError>) {
        let code = match value {
            Value::String(v) => bound
                .violated(char_len(v), limit)
                .then(|| bound.string_code()),
            Value::Int(v) => bound.violated(*v, limit).then(|| bound.number_code()),
            #[allow(clippy::cast_precision_loss)]
            Value::Float(v) => bound
                .violated(*v, limit as f64)
                .then(|| bound.number_code()),
            Value::Strings(v) => v
                .iter()
                .any(|s| bound.violated(char_len(s), limit))
                .then(|| bound.string_code()),
            Value::Ints(v) => v
                .iter()
                .any(|n| bound.violated(*n, limit))
                .then(|| bound.number_code()),
            #[allow(clippy::cast_precision_loss)]
            Value::Floats(v) => v
                .iter()
                .any(|n| bound.violated(*n, limit as f64))
                .then(|| bound.number_code()),
            Value::Bool(_) | Value::File(_) | Value::Bools(_) | Value::Files(_) => None,
        };
        if let Some(code) = code {
            errors.push(self.messages.error(code));
        }
    }

    fn pattern(&self, pattern: &str, code: ErrorCode, value: &Value, errors: &mut Vec<FieldError>) {
        match value {
            Value::String(v) if !v.is_empty() => self.match_one(pattern, code, v, errors),
            Value::Strings(v) => {
                for item in v {
                    self.match_one(pattern, code, item, errors);
                }
            }
            _ => {}
        }
    }

    fn match_one(&self, pattern: &str, code: ErrorCode, value: &str, errors: &mut Vec<FieldError>) {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(value) => {}
            Ok(_) => errors.push(self.messages.error(code)),
            Err(err) => {
                errors.push(FieldError::Pattern(err));
                errors.push(self.messages.error(code));
            }
        }
    }
}

fn all_present<T>(items: &[T], present: impl Fn(&T) -> bool) -> bool {
    !items.is_empty() && items.iter().all(present)
}

fn char_len(value: &str) -> i64 {
    i64::try_from(value.chars().count()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn codes(validators: &[Validator], value: &Value) -> Vec<Option<ErrorCode>> {
        let messages = ErrorMessages::default();
        ValidatorEngine::new(&messages)
            .validate(validators, value)
            .iter()
            .map(FieldError::code)
            .collect()
    }

    #[test]
    fn test_required_scalars() {
        let required = [Validator::required()];
        assert_eq!(codes(&required, &Value::String(String::new())), [Some(ErrorCode::Required)]);
        assert!(codes(&required, &Value::String("x".into())).is_empty());
        assert_eq!(codes(&required, &Value::Int(0)), [Some(ErrorCode::Required)]);
        assert!(codes(&required, &Value::Int(1)).is_empty());
        assert_eq!(codes(&required, &Value::Float(0.001)), [Some(ErrorCode::Required)]);
        assert!(codes(&required, &Value::Float(0.01)).is_empty());
        assert_eq!(codes(&required, &Value::Bool(false)), [Some(ErrorCode::Required)]);
        assert!(codes(&required, &Value::Bool(true)).is_empty());
    }

    #[test]
    fn test_required_file_needs_content() {
        let required = [Validator::required()];
        assert_eq!(
            codes(&required, &Value::File(Multipart::default())),
            [Some(ErrorCode::Required)]
        );
        let file = Multipart {
            bytes: Bytes::from_static(b"data"),
            ..Multipart::default()
        };
        assert!(codes(&required, &Value::File(file)).is_empty());
    }

    #[test]
    fn test_required_sequences_emit_one_error() {
        let required = [Validator::required()];
        assert_eq!(codes(&required, &Value::Strings(vec![])), [Some(ErrorCode::Required)]);
        assert_eq!(
            codes(&required, &Value::Strings(vec!["admin".into(), String::new(), String::new()])),
            [Some(ErrorCode::Required)]
        );
        assert!(codes(&required, &Value::Ints(vec![1, 2])).is_empty());
        assert_eq!(codes(&required, &Value::Ints(vec![1, 0])), [Some(ErrorCode::Required)]);
    }

    #[test]
    fn test_string_bounds_use_char_length() {
        assert_eq!(codes(&[Validator::min(5)], &Value::String("test".into())), [Some(ErrorCode::StringMin)]);
        assert_eq!(codes(&[Validator::max(3)], &Value::String("test".into())), [Some(ErrorCode::StringMax)]);
        // Four characters, eight bytes.
        assert!(codes(&[Validator::max(4)], &Value::String("žluť".into())).is_empty());
    }

    #[test]
    fn test_bounds_are_strict() {
        assert!(codes(&[Validator::min(3), Validator::max(3)], &Value::Int(3)).is_empty());
        assert!(codes(&[Validator::min(3), Validator::max(3)], &Value::Float(3.0)).is_empty());
        assert!(codes(&[Validator::min(3), Validator::max(3)], &Value::String("abc".into())).is_empty());
    }

    #[test]
    fn test_number_bounds() {
        assert_eq!(codes(&[Validator::min(10)], &Value::Int(9)), [Some(ErrorCode::NumberMin)]);
        assert_eq!(codes(&[Validator::max(10)], &Value::Float(10.5)), [Some(ErrorCode::NumberMax)]);
    }

    #[test]
    fn test_sequence_bounds_emit_one_error() {
        assert_eq!(
            codes(&[Validator::max(2)], &Value::Ints(vec![5, 6, 7])),
            [Some(ErrorCode::NumberMax)]
        );
        assert_eq!(
            codes(&[Validator::min(2)], &Value::Strings(vec!["a".into(), "b".into()])),
            [Some(ErrorCode::StringMin)]
        );
    }

    #[test]
    fn test_bounds_ignore_bools_and_files() {
        assert!(codes(&[Validator::min(5)], &Value::Bool(false)).is_empty());
        assert!(codes(&[Validator::max(0)], &Value::Files(vec![Multipart::default()])).is_empty());
    }

    #[test]
    fn test_email() {
        let email = [Validator::email()];
        assert!(codes(&email, &Value::String("a@b.com".into())).is_empty());
        assert!(codes(&email, &Value::String(String::new())).is_empty());
        assert_eq!(codes(&email, &Value::String("not-an-email".into())), [Some(ErrorCode::Email)]);
    }

    #[test]
    fn test_email_matches_embedded_address() {
        let email = [Validator::email()];
        assert!(codes(&email, &Value::String("Ada <a@b.com>".into())).is_empty());
        assert!(codes(&email, &Value::String("x a@b.com".into())).is_empty());
        assert_eq!(codes(&email, &Value::String("a@".into())), [Some(ErrorCode::Email)]);
    }

    #[test]
    fn test_email_checks_each_element() {
        assert_eq!(
            codes(
                &[Validator::email()],
                &Value::Strings(vec!["a@b.com".into(), "nope".into(), "also nope".into()])
            ),
            [Some(ErrorCode::Email), Some(ErrorCode::Email)]
        );
    }

    #[test]
    fn test_custom_pattern() {
        let zip = [Validator::custom(r"^\d{5}$")];
        assert!(codes(&zip, &Value::String("12345".into())).is_empty());
        assert_eq!(codes(&zip, &Value::String("1234".into())), [Some(ErrorCode::Invalid)]);
        assert!(codes(&zip, &Value::Int(1234)).is_empty());
    }

    #[test]
    fn test_malformed_pattern_reports_engine_error() {
        let codes = codes(&[Validator::custom("(unclosed")], &Value::String("x".into()));
        assert_eq!(codes, [None, Some(ErrorCode::Invalid)]);
    }

    #[test]
    fn test_chain_accumulates() {
        let chain = [Validator::required(), Validator::min(3), Validator::email()];
        assert_eq!(
            codes(&chain, &Value::String("ab".into())),
            [Some(ErrorCode::StringMin), Some(ErrorCode::Email)]
        );
    }

    #[test]
    fn test_validator_from_json() {
        let validators: Vec<Validator> = serde_json::from_str(
            r#"[{"kind": "required"}, {"kind": "min", "value": 2}, {"kind": "custom", "pattern": "^a"}]"#,
        )
        .unwrap();
        assert_eq!(
            validators,
            [Validator::required(), Validator::min(2), Validator::custom("^a")]
        );
    }
}
