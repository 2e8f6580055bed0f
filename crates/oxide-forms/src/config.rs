//! Form configuration.

use serde::{Deserialize, Serialize};

use crate::error::ErrorMessages;
use crate::form::DEFAULT_LIMIT_MB;

/// Request-wide settings shared by every form of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Body size limit in megabytes.
    pub limit: u64,
    /// Messages attached to validation errors.
    pub messages: ErrorMessages,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT_MB,
            messages: ErrorMessages::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::form::FormSpec;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: FormConfig =
            serde_json::from_str(r#"{"messages": {"required": "Please fill this in."}}"#).unwrap();
        assert_eq!(config.limit, 256);
        assert_eq!(config.messages.get(ErrorCode::Required), "Please fill this in.");
        assert_eq!(config.messages.get(ErrorCode::Email), "email is invalid");
    }

    #[test]
    fn test_with_config_sets_limit() {
        let config = FormConfig {
            limit: 2,
            ..FormConfig::default()
        };
        let spec = FormSpec::new().with_config(config);
        assert_eq!(spec.size_limit(), 2);
    }
}
