//! Hidden field kind.

use std::fmt::Display;

use super::{FieldConfig, InputKind};

/// A hidden input. Hidden fields hold strings.
pub fn hidden() -> FieldConfig<String> {
    FieldConfig::new(InputKind::Hidden)
}

impl FieldConfig<String> {
    /// Adds a default rendered through `Display`, e.g. a numeric id.
    #[must_use]
    pub fn display(self, value: impl Display) -> Self {
        self.value(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSpec;
    use crate::value::Value;

    #[test]
    fn test_hidden_field() {
        let field = FieldSpec::new("post_id").with(hidden().display(42), []);
        assert_eq!(field.kind(), InputKind::Hidden);
        assert_eq!(field.value(), &Value::String("42".to_string()));
    }
}
