//! Checkbox field kind.

use super::{FieldConfig, InputKind};

/// A checkbox holding a boolean.
///
/// Only the submitted literal `"true"` checks it.
pub fn checkbox() -> FieldConfig<bool> {
    FieldConfig::new(InputKind::Checkbox)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSpec;
    use crate::value::Value;

    #[test]
    fn test_checkbox_field() {
        let field = FieldSpec::new("active").with(checkbox(), []);
        assert_eq!(field.kind(), InputKind::Checkbox);
        assert_eq!(field.value(), &Value::Bool(false));
        assert!(!field.is_required());
    }

    #[test]
    fn test_checked_by_default() {
        let field = FieldSpec::new("newsletter").with(checkbox().value(true), []);
        assert_eq!(field.value(), &Value::Bool(true));
    }
}
