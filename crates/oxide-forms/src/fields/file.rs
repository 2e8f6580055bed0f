//! File upload field kind.

use super::{FieldConfig, InputKind};
use crate::value::Multipart;

/// A file input holding uploaded [`Multipart`] values.
///
/// Declaring a file field switches the form encoding to
/// `multipart/form-data`.
pub fn file() -> FieldConfig<Multipart> {
    FieldConfig::new(InputKind::File)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSpec;
    use crate::value::{DataType, Value};

    #[test]
    fn test_file_field() {
        let field = FieldSpec::new("attachments").with(file(), []).multiple();
        assert_eq!(field.data_type(), DataType::File);
        assert_eq!(field.value(), &Value::Files(Vec::new()));
    }
}
