//! Numeric field kinds.

use super::{FieldConfig, InputKind};
use crate::value::Number;

/// A number input holding `i64` or `f64` values.
///
/// ```rust
/// use oxide_forms::fields::{number, FieldSpec};
/// use oxide_forms::DataType;
///
/// let quantity = FieldSpec::new("quantity").with(number::<i64>(), []);
/// let amount = FieldSpec::new("amount").with(number::<f64>().value(9.5), []);
/// assert_eq!(quantity.data_type(), DataType::Int);
/// assert_eq!(amount.data_type(), DataType::Float);
/// ```
pub fn number<T: Number>() -> FieldConfig<T> {
    FieldConfig::new(InputKind::Number)
}

/// A range slider holding `i64` or `f64` values.
pub fn range<T: Number>() -> FieldConfig<T> {
    FieldConfig::new(InputKind::Range)
}
