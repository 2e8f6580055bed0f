//! Field declarations.
//!
//! Each HTML input kind has a declaration function returning a typed
//! [`FieldConfig`], which [`FieldSpec::with`] consumes:
//!
//! ```rust
//! use oxide_forms::fields::{email, number, FieldSpec};
//! use oxide_forms::Validator;
//!
//! let email = FieldSpec::new("email").with(email(), [Validator::required(), Validator::email()]);
//! let quantity = FieldSpec::new("quantity").with(number::<i64>().value(1), [Validator::min(1)]);
//! assert!(email.is_required());
//! assert_eq!(quantity.value(), &oxide_forms::Value::Int(1));
//! ```

mod checkbox;
mod file;
mod hidden;
mod number;
mod text;

pub use checkbox::checkbox;
pub use file::file;
pub use hidden::hidden;
pub use number::{number, range};
pub use text::{
    button, color, date, datetime_local, email, image, month, password, radio, reset, search,
    submit, tel, text, time, url, week,
};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::validation::Validator;
use crate::value::{Cardinality, DataType, FieldType, Value};

/// HTML input kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Button,
    Checkbox,
    Color,
    Date,
    DatetimeLocal,
    Email,
    File,
    Hidden,
    Image,
    Month,
    Number,
    Password,
    Radio,
    Range,
    Reset,
    Search,
    Submit,
    Tel,
    #[default]
    Text,
    Time,
    Url,
    Week,
}

impl InputKind {
    /// Returns the value of the HTML `type` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Color => "color",
            Self::Date => "date",
            Self::DatetimeLocal => "datetime-local",
            Self::Email => "email",
            Self::File => "file",
            Self::Hidden => "hidden",
            Self::Image => "image",
            Self::Month => "month",
            Self::Number => "number",
            Self::Password => "password",
            Self::Radio => "radio",
            Self::Range => "range",
            Self::Reset => "reset",
            Self::Search => "search",
            Self::Submit => "submit",
            Self::Tel => "tel",
            Self::Text => "text",
            Self::Time => "time",
            Self::Url => "url",
            Self::Week => "week",
        }
    }

    /// Returns the data type a field of this kind holds unless declared
    /// otherwise.
    pub fn default_data_type(self) -> DataType {
        match self {
            Self::Checkbox => DataType::Bool,
            Self::File => DataType::File,
            Self::Number => DataType::Float,
            _ => DataType::String,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input kind and default values for a field of scalar type `T`.
#[derive(Debug, Clone)]
pub struct FieldConfig<T> {
    kind: InputKind,
    defaults: Vec<T>,
}

impl<T: FieldType> FieldConfig<T> {
    /// Creates a configuration without defaults.
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            defaults: Vec::new(),
        }
    }

    /// Adds a default value.
    #[must_use]
    pub fn value(mut self, value: impl Into<T>) -> Self {
        self.defaults.push(value.into());
        self
    }

    /// Adds several default values.
    #[must_use]
    pub fn values<V: Into<T>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.defaults.extend(values.into_iter().map(Into::into));
        self
    }

    /// Returns the input kind.
    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

/// A declared form field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) kind: InputKind,
    pub(crate) data_type: DataType,
    multiple: bool,
    /// Declared defaults, always held as a sequence.
    defaults: Value,
    pub(crate) value: Value,
    pub(crate) validators: Vec<Validator>,
    pub(crate) errors: Vec<FieldError>,
    pub(crate) valid: bool,
}

impl FieldSpec {
    /// Declares a text field named `name`; use [`FieldSpec::with`] to set
    /// its kind.
    pub fn new(name: impl Into<String>) -> Self {
        let defaults = Value::zero(DataType::String, Cardinality::Multiple);
        Self {
            name: name.into(),
            id: String::new(),
            label: String::new(),
            kind: InputKind::Text,
            data_type: DataType::String,
            multiple: false,
            value: defaults.reshape(Cardinality::Single),
            defaults,
            validators: Vec::new(),
            errors: Vec::new(),
            valid: true,
        }
    }

    /// Sets the kind, data type and defaults, and appends validators.
    ///
    /// Two or more defaults make the field hold multiple values.
    #[must_use]
    pub fn with<T: FieldType>(
        mut self,
        config: FieldConfig<T>,
        validators: impl IntoIterator<Item = Validator>,
    ) -> Self {
        self.kind = config.kind;
        self.data_type = T::DATA_TYPE;
        self.multiple |= config.defaults.len() > 1;
        self.defaults = T::into_sequence(config.defaults);
        self.validators.extend(validators);
        self.reset();
        self
    }

    /// Sets the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Makes the field hold a sequence of values.
    #[must_use]
    pub fn multiple(self) -> Self {
        self.set_multiple(true)
    }

    /// Sets whether the field holds a sequence of values.
    #[must_use]
    pub fn set_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self.reset();
        self
    }

    /// Appends a validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets a kind and data type chosen at runtime, clearing the defaults.
    pub(crate) fn with_kind(mut self, kind: InputKind, data_type: DataType) -> Self {
        self.kind = kind;
        self.data_type = data_type;
        self.defaults = Value::zero(data_type, Cardinality::Multiple);
        self.reset();
        self
    }

    /// Replaces the declared defaults with a value of the field's data type.
    /// Two or more defaults make the field hold multiple values.
    pub(crate) fn set_defaults(&mut self, defaults: Value) {
        debug_assert_eq!(defaults.data_type(), self.data_type);
        self.defaults = defaults.reshape(Cardinality::Multiple);
        self.multiple |= self.defaults.len() > 1;
        self.reset();
    }

    /// Restores the declared default value and clears validation state.
    pub(crate) fn reset(&mut self) {
        self.value = self.defaults.reshape(self.cardinality());
        self.errors.clear();
        self.valid = true;
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input kind.
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Returns the data type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the cardinality.
    pub fn cardinality(&self) -> Cardinality {
        if self.multiple {
            Cardinality::Multiple
        } else {
            Cardinality::Single
        }
    }

    /// Returns the current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the validator chain.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Returns the errors from the last validation.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns whether the last validation produced no errors.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns whether the chain contains a required validator.
    pub fn is_required(&self) -> bool {
        self.validators.contains(&Validator::Required)
    }
}
