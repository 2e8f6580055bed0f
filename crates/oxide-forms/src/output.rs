//! Result assembly.
//!
//! Binding ends by handing every field's final state to a caller-supplied
//! output record. Records opt in through [`FormOutput`], usually derived:
//!
//! ```rust
//! use oxide_forms::fields::{email, text, FieldSpec};
//! use oxide_forms::{Field, FormOutput, FormSpec, FormState, Request, Validator};
//!
//! #[derive(Default, FormOutput)]
//! struct Signup {
//!     first_name: Field<String>,
//!     email: Field<String>,
//!     form: FormState,
//! }
//!
//! let mut spec = FormSpec::new()
//!     .field(FieldSpec::new("first-name").with(text(), []))
//!     .field(FieldSpec::new("email").with(email(), [Validator::required()]));
//!
//! let req = Request::post("/signup").form(&[("first-name", "Ada"), ("email", "")]);
//! let out: Signup = spec.bind(&req).unwrap();
//! assert_eq!(out.first_name.value, "Ada");
//! assert!(!out.email.valid);
//! assert!(!out.form.valid);
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::FieldError;
use crate::fields::{FieldSpec, InputKind};
use crate::form::Security;
use crate::value::{Cardinality, DataType, SlotValue, Value};

/// Normalizes a field or slot name for matching: ASCII lowercase, with every
/// non-alphanumeric character removed. `first_name`, `first-name` and
/// `FirstName` all normalize to `firstname`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Form metadata written to the output record's metadata slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub method: String,
    pub action: String,
    pub name: String,
    pub enctype: String,
    pub valid: bool,
    pub submitted: bool,
    pub security: Security,
    /// Token posted under the security name, when security is enabled.
    pub submitted_token: String,
    /// Enhanced (htmx) submission marker.
    pub hx: bool,
}

/// The final state of one field after binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundField {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub data_type: DataType,
    pub cardinality: Cardinality,
    pub value: Value,
    pub errors: Vec<FieldError>,
    pub required: bool,
    pub valid: bool,
}

impl BoundField {
    pub(crate) fn from_spec(spec: &FieldSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            label: spec.label.clone(),
            kind: spec.kind,
            data_type: spec.data_type,
            cardinality: spec.cardinality(),
            value: spec.value.clone(),
            errors: spec.errors.clone(),
            required: spec.is_required(),
            valid: spec.valid,
        }
    }
}

/// An output record populated by field name.
///
/// `assign` returns `false` when the record has no slot for the field; such
/// fields are skipped. Derive it with `#[derive(FormOutput)]`.
///
/// Derived slots match on [`normalize_name`], so `first_name` and
/// `first-name` land in the same slot and the field declared last wins.
/// [`FormSpec`](crate::FormSpec) logs a warning when it is given two such
/// fields.
pub trait FormOutput {
    /// Stores a bound field in its slot.
    fn assign(&mut self, field: BoundField) -> bool;

    /// Stores the form metadata.
    fn assign_meta(&mut self, state: FormState) {
        let _ = state;
    }
}

/// A field's value shape does not fit the slot it was matched to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` holds {declared} but its output slot expects {slot}")]
pub struct SlotMismatch {
    pub field: String,
    pub declared: String,
    pub slot: String,
}

fn shape(data_type: DataType, cardinality: Cardinality) -> String {
    match cardinality {
        Cardinality::Single => data_type.to_string(),
        Cardinality::Multiple => format!("a sequence of {data_type}"),
    }
}

/// A typed output slot for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field<T> {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub data_type: DataType,
    pub value: T,
    pub errors: Vec<FieldError>,
    pub required: bool,
    pub multiple: bool,
    pub valid: bool,
}

impl<T: SlotValue + Default> Default for Field<T> {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            label: String::new(),
            kind: InputKind::default(),
            data_type: T::DATA_TYPE,
            value: T::default(),
            errors: Vec::new(),
            required: false,
            multiple: T::CARDINALITY == Cardinality::Multiple,
            valid: true,
        }
    }
}

impl<T: SlotValue> Field<T> {
    /// Converts a bound field into this slot.
    ///
    /// # Panics
    ///
    /// Panics when the field's data type or cardinality differs from the
    /// slot's. That is a declaration error, not a data error.
    pub fn from_bound(field: BoundField) -> Self {
        Self::try_from_bound(field).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Converts a bound field into this slot, reporting shape mismatches.
    pub fn try_from_bound(field: BoundField) -> Result<Self, SlotMismatch> {
        let mismatch = |field: &BoundField| SlotMismatch {
            field: field.name.clone(),
            declared: shape(field.data_type, field.cardinality),
            slot: shape(T::DATA_TYPE, T::CARDINALITY),
        };
        if field.data_type != T::DATA_TYPE || field.cardinality != T::CARDINALITY {
            return Err(mismatch(&field));
        }

        let BoundField {
            id,
            name,
            label,
            kind,
            data_type,
            cardinality,
            value,
            errors,
            required,
            valid,
        } = field;
        let value = T::from_value(value).map_err(|value| SlotMismatch {
            field: name.clone(),
            declared: shape(value.data_type(), value.cardinality()),
            slot: shape(T::DATA_TYPE, T::CARDINALITY),
        })?;

        Ok(Self {
            id,
            name,
            label,
            kind,
            data_type,
            value,
            errors,
            required,
            multiple: cardinality == Cardinality::Multiple,
            valid,
        })
    }
}

/// A dynamic output record holding every field in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundForm {
    pub form: FormState,
    pub fields: Vec<BoundField>,
}

impl BoundForm {
    /// Looks up a field by name, comparing normalized names.
    pub fn get(&self, name: &str) -> Option<&BoundField> {
        let name = normalize_name(name);
        self.fields.iter().find(|f| normalize_name(&f.name) == name)
    }

    /// Returns the aggregate validity.
    pub fn is_valid(&self) -> bool {
        self.form.valid
    }
}

impl FormOutput for BoundForm {
    fn assign(&mut self, field: BoundField) -> bool {
        self.fields.push(field);
        true
    }

    fn assign_meta(&mut self, state: FormState) {
        self.form = state;
    }
}

/// Writes every field and the metadata into `out`.
pub(crate) fn assemble<T: FormOutput>(out: &mut T, fields: &[FieldSpec], state: FormState) {
    for spec in fields {
        if !out.assign(BoundField::from_spec(spec)) {
            debug!(field = %spec.name, "no output slot for field, skipping");
        }
    }
    out.assign_meta(state);
}
