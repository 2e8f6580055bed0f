//! JSON form declarations.
//!
//! A [`FormSchema`] describes a whole form as data, for forms defined
//! outside the code and for the `oxide-forms` command line tool:
//!
//! ```json
//! {
//!   "name": "signup",
//!   "method": "POST",
//!   "csrf": { "name": "_token", "token": "abc" },
//!   "limit": 8,
//!   "fields": [
//!     { "name": "email", "kind": "email", "validators": [{ "kind": "required" }, { "kind": "email" }] },
//!     { "name": "age", "kind": "number", "dataType": "int", "value": 18 },
//!     { "name": "roles", "value": ["admin", "editor"] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::config::FormConfig;
use crate::error::{FormError, Result};
use crate::fields::{FieldSpec, InputKind};
use crate::form::FormSpec;
use crate::validation::Validator;
use crate::value::{DataType, Value};

/// Anti-forgery token pair of a schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsrfSchema {
    pub name: String,
    pub token: String,
}

/// One field of a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,
    #[serde(default)]
    pub kind: InputKind,
    /// Defaults to the kind's natural data type.
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// A scalar or an array of scalars.
    #[serde(default)]
    pub value: Json,
    #[serde(default)]
    pub validators: Vec<Validator>,
}

/// A whole form declared as data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub csrf: Option<CsrfSchema>,
    #[serde(default)]
    pub hx: bool,
    #[serde(flatten)]
    pub config: FormConfig,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl FormSchema {
    /// Parses a schema from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a schema from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Builds the form this schema declares.
    pub fn into_spec(self) -> Result<FormSpec> {
        let mut spec = FormSpec::new()
            .name(self.name)
            .method(self.method)
            .action(self.action)
            .with_config(self.config);
        if let Some(csrf) = self.csrf {
            spec = spec.csrf(csrf.name, csrf.token);
        }
        if self.hx {
            spec = spec.hx();
        }
        let fields = self
            .fields
            .into_iter()
            .map(FieldSchema::into_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(spec.fields(fields))
    }
}

impl TryFrom<FormSchema> for FormSpec {
    type Error = FormError;

    fn try_from(schema: FormSchema) -> Result<Self> {
        schema.into_spec()
    }
}

impl FieldSchema {
    /// Builds the field this schema declares.
    pub fn into_spec(self) -> Result<FieldSpec> {
        let data_type = self.data_type.unwrap_or_else(|| self.kind.default_data_type());
        let defaults = defaults(&self.name, data_type, self.value)?;

        let mut field = FieldSpec::new(self.name)
            .with_kind(self.kind, data_type)
            .id(self.id)
            .label(self.label)
            .set_multiple(self.multiple);
        if let Some(defaults) = defaults {
            field.set_defaults(defaults);
        }
        Ok(self
            .validators
            .into_iter()
            .fold(field, FieldSpec::validator))
    }
}

/// Converts the JSON default of a field into a value sequence.
fn defaults(field: &str, data_type: DataType, json: Json) -> Result<Option<Value>> {
    let items = match json {
        Json::Null => return Ok(None),
        Json::Array(items) => items,
        scalar => vec![scalar],
    };
    let mismatch = |item: &Json| {
        FormError::Schema(format!(
            "default {item} of field `{field}` is not a {data_type} value"
        ))
    };

    let value = match data_type {
        DataType::String => Value::Strings(
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(|| mismatch(item)))
                .collect::<Result<_>>()?,
        ),
        DataType::Int => Value::Ints(
            items
                .iter()
                .map(|item| item.as_i64().ok_or_else(|| mismatch(item)))
                .collect::<Result<_>>()?,
        ),
        DataType::Float => Value::Floats(
            items
                .iter()
                .map(|item| item.as_f64().ok_or_else(|| mismatch(item)))
                .collect::<Result<_>>()?,
        ),
        DataType::Bool => Value::Bools(
            items
                .iter()
                .map(|item| item.as_bool().ok_or_else(|| mismatch(item)))
                .collect::<Result<_>>()?,
        ),
        DataType::File => {
            if items.is_empty() {
                return Ok(None);
            }
            return Err(FormError::Schema(format!(
                "file field `{field}` cannot declare a default value"
            )));
        }
    };
    Ok(Some(value))
}
