//! Typed field values.
//!
//! A field's value is one variant of [`Value`], chosen by the field's
//! [`DataType`] and [`Cardinality`]. Coercion and validation match on it
//! exhaustively.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The semantic type a field coerces its input into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Int,
    Float,
    Bool,
    File,
}

impl DataType {
    /// Returns the type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::File => "file",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a field holds one value or a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    Multiple,
}

/// An uploaded file.
///
/// `mime_type` is sniffed from `bytes`; the type declared by the client is
/// not trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipart {
    /// Form key the part was submitted under.
    pub key: String,
    /// Client-supplied filename.
    pub filename: String,
    /// Content type detected from the bytes.
    pub mime_type: String,
    /// Filename extension without the dot.
    pub extension: String,
    /// File content.
    pub bytes: Bytes,
}

impl Multipart {
    /// Returns the content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether the file has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Serialize for Multipart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Multipart", 5)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("mimeType", &self.mime_type)?;
        state.serialize_field("extension", &self.extension)?;
        state.serialize_field("size", &self.bytes.len())?;
        state.end()
    }
}

/// A field value across every data type and cardinality.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    File(Multipart),
    Strings(Vec<String>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Bools(Vec<bool>),
    Files(Vec<Multipart>),
}

impl Value {
    /// Returns the zero value for a data type and cardinality.
    pub fn zero(data_type: DataType, cardinality: Cardinality) -> Self {
        match (data_type, cardinality) {
            (DataType::String, Cardinality::Single) => Self::String(String::new()),
            (DataType::Int, Cardinality::Single) => Self::Int(0),
            (DataType::Float, Cardinality::Single) => Self::Float(0.0),
            (DataType::Bool, Cardinality::Single) => Self::Bool(false),
            (DataType::File, Cardinality::Single) => Self::File(Multipart::default()),
            (DataType::String, Cardinality::Multiple) => Self::Strings(Vec::new()),
            (DataType::Int, Cardinality::Multiple) => Self::Ints(Vec::new()),
            (DataType::Float, Cardinality::Multiple) => Self::Floats(Vec::new()),
            (DataType::Bool, Cardinality::Multiple) => Self::Bools(Vec::new()),
            (DataType::File, Cardinality::Multiple) => Self::Files(Vec::new()),
        }
    }

    /// Returns the data type of the value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::String(_) | Self::Strings(_) => DataType::String,
            Self::Int(_) | Self::Ints(_) => DataType::Int,
            Self::Float(_) | Self::Floats(_) => DataType::Float,
            Self::Bool(_) | Self::Bools(_) => DataType::Bool,
            Self::File(_) | Self::Files(_) => DataType::File,
        }
    }

    /// Returns the cardinality of the value.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Self::String(_) | Self::Int(_) | Self::Float(_) | Self::Bool(_) | Self::File(_) => {
                Cardinality::Single
            }
            _ => Cardinality::Multiple,
        }
    }

    /// Returns the number of elements: 1 for single values.
    pub fn len(&self) -> usize {
        match self {
            Self::Strings(v) => v.len(),
            Self::Ints(v) => v.len(),
            Self::Floats(v) => v.len(),
            Self::Bools(v) => v.len(),
            Self::Files(v) => v.len(),
            _ => 1,
        }
    }

    /// Returns whether the value is an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reshapes a sequence of defaults into the given cardinality.
    ///
    /// Single takes the first element or the zero value; multiple keeps
    /// every element.
    pub(crate) fn reshape(&self, cardinality: Cardinality) -> Self {
        if self.cardinality() == cardinality {
            return self.clone();
        }
        match (self, cardinality) {
            (Self::Strings(v), Cardinality::Single) => {
                Self::String(v.first().cloned().unwrap_or_default())
            }
            (Self::Ints(v), Cardinality::Single) => Self::Int(v.first().copied().unwrap_or_default()),
            (Self::Floats(v), Cardinality::Single) => {
                Self::Float(v.first().copied().unwrap_or_default())
            }
            (Self::Bools(v), Cardinality::Single) => {
                Self::Bool(v.first().copied().unwrap_or_default())
            }
            (Self::Files(v), Cardinality::Single) => {
                Self::File(v.first().cloned().unwrap_or_default())
            }
            (Self::String(v), Cardinality::Multiple) => Self::Strings(vec![v.clone()]),
            (Self::Int(v), Cardinality::Multiple) => Self::Ints(vec![*v]),
            (Self::Float(v), Cardinality::Multiple) => Self::Floats(vec![*v]),
            (Self::Bool(v), Cardinality::Multiple) => Self::Bools(vec![*v]),
            (Self::File(v), Cardinality::Multiple) => Self::Files(vec![v.clone()]),
            _ => self.clone(),
        }
    }
}

/// Scalar types a field can be declared with.
pub trait FieldType: Sized {
    /// The data type fields of this type coerce into.
    const DATA_TYPE: DataType;

    /// Wraps a sequence of values.
    fn into_sequence(values: Vec<Self>) -> Value;
}

/// Number types accepted by [`crate::fields::number`].
pub trait Number: FieldType {}

impl Number for i64 {}
impl Number for f64 {}

/// Types that can receive a bound value in an output slot.
pub trait SlotValue: Sized {
    /// The data type the slot accepts.
    const DATA_TYPE: DataType;
    /// The cardinality the slot accepts.
    const CARDINALITY: Cardinality;

    /// Extracts the slot value, returning the value back on shape mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! impl_value_types {
    ($($ty:ty => $data:ident, $single:ident, $multiple:ident;)*) => {
        $(
            impl FieldType for $ty {
                const DATA_TYPE: DataType = DataType::$data;

                fn into_sequence(values: Vec<Self>) -> Value {
                    Value::$multiple(values)
                }
            }

            impl SlotValue for $ty {
                const DATA_TYPE: DataType = DataType::$data;
                const CARDINALITY: Cardinality = Cardinality::Single;

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$single(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl SlotValue for Vec<$ty> {
                const DATA_TYPE: DataType = DataType::$data;
                const CARDINALITY: Cardinality = Cardinality::Multiple;

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$multiple(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_value_types! {
    String => String, String, Strings;
    i64 => Int, Int, Ints;
    f64 => Float, Float, Floats;
    bool => Bool, Bool, Bools;
    Multipart => File, File, Files;
}
