//! Coercion of raw request data into typed field values.

use tracing::debug;

use crate::decode::Upload;
use crate::fields::FieldSpec;
use crate::sniff::{detect_content_type, extension};
use crate::value::{Cardinality, DataType, Multipart, Value};

/// Parses an integer, falling back to zero.
pub fn to_int(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or_default()
}

/// Parses a float, falling back to zero. Infinities and NaN are zero too.
pub fn to_float(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or_default()
}

/// Only the literal `"true"` is true.
pub fn to_bool(raw: &str) -> bool {
    raw == "true"
}

/// Coerces the raw values posted under a field's name into its value.
///
/// Single fields use the first value only. File fields take their value from
/// uploads and ignore scalar values.
pub(crate) fn apply_values(field: &mut FieldSpec, raw: &[String]) {
    let value = match field.cardinality() {
        Cardinality::Single => {
            let Some(first) = raw.first() else {
                return;
            };
            match field.data_type {
                DataType::String => Value::String(first.clone()),
                DataType::Int => Value::Int(to_int(first)),
                DataType::Float => Value::Float(to_float(first)),
                DataType::Bool => Value::Bool(to_bool(first)),
                DataType::File => return,
            }
        }
        Cardinality::Multiple => match field.data_type {
            DataType::String => Value::Strings(raw.to_vec()),
            DataType::Int => Value::Ints(raw.iter().map(|s| to_int(s)).collect()),
            DataType::Float => Value::Floats(raw.iter().map(|s| to_float(s)).collect()),
            DataType::Bool => Value::Bools(raw.iter().map(|s| to_bool(s)).collect()),
            DataType::File => return,
        },
    };
    field.value = value;
}

/// Wraps an upload as a file value, sniffing its content type.
pub fn to_multipart(key: &str, upload: &Upload) -> Multipart {
    Multipart {
        key: key.to_string(),
        filename: upload.filename.clone(),
        mime_type: detect_content_type(&upload.data).to_string(),
        extension: extension(&upload.filename),
        bytes: upload.data.clone(),
    }
}

/// Stores the uploads posted under a file field's name.
///
/// Multiple fields append every upload in arrival order after their
/// defaults; single fields keep the last one.
pub(crate) fn apply_files(field: &mut FieldSpec, uploads: &[Upload]) {
    if field.data_type != DataType::File || uploads.is_empty() {
        return;
    }
    let files: Vec<Multipart> = uploads
        .iter()
        .map(|upload| to_multipart(&field.name, upload))
        .inspect(|file| {
            debug!(
                field = %file.key,
                filename = %file.filename,
                mime_type = %file.mime_type,
                "coerced upload"
            );
        })
        .collect();

    match field.cardinality() {
        Cardinality::Multiple => match &mut field.value {
            Value::Files(current) => current.extend(files),
            value => *value = Value::Files(files),
        },
        Cardinality::Single => {
            if let Some(file) = files.into_iter().last() {
                field.value = Value::File(file);
            }
        }
    }
}
