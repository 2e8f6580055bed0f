//! # oxide-forms
//!
//! Declarative form binding and validation for server-rendered applications.
//!
//! This crate provides:
//! - Typed field declarations for every HTML input kind
//! - Streaming request decoding (URL-encoded and multipart) with a body size
//!   ceiling
//! - Lenient coercion into string, integer, float, boolean and file values
//! - Validator chains with typed error codes
//! - Assembly of the result into caller-defined output records
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_forms::fields::{email, number, text, FieldSpec};
//! use oxide_forms::{ErrorCode, Field, FormOutput, FormSpec, FormState, Request, Validator};
//!
//! #[derive(Default, FormOutput)]
//! struct Order {
//!     email: Field<String>,
//!     quantity: Field<i64>,
//!     tags: Field<Vec<String>>,
//!     form: FormState,
//! }
//!
//! let mut spec = FormSpec::new()
//!     .method("POST")
//!     .action("/orders")
//!     .field(FieldSpec::new("email").with(email(), [Validator::required(), Validator::email()]))
//!     .field(FieldSpec::new("quantity").with(number::<i64>().value(1), [Validator::min(0)]))
//!     .field(FieldSpec::new("tags").with(text(), []).multiple());
//!
//! // A fresh render is always valid.
//! let order: Order = spec.render();
//! assert!(order.form.valid);
//! assert_eq!(order.quantity.value, 1);
//!
//! // A submission is decoded, coerced and validated.
//! let req = Request::post("/orders").form(&[
//!     ("email", "not-an-email"),
//!     ("quantity", "3"),
//!     ("tags", "gift"),
//!     ("tags", "express"),
//! ]);
//! let order: Order = spec.bind(&req).unwrap();
//! assert!(!order.form.valid);
//! assert_eq!(order.email.errors[0].code(), Some(ErrorCode::Email));
//! assert_eq!(order.quantity.value, 3);
//! assert_eq!(order.tags.value, ["gift", "express"]);
//! ```
//!
//! ## Dynamic Output
//!
//! [`BoundForm`] collects every field without declaring a record type:
//!
//! ```rust
//! use oxide_forms::fields::{checkbox, FieldSpec};
//! use oxide_forms::{BoundForm, FormSpec, Request, Value, Validator};
//!
//! let mut spec = FormSpec::new()
//!     .field(FieldSpec::new("terms").with(checkbox(), [Validator::required()]));
//! let out: BoundForm = spec.bind(&Request::post("/").form(&[("terms", "on")])).unwrap();
//! assert_eq!(out.get("terms").map(|f| &f.value), Some(&Value::Bool(false)));
//! assert!(!out.is_valid());
//! ```

mod coerce;
mod config;
pub mod decode;
mod error;
pub mod fields;
mod form;
mod output;
mod request;
mod schema;
pub mod sniff;
pub mod validation;
mod value;

pub use config::FormConfig;
pub use error::{ErrorCode, ErrorMessages, FieldError, FormError, Result};
pub use form::{BindState, FormSpec, Security, DEFAULT_LIMIT_MB};
pub use output::{
    normalize_name, BoundField, BoundForm, Field, FormOutput, FormState, SlotMismatch,
};
pub use oxide_forms_derive::FormOutput;
pub use request::{
    buffered, read_chunks, BodyStream, FormRequest, Method, MultipartBody, Request,
    DEFAULT_CHUNK_SIZE,
};
pub use schema::{CsrfSchema, FieldSchema, FormSchema};
pub use validation::{Validator, ValidatorEngine};
pub use value::{Cardinality, DataType, FieldType, Multipart, Number, SlotValue, Value};
