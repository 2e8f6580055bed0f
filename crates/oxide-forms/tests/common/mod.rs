#![allow(dead_code)]

use oxide_forms::fields::{email, number, text, FieldSpec};
use oxide_forms::{ErrorCode, Field, FormOutput, FormSpec, FormState, Request, Validator};

/// Output record shared by the scenario tests.
#[derive(Debug, Default, FormOutput)]
pub struct Signup {
    pub email: Field<String>,
    pub roles: Field<Vec<String>>,
    pub age: Field<i64>,
    pub form: FormState,
}

/// A signup form: required email, required multi-valued roles, bounded age.
pub fn signup_spec() -> FormSpec {
    FormSpec::new()
        .name("signup")
        .method("POST")
        .action("/signup")
        .field(FieldSpec::new("email").with(email(), [Validator::required(), Validator::email()]))
        .field(
            FieldSpec::new("roles")
                .with(text(), [Validator::required()])
                .multiple(),
        )
        .field(FieldSpec::new("age").with(number::<i64>().value(30), [Validator::min(18), Validator::max(99)]))
}

pub fn post(pairs: &[(&str, &str)]) -> Request {
    Request::post("/signup").form(pairs)
}

pub fn codes<T>(field: &Field<T>) -> Vec<ErrorCode> {
    field
        .errors
        .iter()
        .map(|e| {
            e.code()
                .unwrap_or_else(|| panic!("Expected a rule error, got {e:?}"))
        })
        .collect()
}
