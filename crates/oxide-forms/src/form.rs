//! Form specification and the bind pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::coerce::{apply_files, apply_values};
use crate::config::FormConfig;
use crate::decode::{decode, RawForm};
use crate::error::{ErrorMessages, Result};
use crate::fields::FieldSpec;
use crate::output::{assemble, normalize_name, FormOutput, FormState};
use crate::request::FormRequest;
use crate::validation::ValidatorEngine;
use crate::value::DataType;

/// Default body size limit in megabytes.
pub const DEFAULT_LIMIT_MB: u64 = 256;

/// Anti-forgery token pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// True when both the name and the token are non-empty.
    pub enabled: bool,
    pub name: String,
    pub token: String,
}

impl Security {
    /// Creates a token pair, enabled iff both parts are non-empty.
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        let name = name.into();
        let token = token.into();
        Self {
            enabled: !name.is_empty() && !token.is_empty(),
            name,
            token,
        }
    }
}

/// Stages of a bind call.
///
/// Only `Decoding` can fail. A bind without a submitted body goes straight
/// from `Unbound` to `Assembled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindState {
    #[default]
    Unbound,
    Decoding,
    Coercing,
    Validating,
    Assembled,
}

/// A declared form.
///
/// Binding mutates the field values in place; use one spec per request when
/// handling requests concurrently.
#[derive(Debug, Clone)]
pub struct FormSpec {
    fields: Vec<FieldSpec>,
    method: String,
    action: String,
    name: String,
    limit: u64,
    security: Security,
    hx: bool,
    messages: Arc<ErrorMessages>,
    submitted: bool,
    state: BindState,
}

impl Default for FormSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSpec {
    /// Creates an empty form with the default size limit and messages.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            method: String::new(),
            action: String::new(),
            name: String::new(),
            limit: DEFAULT_LIMIT_MB,
            security: Security::default(),
            hx: false,
            messages: Arc::new(ErrorMessages::default()),
            submitted: false,
            state: BindState::Unbound,
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.push_field(field);
        self
    }

    /// Adds several fields.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        for field in fields {
            self.push_field(field);
        }
        self
    }

    fn push_field(&mut self, field: FieldSpec) {
        if let Some(existing) = self.colliding_field(field.name()) {
            warn!(
                field = field.name(),
                existing = existing.name(),
                "field names normalize to the same output slot; the later field wins"
            );
        }
        self.fields.push(field);
    }

    /// Returns the declared field that would share an output slot with `name`.
    fn colliding_field(&self, name: &str) -> Option<&FieldSpec> {
        let key = normalize_name(name);
        self.fields.iter().find(|f| normalize_name(f.name()) == key)
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the body size limit in megabytes.
    #[must_use]
    pub fn limit(mut self, limit_mb: u64) -> Self {
        self.limit = limit_mb;
        self
    }

    /// Sets the anti-forgery token pair.
    #[must_use]
    pub fn csrf(mut self, name: impl Into<String>, token: impl Into<String>) -> Self {
        self.security = Security::new(name, token);
        self
    }

    /// Marks the form as submitted through htmx.
    #[must_use]
    pub fn hx(mut self) -> Self {
        self.hx = true;
        self
    }

    /// Replaces the error message table.
    #[must_use]
    pub fn messages(mut self, messages: impl Into<Arc<ErrorMessages>>) -> Self {
        self.messages = messages.into();
        self
    }

    /// Applies the size limit and messages of a configuration.
    #[must_use]
    pub fn with_config(self, config: FormConfig) -> Self {
        self.limit(config.limit).messages(config.messages)
    }

    /// Returns the declared fields in declaration order.
    pub fn field_specs(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by its exact name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a field by its exact name for modification.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSpec> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Returns the body size limit in megabytes.
    pub fn size_limit(&self) -> u64 {
        self.limit
    }

    pub fn security(&self) -> &Security {
        &self.security
    }

    /// Returns the encoding a browser must use to submit this form.
    pub fn enctype(&self) -> &'static str {
        if self.fields.iter().any(|f| f.data_type == DataType::File) {
            "multipart/form-data"
        } else {
            "application/x-www-form-urlencoded"
        }
    }

    /// Returns whether the last bind decoded a submission.
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// Returns the aggregate validity: an unsubmitted form is always valid.
    pub fn is_valid(&self) -> bool {
        !self.submitted || self.fields.iter().all(|f| f.valid)
    }

    /// Returns the last stage reached.
    pub fn state(&self) -> BindState {
        self.state
    }

    /// Binds a request and assembles the result into a new `T`.
    ///
    /// Decode failures abort the bind; validation failures are reported in
    /// the output.
    pub fn bind<T: FormOutput + Default>(&mut self, request: &impl FormRequest) -> Result<T> {
        let mut out = T::default();
        self.bind_into(Some(request), &mut out)?;
        Ok(out)
    }

    /// Like [`FormSpec::bind`], but panics on decode failures.
    ///
    /// # Panics
    ///
    /// Panics when the request body cannot be decoded.
    pub fn must_bind<T: FormOutput + Default>(&mut self, request: &impl FormRequest) -> T {
        match self.bind(request) {
            Ok(out) => out,
            Err(err) => panic!("failed to bind form `{}`: {err}", self.name),
        }
    }

    /// Assembles the declared defaults into a new `T` without a request.
    pub fn render<T: FormOutput + Default>(&mut self) -> T {
        let mut out = T::default();
        self.reset();
        self.finish(&mut out, String::new());
        out
    }

    /// Binds an optional request into an existing output record.
    pub fn bind_into<T: FormOutput>(
        &mut self,
        request: Option<&dyn FormRequest>,
        out: &mut T,
    ) -> Result<()> {
        self.reset();

        let raw = match request {
            Some(request) if request.method().is_safe() => {
                debug!(method = %request.method(), "safe method, rendering defaults");
                None
            }
            Some(request) => {
                self.state = BindState::Decoding;
                decode(request, self.limit)?
            }
            None => None,
        };

        let mut submitted_token = String::new();
        if let Some(raw) = raw {
            self.submitted = true;
            self.coerce(&raw);
            if self.security.enabled {
                submitted_token = raw.first(&self.security.name).unwrap_or_default().to_string();
            }
            self.validate();
        }

        self.finish(out, submitted_token);
        Ok(())
    }

    fn reset(&mut self) {
        self.state = BindState::Unbound;
        self.submitted = false;
        for field in &mut self.fields {
            field.reset();
        }
    }

    fn coerce(&mut self, raw: &RawForm) {
        self.state = BindState::Coercing;
        for field in &mut self.fields {
            if let Some(values) = raw.values.get(&field.name) {
                apply_values(field, values);
            }
            if let Some(uploads) = raw.files.get(&field.name) {
                apply_files(field, uploads);
            }
        }
    }

    fn validate(&mut self) {
        self.state = BindState::Validating;
        let engine = ValidatorEngine::new(&self.messages);
        for field in &mut self.fields {
            field.errors = engine.validate(&field.validators, &field.value);
            field.valid = field.errors.is_empty();
            if !field.valid {
                debug!(field = %field.name, errors = field.errors.len(), "field failed validation");
            }
        }
    }

    fn finish<T: FormOutput>(&mut self, out: &mut T, submitted_token: String) {
        let state = FormState {
            method: self.method.clone(),
            action: self.action.clone(),
            name: self.name.clone(),
            enctype: self.enctype().to_string(),
            valid: self.is_valid(),
            submitted: self.submitted,
            security: self.security.clone(),
            submitted_token,
            hx: self.hx,
        };
        assemble(out, &self.fields, state);
        self.state = BindState::Assembled;
        info!(
            form = %self.name,
            submitted = self.submitted,
            valid = self.is_valid(),
            "form assembled"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, FormError};
    use crate::fields::{email, file, number, text, FieldSpec};
    use crate::output::BoundForm;
    use crate::request::{Method, MultipartBody, Request};
    use crate::validation::Validator;
    use crate::value::Value;

    fn signup() -> FormSpec {
        FormSpec::new()
            .name("signup")
            .method("POST")
            .action("/signup")
            .field(FieldSpec::new("email").with(email(), [Validator::required(), Validator::email()]))
            .field(FieldSpec::new("age").with(number::<i64>().value(18), [Validator::min(17)]))
    }

    fn codes(form: &BoundForm, name: &str) -> Vec<Option<ErrorCode>> {
        form.get(name)
            .map(|f| f.errors.iter().map(|e| e.code()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_normalized_name_collisions_are_detected() {
        let spec = FormSpec::new()
            .field(FieldSpec::new("first_name").with(text(), []))
            .field(FieldSpec::new("First-Name").with(text(), []));
        assert_eq!(spec.field_specs().len(), 2);
        assert_eq!(
            spec.colliding_field("firstname").map(FieldSpec::name),
            Some("first_name")
        );
        assert!(spec.colliding_field("last_name").is_none());
    }

    #[test]
    fn test_render_uses_defaults_and_is_valid() {
        let mut spec = signup();
        let out: BoundForm = spec.render();
        assert!(out.form.valid);
        assert!(!out.form.submitted);
        assert_eq!(out.get("age").map(|f| &f.value), Some(&Value::Int(18)));
        assert!(out.fields.iter().all(|f| f.errors.is_empty()));
        assert_eq!(spec.state(), BindState::Assembled);
    }

    #[test]
    fn test_post_runs_validation() {
        let mut spec = signup();
        let req = Request::post("/signup").form(&[("email", "not-an-email"), ("age", "12")]);
        let out: BoundForm = spec.bind(&req).unwrap();
        assert!(out.form.submitted);
        assert!(!out.form.valid);
        assert_eq!(codes(&out, "email"), [Some(ErrorCode::Email)]);
        assert_eq!(codes(&out, "age"), [Some(ErrorCode::NumberMin)]);
        assert!(!spec.is_valid());
    }

    #[test]
    fn test_safe_method_skips_validation() {
        let mut spec = signup();
        let req = Request::get("/signup?email=").body("email=");
        let out: BoundForm = spec.bind(&req).unwrap();
        assert!(!out.form.submitted);
        assert!(out.form.valid);
        assert!(codes(&out, "email").is_empty());
    }

    #[test]
    fn test_missing_body_is_a_render() {
        let mut spec = signup();
        let req = Request::new(Method::Delete, "/signup");
        let out: BoundForm = spec.bind(&req).unwrap();
        assert!(!out.form.submitted);
        assert!(out.form.valid);
    }

    #[test]
    fn test_unknown_content_type_is_submitted_without_data() {
        let mut spec = signup();
        let req = Request::post("/signup")
            .header("Content-Type", "text/plain")
            .body("email=a@b.com");
        let out: BoundForm = spec.bind(&req).unwrap();
        assert!(out.form.submitted);
        assert_eq!(codes(&out, "email"), [Some(ErrorCode::Required)]);
    }

    #[test]
    fn test_rebinding_starts_from_defaults() {
        let mut spec = signup();
        let first = Request::post("/").form(&[("email", "bad"), ("age", "40")]);
        let _: BoundForm = spec.bind(&first).unwrap();
        assert!(!spec.is_valid());

        let second = Request::post("/").form(&[("email", "a@b.com")]);
        let out: BoundForm = spec.bind(&second).unwrap();
        assert!(out.form.valid);
        assert_eq!(out.get("age").map(|f| &f.value), Some(&Value::Int(18)));
    }

    #[test]
    fn test_decode_failure_aborts() {
        let mut spec = signup().limit(0);
        let req = Request::post("/").form(&[("email", "a@b.com")]);
        let err = spec.bind::<BoundForm>(&req).unwrap_err();
        assert!(matches!(err, FormError::BodyTooLarge { limit: 0, .. }));
        assert_eq!(spec.state(), BindState::Decoding);
    }

    #[test]
    #[should_panic(expected = "failed to bind form `signup`")]
    fn test_must_bind_panics_on_decode_failure() {
        let mut spec = signup().limit(0);
        let req = Request::post("/").form(&[("email", "a@b.com")]);
        let _: BoundForm = spec.must_bind(&req);
    }

    #[test]
    fn test_csrf_token_is_echoed() {
        let mut spec = signup().csrf("_token", "s3cr3t");
        let req = Request::post("/").form(&[("_token", "posted"), ("email", "a@b.com")]);
        let out: BoundForm = spec.bind(&req).unwrap();
        assert!(out.form.security.enabled);
        assert_eq!(out.form.security.token, "s3cr3t");
        assert_eq!(out.form.submitted_token, "posted");
    }

    #[test]
    fn test_security_requires_both_parts() {
        assert!(!Security::new("_token", "").enabled);
        assert!(!Security::new("", "abc").enabled);
        assert!(Security::new("_token", "abc").enabled);
    }

    #[test]
    fn test_enctype_follows_file_fields() {
        assert_eq!(signup().enctype(), "application/x-www-form-urlencoded");
        let upload = signup().field(FieldSpec::new("avatar").with(file(), []));
        assert_eq!(upload.enctype(), "multipart/form-data");
    }

    #[test]
    fn test_multipart_submission() {
        let mut spec = FormSpec::new()
            .field(FieldSpec::new("title").with(text(), [Validator::required()]))
            .field(FieldSpec::new("avatar").with(file(), [Validator::required()]));
        let body = MultipartBody::new()
            .text("title", "Me")
            .file("avatar", "me.gif", "image/png", b"GIF89a\x01\x00");
        let out: BoundForm = spec.bind(&Request::post("/").multipart(body)).unwrap();

        assert!(out.form.valid);
        let Some(Value::File(avatar)) = out.get("avatar").map(|f| &f.value) else {
            panic!("avatar should hold a file");
        };
        assert_eq!(avatar.mime_type, "image/gif");
        assert_eq!(avatar.extension, "gif");
    }

    #[test]
    fn test_field_lookup() {
        let mut spec = signup();
        assert!(spec.get("email").is_some());
        assert!(spec.get("Email").is_none());
        let age = spec.get_mut("age").unwrap();
        age.set_defaults(Value::Int(21));
        let out: BoundForm = spec.render();
        assert_eq!(out.get("age").map(|f| &f.value), Some(&Value::Int(21)));
    }
}
