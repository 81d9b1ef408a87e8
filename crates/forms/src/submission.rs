//! Submission phases of a form.
//!
//! ```text
//!  Idle ──submit──▶ Validating ──errors──▶ Idle
//!   ▲                   │
//!   │                 clean
//!   │                   ▼
//! Failed ◀──fail── Submitting ──succeed──▶ Succeeded
//! ```
//!
//! `begin_submit` performs the Validating step synchronously and hands out the
//! payload for exactly one request. While a request is in flight every further
//! `begin_submit` is rejected. There is no retry: after `Failed` the caller has
//! to submit again explicitly, and the field values are still there.

use std::future::Future;

use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use thiserror::Error;
use tracing::{debug, warn};

use crate::field::FormFieldKind;
use crate::schema::FormSchema;
use crate::state::{Attachment, FormState};
use crate::validate::FieldError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Why `begin_submit` did not hand out a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the form was already submitted successfully")]
    Completed,
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),
}

/// Body of the single request a submission issues.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPayload {
    Json(JsonValue),
    /// Used as soon as an attachment is present.
    Multipart {
        fields: Vec<(String, String)>,
        attachment: Attachment,
    },
}

/// Result of [`Form::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Succeeded(T),
    /// Server-level message, also stored as the form's `server_error`.
    Failed(String),
    Rejected(Rejected),
}

impl<T> SubmitOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }
}

/// A schema together with its live state.
#[derive(Debug)]
pub struct Form {
    schema: FormSchema,
    state: FormState,
}

impl Form {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            state: FormState::default(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.phase()
    }

    pub fn update(&mut self, key: &str, value: impl Into<String>) {
        self.state.update(key, value);
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.state.set_attachment(Some(attachment));
    }

    /// Value a field is validated against. File fields see the attachment's
    /// file name (or nothing).
    fn raw_value(&self, key: &str) -> String {
        let is_file = self
            .schema
            .field_by_key(key)
            .map(|f| f.is_file())
            .unwrap_or(false);
        if is_file {
            return self
                .state
                .attachment()
                .filter(|a| a.field == key)
                .map(|a| a.file_name.clone())
                .unwrap_or_default();
        }
        self.state.value(key).unwrap_or("").to_string()
    }

    fn check_field(&self, key: &str) -> Option<FieldError> {
        let field = self.schema.field_by_key(key)?;
        let value = self.raw_value(key);
        let peer = field
            .peer
            .as_deref()
            .map(|peer_key| self.raw_value(peer_key));
        field.check(&value, peer.as_deref())
    }

    /// Validate one field (e.g. on blur) and store the result.
    pub fn validate_field(&mut self, key: &str) -> Option<FieldError> {
        let result = self.check_field(key);
        self.state.set_error(key, result.clone());
        result
    }

    /// Validate every field; returns true when none failed.
    pub fn validate_all(&mut self) -> bool {
        let keys: Vec<String> = self.schema.fields.iter().map(|f| f.key.clone()).collect();
        for key in keys {
            self.validate_field(&key);
        }
        !self.state.has_errors()
    }

    /// Build the request body from the current values.
    pub fn payload(&self) -> FormPayload {
        let mut map = JsonMap::new();
        let mut pairs = Vec::new();

        for f in self.schema.fields.iter().filter(|f| !f.local && !f.is_file()) {
            let raw = self.state.value(&f.key).unwrap_or("");
            // Secrets go out verbatim; everything else is trimmed.
            let v = match f.kind {
                FormFieldKind::Secret => raw.to_string(),
                _ => raw.trim().to_string(),
            };
            let json = match &f.kind {
                FormFieldKind::Number => number_value(&v).unwrap_or(JsonValue::String(v.clone())),
                _ => JsonValue::String(v.clone()),
            };
            map.insert(f.key.clone(), json);
            pairs.push((f.key.clone(), v));
        }

        // An attachment only travels with a form that declares a file field.
        let attachment = self
            .state
            .attachment()
            .filter(|_| self.schema.has_file_field());
        match attachment {
            Some(attachment) => FormPayload::Multipart {
                fields: pairs,
                attachment: attachment.clone(),
            },
            None => FormPayload::Json(JsonValue::Object(map)),
        }
    }

    /// Validating step: on success the form is Submitting and the payload is
    /// returned; on failure the errors are stored and the form is Idle.
    pub fn begin_submit(&mut self) -> Result<FormPayload, Rejected> {
        match self.state.phase() {
            SubmissionPhase::Submitting => {
                warn!(form = %self.schema.title, "submit ignored while a request is in flight");
                return Err(Rejected::InFlight);
            }
            SubmissionPhase::Succeeded => return Err(Rejected::Completed),
            _ => {}
        }

        self.state.set_phase(SubmissionPhase::Validating);
        if !self.validate_all() {
            let errors: Vec<FieldError> = self
                .schema
                .fields
                .iter()
                .filter_map(|f| self.state.error(&f.key).cloned())
                .collect();
            debug!(
                form = %self.schema.title,
                errors = errors.len(),
                "submission aborted by validation"
            );
            self.state.set_phase(SubmissionPhase::Idle);
            return Err(Rejected::Invalid(errors));
        }

        self.state.set_server_error(None);
        self.state.set_phase(SubmissionPhase::Submitting);
        Ok(self.payload())
    }

    /// Submitting → Succeeded. Ignored in any other phase.
    pub fn succeed(&mut self) -> bool {
        if !self.state.is_submitting() {
            debug!(phase = %self.state.phase(), "late success discarded");
            return false;
        }
        self.state.set_phase(SubmissionPhase::Succeeded);
        true
    }

    /// Submitting → Failed with a server-level message; values are kept.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.state.is_submitting() {
            debug!(phase = %self.state.phase(), "late failure discarded");
            return false;
        }
        self.state.set_server_error(Some(message.into()));
        self.state.set_phase(SubmissionPhase::Failed);
        true
    }

    /// Server-level message raised without a request, e.g. a precondition
    /// the page checks itself. Only allowed while no request is in flight.
    pub fn report(&mut self, message: impl Into<String>) -> bool {
        if self.state.is_submitting() {
            return false;
        }
        self.state.set_server_error(Some(message.into()));
        true
    }

    /// Back to an empty Idle form.
    pub fn reset(&mut self) {
        self.state = FormState::default();
    }

    /// Full single-attempt submission: validate, call `send` once with the
    /// payload, record the outcome.
    pub async fn submit<T, F, Fut>(&mut self, send: F) -> SubmitOutcome<T>
    where
        F: FnOnce(FormPayload) -> Fut,
        Fut: Future<Output = Result<T, String>>,
    {
        let payload = match self.begin_submit() {
            Ok(payload) => payload,
            Err(rejected) => return SubmitOutcome::Rejected(rejected),
        };

        match send(payload).await {
            Ok(value) => {
                self.succeed();
                SubmitOutcome::Succeeded(value)
            }
            Err(message) => {
                self.fail(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}

fn number_value(raw: &str) -> Option<JsonValue> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(JsonValue::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(JsonValue::Number)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::field::FormField;
    use crate::validate::{ErrorCode, FieldRule};

    fn login_form() -> Form {
        Form::new(FormSchema::new(
            "Login",
            vec![
                FormField::new("email", "Email", FormFieldKind::Text).rule(FieldRule::Email),
                FormField::new("password", "Password", FormFieldKind::Secret)
                    .rule(FieldRule::Password),
            ],
        ))
    }

    fn filled_login() -> Form {
        let mut form = login_form();
        form.update("email", "a@b.com");
        form.update("password", "Abcdef1!");
        form
    }

    #[tokio::test]
    async fn invalid_field_never_reaches_the_network() {
        let calls = Cell::new(0);
        let mut form = login_form();
        form.update("email", "a@b.com");

        let outcome = form
            .submit(|_| async {
                calls.set(calls.get() + 1);
                Ok::<_, String>(())
            })
            .await;

        assert_eq!(calls.get(), 0);
        match outcome {
            SubmitOutcome::Rejected(Rejected::Invalid(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "password");
                assert_eq!(errors[0].code, ErrorCode::Required);
            }
            other => panic!("expected validation rejection, got {other:?}"),
        }
        assert_eq!(form.phase(), SubmissionPhase::Idle);
        assert!(!form.state().is_submitting());
    }

    #[tokio::test]
    async fn server_failure_keeps_values_and_stores_message() {
        let mut form = filled_login();

        let outcome: SubmitOutcome<()> = form.submit(|_| async { Err("x".to_string()) }).await;

        assert_eq!(outcome, SubmitOutcome::Failed("x".into()));
        assert!(!form.state().is_submitting());
        assert_eq!(form.state().server_error(), Some("x"));
        assert_eq!(form.state().value("email"), Some("a@b.com"));
        assert_eq!(form.state().value("password"), Some("Abcdef1!"));
        assert_eq!(form.phase(), SubmissionPhase::Failed);
    }

    #[tokio::test]
    async fn failed_form_can_be_resubmitted() {
        let mut form = filled_login();
        let _: SubmitOutcome<()> = form.submit(|_| async { Err("down".to_string()) }).await;

        let outcome = form.submit(|_| async { Ok::<_, String>(7) }).await;

        assert_eq!(outcome, SubmitOutcome::Succeeded(7));
        assert_eq!(form.phase(), SubmissionPhase::Succeeded);
        assert!(form.state().server_error().is_none());
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut form = filled_login();
        assert!(form.begin_submit().is_ok());
        assert!(form.state().is_submitting());
        assert_eq!(form.begin_submit(), Err(Rejected::InFlight));
        assert!(form.succeed());
        assert_eq!(form.begin_submit(), Err(Rejected::Completed));
    }

    #[test]
    fn outcome_outside_submitting_is_discarded() {
        let mut form = filled_login();
        assert!(!form.fail("late"));
        assert!(form.state().server_error().is_none());
        assert_eq!(form.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn report_is_refused_while_in_flight() {
        let mut form = filled_login();
        assert!(form.report("not allowed"));
        assert_eq!(form.state().server_error(), Some("not allowed"));

        form.begin_submit().unwrap();
        assert!(form.state().server_error().is_none());
        assert!(!form.report("late"));
        assert!(form.state().server_error().is_none());
    }

    #[test]
    fn json_payload_skips_local_fields_and_types_numbers() {
        let mut form = Form::new(FormSchema::new(
            "Register",
            vec![
                FormField::new("password", "Password", FormFieldKind::Secret)
                    .rule(FieldRule::Password),
                FormField::new("confirm_password", "Confirm", FormFieldKind::Secret)
                    .rule(FieldRule::ConfirmPassword)
                    .peer("password")
                    .local(),
                FormField::new("amount", "Amount", FormFieldKind::Number).rule(FieldRule::Amount),
            ],
        ));
        form.update("password", "Abcdef1!");
        form.update("confirm_password", "Abcdef1!");
        form.update("amount", "150.5");

        let payload = form.begin_submit().unwrap();
        assert_eq!(
            payload,
            FormPayload::Json(json!({"password": "Abcdef1!", "amount": 150.5}))
        );
    }

    #[test]
    fn confirm_mismatch_blocks_submission() {
        let mut form = Form::new(FormSchema::new(
            "Reset",
            vec![
                FormField::new("password", "Password", FormFieldKind::Secret)
                    .rule(FieldRule::Password),
                FormField::new("confirm_password", "Confirm", FormFieldKind::Secret)
                    .rule(FieldRule::ConfirmPassword)
                    .peer("password"),
            ],
        ));
        form.update("password", "Abcdef1!");
        form.update("confirm_password", "Abcdef1?");

        let err = form.begin_submit().unwrap_err();
        assert!(matches!(err, Rejected::Invalid(ref e) if e[0].code == ErrorCode::Mismatch));
    }

    #[test]
    fn attachment_switches_to_multipart() {
        let mut form = Form::new(FormSchema::new(
            "Pay",
            vec![
                FormField::new("amount", "Amount", FormFieldKind::Number).rule(FieldRule::Amount),
                FormField::new("receipt", "Receipt", FormFieldKind::File)
                    .rule(FieldRule::Required),
            ],
        ));
        form.update("amount", "100");
        assert!(matches!(form.begin_submit(), Err(Rejected::Invalid(_))));

        form.attach(Attachment {
            field: "receipt".into(),
            file_name: "receipt.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        });
        match form.begin_submit().unwrap() {
            FormPayload::Multipart { fields, attachment } => {
                assert_eq!(fields, vec![("amount".to_string(), "100".to_string())]);
                assert_eq!(attachment.file_name, "receipt.png");
            }
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[test]
    fn attachment_without_file_field_stays_json() {
        let mut form = filled_login();
        form.attach(Attachment {
            field: "receipt".into(),
            file_name: "stray.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1],
        });

        assert_eq!(
            form.payload(),
            FormPayload::Json(json!({"email": "a@b.com", "password": "Abcdef1!"}))
        );
    }
}
