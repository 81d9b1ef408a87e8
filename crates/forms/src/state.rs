//! Mutable per-form state.
//!
//! Only the mutators below touch the state. `update` clears the error of the
//! field it writes and nothing else; errors of other fields stay until that
//! field changes or is revalidated.

use std::collections::HashMap;

use crate::submission::SubmissionPhase;
use crate::validate::FieldError;

/// A file picked for upload (e.g. a payment receipt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default, Clone)]
pub struct FormState {
    values: HashMap<String, String>,
    errors: HashMap<String, FieldError>,
    server_error: Option<String>,
    attachment: Option<Attachment>,
    phase: SubmissionPhase,
}

impl FormState {
    /// Set a value and drop that field's current error.
    pub fn update(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
        self.errors.remove(key);
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn set_error(&mut self, key: &str, error: Option<FieldError>) {
        match error {
            Some(err) => {
                self.errors.insert(key.to_string(), err);
            }
            None => {
                self.errors.remove(key);
            }
        }
    }

    pub fn error(&self, key: &str) -> Option<&FieldError> {
        self.errors.get(key)
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn set_server_error(&mut self, message: Option<String>) {
        self.server_error = message;
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    /// Store the attachment and clear the error of the field carrying it.
    pub fn set_attachment(&mut self, attachment: Option<Attachment>) {
        if let Some(a) = &attachment {
            self.errors.remove(&a.field);
        }
        self.attachment = attachment;
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    pub(crate) fn set_phase(&mut self, phase: SubmissionPhase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{FieldRule, validate};

    #[test]
    fn update_clears_only_its_own_error() {
        let mut state = FormState::default();
        state.set_error("email", validate(FieldRule::Email, "", None));
        state.set_error("password", validate(FieldRule::Password, "", None));

        state.update("email", "a@b.com");

        assert!(state.error("email").is_none());
        assert!(state.error("password").is_some());
        assert_eq!(state.value("email"), Some("a@b.com"));
    }

    #[test]
    fn set_error_none_clears() {
        let mut state = FormState::default();
        state.set_error("name", validate(FieldRule::Name, "", None));
        assert!(state.has_errors());
        state.set_error("name", None);
        assert!(!state.has_errors());
    }

    #[test]
    fn defaults_to_idle_without_server_error() {
        let state = FormState::default();
        assert_eq!(state.phase(), SubmissionPhase::Idle);
        assert!(!state.is_submitting());
        assert!(state.server_error().is_none());
    }
}
