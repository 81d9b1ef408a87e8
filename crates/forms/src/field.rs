//! Form field type & metadata.
//!
//! ```ignore
//! use forms::{FormField, FormFieldKind, FieldRule};
//!
//! let field = FormField::new("confirm_password", "Confirm password", FormFieldKind::Secret)
//!     .rule(FieldRule::ConfirmPassword)
//!     .peer("password");
//! ```

use crate::validate::{FieldError, FieldRule, validate_field};

/// Input kind of a field; decides how the value is serialized on submit.
///
/// - Text / Secret / Date / Select are sent as strings
/// - Number is sent as a JSON number when it parses
/// - File marks the field that carries the form's attachment
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldKind {
    Text,
    Secret,
    Number,
    Date,
    Select { options: Vec<String> },
    File,
}

type CustomValidator = Box<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

/// Declarative description of a form field.
///
/// `rule` applies one of the built-in validators. `validator` is an extra
/// closure checked after the rule passes; it returns `Err(message)` to reject.
pub struct FormField {
    pub key: String,
    pub label: String,
    pub kind: FormFieldKind,
    pub help: Option<String>,
    pub rule: Option<FieldRule>,
    /// Key of the field a `ConfirmPassword` rule compares against.
    pub peer: Option<String>,
    /// Validated but never sent (e.g. the password confirmation).
    pub local: bool,
    pub validator: Option<CustomValidator>,
}

impl FormField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FormFieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            help: None,
            rule: None,
            peer: None,
            local: false,
            validator: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn peer(mut self, key: impl Into<String>) -> Self {
        self.peer = Some(key.into());
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    pub fn validator(
        mut self,
        f: impl Fn(&str) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, FormFieldKind::File)
    }

    /// Run the rule, then the custom validator, against `value`.
    pub fn check(&self, value: &str, peer_value: Option<&str>) -> Option<FieldError> {
        if let Some(rule) = self.rule {
            if let Some(err) = validate_field(&self.key, rule, value, peer_value) {
                return Some(err);
            }
        }
        if let FormFieldKind::Select { options } = &self.kind {
            if !value.is_empty() && !options.iter().any(|o| o == value) {
                return Some(FieldError::new(
                    &self.key,
                    crate::validate::ErrorCode::InvalidFormat,
                    format!("{} must be one of: {}", self.label, options.join(", ")),
                ));
            }
        }
        if let Some(custom) = &self.validator {
            if let Err(message) = custom(value) {
                return Some(FieldError::new(
                    &self.key,
                    crate::validate::ErrorCode::InvalidFormat,
                    message,
                ));
            }
        }
        None
    }
}

impl std::fmt::Debug for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormField")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("rule", &self.rule)
            .field("peer", &self.peer)
            .field("local", &self.local)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
