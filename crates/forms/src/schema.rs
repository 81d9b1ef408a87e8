//! Form schema definition: the ordered fields of one form plus its title.
//!
//! ```ignore
//! use forms::{FieldRule, FormField, FormFieldKind, FormSchema};
//!
//! let schema = FormSchema::new("Login", vec![
//!     FormField::new("email", "Email", FormFieldKind::Text).rule(FieldRule::Email),
//!     FormField::new("password", "Password", FormFieldKind::Secret).rule(FieldRule::Required),
//! ]);
//! ```
use super::FormField;

#[derive(Debug)]
pub struct FormSchema {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// True when one of the fields carries a file attachment.
    pub fn has_file_field(&self) -> bool {
        self.fields.iter().any(FormField::is_file)
    }
}
