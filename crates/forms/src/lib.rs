//! Client-side field validation and form submission state.

mod field;
mod schema;
mod state;
mod submission;
pub mod validate;

pub use field::{FormField, FormFieldKind};
pub use schema::FormSchema;
pub use state::{Attachment, FormState};
pub use submission::{Form, FormPayload, Rejected, SubmissionPhase, SubmitOutcome};
pub use validate::{
    ErrorCode, FieldError, FieldRule, PasswordCheck, PasswordStrength, password_strength,
    validate, validate_field,
};
