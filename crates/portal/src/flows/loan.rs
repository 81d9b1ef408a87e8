//! Loan requests.

use api::{Api, AuthContext, Transport};
use forms::{FieldRule, Form, FormField, FormFieldKind, FormSchema};

use super::{Submitted, submit, success_text};
use crate::effects::{Effect, Effects, Notice};

pub const MAX_REASON_LENGTH: usize = 250;

pub fn loan_form() -> Form {
    Form::new(FormSchema::new(
        "Request loan",
        vec![
            FormField::new("amount", "Amount", FormFieldKind::Number).rule(FieldRule::Amount),
            FormField::new("reason", "Reason", FormFieldKind::Text)
                .rule(FieldRule::Required)
                .validator(|value| {
                    if value.trim().chars().count() > MAX_REASON_LENGTH {
                        Err(format!("Reason must be at most {MAX_REASON_LENGTH} characters"))
                    } else {
                        Ok(())
                    }
                }),
        ],
    ))
}

pub async fn request_loan<T: Transport>(
    form: &mut Form,
    api: &Api<T>,
    auth: &AuthContext,
) -> Effects {
    match submit(form, |body| api.request_loan(auth, body)).await {
        Submitted::Done(body) => vec![Effect::Notify(Notice::success(success_text(
            &body,
            "Loan request submitted.",
        )))],
        other => other.into_effects(),
    }
}
