//! Forgot / reset password. A reset link is verified before its form is
//! shown.

use api::{Api, Transport};
use forms::{FieldRule, Form, FormField, FormFieldKind, FormSchema};
use tracing::warn;

use super::{describe_failure, submit, success_text};
use crate::effects::{Effect, Effects, Notice};
use crate::route::Route;

pub fn forgot_password_form() -> Form {
    Form::new(FormSchema::new(
        "Forgot password",
        vec![FormField::new("email", "Email", FormFieldKind::Text).rule(FieldRule::Email)],
    ))
}

pub fn reset_password_form() -> Form {
    Form::new(FormSchema::new(
        "Reset password",
        vec![
            FormField::new("password", "New password", FormFieldKind::Secret)
                .rule(FieldRule::Password),
            FormField::new("confirm_password", "Confirm password", FormFieldKind::Secret)
                .rule(FieldRule::ConfirmPassword)
                .peer("password")
                .local(),
        ],
    ))
}

pub async fn forgot_password<T: Transport>(form: &mut Form, api: &Api<T>) -> Effects {
    match submit(form, |body| api.forgot_password(body)).await {
        super::Submitted::Done(body) => vec![
            Effect::Notify(Notice::success(success_text(
                &body,
                "If that email is registered, a reset link is on its way.",
            ))),
            Effect::Navigate(Route::Login),
        ],
        other => other.into_effects(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetLink {
    Valid,
    Invalid(String),
}

pub async fn verify_reset_link<T: Transport>(api: &Api<T>, token: &str) -> ResetLink {
    if token.trim().is_empty() {
        return ResetLink::Invalid("This reset link is invalid.".into());
    }
    match api.verify_reset_token(token).await {
        Ok(_) => ResetLink::Valid,
        Err(e) => {
            warn!(error = %e, "reset link rejected");
            ResetLink::Invalid(describe_failure(&e))
        }
    }
}

pub async fn reset_password<T: Transport>(form: &mut Form, api: &Api<T>, token: &str) -> Effects {
    match submit(form, |body| api.reset_password(token, body)).await {
        super::Submitted::Done(body) => vec![
            Effect::Notify(Notice::success(success_text(
                &body,
                "Password updated. Please log in.",
            ))),
            Effect::Navigate(Route::Login),
        ],
        other => other.into_effects(),
    }
}
