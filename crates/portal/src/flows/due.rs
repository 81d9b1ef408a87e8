//! Dues created by a group's treasurer.

use api::{Api, AuthContext, Transport};
use forms::{FieldRule, Form, FormField, FormFieldKind, FormSchema};
use tracing::warn;

use super::{Submitted, submit, success_text};
use crate::effects::{Effect, Effects, Notice};
use crate::role::Role;
use crate::route::Route;

pub const TREASURER_ONLY: &str = "Only treasurers can create dues.";

pub fn due_form() -> Form {
    Form::new(FormSchema::new(
        "Create due",
        vec![
            FormField::new("title", "Title", FormFieldKind::Text).rule(FieldRule::Required),
            FormField::new("amount", "Amount", FormFieldKind::Number).rule(FieldRule::Amount),
            FormField::new("due_date", "Due date", FormFieldKind::Date)
                .rule(FieldRule::Date)
                .help("YYYY-MM-DD"),
            FormField::new("description", "Description", FormFieldKind::Text),
        ],
    ))
}

/// Non-treasurers are stopped before any request is made.
pub async fn create_due<T: Transport>(
    form: &mut Form,
    api: &Api<T>,
    auth: &AuthContext,
    role: Role,
) -> Effects {
    if role != Role::Treasurer {
        warn!(%role, "due creation refused");
        form.report(TREASURER_ONLY);
        return Vec::new();
    }

    match submit(form, |body| api.create_due(auth, body)).await {
        Submitted::Done(body) => vec![
            Effect::Notify(Notice::success(success_text(&body, "Due created."))),
            Effect::Navigate(Route::TreasurerDashboard),
        ],
        other => other.into_effects(),
    }
}
