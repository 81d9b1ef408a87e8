//! Joining a group by its code.

use api::{Api, AuthContext, Transport};
use forms::{FieldRule, Form, FormField, FormFieldKind, FormSchema};

use super::{Submitted, submit, success_text};
use crate::effects::{Effect, Effects, Notice};
use crate::role::Role;
use crate::route::{GroupLookup, Route, parse_group_lookup, resolve_destination};

pub fn join_group_form() -> Form {
    Form::new(
        FormSchema::new(
            "Join group",
            vec![
                FormField::new("group_code", "Group code", FormFieldKind::Text)
                    .rule(FieldRule::GroupCode)
                    .help("Ask your finance coordinator for the code"),
            ],
        )
        .description("You are not in a group yet"),
    )
}

/// Join, then land on the dashboard matching the joined group's type.
pub async fn join_group<T: Transport>(
    form: &mut Form,
    api: &Api<T>,
    auth: &AuthContext,
) -> Effects {
    let body = match submit(form, |body| api.join_group(auth, body)).await {
        Submitted::Done(body) => body,
        other => return other.into_effects(),
    };

    let route = match parse_group_lookup(&body) {
        GroupLookup::NoGroup => Route::StudentHome,
        group => resolve_destination(Role::Student, &group),
    };
    vec![
        Effect::Notify(Notice::success(success_text(&body, "You have joined the group."))),
        Effect::Navigate(route),
    ]
}
