//! Login, registration and logout.

use api::{Api, ApiError, ApiResult, Session, TokenStore, Transport};
use forms::{FieldRule, Form, FormField, FormFieldKind, FormSchema};

use super::{Submitted, submit, success_text};
use crate::effects::{Effect, Effects, Notice};
use crate::role::resolve_role;
use crate::route::{Route, route_after_login};

pub fn login_form() -> Form {
    Form::new(
        FormSchema::new(
            "Login",
            vec![
                FormField::new("email", "Email", FormFieldKind::Text).rule(FieldRule::Email),
                FormField::new("password", "Password", FormFieldKind::Secret)
                    .rule(FieldRule::Required),
            ],
        )
        .description("Sign in to track your contributions"),
    )
}

pub fn register_form() -> Form {
    Form::new(FormSchema::new(
        "Register",
        vec![
            FormField::new("name", "Full name", FormFieldKind::Text).rule(FieldRule::Name),
            FormField::new("email", "Email", FormFieldKind::Text).rule(FieldRule::Email),
            FormField::new("password", "Password", FormFieldKind::Secret)
                .rule(FieldRule::Password)
                .help(
                    "At least 8 characters with upper- and lowercase letters, \
                     a number and a special character",
                ),
            FormField::new("confirm_password", "Confirm password", FormFieldKind::Secret)
                .rule(FieldRule::ConfirmPassword)
                .peer("password")
                .local(),
        ],
    ))
}

async fn grant_session<T: Transport, S: TokenStore>(
    result: Submitted,
    api: &Api<T>,
    session: &Session<S>,
    fallback: &str,
) -> Effects {
    let Submitted::Done(payload) = result else {
        return result.into_effects();
    };
    let role = resolve_role(&payload);
    let route = route_after_login(api, session.context(), role).await;
    vec![
        Effect::Notify(Notice::success(success_text(&payload, fallback))),
        Effect::Navigate(route),
    ]
}

/// Authenticate, persist the token, then route by role.
pub async fn login<T: Transport, S: TokenStore>(
    form: &mut Form,
    api: &Api<T>,
    session: &mut Session<S>,
) -> Effects {
    let store = &mut *session;
    let result = submit(form, |body| async move {
        let grant = api.authenticate(body).await?;
        store.establish(grant.token)?;
        Ok::<_, ApiError>(grant.payload)
    })
    .await;
    grant_session(result, api, session, "Login successful").await
}

pub async fn register<T: Transport, S: TokenStore>(
    form: &mut Form,
    api: &Api<T>,
    session: &mut Session<S>,
) -> Effects {
    let store = &mut *session;
    let result = submit(form, |body| async move {
        let grant = api.register(body).await?;
        store.establish(grant.token)?;
        Ok::<_, ApiError>(grant.payload)
    })
    .await;
    grant_session(result, api, session, "Registration successful").await
}

/// Clear the persisted token and go back to the login page.
pub fn logout<S: TokenStore>(session: &mut Session<S>) -> ApiResult<Effects> {
    session.end()?;
    Ok(vec![
        Effect::Notify(Notice::info("You have been logged out.")),
        Effect::Navigate(Route::Login),
    ])
}
