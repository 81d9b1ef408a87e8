//! One module per page form. Every flow goes through [`submit`]: validate,
//! one request, interpret, then effects.

mod auth;
mod due;
mod group;
mod loan;
mod password;
mod payment;

pub use auth::{login, login_form, logout, register, register_form};
pub use due::{TREASURER_ONLY, create_due, due_form};
pub use group::{join_group, join_group_form};
pub use loan::{loan_form, request_loan};
pub use password::{
    ResetLink, forgot_password, forgot_password_form, reset_password, reset_password_form,
    verify_reset_link,
};
pub use payment::{AWAITING_VERIFICATION, load_weeks, payment_form, submit_payment};

use std::future::Future;

use api::{ApiError, ApiResult, RequestBody, Upload};
use forms::{Form, FormPayload, SubmitOutcome};
use serde_json::Value;
use tracing::{debug, info};

use crate::effects::{Effect, Effects};
use crate::route::Route;

pub const ALREADY_PAID: &str = "This week has already been paid.";

/// Result of one orchestrated submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Done(Value),
    /// Validation or server failure; details are on the form.
    Stay,
    /// The session is missing or was refused by the server.
    SignedOut,
}

impl Submitted {
    /// Effects for anything but success.
    pub fn into_effects(self) -> Effects {
        match self {
            Submitted::SignedOut => vec![Effect::Navigate(Route::Login)],
            Submitted::Done(_) | Submitted::Stay => Vec::new(),
        }
    }
}

pub fn request_body(payload: FormPayload) -> RequestBody {
    match payload {
        FormPayload::Json(value) => RequestBody::Json(value),
        FormPayload::Multipart { fields, attachment } => RequestBody::Multipart {
            fields,
            upload: Upload {
                field: attachment.field,
                file_name: attachment.file_name,
                content_type: attachment.content_type,
                bytes: attachment.bytes,
            },
        },
    }
}

/// Banner text for a failed call, with known backend answers rewritten.
pub fn describe_failure(err: &ApiError) -> String {
    let message = err.user_message();
    if message.to_lowercase().contains("already paid") {
        return ALREADY_PAID.to_string();
    }
    message
}

fn ends_session(err: &ApiError) -> bool {
    matches!(err, ApiError::Unauthenticated) || err.status() == Some(401)
}

/// Run one submission of `form` through `call`.
pub async fn submit<F, Fut>(form: &mut Form, call: F) -> Submitted
where
    F: FnOnce(RequestBody) -> Fut,
    Fut: Future<Output = ApiResult<Value>>,
{
    let mut signed_out = false;
    let flag = &mut signed_out;
    let title = form.schema().title.clone();

    let outcome = form
        .submit(|payload| async move {
            call(request_body(payload)).await.map_err(|e| {
                debug!(form = %title, error = %e, "submission failed");
                *flag = ends_session(&e);
                describe_failure(&e)
            })
        })
        .await;

    match outcome {
        SubmitOutcome::Succeeded(value) => {
            info!(form = %form.schema().title, "submission succeeded");
            Submitted::Done(value)
        }
        SubmitOutcome::Failed(_) if signed_out => Submitted::SignedOut,
        SubmitOutcome::Failed(_) | SubmitOutcome::Rejected(_) => Submitted::Stay,
    }
}

/// Success message from the answer, or `fallback`.
fn success_text(body: &Value, fallback: &str) -> String {
    api::envelope::success_message(body).unwrap_or_else(|| fallback.to_string())
}
