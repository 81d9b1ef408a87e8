//! Weekly contribution payments with a receipt upload.

use api::{Api, ApiError, AuthContext, Transport};
use forms::{FieldRule, Form, FormField, FormFieldKind, FormSchema};
use tracing::{debug, warn};

use super::{ALREADY_PAID, Submitted, submit, success_text};
use crate::effects::{Effect, Effects, Notice};
use crate::error::Result;
use crate::route::signals_no_group;
use crate::weeks::{WeekBoard, WeekStatus, WeeksView, parse_weeks};

pub const AWAITING_VERIFICATION: &str = "Payment for this week is awaiting verification.";

pub fn payment_form() -> Form {
    Form::new(FormSchema::new(
        "Submit payment",
        vec![
            FormField::new("week_id", "Week", FormFieldKind::Text).rule(FieldRule::Required),
            FormField::new("amount", "Amount", FormFieldKind::Number).rule(FieldRule::Amount),
            FormField::new("reference_number", "Reference number", FormFieldKind::Text)
                .rule(FieldRule::Required),
            FormField::new("receipt", "Receipt", FormFieldKind::File)
                .rule(FieldRule::Required)
                .help("Photo or PDF of the transfer receipt"),
        ],
    ))
}

/// Weeks page data. A "no group" answer is a view state, not an error.
pub async fn load_weeks<T: Transport>(api: &Api<T>, auth: &AuthContext) -> Result<WeeksView> {
    match api.payable_weeks(auth).await {
        Ok(body) => Ok(parse_weeks(&body)?),
        Err(ApiError::Status { ref message, .. } | ApiError::Rejected { ref message, .. })
            if signals_no_group(message) =>
        {
            debug!("weeks requested without a group");
            Ok(WeeksView::NoGroupAssigned)
        }
        Err(e) => Err(e.into()),
    }
}

fn refusal(status: WeekStatus) -> Option<&'static str> {
    match status {
        WeekStatus::Unpaid | WeekStatus::Late => None,
        WeekStatus::Paid => Some(ALREADY_PAID),
        WeekStatus::PendingVerification => Some(AWAITING_VERIFICATION),
        WeekStatus::Unknown => Some("This week cannot be paid."),
    }
}

/// Pay the week named in the form, or the board's active week when the form
/// names none. Weeks that are not unpaid or late never reach the backend.
pub async fn submit_payment<T: Transport>(
    form: &mut Form,
    api: &Api<T>,
    auth: &AuthContext,
    board: &WeekBoard,
) -> Effects {
    let chosen = form
        .state()
        .value("week_id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    let week = match &chosen {
        Some(id) => board.find(id),
        None => board.active(),
    };

    if let Some(week) = week {
        if chosen.is_none() {
            form.update("week_id", week.id.clone());
        }
        if let Some(message) = refusal(week.status) {
            warn!(week = %week.id, status = %week.status, "payment refused for week");
            form.report(message);
            return Vec::new();
        }
    } else if let Some(id) = chosen {
        form.report(format!("Week {id} is not on your list of payable weeks."));
        return Vec::new();
    }

    match submit(form, |body| api.submit_payment(auth, body)).await {
        Submitted::Done(body) => vec![Effect::Notify(Notice::success(success_text(
            &body,
            "Payment submitted for verification.",
        )))],
        other => other.into_effects(),
    }
}
