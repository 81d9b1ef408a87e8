//! Payable weeks of the current student and the week picked for payment.
//!
//! The backend sends amounts either as numbers or as decimal strings, and
//! uses camelCase keys; both snake_case and camelCase are accepted.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use strum::Display;

use crate::route::signals_no_group;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeekStatus {
    Unpaid,
    Late,
    #[serde(alias = "pending", alias = "pending-verification", alias = "pendingVerification")]
    PendingVerification,
    Paid,
    #[serde(other)]
    Unknown,
}

impl WeekStatus {
    pub fn is_payable(&self) -> bool {
        matches!(self, WeekStatus::Unpaid | WeekStatus::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayableWeek {
    #[serde(deserialize_with = "de_id", alias = "_id", alias = "weekId")]
    pub id: String,
    #[serde(default, alias = "week_number", alias = "week")]
    pub week_number: u32,
    #[serde(default, alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<String>,
    pub status: WeekStatus,
    #[serde(default, deserialize_with = "de_amount", alias = "base_due", alias = "amount")]
    pub base_due: f64,
    #[serde(default, deserialize_with = "de_amount", alias = "penalty_applied", alias = "penalty")]
    pub penalty_applied: f64,
    #[serde(default, deserialize_with = "de_amount", alias = "amount_paid")]
    pub amount_paid: f64,
    #[serde(default, deserialize_with = "de_amount", alias = "amount_remaining")]
    pub amount_remaining: f64,
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid week id: {other}"))),
    }
}

fn de_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s}"))),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!("invalid amount: {other}"))),
    }
}

/// Outcome of loading the weeks page.
#[derive(Debug, Clone, PartialEq)]
pub enum WeeksView {
    Loaded(WeekBoard),
    /// The student is not in a group; the page shows a join prompt instead
    /// of an error.
    NoGroupAssigned,
}

/// Read the weeks list from an answer: `data` as a list, or a list under
/// `weeks` / `payableWeeks`.
pub fn parse_weeks(body: &Value) -> Result<WeeksView, serde_json::Error> {
    let data = api::envelope::data(body);
    let list = if data.is_array() {
        Some(data)
    } else {
        ["weeks", "payableWeeks", "payable_weeks"]
            .iter()
            .find_map(|k| data.get(*k).filter(|v| v.is_array()))
    };

    match list {
        Some(list) => {
            let weeks: Vec<PayableWeek> = serde_json::from_value(list.clone())?;
            Ok(WeeksView::Loaded(WeekBoard::new(weeks)))
        }
        None => {
            let no_group = data.get("group").is_some_and(Value::is_null)
                || api::envelope::success_message(body).is_some_and(|m| signals_no_group(&m));
            if no_group {
                Ok(WeeksView::NoGroupAssigned)
            } else {
                Ok(WeeksView::Loaded(WeekBoard::new(Vec::new())))
            }
        }
    }
}

/// Weeks in backend order, with one active week.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeekBoard {
    weeks: Vec<PayableWeek>,
    active: Option<usize>,
}

impl WeekBoard {
    /// The default active week is the first late one, else the first unpaid.
    pub fn new(weeks: Vec<PayableWeek>) -> Self {
        let active = weeks
            .iter()
            .position(|w| w.status == WeekStatus::Late)
            .or_else(|| weeks.iter().position(|w| w.status == WeekStatus::Unpaid));
        Self { weeks, active }
    }

    pub fn weeks(&self) -> &[PayableWeek] {
        &self.weeks
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn active(&self) -> Option<&PayableWeek> {
        self.active.and_then(|i| self.weeks.get(i))
    }

    pub fn find(&self, id: &str) -> Option<&PayableWeek> {
        self.weeks.iter().find(|w| w.id == id)
    }

    /// Make `id` the active week. Any listed week can be selected; whether it
    /// can be paid is checked on submit.
    pub fn select(&mut self, id: &str) -> bool {
        match self.weeks.iter().position(|w| w.id == id) {
            Some(i) => {
                self.active = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn payable(&self) -> impl Iterator<Item = &PayableWeek> {
        self.weeks.iter().filter(|w| w.status.is_payable())
    }

    pub fn total_remaining(&self) -> f64 {
        self.payable().map(|w| w.amount_remaining).sum()
    }

    pub fn total_penalties(&self) -> f64 {
        self.weeks.iter().map(|w| w.penalty_applied).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn week(id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "weekNumber": 1,
            "status": status,
            "baseDue": "50.00",
            "penaltyApplied": 0,
            "amountPaid": 0,
            "amountRemaining": 50,
        })
    }

    fn board(statuses: &[(&str, &str)]) -> WeekBoard {
        let list: Vec<Value> = statuses.iter().map(|(id, s)| week(id, s)).collect();
        match parse_weeks(&json!({"success": true, "data": list})).unwrap() {
            WeeksView::Loaded(board) => board,
            other => panic!("expected weeks, got {other:?}"),
        }
    }

    #[test]
    fn late_week_wins_over_earlier_unpaid() {
        let board = board(&[("w1", "paid"), ("w2", "unpaid"), ("w3", "late")]);
        assert_eq!(board.active().map(|w| w.id.as_str()), Some("w3"));
    }

    #[test]
    fn first_unpaid_when_nothing_is_late() {
        let board = board(&[("w1", "paid"), ("w2", "unpaid"), ("w3", "unpaid")]);
        assert_eq!(board.active().map(|w| w.id.as_str()), Some("w2"));
    }

    #[test]
    fn nothing_payable_means_no_active_week() {
        let board = board(&[("w1", "paid"), ("w2", "pending_verification")]);
        assert_eq!(board.active(), None);
        assert_eq!(board.total_remaining(), 0.0);
    }

    #[test]
    fn explicit_selection() {
        let mut board = board(&[("w1", "paid"), ("w2", "unpaid")]);
        assert!(board.select("w1"));
        assert_eq!(board.active().map(|w| w.status), Some(WeekStatus::Paid));
        assert!(!board.select("nope"));
        assert_eq!(board.active().map(|w| w.id.as_str()), Some("w1"));
    }

    #[test]
    fn amounts_accept_strings_and_numbers() {
        let weeks: Vec<PayableWeek> = serde_json::from_value(json!([
            {"_id": 7, "week_number": 2, "status": "late", "base_due": "50.00",
             "penalty_applied": "5.50", "amount_paid": 0, "amount_remaining": "55.5"},
            {"id": "8", "status": "pending"},
        ]))
        .unwrap();
        assert_eq!(weeks[0].id, "7");
        assert_eq!(weeks[0].penalty_applied, 5.5);
        assert_eq!(weeks[1].status, WeekStatus::PendingVerification);
        assert_eq!(weeks[1].amount_remaining, 0.0);

        let board = WeekBoard::new(weeks);
        assert_eq!(board.total_remaining(), 55.5);
        assert_eq!(board.total_penalties(), 5.5);
    }

    #[test]
    fn no_group_answer_is_a_view_state() {
        let view = parse_weeks(&json!({"success": true, "message": "No group assigned"})).unwrap();
        assert_eq!(view, WeeksView::NoGroupAssigned);

        let view = parse_weeks(&json!({"data": {"group": null}})).unwrap();
        assert_eq!(view, WeeksView::NoGroupAssigned);

        let view = parse_weeks(&json!({"data": {"weeks": []}})).unwrap();
        assert_eq!(view, WeeksView::Loaded(WeekBoard::default()));
    }
}
