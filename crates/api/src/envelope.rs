//! Response envelope interpretation.
//!
//! The backend answers with a status code and a JSON body that carries a
//! `success` flag and/or an `error` / `message` string. Some endpoints nest
//! the payload under `data`. A call succeeds only when the status is 2xx and
//! the success indicator is truthy; a body without a `success` key counts as
//! successful unless it carries an `error`.

use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Status and decoded body as received. Bodies that are not JSON are kept as
/// a JSON string, empty bodies as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

impl RawResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.trim().to_string()))
        };
        Self { status, body }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JavaScript-style truthiness of a JSON value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Failure text: `error` (string or `{message}`), then `message`, then a
/// plain-text body.
pub fn error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Object(obj)) => {
            if let Some(Value::String(s)) = obj.get("message") {
                return Some(s.clone());
            }
        }
        _ => {}
    }
    success_message(body).or_else(|| match body {
        Value::String(s) if !s.is_empty() && s.len() <= 200 => Some(s.clone()),
        _ => None,
    })
}

/// `message` at top level or inside `data`.
pub fn success_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("data").and_then(|d| d.get("message")))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The nested `data` object when present, the body otherwise.
pub fn data(body: &Value) -> &Value {
    match body.get("data") {
        Some(inner) if !inner.is_null() => inner,
        _ => body,
    }
}

fn default_status_message(status: u16) -> String {
    match status {
        400 => "The request was invalid.".into(),
        401 => "Your session has expired. Please log in again.".into(),
        403 => "You are not allowed to do that.".into(),
        404 => "The requested resource was not found.".into(),
        409 => "That request conflicts with existing data.".into(),
        500..=599 => "The server ran into a problem. Please try again later.".into(),
        _ => format!("Request failed with status {status}."),
    }
}

/// Turn a raw response into the body on success or a typed failure.
pub fn interpret(raw: RawResponse) -> ApiResult<Value> {
    let RawResponse { status, body } = raw;

    if !(200..300).contains(&status) {
        let message = error_message(&body).unwrap_or_else(|| default_status_message(status));
        return Err(ApiError::Status { status, message });
    }

    let succeeded = match body.get("success") {
        Some(flag) => truthy(flag),
        None => body.get("error").map(|e| !truthy(e)).unwrap_or(true),
    };
    if !succeeded {
        let message =
            error_message(&body).unwrap_or_else(|| "The request was not accepted.".into());
        return Err(ApiError::Rejected { status, message });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn success_flag_and_status_must_agree() {
        assert!(interpret(RawResponse::new(200, json!({"success": true}))).is_ok());
        let err = interpret(RawResponse::new(200, json!({"success": false, "error": "x"})))
            .unwrap_err();
        assert_eq!(err.user_message(), "x");
        assert!(matches!(err, ApiError::Rejected { status: 200, .. }));
    }

    #[test]
    fn missing_flag_counts_as_success_without_error() {
        assert!(interpret(RawResponse::new(200, json!({"data": {"weeks": []}}))).is_ok());
        assert!(interpret(RawResponse::new(201, json!({"error": "Already paid"}))).is_err());
    }

    #[test]
    fn non_2xx_uses_body_message_or_default() {
        let err = interpret(RawResponse::new(401, json!({"message": "Invalid credentials"})))
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));

        let err = interpret(RawResponse::new(503, Value::Null)).unwrap_err();
        assert_eq!(
            err.user_message(),
            "The server ran into a problem. Please try again later."
        );
    }

    #[test]
    fn nested_error_object_and_plain_text() {
        assert_eq!(
            error_message(&json!({"error": {"code": 401, "message": "nope"}})),
            Some("nope".into())
        );
        let raw = RawResponse::from_text(502, "Bad Gateway");
        assert_eq!(raw.body, json!("Bad Gateway"));
        assert_eq!(error_message(&raw.body), Some("Bad Gateway".into()));
    }

    #[test]
    fn data_unwraps_one_level() {
        let body = json!({"success": true, "data": {"role": "admin"}});
        assert_eq!(data(&body), &json!({"role": "admin"}));
        let flat = json!({"role": "admin"});
        assert_eq!(data(&flat), &flat);
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!truthy(&json!(0)));
        assert!(truthy(&json!(1)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!("true")));
        assert!(!truthy(&Value::Null));
        assert!(truthy(&json!({})));
    }
}
