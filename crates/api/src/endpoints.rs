//! Typed wrappers around the backend endpoints.
//!
//! Every call issues exactly one request through the transport and runs the
//! answer through [`envelope::interpret`](crate::envelope::interpret).
//! Authorized endpoints refuse to send anything without a token.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::{data, interpret};
use crate::error::{ApiError, ApiResult};
use crate::session::{AuthContext, SessionToken};
use crate::transport::{ApiRequest, RequestBody, Transport, loggable_path};

pub const LOGIN: &str = "auth/login";
pub const REGISTER: &str = "auth/register";
pub const FORGOT_PASSWORD: &str = "auth/forgot-password";
pub const RESET_PASSWORD: &str = "auth/reset-password";
pub const DASHBOARD: &str = "dashboard";
pub const MY_GROUP: &str = "groups/my-group";
pub const JOIN_GROUP: &str = "groups/join";
pub const PAYABLE_WEEKS: &str = "payments/weeks";
pub const PAYMENTS: &str = "payments";
pub const LOANS: &str = "loans";
pub const DUES: &str = "dues";

/// Percent-encode everything but RFC 3986 unreserved characters, so a
/// value always stays one path segment.
pub fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(char::from(byte))
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn group_members_path(group_id: &str) -> String {
    format!("groups/{}/members", encode_segment(group_id))
}

pub fn reset_password_path(token: &str) -> String {
    format!("{RESET_PASSWORD}/{}", encode_segment(token))
}

/// Token and full payload returned by login or registration.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: SessionToken,
    pub payload: Value,
}

/// Token location in a login/registration answer: `token`, `data.token`,
/// `accessToken`, `data.accessToken`.
pub fn extract_token(body: &Value) -> Option<SessionToken> {
    let inner = data(body);
    [body, inner]
        .into_iter()
        .flat_map(|v| [v.get("token"), v.get("accessToken")])
        .flatten()
        .find_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(SessionToken::new)
}

pub struct Api<T> {
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One request, interpreted.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        auth: Option<&AuthContext>,
        body: RequestBody,
    ) -> ApiResult<Value> {
        let logged = loggable_path(path);
        let token = match auth {
            Some(ctx) => match ctx.token() {
                Some(token) => Some(token.clone()),
                None => {
                    warn!(path = %logged, "authorized call without a session");
                    return Err(ApiError::Unauthenticated);
                }
            },
            None => None,
        };

        let request = ApiRequest::new(method, path).token(token).body(body);
        let raw = self.transport.send(request).await?;
        debug!(path = %logged, status = raw.status, "interpreting response");
        interpret(raw)
    }

    async fn grant(&self, path: &str, body: RequestBody) -> ApiResult<AuthGrant> {
        let payload = self.call(Method::POST, path, None, body).await?;
        let token = extract_token(&payload).ok_or(ApiError::MissingToken)?;
        Ok(AuthGrant { token, payload })
    }

    pub async fn authenticate(&self, body: RequestBody) -> ApiResult<AuthGrant> {
        self.grant(LOGIN, body).await
    }

    pub async fn register(&self, body: RequestBody) -> ApiResult<AuthGrant> {
        self.grant(REGISTER, body).await
    }

    pub async fn forgot_password(&self, body: RequestBody) -> ApiResult<Value> {
        self.call(Method::POST, FORGOT_PASSWORD, None, body).await
    }

    /// Check a reset link before showing the new-password form.
    pub async fn verify_reset_token(&self, token: &str) -> ApiResult<Value> {
        self.call(Method::GET, &reset_password_path(token), None, RequestBody::Empty)
            .await
    }

    pub async fn reset_password(&self, token: &str, body: RequestBody) -> ApiResult<Value> {
        self.call(Method::POST, &reset_password_path(token), None, body)
            .await
    }

    pub async fn dashboard(&self, auth: &AuthContext) -> ApiResult<Value> {
        self.call(Method::GET, DASHBOARD, Some(auth), RequestBody::Empty)
            .await
    }

    pub async fn my_group(&self, auth: &AuthContext) -> ApiResult<Value> {
        self.call(Method::GET, MY_GROUP, Some(auth), RequestBody::Empty)
            .await
    }

    pub async fn group_members(&self, auth: &AuthContext, group_id: &str) -> ApiResult<Value> {
        self.call(
            Method::GET,
            &group_members_path(group_id),
            Some(auth),
            RequestBody::Empty,
        )
        .await
    }

    pub async fn join_group(&self, auth: &AuthContext, body: RequestBody) -> ApiResult<Value> {
        self.call(Method::POST, JOIN_GROUP, Some(auth), body).await
    }

    pub async fn payable_weeks(&self, auth: &AuthContext) -> ApiResult<Value> {
        self.call(Method::GET, PAYABLE_WEEKS, Some(auth), RequestBody::Empty)
            .await
    }

    pub async fn submit_payment(&self, auth: &AuthContext, body: RequestBody) -> ApiResult<Value> {
        self.call(Method::POST, PAYMENTS, Some(auth), body).await
    }

    pub async fn request_loan(&self, auth: &AuthContext, body: RequestBody) -> ApiResult<Value> {
        self.call(Method::POST, LOANS, Some(auth), body).await
    }

    pub async fn create_due(&self, auth: &AuthContext, body: RequestBody) -> ApiResult<Value> {
        self.call(Method::POST, DUES, Some(auth), body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_found_at_any_supported_location() {
        for body in [
            json!({"token": "a"}),
            json!({"data": {"token": "a"}}),
            json!({"accessToken": "a"}),
            json!({"success": true, "data": {"accessToken": "a", "user": {}}}),
        ] {
            assert_eq!(extract_token(&body), Some(SessionToken::new("a")), "{body}");
        }
        assert_eq!(extract_token(&json!({"token": ""})), None);
        assert_eq!(extract_token(&json!({"user": {}})), None);
    }

    #[tokio::test]
    async fn login_returns_token_and_payload() {
        let stub = crate::StubTransport::new();
        stub.respond(
            Method::POST,
            LOGIN,
            200,
            json!({"success": true, "token": "t-1", "user": {"role": "admin"}}),
        );
        let api = Api::new(&stub);

        let grant = api
            .authenticate(RequestBody::Json(json!({"email": "a@b.com", "password": "Abcdef1!"})))
            .await
            .unwrap();

        assert_eq!(grant.token.expose(), "t-1");
        assert_eq!(grant.payload["user"]["role"], "admin");
        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].token, None);
    }

    #[tokio::test]
    async fn authorized_call_attaches_bearer_token() {
        let stub = crate::StubTransport::new();
        stub.respond(Method::GET, PAYABLE_WEEKS, 200, json!({"success": true, "data": []}));
        let api = Api::new(&stub);
        let auth = AuthContext::with_token(SessionToken::new("t-9"));

        api.payable_weeks(&auth).await.unwrap();

        assert_eq!(stub.calls()[0].token, Some(SessionToken::new("t-9")));
    }

    #[tokio::test]
    async fn authorized_call_without_session_sends_nothing() {
        let stub = crate::StubTransport::new();
        let api = Api::new(&stub);

        let err = api.dashboard(&AuthContext::anonymous()).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn network_failure_surfaces_as_transport_error() {
        let stub = crate::StubTransport::new();
        stub.fail(Method::POST, LOGIN, "connection refused");
        let api = Api::new(&stub);

        let err = api.authenticate(RequestBody::Empty).await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
        assert!(err.user_message().starts_with("Unable to reach the server"));
    }

    #[tokio::test]
    async fn success_without_token_is_an_error() {
        let stub = crate::StubTransport::new();
        stub.respond(Method::POST, REGISTER, 201, json!({"success": true}));
        let api = Api::new(&stub);

        let err = api.register(RequestBody::Empty).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[test]
    fn paths() {
        assert_eq!(group_members_path("g-7"), "groups/g-7/members");
        assert_eq!(reset_password_path("abc"), "auth/reset-password/abc");
    }

    #[test]
    fn reset_token_stays_one_segment() {
        assert_eq!(
            reset_password_path("a/../b?c=d#e"),
            "auth/reset-password/a%2F..%2Fb%3Fc%3Dd%23e"
        );
        assert_eq!(reset_password_path("x y+é"), "auth/reset-password/x%20y%2B%C3%A9");
        assert_eq!(group_members_path("g/1"), "groups/g%2F1/members");
    }

    #[tokio::test]
    async fn reset_calls_use_the_encoded_token() {
        let stub = crate::StubTransport::new();
        stub.respond(
            Method::GET,
            "auth/reset-password/t%2F1",
            200,
            json!({"success": true}),
        );
        let api = Api::new(&stub);

        api.verify_reset_token("t/1").await.unwrap();

        assert_eq!(stub.calls()[0].path, "auth/reset-password/t%2F1");
    }

    #[tokio::test]
    async fn group_members_is_an_authorized_get() {
        let stub = crate::StubTransport::new();
        stub.respond(
            Method::GET,
            "groups/g-7/members",
            200,
            json!({"success": true, "data": [{"name": "Ada"}]}),
        );
        let api = Api::new(&stub);
        let auth = AuthContext::with_token(SessionToken::new("t-7"));

        let body = api.group_members(&auth, "g-7").await.unwrap();

        assert_eq!(body["data"][0]["name"], "Ada");
        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(calls[0].path, "groups/g-7/members");
        assert_eq!(calls[0].token, Some(SessionToken::new("t-7")));
    }

    #[tokio::test]
    async fn group_members_requires_a_session() {
        let stub = crate::StubTransport::new();
        let api = Api::new(&stub);

        let err = api
            .group_members(&AuthContext::anonymous(), "g-7")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(stub.call_count(), 0);
    }
}
