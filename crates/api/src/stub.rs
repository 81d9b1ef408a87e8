//! In-process transport with canned answers and a call log.
//!
//! Answers are queued per `(method, path)`. The last queued answer for a
//! route is reused once the queue runs down to it; routes without answers get
//! a 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use reqwest::Method;
use serde_json::{Value, json};

use crate::envelope::RawResponse;
use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, Transport};

#[derive(Debug, Clone)]
enum Canned {
    Respond(RawResponse),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Canned>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, canned: Canned) {
        if let Ok(mut routes) = self.routes.lock() {
            routes
                .entry((method, path.trim_start_matches('/').to_string()))
                .or_default()
                .push_back(canned);
        }
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Canned::Respond(RawResponse::new(status, body)));
        self
    }

    /// Simulate a network failure for the route.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Canned::Fail(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn next(&self, method: &Method, path: &str) -> Option<Canned> {
        let mut routes = self.routes.lock().ok()?;
        let queue = routes.get_mut(&(method.clone(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<RawResponse> {
        let path = request.path.trim_start_matches('/').to_string();
        let canned = self.next(&request.method, &path);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        match canned {
            Some(Canned::Respond(raw)) => Ok(raw),
            Some(Canned::Fail(message)) => Err(ApiError::Network(message)),
            None => Ok(RawResponse::new(
                404,
                json!({"error": format!("no stub for {} {}", request.method, path)}),
            )),
        }
    }
}
