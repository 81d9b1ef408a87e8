//! Client for the contributions backend: session handling, response
//! envelope, transport and endpoints.

pub mod endpoints;
pub mod envelope;
mod error;
pub mod session;
#[cfg(any(test, feature = "testing"))]
mod stub;
mod transport;

pub use endpoints::{Api, AuthGrant};
pub use envelope::RawResponse;
pub use error::{ApiError, ApiResult};
pub use reqwest::Method;
pub use session::{
    AuthContext, FileTokenStore, MemoryTokenStore, SESSION_KEY, Session, SessionToken, TokenStore,
};
#[cfg(any(test, feature = "testing"))]
pub use stub::StubTransport;
pub use transport::{ApiRequest, HttpTransport, RequestBody, Transport, Upload};
