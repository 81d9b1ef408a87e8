//! Session token, the explicit auth context handed to every call, and the
//! stores that persist the token between runs.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use paths::PathContext;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// Fixed key the token is persisted under.
pub const SESSION_KEY: &str = "auth_token";

/// Opaque bearer credential issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Credentials for one request. Passed explicitly; nothing reads the token
/// from ambient storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<SessionToken>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Persistent home of the session token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> ApiResult<Option<SessionToken>>;
    fn save(&self, token: &SessionToken) -> ApiResult<()>;
    fn clear(&self) -> ApiResult<()>;
}

/// Token kept in a single file (`<project>/session/auth_token`).
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_context(ctx: &PathContext) -> Self {
        Self::new(ctx.session_file(SESSION_KEY))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ApiResult<Option<SessionToken>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SessionToken::new(raw)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::Storage(e)),
        }
    }

    fn save(&self, token: &SessionToken) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);
        let mut file = options.open(&self.path)?;
        // A file left by an older run keeps its mode on open; tighten it
        // before the token lands.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.expose().as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Storage(e)),
        }
    }
}

/// Process-local store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ApiResult<Option<SessionToken>> {
        Ok(self.token.lock().map(|t| t.clone()).unwrap_or(None))
    }

    fn save(&self, token: &SessionToken) -> ApiResult<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token.clone());
        }
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
        Ok(())
    }
}

/// Owns the store and the current context. The token is written when a
/// session is established and removed when it ends; requests only read it.
pub struct Session<S: TokenStore> {
    store: S,
    context: AuthContext,
}

impl<S: TokenStore> Session<S> {
    /// Restore a previously persisted token, if any.
    pub fn restore(store: S) -> ApiResult<Self> {
        let context = match store.load()? {
            Some(token) => {
                debug!("restored persisted session");
                AuthContext::with_token(token)
            }
            None => AuthContext::anonymous(),
        };
        Ok(Self { store, context })
    }

    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    pub fn establish(&mut self, token: SessionToken) -> ApiResult<()> {
        if self.context.is_authenticated() {
            warn!("replacing an existing session");
        }
        self.store.save(&token)?;
        self.context = AuthContext::with_token(token);
        info!("session established");
        Ok(())
    }

    pub fn end(&mut self) -> ApiResult<()> {
        self.store.clear()?;
        self.context = AuthContext::anonymous();
        info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_debug_is_redacted() {
        let token = SessionToken::new("secret-value");
        assert_eq!(format!("{token:?}"), "SessionToken(***)");
    }

    #[test]
    fn file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session").join(SESSION_KEY));

        assert_eq!(store.load().unwrap(), None);
        store.save(&SessionToken::new("abc123")).unwrap();
        assert_eq!(store.load().unwrap(), Some(SessionToken::new("abc123")));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_KEY);
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let store = FileTokenStore::new(&path);

        store.save(&SessionToken::new("abc123")).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert_eq!(store.load().unwrap(), Some(SessionToken::new("abc123")));

        let fresh = FileTokenStore::new(dir.path().join("new").join(SESSION_KEY));
        fresh.save(&SessionToken::new("t")).unwrap();
        let mode = fs::metadata(fresh.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn session_lifecycle_updates_context() {
        let mut session = Session::restore(MemoryTokenStore::default()).unwrap();
        assert!(!session.context().is_authenticated());

        session.establish(SessionToken::new("t-1")).unwrap();
        assert_eq!(
            session.context().token().map(|t| t.expose()),
            Some("t-1")
        );

        session.end().unwrap();
        assert!(!session.context().is_authenticated());
    }

    #[test]
    fn restore_reads_existing_token() {
        let store = MemoryTokenStore::default();
        store.save(&SessionToken::new("persisted")).unwrap();
        let session = Session::restore(store).unwrap();
        assert!(session.context().is_authenticated());
    }
}
