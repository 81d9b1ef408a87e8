use paths::PathContext;
use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client infrastructure context.
///
/// Contains path management, version info, and logging infrastructure.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "thesis_ledger_team";
    const PROJECT_ID: &'static str = "thesis_ledger";
}

/// Builder performing the common start-up work:
/// - Sets up path context (platform-specific directories)
/// - Ensures all directories exist
/// - Initializes logging (file + console) on `build`
pub struct AppBuilder<A: Application> {
    path_context: PathContext,
    version: &'static str,
    level: LevelFilter,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            A::STUDIO,
            A::PROJECT_ID,
            A::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);

        path_context.ensure_directories()?;

        #[cfg(debug_assertions)]
        let level = LevelFilter::INFO;
        #[cfg(not(debug_assertions))]
        let level = LevelFilter::WARN;

        Ok(Self {
            path_context,
            version,
            level,
            _marker: PhantomData,
        })
    }

    /// Path context resolved by `new`; available before logging starts so
    /// configuration files can be located first.
    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }

    /// Override the log level with a textual filter ("trace", "debug", ...).
    /// Unknown values keep the build default.
    pub fn with_log_level(mut self, level: &str) -> Self {
        match LevelFilter::from_str(level) {
            Ok(parsed) => self.level = parsed,
            Err(_) => eprintln!("unknown log level '{level}', keeping {}", self.level),
        }
        self
    }

    /// Install the tracing subscriber and return the context.
    pub fn build(self) -> AppContext {
        let level = self.level;
        let log_file_path = self.path_context.log_file_now();

        let guard = match (log_file_path.parent(), log_file_path.file_name()) {
            (Some(log_dir), Some(log_filename)) => {
                let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // Separate layer: file (non-blocking) + console (stderr)
                let file_layer = fmt::Layer::default()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

                let console_layer = fmt::Layer::default()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

                // try_init: a second builder in the same process keeps the first subscriber
                let _ = tracing_subscriber::registry()
                    .with(file_layer)
                    .with(console_layer)
                    .try_init();
                Some(guard)
            }
            _ => None,
        };

        AppContext {
            path_context: self.path_context,
            version: self.version,
            _log_guard: guard,
        }
    }
}
