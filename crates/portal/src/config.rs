//! Portal settings: optional `<project>/portal.settings.{json5,toml}` plus
//! `THESIS_LEDGER_*` environment overrides.

use std::path::PathBuf;

use lazy_static::lazy_static;
use paths::PathContext;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_LOG_LEVEL: &str = "info";

lazy_static! {
    pub static ref ENV_PREFIX: String =
        <crate::Portal as app::Application>::PROJECT_ID.to_uppercase();
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub log_level: String,
    /// File name of the persisted token inside the session directory.
    pub session_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            session_file: api::SESSION_KEY.into(),
        }
    }
}

impl Config {
    pub fn load(ctx: &PathContext) -> Result<Self> {
        let files = [
            (ctx.settings_file("json5"), config::FileFormat::Json5),
            (ctx.settings_file("toml"), config::FileFormat::Toml),
        ];
        Self::from_sources(&files)
    }

    fn from_sources(files: &[(PathBuf, config::FileFormat)]) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("session_file", api::SESSION_KEY)?;

        for (path, format) in files {
            if path.exists() {
                debug!(path = %path.display(), "reading settings");
            }
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(*format)
                    .required(false),
            );
        }

        let cfg = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX.as_str()))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }
}
