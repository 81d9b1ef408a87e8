mod cli;
mod commands;
mod errors;

use api::{Api, FileTokenStore, HttpTransport, Session};
use app::AppBuilder;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use portal::{Config, Portal};
use tracing::info;

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result<()> {
    errors::init()?;
    let args = Cli::parse();

    let builder = AppBuilder::<Portal>::new(env!("CARGO_PKG_VERSION")).map_err(|e| eyre!(e))?;
    let mut config = Config::load(builder.path_context())?;
    if let Some(url) = args.api_url.clone() {
        config.api_base_url = url;
    }
    let ctx = builder.with_log_level(&config.log_level).build();
    info!(version = ctx.version(), api = %config.api_base_url, "portal starting");

    let store = FileTokenStore::new(ctx.path_context().session_file(&config.session_file));
    let mut session = Session::restore(store)?;
    let api = Api::new(HttpTransport::new(config.api_base_url.clone())?);

    commands::run(args.cmd, &api, &mut session).await
}
