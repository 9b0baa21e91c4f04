use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedbell::app::AppContext;
use feedbell::cli::Cli;
use feedbell::config::{Config, Settings};
use feedbell::pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over -q/-v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load(cli.config.as_deref())
        .inspect_err(|e| tracing::error!(error = %e, "Cannot load configuration"))?;
    let settings = Settings::resolve(cli.overrides(), config)
        .inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;
    tracing::debug!(?settings, "Resolved settings");

    let ctx = AppContext::new(&settings.state_dir, &settings.server, settings.timeout)
        .inspect_err(|e| tracing::error!(error = %e, "Cannot start"))?;
    let summary = Pipeline::new(&ctx, settings.run_options())
        .run(&cli.urls)
        .await?;

    Ok(ExitCode::from(summary.exit_code()))
}
