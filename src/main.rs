mod commands;
mod config;
mod format;

use clap::Parser;
use nodetls_certs::{CertsError, LocalExecutor, StandardProvider};
use nodetls_common::error::ErrorCode;

use config::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays parseable
    let env_filter = tracing_subscriber::EnvFilter::try_new(cli.log_filter())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    startup_diagnostics(&cli);

    let config = cli.load_config()?;
    let provider = StandardProvider::from_code(&config.provider);
    let executor = LocalExecutor::new(cli.host.clone());

    let ctx = commands::Context {
        executor: &executor,
        config: &config,
        provider: &provider,
        json: cli.json,
    };

    if let Err(e) = commands::dispatch(&ctx, &cli.command) {
        report_failure(&e, cli.json);
        std::process::exit(ErrorCode::from(&e).exit_code());
    }
    Ok(())
}

fn report_failure(e: &CertsError, json: bool) {
    let code = ErrorCode::from(e);
    if json {
        format::json(&serde_json::json!({ "error": e.to_string(), "code": code }));
    } else {
        eprintln!("Error: {e}");
    }
    if code.is_verification_failure() {
        tracing::warn!(?code, "Node certificate rejected, nothing was installed");
    } else {
        tracing::debug!(?code, "Command failed");
    }
}

fn startup_diagnostics(cli: &Cli) {
    tracing::debug!("nodetls v{} starting", env!("CARGO_PKG_VERSION"));
    match hostname::get() {
        Ok(h) => tracing::debug!(controller = %h.to_string_lossy(), node = %cli.host, "Targets"),
        Err(e) => tracing::debug!(error = %e, "Could not determine controller hostname"),
    }
}
