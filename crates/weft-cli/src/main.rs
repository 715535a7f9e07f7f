//! Weft CLI entry point.

mod app;
mod cli;
mod config;

use clap::Parser;

use app::WeftApp;
use cli::CliArgs;
use config::WeftConfig;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    WeftApp::init_logging(args.verbose, args.quiet);

    if let Err(err) = run(args).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> weft_core::Result<()> {
    let config = WeftConfig::load(args.config.as_deref())?;
    let app = WeftApp::from_config(&config).await?;
    app.run(args).await
}
