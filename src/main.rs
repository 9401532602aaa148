mod build;
mod cli;
mod config;
mod deploy;
mod devices;
mod error;
mod install;
mod probe;
mod runner;
mod select;
mod ui;
mod utils;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

// Every step waits for the previous one; a single thread is all it needs.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "devicedrop=debug"
    } else {
        "devicedrop=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    if let Err(err) = cli.execute().await {
        ui::print_error(&err);
        std::process::exit(1);
    }
}
