//! Backstop - typed, cached parameter resolution with scope fallback.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use backstop::cli::output;
use backstop::cli::{execute, Cli};
use backstop::error::Error;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("BACKSTOP_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("backstop=debug")
        } else {
            EnvFilter::new("backstop=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::NoConfig => Some("add project = \"NAME\" to .backstop.toml or pass --project"),
            Error::Config(_) => Some("pass --store PATH or set store in .backstop.toml"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
