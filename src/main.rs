//! mssql-exporter Binary Entry Point
//!
//! Without arguments, prints the query documentation (every query followed by
//! the series it feeds) to stdout. Logs go to stderr so the documentation
//! stays clean when redirected.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mssql_exporter::{
    AppConfig, CollectorRegistry, Exposition,
    config::DEFAULT_LOG_FILTER,
    docs::render_documentation,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// SQL Server query-to-gauge exporter
#[derive(Parser, Debug)]
#[command(name = "mssql-exporter", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every query with the measurements it feeds (default)
    Docs,

    /// Validate a configuration file against the collector set
    Check {
        /// Path to configuration file
        #[arg(short, long, env = "MSSQL_EXPORTER_CONFIG")]
        config: PathBuf,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Docs) {
        Command::Docs => {
            init_tracing(DEFAULT_LOG_FILTER);
            let mut sink = Exposition::new();
            let registry = CollectorRegistry::new(&mut sink)?;
            print!("{}", render_documentation(&registry));
        }
        Command::Check { config } => {
            let app_config = AppConfig::load(&config)?;
            init_tracing(app_config.log_filter());
            tracing::info!("Loaded configuration from: {}", config.display());

            let mut sink = Exposition::new();
            let registry = CollectorRegistry::new(&mut sink)?;
            app_config.validate_collectors(registry.names())?;

            let options = app_config.scrape_options();
            let enabled = registry
                .names()
                .filter(|name| !options.disabled.contains(*name))
                .count();

            println!(
                "configuration ok: {} of {} collectors enabled, {} series registered",
                enabled,
                registry.len(),
                sink.len()
            );
            println!(
                "query timeout: {}, series retention: {}, debug: {}",
                humantime::format_duration(options.query_timeout),
                options.retention,
                app_config.debug
            );
            for name in &app_config.disabled_collectors {
                println!("disabled: {}", name);
            }
        }
    }

    Ok(())
}
