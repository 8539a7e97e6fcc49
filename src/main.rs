mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use coursegrab_core::AppConfig;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // The whole flow is sequential blocking-style I/O; one thread is all
    // it takes.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config: AppConfig = toml::from_str(&config_str)?;

    // Env overrides so credentials can stay out of the config file.
    if let Ok(v) = std::env::var("COURSEGRAB_USERNAME") {
        config.account.username = v;
    }
    if let Ok(v) = std::env::var("COURSEGRAB_PASSWORD") {
        config.account.password = v;
    }
    if let Ok(v) = std::env::var("COURSEGRAB_BASE_URL") {
        config.portal.base_url = v;
    }
    if let Ok(v) = std::env::var("COURSEGRAB_COURSES") {
        config.courses.codes = split_codes(&v);
    }
    if let Ok(v) = std::env::var("COURSEGRAB_DELAY_MS") {
        if let Ok(ms) = v.parse::<u64>() {
            config.courses.retry_delay_ms = ms;
        }
    }

    match cli.command {
        Commands::Run { delay_ms, courses } => {
            if let Some(ms) = delay_ms {
                config.courses.retry_delay_ms = ms;
            }
            if let Some(list) = courses {
                config.courses.codes = split_codes(&list);
            }
            commands::run::run(config).await
        }
        Commands::Probe => commands::probe::run(config).await,
    }
}

/// Course lists arrive comma-separated from the CLI and dot- or
/// comma-separated from the environment (the portal's own exports use
/// dots).
fn split_codes(raw: &str) -> Vec<String> {
    raw.split([',', '.'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_and_dots_and_trims() {
        assert_eq!(
            split_codes("INT101, INT202.PHY105,"),
            vec!["INT101", "INT202", "PHY105"]
        );
    }
}
