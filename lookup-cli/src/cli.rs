use std::{future::Future, sync::Arc};

use anyhow::Context;
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{
    Confirm, CustomType, CustomUserError, InquireError, Password, PasswordDisplayMode, Text,
    validator::Validation,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use weather_lookup_core::{
    Config, DataSource, LookupState, SourceKind, WeatherLookup,
    source::{default_source_from_config, mock::MockSource, source_from_config},
};

use crate::render::{LOADING_TEXT, render_state};

const CITY_PLACEHOLDER: &str = "Try: London, Tokyo, New York, Paris, Mumbai, Sydney";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Current weather for a city")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a data source.
    Configure {
        /// Source short name: "mock" or "live".
        source: String,
    },

    /// Look up one city and print its weather card.
    Show {
        /// City name.
        city: String,

        /// Data source to use instead of the configured default.
        #[arg(long)]
        source: Option<String>,
    },

    /// Start with the default city, then keep prompting for cities.
    Run {
        /// Data source to use instead of the configured default.
        #[arg(long)]
        source: Option<String>,

        /// City to look up on start instead of the configured default.
        #[arg(long)]
        city: Option<String>,
    },

    /// List the cities the mock source knows.
    Cities,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { source } => {
                let kind = SourceKind::try_from(source.as_str())?;
                configure(kind)?;
            }
            Command::Show { city, source } => {
                let config = Config::load()?;
                let source = resolve_source(&config, source.as_deref())?;
                show(source, &city).await?;
            }
            Command::Run { source, city } => {
                let config = Config::load()?;
                let source = resolve_source(&config, source.as_deref())?;
                let city = city.unwrap_or_else(|| config.default_city().to_string());
                interactive(source, &city).await?;
            }
            Command::Cities => {
                for city in MockSource::cities() {
                    println!("{city}");
                }
            }
        }

        Ok(())
    }
}

fn resolve_source(
    config: &Config,
    requested: Option<&str>,
) -> anyhow::Result<Arc<dyn DataSource>> {
    match requested {
        Some(name) => source_from_config(SourceKind::try_from(name)?, config),
        None => default_source_from_config(config),
    }
}

fn configure(kind: SourceKind) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    match kind {
        SourceKind::Live => {
            let api_key = Password::new("OpenWeather API key:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .with_validator(validate_api_key)
                .prompt()?;
            let timeout = CustomType::<u64>::new("Request timeout (seconds):")
                .with_default(config.live_timeout().as_secs())
                .prompt()?;

            config.upsert_live_api_key(api_key);
            if let Some(live) = config.live.as_mut() {
                live.timeout_secs = Some(timeout);
            }
        }
        SourceKind::Mock => {
            let delay = CustomType::<u64>::new("Artificial delay (ms):")
                .with_default(u64::try_from(config.mock_delay().as_millis()).unwrap_or(u64::MAX))
                .prompt()?;
            config.mock.delay_ms = Some(delay);
        }
    }

    let city = Text::new("Default city:").with_default(config.default_city()).prompt()?;
    config.default_city = Some(city.trim().to_string());

    let make_default = Confirm::new(&format!("Use the {kind} source by default?"))
        .with_default(true)
        .prompt()?;
    if make_default {
        config.set_default_source(kind);
    }

    config.save()?;
    info!(source = %kind, "configuration saved");
    println!("Saved {}", Config::config_file_path()?.display());

    Ok(())
}

fn validate_api_key(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("API key cannot be empty".into()))
    } else {
        Ok(Validation::Valid)
    }
}

async fn show(source: Arc<dyn DataSource>, city: &str) -> anyhow::Result<()> {
    let kind = source.kind();
    let lookup = WeatherLookup::new(source);

    let state = lookup.submit(city).await?;
    if let LookupState::Failed(failure) = &state {
        anyhow::bail!("{}", failure.message);
    }
    println!("{}", render_state(&state, kind, Local::now()));

    Ok(())
}

async fn interactive(source: Arc<dyn DataSource>, default_city: &str) -> anyhow::Result<()> {
    let kind = source.kind();
    let (lookup, handle) = WeatherLookup::mount_with_handle(source, default_city);
    if lookup.is_busy() {
        println!("{LOADING_TEXT}");
    }
    await_lookup(&lookup, handle, kind, tokio::signal::ctrl_c()).await?;

    loop {
        let answer = tokio::task::spawn_blocking(|| {
            Text::new("City:").with_placeholder(CITY_PLACEHOLDER).prompt()
        })
        .await
        .context("Prompt task failed")?;

        let query = match answer {
            Ok(query) => query,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        search(&lookup, &query, kind).await?;
    }

    Ok(())
}

/// One submission; Ctrl-C while it is loading cancels it.
async fn search(lookup: &WeatherLookup, query: &str, kind: SourceKind) -> anyhow::Result<()> {
    let handle = lookup.spawn_submit(query)?;
    if lookup.is_busy() {
        println!("{LOADING_TEXT}");
    }

    await_lookup(lookup, handle, kind, tokio::signal::ctrl_c()).await
}

/// Print the outcome of an admitted lookup, or abort it if `cancel` fires first.
async fn await_lookup(
    lookup: &WeatherLookup,
    mut handle: JoinHandle<LookupState>,
    kind: SourceKind,
    cancel: impl Future,
) -> anyhow::Result<()> {
    tokio::select! {
        joined = &mut handle => {
            let state = joined.context("Lookup task failed")?;
            print_state(&state, kind);
        }
        _ = cancel => {
            handle.abort();
            // Wait for the task to unwind so the machine is back to Idle.
            let _ = handle.await;
            debug!(state = ?lookup.state(), "lookup aborted");
            println!("Lookup cancelled.");
        }
    }

    Ok(())
}

fn print_state(state: &LookupState, kind: SourceKind) {
    let text = render_state(state, kind, Local::now());
    if !text.is_empty() {
        println!("{text}\n");
    }
}
