use crate::{
    Config, LookupError, WeatherReport,
    source::{live::LiveSource, mock::MockSource},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod live;
pub mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    #[default]
    Mock,
    Live,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Mock => "mock",
            SourceKind::Live => "live",
        }
    }

    pub const fn all() -> &'static [SourceKind] {
        &[SourceKind::Mock, SourceKind::Live]
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "mock" | "demo" => Ok(SourceKind::Mock),
            "live" => Ok(SourceKind::Live),
            _ => Err(anyhow::anyhow!(
                "Unknown data source '{value}'. Supported sources: mock, live."
            )),
        }
    }
}

/// Resolves a city name to current conditions.
#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    /// `city` arrives already trimmed and non-empty.
    async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError>;

    fn kind(&self) -> SourceKind;
}

/// Construct a data source from config and explicit SourceKind.
pub fn source_from_config(kind: SourceKind, config: &Config) -> anyhow::Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match kind {
        SourceKind::Mock => Arc::new(MockSource::new().with_delay(config.mock_delay())),
        SourceKind::Live => {
            let api_key = config.live_api_key().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for the live source.\n\
                     Hint: run `weather-lookup configure live` or set OPENWEATHER_API_KEY."
                )
            })?;

            let mut live = LiveSource::new(api_key.to_owned()).with_timeout(config.live_timeout());
            if let Some(endpoint) = config.live_endpoint() {
                live = live.with_endpoint(endpoint.to_owned());
            }
            Arc::new(live)
        }
    };

    Ok(source)
}

/// Construct the default data source from config, using `default_source` field.
pub fn default_source_from_config(config: &Config) -> anyhow::Result<Arc<dyn DataSource>> {
    let kind = config.source_kind()?;
    source_from_config(kind, config)
}
