use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::{error::LookupError, model::WeatherReport};

use super::{DataSource, SourceKind};

pub const OPENWEATHER_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenWeather "current weather" endpoint, metric units.
#[derive(Debug, Clone)]
pub struct LiveSource {
    api_key: String,
    endpoint: String,
    timeout: Duration,
    http: Client,
}

impl LiveSource {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: OPENWEATHER_CURRENT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn classify(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.timeout)
        } else {
            LookupError::Transport(err)
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            info!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(LookupError::NotFound { status: status.as_u16() });
        }

        let report: WeatherReport = serde_json::from_str(&body)?;
        debug!(city, name = %report.name, "OpenWeather lookup succeeded");

        Ok(report)
    }
}

#[async_trait]
impl DataSource for LiveSource {
    async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError> {
        self.fetch_current(city).await
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
