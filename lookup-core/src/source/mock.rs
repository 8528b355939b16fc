use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::LookupError,
    model::{Condition, Coord, Readings, Sys, WeatherReport, Wind},
};

use super::{DataSource, SourceKind};

pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(1000);

struct Seed {
    key: &'static str,
    name: &'static str,
    country: &'static str,
    sunrise: i64,
    sunset: i64,
    lat: f64,
    lon: f64,
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
    main: &'static str,
    description: &'static str,
    icon: &'static str,
    wind: f64,
    visibility: u32,
}

static SEEDS: [Seed; 6] = [
    Seed {
        key: "london",
        name: "London",
        country: "GB",
        sunrise: 1640149200,
        sunset: 1640176800,
        lat: 51.5074,
        lon: -0.1278,
        temp: 12.0,
        feels_like: 10.0,
        humidity: 78,
        pressure: 1013,
        main: "Clouds",
        description: "overcast clouds",
        icon: "04d",
        wind: 3.5,
        visibility: 8000,
    },
    Seed {
        key: "tokyo",
        name: "Tokyo",
        country: "JP",
        sunrise: 1640128800,
        sunset: 1640160000,
        lat: 35.6762,
        lon: 139.6503,
        temp: 8.0,
        feels_like: 6.0,
        humidity: 65,
        pressure: 1020,
        main: "Clear",
        description: "clear sky",
        icon: "01d",
        wind: 2.1,
        visibility: 10000,
    },
    Seed {
        key: "newyork",
        name: "New York",
        country: "US",
        sunrise: 1640179200,
        sunset: 1640208000,
        lat: 40.7128,
        lon: -74.0060,
        temp: 18.0,
        feels_like: 16.0,
        humidity: 60,
        pressure: 1015,
        main: "Rain",
        description: "light rain",
        icon: "10d",
        wind: 4.2,
        visibility: 7000,
    },
    Seed {
        key: "paris",
        name: "Paris",
        country: "FR",
        sunrise: 1640151600,
        sunset: 1640178400,
        lat: 48.8566,
        lon: 2.3522,
        temp: 15.0,
        feels_like: 13.0,
        humidity: 72,
        pressure: 1012,
        main: "Mist",
        description: "mist",
        icon: "50d",
        wind: 2.8,
        visibility: 5000,
    },
    Seed {
        key: "mumbai",
        name: "Mumbai",
        country: "IN",
        sunrise: 1640128200,
        sunset: 1640169600,
        lat: 19.0760,
        lon: 72.8777,
        temp: 28.0,
        feels_like: 31.0,
        humidity: 85,
        pressure: 1008,
        main: "Thunderstorm",
        description: "thunderstorm with rain",
        icon: "11d",
        wind: 5.5,
        visibility: 6000,
    },
    Seed {
        key: "sydney",
        name: "Sydney",
        country: "AU",
        sunrise: 1640110800,
        sunset: 1640163600,
        lat: -33.8688,
        lon: 151.2093,
        temp: 32.0,
        feels_like: 35.0,
        humidity: 55,
        pressure: 1018,
        main: "Clear",
        description: "clear sky",
        icon: "01d",
        wind: 3.8,
        visibility: 12000,
    },
];

impl Seed {
    fn report(&self) -> WeatherReport {
        WeatherReport {
            name: self.name.to_string(),
            sys: Sys { country: self.country.to_string(), sunrise: self.sunrise, sunset: self.sunset },
            coord: Coord { lat: self.lat, lon: self.lon },
            main: Readings {
                temp: self.temp,
                feels_like: self.feels_like,
                humidity: self.humidity,
                pressure: self.pressure,
            },
            weather: vec![Condition {
                main: self.main.to_string(),
                description: self.description.to_string(),
                icon: self.icon.to_string(),
            }],
            wind: Wind { speed: self.wind },
            visibility: self.visibility,
        }
    }
}

/// Lowercases and strips every whitespace character: "  New York " -> "newyork".
pub fn normalize_city(query: &str) -> String {
    query.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}

/// Offline source backed by a fixed six-city table.
#[derive(Debug, Clone)]
pub struct MockSource {
    table: HashMap<&'static str, WeatherReport>,
    delay: Duration,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    pub fn new() -> Self {
        let table = SEEDS.iter().map(|seed| (seed.key, seed.report())).collect();
        Self { table, delay: DEFAULT_MOCK_DELAY }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Table entry for `query` after normalization, without the artificial delay.
    pub fn report(&self, query: &str) -> Option<&WeatherReport> {
        self.table.get(normalize_city(query).as_str())
    }

    /// Display names of the supported cities, in table order.
    pub fn cities() -> impl Iterator<Item = &'static str> {
        SEEDS.iter().map(|seed| seed.name)
    }
}

#[async_trait]
impl DataSource for MockSource {
    async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError> {
        tokio::time::sleep(self.delay).await;

        let found = self.report(city).cloned();
        debug!(city, found = found.is_some(), "mock lookup");
        found.ok_or(LookupError::UnknownCity)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Mock
    }
}
