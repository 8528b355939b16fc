use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Current conditions for one location.
///
/// Field layout mirrors the OpenWeather "current weather" body, so a live
/// response deserializes straight into this type. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub sys: Sys,
    pub coord: Coord,
    pub main: Readings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    /// Metres.
    pub visibility: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// hPa.
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        format!("{ICON_URL_BASE}/{}@2x.png", self.icon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// m/s.
    pub speed: f64,
}

impl WeatherReport {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn icon_url(&self) -> Option<String> {
        self.primary_condition().map(Condition::icon_url)
    }

    pub fn sunrise_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunrise, 0)
    }

    pub fn sunset_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunset, 0)
    }

    pub fn visibility_km(&self) -> f64 {
        f64::from(self.visibility) / 1000.0
    }

    pub fn temperature_band(&self) -> TemperatureBand {
        TemperatureBand::from_celsius(self.main.temp)
    }
}

/// Coarse temperature bucket used to pick the card styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureBand {
    Cold,
    Cool,
    Mild,
    Warm,
}

impl TemperatureBand {
    pub fn from_celsius(temp: f64) -> Self {
        if temp <= 0.0 {
            TemperatureBand::Cold
        } else if temp <= 15.0 {
            TemperatureBand::Cool
        } else if temp <= 25.0 {
            TemperatureBand::Mild
        } else {
            TemperatureBand::Warm
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureBand::Cold => "cold",
            TemperatureBand::Cool => "cool",
            TemperatureBand::Mild => "mild",
            TemperatureBand::Warm => "warm",
        }
    }

    /// CSS background used by web front ends.
    pub fn gradient(&self) -> &'static str {
        match self {
            TemperatureBand::Cold => "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
            TemperatureBand::Cool => "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
            TemperatureBand::Mild => "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
            TemperatureBand::Warm => "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
        }
    }
}
