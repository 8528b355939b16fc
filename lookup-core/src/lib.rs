//! Core library for the `weather-lookup` tool.
//!
//! This crate defines:
//! - The weather report wire model (OpenWeather "current weather" shape)
//! - The data source abstraction, with an offline mock table and the live endpoint
//! - The lookup state machine driving a single weather card
//! - Configuration & credentials handling
//!
//! It is used by `weather-lookup-cli`, but any front end can drive
//! [`WeatherLookup`] and render its [`LookupState`].

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod source;
pub mod state;

pub use config::{Config, LiveConfig, MockConfig};
pub use error::{ErrorKind, LookupError, SubmitError};
pub use lookup::WeatherLookup;
pub use model::{TemperatureBand, WeatherReport};
pub use source::{DataSource, SourceKind};
pub use state::{Failure, LookupState};
