use std::fmt::{Display, Write};

use chrono::{DateTime, TimeZone};
use weather_lookup_core::{LookupState, SourceKind, WeatherReport};

pub const LOADING_TEXT: &str = "Fetching weather data...";

/// Text for the current state. Only `Success` ever shows a report.
pub fn render_state<Tz>(state: &LookupState, kind: SourceKind, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match state {
        LookupState::Idle => String::new(),
        LookupState::Loading => LOADING_TEXT.to_string(),
        LookupState::Success(report) => render_card(report, kind, now),
        LookupState::Failed(failure) => format!("⚠️  {}", failure.message),
    }
}

pub fn render_card<Tz>(report: &WeatherReport, kind: SourceKind, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}, {}", report.name, report.sys.country);
    let _ = writeln!(out, "📍 {}°, {}°", report.coord.lat, report.coord.lon);

    if let Some(condition) = report.primary_condition() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}°C  {}", report.main.temp.round(), condition.main);
        let _ = writeln!(out, "  {}", condition.description);
        let _ = writeln!(out, "  icon: {}", condition.icon_url());
    } else {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}°C", report.main.temp.round());
    }

    let _ = writeln!(out);
    detail(&mut out, "Feels like", format!("{}°C", report.main.feels_like.round()));
    detail(&mut out, "Humidity", format!("{}%", report.main.humidity));
    detail(&mut out, "Wind Speed", format!("{} m/s", report.wind.speed));
    detail(&mut out, "Visibility", format!("{:.1} km", report.visibility_km()));
    detail(&mut out, "Pressure", format!("{} hPa", report.main.pressure));
    if let Some(sunrise) = report.sunrise_utc() {
        detail(&mut out, "Sunrise", sunrise.with_timezone(&tz).format("%H:%M:%S").to_string());
    }
    detail(&mut out, "Feel", report.temperature_band().label().to_string());

    let _ = writeln!(out);
    let mut footer = format!("Last updated: {}", now.format("%Y-%m-%d %H:%M:%S"));
    if kind == SourceKind::Mock {
        footer.push_str(" (Demo Mode)");
    }
    out.push_str(&footer);

    out
}

fn detail(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "  {label:<11} {value}");
}
