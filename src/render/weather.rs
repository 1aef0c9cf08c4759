//! Sky classification and the weather block of the status embed

use crate::models::{Weather, WindLayer};

use super::Accent;

/// Cloud-density band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyTier {
    Sunny,
    PartialOvercast,
    Overcast,
}

impl SkyTier {
    pub const fn from_density(density: i32) -> Self {
        if density <= 2 {
            Self::Sunny
        } else if density <= 5 {
            Self::PartialOvercast
        } else {
            Self::Overcast
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::PartialOvercast => "Partial overcast",
            Self::Overcast => "Overcast",
        }
    }

    pub const fn icon(self) -> WeatherIcon {
        match self {
            Self::Sunny => WeatherIcon::Sun,
            Self::PartialOvercast => WeatherIcon::SunBehindCloud,
            Self::Overcast => WeatherIcon::Cloud,
        }
    }

    pub const fn accent(self) -> Accent {
        match self {
            Self::Sunny => Accent::Sunny,
            Self::PartialOvercast => Accent::PartialOvercast,
            Self::Overcast => Accent::Overcast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precipitation {
    None,
    Rain,
    Storm,
}

impl Precipitation {
    /// Codes other than rain (1) and thunderstorm (2) render as dry.
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Rain,
            2 => Self::Storm,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Sun,
    SunBehindCloud,
    Cloud,
    SunBehindRainCloud,
    RainCloud,
    Storm,
}

impl WeatherIcon {
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Sun => "☀️",
            Self::SunBehindCloud => "⛅",
            Self::Cloud => "☁️",
            Self::SunBehindRainCloud => "🌦️",
            Self::RainCloud => "🌧️",
            Self::Storm => "⛈️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyCondition {
    pub tier: SkyTier,
    pub label: String,
    pub icon: WeatherIcon,
}

/// Classify the sky from cloud density and precipitation code.
pub fn classify(density: i32, precipitation_code: i32) -> SkyCondition {
    let tier = SkyTier::from_density(density);

    let (label, icon) = match Precipitation::from_code(precipitation_code) {
        Precipitation::None => (tier.label().to_string(), tier.icon()),
        Precipitation::Rain => {
            let icon = if density <= 8 {
                WeatherIcon::SunBehindRainCloud
            } else {
                WeatherIcon::RainCloud
            };
            (format!("{} rainy", tier.label()), icon)
        }
        Precipitation::Storm => (format!("{} stormy", tier.label()), WeatherIcon::Storm),
    };

    SkyCondition { tier, label, icon }
}

/// Round a heading into `0..360` and zero-pad it (`5` -> `005`, `359.6` -> `000`).
pub fn format_heading(degrees: f64) -> String {
    format!("{:03}", (degrees.round() as i64).rem_euclid(360))
}

/// Zero-pad a wind speed to two digits (`7.0` -> `07`).
pub fn format_speed(speed: f64) -> String {
    format!("{:02}", speed.round() as i64)
}

fn wind_line(band: &str, layer: WindLayer) -> String {
    format!(
        "{band}: **{}° @ {} m/s**",
        format_heading(layer.dir),
        format_speed(layer.speed)
    )
}

pub fn render_weather(weather: &Weather) -> String {
    let sky = classify(weather.clouds.density, weather.clouds.iprecptns);

    let lines = [
        "**Weather**".to_string(),
        format!("{} {}", sky.icon.emoji(), sky.label),
        format!("Temperature: **{:.0} °C**", weather.temperature),
        format!(
            "Clouds: base **{} m**, thickness **{} m**",
            weather.clouds.base, weather.clouds.thickness
        ),
        String::new(),
        "**Wind**".to_string(),
        wind_line("Ground", weather.wind.at_ground),
        wind_line("6,500 ft", weather.wind.at2000),
        wind_line("26,000 ft", weather.wind.at8000),
    ];

    lines.join("\n")
}
