//! Weather lookup tool
//!
//! Queries the open-weather13 API on RapidAPI. The API reports Fahrenheit;
//! results are converted to Celsius rounded to two decimals.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const NAME: &str = "get_weather_info";

const DEFAULT_HOST: &str = "open-weather13.p.rapidapi.com";
const DEFAULT_BASE_URL: &str = "https://open-weather13.p.rapidapi.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Arguments the model passes to `get_weather_info`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherInfoInput {
    pub city: String,
}

/// Current conditions for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub city: String,
    /// Degrees Celsius, two decimals
    pub temperature: f64,
    pub conditions: String,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("WEATHER_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid weather endpoint: {0}")]
    InvalidUrl(String),
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("weather API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected weather response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("weather response has no conditions")]
    MissingConditions,
}

pub fn description() -> String {
    "Get the weather information for a city".to_string()
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "required": ["city"],
        "properties": {
            "city": {
                "type": "string",
                "description": "the city to get the weather for"
            }
        }
    })
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    round_hundredths((fahrenheit - 32.0) * (5.0 / 9.0))
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Source of current weather conditions
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherInfo, WeatherError>;
}

/// Weather API settings
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub host: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host: DEFAULT_HOST.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl WeatherConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("WEATHER_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            host: std::env::var("WEATHER_API_HOST").unwrap_or(defaults.host),
            base_url: std::env::var("WEATHER_BASE_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("WEATHER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.timeout, Duration::from_secs),
        }
    }
}

/// `WeatherSource` backed by the RapidAPI endpoint
pub struct RapidApiWeather {
    client: Client,
    config: WeatherConfig,
}

impl RapidApiWeather {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn city_url(&self, city: &str) -> Result<Url, WeatherError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| WeatherError::InvalidUrl(format!("{}: {e}", self.config.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| WeatherError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .push("city")
            .push(city);
        Ok(url)
    }
}

#[async_trait]
impl WeatherSource for RapidApiWeather {
    async fn current(&self, city: &str) -> Result<WeatherInfo, WeatherError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(WeatherError::MissingApiKey)?;
        let url = self.city_url(city)?;

        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.config.host)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(city = %city, status = %status, body = %body, "Weather API response");

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let report: WeatherReport = serde_json::from_str(&body)?;
        report.into_info(city)
    }
}

// open-weather13 response types

#[derive(Debug, Deserialize)]
struct WeatherReport {
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
}

impl WeatherReport {
    fn into_info(self, city: &str) -> Result<WeatherInfo, WeatherError> {
        let conditions = self
            .weather
            .into_iter()
            .next()
            .ok_or(WeatherError::MissingConditions)?
            .main;

        Ok(WeatherInfo {
            city: city.to_string(),
            temperature: fahrenheit_to_celsius(self.main.temp),
            conditions,
        })
    }
}
