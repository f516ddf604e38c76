/// weatherapi.com HTTP client
///
/// Issues `current.json` and `forecast.json` requests with the API key and a
/// `"city,country"` query. One `reqwest::Client` is shared for all calls and
/// carries a request timeout so a stuck provider fails the request instead of
/// holding it open.
///
/// # Example
///
/// ```no_run
/// use solarcast_shared::weather::{WeatherApiClient, WeatherApiConfig, WeatherSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WeatherApiClient::new(WeatherApiConfig {
///     api_key: std::env::var("WEATHER_API_KEY")?,
///     ..Default::default()
/// })?;
///
/// let payload = client.current("Kandy,Sri Lanka").await?;
/// println!("{}: {}°C", payload.location.name, payload.current.temp_c);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{CurrentPayload, ForecastPayload};
use super::{WeatherError, WeatherResult, WeatherSource};

/// Default provider endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Client settings
#[derive(Debug, Clone)]
pub struct WeatherApiConfig {
    /// Provider API key
    pub api_key: String,

    /// Base URL without trailing path, e.g. `https://api.weatherapi.com/v1`
    pub base_url: String,

    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

/// [`WeatherSource`] backed by weatherapi.com
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    /// Builds the client
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Request` if the TLS backend cannot initialise.
    pub fn new(config: WeatherApiConfig) -> WeatherResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(WeatherError::Request)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> WeatherResult<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, ?params, "Calling weather provider");

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Request(e.without_url()))?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "Weather provider returned error status");
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn current(&self, query: &str) -> WeatherResult<CurrentPayload> {
        self.get_json("current.json", &[("q", query)]).await
    }

    async fn forecast_for(&self, query: &str, date: NaiveDate) -> WeatherResult<ForecastPayload> {
        let dt = date.format("%Y-%m-%d").to_string();
        self.get_json("forecast.json", &[("q", query), ("dt", dt.as_str())])
            .await
    }
}
