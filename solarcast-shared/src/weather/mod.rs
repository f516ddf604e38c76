/// Weather proxy
///
/// Forwards a city/country pair to the upstream provider and reshapes the
/// answer into the small payloads the frontend renders.
///
/// - [`WeatherService::current`]: one upstream call, reshaped into
///   [`CurrentWeather`]
/// - [`WeatherService::forecast`]: one upstream call per day for the next
///   [`FORECAST_DAYS`] days, issued sequentially; the first failure aborts
///   the whole request and no partial list is returned
///
/// Transport is behind [`WeatherSource`], implemented for real by
/// [`WeatherApiClient`].

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};

pub mod client;
pub mod types;

pub use client::{WeatherApiClient, WeatherApiConfig};
pub use types::{CurrentPayload, CurrentWeather, DailyForecast, ForecastPayload, TemperatureSummary};

/// Number of days returned by a forecast, starting tomorrow
pub const FORECAST_DAYS: u64 = 6;

/// Hour slot whose wind speed represents the day
pub const REPRESENTATIVE_HOUR: usize = 6;

/// Errors from the upstream provider or its payloads
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Network failure or timeout
    #[error("Weather request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Weather provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the expected JSON
    #[error("Unexpected weather payload: {0}")]
    Decode(String),

    /// A field the reshaping needs was absent
    #[error("Weather payload missing {0}")]
    MissingField(&'static str),
}

/// Weather result type alias
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Raw access to the upstream provider
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions for a `"city,country"` query
    async fn current(&self, query: &str) -> WeatherResult<CurrentPayload>;

    /// Forecast for a single calendar date
    async fn forecast_for(&self, query: &str, date: NaiveDate) -> WeatherResult<ForecastPayload>;
}

/// Builds the provider query string
pub fn location_query(city: &str, country: &str) -> String {
    format!("{},{}", city, country)
}

/// The dates a forecast covers: `today + 1` through `today + FORECAST_DAYS`
pub fn forecast_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (1..=FORECAST_DAYS)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}

/// Reduces one forecast response to the day summary served to clients
pub fn summarize_day(payload: ForecastPayload) -> WeatherResult<DailyForecast> {
    let day = payload
        .forecast
        .forecastday
        .into_iter()
        .next()
        .ok_or(WeatherError::MissingField("forecast.forecastday[0]"))?;

    let wind_speed = day
        .hour
        .get(REPRESENTATIVE_HOUR)
        .map(|hour| hour.wind_kph)
        .ok_or(WeatherError::MissingField("forecastday[0].hour[6]"))?;

    Ok(DailyForecast {
        date: day.date,
        temperature: TemperatureSummary {
            max: day.day.avgtemp_c,
        },
        humidity: day.day.avghumidity,
        wind_speed,
        condition: day.day.condition.text,
    })
}

/// Cheap-to-clone handle used by the HTTP layer
#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
}

impl WeatherService {
    /// Wraps a source
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Current conditions for a location
    pub async fn current(&self, city: &str, country: &str) -> WeatherResult<CurrentWeather> {
        let query = location_query(city, country);
        info!(%query, "Fetching current weather");

        let payload = self.source.current(&query).await?;
        Ok(CurrentWeather::from(payload))
    }

    /// Six-day forecast starting tomorrow on the server's local calendar
    pub async fn forecast(&self, city: &str, country: &str) -> WeatherResult<Vec<DailyForecast>> {
        self.forecast_from(city, country, Local::now().date_naive())
            .await
    }

    /// Six-day forecast starting the day after `today`
    ///
    /// Calls are made one after another; any failure is returned as-is and
    /// the days already fetched are discarded.
    pub async fn forecast_from(
        &self,
        city: &str,
        country: &str,
        today: NaiveDate,
    ) -> WeatherResult<Vec<DailyForecast>> {
        let query = location_query(city, country);
        info!(%query, %today, "Fetching future weather");

        let mut days = Vec::with_capacity(FORECAST_DAYS as usize);
        for date in forecast_dates(today) {
            debug!(%date, "Fetching forecast day");
            let payload = self.source.forecast_for(&query, date).await?;
            days.push(summarize_day(payload)?);
        }

        Ok(days)
    }
}
