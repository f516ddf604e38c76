/// Upstream payloads and the reduced shapes served to clients
///
/// Only the fields the proxy reads are modelled; serde ignores the rest of
/// the provider's (large) responses. Humidity is kept as the provider's own
/// JSON number so an integer `66` is served back as `66`, not `66.0`.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// `current.json` response
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPayload {
    pub location: LocationPayload,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationPayload {
    pub name: String,
    pub country: String,
    pub localtime: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub humidity: Number,
    pub wind_kph: f64,
    pub condition: ConditionPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionPayload {
    pub text: String,
}

/// `forecast.json` response
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub forecast: ForecastBlock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastBlock {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
    #[serde(default)]
    pub hour: Vec<HourSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaySummary {
    pub avgtemp_c: f64,
    pub avghumidity: Number,
    pub condition: ConditionPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourSummary {
    pub wind_kph: f64,
}

/// Current conditions as served by `GET /api/currentWeather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub name: String,
    pub country: String,
    pub localtime: String,
    pub temperature: f64,
    pub humidity: Number,
    pub wind_speed: f64,
    pub condition: String,
}

impl From<CurrentPayload> for CurrentWeather {
    fn from(payload: CurrentPayload) -> Self {
        Self {
            name: payload.location.name,
            country: payload.location.country,
            localtime: payload.location.localtime,
            temperature: payload.current.temp_c,
            humidity: payload.current.humidity,
            wind_speed: payload.current.wind_kph,
            condition: payload.current.condition.text,
        }
    }
}

/// One day as served by `GET /api/futureWeather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: String,
    pub temperature: TemperatureSummary,
    pub humidity: Number,
    pub wind_speed: f64,
    pub condition: String,
}

/// Daily temperature block; `max` carries the provider's daily average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub max: f64,
}
