/// Weather proxy endpoints
///
/// # Endpoints
///
/// - `GET /api/currentWeather?city=Kandy&country=Sri%20Lanka`
/// - `GET /api/futureWeather?city=Kandy&country=Sri%20Lanka`
///
/// Both query parameters are required. Provider failures surface as a 500
/// with a generic message; the detail is logged.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use solarcast_shared::weather::{CurrentWeather, DailyForecast};

/// Location query string
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub city: Option<String>,
    pub country: Option<String>,
}

impl LocationQuery {
    /// Returns `(city, country)` or a 400 if either is missing or blank
    fn require(self) -> ApiResult<(String, String)> {
        let city = self.city.map(|c| c.trim().to_string()).unwrap_or_default();
        let country = self
            .country
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if city.is_empty() || country.is_empty() {
            return Err(ApiError::BadRequest(
                "Both city and country query parameters are required".to_string(),
            ));
        }

        Ok((city, country))
    }
}

/// Current conditions
///
/// # Response
///
/// ```json
/// {
///   "name": "Kandy",
///   "country": "Sri Lanka",
///   "localtime": "2024-02-12 14:05",
///   "temperature": 28.4,
///   "humidity": 66,
///   "windSpeed": 9.4,
///   "condition": "Partly cloudy"
/// }
/// ```
pub async fn current_weather(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<CurrentWeather>> {
    let (city, country) = query.require()?;
    let current = state.weather.current(&city, &country).await?;
    Ok(Json(current))
}

/// Six-day forecast starting tomorrow
///
/// # Response
///
/// ```json
/// [
///   {
///     "date": "2024-02-13",
///     "temperature": { "max": 27.9 },
///     "humidity": 74,
///     "windSpeed": 6.1,
///     "condition": "Patchy rain nearby"
///   }
/// ]
/// ```
///
/// Always six entries; if any day fails the whole request fails.
pub async fn future_weather(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<Vec<DailyForecast>>> {
    let (city, country) = query.require()?;
    let days = state.weather.forecast(&city, &country).await?;
    Ok(Json(days))
}
