//! Common test utilities for API integration tests
//!
//! Every test gets a fresh router backed by:
//! - an in-memory user store
//! - a canned weather source that records its calls
//!
//! No database or network access is needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::{json, Value};
use solarcast_api::app::{build_router, AppState};
use solarcast_api::config::{ApiConfig, Config, JwtConfig, LogFormat, WeatherConfig};
use solarcast_shared::store::memory::InMemoryUserStore;
use solarcast_shared::weather::{
    CurrentPayload, ForecastPayload, WeatherError, WeatherResult, WeatherService, WeatherSource,
};
use std::sync::{Arc, Mutex};
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Weather source answering from fixtures
#[derive(Default)]
pub struct StubWeather {
    /// Every `(query, date)` requested; `date` is `None` for current weather
    pub calls: Mutex<Vec<(String, Option<NaiveDate>)>>,

    /// Fail every call with this upstream status
    pub fail_status: Option<u16>,

    /// Fail forecasts from the nth call onward (1-based)
    pub fail_forecast_from_call: Option<usize>,
}

impl StubWeather {
    pub fn calls(&self) -> Vec<(String, Option<NaiveDate>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, query: &str, date: Option<NaiveDate>) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push((query.to_string(), date));
        calls.len()
    }

    fn upstream_failure(status: u16) -> WeatherError {
        WeatherError::Status {
            status,
            body: "upstream unavailable".to_string(),
        }
    }
}

#[async_trait]
impl WeatherSource for StubWeather {
    async fn current(&self, query: &str) -> WeatherResult<CurrentPayload> {
        self.record(query, None);
        if let Some(status) = self.fail_status {
            return Err(Self::upstream_failure(status));
        }

        let (city, country) = query.split_once(',').unwrap_or((query, ""));
        Ok(serde_json::from_value(json!({
            "location": { "name": city, "country": country, "localtime": "2024-02-12 14:05" },
            "current": {
                "temp_c": 28.4,
                "humidity": 66,
                "wind_kph": 9.4,
                "condition": { "text": "Partly cloudy" }
            }
        }))
        .unwrap())
    }

    async fn forecast_for(&self, query: &str, date: NaiveDate) -> WeatherResult<ForecastPayload> {
        let call = self.record(query, Some(date));
        if let Some(status) = self.fail_status {
            return Err(Self::upstream_failure(status));
        }
        if matches!(self.fail_forecast_from_call, Some(n) if call >= n) {
            return Err(Self::upstream_failure(503));
        }

        let hours: Vec<Value> = (0..24)
            .map(|h| {
                let wind = if h == 6 { 6.1 } else { 99.0 };
                json!({ "wind_kph": wind })
            })
            .collect();

        Ok(serde_json::from_value(json!({
            "forecast": { "forecastday": [ {
                "date": date.format("%Y-%m-%d").to_string(),
                "day": {
                    "avgtemp_c": 27.9,
                    "avghumidity": 74,
                    "condition": { "text": "Patchy rain nearby" }
                },
                "hour": hours
            } ] }
        }))
        .unwrap())
    }
}

/// Test context containing the router and its collaborators
pub struct TestContext {
    pub app: axum::Router,
    pub users: Arc<InMemoryUserStore>,
    pub weather: Arc<StubWeather>,
    pub config: Config,
}

impl TestContext {
    /// Fresh context with a working weather stub
    pub fn new() -> Self {
        Self::with_weather(StubWeather::default())
    }

    /// Fresh context with a custom weather stub
    pub fn with_weather(stub: StubWeather) -> Self {
        Self::build(stub, None)
    }

    /// Fresh context whose tokens expire after `hours`
    pub fn with_token_ttl(hours: i64) -> Self {
        Self::build(StubWeather::default(), Some(hours))
    }

    fn build(stub: StubWeather, ttl_hours: Option<i64>) -> Self {
        let config = test_config(ttl_hours);
        let users = Arc::new(InMemoryUserStore::new());
        let weather = Arc::new(stub);

        let state = AppState::new(
            users.clone(),
            WeatherService::new(weather.clone()),
            config.clone(),
        );

        Self {
            app: build_router(state),
            users,
            weather,
            config,
        }
    }

    /// Sends a request and returns status plus parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&body))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }

    /// Signs up a user and asserts success
    pub async fn signup(&self, username: &str, email: &str, password: &str) {
        let (status, body) = self
            .post_json(
                "/api/signup",
                json!({ "username": username, "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn test_config(ttl_hours: Option<i64>) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            ttl_hours,
        },
        weather: WeatherConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
        },
        log_format: LogFormat::Pretty,
    }
}
