/// API integration tests
///
/// Drive the full router (routing, extraction, validation, error mapping,
/// middleware) against the in-memory store and a stub weather source.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Days, Local};
use common::{json_request, StubWeather, TestContext, TEST_SECRET};
use serde_json::json;
use solarcast_shared::auth::jwt;
use solarcast_shared::store::UserStore;

// --- signup / login -------------------------------------------------------

#[tokio::test]
async fn test_signup_stores_hash_not_password() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/api/signup",
            json!({ "username": "nimal", "email": "nimal@example.com", "password": "monsoon" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let stored = ctx
        .users
        .find_by_email("nimal@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "monsoon");
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert!(stored.functions.is_empty());
}

#[tokio::test]
async fn test_signup_duplicate_email_rejected() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "monsoon").await;

    let (status, body) = ctx
        .post_json(
            "/api/signup",
            json!({ "username": "other", "email": "nimal@example.com", "password": "x" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
    assert_eq!(ctx.users.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signups_create_one_record() {
    use tower::Service as _;

    let ctx = TestContext::new();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mut app = ctx.app.clone();
            let request = json_request(
                "POST",
                "/api/signup",
                json!({ "username": format!("racer{}", i), "email": "race@example.com", "password": "pw" }),
            );
            tokio::spawn(async move { app.call(request).await.unwrap().status() })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            status => assert_eq!(status, StatusCode::BAD_REQUEST),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(ctx.users.len().await, 1);
}

#[tokio::test]
async fn test_signup_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/api/signup",
            json!({ "username": "", "email": "not-an-email", "password": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password", "username"]);
    assert!(ctx.users.is_empty().await);
}

#[tokio::test]
async fn test_signup_missing_fields_is_bad_request() {
    let ctx = TestContext::new();

    let (status, body) = ctx.post_json("/api/signup", json!({ "username": "x" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_signup_wrong_field_type_is_json_400() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/api/signup",
            json!({ "username": "x", "email": "x@example.com", "password": 123 }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());
    assert!(ctx.users.is_empty().await);
}

#[tokio::test]
async fn test_malformed_json_is_json_400() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/user")
        .header("content-type", "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_without_content_type_is_json_400() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "monsoon").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .body(Body::from(
            json!({ "email": "nimal@example.com", "password": "monsoon" }).to_string(),
        ))
        .unwrap();
    let (status, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_login_returns_valid_token() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "monsoon").await;

    let (status, body) = ctx
        .post_json(
            "/api/login",
            json!({ "email": "nimal@example.com", "password": "monsoon" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "nimal");
    assert_eq!(body["functions"], json!([]));

    let token = body["token"].as_str().unwrap();
    let claims = jwt::validate_token(token, TEST_SECRET).unwrap();
    let user = ctx
        .users
        .find_by_email("nimal@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claims.sub, user.id);
    assert!(claims.exp.is_none());

    // Same token under another secret is rejected
    assert!(jwt::validate_token(token, "another-secret-key-at-least-32-bytes").is_err());
}

#[tokio::test]
async fn test_login_token_expiry_when_configured() {
    let ctx = TestContext::with_token_ttl(2);
    ctx.signup("nimal", "nimal@example.com", "monsoon").await;

    let (_, body) = ctx
        .post_json(
            "/api/login",
            json!({ "email": "nimal@example.com", "password": "monsoon" }),
        )
        .await;

    let claims = jwt::validate_token(body["token"].as_str().unwrap(), TEST_SECRET).unwrap();
    let exp = claims.exp.unwrap();
    assert!((exp - claims.iat - 2 * 3600).abs() <= 1);
}

#[tokio::test]
async fn test_login_returns_feature_flags() {
    let ctx = TestContext::new();
    let (status, _) = ctx
        .post_json(
            "/api/user",
            json!({
                "username": "kumari",
                "email": "kumari@example.com",
                "password": "kandy-hills",
                "functions": ["table", "graph"]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .post_json(
            "/api/login",
            json!({ "email": "kumari@example.com", "password": "kandy-hills" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["functions"], json!(["table", "graph"]));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "monsoon").await;

    let (wrong_status, wrong_body) = ctx
        .post_json(
            "/api/login",
            json!({ "email": "nimal@example.com", "password": "drought" }),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .post_json(
            "/api/login",
            json!({ "email": "ghost@example.com", "password": "monsoon" }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid credentials");
    assert!(wrong_body.get("token").is_none());
}

#[tokio::test]
async fn test_login_unknown_email_on_empty_directory() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/api/login",
            json!({ "email": "ghost@example.com", "password": "monsoon" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");
}

// --- user directory -------------------------------------------------------

#[tokio::test]
async fn test_list_users_never_exposes_hashes() {
    let ctx = TestContext::new();
    ctx.signup("first", "first@example.com", "pw-one").await;
    ctx.signup("second", "second@example.com", "pw-two").await;

    let (status, body) = ctx.get("/api/users").await;

    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "second");
    assert_eq!(users[1]["username"], "first");

    let raw = body.to_string();
    assert!(!raw.contains("password"));
    assert!(!raw.contains("$argon2"));
}

#[tokio::test]
async fn test_get_user_profile() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "monsoon").await;

    let (status, body) = ctx.get("/api/user/nimal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "username": "nimal", "email": "nimal@example.com" }));

    let (status, body) = ctx.get("/api/user/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_username_lookup_picks_oldest() {
    let ctx = TestContext::new();
    ctx.signup("twin", "first-twin@example.com", "pw").await;
    ctx.signup("twin", "second-twin@example.com", "pw").await;

    let (_, body) = ctx.get("/api/user/twin").await;
    assert_eq!(body["email"], "first-twin@example.com");
}

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let ctx = TestContext::new();
    ctx.post_json(
        "/api/user",
        json!({
            "username": "kumari",
            "email": "kumari@example.com",
            "password": "pw",
            "functions": ["table"]
        }),
    )
    .await;

    let (status, body) = ctx
        .put_json("/api/update/kumari", json!({ "functions": ["graph", "map"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User details updated successfully");

    let user = ctx.users.find_by_username("kumari").await.unwrap().unwrap();
    assert_eq!(user.email, "kumari@example.com");
    assert_eq!(user.functions, vec!["graph".to_string(), "map".to_string()]);

    // Empty email counts as not supplied
    let (status, _) = ctx
        .put_json("/api/update/kumari", json!({ "email": "" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .put_json("/api/update/kumari", json!({ "email": "kumari@new.example" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let user = ctx.users.find_by_username("kumari").await.unwrap().unwrap();
    assert_eq!(user.email, "kumari@new.example");
    assert_eq!(user.functions, vec!["graph".to_string(), "map".to_string()]);
}

#[tokio::test]
async fn test_update_errors() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "pw").await;
    ctx.signup("kumari", "kumari@example.com", "pw").await;

    let (status, _) = ctx
        .put_json("/api/update/ghost", json!({ "functions": [] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .put_json("/api/update/nimal", json!({ "email": "kumari@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = ctx
        .put_json("/api/update/nimal", json!({ "email": "nope" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = ctx
        .put_json("/api/update/nimal", json!({ "functions": "table" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let user = ctx.users.find_by_username("nimal").await.unwrap().unwrap();
    assert_eq!(user.email, "nimal@example.com");
}

#[tokio::test]
async fn test_empty_update_is_noop_success() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "pw").await;

    let (status, _) = ctx.put_json("/api/update/nimal", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user() {
    let ctx = TestContext::new();
    ctx.signup("nimal", "nimal@example.com", "pw").await;
    ctx.signup("kumari", "kumari@example.com", "pw").await;

    let (status, body) = ctx.delete("/api/delete/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    assert_eq!(ctx.users.len().await, 2);

    let (status, body) = ctx.delete("/api/delete/nimal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(ctx.users.len().await, 1);

    let (status, _) = ctx.get("/api/user/nimal").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- weather --------------------------------------------------------------

#[tokio::test]
async fn test_current_weather_shape() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .get("/api/currentWeather?country=Sri%20Lanka&city=Kandy")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "name": "Kandy",
            "country": "Sri Lanka",
            "localtime": "2024-02-12 14:05",
            "temperature": 28.4,
            "humidity": 66,
            "windSpeed": 9.4,
            "condition": "Partly cloudy"
        })
    );
    assert_eq!(ctx.weather.calls(), vec![("Kandy,Sri Lanka".to_string(), None)]);
}

#[tokio::test]
async fn test_future_weather_six_consecutive_days() {
    let ctx = TestContext::new();
    let before = Local::now().date_naive();

    let (status, body) = ctx.get("/api/futureWeather?city=Galle&country=Sri%20Lanka").await;

    let after = Local::now().date_naive();

    assert_eq!(status, StatusCode::OK);
    let days = body.as_array().unwrap();
    assert_eq!(days.len(), 6);

    // The handler reads the clock itself; midnight may fall between reads
    let first = ctx.weather.calls()[0].1.unwrap();
    let tomorrow = |today: chrono::NaiveDate| today.checked_add_days(Days::new(1)).unwrap();
    assert!(first == tomorrow(before) || first == tomorrow(after));

    for (offset, day) in days.iter().enumerate() {
        let expected = first.checked_add_days(Days::new(offset as u64)).unwrap();
        assert_eq!(day["date"], expected.format("%Y-%m-%d").to_string());
        assert_eq!(day["temperature"]["max"], 27.9);
        assert_eq!(day["humidity"], 74);
        assert_eq!(day["windSpeed"], 6.1);
        assert_eq!(day["condition"], "Patchy rain nearby");
    }
}

#[tokio::test]
async fn test_future_weather_fails_entirely_on_one_bad_day() {
    let ctx = TestContext::with_weather(StubWeather {
        fail_forecast_from_call: Some(4),
        ..Default::default()
    });

    let (status, body) = ctx.get("/api/futureWeather?city=Galle&country=Sri%20Lanka").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream_error");
    assert!(!body.is_array());
    assert_eq!(ctx.weather.calls().len(), 4);
}

#[tokio::test]
async fn test_upstream_failure_is_generic_500() {
    let ctx = TestContext::with_weather(StubWeather {
        fail_status: Some(401),
        ..Default::default()
    });

    let (status, body) = ctx.get("/api/currentWeather?city=Kandy&country=Sri%20Lanka").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch weather data");
    assert!(!body.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_weather_requires_city_and_country() {
    let ctx = TestContext::new();

    for uri in [
        "/api/currentWeather?city=Kandy",
        "/api/currentWeather?country=Sri%20Lanka",
        "/api/futureWeather",
        "/api/futureWeather?city=&country=Sri%20Lanka",
    ] {
        let (status, _) = ctx.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }

    assert!(ctx.weather.calls().is_empty());
}

// --- health and middleware ------------------------------------------------

#[tokio::test]
async fn test_health_reports_storage() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_responses_carry_security_and_cors_headers() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::Service as _;

    let ctx = TestContext::new();
    let response = ctx
        .app
        .clone()
        .call(
            Request::builder()
                .uri("/api/users")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let ctx = TestContext::new();
    let (status, _) = ctx.get("/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
