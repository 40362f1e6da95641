//! OpenWeatherGateway against a mock HTTP server.

use vane_core::{WeatherError, WeatherGateway, provider::openweather::OpenWeatherGateway};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn london_body() -> serde_json::Value {
    serde_json::json!({
        "name": "London",
        "dt": 1_700_000_000,
        "main": {
            "temp": 17.8,
            "feels_like": 16.2,
            "temp_min": 15.0,
            "temp_max": 19.0,
            "humidity": 72
        },
        "weather": [ { "description": "light rain" } ]
    })
}

#[tokio::test]
async fn test_fetch_current_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = OpenWeatherGateway::with_base_url(mock_server.uri(), "KEY".into());
    let snapshot = gateway.fetch_current("London").await.unwrap();

    assert_eq!(snapshot.temperature_c, 17);
    assert_eq!(snapshot.feels_like_c, 16);
    assert_eq!(snapshot.temp_min_c, 15);
    assert_eq!(snapshot.temp_max_c, 19);
    assert_eq!(snapshot.humidity_pct, 72);
    assert_eq!(snapshot.description, "Light Rain");
    assert_eq!(snapshot.observed_at.timestamp(), 1_700_000_000);
}

#[tokio::test]
async fn test_fetch_current_truncates_negative_toward_zero() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {
                "temp": -0.9,
                "feels_like": -4.6,
                "temp_min": -1.2,
                "temp_max": 19.9,
                "humidity": 90
            },
            "weather": [ { "description": "mist" } ]
        })))
        .mount(&mock_server)
        .await;

    let gateway = OpenWeatherGateway::with_base_url(mock_server.uri(), "KEY".into());
    let snapshot = gateway.fetch_current("Reykjavik").await.unwrap();

    assert_eq!(snapshot.temperature_c, 0);
    assert_eq!(snapshot.feels_like_c, -4);
    assert_eq!(snapshot.temp_min_c, -1);
    assert_eq!(snapshot.temp_max_c, 19);
}

#[tokio::test]
async fn test_fetch_current_missing_weather_array_is_sunny() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Cairo",
            "main": {
                "temp": 33.1,
                "feels_like": 35.0,
                "temp_min": 31.0,
                "temp_max": 34.0,
                "humidity": 20
            }
        })))
        .mount(&mock_server)
        .await;

    let gateway = OpenWeatherGateway::with_base_url(mock_server.uri(), "KEY".into());
    let snapshot = gateway.fetch_current("Cairo").await.unwrap();

    assert_eq!(snapshot.description, "Sunny");
}

#[tokio::test]
async fn test_fetch_current_sends_city_with_spaces() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "New York"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = OpenWeatherGateway::with_base_url(mock_server.uri(), "KEY".into());
    assert!(gateway.fetch_current("New York").await.is_ok());
}

#[tokio::test]
async fn test_fetch_current_error_status_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let gateway = OpenWeatherGateway::with_base_url(mock_server.uri(), "KEY".into());
    let err = gateway.fetch_current("Atlantis").await.unwrap_err();

    match err {
        WeatherError::Transport(msg) => assert!(msg.contains("city not found")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_current_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let gateway = OpenWeatherGateway::with_base_url(mock_server.uri(), "KEY".into());
    let err = gateway.fetch_current("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::Decode(_)));
}
