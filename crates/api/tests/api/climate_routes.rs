use crate::helpers::{spawn_app, MockClimateAccess};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use climate_api::{Error, PrecipitationReading, StationRecord, TemperatureReading, TemperatureStats};
use hyper::{header, Method};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Test that the home page lists every route, including the parameterized
/// ones with escaped placeholders
#[tokio::test]
async fn root_lists_every_api_route() {
    let climate_db = MockClimateAccess::new();
    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();

    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/stations"));
    assert!(html.contains("/api/v1.0/tobs"));
    assert!(html.contains("/api/v1.0/&lt;start&gt;"));
    assert!(html.contains("/api/v1.0/&lt;start&gt;/&lt;end&gt;"));
    assert!(html.contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn precipitation_returns_dated_readings() {
    let mut climate_db = MockClimateAccess::new();

    climate_db.expect_precipitation().times(1).returning(|| {
        Ok(vec![
            PrecipitationReading {
                date: String::from("2016-08-23"),
                precip: None,
            },
            PrecipitationReading {
                date: String::from("2016-08-24"),
                precip: Some(0.08),
            },
        ])
    });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        payload,
        json!([
            { "date": "2016-08-23", "precip": null },
            { "date": "2016-08-24", "precip": 0.08 }
        ])
    );
}

/// Test that a failed query surfaces as a plain 500 rather than a panic
#[tokio::test]
async fn precipitation_surfaces_database_errors_as_500() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_precipitation()
        .times(1)
        .returning(|| Err(Error::Query(sqlx::Error::PoolTimedOut)));

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn stations_returns_station_and_id_pairs() {
    let mut climate_db = MockClimateAccess::new();

    climate_db.expect_stations().times(1).returning(|| {
        Ok(vec![
            StationRecord {
                station: String::from("USC00519397"),
                id: 1,
            },
            StationRecord {
                station: String::from("USC00519281"),
                id: 2,
            },
        ])
    });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/stations")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        payload,
        json!([
            { "station": "USC00519397", "id": 1 },
            { "station": "USC00519281", "id": 2 }
        ])
    );
}

/// Test that the tobs route looks up the most active station first and
/// then fetches readings for exactly that station
#[tokio::test]
async fn tobs_reports_the_most_active_station() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_most_active_station()
        .times(1)
        .returning(|| Ok(Some(String::from("USC00519281"))));

    climate_db
        .expect_temperature_observations()
        .withf(|station| station == "USC00519281")
        .times(1)
        .returning(|_| {
            Ok(vec![TemperatureReading {
                date: String::from("2017-08-22"),
                tobs: 79.0,
            }])
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/tobs")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(payload, json!([{ "date": "2017-08-22", "tobs": 79.0 }]));
}

/// Test that an empty measurement table yields an empty list instead of an
/// error, and skips the per-station query entirely
#[tokio::test]
async fn tobs_returns_empty_list_when_no_measurements() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_most_active_station()
        .times(1)
        .returning(|| Ok(None));

    climate_db.expect_temperature_observations().never();

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/tobs")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(payload, json!([]));
}

#[tokio::test]
async fn temperature_summary_echoes_start_date() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .withf(|start, end| start == "2017-01-01" && end.is_none())
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min_temp: Some(58.0),
                max_temp: Some(87.0),
                avg_temp: Some(74.1),
            })
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/2017-01-01")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        payload,
        json!({
            "start_date": "2017-01-01",
            "min_temp": 58.0,
            "max_temp": 87.0,
            "avg_temp": 74.1
        })
    );
}

#[tokio::test]
async fn temperature_range_summary_includes_both_bounds() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .withf(|start, end| start == "2017-01-01" && end.as_deref() == Some("2017-01-07"))
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min_temp: Some(60.0),
                max_temp: Some(78.0),
                avg_temp: Some(68.9),
            })
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/2017-01-01/2017-01-07")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        payload,
        json!({
            "start_date": "2017-01-01",
            "end_date": "2017-01-07",
            "min_temp": 60.0,
            "max_temp": 78.0,
            "avg_temp": 68.9
        })
    );
}

/// Test that an unmatched date range still returns well-formed JSON with
/// null aggregates, not an error
#[tokio::test]
async fn temperature_summary_with_no_matches_serializes_nulls() {
    let mut climate_db = MockClimateAccess::new();

    climate_db
        .expect_temperature_stats()
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                min_temp: None,
                max_temp: None,
                avg_temp: None,
            })
        });

    let test_app = spawn_app(Arc::new(climate_db)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/9999-99-99")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        payload,
        json!({
            "start_date": "9999-99-99",
            "min_temp": null,
            "max_temp": null,
            "avg_temp": null
        })
    );
}
