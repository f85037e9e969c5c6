use crate::{
    index_handler, precipitation, routes, stations, temperature_from, temperature_range, tobs,
    ClimateData, Database, PrecipitationReading, StationRecord, TemperatureRangeSummary,
    TemperatureReading, TemperatureSummary,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate_db: Arc<dyn ClimateData>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::climate_routes::precipitation,
        routes::climate::climate_routes::stations,
        routes::climate::climate_routes::tobs,
        routes::climate::climate_routes::temperature_from,
        routes::climate::climate_routes::temperature_range,
    ),
    components(
        schemas(
            PrecipitationReading,
            StationRecord,
            TemperatureReading,
            TemperatureSummary,
            TemperatureRangeSummary
        )
    ),
    tags(
        (name = "hawaii climate api", description = "a read-only RESTful api over the Hawaii daily weather observation dataset")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    remote_url: String,
    database_path: String,
) -> Result<AppState, anyhow::Error> {
    let database = Database::new(&database_path)
        .await
        .map_err(|e| anyhow!("error opening climate dataset: {}", e))?;

    Ok(AppState {
        remote_url,
        climate_db: Arc::new(database),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    // Static segments register beside the {start} capture; the router
    // prefers the static match at the same level
    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}", get(temperature_from))
        .route("/api/v1.0/{start}/{end}", get(temperature_range))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
