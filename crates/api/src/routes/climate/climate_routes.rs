use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{AppState, PrecipitationReading, StationRecord, TemperatureReading};

/// Temperature aggregates from a start date to the end of the dataset
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureSummary {
    pub start_date: String,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
}

/// Temperature aggregates over an inclusive date range
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureRangeSummary {
    pub start_date: String,
    pub end_date: String,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation readings for the last 12 months of the dataset, ordered by date", body = Vec<PrecipitationReading>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query measurements")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationReading>>, (StatusCode, String)> {
    let readings = state.climate_db.precipitation().await.map_err(|err| {
        error!("error querying precipitation: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query precipitation: {}", err),
        )
    })?;

    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "All weather stations in the dataset", body = Vec<StationRecord>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query stations")
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StationRecord>>, (StatusCode, String)> {
    let stations = state.climate_db.stations().await.map_err(|err| {
        error!("error querying stations: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to query stations: {}", err),
        )
    })?;

    Ok(Json(stations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations for the most active station over the last 12 months of the dataset", body = Vec<TemperatureReading>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query measurements")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureReading>>, (StatusCode, String)> {
    let most_active = state.climate_db.most_active_station().await.map_err(|err| {
        error!("error finding most active station: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to find most active station: {}", err),
        )
    })?;

    // An empty measurement table has no most active station and nothing
    // to report
    let Some(station) = most_active else {
        return Ok(Json(vec![]));
    };

    let readings = state
        .climate_db
        .temperature_observations(station)
        .await
        .map_err(|err| {
            error!("error querying temperature observations: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to query temperature observations: {}", err),
            )
        })?;

    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "Start date as YYYY-MM-DD; a value that is not a date matches no rows"),
    ),
    responses(
        (status = OK, description = "Min/max/avg temperature from the start date to the end of the dataset; fields are null when no row matches", body = TemperatureSummary),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query measurements")
    ))]
pub async fn temperature_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureSummary>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .temperature_stats(start.clone(), None)
        .await
        .map_err(|err| {
            error!("error querying temperature stats: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to query temperature stats: {}", err),
            )
        })?;

    Ok(Json(TemperatureSummary {
        start_date: start,
        min_temp: stats.min_temp,
        max_temp: stats.max_temp,
        avg_temp: stats.avg_temp,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "Start date as YYYY-MM-DD"),
        ("end" = String, Path, description = "End date as YYYY-MM-DD, inclusive"),
    ),
    responses(
        (status = OK, description = "Min/max/avg temperature over the inclusive date range; fields are null when no row matches", body = TemperatureRangeSummary),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query measurements")
    ))]
pub async fn temperature_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureRangeSummary>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .temperature_stats(start.clone(), Some(end.clone()))
        .await
        .map_err(|err| {
            error!("error querying temperature stats: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to query temperature stats: {}", err),
            )
        })?;

    Ok(Json(TemperatureRangeSummary {
        start_date: start,
        end_date: end,
        min_temp: stats.min_temp,
        max_temp: stats.max_temp,
        avg_temp: stats.avg_temp,
    }))
}
