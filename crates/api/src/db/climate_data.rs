use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use time::{
    macros::{date, format_description},
    Date, Duration,
};
use utoipa::ToSchema;

use crate::Database;

/// Final observation date present in the dataset.
///
/// The "last 12 months" windows anchor on this constant instead of the
/// wall clock so responses stay stable over the fixed historical data.
/// Moving this to a real "now" would change every windowed response.
pub const REFERENCE_END_DATE: Date = date!(2017 - 08 - 23);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Daily precipitation readings over the last 12 months of the dataset,
    /// ordered by date
    async fn precipitation(&self) -> Result<Vec<PrecipitationReading>, Error>;
    /// All known stations
    async fn stations(&self) -> Result<Vec<StationRecord>, Error>;
    /// Station with the most measurement rows, if any measurements exist
    async fn most_active_station(&self) -> Result<Option<String>, Error>;
    /// Temperature readings for one station over the last 12 months of the
    /// dataset
    async fn temperature_observations(
        &self,
        station: String,
    ) -> Result<Vec<TemperatureReading>, Error>;
    /// Min/max/avg temperature over `date >= start`, bounded above by `end`
    /// when given
    async fn temperature_stats(
        &self,
        start: String,
        end: Option<String>,
    ) -> Result<TemperatureStats, Error>;
}

/// First date inside the 12-month window ending at [`REFERENCE_END_DATE`],
/// as `YYYY-MM-DD` text
fn window_start() -> Result<String, Error> {
    let start = REFERENCE_END_DATE - Duration::days(365);
    Ok(start.format(format_description!("[year]-[month]-[day]"))?)
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct PrecipitationReading {
    /// Observation date as YYYY-MM-DD text
    pub date: String,
    /// Precipitation in inches; null where the station reported none
    pub precip: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StationRecord {
    pub station: String,
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureReading {
    /// Observation date as YYYY-MM-DD text
    pub date: String,
    /// Temperature observation in degrees Fahrenheit
    pub tobs: f64,
}

/// Aggregates over a filtered temperature row set; every field is null when
/// no row matched
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TemperatureStats {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
}

#[async_trait]
impl ClimateData for Database {
    async fn precipitation(&self) -> Result<Vec<PrecipitationReading>, Error> {
        let from = window_start()?;
        let rows = sqlx::query("SELECT date, prcp FROM measurement WHERE date >= ? ORDER BY date")
            .bind(&from)
            .fetch_all(self.pool())
            .await?;

        let readings = rows
            .iter()
            .map(|row| PrecipitationReading {
                date: row.get("date"),
                precip: row.get("prcp"),
            })
            .collect();

        Ok(readings)
    }

    async fn stations(&self) -> Result<Vec<StationRecord>, Error> {
        let rows = sqlx::query("SELECT station, id FROM station")
            .fetch_all(self.pool())
            .await?;

        let stations = rows
            .iter()
            .map(|row| StationRecord {
                station: row.get("station"),
                id: row.get("id"),
            })
            .collect();

        Ok(stations)
    }

    async fn most_active_station(&self) -> Result<Option<String>, Error> {
        // No secondary sort key: a tie resolves to whichever row the engine
        // returns first
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT station FROM measurement
             GROUP BY station
             ORDER BY COUNT(*) DESC
             LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|(station,)| station))
    }

    async fn temperature_observations(
        &self,
        station: String,
    ) -> Result<Vec<TemperatureReading>, Error> {
        let from = window_start()?;
        let rows =
            sqlx::query("SELECT date, tobs FROM measurement WHERE station = ? AND date >= ?")
                .bind(&station)
                .bind(&from)
                .fetch_all(self.pool())
                .await?;

        let readings = rows
            .iter()
            .map(|row| TemperatureReading {
                date: row.get("date"),
                tobs: row.get("tobs"),
            })
            .collect();

        Ok(readings)
    }

    async fn temperature_stats(
        &self,
        start: String,
        end: Option<String>,
    ) -> Result<TemperatureStats, Error> {
        // Dates are uniform YYYY-MM-DD text, so the TEXT comparison matches
        // calendar order. An unparseable start/end simply matches no rows
        // and the aggregates come back NULL.
        let (min_temp, max_temp, avg_temp): (Option<f64>, Option<f64>, Option<f64>) = match end {
            Some(end) => {
                sqlx::query_as(
                    "SELECT MIN(tobs), MAX(tobs), AVG(tobs) FROM measurement
                     WHERE date >= ? AND date <= ?",
                )
                .bind(&start)
                .bind(&end)
                .fetch_one(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT MIN(tobs), MAX(tobs), AVG(tobs) FROM measurement WHERE date >= ?",
                )
                .bind(&start)
                .fetch_one(self.pool())
                .await?
            }
        };

        Ok(TemperatureStats {
            min_temp,
            max_temp,
            avg_temp,
        })
    }
}
