use async_trait::async_trait;
use axum::Router;
use climate_api::{
    app, AppState, ClimateData, Error, PrecipitationReading, StationRecord, TemperatureReading,
    TemperatureStats,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub ClimateAccess {}

    #[async_trait]
    impl ClimateData for ClimateAccess {
        async fn precipitation(&self) -> Result<Vec<PrecipitationReading>, Error>;
        async fn stations(&self) -> Result<Vec<StationRecord>, Error>;
        async fn most_active_station(&self) -> Result<Option<String>, Error>;
        async fn temperature_observations(
            &self,
            station: String,
        ) -> Result<Vec<TemperatureReading>, Error>;
        async fn temperature_stats(
            &self,
            start: String,
            end: Option<String>,
        ) -> Result<TemperatureStats, Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let app_state = AppState {
        remote_url: String::from("http://127.0.0.1:5000"),
        climate_db,
    };

    TestApp {
        app: app(app_state),
    }
}
