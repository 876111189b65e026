//! Application wiring: configuration in, services out.

use std::sync::Arc;

use tracing::info;

use crate::adapter::sensor::build_sensor;
use crate::adapter::store::db::{create_pool, run_migrations};
use crate::adapter::store::SqliteStore;
use crate::adapter::sync::{HttpSyncTarget, LocalSyncTarget};
use crate::config::Config;
use crate::error::Result;
use crate::port::{AttendanceStore, SyncTarget};
use crate::service::{
    AttendanceRecorder, EnrollmentService, SensorHandle, VerificationService,
};

/// Fully wired application state shared by the CLI commands.
pub struct App {
    pub config: Config,
    /// Concrete store, kept alongside the trait object for the seed
    /// helpers.
    pub sqlite: Arc<SqliteStore>,
    pub store: Arc<dyn AttendanceStore>,
    pub sensor: Arc<SensorHandle>,
    pub recorder: Arc<AttendanceRecorder>,
    pub enrollment: Arc<EnrollmentService>,
    pub verification: Arc<VerificationService>,
}

impl App {
    /// Build the application from configuration: open the database, run
    /// migrations, pick the sensor transport, and wire the services.
    pub fn build(config: Config) -> Result<Self> {
        let pool = create_pool(&config.database.url)?;
        run_migrations(&pool)?;
        info!(database = %config.database.url, "database ready");

        let sqlite = Arc::new(SqliteStore::new(pool));
        let store: Arc<dyn AttendanceStore> = sqlite.clone();

        let sensor = Arc::new(SensorHandle::new(build_sensor(&config.sensor)?));

        let target: Arc<dyn SyncTarget> = match config.sync.endpoint.as_deref() {
            Some(endpoint) => Arc::new(HttpSyncTarget::new(endpoint)?),
            None => Arc::new(LocalSyncTarget),
        };

        let recorder = Arc::new(AttendanceRecorder::new(store.clone(), target));
        let enrollment = Arc::new(EnrollmentService::new(
            store.clone(),
            sensor.clone(),
            config.enrollment.session_ttl(),
        ));
        let verification = Arc::new(VerificationService::new(
            store.clone(),
            sensor.clone(),
            recorder.clone(),
        ));

        Ok(Self {
            config,
            sqlite,
            store,
            sensor,
            recorder,
            enrollment,
            verification,
        })
    }

    /// Release the sensor transport.
    pub async fn shutdown(&self) {
        self.sensor.shutdown().await;
    }
}
