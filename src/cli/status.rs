//! Handler for the `status` command.

use crate::app::App;
use crate::cli::output;
use crate::domain::StatsFilter;
use crate::error::Result;

/// Execute the status command: sensor health plus a database summary.
pub async fn execute(app: &App) -> Result<()> {
    output::section(&format!("rollcall v{}", env!("CARGO_PKG_VERSION")));

    let transport = app.sensor.transport_name().await;
    output::key_value("Transport", transport);

    if app.sensor.initialize().await {
        let health = app.sensor.status().await;
        if health.is_ready() {
            output::ok(&format!("Sensor ready: {}", health.message));
        } else {
            output::warn(&format!("Sensor: {}", health.message));
        }
    } else {
        output::error("Sensor unreachable.");
    }

    let counts = app.store.status_counts(&StatsFilter::default()).await?;
    let pending = app.store.unsynced_attendance().await?.len();

    output::section("Database");
    output::key_value("Records", counts.total());
    output::key_value("Unsynced", pending);
    match app.recorder.last_sync_time() {
        Some(when) => output::key_value("Last sync", when.format("%Y-%m-%d %H:%M:%S")),
        None => output::key_value("Last sync", "never"),
    }

    Ok(())
}
