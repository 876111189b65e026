//! Handler for the `sync` command.

use crate::app::App;
use crate::cli::output;
use crate::error::Result;

/// Execute the sync command: hand every unsynced record to the aggregator.
pub async fn execute(app: &App) -> Result<()> {
    let report = app.recorder.sync().await?;
    if report.synced == 0 {
        output::note("Nothing to sync.");
    } else {
        output::ok(&format!("Synced {} record(s).", report.synced));
    }
    Ok(())
}
