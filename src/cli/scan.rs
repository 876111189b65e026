//! Handler for the `scan` command.

use crate::app::App;
use crate::cli::{output, ScanArgs};
use crate::domain::CourseId;
use crate::error::{Error, Result};

/// Execute the scan command: one live verification, with each outcome
/// rendered as its own message.
pub async fn execute(app: &App, args: &ScanArgs) -> Result<()> {
    let course_id = args.course.map(CourseId);

    output::note("Place a finger on the sensor...");

    match app.verification.verify_and_record(course_id).await {
        Ok(outcome) => {
            let confidence = outcome
                .confidence
                .map_or(String::new(), |c| format!(" (confidence {c}%)"));
            output::ok(&format!(
                "Matched {}{confidence}",
                outcome.student.full_name()
            ));
            output::ok(&format!(
                "Attendance recorded: {} at {}",
                outcome.record.status,
                outcome.record.timestamp.format("%Y-%m-%d %H:%M:%S")
            ));
            Ok(())
        }
        Err(Error::NoMatch(message)) => {
            output::warn(&format!("No match: {message}"));
            Ok(())
        }
        Err(Error::UnenrolledTemplate { template_id }) => {
            output::warn(&format!(
                "The device matched template {template_id}, but no student owns it. \
                 Re-enroll or clear the device memory."
            ));
            Ok(())
        }
        Err(e) => Err(e),
    }
}
