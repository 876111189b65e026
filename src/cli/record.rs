//! Handler for the `record` command.

use crate::app::App;
use crate::cli::{output, RecordArgs};
use crate::domain::{AttendanceStatus, CourseId, StudentId};
use crate::error::Result;

/// Execute the record command: a manual attendance entry without a scan.
pub async fn execute(app: &App, args: &RecordArgs) -> Result<()> {
    let status = AttendanceStatus::normalize(&args.status);
    let record = app
        .recorder
        .record(StudentId(args.student), CourseId(args.course), status, None, false)
        .await?;

    output::ok(&format!(
        "Recorded {} for student {} in course {} at {}",
        record.status,
        record.student_id,
        record.course_id,
        record.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    Ok(())
}
