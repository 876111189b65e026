//! Handler for the `enroll` command.

use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, Confirm};
use tokio::signal;
use uuid::Uuid;

use crate::app::App;
use crate::cli::{output, EnrollArgs};
use crate::domain::{EnrollmentUpdate, FingerSlot, OperatorId, StudentId};
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Execute the enroll command: start a capture session and poll it to
/// completion, rendering device progress as a bar.
pub async fn execute(app: &App, args: &EnrollArgs) -> Result<()> {
    let student_id = StudentId(args.student);
    let student = app
        .store
        .student(student_id)
        .await?
        .ok_or_else(|| Error::not_found("student", student_id))?;

    let slot = FingerSlot::new(args.finger).ok_or_else(|| {
        Error::InvalidRequest(format!(
            "finger slot must be 0-{}, got {}",
            FingerSlot::MAX,
            args.finger
        ))
    })?;

    let occupied = app.store.template_for_slot(student_id, slot).await?.is_some();
    let overwrite = if occupied && !args.overwrite {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Finger {slot} of {} is already enrolled. Replace it?",
                student.full_name()
            ))
            .default(false)
            .interact()?
    } else {
        args.overwrite
    };
    if occupied && !overwrite {
        output::note("Keeping the existing template.");
        return Ok(());
    }

    let operator = OperatorId::new(Uuid::new_v4().to_string());
    app.enrollment
        .start(operator.clone(), student_id, args.finger, overwrite)
        .await?;

    output::section(&format!("Enrolling {} (finger {slot})", student.full_name()));

    let bar = output::capture_bar();
    bar.set_message("starting capture");

    loop {
        let update = tokio::select! {
            update = app.enrollment.poll(&operator) => update?,
            _ = signal::ctrl_c() => {
                bar.abandon_with_message("cancelled");
                app.enrollment.cancel(&operator).await?;
                output::warn("Enrollment cancelled.");
                return Ok(());
            }
        };

        match update {
            EnrollmentUpdate::Inactive => {
                bar.finish_and_clear();
                output::warn("No enrollment session is active.");
                return Ok(());
            }
            EnrollmentUpdate::InProgress {
                stage,
                progress,
                message,
            } => {
                bar.set_position(u64::from(progress));
                bar.set_message(if message.is_empty() {
                    stage.to_string()
                } else {
                    message
                });
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            EnrollmentUpdate::Complete { message, .. } => {
                bar.finish_and_clear();
                output::ok(&format!(
                    "Enrolled {} on finger {slot}.",
                    student.full_name()
                ));
                if !message.is_empty() {
                    output::note(&message);
                }
                return Ok(());
            }
            EnrollmentUpdate::Failed { message } => {
                bar.abandon_with_message("failed");
                return Err(Error::SensorUnavailable(message));
            }
        }
    }
}
