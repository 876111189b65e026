//! Handler for the `stats` command.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use tabled::{settings::Style, Table, Tabled};

use crate::app::App;
use crate::cli::{output, StatsArgs};
use crate::domain::{AttendanceRecord, CourseId, StatsFilter};
use crate::error::{Error, Result};

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Synced")]
    synced: &'static str,
}

/// Execute the stats command.
pub async fn execute(app: &App, args: &StatsArgs) -> Result<()> {
    let filter = StatsFilter {
        course_id: args.course.map(CourseId),
        start: args
            .from
            .as_deref()
            .map(parse_day)
            .transpose()?
            .map(day_start),
        end: args.to.as_deref().map(parse_day).transpose()?.map(day_end),
    };

    let stats = app.recorder.statistics(&filter).await?;

    output::section("Attendance");
    output::key_value("Total", stats.total_records);
    output::key_value(
        "Present",
        format!("{} ({:.2}%)", stats.counts.present, stats.percentages.present),
    );
    output::key_value(
        "Late",
        format!("{} ({:.2}%)", stats.counts.late, stats.percentages.late),
    );
    output::key_value(
        "Absent",
        format!("{} ({:.2}%)", stats.counts.absent, stats.percentages.absent),
    );

    if args.recent > 0 {
        let records = app.recorder.recent(&filter, args.recent).await?;
        if !records.is_empty() {
            output::section("Recent records");
            let mut rows = Vec::with_capacity(records.len());
            for record in &records {
                rows.push(to_row(app, record).await?);
            }
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{table}");
        }
    }

    Ok(())
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::InvalidRequest(format!("invalid date {raw:?}: {e}")))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn day_end(date: NaiveDate) -> DateTime<Utc> {
    // Inclusive upper bound: the last instant before the next day.
    (date + Days::new(1)).and_time(NaiveTime::MIN).and_utc() - Duration::seconds(1)
}

async fn to_row(app: &App, record: &AttendanceRecord) -> Result<RecentRow> {
    let student = app
        .store
        .student(record.student_id)
        .await?
        .map_or_else(|| record.student_id.to_string(), |s| s.external_id);
    let course = app
        .store
        .course(record.course_id)
        .await?
        .map_or_else(|| record.course_id.to_string(), |c| c.code);

    Ok(RecentRow {
        when: record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        student,
        course,
        status: record.status.to_string(),
        synced: if record.synced { "yes" } else { "no" },
    })
}
