//! Attendance record values and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CourseId, StudentId};

/// Attendance status. Unrecognized strings arriving through the external
/// ingestion path normalize to `Present` rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    /// Stable name used in storage and wire payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::Absent => "absent",
        }
    }

    /// Parse a status string, defaulting anything unrecognized to `Present`.
    #[must_use]
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "late" => Self::Late,
            "absent" => Self::Absent,
            _ => Self::Present,
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted attendance record. Immutable once written, except for the
/// `synced` flag flipped by a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: i32,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub synced: bool,
}

/// An attendance record about to be written.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub synced: bool,
}

/// Filter for statistics and listing queries.
#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub course_id: Option<CourseId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Raw per-status counts out of the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: i64,
    pub late: i64,
    pub absent: i64,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.present + self.late + self.absent
    }
}

/// Aggregated statistics with safe percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub total_records: i64,
    pub counts: StatusCountsOut,
    pub percentages: StatusPercentages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCountsOut {
    pub present: i64,
    pub late: i64,
    pub absent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusPercentages {
    pub present: f64,
    pub late: f64,
    pub absent: f64,
}

impl AttendanceStats {
    /// Compute percentages from raw counts, rounded to 2 decimals and
    /// pinned to 0 when there are no records.
    #[must_use]
    pub fn from_counts(counts: StatusCounts) -> Self {
        let total = counts.total();
        let pct = |count: i64| -> f64 {
            if total == 0 {
                0.0
            } else {
                round2(count as f64 / total as f64 * 100.0)
            }
        };

        Self {
            total_records: total,
            counts: StatusCountsOut {
                present: counts.present,
                late: counts.late,
                absent: counts.absent,
            },
            percentages: StatusPercentages {
                present: pct(counts.present),
                late: pct(counts.late),
                absent: pct(counts.absent),
            },
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_known_statuses() {
        assert_eq!(AttendanceStatus::normalize("late"), AttendanceStatus::Late);
        assert_eq!(AttendanceStatus::normalize("ABSENT"), AttendanceStatus::Absent);
        assert_eq!(AttendanceStatus::normalize(" present "), AttendanceStatus::Present);
    }

    #[test]
    fn normalize_defaults_unknown_to_present() {
        assert_eq!(AttendanceStatus::normalize("tardy"), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::normalize(""), AttendanceStatus::Present);
    }

    #[test]
    fn stats_percentages_zero_when_empty() {
        let stats = AttendanceStats::from_counts(StatusCounts::default());
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.percentages.present, 0.0);
        assert_eq!(stats.percentages.late, 0.0);
        assert_eq!(stats.percentages.absent, 0.0);
    }

    #[test]
    fn stats_percentages_round_to_two_decimals() {
        let stats = AttendanceStats::from_counts(StatusCounts {
            present: 2,
            late: 1,
            absent: 0,
        });
        assert_eq!(stats.percentages.present, 66.67);
        assert_eq!(stats.percentages.late, 33.33);
        assert_eq!(stats.percentages.absent, 0.0);
        let sum = stats.percentages.present + stats.percentages.late + stats.percentages.absent;
        assert!(sum <= 100.0);
    }
}
