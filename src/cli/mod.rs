//! Command-line interface definitions.

pub mod enroll;
pub mod output;
pub mod record;
pub mod scan;
pub mod seed;
pub mod stats;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rollcall - fingerprint-backed attendance for the lab stations.
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enroll a student's fingerprint (interactive capture)
    Enroll(EnrollArgs),

    /// Scan a fingerprint and record attendance
    Scan(ScanArgs),

    /// Record attendance manually, without a scan
    Record(RecordArgs),

    /// Push unsynced attendance to the campus aggregator
    Sync,

    /// Show attendance statistics
    Stats(StatsArgs),

    /// Show sensor and database status
    Status,

    /// Load sample students and courses into the database
    Seed,
}

/// Arguments for the `enroll` subcommand.
#[derive(Parser, Debug)]
pub struct EnrollArgs {
    /// Database id of the student to enroll
    #[arg(long)]
    pub student: i32,

    /// Finger slot to enroll (0-9)
    #[arg(long, default_value_t = 0)]
    pub finger: u8,

    /// Replace an existing template without asking
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the `scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Course to record attendance against
    #[arg(long)]
    pub course: Option<i32>,
}

/// Arguments for the `record` subcommand.
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Database id of the student
    #[arg(long)]
    pub student: i32,

    /// Database id of the course
    #[arg(long)]
    pub course: i32,

    /// Attendance status (present, late, absent)
    #[arg(long, default_value = "present")]
    pub status: String,
}

/// Arguments for the `stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Restrict to one course
    #[arg(long)]
    pub course: Option<i32>,

    /// Only records on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Only records on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Also list the N most recent records
    #[arg(long, default_value_t = 10)]
    pub recent: i64,
}
