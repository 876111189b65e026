//! Transport- and storage-agnostic domain types.

pub mod attendance;
pub mod enrollment;
pub mod ids;
pub mod records;
pub mod sensor;

pub use attendance::{
    AttendanceRecord, AttendanceStats, AttendanceStatus, NewAttendance, StatsFilter, StatusCounts,
};
pub use enrollment::{EnrollStage, EnrollmentUpdate};
pub use ids::{CourseId, FingerSlot, OperatorId, StudentId, TemplateId};
pub use records::{BiometricTemplate, Course, NewTemplate, Student};
pub use sensor::{CompletedTemplate, EnrollmentPoll, PollPhase, SensorHealth, SensorState, VerifyReply};
