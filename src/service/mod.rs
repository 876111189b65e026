//! Application services orchestrating the ports.

pub mod attendance;
pub mod enrollment;
pub mod handle;
pub mod verification;

pub use attendance::{AttendanceRecorder, SyncReport};
pub use enrollment::EnrollmentService;
pub use handle::SensorHandle;
pub use verification::{VerificationService, VerifyOutcome};
