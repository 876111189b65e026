//! Trait seams between the core services and the outside world.

pub mod sensor;
pub mod store;
pub mod sync;

pub use sensor::SensorLink;
pub use store::AttendanceStore;
pub use sync::{SyncEntry, SyncTarget};
