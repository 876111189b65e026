//! Test doubles for exercising the services without hardware or a network.
//!
//! Enabled for this crate's own tests and for downstream tests via the
//! `testkit` feature.

pub mod sensor;
pub mod store;
pub mod sync;

pub use sensor::ScriptedSensor;
pub use store::FailingWriteStore;
pub use sync::{FailingSyncTarget, RecordingSyncTarget};
