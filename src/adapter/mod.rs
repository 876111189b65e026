//! Adapters binding the ports to concrete transports and stores.

pub mod sensor;
pub mod store;
pub mod sync;
