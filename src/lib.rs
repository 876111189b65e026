//! Rollcall: fingerprint-backed attendance for campus lab stations.
//!
//! A station owns one fingerprint capture device and a local SQLite
//! database. Operators enroll student fingerprints through a polled
//! two-sample capture session, verify fingers against the device's
//! template memory to record attendance, and periodically hand the
//! records off to the campus aggregator.
//!
//! The crate is laid out hexagonally:
//!
//! - [`domain`] - plain values: students, templates, attendance, the
//!   enrollment stage machine.
//! - [`port`] - traits the core depends on: [`port::SensorLink`],
//!   [`port::AttendanceStore`], [`port::SyncTarget`].
//! - [`adapter`] - serial and HTTP sensor transports, the Diesel SQLite
//!   store, the HTTP sync target.
//! - [`service`] - enrollment sessions, verification, recording and sync.
//! - [`cli`] - the operator-facing commands.

pub mod adapter;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::{Error, Result};
