//! Shared wiring for service-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rollcall::adapter::store::MemoryStore;
use rollcall::port::AttendanceStore;
use rollcall::service::{
    AttendanceRecorder, EnrollmentService, SensorHandle, VerificationService,
};
use rollcall::testkit::{RecordingSyncTarget, ScriptedSensor};

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub sensor: ScriptedSensor,
    pub target: RecordingSyncTarget,
    pub recorder: Arc<AttendanceRecorder>,
    pub enrollment: Arc<EnrollmentService>,
    pub verification: Arc<VerificationService>,
}

pub fn harness(sensor: ScriptedSensor) -> Harness {
    harness_with_ttl(sensor, Duration::from_secs(60))
}

pub fn harness_with_ttl(sensor: ScriptedSensor, session_ttl: Duration) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let store_dyn: Arc<dyn AttendanceStore> = store.clone();
    let handle = Arc::new(SensorHandle::new(Box::new(sensor.clone())));
    let target = RecordingSyncTarget::new();

    let recorder = Arc::new(AttendanceRecorder::new(
        store_dyn.clone(),
        Arc::new(target.clone()),
    ));
    let enrollment = Arc::new(EnrollmentService::new(
        store_dyn.clone(),
        handle.clone(),
        session_ttl,
    ));
    let verification = Arc::new(VerificationService::new(
        store_dyn,
        handle,
        recorder.clone(),
    ));

    Harness {
        store,
        sensor,
        target,
        recorder,
        enrollment,
        verification,
    }
}
