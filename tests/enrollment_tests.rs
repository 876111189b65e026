//! Enrollment session flow tests against a scripted sensor.

mod support;

use std::time::Duration;

use rollcall::domain::{EnrollStage, EnrollmentUpdate, OperatorId, StudentId, TemplateId};
use rollcall::error::Error;
use rollcall::port::AttendanceStore;
use rollcall::testkit::sensor::{poll_complete, poll_in_progress, poll_waiting, ScriptedSensor};
use support::harness;

fn operator(name: &str) -> OperatorId {
    OperatorId::new(name)
}

#[tokio::test]
async fn full_capture_flow_persists_the_template() {
    let sensor = ScriptedSensor::connected()
        .push_poll(poll_waiting(0, "place finger"))
        .push_poll(poll_in_progress(25, "capturing"))
        .push_poll(poll_waiting(50, "lift and place again"))
        .push_poll(poll_in_progress(75, "capturing"))
        .push_poll(poll_in_progress(95, "processing"))
        .push_poll(poll_complete(7, b"template-bytes"));
    let h = harness(sensor);
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    h.enrollment.start(op.clone(), student.id, 1, false).await.unwrap();

    let expected = [
        EnrollStage::AwaitingFirstSample,
        EnrollStage::CapturingFirst,
        EnrollStage::AwaitingSecondSample,
        EnrollStage::CapturingSecond,
        EnrollStage::Processing,
    ];
    for want in expected {
        match h.enrollment.poll(&op).await.unwrap() {
            EnrollmentUpdate::InProgress { stage, .. } => assert_eq!(stage, want),
            other => panic!("expected InProgress({want:?}), got {other:?}"),
        }
    }

    match h.enrollment.poll(&op).await.unwrap() {
        EnrollmentUpdate::Complete {
            student_id,
            finger_slot,
            ..
        } => {
            assert_eq!(student_id, student.id);
            assert_eq!(finger_slot.index(), 1);
        }
        other => panic!("expected Complete, got {other:?}"),
    }

    let stored = h
        .store
        .template_owner(TemplateId(7))
        .await
        .unwrap()
        .expect("template persisted");
    assert_eq!(stored.student_id, student.id);
    assert_eq!(stored.template_data, b"template-bytes");

    // Completion retired the session.
    assert!(matches!(
        h.enrollment.poll(&op).await.unwrap(),
        EnrollmentUpdate::Inactive
    ));
}

#[tokio::test]
async fn progress_and_stage_never_regress() {
    let sensor = ScriptedSensor::connected()
        .push_poll(poll_in_progress(75, "capturing"))
        .push_poll(poll_in_progress(25, "glitched reading"));
    let h = harness(sensor);
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    h.enrollment.start(op.clone(), student.id, 0, false).await.unwrap();

    match h.enrollment.poll(&op).await.unwrap() {
        EnrollmentUpdate::InProgress { stage, progress, .. } => {
            assert_eq!(stage, EnrollStage::CapturingSecond);
            assert_eq!(progress, 75);
        }
        other => panic!("unexpected {other:?}"),
    }

    // The device reports a lower reading; the session holds its ground.
    match h.enrollment.poll(&op).await.unwrap() {
        EnrollmentUpdate::InProgress { stage, progress, .. } => {
            assert_eq!(stage, EnrollStage::CapturingSecond);
            assert_eq!(progress, 75);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn start_rejects_unknown_student_and_bad_slot() {
    let h = harness(ScriptedSensor::connected());
    let op = operator("station-1");

    let err = h
        .enrollment
        .start(op.clone(), StudentId(99), 0, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "student", .. }));

    let student = h.store.add_student("S00001", "John", "Doe");
    let err = h
        .enrollment
        .start(op, student.id, 10, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn occupied_slot_requires_overwrite() {
    let sensor = ScriptedSensor::connected()
        .push_poll(poll_complete(3, b"first"))
        .push_poll(poll_complete(4, b"second"));
    let h = harness(sensor);
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    h.enrollment.start(op.clone(), student.id, 2, false).await.unwrap();
    h.enrollment.poll(&op).await.unwrap();

    let err = h
        .enrollment
        .start(op.clone(), student.id, 2, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));

    // With overwrite the slot re-enrolls and the old device id is gone.
    h.enrollment.start(op.clone(), student.id, 2, true).await.unwrap();
    h.enrollment.poll(&op).await.unwrap();
    assert!(h.store.template_owner(TemplateId(3)).await.unwrap().is_none());
    assert!(h.store.template_owner(TemplateId(4)).await.unwrap().is_some());
}

#[tokio::test]
async fn second_start_conflicts_while_a_session_is_live() {
    let h = harness(ScriptedSensor::connected());
    let a = h.store.add_student("S00001", "John", "Doe");
    let b = h.store.add_student("S00002", "Jane", "Smith");

    h.enrollment
        .start(operator("station-1"), a.id, 0, false)
        .await
        .unwrap();

    let err = h
        .enrollment
        .start(operator("station-2"), b.id, 0, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionConflict(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_starts_admit_exactly_one_session() {
    let h = harness(ScriptedSensor::connected());
    let a = h.store.add_student("S00001", "John", "Doe");
    let b = h.store.add_student("S00002", "Jane", "Smith");

    let (first, second) = tokio::join!(
        h.enrollment.start(operator("station-1"), a.id, 0, false),
        h.enrollment.start(operator("station-2"), b.id, 0, false),
    );

    let successes = usize::from(first.is_ok()) + usize::from(second.is_ok());
    assert_eq!(successes, 1);
    assert!(matches!(
        first.and(second).unwrap_err(),
        Error::SessionConflict(_)
    ));

    // One session holds the device, and the device saw exactly one start.
    assert_eq!(h.enrollment.active_sessions(), 1);
    assert_eq!(h.sensor.start_count(), 1);
}

#[tokio::test]
async fn refused_device_start_leaves_no_session() {
    let h = harness(ScriptedSensor::connected().refuse_start());
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    let err = h
        .enrollment
        .start(op.clone(), student.id, 0, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SensorUnavailable(_)));
    assert_eq!(h.enrollment.active_sessions(), 0);
}

#[tokio::test]
async fn device_error_fails_and_clears_the_session() {
    let sensor = ScriptedSensor::connected()
        .push_poll(rollcall::domain::EnrollmentPoll::transport_error("sensor fault"));
    let h = harness(sensor);
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    h.enrollment.start(op.clone(), student.id, 0, false).await.unwrap();

    assert!(matches!(
        h.enrollment.poll(&op).await.unwrap(),
        EnrollmentUpdate::Failed { .. }
    ));
    assert!(matches!(
        h.enrollment.poll(&op).await.unwrap(),
        EnrollmentUpdate::Inactive
    ));
}

#[tokio::test]
async fn cancel_aborts_the_device_and_session() {
    let h = harness(ScriptedSensor::connected());
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    h.enrollment.start(op.clone(), student.id, 0, false).await.unwrap();

    assert!(h.enrollment.cancel(&op).await.unwrap());
    assert_eq!(h.sensor.cancel_count(), 1);
    assert!(matches!(
        h.enrollment.poll(&op).await.unwrap(),
        EnrollmentUpdate::Inactive
    ));

    // Nothing left to cancel.
    assert!(!h.enrollment.cancel(&op).await.unwrap());
}

#[tokio::test]
async fn abandoned_sessions_expire_and_abort_the_device() {
    let h = support::harness_with_ttl(
        ScriptedSensor::connected(),
        Duration::from_millis(10),
    );
    let student = h.store.add_student("S00001", "John", "Doe");
    let op = operator("station-1");

    h.enrollment.start(op.clone(), student.id, 0, false).await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;

    assert!(matches!(
        h.enrollment.poll(&op).await.unwrap(),
        EnrollmentUpdate::Inactive
    ));
    assert_eq!(h.sensor.cancel_count(), 1);
}
