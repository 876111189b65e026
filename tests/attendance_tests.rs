//! Recording, ingestion, sync, and statistics tests.

mod support;

use std::sync::Arc;

use rollcall::adapter::store::MemoryStore;
use rollcall::domain::{AttendanceStatus, CourseId, StatsFilter, StudentId};
use rollcall::error::Error;
use rollcall::port::AttendanceStore;
use rollcall::service::AttendanceRecorder;
use rollcall::testkit::{FailingSyncTarget, ScriptedSensor};
use support::harness;

#[tokio::test]
async fn record_validates_student_and_course() {
    let h = harness(ScriptedSensor::connected());
    let student = h.store.add_student("S00001", "John", "Doe");

    let err = h
        .recorder
        .record(StudentId(99), CourseId(1), AttendanceStatus::Present, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "student", .. }));

    let err = h
        .recorder
        .record(student.id, CourseId(99), AttendanceStatus::Present, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "course", .. }));
}

#[tokio::test]
async fn external_ingestion_normalizes_and_presyncs() {
    let h = harness(ScriptedSensor::connected());
    let student = h.store.add_student("S00001", "John", "Doe");
    let course = h.store.add_course("CS101", "Introduction to Computer Science");
    h.store.enroll(student.id, course.id);

    let record = h
        .recorder
        .record_external("S00001", course.id, "LATE", Some("2026-08-20T09:05:00+00:00"))
        .await
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Late);
    assert!(record.synced);
    assert_eq!(record.timestamp.to_rfc3339(), "2026-08-20T09:05:00+00:00");

    // Unknown status and broken timestamp both degrade gracefully.
    let record = h
        .recorder
        .record_external("S00001", course.id, "tardy", Some("yesterday-ish"))
        .await
        .unwrap();
    assert_eq!(record.status, AttendanceStatus::Present);

    let err = h
        .recorder
        .record_external("S99999", course.id, "present", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "student", .. }));
}

#[tokio::test]
async fn sync_pushes_external_ids_and_marks_records() {
    let h = harness(ScriptedSensor::connected());
    let student = h.store.add_student("S00001", "John", "Doe");
    let course = h.store.add_course("CS101", "Introduction to Computer Science");
    h.store.enroll(student.id, course.id);

    for status in [AttendanceStatus::Present, AttendanceStatus::Late] {
        h.recorder
            .record(student.id, course.id, status, None, false)
            .await
            .unwrap();
    }

    let report = h.recorder.sync().await.unwrap();
    assert_eq!(report.synced, 2);
    assert!(h.recorder.last_sync_time().is_some());

    let batches = h.target.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
    assert!(batches[0].iter().all(|e| e.student_id == "S00001"));

    // Nothing left on a second pass.
    assert_eq!(h.recorder.sync().await.unwrap().synced, 0);
    assert_eq!(h.target.batches().len(), 1);
}

#[tokio::test]
async fn rejected_batch_leaves_everything_unsynced() {
    let store = Arc::new(MemoryStore::new());
    let recorder = AttendanceRecorder::new(store.clone(), Arc::new(FailingSyncTarget));
    let student = store.add_student("S00001", "John", "Doe");
    let course = store.add_course("CS101", "Introduction to Computer Science");

    recorder
        .record(student.id, course.id, AttendanceStatus::Present, None, false)
        .await
        .unwrap();

    let err = recorder.sync().await.unwrap_err();
    assert!(matches!(err, Error::SyncFailed(_)));
    assert_eq!(store.unsynced_attendance().await.unwrap().len(), 1);
    assert!(recorder.last_sync_time().is_none());
}

#[tokio::test]
async fn statistics_aggregate_with_filters() {
    let h = harness(ScriptedSensor::connected());
    let student = h.store.add_student("S00001", "John", "Doe");
    let cs = h.store.add_course("CS101", "Introduction to Computer Science");
    let math = h.store.add_course("MATH201", "Calculus II");

    for (course, status) in [
        (cs.id, AttendanceStatus::Present),
        (cs.id, AttendanceStatus::Present),
        (cs.id, AttendanceStatus::Late),
        (math.id, AttendanceStatus::Absent),
    ] {
        h.recorder.record(student.id, course, status, None, false).await.unwrap();
    }

    let all = h.recorder.statistics(&StatsFilter::default()).await.unwrap();
    assert_eq!(all.total_records, 4);
    assert_eq!(all.counts.present, 2);
    assert_eq!(all.percentages.present, 50.0);

    let cs_only = h
        .recorder
        .statistics(&StatsFilter {
            course_id: Some(cs.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cs_only.total_records, 3);
    assert_eq!(cs_only.percentages.present, 66.67);
    assert_eq!(cs_only.percentages.late, 33.33);

    let recent = h
        .recorder
        .recent(&StatsFilter::default(), 2)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
}
