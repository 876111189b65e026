//! Student, course, and biometric template values.

use chrono::{DateTime, Utc};

use super::ids::{CourseId, FingerSlot, StudentId, TemplateId};

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    /// Campus-issued id string, unique alongside the database id.
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A course students enroll in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored fingerprint template. At most one exists per
/// `(student, finger_slot)`; the sensor-assigned template id is unique
/// across all students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricTemplate {
    pub id: i32,
    pub student_id: StudentId,
    pub finger_slot: FingerSlot,
    pub sensor_template_id: TemplateId,
    pub template_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// A template about to be persisted (upsert on `(student, finger_slot)`).
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub student_id: StudentId,
    pub finger_slot: FingerSlot,
    pub sensor_template_id: TemplateId,
    pub template_data: Vec<u8>,
}
