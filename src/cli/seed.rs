//! Handler for the `seed` command.

use crate::app::App;
use crate::cli::output;
use crate::error::Result;

const STUDENTS: &[(&str, &str, &str)] = &[
    ("S00001", "John", "Doe"),
    ("S00002", "Jane", "Smith"),
    ("S00003", "Alice", "Johnson"),
    ("S00004", "Bob", "Williams"),
    ("S00005", "Carol", "Brown"),
];

const COURSES: &[(&str, &str)] = &[
    ("CS101", "Introduction to Computer Science"),
    ("MATH201", "Calculus II"),
    ("PHYS101", "Physics I"),
];

/// Execute the seed command. Skips anything already present, so it is safe
/// to run more than once.
pub async fn execute(app: &App) -> Result<()> {
    let mut students = Vec::new();
    for (external_id, first, last) in STUDENTS {
        let student = match app.store.student_by_external_id(external_id).await? {
            Some(existing) => existing,
            None => {
                let email = format!("{}@campus.example.edu", external_id.to_lowercase());
                app.sqlite.insert_student(external_id, first, last, Some(&email))?
            }
        };
        students.push(student);
    }

    let mut courses = Vec::new();
    for (code, title) in COURSES {
        let course = match app.sqlite.course_by_code(code)? {
            Some(existing) => existing,
            None => app.sqlite.insert_course(code, title, None)?,
        };
        courses.push(course);
    }

    // Everyone takes the first course, the first three take the second.
    if let Some(course) = courses.first() {
        for student in &students {
            app.sqlite.enroll_student(student.id, course.id)?;
        }
    }
    if let Some(course) = courses.get(1) {
        for student in students.iter().take(3) {
            app.sqlite.enroll_student(student.id, course.id)?;
        }
    }

    output::ok(&format!(
        "Seeded {} students and {} courses.",
        students.len(),
        courses.len()
    ));
    Ok(())
}
