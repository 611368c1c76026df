use serde::Serialize;

use roster_api::record::Student;

/// Summary figures over the loaded list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    /// Mean marks, rounded to one decimal.
    pub avg_marks: f64,
    pub highest_marks: i64,
}

impl Stats {
    pub fn from_students(students: &[Student]) -> Self {
        let Some(highest_marks) = students.iter().map(|s| s.marks).max() else {
            return Self { total: 0, avg_marks: 0.0, highest_marks: 0 };
        };
        let total = students.len();
        let sum: i64 = students.iter().map(|s| s.marks).sum();
        let mean = sum as f64 / total as f64;
        Self {
            total,
            avg_marks: (mean * 10.0).round() / 10.0,
            highest_marks,
        }
    }
}
