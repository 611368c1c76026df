use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque document identifier, assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id taken from a request path.
    ///
    /// Returns `None` for anything that is not a well-formed id; callers treat
    /// that the same as an unknown id.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub branch: String,
    pub marks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a new record. Id and timestamps are the store's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub branch: String,
    pub marks: i64,
}

impl NewStudent {
    pub fn into_student(self, id: RecordId, now: DateTime<Utc>) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            branch: self.branch,
            marks: self.marks,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub branch: Option<String>,
    pub marks: Option<i64>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.branch.is_none() && self.marks.is_none()
    }

    /// Merge into `student`, refreshing `updated_at`.
    pub fn apply(self, student: &mut Student, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
        if let Some(branch) = self.branch {
            student.branch = branch;
        }
        if let Some(marks) = self.marks {
            student.marks = marks;
        }
        student.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_serializes_with_camel_case_timestamps() {
        let now = Utc::now();
        let student = NewStudent {
            name: "A".into(),
            email: "a@x.com".into(),
            branch: "CS".into(),
            marks: 85,
        }
        .into_student(RecordId::generate(), now);

        let json = serde_json::to_value(&student).unwrap();
        for key in ["id", "name", "email", "branch", "marks", "createdAt", "updatedAt"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["marks"], 85);
        assert_eq!(json["id"], student.id.to_string());
    }

    #[test]
    fn malformed_ids_do_not_parse() {
        assert!(RecordId::parse("not-an-id").is_none());
        assert!(RecordId::parse("").is_none());
        let id = RecordId::generate();
        assert_eq!(RecordId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn patch_keeps_omitted_fields() {
        let created = Utc::now();
        let mut student = NewStudent {
            name: "A".into(),
            email: "a@x.com".into(),
            branch: "CS".into(),
            marks: 85,
        }
        .into_student(RecordId::generate(), created);

        let later = created + chrono::Duration::seconds(5);
        StudentPatch { name: Some("A2".into()), ..Default::default() }.apply(&mut student, later);

        assert_eq!(student.name, "A2");
        assert_eq!(student.email, "a@x.com");
        assert_eq!(student.marks, 85);
        assert_eq!(student.created_at, created);
        assert_eq!(student.updated_at, later);
    }
}
