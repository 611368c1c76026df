//! Request payload schema for student writes.
//!
//! Bodies arrive as arbitrary JSON. They are checked here, field by field,
//! before anything reaches a store. Every offending field is reported, not
//! just the first one.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{NewStudent, StudentPatch};

/// Accepted marks when range enforcement is on.
pub const MARKS_RANGE: RangeInclusive<i64> = 0..=100;

/// Tunable validation behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub enforce_marks_range: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self { enforce_marks_range: true }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self { field: field.to_string(), message: message.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body was valid JSON but not an object.
    NotAnObject,
    /// An update carried none of the known fields.
    NoFields,
    Fields {
        errors: Vec<FieldError>,
        any_missing: bool,
    },
}

impl ValidationError {
    /// Client-facing summary.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::NotAnObject => "Request body must be a JSON object",
            ValidationError::NoFields => "At least one field is required",
            ValidationError::Fields { any_missing: true, .. } => "All fields are required",
            ValidationError::Fields { any_missing: false, .. } => "Invalid student data",
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;
        for (i, e) in self.field_errors().iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{} {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Raw, untyped student fields as they arrive on the wire.
///
/// `null` deserializes to `None` and is treated exactly like an absent key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPayload {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub branch: Option<Value>,
    #[serde(default)]
    pub marks: Option<Value>,
}

enum Problem {
    /// Absent in spirit: an empty or blank string.
    Blank,
    Invalid(&'static str),
}

impl StudentPayload {
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::NotAnObject);
        }
        serde_json::from_value(value).map_err(|_| ValidationError::NotAnObject)
    }

    /// Validate for insertion: all four fields required.
    pub fn into_new_student(self, rules: &ValidationRules) -> Result<NewStudent, ValidationError> {
        let mut errors = Vec::new();
        let mut any_missing = false;

        let name = required("name", read_text(self.name.as_ref()), &mut errors, &mut any_missing);
        let email = required("email", read_text(self.email.as_ref()), &mut errors, &mut any_missing);
        let branch = required("branch", read_text(self.branch.as_ref()), &mut errors, &mut any_missing);
        let marks = required("marks", read_marks(self.marks.as_ref(), rules), &mut errors, &mut any_missing);

        match (name, email, branch, marks) {
            (Some(name), Some(email), Some(branch), Some(marks)) => Ok(NewStudent {
                name,
                email,
                branch,
                marks,
            }),
            _ => Err(ValidationError::Fields { errors, any_missing }),
        }
    }

    /// Validate for a merge update: every field optional, at least one present.
    pub fn into_patch(self, rules: &ValidationRules) -> Result<StudentPatch, ValidationError> {
        let mut errors = Vec::new();

        let patch = StudentPatch {
            name: optional("name", read_text(self.name.as_ref()), &mut errors),
            email: optional("email", read_text(self.email.as_ref()), &mut errors),
            branch: optional("branch", read_text(self.branch.as_ref()), &mut errors),
            marks: optional("marks", read_marks(self.marks.as_ref(), rules), &mut errors),
        };

        if !errors.is_empty() {
            return Err(ValidationError::Fields { errors, any_missing: false });
        }
        if patch.is_empty() {
            return Err(ValidationError::NoFields);
        }
        Ok(patch)
    }
}

fn required<T>(
    field: &str,
    parsed: Result<Option<T>, Problem>,
    errors: &mut Vec<FieldError>,
    any_missing: &mut bool,
) -> Option<T> {
    match parsed {
        Ok(Some(v)) => Some(v),
        Ok(None) | Err(Problem::Blank) => {
            *any_missing = true;
            errors.push(FieldError::new(field, "is required"));
            None
        }
        Err(Problem::Invalid(msg)) => {
            errors.push(FieldError::new(field, msg));
            None
        }
    }
}

fn optional<T>(field: &str, parsed: Result<Option<T>, Problem>, errors: &mut Vec<FieldError>) -> Option<T> {
    match parsed {
        Ok(v) => v,
        Err(Problem::Blank) => {
            errors.push(FieldError::new(field, "must not be empty"));
            None
        }
        Err(Problem::Invalid(msg)) => {
            errors.push(FieldError::new(field, msg));
            None
        }
    }
}

fn read_text(value: Option<&Value>) -> Result<Option<String>, Problem> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(Problem::Blank)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(_) => Err(Problem::Invalid("must be a string")),
    }
}

fn read_marks(value: Option<&Value>, rules: &ValidationRules) -> Result<Option<i64>, Problem> {
    const NOT_INTEGER: Problem = Problem::Invalid("must be an integer");

    let marks = match value {
        None => return Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    f as i64
                }
                _ => return Err(NOT_INTEGER),
            },
        },
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(Problem::Blank);
            }
            trimmed.parse::<i64>().map_err(|_| NOT_INTEGER)?
        }
        Some(_) => return Err(NOT_INTEGER),
    };

    if rules.enforce_marks_range && !MARKS_RANGE.contains(&marks) {
        return Err(Problem::Invalid("must be between 0 and 100"));
    }
    Ok(Some(marks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> StudentPayload {
        StudentPayload::from_value(v).unwrap()
    }

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    #[test]
    fn string_marks_are_coerced() {
        let s = payload(json!({"name": "A", "email": "a@x.com", "branch": "CS", "marks": "85"}))
            .into_new_student(&rules())
            .unwrap();
        assert_eq!(s.marks, 85);
        assert_eq!(s.name, "A");
    }

    #[test]
    fn whole_float_marks_are_accepted() {
        let s = payload(json!({"name": "A", "email": "a@x.com", "branch": "CS", "marks": 70.0}))
            .into_new_student(&rules())
            .unwrap();
        assert_eq!(s.marks, 70);
    }

    #[test]
    fn text_is_trimmed() {
        let s = payload(json!({"name": "  Ann ", "email": "a@x.com\n", "branch": "CS", "marks": 1}))
            .into_new_student(&rules())
            .unwrap();
        assert_eq!(s.name, "Ann");
        assert_eq!(s.email, "a@x.com");
    }

    #[test]
    fn every_missing_field_is_listed() {
        let err = payload(json!({"name": "", "branch": null}))
            .into_new_student(&rules())
            .unwrap_err();
        assert_eq!(err.message(), "All fields are required");
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "email", "branch", "marks"]);
    }

    #[test]
    fn zero_marks_count_as_present() {
        let s = payload(json!({"name": "A", "email": "a@x.com", "branch": "CS", "marks": 0}))
            .into_new_student(&rules())
            .unwrap();
        assert_eq!(s.marks, 0);
    }

    #[test]
    fn wrong_types_are_reported_per_field() {
        let err = payload(json!({"name": 5, "email": "a@x.com", "branch": "CS", "marks": "eighty"}))
            .into_new_student(&rules())
            .unwrap_err();
        assert_eq!(err.message(), "Invalid student data");
        assert_eq!(
            err.field_errors(),
            [
                FieldError::new("name", "must be a string"),
                FieldError::new("marks", "must be an integer"),
            ]
        );
    }

    #[test]
    fn fractional_marks_are_rejected() {
        let err = payload(json!({"name": "A", "email": "a@x.com", "branch": "CS", "marks": 85.5}))
            .into_new_student(&rules())
            .unwrap_err();
        assert_eq!(err.field_errors()[0].message, "must be an integer");
    }

    #[test]
    fn marks_range_is_configurable() {
        let body = json!({"name": "A", "email": "a@x.com", "branch": "CS", "marks": 150});
        let err = payload(body.clone()).into_new_student(&rules()).unwrap_err();
        assert_eq!(err.field_errors()[0].message, "must be between 0 and 100");

        let relaxed = ValidationRules { enforce_marks_range: false };
        assert_eq!(payload(body).into_new_student(&relaxed).unwrap().marks, 150);
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(
            StudentPayload::from_value(json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn patch_keeps_only_supplied_fields() {
        let patch = payload(json!({"name": "A2", "marks": null}))
            .into_patch(&rules())
            .unwrap();
        assert_eq!(patch.name.as_deref(), Some("A2"));
        assert!(patch.email.is_none());
        assert!(patch.marks.is_none());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = payload(json!({"unknown": 1})).into_patch(&rules()).unwrap_err();
        assert_eq!(err, ValidationError::NoFields);
    }

    #[test]
    fn blank_patch_field_is_rejected() {
        let err = payload(json!({"email": "  "})).into_patch(&rules()).unwrap_err();
        assert_eq!(err.field_errors(), [FieldError::new("email", "must not be empty")]);
    }
}
