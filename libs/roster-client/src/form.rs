use roster_api::record::NewStudent;

/// The add-student form as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub branch: String,
    pub marks: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Marks must be a whole number")]
    MarksNotInteger,
}

impl StudentForm {
    /// Check the form locally and build the create request from it.
    pub fn to_new_student(&self) -> Result<NewStudent, FormError> {
        let fields = [&self.name, &self.email, &self.branch, &self.marks];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(FormError::MissingFields);
        }
        let marks = self
            .marks
            .trim()
            .parse::<i64>()
            .map_err(|_| FormError::MarksNotInteger)?;
        Ok(NewStudent {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            branch: self.branch.trim().to_string(),
            marks,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
