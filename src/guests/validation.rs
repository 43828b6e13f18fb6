//! Row-level validation errors for guest list uploads.
//!
//! Messages are written for the person who made the spreadsheet, so each one
//! names the line and says how to fix it.

use std::fmt;

/// A single problem found in an uploaded guest list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// 1-based line in the uploaded file, when the problem is tied to a row.
    pub line: Option<usize>,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: None,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn missing_column(column: &str) -> Self {
        Self::new(column, format!("CSV must have a \"{}\" column", column))
            .with_suggestion("Use the column headers: Name, Gift, Message (optional)")
    }

    pub fn empty_field(field: &str, line: usize) -> Self {
        Self::new(field, format!("{} is empty", field))
            .at_line(line)
            .with_suggestion(format!("Fill in {} or remove the row", field.to_lowercase()))
    }

    pub fn no_rows() -> Self {
        Self::new("file", "CSV file is empty or has no data rows")
            .with_suggestion("Add one guest per row below the header")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: [{}] {}", line, self.field, self.message)?,
            None => write!(f, "[{}] {}", self.field, self.message)?,
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problem(s) found in guest list", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line_and_suggestion() {
        let error = ValidationError::empty_field("Name", 4);
        assert_eq!(
            error.to_string(),
            "line 4: [Name] Name is empty. Fill in name or remove the row"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::missing_column("Gift"));
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.to_string().contains("\"Gift\" column"));
    }
}
