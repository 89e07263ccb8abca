use thiserror::Error;

/// Rejection of caller-supplied student fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("marks must be integers ({field} = {value:?})")]
    MarksNotInteger { field: &'static str, value: String },

    #[error("code must be 1000-9999 (got {code:?})")]
    CodeOutOfRange { code: String },

    #[error("name must be a single line (got {name:?})")]
    NameHasLineBreak { name: String },

    #[error("marks out of range ({field} = {value})")]
    MarksOutOfRange { field: &'static str, value: i64 },

    #[error("code {code} already exists")]
    DuplicateCode { code: String },
}

impl ValidationError {
    /// Stable machine-readable tag for the IPC error details.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MarksNotInteger { .. } => "marks_not_integer",
            ValidationError::CodeOutOfRange { .. } => "code_out_of_range",
            ValidationError::NameHasLineBreak { .. } => "name_has_line_break",
            ValidationError::MarksOutOfRange { .. } => "marks_out_of_range",
            ValidationError::DuplicateCode { .. } => "duplicate_code",
        }
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no student found for '{0}'")]
    NotFound(String),

    #[error("no students loaded")]
    EmptyRoster,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
