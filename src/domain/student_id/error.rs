use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudentIdError {
    #[error("Invalid student id config: {0}")]
    InvalidConfig(String),

    #[error("Sequence {sequence} exceeds the maximum {max} for this pattern")]
    SequenceOverflow { sequence: u64, max: u32 },

    #[error("No free student id left at or above sequence {from}")]
    Exhausted { from: u32 },
}

impl From<StudentIdError> for crate::shared::error::AppError {
    fn from(err: StudentIdError) -> Self {
        crate::shared::error::AppError::ValidationError(err.to_string())
    }
}
