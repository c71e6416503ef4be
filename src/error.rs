use thiserror::Error;

/// Application-level failure carrying the process exit code.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures raised by the classification core (encode / train / predict).
///
/// Every variant is a distinct condition; callers can match on them instead of
/// parsing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// A threshold field is missing, unknown or not an integer.
    #[error("invalid record: field '{field}' {reason}")]
    InvalidRecord { field: String, reason: String },

    #[error("training dataset is empty")]
    EmptyDataset,

    /// A ground-truth label is absent or outside its closed label space.
    #[error("record {record}: '{value}' is not a known {space} class")]
    UnknownLabelClass {
        space: &'static str,
        value: String,
        record: usize,
    },

    #[error("{head} head diverged at epoch {epoch} (loss={loss})")]
    TrainingDivergence {
        head: &'static str,
        epoch: usize,
        loss: f64,
    },

    #[error("classifier is not fully trained: {reason}")]
    UntrainedArtifact { reason: String },

    #[error("invalid artifact: {0}")]
    ArtifactFormat(String),

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
}

impl ClassifyError {
    pub(crate) fn invalid_record(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ClassifyError::InvalidRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn untrained(reason: impl Into<String>) -> Self {
        ClassifyError::UntrainedArtifact {
            reason: reason.into(),
        }
    }

    /// Exit code used when this error ends the process.
    ///
    /// - 2: bad input (record, artifact, configuration)
    /// - 3: no usable training data
    /// - 4: model failure
    pub fn exit_code(&self) -> u8 {
        match self {
            ClassifyError::InvalidRecord { .. }
            | ClassifyError::ArtifactFormat(_)
            | ClassifyError::InvalidConfig(_) => 2,
            ClassifyError::EmptyDataset | ClassifyError::UnknownLabelClass { .. } => 3,
            ClassifyError::TrainingDivergence { .. } | ClassifyError::UntrainedArtifact { .. } => 4,
        }
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_errors_map_to_exit_codes() {
        let err: AppError = ClassifyError::EmptyDataset.into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "training dataset is empty");

        let err: AppError = ClassifyError::untrained("no heads").into();
        assert_eq!(err.exit_code(), 4);

        let err: AppError = ClassifyError::invalid_record("AC_L_250", "is missing").into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("AC_L_250"));
    }
}
