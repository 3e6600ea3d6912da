//! Error types for skycast.
//!
//! All errors are strongly typed using thiserror. The layers mirror the
//! recovery policy: validation errors are re-prompted, source errors become
//! workflow transitions, model errors abort a single inference call, and
//! workflow errors end the session.

use thiserror::Error;

use crate::bayes::NodeId;

/// Validation errors that occur while checking raw input values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Ordinal code {value} is out of range [0, 4]")]
    CodeOutOfRange {
        value: i64,
    },

    #[error("Probability {value} is out of range [0.0, 1.0]")]
    ProbabilityOutOfRange {
        value: f64,
    },

    #[error("Distribution sums to {sum}, expected 1.0 (tolerance {tolerance})")]
    DistributionNotNormalized {
        sum: f64,
        tolerance: f64,
    },

    #[error("Answer {answer:?} is not one of the accepted options")]
    UnknownAnswer {
        answer: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },
}

/// Failures reported by external collaborators (weather API, prompt I/O,
/// knowledge catalog).
///
/// These are distinguishable values, never panics: the workflow interprets
/// them as state transitions (e.g. online fetch failure falls back to
/// manual entry).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Location not found: {query:?}")]
    LocationNotFound {
        query: String,
    },

    #[error("Weather request failed: {message}")]
    RequestFailed {
        message: String,
    },

    #[error("Malformed weather payload: {message}")]
    MalformedPayload {
        message: String,
    },

    #[error("Prompt input unavailable: {message}")]
    PromptClosed {
        message: String,
    },

    #[error("Knowledge catalog unavailable: {message}")]
    CatalogUnavailable {
        message: String,
    },
}

/// Errors raised by the Bayesian risk model.
///
/// Fatal to the current inference or learning call only; the session
/// decides whether to skip the assessment or fall back to the analytic
/// network.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Evidence references variable {variable} which is not in the network")]
    UnknownVariable {
        variable: NodeId,
    },

    #[error("The query target {variable} cannot be observed as evidence")]
    TargetObserved {
        variable: NodeId,
    },

    #[error("Dataset lacks required column {column}")]
    MissingColumn {
        column: NodeId,
    },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Dataset could not be read: {message}")]
    DatasetUnreadable {
        message: String,
    },

    #[error("Network validation failed: {reason}")]
    InvalidNetwork {
        reason: String,
    },
}

/// Workflow integrity errors.
///
/// These indicate a bug in the rule set, not a recoverable runtime
/// condition; the session is over once one is raised. The working-memory
/// snapshot is carried for diagnosis.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Rule '{rule}' declared {count} state-transition facts in one firing")]
    DivergentTransition {
        rule: String,
        count: usize,
        memory: Vec<String>,
    },

    #[error("No rule matched and no terminal state was reached")]
    Stalled {
        memory: Vec<String>,
    },

    #[error("Rule '{rule}' failed: {message}")]
    ActionFailed {
        rule: String,
        message: String,
    },
}

/// Top-level error type for skycast.
#[derive(Debug, Error)]
pub enum SkycastError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

impl SkycastError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a collaborator failure.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// Returns true if this is a model error.
    #[must_use]
    pub const fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// Returns true if this is a workflow integrity error.
    #[must_use]
    pub const fn is_workflow(&self) -> bool {
        matches!(self, Self::Workflow(_))
    }

    /// Returns true if the current session can continue after this error.
    ///
    /// Validation errors are re-prompted, source errors become state
    /// transitions, model errors only abort one inference call. Workflow
    /// integrity errors end the session.
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Workflow(_))
    }
}

/// Result type alias for skycast operations.
pub type SkycastResult<T> = Result<T, SkycastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_code_range() {
        let err = ValidationError::CodeOutOfRange { value: 7 };
        let msg = format!("{err}");
        assert!(msg.contains('7'));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_source_error_location() {
        let err = SourceError::LocationNotFound {
            query: "Atlantis".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Atlantis"));
    }

    #[test]
    fn test_model_error_missing_column() {
        let err = ModelError::MissingColumn {
            column: NodeId::Rain,
        };
        let msg = format!("{err}");
        assert!(msg.contains("Rain"));
    }

    #[test]
    fn test_workflow_error_divergent() {
        let err = WorkflowError::DivergentTransition {
            rule: "ask-activity".to_string(),
            count: 2,
            memory: vec!["action=AskActivity".to_string()],
        };
        let msg = format!("{err}");
        assert!(msg.contains("ask-activity"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_skycast_error_classification() {
        let err: SkycastError = ValidationError::MissingField {
            field: "temperature".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_session_fatal());

        let err: SkycastError = WorkflowError::Stalled { memory: vec![] }.into();
        assert!(err.is_workflow());
        assert!(err.is_session_fatal());
    }

    #[test]
    fn test_skycast_error_from_model() {
        let err: SkycastError = ModelError::EmptyDataset.into();
        assert!(err.is_model());
        assert!(!err.is_session_fatal());
    }
}
