//! Pipeline error taxonomy.
//!
//! Each variant is tied to the stage that produced it, so a failed run
//! can always report which stage halted it. Stage errors that stem from
//! unparsable model output carry the raw text for diagnostics.

use crate::pipeline::Stage;
use github::GithubError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that halt an analysis run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Repository content could not be fetched.
    #[error("Repository fetch failed: {0}")]
    Fetch(#[from] GithubError),

    /// The validation stage itself faulted (provider failure, not a
    /// negative verdict; a negative verdict is advisory data).
    #[error("Validation stage failed: {0}")]
    Validation(String),

    /// Draft report generation failed.
    #[error("Report generation failed: {reason}")]
    Generation {
        reason: String,
        /// Raw model output when parsing was the failure.
        raw_output: Option<String>,
    },

    /// Report critique failed.
    #[error("Report critique failed: {reason}")]
    Critique {
        reason: String,
        raw_output: Option<String>,
    },

    /// Report refinement failed.
    #[error("Report refinement failed: {reason}")]
    Refinement {
        reason: String,
        raw_output: Option<String>,
    },

    /// A stage exceeded its upper-bound wait.
    #[error("Stage {stage} timed out: {reason}")]
    Timeout { stage: Stage, reason: String },
}

impl PipelineError {
    /// The stage this error halted.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Fetch(_) => Stage::Fetching,
            PipelineError::Validation(_) => Stage::Validating,
            PipelineError::Generation { .. } => Stage::Generating,
            PipelineError::Critique { .. } => Stage::Critiquing,
            PipelineError::Refinement { .. } => Stage::Refining,
            PipelineError::Timeout { stage, .. } => *stage,
        }
    }

    /// Raw model output attached to this error, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            PipelineError::Generation { raw_output, .. }
            | PipelineError::Critique { raw_output, .. }
            | PipelineError::Refinement { raw_output, .. } => raw_output.as_deref(),
            _ => None,
        }
    }
}
