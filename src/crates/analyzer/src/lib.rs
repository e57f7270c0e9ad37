//! Repository analysis pipeline for repolens.
//!
//! Orchestrates a fixed sequence of stages over a fetched repository
//! snapshot: validate the submission against its declared skills,
//! generate a draft report, critique it, and refine it into a final
//! report. The pipeline makes no retry decisions of its own; each stage
//! owns its single corrective round, and the first stage error halts
//! the run.
//!
//! The service is deliberately single-purpose: one repository analyzed
//! per request, nothing persisted between requests, and no product
//! surface beyond the analysis endpoint. Derived surfaces (career or
//! hiring guidance built on top of reports, batch evaluation) belong in
//! consumers of this API, not here.

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use error::PipelineError;
pub use pipeline::{Pipeline, Stage};
pub use report::{AnalysisRequest, AnalysisResult, AnalysisStatus, Critique, Report, ValidationVerdict};
