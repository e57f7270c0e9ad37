//! Generation stage: produce the draft report.

use crate::error::PipelineError;
use crate::pipeline::stage::complete_structured;
use crate::pipeline::{prompts, Stage};
use crate::report::{AnalysisRequest, Report, ValidationVerdict};
use github::RepositorySnapshot;
use llm::{CompletionModel, CompletionRequest, Message};
use tracing::debug;

/// Generate a draft report scoring the requested criteria.
///
/// Scores are clamped into 0 to 100 after decoding. When the verdict is
/// negative, the draft is guaranteed to carry at least one finding
/// referencing the mismatch.
pub async fn generate(
    model: &dyn CompletionModel,
    request: &AnalysisRequest,
    snapshot: &RepositorySnapshot,
    verdict: &ValidationVerdict,
) -> Result<Report, PipelineError> {
    let completion = CompletionRequest::new(vec![
        Message::system(prompts::generation_system_prompt()),
        Message::user(prompts::generation_user_prompt(request, snapshot, verdict)),
    ])
    .with_temperature(0.2)
    .with_json_output(true);

    let mut draft: Report = complete_structured(model, completion, Stage::Generating)
        .await
        .map_err(|f| f.into_pipeline_error(Stage::Generating))?;

    draft.clamp_scores();

    if !verdict.aligned {
        draft.note_skill_mismatch(&verdict.rationale);
    }

    debug!(
        criteria = draft.scores.len(),
        findings = draft.findings.len(),
        "Draft report generated"
    );

    Ok(draft)
}
