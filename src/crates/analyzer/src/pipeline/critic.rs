//! Critique stage: review the draft report.

use crate::error::PipelineError;
use crate::pipeline::stage::complete_structured;
use crate::pipeline::{prompts, Stage};
use crate::report::{AnalysisRequest, Critique, Report};
use llm::{CompletionModel, CompletionRequest, Message};
use tracing::debug;

/// Critique a draft report. An empty critique is a normal outcome.
pub async fn critique(
    model: &dyn CompletionModel,
    request: &AnalysisRequest,
    draft: &Report,
) -> Result<Critique, PipelineError> {
    let completion = CompletionRequest::new(vec![
        Message::system(prompts::critique_system_prompt()),
        Message::user(prompts::critique_user_prompt(request, draft)),
    ])
    .with_temperature(0.0)
    .with_json_output(true);

    let critique: Critique = complete_structured(model, completion, Stage::Critiquing)
        .await
        .map_err(|f| f.into_pipeline_error(Stage::Critiquing))?;

    debug!(
        issues = critique.issues.len(),
        missing = critique.missing_aspects.len(),
        "Draft critiqued"
    );

    Ok(critique)
}
