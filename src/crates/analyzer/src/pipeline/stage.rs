//! Shared stage plumbing: one completion call with one corrective retry.
//!
//! Every model-backed stage follows the same discipline. Call the
//! provider, try to decode the typed value; on a decode failure, send
//! exactly one corrective follow-up quoting the failure, then either
//! decode or fail the stage. Provider errors are never retried here.

use crate::error::PipelineError;
use crate::pipeline::parser;
use crate::pipeline::Stage;
use llm::{CompletionModel, CompletionRequest, LlmError, Message};
use serde::de::DeserializeOwned;
use tracing::warn;

/// How a model-backed stage call failed.
pub(crate) enum StageFailure {
    /// The provider itself failed.
    Provider(LlmError),
    /// Output stayed unparsable after the corrective round.
    Unparsable { reason: String, raw: String },
}

impl StageFailure {
    /// Convert into the typed error for the stage that hit it.
    pub(crate) fn into_pipeline_error(self, stage: Stage) -> PipelineError {
        match self {
            StageFailure::Provider(e) if e.is_timeout() => PipelineError::Timeout {
                stage,
                reason: e.to_string(),
            },
            StageFailure::Provider(e) => stage_error(stage, e.to_string(), None),
            StageFailure::Unparsable { reason, raw } => stage_error(stage, reason, Some(raw)),
        }
    }
}

fn stage_error(stage: Stage, reason: String, raw_output: Option<String>) -> PipelineError {
    match stage {
        Stage::Validating => PipelineError::Validation(reason),
        Stage::Critiquing => PipelineError::Critique { reason, raw_output },
        Stage::Refining => PipelineError::Refinement { reason, raw_output },
        // Generating, plus any stage without a dedicated variant.
        _ => PipelineError::Generation { reason, raw_output },
    }
}

/// Run one completion and decode a typed value, with a single
/// corrective retry on decode failure.
pub(crate) async fn complete_structured<T: DeserializeOwned>(
    model: &dyn CompletionModel,
    mut request: CompletionRequest,
    stage: Stage,
) -> Result<T, StageFailure> {
    let response = model
        .complete(request.clone())
        .await
        .map_err(StageFailure::Provider)?;

    let parse_err = match parser::parse_structured::<T>(&response.text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    warn!(%stage, error = %parse_err, "Unparsable stage output, sending corrective prompt");

    request.push(Message::assistant(response.text));
    request.push(Message::user(corrective_prompt(&parse_err)));

    let retry = model
        .complete(request)
        .await
        .map_err(StageFailure::Provider)?;

    parser::parse_structured::<T>(&retry.text).map_err(|e| StageFailure::Unparsable {
        reason: format!("output unparsable after corrective retry: {}", e),
        raw: retry.text,
    })
}

fn corrective_prompt(parse_err: &str) -> String {
    format!(
        "Your previous response could not be decoded as JSON ({}). \
         Respond again with only the JSON object, no markdown fences, \
         no commentary, same fields as instructed.",
        parse_err
    )
}
