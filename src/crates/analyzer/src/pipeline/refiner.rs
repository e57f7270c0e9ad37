//! Refinement stage: revise the draft into the final report.

use crate::error::PipelineError;
use crate::pipeline::stage::complete_structured;
use crate::pipeline::{prompts, Stage};
use crate::report::{AnalysisRequest, Critique, Report, ValidationVerdict};
use llm::{CompletionModel, CompletionRequest, Message};
use tracing::warn;

/// Refine the draft report against a critique.
///
/// The final report must keep every criterion the draft scored; any the
/// model dropped are carried forward with their draft scores. When the
/// verdict was negative the mismatch finding is re-asserted here, since
/// this report is the one the caller sees.
pub async fn refine(
    model: &dyn CompletionModel,
    request: &AnalysisRequest,
    draft: &Report,
    critique: &Critique,
    verdict: &ValidationVerdict,
) -> Result<Report, PipelineError> {
    let completion = CompletionRequest::new(vec![
        Message::system(prompts::refinement_system_prompt()),
        Message::user(prompts::refinement_user_prompt(request, draft, critique)),
    ])
    .with_temperature(0.2)
    .with_json_output(true);

    let mut report: Report = complete_structured(model, completion, Stage::Refining)
        .await
        .map_err(|f| f.into_pipeline_error(Stage::Refining))?;

    report.clamp_scores();

    for (criterion, score) in &draft.scores {
        if !report.scores.contains_key(criterion) {
            warn!(%criterion, "Refined report dropped a criterion, carrying draft score forward");
            report.scores.insert(criterion.clone(), *score);
        }
    }

    if !verdict.aligned {
        report.note_skill_mismatch(&verdict.rationale);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm::CompletionResponse;
    use std::collections::BTreeMap;

    #[derive(Clone)]
    struct FixedModel(String);

    #[async_trait]
    impl CompletionModel for FixedModel {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> llm::Result<CompletionResponse> {
            Ok(CompletionResponse::text_only(&self.0))
        }

        fn clone_box(&self) -> Box<dyn CompletionModel> {
            Box::new(self.clone())
        }
    }

    fn draft() -> Report {
        Report {
            scores: BTreeMap::from([
                ("code quality".to_string(), 70.0),
                ("testing".to_string(), 45.0),
            ]),
            findings: vec!["no test directory".into()],
            recommendations: vec![],
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            repository_url: "https://github.com/acme/widget".into(),
            project_name: "Widget".into(),
            evaluation_criteria: "code quality, testing".into(),
            declared_skills: "Go".into(),
        }
    }

    #[tokio::test]
    async fn test_refine_carries_dropped_criteria_forward() {
        let model = FixedModel(
            r#"{"scores": {"code quality": 75}, "findings": ["no test directory"], "recommendations": ["add tests"]}"#
                .to_string(),
        );
        let report = refine(
            &model,
            &request(),
            &draft(),
            &Critique::default(),
            &ValidationVerdict::aligned("fine"),
        )
        .await
        .unwrap();

        assert_eq!(report.scores["code quality"], 75.0);
        assert_eq!(report.scores["testing"], 45.0);
    }

    #[tokio::test]
    async fn test_refine_restores_dropped_mismatch_finding() {
        // The refined output omits the mismatch finding the draft carried.
        let model = FixedModel(
            r#"{"scores": {"code quality": 35, "testing": 20}, "findings": ["single-file main package"], "recommendations": []}"#
                .to_string(),
        );
        let verdict = ValidationVerdict::misaligned("no COBOL files present");
        let report = refine(&model, &request(), &draft(), &Critique::default(), &verdict)
            .await
            .unwrap();

        assert!(report.mentions_skill_mismatch());
        assert!(report
            .findings
            .iter()
            .any(|f| f.contains("no COBOL files present")));
    }

    #[tokio::test]
    async fn test_refine_clamps_scores() {
        let model = FixedModel(
            r#"{"scores": {"code quality": 130, "testing": 45}, "findings": [], "recommendations": []}"#
                .to_string(),
        );
        let report = refine(
            &model,
            &request(),
            &draft(),
            &Critique::default(),
            &ValidationVerdict::aligned("fine"),
        )
        .await
        .unwrap();

        assert_eq!(report.scores["code quality"], 100.0);
    }
}
