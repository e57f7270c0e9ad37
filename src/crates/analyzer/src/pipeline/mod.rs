//! Analysis pipeline orchestration.
//!
//! The pipeline runs a fixed stage sequence and nothing else: it wires
//! stage outputs to stage inputs, logs transitions, and wraps the
//! outcome in a result envelope. All judgment calls (verdict parsing,
//! corrective retries, score clamping) live inside the stages.

pub mod critic;
pub mod generator;
pub mod parser;
pub mod prompts;
mod stage;
pub mod validator;
pub mod refiner;

use crate::error::PipelineError;
use crate::report::{AnalysisRequest, AnalysisResult, Report};
use github::{ContentProvider, RepoLocator};
use llm::CompletionModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Stages of an analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Fetching the repository snapshot.
    Fetching,
    /// Checking skill/content alignment.
    Validating,
    /// Producing the draft report.
    Generating,
    /// Critiquing the draft.
    Critiquing,
    /// Revising the draft into the final report.
    Refining,
    /// Terminal: the run completed.
    Done,
    /// Terminal: the run halted at some stage.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Validating => "validating",
            Stage::Generating => "generating",
            Stage::Critiquing => "critiquing",
            Stage::Refining => "refining",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// The analysis pipeline.
///
/// Cheap to clone; share one instance across request handlers.
#[derive(Clone)]
pub struct Pipeline {
    content: Arc<dyn ContentProvider>,
    completion: Arc<dyn CompletionModel>,
}

impl Pipeline {
    /// Create a pipeline over a content provider and completion model.
    pub fn new(content: Arc<dyn ContentProvider>, completion: Arc<dyn CompletionModel>) -> Self {
        Self {
            content,
            completion,
        }
    }

    /// Run the full analysis. Never returns an error: failures are
    /// folded into the result envelope with the stage that halted them.
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisResult {
        info!(
            repository = %request.repository_url,
            project = %request.project_name,
            "Starting analysis"
        );

        match self.execute(request).await {
            Ok(report) => {
                info!(criteria = report.scores.len(), "Analysis completed");
                AnalysisResult::success(
                    report,
                    format!("Analysis of {} completed", request.project_name),
                )
            }
            Err(e) => {
                let halted = e.stage();
                info!(from = %halted, to = %Stage::Failed, "Stage transition");
                error!(stage = %halted, error = %e, "Analysis failed");
                AnalysisResult::failure(format!("Analysis halted while {}: {}", halted, e))
            }
        }
    }

    async fn execute(&self, request: &AnalysisRequest) -> Result<Report, PipelineError> {
        let mut stage = Stage::Fetching;

        let locator = RepoLocator::parse(&request.repository_url)?;
        let snapshot = self.content.fetch_snapshot(&locator).await?;

        advance(&mut stage, Stage::Validating);
        let verdict = validator::validate(self.completion.as_ref(), request, &snapshot).await?;

        advance(&mut stage, Stage::Generating);
        let draft =
            generator::generate(self.completion.as_ref(), request, &snapshot, &verdict).await?;

        advance(&mut stage, Stage::Critiquing);
        let critique = critic::critique(self.completion.as_ref(), request, &draft).await?;

        advance(&mut stage, Stage::Refining);
        let report =
            refiner::refine(self.completion.as_ref(), request, &draft, &critique, &verdict)
                .await?;

        advance(&mut stage, Stage::Done);
        Ok(report)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    info!(from = %stage, to = %next, "Stage transition");
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::AnalysisStatus;
    use async_trait::async_trait;
    use github::{GithubError, RepositorySnapshot, SnapshotFile};
    use llm::{CompletionRequest, CompletionResponse, LlmError};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct ScriptedModel {
        responses: Arc<Mutex<VecDeque<String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedModel {
        fn new(texts: &[&str]) -> Self {
            Self {
                responses: Arc::new(Mutex::new(
                    texts.iter().map(|t| t.to_string()).collect(),
                )),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl llm::CompletionModel for ScriptedModel {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.lock().unwrap().pop_front() {
                Some(text) => Ok(CompletionResponse::text_only(text)),
                None => Err(LlmError::Provider("script exhausted".into())),
            }
        }

        fn clone_box(&self) -> Box<dyn llm::CompletionModel> {
            Box::new(self.clone())
        }
    }

    #[derive(Clone)]
    struct FixedProvider(RepositorySnapshot);

    #[async_trait]
    impl ContentProvider for FixedProvider {
        async fn fetch_snapshot(
            &self,
            _locator: &RepoLocator,
        ) -> github::Result<RepositorySnapshot> {
            Ok(self.0.clone())
        }
    }

    struct NotFoundProvider;

    #[async_trait]
    impl ContentProvider for NotFoundProvider {
        async fn fetch_snapshot(
            &self,
            locator: &RepoLocator,
        ) -> github::Result<RepositorySnapshot> {
            Err(GithubError::NotFound(locator.slug()))
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

    fn go_snapshot() -> RepositorySnapshot {
        RepositorySnapshot::new(
            vec![
                SnapshotFile::new("main.go", "package main\n\nfunc main() {}\n"),
                SnapshotFile::new("README.md", "# Widget\n\nA small Go service.\n"),
            ],
            false,
        )
    }

    fn pipeline(
        provider: impl ContentProvider + 'static,
        model: ScriptedModel,
    ) -> Pipeline {
        Pipeline::new(Arc::new(provider), Arc::new(model))
    }

    const DRAFT: &str = r#"{"scores": {"code quality": 70, "testing": 40},
        "findings": ["single-file main package", "no test files"],
        "recommendations": ["add unit tests"]}"#;
    const EMPTY_CRITIQUE: &str = r#"{"issues": [], "missing_aspects": []}"#;
    const FINAL: &str = r#"{"scores": {"code quality": 72, "testing": 40},
        "findings": ["single-file main package", "no test files"],
        "recommendations": ["add unit tests", "split main into packages"]}"#;

    // Declared skill "Go" matches the snapshot heuristically, so the
    // validator spends no model call in these runs.

    #[tokio::test]
    async fn test_full_run_success() {
        let model = ScriptedModel::new(&[DRAFT, EMPTY_CRITIQUE, FINAL]);
        let result = pipeline(FixedProvider(go_snapshot()), model.clone())
            .run(&request())
            .await;

        assert_eq!(result.status, AnalysisStatus::Success);
        let report = result.final_report.unwrap();
        assert_eq!(report.scores["code quality"], 72.0);
        assert_eq!(report.scores["testing"], 40.0);
        assert!(report.scores.values().all(|s| (0.0..=100.0).contains(s)));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_repository_never_reaches_model() {
        let model = ScriptedModel::new(&[DRAFT]);
        let result = pipeline(NotFoundProvider, model.clone())
            .run(&request())
            .await;

        assert_eq!(result.status, AnalysisStatus::Failure);
        assert!(result.final_report.is_none());
        assert!(result.message.contains("fetching"));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_model() {
        let model = ScriptedModel::new(&[DRAFT]);
        let mut req = request();
        req.repository_url = "https://gitlab.com/acme/widget".into();

        let result = pipeline(FixedProvider(go_snapshot()), model.clone())
            .run(&req)
            .await;

        assert_eq!(result.status, AnalysisStatus::Failure);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_halts_run() {
        // Two unparsable generation responses; critic must never run.
        let model = ScriptedModel::new(&["not json", "still not json"]);
        let result = pipeline(FixedProvider(go_snapshot()), model.clone())
            .run(&request())
            .await;

        assert_eq!(result.status, AnalysisStatus::Failure);
        assert!(result.message.contains("generating"));
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_corrective_retry_recovers_generation() {
        let model = ScriptedModel::new(&["garbled output", DRAFT, EMPTY_CRITIQUE, FINAL]);
        let result = pipeline(FixedProvider(go_snapshot()), model.clone())
            .run(&request())
            .await;

        assert_eq!(result.status, AnalysisStatus::Success);
        assert_eq!(model.call_count(), 4);
    }

    #[tokio::test]
    async fn test_critique_failure_halts_before_refinement() {
        let model = ScriptedModel::new(&[DRAFT, "nope", "still nope"]);
        let result = pipeline(FixedProvider(go_snapshot()), model.clone())
            .run(&request())
            .await;

        assert_eq!(result.status, AnalysisStatus::Failure);
        assert!(result.message.contains("critiquing"));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_refiner_dropping_criterion_is_carried_forward() {
        let final_missing_testing = r#"{"scores": {"code quality": 75},
            "findings": ["single-file main package"],
            "recommendations": ["add unit tests"]}"#;
        let model = ScriptedModel::new(&[DRAFT, EMPTY_CRITIQUE, final_missing_testing]);
        let result = pipeline(FixedProvider(go_snapshot()), model)
            .run(&request())
            .await;

        let report = result.final_report.unwrap();
        assert_eq!(report.scores["testing"], 40.0);
    }

    #[tokio::test]
    async fn test_misaligned_skills_still_produce_report() {
        let mut req = request();
        req.declared_skills = "COBOL mainframe batch".into();

        let final_with_mismatch = r#"{"scores": {"code quality": 35, "testing": 20},
            "findings": ["declared COBOL skills are not evidenced by the Go codebase"],
            "recommendations": ["clarify the skills claimed for this project"]}"#;
        let model = ScriptedModel::new(&[DRAFT, EMPTY_CRITIQUE, final_with_mismatch]);
        let result = pipeline(FixedProvider(go_snapshot()), model)
            .run(&req)
            .await;

        assert_eq!(result.status, AnalysisStatus::Success);
        let report = result.final_report.unwrap();
        assert!(report
            .findings
            .iter()
            .any(|f| f.to_ascii_lowercase().contains("skills")));
    }

    #[tokio::test]
    async fn test_refiner_omitting_mismatch_finding_is_restored() {
        let mut req = request();
        req.declared_skills = "COBOL mainframe batch".into();

        // Refined output drops every mismatch-related finding.
        let final_without_mismatch = r#"{"scores": {"code quality": 35, "testing": 20},
            "findings": ["single-file main package"],
            "recommendations": ["add unit tests"]}"#;
        let model = ScriptedModel::new(&[DRAFT, EMPTY_CRITIQUE, final_without_mismatch]);
        let result = pipeline(FixedProvider(go_snapshot()), model)
            .run(&req)
            .await;

        assert_eq!(result.status, AnalysisStatus::Success);
        let report = result.final_report.unwrap();
        assert!(report.mentions_skill_mismatch());
    }

    #[test]
    fn test_stage_display_covers_terminals() {
        assert_eq!(Stage::Fetching.to_string(), "fetching");
        assert_eq!(Stage::Done.to_string(), "done");
        assert_eq!(Stage::Failed.to_string(), "failed");
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_advisory_not_fatal() {
        let model = ScriptedModel::new(&[DRAFT, EMPTY_CRITIQUE, FINAL]);
        let result = pipeline(FixedProvider(RepositorySnapshot::default()), model)
            .run(&request())
            .await;

        // Empty snapshot yields a negative verdict; the run continues.
        assert_eq!(result.status, AnalysisStatus::Success);
    }

    #[tokio::test]
    async fn test_provider_exhaustion_surfaces_as_failure() {
        let model = ScriptedModel::new(&[DRAFT, EMPTY_CRITIQUE]);
        let result = pipeline(FixedProvider(go_snapshot()), model)
            .run(&request())
            .await;

        assert_eq!(result.status, AnalysisStatus::Failure);
        assert!(result.message.contains("refining"));
    }
}
