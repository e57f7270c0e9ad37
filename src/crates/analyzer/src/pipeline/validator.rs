//! Validation stage.
//!
//! Checks whether the repository plausibly demonstrates the declared
//! skills. The verdict is advisory: a mismatch travels forward as
//! context, it never halts the run. Cheap heuristics settle the clear
//! cases locally; only ambiguous ones spend a model call.

use crate::error::PipelineError;
use crate::pipeline::prompts;
use crate::pipeline::Stage;
use crate::report::{AnalysisRequest, ValidationVerdict};
use github::RepositorySnapshot;
use llm::{CompletionModel, CompletionRequest, Message};
use tracing::debug;

/// Language keywords mapped to the file extensions that evidence them.
const SKILL_EXTENSIONS: &[(&str, &[&str])] = &[
    ("python", &["py", "ipynb"]),
    ("javascript", &["js"]),
    ("typescript", &["ts"]),
    ("java", &["java"]),
    ("kotlin", &["kt"]),
    ("swift", &["swift"]),
    ("go", &["go"]),
    ("golang", &["go"]),
    ("rust", &["rs"]),
    ("ruby", &["rb"]),
    ("php", &["php"]),
    ("c++", &["cpp", "h"]),
    ("c#", &["cs"]),
    ("html", &["html"]),
    ("css", &["css", "scss", "sass", "less"]),
    ("sql", &["sql"]),
    ("shell", &["sh", "bash"]),
    ("bash", &["sh", "bash"]),
    ("cobol", &["cbl", "cob"]),
    ("fortran", &["f", "f90"]),
];

/// Run the validation stage.
///
/// # Errors
///
/// Returns `PipelineError::Validation` when the provider faults, or
/// `PipelineError::Timeout` when the call exceeds its bound. A negative
/// verdict is not an error.
pub async fn validate(
    model: &dyn CompletionModel,
    request: &AnalysisRequest,
    snapshot: &RepositorySnapshot,
) -> Result<ValidationVerdict, PipelineError> {
    if snapshot.is_empty() {
        return Ok(ValidationVerdict::misaligned(
            "repository snapshot contains no analyzable text files",
        ));
    }

    if let Some(verdict) = heuristic_verdict(request, snapshot) {
        debug!(aligned = verdict.aligned, "Validation settled heuristically");
        return Ok(verdict);
    }

    let completion = CompletionRequest::new(vec![
        Message::system(prompts::validation_system_prompt()),
        Message::user(prompts::validation_user_prompt(request, snapshot)),
    ])
    .with_temperature(0.0);

    let response = model.complete(completion).await.map_err(|e| {
        if e.is_timeout() {
            PipelineError::Timeout {
                stage: Stage::Validating,
                reason: e.to_string(),
            }
        } else {
            PipelineError::Validation(e.to_string())
        }
    })?;

    Ok(parse_verdict(&response.text))
}

/// Settle the verdict locally when the declared skills name languages
/// with known extension evidence.
///
/// Returns `None` when no declared skill maps to a known language, in
/// which case the model decides.
fn heuristic_verdict(
    request: &AnalysisRequest,
    snapshot: &RepositorySnapshot,
) -> Option<ValidationVerdict> {
    let tokens = skill_tokens(&request.declared_skills);
    let extensions = snapshot.extensions();

    let mut recognized = Vec::new();
    let mut matched = false;

    for (keyword, exts) in SKILL_EXTENSIONS {
        if !tokens.iter().any(|t| t == keyword) {
            continue;
        }
        recognized.push(*keyword);
        if exts.iter().any(|ext| extensions.contains(*ext)) {
            matched = true;
        }
    }

    if recognized.is_empty() {
        return None;
    }

    if matched {
        Some(ValidationVerdict::aligned(format!(
            "declared skills ({}) are evidenced by repository file types",
            recognized.join(", ")
        )))
    } else {
        Some(ValidationVerdict::misaligned(format!(
            "declared skills ({}) are not reflected in any repository file type",
            recognized.join(", ")
        )))
    }
}

/// Split declared skills into lowercase whole-word tokens.
///
/// Splitting on word boundaries keeps "Django" from matching the "go"
/// keyword; '+' and '#' stay inside tokens so "C++" and "C#" survive.
fn skill_tokens(skills: &str) -> Vec<String> {
    skills
        .to_ascii_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a verdict line from model output.
///
/// `MISALIGNED:` is checked first since it contains `ALIGNED:` as a
/// substring. Output carrying neither marker counts as an inconclusive
/// negative verdict, not a stage error.
fn parse_verdict(text: &str) -> ValidationVerdict {
    let trimmed = text.trim();

    if let Some(idx) = trimmed.find(prompts::MISALIGNED_MARKER) {
        let rationale = trimmed[idx + prompts::MISALIGNED_MARKER.len()..].trim();
        return ValidationVerdict::misaligned(non_empty(rationale, "no rationale given"));
    }

    if let Some(idx) = trimmed.find(prompts::ALIGNED_MARKER) {
        let rationale = trimmed[idx + prompts::ALIGNED_MARKER.len()..].trim();
        return ValidationVerdict::aligned(non_empty(rationale, "no rationale given"));
    }

    ValidationVerdict::misaligned(format!(
        "inconclusive validation output: {}",
        truncated(trimmed, 200)
    ))
}

fn non_empty(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

fn truncated(text: &str, limit: usize) -> &str {
    let mut end = limit.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use github::SnapshotFile;
    use llm::CompletionResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct FixedModel {
        reply: String,
        calls: Arc<AtomicUsize>,
    }

    impl FixedModel {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl CompletionModel for FixedModel {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse::text_only(&self.reply))
        }

        fn clone_box(&self) -> Box<dyn CompletionModel> {
            Box::new(self.clone())
        }
    }

    fn request(skills: &str) -> AnalysisRequest {
        AnalysisRequest {
            repository_url: "https://github.com/acme/widget".into(),
            project_name: "Widget".into(),
            evaluation_criteria: "code quality".into(),
            declared_skills: skills.into(),
        }
    }

    fn go_snapshot() -> RepositorySnapshot {
        RepositorySnapshot::new(
            vec![
                SnapshotFile::new("main.go", "package main"),
                SnapshotFile::new("README.md", "# Widget"),
            ],
            false,
        )
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_misaligned_without_model_call() {
        let model = FixedModel::new("ALIGNED: should not be consulted");
        let verdict = validate(&model, &request("Go"), &RepositorySnapshot::default())
            .await
            .unwrap();

        assert!(!verdict.aligned);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_heuristic_match_skips_model() {
        let model = FixedModel::new("MISALIGNED: should not be consulted");
        let verdict = validate(&model, &request("Go and REST APIs"), &go_snapshot())
            .await
            .unwrap();

        assert!(verdict.aligned);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_heuristic_mismatch_skips_model() {
        let model = FixedModel::new("ALIGNED: should not be consulted");
        let verdict = validate(&model, &request("COBOL mainframe batch"), &go_snapshot())
            .await
            .unwrap();

        assert!(!verdict.aligned);
        assert!(verdict.rationale.contains("cobol"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_skills_consult_model() {
        let model = FixedModel::new("ALIGNED: the notebooks match the described work");
        let verdict = validate(&model, &request("distributed systems design"), &go_snapshot())
            .await
            .unwrap();

        assert!(verdict.aligned);
        assert_eq!(verdict.rationale, "the notebooks match the described work");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misaligned_marker_wins_over_substring() {
        let model = FixedModel::new("MISALIGNED: content is documentation only");
        let verdict = validate(&model, &request("event sourcing"), &go_snapshot())
            .await
            .unwrap();

        assert!(!verdict.aligned);
        assert_eq!(verdict.rationale, "content is documentation only");
    }

    #[tokio::test]
    async fn test_inconclusive_output_is_negative_verdict() {
        let model = FixedModel::new("The repository seems fine to me.");
        let verdict = validate(&model, &request("event sourcing"), &go_snapshot())
            .await
            .unwrap();

        assert!(!verdict.aligned);
        assert!(verdict.rationale.contains("inconclusive"));
    }

    #[test]
    fn test_heuristic_none_when_no_known_language() {
        assert!(heuristic_verdict(&request("agile leadership"), &go_snapshot()).is_none());
    }

    #[tokio::test]
    async fn test_django_skill_does_not_match_go_keyword() {
        let python_snapshot = RepositorySnapshot::new(
            vec![
                SnapshotFile::new("manage.py", "import django"),
                SnapshotFile::new("app/views.py", "from django.http import HttpResponse"),
            ],
            false,
        );

        // "Django" must not settle heuristically as a "go" mismatch;
        // the model decides instead.
        let model = FixedModel::new("ALIGNED: a Django project backs the claim");
        let verdict = validate(&model, &request("Django"), &python_snapshot)
            .await
            .unwrap();

        assert!(verdict.aligned);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_skill_tokens_word_boundaries() {
        let tokens = skill_tokens("Django, C++ and Cargo tooling");
        assert!(tokens.iter().any(|t| t == "django"));
        assert!(tokens.iter().any(|t| t == "c++"));
        assert!(tokens.iter().any(|t| t == "cargo"));
        assert!(!tokens.iter().any(|t| t == "go"));
    }
}
