//! Analysis data model.
//!
//! These types cross every stage boundary: the request that starts a
//! run, the intermediate verdict and critique, and the report envelope
//! returned to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request to analyze a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Repository URL as supplied by the caller.
    pub repository_url: String,
    /// Human-readable project name.
    pub project_name: String,
    /// Free-text evaluation criteria, one per line or comma-separated.
    pub evaluation_criteria: String,
    /// Skills the submitter claims the repository demonstrates.
    pub declared_skills: String,
}

impl AnalysisRequest {
    /// Split the free-text criteria into a cleaned list.
    ///
    /// Splits on newlines and commas, trims each entry, and drops
    /// empties and duplicates while preserving first-seen order.
    pub fn criteria_list(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for part in self.evaluation_criteria.split(['\n', ',']) {
            let entry = part.trim();
            if entry.is_empty() {
                continue;
            }
            if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(entry)) {
                seen.push(entry.to_string());
            }
        }
        seen
    }
}

/// Advisory verdict from the validation stage.
///
/// A negative verdict never halts the pipeline; it travels forward as
/// context so the final report can surface the mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// Whether the repository content appears to match the declared skills.
    pub aligned: bool,
    /// Short explanation of the verdict.
    pub rationale: String,
}

impl ValidationVerdict {
    /// An aligned verdict.
    pub fn aligned(rationale: impl Into<String>) -> Self {
        Self {
            aligned: true,
            rationale: rationale.into(),
        }
    }

    /// A misaligned verdict.
    pub fn misaligned(rationale: impl Into<String>) -> Self {
        Self {
            aligned: false,
            rationale: rationale.into(),
        }
    }
}

/// A structured evaluation report.
///
/// Produced as a draft by the generation stage and as the final report
/// by the refinement stage; both share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Score per evaluation criterion, 0 to 100.
    pub scores: BTreeMap<String, f64>,
    /// Concrete observations about the repository.
    #[serde(default)]
    pub findings: Vec<String>,
    /// Actionable suggestions for improvement.
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Report {
    /// Clamp every score into the valid 0 to 100 range.
    pub fn clamp_scores(&mut self) {
        for score in self.scores.values_mut() {
            *score = score.clamp(0.0, 100.0);
        }
    }

    /// True when any finding references the skill/content mismatch.
    pub fn mentions_skill_mismatch(&self) -> bool {
        self.findings.iter().any(|f| {
            let lower = f.to_ascii_lowercase();
            lower.contains("mismatch") || lower.contains("not match") || lower.contains("skills")
        })
    }

    /// Ensure at least one finding references the skill/content
    /// mismatch, appending one built from the rationale if needed.
    pub fn note_skill_mismatch(&mut self, rationale: &str) {
        if !self.mentions_skill_mismatch() {
            self.findings.push(format!(
                "Declared skills may not match the repository content: {}",
                rationale
            ));
        }
    }
}

/// Structured critique of a draft report.
///
/// Both lists empty means the critic found nothing to fix; that is a
/// success, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Critique {
    /// Problems found in the draft.
    #[serde(default)]
    pub issues: Vec<String>,
    /// Aspects of the repository the draft failed to address.
    #[serde(default, alias = "missingAspects")]
    pub missing_aspects: Vec<String>,
}

impl Critique {
    /// True when the critic raised nothing.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty() && self.missing_aspects.is_empty()
    }
}

/// Terminal status of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// The pipeline ran to completion.
    Success,
    /// The pipeline halted at some stage.
    Failure,
}

/// Result envelope for an analysis run.
///
/// Every run produces one of these, success or failure; callers never
/// see a raw error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Terminal status.
    pub status: AnalysisStatus,
    /// The final report; present only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<Report>,
    /// Human-readable summary of the outcome.
    pub message: String,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Build a success envelope around a final report.
    pub fn success(report: Report, message: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Success,
            final_report: Some(report),
            message: message.into(),
            generated_at: Utc::now(),
        }
    }

    /// Build a failure envelope. No report is attached.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::Failure,
            final_report: None,
            message: message.into(),
            generated_at: Utc::now(),
        }
    }

    /// True when the run completed.
    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }
}
