//! Prompt construction for the model-backed stages.
//!
//! All prompt text lives here so stage modules stay focused on control
//! flow. The snapshot excerpt is budgeted; prompts never embed more
//! repository content than `EXCERPT_BUDGET_BYTES`.

use crate::report::{AnalysisRequest, Critique, Report, ValidationVerdict};
use github::RepositorySnapshot;
use std::fmt::Write;

/// Upper bound on repository content embedded into a single prompt.
pub const EXCERPT_BUDGET_BYTES: usize = 200 * 1024;

/// Marker the validator must lead with for a positive verdict.
pub const ALIGNED_MARKER: &str = "ALIGNED:";
/// Marker the validator must lead with for a negative verdict.
pub const MISALIGNED_MARKER: &str = "MISALIGNED:";

/// Render a bounded excerpt of the snapshot: a file listing followed by
/// file contents until the byte budget runs out.
pub fn snapshot_excerpt(snapshot: &RepositorySnapshot, budget: usize) -> String {
    let mut out = String::new();

    out.push_str("File listing:\n");
    for file in &snapshot.files {
        let _ = writeln!(out, "- {}", file.path);
    }
    if snapshot.truncated {
        out.push_str("(capture was truncated; coverage is partial)\n");
    }

    out.push_str("\nFile contents:\n");
    for file in &snapshot.files {
        let remaining = budget.saturating_sub(out.len());
        if remaining == 0 {
            out.push_str("\n[excerpt budget reached; remaining files omitted]\n");
            break;
        }

        let _ = writeln!(out, "\n--- {} ---", file.path);
        if file.content.len() <= remaining {
            out.push_str(&file.content);
            out.push('\n');
        } else {
            out.push_str(truncate_at_boundary(&file.content, remaining));
            out.push_str("\n[file truncated]\n");
        }
    }

    out
}

// &str slicing panics off a char boundary; back off to the nearest one.
fn truncate_at_boundary(text: &str, mut limit: usize) -> &str {
    if limit >= text.len() {
        return text;
    }
    while limit > 0 && !text.is_char_boundary(limit) {
        limit -= 1;
    }
    &text[..limit]
}

pub fn validation_system_prompt() -> String {
    format!(
        "You review whether a code repository plausibly demonstrates a set of \
         declared skills. Respond with a single line starting with either \
         \"{}\" or \"{}\" followed by a one-sentence rationale. Judge only \
         topical alignment, not code quality.",
        ALIGNED_MARKER, MISALIGNED_MARKER
    )
}

pub fn validation_user_prompt(request: &AnalysisRequest, snapshot: &RepositorySnapshot) -> String {
    let readme_note = match snapshot.readme() {
        Some(_) => "",
        None => "\nNote: the repository has no README.",
    };

    format!(
        "Project: {}\nDeclared skills: {}{}\n\n{}",
        request.project_name,
        request.declared_skills,
        readme_note,
        snapshot_excerpt(snapshot, EXCERPT_BUDGET_BYTES)
    )
}

pub fn generation_system_prompt() -> String {
    "You are an experienced software engineering reviewer producing a \
     structured evaluation report for a repository. Respond with a JSON \
     object with exactly these fields: \"scores\" (object mapping each \
     evaluation criterion to a number from 0 to 100), \"findings\" (array \
     of concrete observations, each citing specific files or patterns), \
     and \"recommendations\" (array of actionable improvements). Base \
     every score and finding on the provided content only."
        .to_string()
}

pub fn generation_user_prompt(
    request: &AnalysisRequest,
    snapshot: &RepositorySnapshot,
    verdict: &ValidationVerdict,
) -> String {
    let criteria = request.criteria_list().join(", ");
    let alignment_note = if verdict.aligned {
        String::new()
    } else {
        format!(
            "\nAlignment check: the content may not match the declared \
             skills ({}). Weigh this in your findings.",
            verdict.rationale
        )
    };

    format!(
        "Project: {}\nDeclared skills: {}\nEvaluation criteria: {}{}\n\n{}",
        request.project_name,
        request.declared_skills,
        criteria,
        alignment_note,
        snapshot_excerpt(snapshot, EXCERPT_BUDGET_BYTES)
    )
}

pub fn critique_system_prompt() -> String {
    "You review evaluation reports for quality. Identify unjustified \
     scores, vague findings, and aspects of the repository the report \
     failed to address. Respond with a JSON object with exactly these \
     fields: \"issues\" (array of problems in the report) and \
     \"missing_aspects\" (array of repository aspects the report \
     ignored). Return both arrays empty if the report needs no changes."
        .to_string()
}

pub fn critique_user_prompt(request: &AnalysisRequest, draft: &Report) -> String {
    format!(
        "Project: {}\nEvaluation criteria: {}\n\nDraft report:\n{}",
        request.project_name,
        request.criteria_list().join(", "),
        report_json(draft)
    )
}

pub fn refinement_system_prompt() -> String {
    "You revise an evaluation report to address a critique. Keep the \
     same JSON shape as the draft: \"scores\", \"findings\", \
     \"recommendations\". Address every issue and missing aspect; keep \
     every criterion the draft scored, adjusting scores only where the \
     critique justifies it. Do not drop prior findings without \
     incorporating their substance."
        .to_string()
}

pub fn refinement_user_prompt(
    request: &AnalysisRequest,
    draft: &Report,
    critique: &Critique,
) -> String {
    format!(
        "Project: {}\n\nDraft report:\n{}\n\nCritique:\n{}",
        request.project_name,
        report_json(draft),
        serde_json::to_string_pretty(critique).unwrap_or_else(|_| "{}".to_string())
    )
}

fn report_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
