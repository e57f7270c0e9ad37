//! JSON recovery for model output.
//!
//! Providers asked for JSON still wrap it in markdown fences or prose
//! often enough that decoding straight off the wire is not reliable.
//! Recovery is layered: direct parse, fenced block, outermost brace
//! window, then a trailing-comma repair pass over whichever candidate
//! got furthest.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

fn trailing_comma_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern is valid"))
}

/// Decode a typed value from raw model output.
///
/// Tries progressively looser extractions before giving up. The error
/// string describes the last decode failure for use in a corrective
/// prompt.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let candidate = extract_json(raw);

    match serde_json::from_str(candidate) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            // One repair pass: strip trailing commas before closers.
            let repaired = trailing_comma_pattern().replace_all(candidate, "$1");
            serde_json::from_str(&repaired)
                .map_err(|_| format!("invalid JSON: {}", first_err))
        }
    }
}

/// Extract the most plausible JSON payload from raw output.
///
/// Preference order: the body of a ```json fence, any fenced block,
/// the outermost `{...}` window, then the trimmed text as-is.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(body) = fenced_block(trimmed) {
        return body;
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

fn fenced_block(text: &str) -> Option<&str> {
    let after_open = text
        .split_once("```json")
        .or_else(|| text.split_once("```JSON"))
        .or_else(|| text.split_once("```"))?
        .1;
    let body = after_open.split_once("```")?.0;
    let body = body.trim();
    (!body.is_empty()).then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Critique, Report};

    #[test]
    fn test_parse_plain_json() {
        let report: Report = parse_structured(
            r#"{"scores": {"quality": 80}, "findings": ["clean layout"], "recommendations": []}"#,
        )
        .unwrap();
        assert_eq!(report.scores["quality"], 80.0);
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "Here is the report:\n```json\n{\"scores\": {\"quality\": 75}}\n```\nDone.";
        let report: Report = parse_structured(raw).unwrap();
        assert_eq!(report.scores["quality"], 75.0);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_parse_unlabelled_fence() {
        let raw = "```\n{\"issues\": [\"vague\"], \"missing_aspects\": []}\n```";
        let critique: Critique = parse_structured(raw).unwrap();
        assert_eq!(critique.issues, vec!["vague"]);
    }

    #[test]
    fn test_parse_brace_window() {
        let raw = "Sure! The critique follows. {\"issues\": [], \"missing_aspects\": [\"tests\"]} Hope that helps.";
        let critique: Critique = parse_structured(raw).unwrap();
        assert_eq!(critique.missing_aspects, vec!["tests"]);
    }

    #[test]
    fn test_parse_repairs_trailing_commas() {
        let raw = r#"{"scores": {"quality": 60,}, "findings": ["ok",],}"#;
        let report: Report = parse_structured(raw).unwrap();
        assert_eq!(report.scores["quality"], 60.0);
        assert_eq!(report.findings, vec!["ok"]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        let result: Result<Report, _> = parse_structured("I cannot produce a report.");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        // Valid JSON that does not match the target type is still an error.
        let result: Result<Report, _> = parse_structured(r#"{"answer": 42}"#);
        assert!(result.is_err());
    }
}
