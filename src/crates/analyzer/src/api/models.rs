//! API request and response models.

use crate::api::error::ApiError;
use crate::report::{AnalysisRequest, AnalysisResult, AnalysisStatus, Report};
use github::RepoLocator;
use serde::{Deserialize, Serialize};

/// Request body for the analysis endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// GitHub repository URL.
    pub repository_url: String,
    /// Human-readable project name.
    pub project_name: String,
    /// Free-text evaluation criteria.
    pub evaluation_criteria: String,
    /// Skills the submitter claims the repository demonstrates.
    pub declared_skills: String,
}

impl AnalyzeRequest {
    /// Validate and convert into a pipeline request.
    ///
    /// All fields must be non-blank and the URL must parse as a GitHub
    /// repository locator. Rejection happens here, before the pipeline
    /// is ever invoked.
    pub fn into_analysis_request(self) -> Result<AnalysisRequest, ApiError> {
        let repository_url = require("repository_url", &self.repository_url)?;
        let project_name = require("project_name", &self.project_name)?;
        let evaluation_criteria = require("evaluation_criteria", &self.evaluation_criteria)?;
        let declared_skills = require("declared_skills", &self.declared_skills)?;

        RepoLocator::parse(&repository_url)
            .map_err(|e| ApiError::ValidationError(e.to_string()))?;

        Ok(AnalysisRequest {
            repository_url,
            project_name,
            evaluation_criteria,
            declared_skills,
        })
    }
}

fn require(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Response envelope for the analysis endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    /// "success" or "failure".
    pub status: AnalysisStatus,
    /// Payload wrapper.
    pub data: AnalyzeData,
    /// Human-readable outcome summary.
    pub message: String,
}

/// Payload of an analysis response.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeData {
    /// The final report; absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_report: Option<Report>,
}

impl From<AnalysisResult> for AnalyzeResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            status: result.status,
            data: AnalyzeData {
                final_report: result.final_report,
            },
            message: result.message,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Service info response for the root route.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub endpoints: Vec<String>,
}
