use std::collections::BTreeSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::MatchResult;
use crate::models::records::ComparisonRow;
use crate::routes::required;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume: Option<String>,
    pub job: Option<String>,
    pub resume_id: Option<i64>,
    pub job_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub score: f64,
    pub keywords: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchMultipleRequest {
    pub resume: Option<String>,
    pub jobs: Option<Vec<JobInput>>,
    pub resume_id: Option<i64>,
}

/// One entry per submitted job. A failed entry carries `error` and leaves the
/// rest of the batch untouched.
#[derive(Debug, Serialize)]
pub struct JobMatch {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchMultipleResponse {
    pub results: Vec<JobMatch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /match
///
/// Scores one resume against one job description. A comparison is stored only
/// when both `resume_id` and `job_id` are given.
pub async fn handle_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let Json(request) = payload?;
    let resume = required(request.resume, "Resume and job description are required")?;
    let job = required(request.job, "Resume and job description are required")?;

    let result = state.scorer.score(&resume, &job);

    if let (Some(resume_id), Some(job_id)) = (request.resume_id, request.job_id) {
        state
            .repo
            .insert_comparison(resume_id, job_id, result.score, &result.keywords_joined())
            .await?;
    }

    Ok(Json(MatchResponse {
        score: result.score,
        keywords: result.keywords,
    }))
}

/// POST /match_multiple
///
/// Scores one resume against several job descriptions. Every job is stored;
/// with `resume_id` a comparison is stored for each as well.
pub async fn handle_match_multiple(
    State(state): State<AppState>,
    payload: Result<Json<MatchMultipleRequest>, JsonRejection>,
) -> Result<Json<MatchMultipleResponse>, AppError> {
    let Json(request) = payload?;
    let resume = required(request.resume, "Resume and at least one job are required")?;
    let jobs = request
        .jobs
        .filter(|jobs| !jobs.is_empty())
        .ok_or_else(|| AppError::Validation("Resume and at least one job are required".into()))?;

    info!("Matching resume against {} jobs", jobs.len());

    let mut results = Vec::with_capacity(jobs.len());
    for job in jobs {
        results.push(match_one(&state, &resume, request.resume_id, job).await);
    }

    Ok(Json(MatchMultipleResponse { results }))
}

async fn match_one(
    state: &AppState,
    resume: &str,
    resume_id: Option<i64>,
    job: JobInput,
) -> JobMatch {
    let title = job.title.unwrap_or_default();
    let description = job.description.unwrap_or_default();
    if title.trim().is_empty() || description.trim().is_empty() {
        return JobMatch {
            title,
            score: None,
            keywords: None,
            job_id: None,
            error: Some("Job title and description are required".to_string()),
        };
    }

    let result = state.scorer.score(resume, &description);
    let (job_id, error) = persist_match(state, &title, &description, resume_id, &result).await;

    JobMatch {
        title,
        score: Some(result.score),
        keywords: Some(result.keywords),
        job_id,
        error,
    }
}

/// Stores the job and, with a `resume_id`, its comparison. A stored job keeps
/// its id even when the comparison insert fails. Database errors are logged
/// and replaced by a generic message.
async fn persist_match(
    state: &AppState,
    title: &str,
    description: &str,
    resume_id: Option<i64>,
    result: &MatchResult,
) -> (Option<i64>, Option<String>) {
    let job_id = match state.repo.insert_job(title, description).await {
        Ok(job_id) => job_id,
        Err(e) => {
            warn!("Failed to store job '{title}': {e}");
            return (None, Some("Failed to store job".to_string()));
        }
    };

    if let Some(resume_id) = resume_id {
        if let Err(e) = state
            .repo
            .insert_comparison(resume_id, job_id, result.score, &result.keywords_joined())
            .await
        {
            warn!("Failed to store comparison of resume {resume_id} with job {job_id}: {e}");
            return (Some(job_id), Some("Failed to store comparison".to_string()));
        }
    }

    (Some(job_id), None)
}

/// GET /comparisons
pub async fn handle_list_comparisons(
    State(state): State<AppState>,
) -> Result<Json<Vec<ComparisonRow>>, AppError> {
    Ok(Json(state.repo.list_comparisons().await?))
}
