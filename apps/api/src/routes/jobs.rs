use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::routes::{preview, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddJobResponse {
    pub job_id: i64,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct JobListItem {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// POST /add_job
pub async fn handle_add_job(
    State(state): State<AppState>,
    payload: Result<Json<AddJobRequest>, JsonRejection>,
) -> Result<Json<AddJobResponse>, AppError> {
    let Json(request) = payload?;
    let title = required(request.title, "Job title and description are required")?;
    let description = required(
        request.description,
        "Job title and description are required",
    )?;

    let job_id = state.repo.insert_job(&title, &description).await?;
    Ok(Json(AddJobResponse { job_id, title }))
}

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobListItem>>, AppError> {
    let rows = state.repo.list_jobs().await?;
    Ok(Json(
        rows.into_iter()
            .map(|j| JobListItem {
                id: j.id,
                title: j.title,
                description: preview(&j.description),
            })
            .collect(),
    ))
}
