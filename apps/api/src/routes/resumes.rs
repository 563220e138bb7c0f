use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::summary::summarize;
use crate::routes::{preview, required};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResumeResponse {
    pub resume_text: String,
    pub resume_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ResumeSummaryRequest {
    pub resume: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeSummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeListItem {
    pub id: i64,
    pub filename: String,
    pub content: String,
}

/// POST /upload_resume
///
/// Multipart upload with the file in field `resume`. Extracts the text, stores
/// the resume and returns the text with the new record id.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResumeResponse>, AppError> {
    let mut multipart = multipart?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(RESUME_FIELD) {
            let filename = field.file_name().unwrap_or_default().to_lowercase();
            let data = field.bytes().await?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::Validation("No resume file uploaded".to_string()))?;
    info!("Received resume upload {filename} ({} bytes)", data.len());

    // OCR can take seconds per page; keep it off the async workers
    let extractor = state.extractor.clone();
    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extractor.extract(&data, &name))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let resume_id = state.repo.insert_resume(&filename, &text).await?;

    Ok(Json(UploadResumeResponse {
        resume_text: text,
        resume_id,
    }))
}

/// POST /resume_summary
pub async fn handle_resume_summary(
    payload: Result<Json<ResumeSummaryRequest>, JsonRejection>,
) -> Result<Json<ResumeSummaryResponse>, AppError> {
    let Json(request) = payload?;
    let resume = required(request.resume, "Resume text is required")?;
    Ok(Json(ResumeSummaryResponse {
        summary: summarize(&resume),
    }))
}

/// GET /resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeListItem>>, AppError> {
    let rows = state.repo.list_resumes().await?;
    Ok(Json(
        rows.into_iter()
            .map(|r| ResumeListItem {
                id: r.id,
                filename: r.filename,
                content: preview(&r.content),
            })
            .collect(),
    ))
}
