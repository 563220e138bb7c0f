//! Persistence for resumes, jobs and comparisons.
//!
//! Rows are insert-only. Each call is a single statement, so each logical
//! write commits on its own.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::records::{ComparisonRow, JobRow, ResumeRow};

#[async_trait]
pub trait Repository: Send + Sync {
    async fn insert_resume(&self, filename: &str, content: &str) -> Result<i64, sqlx::Error>;

    async fn insert_job(&self, title: &str, description: &str) -> Result<i64, sqlx::Error>;

    async fn insert_comparison(
        &self,
        resume_id: i64,
        job_id: i64,
        score: f64,
        keywords: &str,
    ) -> Result<i64, sqlx::Error>;

    async fn list_resumes(&self) -> Result<Vec<ResumeRow>, sqlx::Error>;

    async fn list_jobs(&self) -> Result<Vec<JobRow>, sqlx::Error>;

    async fn list_comparisons(&self) -> Result<Vec<ComparisonRow>, sqlx::Error>;
}

pub struct SqlRepository {
    pool: SqlitePool,
}

impl SqlRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqlRepository {
    async fn insert_resume(&self, filename: &str, content: &str) -> Result<i64, sqlx::Error> {
        let id = sqlx::query("INSERT INTO resume (filename, content) VALUES (?, ?)")
            .bind(filename)
            .bind(content)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        info!("Stored resume {filename} with id={id}, length={}", content.len());
        Ok(id)
    }

    async fn insert_job(&self, title: &str, description: &str) -> Result<i64, sqlx::Error> {
        let id = sqlx::query("INSERT INTO job (title, description) VALUES (?, ?)")
            .bind(title)
            .bind(description)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        info!("Stored job '{title}' with id={id}");
        Ok(id)
    }

    async fn insert_comparison(
        &self,
        resume_id: i64,
        job_id: i64,
        score: f64,
        keywords: &str,
    ) -> Result<i64, sqlx::Error> {
        let id = sqlx::query(
            "INSERT INTO comparison (resume_id, job_id, score, keywords) VALUES (?, ?, ?, ?)",
        )
        .bind(resume_id)
        .bind(job_id)
        .bind(score)
        .bind(keywords)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        info!("Stored comparison {id}: resume {resume_id} vs job {job_id} = {score}");
        Ok(id)
    }

    async fn list_resumes(&self) -> Result<Vec<ResumeRow>, sqlx::Error> {
        sqlx::query_as::<_, ResumeRow>("SELECT id, filename, content FROM resume ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    async fn list_jobs(&self) -> Result<Vec<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>("SELECT id, title, description FROM job ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    async fn list_comparisons(&self) -> Result<Vec<ComparisonRow>, sqlx::Error> {
        sqlx::query_as::<_, ComparisonRow>(
            "SELECT id, resume_id, job_id, score, keywords FROM comparison ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }
}
