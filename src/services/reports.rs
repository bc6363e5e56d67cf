//! Report generation and retrieval.
//!
//! Reports are JSON artifacts in a shared directory, append-only: each
//! generation writes a new timestamped file and "latest" is the
//! lexicographically maximal matching filename.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::report::Report,
    store::Store,
};

#[derive(Clone)]
pub struct ReportsService {
    store: Arc<dyn Store>,
    dir: PathBuf,
}

impl ReportsService {
    pub fn new(store: Arc<dyn Store>, dir: String) -> Self {
        Self {
            store,
            dir: PathBuf::from(dir),
        }
    }

    /// Aggregate the library counts and persist them as a new artifact.
    /// Runs inside the job worker; callers of the HTTP trigger never see
    /// this result directly.
    pub async fn generate(&self) -> AppResult<(Report, PathBuf)> {
        let report = Report {
            total_authors: self.store.count_authors().await?,
            total_books: self.store.count_books().await?,
            total_books_borrowed: self.store.count_outstanding_borrows().await?,
            timestamp: Utc::now(),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create reports dir: {}", e)))?;

        let path = self.dir.join(report.filename());
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Internal(format!("Failed to serialize report: {}", e)))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write report: {}", e)))?;

        tracing::info!(path = %path.display(), "library report generated");
        Ok((report, path))
    }

    /// Read back the most recent artifact. No caching: every call rescans
    /// the directory.
    pub async fn latest(&self) -> AppResult<Report> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(
                    "No reports have been generated yet.".to_string(),
                ))
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read reports dir: {}",
                    e
                )))
            }
        };

        let mut latest: Option<String> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read reports dir: {}", e)))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("report_") && name.ends_with(".json") {
                if latest.as_deref().map_or(true, |l| name.as_str() > l) {
                    latest = Some(name);
                }
            }
        }

        let name = latest.ok_or_else(|| AppError::NotFound("No reports found.".to_string()))?;

        let content = tokio::fs::read_to_string(self.dir.join(&name))
            .await
            .map_err(|e| AppError::Internal(format!("Error reading report: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Internal(format!("Error reading report: {}", e)))
    }
}
