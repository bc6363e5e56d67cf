//! Report endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::report::Report};

use super::AuthenticatedUser;

/// Acknowledgment for an enqueued report job
#[derive(Serialize, ToSchema)]
pub struct GenerateReportResponse {
    pub message: String,
    /// Opaque job reference; there is no endpoint to wait on it
    pub task_id: Uuid,
}

/// Trigger asynchronous report generation. The caller only ever observes
/// the acknowledgment; the job outcome is recorded by the worker.
#[utoipa::path(
    post,
    path = "/reports/generate",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 202, description = "Report generation started", body = GenerateReportResponse),
        (status = 500, description = "Failed to enqueue the job")
    )
)]
pub async fn generate_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<(StatusCode, Json<GenerateReportResponse>)> {
    let handle = state.services.jobs.submit_report_generation()?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateReportResponse {
            message: "Report generation started.".to_string(),
            task_id: handle.id,
        }),
    ))
}

/// Retrieve the most recently generated report
#[utoipa::path(
    get,
    path = "/reports/latest",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Latest report", body = Report),
        (status = 404, description = "No reports generated yet"),
        (status = 500, description = "Report unreadable")
    )
)]
pub async fn latest_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Report>> {
    let report = state.services.reports.latest().await?;
    Ok(Json(report))
}
