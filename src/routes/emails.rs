use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::insights::{self, InsightsReport},
    email::{normalized::NormalizedEmail, summary::EmailSummary},
    error::{AppError, AppJsonResult, AppResult},
    server_config::cfg,
    ServerState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeEmailsRequest {
    pub emails: Vec<NormalizedEmail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeEmailsResponse {
    pub emails: Vec<EmailSummary>,
    pub total: usize,
    pub unread_count: usize,
}

/// # POST /api/emails/analyze
///
/// Runs the per-email analysis pipeline over a batch of normalized emails
/// and returns them classified, newest first.
pub async fn analyze_emails(
    State(state): State<ServerState>,
    Json(req): Json<AnalyzeEmailsRequest>,
) -> AppJsonResult<AnalyzeEmailsResponse> {
    let summaries = analyze_batch(&state, req.emails).await?;
    let unread_count = summaries.iter().filter(|e| e.is_unread).count();

    Ok(Json(AnalyzeEmailsResponse {
        total: summaries.len(),
        unread_count,
        emails: summaries,
    }))
}

/// # POST /api/emails/insights
///
/// Analyzes a batch of normalized emails and aggregates mailbox-level
/// insights, recommendations, and stats.
pub async fn email_insights(
    State(state): State<ServerState>,
    Json(req): Json<AnalyzeEmailsRequest>,
) -> AppJsonResult<InsightsReport> {
    let summaries = analyze_batch(&state, req.emails).await?;
    Ok(Json(insights::aggregate(&summaries)))
}

async fn analyze_batch(
    state: &ServerState,
    emails: Vec<NormalizedEmail>,
) -> AppResult<Vec<EmailSummary>> {
    let max = cfg.settings.max_batch_size;
    if emails.len() > max {
        return Err(AppError::BadRequest(format!(
            "Batch of {} emails exceeds the limit of {}",
            emails.len(),
            max
        )));
    }

    Ok(state.analyzer.analyze_batch(emails).await)
}
