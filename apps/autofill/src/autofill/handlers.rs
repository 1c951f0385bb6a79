use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::autofill::engine::AutofillEngine;
use crate::autofill::platform::{detect, Platform};
use crate::autofill::stats::{FieldReport, RunStats};
use crate::dom::Document;
use crate::errors::AppError;
use crate::state::AppState;

/// Profile key used when the caller does not name a user.
pub const DEFAULT_USER_ID: &str = "default";

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub url: String,
    pub html: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub platform: Platform,
    pub stats: RunStats,
    pub fields: Vec<FieldReport>,
    /// The page after filling, with live values reflected into the markup.
    pub html: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRequest {
    pub url: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct PlatformResponse {
    pub platform: Platform,
}

fn validate_page(url: &str, html: &str) -> Result<(), AppError> {
    if url.trim().is_empty() {
        return Err(AppError::Validation("url must not be empty".to_string()));
    }
    if html.trim().is_empty() {
        return Err(AppError::Validation("html must not be empty".to_string()));
    }
    Ok(())
}

/// POST /api/v1/autofill/deploy
/// Loads the user's profile, then runs one full autofill pass over the page.
pub async fn handle_deploy(
    State(state): State<AppState>,
    Json(req): Json<DeployRequest>,
) -> Result<Json<DeployResponse>, AppError> {
    validate_page(&req.url, &req.html)?;
    let user_id = req
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_USER_ID);

    let mut engine = AutofillEngine::from_store(state.profile_store.as_ref(), user_id).await;
    let mut document = Document::parse(&req.url, &req.html)?;
    let platform = engine.init(&document);
    let stats = engine.process_all_forms(&mut document);

    info!(%platform, user_id, fields = engine.field_reports().len(), "Autofill deployed");

    Ok(Json(DeployResponse {
        platform,
        stats,
        fields: engine.field_reports().to_vec(),
        html: document.to_html(),
        processed_at: Utc::now(),
    }))
}

/// POST /api/v1/autofill/platform
pub async fn handle_platform(
    Json(req): Json<PlatformRequest>,
) -> Result<Json<PlatformResponse>, AppError> {
    validate_page(&req.url, &req.html)?;
    let document = Document::parse(&req.url, &req.html)?;
    Ok(Json(PlatformResponse {
        platform: detect(&document),
    }))
}
