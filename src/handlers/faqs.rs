use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::faq::Faq;
use crate::models::support_activity::{activity_types, SupportActivity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FaqListQuery {
    pub category: Option<String>,
}

/// GET /api/support/faqs - public listing of published articles.
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqListQuery>,
) -> ApiResult<Vec<Faq>> {
    let faqs = Faq::find_published(&state.pool, query.category.as_deref()).await?;
    Ok(ApiResponse::success(faqs))
}

/// GET /api/support/faqs/:id - public read. Every read bumps the view
/// counter; there is no per-viewer de-duplication.
pub async fn get_faq(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Faq> {
    let faq = Faq::find_by_id_and_count_view(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("FAQ not found"))?;

    Ok(ApiResponse::success(faq))
}

/// POST /api/support/faqs/:id/helpful - public, unauthenticated vote.
/// Calling it N times adds exactly N; repeat votes count.
pub async fn mark_helpful(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let affected = Faq::mark_helpful(&state.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::not_found("FAQ not found"));
    }

    Ok(ApiResponse::success(json!({ "faq_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct FaqWriteRequest {
    pub title: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub video_url: Option<String>,
    pub is_published: Option<bool>,
}

/// POST /api/support/faqs - agent-tier create.
pub async fn create_faq(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<FaqWriteRequest>,
) -> ApiResult<Value> {
    let (title, answer) = validate_faq_fields(&payload)?;

    let id = Faq::create(
        &state.pool,
        title,
        answer,
        payload.category.as_deref(),
        payload.video_url.as_deref(),
        &auth.username,
        payload.is_published.unwrap_or(true),
    )
    .await?;

    record_faq_activity(&state, &auth, activity_types::FAQ_CREATED, id, title).await;

    Ok(ApiResponse::created(json!({ "faq_id": id })))
}

/// PUT /api/support/faqs/:id - agent-tier update. An omitted
/// `is_published` keeps the stored value; updates never republish
/// implicitly.
pub async fn update_faq(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<FaqWriteRequest>,
) -> ApiResult<Value> {
    let (title, answer) = validate_faq_fields(&payload)?;

    let affected = Faq::update(
        &state.pool,
        id,
        title,
        answer,
        payload.category.as_deref(),
        payload.video_url.as_deref(),
        payload.is_published,
    )
    .await?;
    if affected == 0 {
        return Err(ApiError::not_found("FAQ not found"));
    }

    record_faq_activity(&state, &auth, activity_types::FAQ_UPDATED, id, title).await;

    Ok(ApiResponse::success(json!({ "faq_id": id })))
}

/// DELETE /api/support/faqs/:id - lead-tier delete.
pub async fn delete_faq(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let affected = Faq::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(ApiError::not_found("FAQ not found"));
    }

    record_faq_activity(&state, &auth, activity_types::FAQ_DELETED, id, "").await;

    Ok(ApiResponse::success(json!({ "faq_id": id })))
}

fn validate_faq_fields(payload: &FaqWriteRequest) -> Result<(&str, &str), ApiError> {
    let title = match payload.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ApiError::bad_request("Title is required")),
    };
    let answer = match payload.answer.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a,
        _ => return Err(ApiError::bad_request("Answer is required")),
    };
    Ok((title, answer))
}

async fn record_faq_activity(
    state: &AppState,
    auth: &AuthUser,
    activity_type: &str,
    faq_id: i64,
    title: &str,
) {
    let details = if title.is_empty() {
        format!("FAQ #{}", faq_id)
    } else {
        format!("FAQ #{}: {}", faq_id, title)
    };

    if let Err(e) = SupportActivity::record(
        &state.pool,
        &auth.username,
        activity_type,
        Some(faq_id),
        Some("faq"),
        Some(&details),
    )
    .await
    {
        warn!("audit write failed for {}: {}", activity_type, e);
    }
}
