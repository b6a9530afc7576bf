use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::support_activity::{activity_types, SupportActivity};
use crate::models::user_feedback::UserFeedback;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub user_id: Option<i64>,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub responded_to_by: Option<String>,
    pub ticket_id: Option<i64>,
}

/// POST /api/support/reviews - record user feedback about an agent.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<Value> {
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::bad_request("user_id is required"))?;
    let rating = payload
        .rating
        .ok_or_else(|| ApiError::bad_request("rating is required"))?;
    let responded_to_by = match payload.responded_to_by.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::bad_request("responded_to_by is required")),
    };

    let id = UserFeedback::create(
        &state.pool,
        user_id,
        rating,
        payload.feedback.as_deref(),
        &responded_to_by,
        payload.ticket_id,
    )
    .await?;

    if let Err(e) = SupportActivity::record(
        &state.pool,
        &auth.username,
        activity_types::FEEDBACK_RECEIVED,
        Some(id),
        Some("feedback"),
        Some(&format!(
            "Feedback for {} with rating {}",
            responded_to_by, rating
        )),
    )
    .await
    {
        warn!("audit write failed for feedback: {}", e);
    }

    Ok(ApiResponse::created(json!({ "feedback_id": id })))
}

/// GET /api/support/reviews - lead-tier view of all feedback.
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Vec<UserFeedback>> {
    let feedback = UserFeedback::find_all(&state.pool).await?;
    Ok(ApiResponse::success(feedback))
}

/// GET /api/support/reviews/agent/:username - one agent's feedback plus
/// their average rating.
pub async fn agent_reviews(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    let feedback = UserFeedback::find_by_agent(&state.pool, &username).await?;
    let average_rating = UserFeedback::average_rating_for(&state.pool, &username).await?;

    Ok(ApiResponse::success(json!({
        "agent": username,
        "average_rating": average_rating,
        "feedback": feedback,
    })))
}
