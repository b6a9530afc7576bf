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
use crate::models::flagged_content::{FlagAction, FlaggedContent};
use crate::models::support_activity::{activity_types, SupportActivity};
use crate::services::notifications;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FlagListQuery {
    pub status: Option<String>,
}

/// GET /api/support/flagged-content - the moderation queue.
pub async fn list_flags(
    State(state): State<AppState>,
    Query(query): Query<FlagListQuery>,
) -> ApiResult<Vec<FlaggedContent>> {
    let flags = FlaggedContent::find_all(&state.pool, query.status.as_deref()).await?;
    Ok(ApiResponse::success(flags))
}

#[derive(Debug, Deserialize)]
pub struct ResolveFlagRequest {
    pub action: Option<String>,
    pub notes: Option<String>,
}

/// PUT /api/support/flagged-content/:id/resolve
///
/// Maps the action keyword to a terminal status and records the resolver.
/// Resolution is first-write-wins: a flag that already left `pending`
/// yields 409. Actions against a user additionally post one summary to the
/// admin channel (best-effort).
pub async fn resolve_flag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ResolveFlagRequest>,
) -> ApiResult<Value> {
    let action = payload
        .action
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Action is required"))?;
    let action = FlagAction::parse(action)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid action '{}'", action)))?;

    let flag = FlaggedContent::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Flagged content not found"))?;

    let affected = FlaggedContent::resolve(
        &state.pool,
        id,
        action.resulting_status(),
        &auth.username,
        payload.notes.as_deref(),
    )
    .await?;
    if affected == 0 {
        return Err(ApiError::conflict("Flag has already been resolved"));
    }

    if let Err(e) = SupportActivity::record(
        &state.pool,
        &auth.username,
        activity_types::FLAG_RESOLVED,
        Some(id),
        Some("flagged_content"),
        Some(&format!("Resolved with action '{}'", action.as_str())),
    )
    .await
    {
        warn!("audit write failed for flag resolution: {}", e);
    }

    if action.notifies_admins() {
        if let crate::services::client::FetchOutcome::Degraded(reason) =
            notifications::notify_admin_channel(
                &state.services,
                &auth.token,
                &flag,
                action.as_str(),
                payload.notes.as_deref(),
            )
            .await
        {
            warn!("admin channel notification skipped: {}", reason);
        }
    }

    Ok(ApiResponse::success(json!({
        "flag_id": id,
        "status": action.resulting_status(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct AssignFlagRequest {
    pub username: Option<String>,
}

/// PUT /api/support/flagged-content/:id/assign - lead-tier assignment.
/// Unlike ticket assignment there is no remote role validation; the
/// platform has always accepted any username here.
pub async fn assign_flag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignFlagRequest>,
) -> ApiResult<Value> {
    let username = match payload.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::bad_request("Username is required")),
    };

    let affected = FlaggedContent::assign(&state.pool, id, &username).await?;
    if affected == 0 {
        return Err(ApiError::not_found("Flagged content not found"));
    }

    if let Err(e) = SupportActivity::record(
        &state.pool,
        &auth.username,
        activity_types::FLAG_ASSIGNED,
        Some(id),
        Some("flagged_content"),
        Some(&format!("Assigned to {}", username)),
    )
    .await
    {
        warn!("audit write failed for flag assignment: {}", e);
    }

    Ok(ApiResponse::success(json!({
        "flag_id": id,
        "assigned_to": username,
    })))
}
