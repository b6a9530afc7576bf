use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::config;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::support_activity::{activity_types, SupportActivity};
use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};
use crate::models::ticket_response::TicketResponse;
use crate::realtime::RealtimeEvent;
use crate::services::client::ServiceError;
use crate::services::notifications;
use crate::state::AppState;

/// Roles the user-service may report for a user to be a valid assignment
/// target. Deliberately the literal string set, not the tier ordering: a
/// generic `admin` is not an assignable support worker.
const ASSIGNABLE_ROLES: [&str; 3] = ["support_agent", "support_lead", "support_admin"];

/// A ticket enriched with the owning user's profile from the user-service.
/// `user` is None when the per-row profile fetch degraded.
#[derive(Debug, Serialize)]
pub struct EnrichedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub user: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub user: Option<Value>,
    pub responses: Vec<TicketResponse>,
}

/// GET /api/support/tickets - list tickets with best-effort user profiles.
/// A failed profile fetch degrades that row instead of failing the listing.
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<EnrichedTicket>> {
    let tickets = Ticket::find_all(&state.pool).await?;

    let mut enriched = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let user = fetch_user_profile(&state, &auth.token, ticket.user_id).await;
        enriched.push(EnrichedTicket { ticket, user });
    }

    Ok(ApiResponse::success(enriched))
}

/// GET /api/support/tickets/:id - one ticket with its responses in
/// chronological order.
pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<TicketDetail> {
    let ticket = Ticket::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    let responses = TicketResponse::find_by_ticket(&state.pool, id).await?;
    let user = fetch_user_profile(&state, &auth.token, ticket.user_id).await;

    Ok(ApiResponse::success(TicketDetail {
        ticket,
        user,
        responses,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: Option<String>,
    pub responder_username: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub is_internal: bool,
}

/// POST /api/support/tickets/:id/respond
///
/// Appends a response, applies optional status/priority changes and writes
/// the audit entry in one transaction, then notifies the ticket owner
/// (best-effort) and broadcasts `ticket_updated`. The notification step
/// never fails the request.
pub async fn respond_to_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RespondRequest>,
) -> ApiResult<Value> {
    let response_text = match payload.response.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return Err(ApiError::bad_request("Response text is required")),
    };

    let status = payload
        .status
        .as_deref()
        .map(|s| {
            TicketStatus::parse(s)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid status '{}'", s)))
        })
        .transpose()?;

    let priority = payload
        .priority
        .as_deref()
        .map(|p| {
            TicketPriority::parse(p)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid priority '{}'", p)))
        })
        .transpose()?;

    let ticket = Ticket::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    let responder = payload
        .responder_username
        .unwrap_or_else(|| auth.username.clone());

    let mut tx = state.pool.begin().await?;

    let response_id = TicketResponse::create(
        &mut *tx,
        id,
        &responder,
        &response_text,
        payload.is_internal,
    )
    .await?;

    if let Some(status) = status {
        Ticket::update_status(&mut *tx, id, status).await?;
    }
    if let Some(priority) = priority {
        Ticket::update_priority(&mut *tx, id, priority).await?;
    }

    SupportActivity::record(
        &mut *tx,
        &responder,
        activity_types::RESPONSE_SENT,
        Some(id),
        Some("ticket"),
        Some(&format!("Responded to ticket #{}", id)),
    )
    .await?;

    tx.commit().await?;

    // Owner notification is best-effort; a down communication-service must
    // not fail the response that was already committed.
    if let crate::services::client::FetchOutcome::Degraded(reason) = notifications::notify_ticket_owner(
        &state.services,
        &auth.token,
        ticket.user_id,
        id,
        &ticket.subject,
    )
    .await
    {
        warn!("ticket owner notification skipped: {}", reason);
    }

    state.broadcaster.publish(RealtimeEvent::TicketUpdated {
        ticket_id: id,
        status: status.map(|s| s.as_str().to_string()),
        priority: priority.map(|p| p.as_str().to_string()),
    });

    Ok(ApiResponse::success(json!({
        "ticket_id": id,
        "response_id": response_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// PUT /api/support/tickets/:id/status - lead-tier status transition. Any
/// valid status may be set from any other; there is no transition table.
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Value> {
    let status = payload
        .status
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Status is required"))?;
    let status = TicketStatus::parse(status)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid status '{}'", status)))?;

    let affected = Ticket::update_status(&state.pool, id, status).await?;
    if affected == 0 {
        return Err(ApiError::not_found("Ticket not found"));
    }

    // Audit writes are best-effort and never roll back the mutation.
    if let Err(e) = SupportActivity::record(
        &state.pool,
        &auth.username,
        activity_types::STATUS_UPDATED,
        Some(id),
        Some("ticket"),
        Some(&format!("Status changed to {}", status.as_str())),
    )
    .await
    {
        warn!("audit write failed for status update: {}", e);
    }

    state.broadcaster.publish(RealtimeEvent::TicketStatusUpdated {
        ticket_id: id,
        status: status.as_str().to_string(),
    });

    Ok(ApiResponse::success(json!({
        "ticket_id": id,
        "status": status.as_str(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    pub username: Option<String>,
}

/// PUT /api/support/tickets/:id/assign - lead-tier assignment to a
/// validated support-tier user.
///
/// The target's role comes from the user-service. Targets the user-service
/// rejects (unknown username, any 4xx) fail validation with 400, the same
/// as a wrong role; only an unreachable or failing user-service surfaces
/// as 502, so callers can tell "try again later" apart from "pick a
/// different user".
pub async fn assign_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignTicketRequest>,
) -> ApiResult<Value> {
    let username = match payload.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::bad_request("Username is required")),
    };

    let url = format!(
        "{}/api/users/by-username/{}",
        config::config().services.user_service_url,
        username
    );
    let body = match state
        .services
        .get_json("user-service", &url, &auth.token)
        .await
    {
        Ok(body) => body,
        // A 4xx verdict on the target is the user-service saying "no such
        // assignable user", which is bad input, not an outage.
        Err(ServiceError::BadStatus { status, .. }) if (400..500).contains(&status) => {
            return Err(ApiError::bad_request(format!(
                "'{}' is not a valid support agent",
                username
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let role = body
        .get("user")
        .and_then(|u| u.get("role"))
        .and_then(|r| r.as_str())
        .ok_or_else(|| ApiError::bad_gateway("user-service returned a malformed response"))?;

    if !ASSIGNABLE_ROLES.contains(&role) {
        return Err(ApiError::bad_request(format!(
            "'{}' is not a valid support agent",
            username
        )));
    }

    let affected = Ticket::assign(&state.pool, id, &username).await?;
    if affected == 0 {
        return Err(ApiError::not_found("Ticket not found"));
    }

    if let Err(e) = SupportActivity::record(
        &state.pool,
        &auth.username,
        activity_types::TICKET_ASSIGNED,
        Some(id),
        Some("ticket"),
        Some(&format!("Assigned to {}", username)),
    )
    .await
    {
        warn!("audit write failed for ticket assignment: {}", e);
    }

    Ok(ApiResponse::success(json!({
        "ticket_id": id,
        "assigned_to": username,
    })))
}

/// Best-effort per-row profile fetch from the user-service.
async fn fetch_user_profile(state: &AppState, bearer: &str, user_id: i64) -> Option<Value> {
    let url = format!(
        "{}/api/users/{}",
        config::config().services.user_service_url,
        user_id
    );

    state
        .services
        .get_json_degraded("user-service", &url, bearer)
        .await
        .into_option()
        .and_then(|body| body.get("user").cloned())
}
