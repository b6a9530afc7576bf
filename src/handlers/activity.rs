use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rand::Rng;
use serde_json::{json, Value};

use crate::config;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::models::support_activity::SupportActivity;
use crate::realtime::RealtimeEvent;
use crate::state::AppState;

const RECENT_ACTIVITY_LIMIT: i64 = 50;

/// GET /api/support/activity/recent - latest audit entries.
pub async fn recent_activity(State(state): State<AppState>) -> ApiResult<Vec<SupportActivity>> {
    let entries = SupportActivity::find_recent(&state.pool, RECENT_ACTIVITY_LIMIT).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /api/support/activity/agent/:username - one agent's audit trail.
pub async fn agent_activity(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Vec<SupportActivity>> {
    let entries = SupportActivity::find_by_agent(&state.pool, &username).await?;
    Ok(ApiResponse::success(entries))
}

/// POST /api/support/events/activity - relay endpoint for sibling services
/// (the analysis-service in practice) to push `activity_update` events to
/// dashboards connected to this service's socket.
pub async fn relay_activity_event(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    state
        .broadcaster
        .publish(RealtimeEvent::ActivityUpdate { activity: payload });

    Ok(ApiResponse::success(json!({ "broadcast": true })))
}

/// GET /api/support/analytics/team - lead-tier dashboard aggregate.
///
/// Fans out to the user-service (agents and leads) and the analysis-service;
/// all three are required, so any failure surfaces as 502. The metrics
/// block is placeholder data until real aggregation lands in the
/// analysis-service; values are randomized so dashboards render movement.
pub async fn team_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let services = &config::config().services;
    let agents_url = format!("{}/api/users?role=support_agent", services.user_service_url);
    let leads_url = format!("{}/api/users?role=support_lead", services.user_service_url);
    let analysis_url = format!(
        "{}/api/analysis/support/summary",
        services.analysis_service_url
    );

    let (agents, leads, analysis) = tokio::join!(
        state
            .services
            .get_json("user-service", &agents_url, &auth.token),
        state
            .services
            .get_json("user-service", &leads_url, &auth.token),
        state
            .services
            .get_json("analysis-service", &analysis_url, &auth.token),
    );
    let (agents, leads, analysis) = (agents?, leads?, analysis?);

    let agent_list = agents
        .get("users")
        .and_then(|u| u.as_array())
        .cloned()
        .unwrap_or_default();

    Ok(ApiResponse::success(json!({
        "team": {
            "agents": agent_list,
            "leads": leads.get("users").cloned().unwrap_or(Value::Array(vec![])),
        },
        "analysis": analysis,
        "metrics": mock_metrics(&agent_list),
    })))
}

// TODO: replace with real aggregation once the analysis-service exposes
// per-agent resolution stats; tracked as placeholder data until then.
fn mock_metrics(agents: &[Value]) -> Value {
    let mut rng = rand::thread_rng();

    let agent_performance: Vec<Value> = agents
        .iter()
        .map(|agent| {
            json!({
                "username": agent.get("username").cloned().unwrap_or(Value::Null),
                "tickets_resolved": rng.gen_range(3..40),
                "avg_response_minutes": rng.gen_range(10..120),
            })
        })
        .collect();

    json!({
        "active_tickets": rng.gen_range(5..30),
        "avg_response_time_minutes": rng.gen_range(15..90),
        "satisfaction_rate": rng.gen_range(80..100),
        "agent_performance": agent_performance,
        "mock": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_metrics_cover_every_agent() {
        let agents = vec![
            json!({"username": "agent1"}),
            json!({"username": "agent2"}),
        ];
        let metrics = mock_metrics(&agents);

        assert_eq!(metrics["mock"], true);
        assert_eq!(metrics["agent_performance"].as_array().unwrap().len(), 2);
        assert_eq!(metrics["agent_performance"][0]["username"], "agent1");

        let satisfaction = metrics["satisfaction_rate"].as_i64().unwrap();
        assert!((80..100).contains(&satisfaction));
    }
}
