pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod services;
pub mod state;

use axum::http::HeaderValue;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ws", get(realtime::ws_handler))
        .merge(public_faq_routes())
        .merge(support_routes(state.clone()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_faq_routes() -> Router<AppState> {
    use handlers::faqs;

    Router::new()
        .route("/api/support/faqs", get(faqs::list_faqs))
        .route("/api/support/faqs/:id", get(faqs::get_faq))
        .route("/api/support/faqs/:id/helpful", post(faqs::mark_helpful))
}

/// Staff routes: the auth gate runs first on every route, then the
/// per-tier role gate.
fn support_routes(state: AppState) -> Router<AppState> {
    use handlers::{activity, faqs, flags, reviews, tickets};
    use middleware::role;

    let agent = Router::new()
        .route("/api/support/tickets", get(tickets::list_tickets))
        .route("/api/support/tickets/:id", get(tickets::get_ticket))
        .route(
            "/api/support/tickets/:id/respond",
            post(tickets::respond_to_ticket),
        )
        .route("/api/support/faqs", post(faqs::create_faq))
        .route("/api/support/faqs/:id", put(faqs::update_faq))
        .route("/api/support/flagged-content", get(flags::list_flags))
        .route(
            "/api/support/flagged-content/:id/resolve",
            put(flags::resolve_flag),
        )
        .route("/api/support/reviews", post(reviews::create_review))
        .route(
            "/api/support/reviews/agent/:username",
            get(reviews::agent_reviews),
        )
        .route("/api/support/activity/recent", get(activity::recent_activity))
        .route(
            "/api/support/activity/agent/:username",
            get(activity::agent_activity),
        )
        .route(
            "/api/support/events/activity",
            post(activity::relay_activity_event),
        )
        .route_layer(axum_middleware::from_fn(role::require_agent));

    let lead = Router::new()
        .route(
            "/api/support/tickets/:id/status",
            put(tickets::update_ticket_status),
        )
        .route(
            "/api/support/tickets/:id/assign",
            put(tickets::assign_ticket),
        )
        .route("/api/support/faqs/:id", delete(faqs::delete_faq))
        .route(
            "/api/support/flagged-content/:id/assign",
            put(flags::assign_flag),
        )
        .route("/api/support/reviews", get(reviews::list_reviews))
        .route("/api/support/analytics/team", get(activity::team_analytics))
        .route_layer(axum_middleware::from_fn(role::require_lead));

    agent.merge(lead).route_layer(axum_middleware::from_fn_with_state(
        state,
        middleware::auth::auth_gate,
    ))
}

fn cors_layer() -> CorsLayer {
    let origin = &config::config().security.cors_origin;

    if origin == "*" {
        return CorsLayer::permissive();
    }

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!("invalid CORS_ORIGIN '{}', allowing any origin", origin);
            CorsLayer::permissive()
        }
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Support API",
            "version": version,
            "description": "Support ticket and moderation backend for the real-estate platform",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "realtime": "/ws (public)",
                "faqs": "/api/support/faqs[/:id] (public read, staff write)",
                "tickets": "/api/support/tickets[/:id] (staff)",
                "flags": "/api/support/flagged-content[/:id] (staff)",
                "reviews": "/api/support/reviews (staff)",
                "activity": "/api/support/activity/* (staff)",
                "analytics": "/api/support/analytics/team (lead)",
            }
        }
    }))
}

/// Liveness probe: always 200. Readiness (database, sibling services) is
/// deliberately not checked here.
async fn health() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "service": "support-api",
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}
