//! Best-effort notifications through the communication-service. Failures
//! here never fail the request that triggered them; callers log and move on.

use serde_json::json;

use crate::config;
use crate::models::flagged_content::FlaggedContent;
use crate::services::client::{FetchOutcome, ServiceClient};

/// Notify a ticket's owning user that an agent responded.
pub async fn notify_ticket_owner(
    client: &ServiceClient,
    bearer: &str,
    user_id: i64,
    ticket_id: i64,
    subject: &str,
) -> FetchOutcome {
    let url = format!(
        "{}/api/communication/notifications",
        config::config().services.communication_service_url
    );

    client
        .post_json_degraded(
            "communication-service",
            &url,
            bearer,
            json!({
                "user_id": user_id,
                "type": "ticket_response",
                "title": "Support ticket update",
                "message": format!("An agent responded to your ticket #{}: {}", ticket_id, subject),
            }),
        )
        .await
}

/// Post a moderation summary to the administrative channel. Sent only for
/// flag resolutions that act against a user (suspend/warn).
pub async fn notify_admin_channel(
    client: &ServiceClient,
    bearer: &str,
    flag: &FlaggedContent,
    action: &str,
    notes: Option<&str>,
) -> FetchOutcome {
    let url = format!(
        "{}/api/communication/channels/admin/messages",
        config::config().services.communication_service_url
    );

    client
        .post_json_degraded(
            "communication-service",
            &url,
            bearer,
            json!({
                "type": "moderation_action",
                "message": moderation_summary(flag, action, notes),
            }),
        )
        .await
}

/// Human-readable summary embedding the flag's type, reason, severity and
/// the resolving agent's notes.
pub fn moderation_summary(flag: &FlaggedContent, action: &str, notes: Option<&str>) -> String {
    let notes = match notes {
        Some(n) if !n.trim().is_empty() => n,
        _ => "No additional notes provided",
    };

    format!(
        "Moderation action '{}' taken on {} #{}. Reason: {}. Severity: {}. Agent notes: {}",
        action, flag.content_type, flag.content_id, flag.reason, flag.severity, notes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_flag() -> FlaggedContent {
        FlaggedContent {
            id: 3,
            content_type: "listing".to_string(),
            content_id: 42,
            reported_by: "user9".to_string(),
            reason: "misleading photos".to_string(),
            severity: "high".to_string(),
            status: "pending".to_string(),
            assigned_to: None,
            resolved_by: None,
            resolution_notes: None,
            resolved_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summary_embeds_flag_fields_and_notes() {
        let text = moderation_summary(&sample_flag(), "suspend_user", Some("repeat offender"));
        assert!(text.contains("suspend_user"));
        assert!(text.contains("listing"));
        assert!(text.contains("misleading photos"));
        assert!(text.contains("high"));
        assert!(text.contains("repeat offender"));
    }

    #[test]
    fn summary_falls_back_when_notes_empty() {
        let text = moderation_summary(&sample_flag(), "warn_user", Some("   "));
        assert!(text.contains("No additional notes provided"));

        let text = moderation_summary(&sample_flag(), "warn_user", None);
        assert!(text.contains("No additional notes provided"));
    }
}
