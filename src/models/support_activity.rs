use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlExecutor, MySqlPool};

/// Activity type constants written by the controllers.
pub mod activity_types {
    pub const RESPONSE_SENT: &str = "response_sent";
    pub const STATUS_UPDATED: &str = "status_updated";
    pub const TICKET_ASSIGNED: &str = "ticket_assigned";
    pub const FLAG_RESOLVED: &str = "flag_resolved";
    pub const FLAG_ASSIGNED: &str = "flag_assigned";
    pub const FAQ_CREATED: &str = "faq_created";
    pub const FAQ_UPDATED: &str = "faq_updated";
    pub const FAQ_DELETED: &str = "faq_deleted";
    pub const FEEDBACK_RECEIVED: &str = "feedback_received";
}

/// Append-only audit record of staff actions. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportActivity {
    pub id: i64,
    pub agent_username: String,
    pub activity_type: String,
    pub target_id: Option<i64>,
    pub target_type: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SupportActivity {
    pub async fn record<'e, E: MySqlExecutor<'e>>(
        db: E,
        agent_username: &str,
        activity_type: &str,
        target_id: Option<i64>,
        target_type: Option<&str>,
        details: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO support_activities (agent_username, activity_type, target_id, target_type, details, created_at) \
             VALUES (?, ?, ?, ?, ?, NOW())",
        )
        .bind(agent_username)
        .bind(activity_type)
        .bind(target_id)
        .bind(target_type)
        .bind(details)
        .execute(db)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_recent(
        pool: &MySqlPool,
        limit: i64,
    ) -> Result<Vec<SupportActivity>, sqlx::Error> {
        sqlx::query_as::<_, SupportActivity>(
            "SELECT * FROM support_activities ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_agent(
        pool: &MySqlPool,
        agent_username: &str,
    ) -> Result<Vec<SupportActivity>, sqlx::Error> {
        sqlx::query_as::<_, SupportActivity>(
            "SELECT * FROM support_activities WHERE agent_username = ? ORDER BY created_at DESC",
        )
        .bind(agent_username)
        .fetch_all(pool)
        .await
    }
}
