use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

/// A report against a piece of platform content awaiting moderation.
/// Flags transition out of `pending` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlaggedContent {
    pub id: i64,
    pub content_type: String,
    pub content_id: i64,
    pub reported_by: String,
    pub reason: String,
    pub severity: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Action keywords accepted by the resolve endpoint, mapped to the status
/// they persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAction {
    Approve,
    Reject,
    SuspendUser,
    WarnUser,
}

impl FlagAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(FlagAction::Approve),
            "reject" => Some(FlagAction::Reject),
            "suspend_user" => Some(FlagAction::SuspendUser),
            "warn_user" => Some(FlagAction::WarnUser),
            _ => None,
        }
    }

    pub fn resulting_status(self) -> &'static str {
        match self {
            FlagAction::Approve => "approved",
            FlagAction::Reject => "rejected",
            FlagAction::SuspendUser | FlagAction::WarnUser => "action_taken",
        }
    }

    /// Actions against a user trigger an admin-channel notification.
    pub fn notifies_admins(self) -> bool {
        matches!(self, FlagAction::SuspendUser | FlagAction::WarnUser)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlagAction::Approve => "approve",
            FlagAction::Reject => "reject",
            FlagAction::SuspendUser => "suspend_user",
            FlagAction::WarnUser => "warn_user",
        }
    }
}

impl FlaggedContent {
    pub async fn find_all(
        pool: &MySqlPool,
        status: Option<&str>,
    ) -> Result<Vec<FlaggedContent>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, FlaggedContent>(
                    "SELECT * FROM flagged_content WHERE status = ? ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, FlaggedContent>(
                    "SELECT * FROM flagged_content ORDER BY created_at DESC",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn find_by_id(
        pool: &MySqlPool,
        id: i64,
    ) -> Result<Option<FlaggedContent>, sqlx::Error> {
        sqlx::query_as::<_, FlaggedContent>("SELECT * FROM flagged_content WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a pending flag to its terminal status. The status guard in the
    /// WHERE clause makes resolution first-write-wins under concurrency:
    /// 0 affected rows means the flag was already resolved.
    pub async fn resolve(
        pool: &MySqlPool,
        id: i64,
        status: &str,
        resolved_by: &str,
        resolution_notes: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE flagged_content \
             SET status = ?, resolved_by = ?, resolution_notes = ?, resolved_at = NOW() \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(status)
        .bind(resolved_by)
        .bind(resolution_notes)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn assign(pool: &MySqlPool, id: i64, username: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE flagged_content SET assigned_to = ? WHERE id = ?")
            .bind(username)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_keywords_map_to_statuses() {
        assert_eq!(FlagAction::parse("approve").unwrap().resulting_status(), "approved");
        assert_eq!(FlagAction::parse("reject").unwrap().resulting_status(), "rejected");
        assert_eq!(
            FlagAction::parse("suspend_user").unwrap().resulting_status(),
            "action_taken"
        );
        assert_eq!(
            FlagAction::parse("warn_user").unwrap().resulting_status(),
            "action_taken"
        );
        assert!(FlagAction::parse("escalate").is_none());
    }

    #[test]
    fn only_user_actions_notify_admins() {
        assert!(!FlagAction::Approve.notifies_admins());
        assert!(!FlagAction::Reject.notifies_admins());
        assert!(FlagAction::SuspendUser.notifies_admins());
        assert!(FlagAction::WarnUser.notifies_admins());
    }
}
