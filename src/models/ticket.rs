use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlExecutor, MySqlPool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TicketPriority::Low),
            "medium" => Some(TicketPriority::Medium),
            "high" => Some(TicketPriority::High),
            "urgent" => Some(TicketPriority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }
}

impl Ticket {
    pub async fn find_all(pool: &MySqlPool) -> Result<Vec<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &MySqlPool, id: i64) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set status, stamping resolved_at the first time a ticket resolves.
    /// Returns the number of affected rows (0 when the ticket is missing).
    pub async fn update_status<'e, E: MySqlExecutor<'e>>(
        db: E,
        id: i64,
        status: TicketStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets \
             SET status = ?, \
                 resolved_at = IF(? = 'resolved' AND resolved_at IS NULL, NOW(), resolved_at), \
                 updated_at = NOW() \
             WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(status.as_str())
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_priority<'e, E: MySqlExecutor<'e>>(
        db: E,
        id: i64,
        priority: TicketPriority,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tickets SET priority = ?, updated_at = NOW() WHERE id = ?")
                .bind(priority.as_str())
                .bind(id)
                .execute(db)
                .await?;

        Ok(result.rows_affected())
    }

    pub async fn assign(pool: &MySqlPool, id: i64, username: &str) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tickets SET assigned_to = ?, updated_at = NOW() WHERE id = ?")
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
    fn status_enumeration_round_trips() {
        for s in ["open", "in_progress", "resolved", "closed"] {
            assert_eq!(TicketStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(TicketStatus::parse("reopened").is_none());
        assert!(TicketStatus::parse("").is_none());
    }

    #[test]
    fn priority_enumeration_round_trips() {
        for p in ["low", "medium", "high", "urgent"] {
            assert_eq!(TicketPriority::parse(p).unwrap().as_str(), p);
        }
        assert!(TicketPriority::parse("critical").is_none());
    }
}
