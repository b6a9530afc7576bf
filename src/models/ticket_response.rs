use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlExecutor, MySqlPool};

/// One agent reply on a ticket. Append-only; rows are never edited.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketResponse {
    pub id: i64,
    pub ticket_id: i64,
    pub responder_username: String,
    pub response: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl TicketResponse {
    pub async fn create<'e, E: MySqlExecutor<'e>>(
        db: E,
        ticket_id: i64,
        responder_username: &str,
        response: &str,
        is_internal: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO ticket_responses (ticket_id, responder_username, response, is_internal, created_at) \
             VALUES (?, ?, ?, ?, NOW())",
        )
        .bind(ticket_id)
        .bind(responder_username)
        .bind(response)
        .bind(is_internal)
        .execute(db)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Responses for a ticket, oldest first.
    pub async fn find_by_ticket(
        pool: &MySqlPool,
        ticket_id: i64,
    ) -> Result<Vec<TicketResponse>, sqlx::Error> {
        sqlx::query_as::<_, TicketResponse>(
            "SELECT * FROM ticket_responses WHERE ticket_id = ? ORDER BY created_at ASC",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }
}
