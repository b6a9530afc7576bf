use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool, Row};

/// A user's rating of a support interaction, attributed to the responding
/// agent and optionally tied to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserFeedback {
    pub id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub feedback: Option<String>,
    pub responded_to_by: String,
    pub ticket_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl UserFeedback {
    pub async fn create(
        pool: &MySqlPool,
        user_id: i64,
        rating: i32,
        feedback: Option<&str>,
        responded_to_by: &str,
        ticket_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_feedback (user_id, rating, feedback, responded_to_by, ticket_id, created_at) \
             VALUES (?, ?, ?, ?, ?, NOW())",
        )
        .bind(user_id)
        .bind(rating)
        .bind(feedback)
        .bind(responded_to_by)
        .bind(ticket_id)
        .execute(pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_all(pool: &MySqlPool) -> Result<Vec<UserFeedback>, sqlx::Error> {
        sqlx::query_as::<_, UserFeedback>("SELECT * FROM user_feedback ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_agent(
        pool: &MySqlPool,
        agent_username: &str,
    ) -> Result<Vec<UserFeedback>, sqlx::Error> {
        sqlx::query_as::<_, UserFeedback>(
            "SELECT * FROM user_feedback WHERE responded_to_by = ? ORDER BY created_at DESC",
        )
        .bind(agent_username)
        .fetch_all(pool)
        .await
    }

    /// Average rating over all of an agent's feedback; None when the agent
    /// has none.
    pub async fn average_rating_for(
        pool: &MySqlPool,
        agent_username: &str,
    ) -> Result<Option<f64>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT CAST(AVG(rating) AS DOUBLE) AS average_rating FROM user_feedback WHERE responded_to_by = ?",
        )
        .bind(agent_username)
        .fetch_one(pool)
        .await?;

        row.try_get::<Option<f64>, _>("average_rating")
    }
}
