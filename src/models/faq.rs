use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

/// Knowledge-base article. The views and helpful_count columns are plain
/// counters with no per-viewer de-duplication; repeated reads and repeated
/// helpful votes each count. That matches the platform's observed behavior
/// and is documented as such rather than "fixed".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub id: i64,
    pub title: String,
    pub answer: String,
    pub category: Option<String>,
    pub video_url: Option<String>,
    pub author_username: String,
    pub is_published: bool,
    pub views: i64,
    pub helpful_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Faq {
    pub async fn find_published(
        pool: &MySqlPool,
        category: Option<&str>,
    ) -> Result<Vec<Faq>, sqlx::Error> {
        match category {
            Some(category) => {
                sqlx::query_as::<_, Faq>(
                    "SELECT * FROM faqs WHERE is_published = TRUE AND category = ? ORDER BY created_at DESC",
                )
                .bind(category)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Faq>(
                    "SELECT * FROM faqs WHERE is_published = TRUE ORDER BY created_at DESC",
                )
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Fetch one article, bumping its view counter as a side effect of the
    /// read. Every read counts.
    pub async fn find_by_id_and_count_view(
        pool: &MySqlPool,
        id: i64,
    ) -> Result<Option<Faq>, sqlx::Error> {
        sqlx::query("UPDATE faqs SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Increment the helpful counter. Returns affected rows (0 = no such faq).
    pub async fn mark_helpful(pool: &MySqlPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE faqs SET helpful_count = helpful_count + 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn create(
        pool: &MySqlPool,
        title: &str,
        answer: &str,
        category: Option<&str>,
        video_url: Option<&str>,
        author_username: &str,
        is_published: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO faqs (title, answer, category, video_url, author_username, is_published, views, helpful_count, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, 0, NOW(), NOW())",
        )
        .bind(title)
        .bind(answer)
        .bind(category)
        .bind(video_url)
        .bind(author_username)
        .bind(is_published)
        .execute(pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Update an article. `is_published` is optional: None leaves the
    /// stored publication state untouched.
    pub async fn update(
        pool: &MySqlPool,
        id: i64,
        title: &str,
        answer: &str,
        category: Option<&str>,
        video_url: Option<&str>,
        is_published: Option<bool>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE faqs SET title = ?, answer = ?, category = ?, video_url = ?, \
             is_published = COALESCE(?, is_published), updated_at = NOW() \
             WHERE id = ?",
        )
        .bind(title)
        .bind(answer)
        .bind(category)
        .bind(video_url)
        .bind(is_published)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &MySqlPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
