use crate::domain::models::LikeEdge;
use crate::error::{EngagementError, EngagementResult};
use sqlx::PgPool;

/// Repository for like edges
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomic insert-if-absent; `Ok(None)` means the edge already existed.
    pub async fn insert(&self, user_id: i64, post_id: i64) -> EngagementResult<Option<LikeEdge>> {
        let edge = sqlx::query_as::<_, LikeEdge>(
            r#"
            INSERT INTO likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING user_id, post_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngagementError::from_insert(e, "like", "user or post"))?;

        Ok(edge)
    }

    /// Idempotent delete; returns true if an edge was removed.
    pub async fn delete(&self, user_id: i64, post_id: i64) -> EngagementResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    /// Ids of users who liked a post.
    pub async fn liker_ids(&self, post_id: i64) -> EngagementResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT user_id
            FROM likes
            WHERE post_id = $1
            ORDER BY created_at, user_id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
