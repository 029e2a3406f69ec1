use crate::domain::models::FollowEdge;
use crate::error::{EngagementError, EngagementResult};
use sqlx::PgPool;

/// Repository for follow edges
#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomic insert-if-absent. The existence check and the insert are one
    /// statement, so two concurrent identical attempts cannot both pass a
    /// check-then-act gap: exactly one inserts, the other sees `None`.
    pub async fn insert(
        &self,
        follower_id: i64,
        followed_id: i64,
    ) -> EngagementResult<Option<FollowEdge>> {
        let edge = sqlx::query_as::<_, FollowEdge>(
            r#"
            INSERT INTO follows (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            RETURNING follower_id, followed_id, created_at
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngagementError::from_insert(e, "follow", "user"))?;

        Ok(edge)
    }

    /// Idempotent delete; returns true if an edge was removed.
    pub async fn delete(&self, follower_id: i64, followed_id: i64) -> EngagementResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followed_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    /// Ids of users following `user_id`. Ordered by edge age so a
    /// LIMIT/OFFSET pair can be added without changing the interface.
    pub async fn follower_ids(&self, user_id: i64) -> EngagementResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT follower_id
            FROM follows
            WHERE followed_id = $1
            ORDER BY created_at, follower_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Ids of users that `user_id` follows.
    pub async fn following_ids(&self, user_id: i64) -> EngagementResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT followed_id
            FROM follows
            WHERE follower_id = $1
            ORDER BY created_at, followed_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
