use crate::domain::models::{AuthorSummary, CommentView};
use crate::error::{EngagementError, EngagementResult};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    body: String,
    created_at: chrono::DateTime<chrono::Utc>,
    author_id: i64,
    author_username: String,
    author_name: String,
    author_profile_image_ref: Option<String>,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        CommentView {
            id: row.id,
            post_id: row.post_id,
            author: AuthorSummary::new(
                row.author_id,
                row.author_username,
                row.author_name,
                row.author_profile_image_ref,
            ),
            body: row.body,
            created_at: row.created_at,
        }
    }
}

/// Repository for comments
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a comment and read it back joined with its author in the same
    /// statement. A post deleted concurrently surfaces as the FK violation
    /// and is reported as not-found, never as a stray storage fault.
    pub async fn insert(
        &self,
        post_id: i64,
        author_id: i64,
        body: &str,
    ) -> EngagementResult<CommentView> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, body, created_at
            )
            SELECT i.id, i.post_id, i.body, i.created_at,
                   u.id AS author_id,
                   u.username AS author_username,
                   u.name AS author_name,
                   u.profile_image_ref AS author_profile_image_ref
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EngagementError::from_insert(e, "comment", "post or user"))?;

        Ok(row.into())
    }

    /// Comments for a post, newest first, each with the commenting user's
    /// public projection. An empty result is a valid, successful result.
    pub async fn for_post(&self, post_id: i64) -> EngagementResult<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.body, c.created_at,
                   u.id AS author_id,
                   u.username AS author_username,
                   u.name AS author_name,
                   u.profile_image_ref AS author_profile_image_ref
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
