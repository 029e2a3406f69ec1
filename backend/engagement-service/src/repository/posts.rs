use crate::domain::models::{AuthorSummary, FeedPost};
use crate::error::{EngagementError, EngagementResult};
use sqlx::PgPool;

/// One feed row as it comes off the wire: post columns, exact engagement
/// counts, and the author's public columns. Mapped into `FeedPost` so the
/// avatar fallback is applied in one place.
#[derive(sqlx::FromRow)]
struct FeedPostRow {
    id: i64,
    author_id: i64,
    description: Option<String>,
    image_ref: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    like_count: i64,
    comment_count: i64,
    author_username: String,
    author_name: String,
    author_profile_image_ref: Option<String>,
}

impl From<FeedPostRow> for FeedPost {
    fn from(row: FeedPostRow) -> Self {
        FeedPost {
            id: row.id,
            author: AuthorSummary::new(
                row.author_id,
                row.author_username,
                row.author_name,
                row.author_profile_image_ref,
            ),
            description: row.description,
            image_ref: row.image_ref,
            like_count: row.like_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
        }
    }
}

const FEED_COLUMNS: &str = r#"
    p.id, p.author_id, p.description, p.image_ref, p.created_at,
    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
    u.username AS author_username,
    u.name AS author_name,
    u.profile_image_ref AS author_profile_image_ref
"#;

/// Repository for posts and their composed feed views
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post and read it back joined with its author in the same
    /// statement, so the caller observes its own write atomically. Counts on
    /// a row nobody has seen yet are zero by definition.
    pub async fn insert(
        &self,
        author_id: i64,
        description: Option<&str>,
        image_ref: Option<&str>,
    ) -> EngagementResult<FeedPost> {
        let row = sqlx::query_as::<_, FeedPostRow>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (author_id, description, image_ref)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, description, image_ref, created_at
            )
            SELECT i.id, i.author_id, i.description, i.image_ref, i.created_at,
                   0::BIGINT AS like_count,
                   0::BIGINT AS comment_count,
                   u.username AS author_username,
                   u.name AS author_name,
                   u.profile_image_ref AS author_profile_image_ref
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(author_id)
        .bind(description)
        .bind(image_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EngagementError::from_insert(e, "post", "user"))?;

        Ok(row.into())
    }

    /// Newest-first feed page. Ties in `created_at` break by ascending id so
    /// repeated queries paginate stably.
    pub async fn feed_page(&self, limit: i64) -> EngagementResult<Vec<FeedPost>> {
        let rows = sqlx::query_as::<_, FeedPostRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.created_at DESC, p.id ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All of one author's posts, same composition and order as the feed.
    pub async fn by_author(&self, author_id: i64) -> EngagementResult<Vec<FeedPost>> {
        let rows = sqlx::query_as::<_, FeedPostRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = $1
            ORDER BY p.created_at DESC, p.id ASC
            "#
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Single composed post, or `None` when absent.
    pub async fn fetch(&self, post_id: i64) -> EngagementResult<Option<FeedPost>> {
        let row = sqlx::query_as::<_, FeedPostRow>(&format!(
            r#"
            SELECT {FEED_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn exists(&self, post_id: i64) -> EngagementResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Delete a post only if the requester owns it. One statement, so there
    /// is no window between the ownership check and the delete; comments and
    /// likes go with the post via the schema's cascade.
    pub async fn delete_owned(&self, post_id: i64, requester_id: i64) -> EngagementResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(requester_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }
}
