use crate::domain::models::{AuthorSummary, Story, StoryOverviewEntry, StoryView};
use crate::error::{EngagementError, EngagementResult};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: i64,
    image_ref: String,
    created_at: chrono::DateTime<chrono::Utc>,
    author_id: i64,
    author_username: String,
    author_name: String,
    author_profile_image_ref: Option<String>,
}

impl From<StoryRow> for StoryView {
    fn from(row: StoryRow) -> Self {
        StoryView {
            id: row.id,
            author: AuthorSummary::new(
                row.author_id,
                row.author_username,
                row.author_name,
                row.author_profile_image_ref,
            ),
            image_ref: row.image_ref,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StoryOverviewRow {
    id: i64,
    image_ref: String,
    created_at: chrono::DateTime<chrono::Utc>,
    author_id: i64,
    author_username: String,
    author_name: String,
    author_profile_image_ref: Option<String>,
    story_count: i64,
}

/// Repository for stories
#[derive(Clone)]
pub struct StoryRepository {
    pool: PgPool,
}

impl StoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, author_id: i64, image_ref: &str) -> EngagementResult<Story> {
        let story = sqlx::query_as::<_, Story>(
            r#"
            INSERT INTO stories (author_id, image_ref)
            VALUES ($1, $2)
            RETURNING id, author_id, image_ref, created_at
            "#,
        )
        .bind(author_id)
        .bind(image_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EngagementError::from_insert(e, "story", "user"))?;

        Ok(story)
    }

    /// Delete a story only if the requester owns it; same single-statement
    /// shape as post deletion.
    pub async fn delete_owned(&self, story_id: i64, requester_id: i64) -> EngagementResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM stories
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(story_id)
        .bind(requester_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    /// One row per author with stories: the story with the greatest id
    /// (ids are monotonic with creation, so this is the most recent) plus
    /// that author's total story count.
    pub async fn overview(&self) -> EngagementResult<Vec<StoryOverviewEntry>> {
        let rows = sqlx::query_as::<_, StoryOverviewRow>(
            r#"
            SELECT s.id, s.image_ref, s.created_at,
                   u.id AS author_id,
                   u.username AS author_username,
                   u.name AS author_name,
                   u.profile_image_ref AS author_profile_image_ref,
                   agg.story_count
            FROM stories s
            JOIN (
                SELECT author_id, MAX(id) AS latest_id, COUNT(*) AS story_count
                FROM stories
                GROUP BY author_id
            ) agg ON agg.latest_id = s.id
            JOIN users u ON u.id = s.author_id
            ORDER BY s.created_at DESC, s.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let has_multiple_stories = row.story_count > 1;
                StoryOverviewEntry {
                    story: StoryView {
                        id: row.id,
                        author: AuthorSummary::new(
                            row.author_id,
                            row.author_username,
                            row.author_name,
                            row.author_profile_image_ref,
                        ),
                        image_ref: row.image_ref,
                        created_at: row.created_at,
                    },
                    has_multiple_stories,
                }
            })
            .collect())
    }

    /// One user's stories in chronological order - playback order, the
    /// opposite of the recency-first overview.
    pub async fn for_author(&self, author_id: i64) -> EngagementResult<Vec<StoryView>> {
        let rows = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT s.id, s.image_ref, s.created_at,
                   u.id AS author_id,
                   u.username AS author_username,
                   u.name AS author_name,
                   u.profile_image_ref AS author_profile_image_ref
            FROM stories s
            JOIN users u ON u.id = s.author_id
            WHERE s.author_id = $1
            ORDER BY s.created_at ASC, s.id ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
