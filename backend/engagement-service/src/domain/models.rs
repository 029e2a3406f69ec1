use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback profile image reference for users who never uploaded one.
pub const DEFAULT_PROFILE_IMAGE: &str =
    "https://images.pexels.com/photos/220453/pexels-photo-220453.jpeg";

/// User entity. Registration and profile updates happen outside this
/// subsystem; rows are only read here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub profile_image_ref: Option<String>,
    pub cover_image_ref: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post entity. At least one of `description`/`image_ref` is present,
/// enforced both in validation and by a table constraint.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Story entity. Ephemeral by convention; removal is explicit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Story {
    pub id: i64,
    pub author_id: i64,
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

/// Follow edge - directed, `(follower_id, followed_id)` unique, no self loops
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Like edge - `(user_id, post_id)` unique
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeEdge {
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Public author projection attached to posts, comments and stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub profile_image_ref: String,
}

impl AuthorSummary {
    pub fn new(id: i64, username: String, name: String, profile_image_ref: Option<String>) -> Self {
        Self {
            id,
            username,
            name,
            profile_image_ref: profile_image_ref
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
        }
    }
}

/// A post composed for display: author projection plus engagement counts
/// exact as of query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: i64,
    pub author: AuthorSummary,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author's public projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub author: AuthorSummary,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A story joined with its author's public projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryView {
    pub id: i64,
    pub author: AuthorSummary,
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

/// One entry per author in the stories overview: their most recent story and
/// whether more are queued behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryOverviewEntry {
    pub story: StoryView,
    pub has_multiple_stories: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_summary_applies_fallback_image() {
        let author = AuthorSummary::new(1, "jane".into(), "Jane".into(), None);
        assert_eq!(author.profile_image_ref, DEFAULT_PROFILE_IMAGE);

        let author = AuthorSummary::new(1, "jane".into(), "Jane".into(), Some(String::new()));
        assert_eq!(author.profile_image_ref, DEFAULT_PROFILE_IMAGE);
    }

    #[test]
    fn author_summary_keeps_uploaded_image() {
        let author =
            AuthorSummary::new(1, "jane".into(), "Jane".into(), Some("blob-42.jpg".into()));
        assert_eq!(author.profile_image_ref, "blob-42.jpg");
    }
}
