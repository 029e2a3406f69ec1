//! Engagement service orchestration
//!
//! The operation surface the route layer consumes. Translates caller intents
//! into edge-engine and feed-aggregator calls, owns the content-creation
//! validation rules and the delete authorization policy, and runs every
//! operation under a deadline.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use tracing::error;

use crate::domain::models::{
    CommentView, FeedPost, FollowEdge, LikeEdge, Story, StoryOverviewEntry, StoryView,
};
use crate::error::{EngagementError, EngagementResult};
use crate::repository::{CommentRepository, PostRepository, StoryRepository};
use crate::services::{EdgeService, FeedService};

#[derive(Clone)]
pub struct EngagementService {
    edges: EdgeService,
    feed: FeedService,
    posts: PostRepository,
    comments: CommentRepository,
    stories: StoryRepository,
    deadline: Duration,
}

impl EngagementService {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self {
            edges: EdgeService::new(pool.clone()),
            feed: FeedService::new(pool.clone()),
            posts: PostRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            stories: StoryRepository::new(pool),
            deadline,
        }
    }

    /// Run one operation under the service deadline. Store failures are
    /// logged here, once, before propagating as an opaque error; domain
    /// errors pass through untouched.
    async fn run<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = EngagementResult<T>>,
    ) -> EngagementResult<T> {
        let result =
            resilience::with_deadline_result(self.deadline, fut, |_| EngagementError::Timeout)
                .await;
        if let Err(EngagementError::Store(e)) = &result {
            error!("storage failure in {}: {}", operation, e);
        }
        result
    }

    // ---- relationship & engagement edges ----

    pub async fn follow(&self, caller_id: i64, target_id: i64) -> EngagementResult<FollowEdge> {
        self.run("follow", self.edges.follow(caller_id, target_id))
            .await
    }

    pub async fn unfollow(&self, caller_id: i64, target_id: i64) -> EngagementResult<bool> {
        self.run("unfollow", self.edges.unfollow(caller_id, target_id))
            .await
    }

    pub async fn like(&self, caller_id: i64, post_id: i64) -> EngagementResult<LikeEdge> {
        self.run("like", self.edges.like(caller_id, post_id)).await
    }

    pub async fn unlike(&self, caller_id: i64, post_id: i64) -> EngagementResult<bool> {
        self.run("unlike", self.edges.unlike(caller_id, post_id))
            .await
    }

    pub async fn list_followers(&self, user_id: i64) -> EngagementResult<Vec<i64>> {
        self.run("list_followers", self.edges.list_followers(user_id))
            .await
    }

    pub async fn list_following(&self, user_id: i64) -> EngagementResult<Vec<i64>> {
        self.run("list_following", self.edges.list_following(user_id))
            .await
    }

    pub async fn list_likers(&self, post_id: i64) -> EngagementResult<Vec<i64>> {
        self.run("list_likers", self.edges.list_likers(post_id))
            .await
    }

    // ---- content creation & deletion ----

    /// Create a post. At least one of description/image must survive
    /// trimming; the created post comes back already joined with its author.
    pub async fn create_post(
        &self,
        author_id: i64,
        description: Option<&str>,
        image_ref: Option<&str>,
    ) -> EngagementResult<FeedPost> {
        let description = normalize(description);
        let image_ref = normalize(image_ref);
        if description.is_none() && image_ref.is_none() {
            return Err(EngagementError::validation(
                "description",
                "a post needs a description or an image",
            ));
        }

        self.run(
            "create_post",
            self.posts.insert(author_id, description, image_ref),
        )
        .await
    }

    /// Delete a post the caller owns. A post that is missing or owned by
    /// someone else gets the same answer, so existence never leaks through
    /// the authorization response.
    pub async fn delete_post(&self, requester_id: i64, post_id: i64) -> EngagementResult<()> {
        self.run("delete_post", async {
            if self.posts.delete_owned(post_id, requester_id).await? {
                Ok(())
            } else {
                Err(EngagementError::Forbidden(
                    "you can only delete your own posts".to_string(),
                ))
            }
        })
        .await
    }

    /// Comment on a post. The post reference is checked, not assumed; a post
    /// that vanishes between the check and the insert still surfaces as
    /// not-found via the FK translation.
    pub async fn create_comment(
        &self,
        author_id: i64,
        post_id: i64,
        body: &str,
    ) -> EngagementResult<CommentView> {
        let body = body.trim();
        if body.is_empty() {
            return Err(EngagementError::validation(
                "body",
                "comment text must not be empty",
            ));
        }

        self.run("create_comment", async {
            if !self.posts.exists(post_id).await? {
                return Err(EngagementError::NotFound("post".to_string()));
            }
            self.comments.insert(post_id, author_id, body).await
        })
        .await
    }

    pub async fn create_story(&self, author_id: i64, image_ref: &str) -> EngagementResult<Story> {
        let image_ref = image_ref.trim();
        if image_ref.is_empty() {
            return Err(EngagementError::validation(
                "image_ref",
                "a story needs an image",
            ));
        }

        self.run("create_story", self.stories.insert(author_id, image_ref))
            .await
    }

    /// Delete a story the caller owns; same uniform policy as `delete_post`.
    pub async fn delete_story(&self, requester_id: i64, story_id: i64) -> EngagementResult<()> {
        self.run("delete_story", async {
            if self.stories.delete_owned(story_id, requester_id).await? {
                Ok(())
            } else {
                Err(EngagementError::Forbidden(
                    "you can only delete your own stories".to_string(),
                ))
            }
        })
        .await
    }

    // ---- composed reads ----

    pub async fn get_feed(&self, limit: Option<i64>) -> EngagementResult<Vec<FeedPost>> {
        self.run("get_feed", self.feed.get_feed(limit)).await
    }

    pub async fn get_user_posts(&self, user_id: i64) -> EngagementResult<Vec<FeedPost>> {
        self.run("get_user_posts", self.feed.get_user_posts(user_id))
            .await
    }

    pub async fn get_post(&self, post_id: i64) -> EngagementResult<FeedPost> {
        self.run("get_post", self.feed.get_post(post_id)).await
    }

    pub async fn get_comments(&self, post_id: i64) -> EngagementResult<Vec<CommentView>> {
        self.run("get_comments", self.feed.get_comments(post_id))
            .await
    }

    pub async fn get_stories_overview(&self) -> EngagementResult<Vec<StoryOverviewEntry>> {
        self.run("get_stories_overview", self.feed.get_stories_overview())
            .await
    }

    pub async fn get_user_stories(&self, user_id: i64) -> EngagementResult<Vec<StoryView>> {
        self.run("get_user_stories", self.feed.get_user_stories(user_id))
            .await
    }
}

/// Trim an optional field; whitespace-only input counts as absent.
fn normalize(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn detached_service() -> EngagementService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/never-connected")
            .unwrap();
        EngagementService::new(pool, Duration::from_secs(5))
    }

    #[test]
    fn normalize_drops_whitespace_only_input() {
        assert_eq!(normalize(Some("  hello ")), Some("hello"));
        assert_eq!(normalize(Some("   ")), None);
        assert_eq!(normalize(Some("")), None);
        assert_eq!(normalize(None), None);
    }

    #[tokio::test]
    async fn create_post_requires_description_or_image() {
        let service = detached_service();
        let err = service.create_post(1, None, None).await.unwrap_err();
        match err {
            EngagementError::Validation { field, .. } => assert_eq!(field, "description"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = service
            .create_post(1, Some("   "), Some(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn create_comment_rejects_empty_body() {
        let service = detached_service();
        let err = service.create_comment(1, 1, "  \t ").await.unwrap_err();
        match err {
            EngagementError::Validation { field, .. } => assert_eq!(field, "body"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_story_rejects_empty_image_ref() {
        let service = detached_service();
        let err = service.create_story(1, " ").await.unwrap_err();
        match err {
            EngagementError::Validation { field, .. } => assert_eq!(field, "image_ref"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
