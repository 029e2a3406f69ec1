//! Feed aggregator
//!
//! Read-only composition of posts, comments and stories with their author
//! projections and engagement counts. Never mutates state, which is what
//! makes the retry policy on these paths safe.

use std::future::Future;

use crate::domain::models::{CommentView, FeedPost, StoryOverviewEntry, StoryView};
use crate::error::{EngagementError, EngagementResult};
use crate::repository::{CommentRepository, PostRepository, StoryRepository};
use resilience::{ReadRetryConfig, RetryError};
use sqlx::PgPool;

/// Cap applied when the caller does not bound the feed, so an unbounded scan
/// can never be requested by omission.
pub const DEFAULT_FEED_LIMIT: i64 = 50;

fn effective_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_FEED_LIMIT).max(1)
}

#[derive(Clone)]
pub struct FeedService {
    posts: PostRepository,
    comments: CommentRepository,
    stories: StoryRepository,
    retry: ReadRetryConfig,
}

impl FeedService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            posts: PostRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            stories: StoryRepository::new(pool),
            retry: ReadRetryConfig::default(),
        }
    }

    /// Retry wrapper for the aggregation queries. Only these idempotent
    /// reads are retried; every error crossing this point is a storage
    /// failure, never a domain outcome.
    async fn read<T, F, Fut>(&self, query: F) -> EngagementResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EngagementResult<T>>,
    {
        resilience::with_read_retry(&self.retry, query)
            .await
            .map_err(|RetryError::MaxRetriesExceeded { last_error, .. }| last_error)
    }

    /// Posts newest first (ties break by ascending id), each with exact
    /// like/comment counts and the author projection.
    pub async fn get_feed(&self, limit: Option<i64>) -> EngagementResult<Vec<FeedPost>> {
        let limit = effective_limit(limit);
        self.read(|| self.posts.feed_page(limit)).await
    }

    /// Same composition as the feed, restricted to one author, uncapped.
    pub async fn get_user_posts(&self, user_id: i64) -> EngagementResult<Vec<FeedPost>> {
        self.read(|| self.posts.by_author(user_id)).await
    }

    /// Single composed post.
    pub async fn get_post(&self, post_id: i64) -> EngagementResult<FeedPost> {
        self.read(|| self.posts.fetch(post_id))
            .await?
            .ok_or_else(|| EngagementError::NotFound("post".to_string()))
    }

    /// Comments for a post, newest first. An empty vec is a successful
    /// result, not an error.
    pub async fn get_comments(&self, post_id: i64) -> EngagementResult<Vec<CommentView>> {
        self.read(|| self.comments.for_post(post_id)).await
    }

    /// Latest story per author plus a flag for queued-up older ones.
    pub async fn get_stories_overview(&self) -> EngagementResult<Vec<StoryOverviewEntry>> {
        self.read(|| self.stories.overview()).await
    }

    /// One user's stories in playback (chronological) order.
    pub async fn get_user_stories(&self, user_id: i64) -> EngagementResult<Vec<StoryView>> {
        self.read(|| self.stories.for_author(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_limit_falls_back_to_default_cap() {
        assert_eq!(effective_limit(None), DEFAULT_FEED_LIMIT);
    }

    #[test]
    fn explicit_limit_is_respected() {
        assert_eq!(effective_limit(Some(10)), 10);
    }

    #[test]
    fn degenerate_limits_are_floored() {
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(-5)), 1);
    }
}
