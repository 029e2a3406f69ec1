//! Edge consistency engine
//!
//! Guards the two edge invariants - no self loops, at most one edge per
//! pair - in front of the follow/like repositories. Uniqueness itself is
//! settled by the store's constraints; this layer owns the self-loop rule
//! and turns the "already present" outcome into `DuplicateEdge`.

use crate::domain::models::{FollowEdge, LikeEdge};
use crate::error::{EngagementError, EngagementResult};
use crate::repository::{FollowRepository, LikeRepository};
use sqlx::PgPool;

#[derive(Clone)]
pub struct EdgeService {
    follows: FollowRepository,
    likes: LikeRepository,
}

impl EdgeService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            follows: FollowRepository::new(pool.clone()),
            likes: LikeRepository::new(pool),
        }
    }

    /// Create a follow edge. Of two concurrent identical calls exactly one
    /// returns the edge; the other gets `DuplicateEdge`.
    pub async fn follow(&self, follower_id: i64, followed_id: i64) -> EngagementResult<FollowEdge> {
        if follower_id == followed_id {
            return Err(EngagementError::SelfReference);
        }
        match self.follows.insert(follower_id, followed_id).await? {
            Some(edge) => Ok(edge),
            None => Err(EngagementError::DuplicateEdge("follow")),
        }
    }

    /// Remove a follow edge. Removing an absent edge is a successful no-op;
    /// returns whether an edge was actually removed.
    pub async fn unfollow(&self, follower_id: i64, followed_id: i64) -> EngagementResult<bool> {
        if follower_id == followed_id {
            return Err(EngagementError::SelfReference);
        }
        self.follows.delete(follower_id, followed_id).await
    }

    /// Create a like edge; `DuplicateEdge` on a double-like.
    pub async fn like(&self, user_id: i64, post_id: i64) -> EngagementResult<LikeEdge> {
        match self.likes.insert(user_id, post_id).await? {
            Some(edge) => Ok(edge),
            None => Err(EngagementError::DuplicateEdge("like")),
        }
    }

    /// Remove a like edge; absent-edge removal is a successful no-op.
    pub async fn unlike(&self, user_id: i64, post_id: i64) -> EngagementResult<bool> {
        self.likes.delete(user_id, post_id).await
    }

    pub async fn list_followers(&self, user_id: i64) -> EngagementResult<Vec<i64>> {
        self.follows.follower_ids(user_id).await
    }

    pub async fn list_following(&self, user_id: i64) -> EngagementResult<Vec<i64>> {
        self.follows.following_ids(user_id).await
    }

    pub async fn list_likers(&self, post_id: i64) -> EngagementResult<Vec<i64>> {
        self.likes.liker_ids(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // A lazy pool never dials out, so the pre-store rules can be exercised
    // without a database.
    fn detached_service() -> EdgeService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/never-connected")
            .unwrap();
        EdgeService::new(pool)
    }

    #[tokio::test]
    async fn follow_rejects_self_reference_before_touching_the_store() {
        let service = detached_service();
        let err = service.follow(7, 7).await.unwrap_err();
        assert!(matches!(err, EngagementError::SelfReference));
    }

    #[tokio::test]
    async fn unfollow_rejects_self_reference_before_touching_the_store() {
        let service = detached_service();
        let err = service.unfollow(7, 7).await.unwrap_err();
        assert!(matches!(err, EngagementError::SelfReference));
    }
}
