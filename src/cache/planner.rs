//! Mutation plan generation.
//!
//! Maps one mutation to the store actions (counter updates, cascades) and
//! the cache keys it makes stale. Planning is pure; execution lives in
//! [`super::engine`].

use std::fmt;

use uuid::Uuid;

use crate::application::repos::Filter;
use crate::domain::types::{Collection, Counter, Field};

use super::keys::CacheKey;

/// A completed primary write, carrying every id the plan depends on.
///
/// `post_owner` is the author of the post a comment or like points at;
/// `None` when that post no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    PostCreated {
        post_id: Uuid,
        user_id: Uuid,
    },
    PostDeleted {
        post_id: Uuid,
        user_id: Uuid,
    },
    PostUpdated {
        post_id: Uuid,
        user_id: Uuid,
    },
    CommentCreated {
        post_id: Uuid,
        user_id: Uuid,
        post_owner: Option<Uuid>,
    },
    CommentDeleted {
        post_id: Uuid,
        user_id: Uuid,
        post_owner: Option<Uuid>,
    },
    LikeCreated {
        post_id: Uuid,
        user_id: Uuid,
        post_owner: Option<Uuid>,
    },
    LikeDeleted {
        post_id: Uuid,
        user_id: Uuid,
        post_owner: Option<Uuid>,
    },
    FollowingCreated {
        follower_id: Uuid,
        following_id: Uuid,
    },
    FollowingDeleted {
        follower_id: Uuid,
        following_id: Uuid,
    },
    HideCreated {
        user_id: Uuid,
    },
    HideDeleted {
        user_id: Uuid,
    },
    /// The user document itself is removed by the plan, after its dependents.
    UserDeleted {
        user_id: Uuid,
        email: String,
    },
    UserUpdated {
        user_id: Uuid,
    },
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::PostCreated { .. } => "post_created",
            Mutation::PostDeleted { .. } => "post_deleted",
            Mutation::PostUpdated { .. } => "post_updated",
            Mutation::CommentCreated { .. } => "comment_created",
            Mutation::CommentDeleted { .. } => "comment_deleted",
            Mutation::LikeCreated { .. } => "like_created",
            Mutation::LikeDeleted { .. } => "like_deleted",
            Mutation::FollowingCreated { .. } => "following_created",
            Mutation::FollowingDeleted { .. } => "following_deleted",
            Mutation::HideCreated { .. } => "hide_created",
            Mutation::HideDeleted { .. } => "hide_deleted",
            Mutation::UserDeleted { .. } => "user_deleted",
            Mutation::UserUpdated { .. } => "user_updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    Increment {
        id: Uuid,
        counter: Counter,
        delta: i64,
    },
    DeleteMany {
        collection: Collection,
        filter: Filter,
    },
    DeleteOne {
        collection: Collection,
        id: Uuid,
    },
}

/// Ordered actions for one mutation: store actions run first, then every
/// invalidation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    pub store_actions: Vec<StoreAction>,
    /// Deduplicated, in first-seen order.
    pub invalidations: Vec<CacheKey>,
}

impl fmt::Display for MutationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MutationPlan {{ store_actions: {}, invalidate: [",
            self.store_actions.len()
        )?;
        for (index, key) in self.invalidations.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        f.write_str("] }")
    }
}

impl MutationPlan {
    pub fn for_mutation(mutation: &Mutation) -> Self {
        let mut plan = Self::default();

        match mutation {
            Mutation::PostCreated { user_id, .. } => {
                plan.increment(*user_id, Counter::PostCount, 1);
                plan.invalidate(CacheKey::PostsByUser(*user_id));
                plan.invalidate(CacheKey::User(*user_id));
            }
            Mutation::PostDeleted { post_id, user_id } => {
                plan.increment(*user_id, Counter::PostCount, -1);
                plan.invalidate(CacheKey::Post(*post_id));
                plan.invalidate(CacheKey::PostsByUser(*user_id));
                plan.invalidate(CacheKey::CommentsByPost(*post_id));
                plan.invalidate(CacheKey::HidesByPost(*post_id));
                plan.invalidate(CacheKey::User(*user_id));
            }
            Mutation::PostUpdated { post_id, user_id } => {
                plan.invalidate(CacheKey::Post(*post_id));
                plan.invalidate(CacheKey::PostsByUser(*user_id));
            }
            Mutation::CommentCreated {
                post_id,
                user_id,
                post_owner,
            } => plan.comment_effects(*post_id, *user_id, *post_owner, 1),
            Mutation::CommentDeleted {
                post_id,
                user_id,
                post_owner,
            } => plan.comment_effects(*post_id, *user_id, *post_owner, -1),
            Mutation::LikeCreated {
                post_id,
                user_id,
                post_owner,
            } => plan.like_effects(*post_id, *user_id, *post_owner, 1),
            Mutation::LikeDeleted {
                post_id,
                user_id,
                post_owner,
            } => plan.like_effects(*post_id, *user_id, *post_owner, -1),
            Mutation::FollowingCreated {
                follower_id,
                following_id,
            } => plan.following_effects(*follower_id, *following_id, 1),
            Mutation::FollowingDeleted {
                follower_id,
                following_id,
            } => plan.following_effects(*follower_id, *following_id, -1),
            Mutation::HideCreated { user_id } | Mutation::HideDeleted { user_id } => {
                plan.invalidate(CacheKey::HidesByUser(*user_id));
            }
            Mutation::UserDeleted { user_id, email } => {
                let owned = Filter::eq(Field::UserId, user_id);
                plan.delete_many(Collection::Comment, owned.clone());
                plan.delete_many(
                    Collection::Following,
                    Filter::eq(Field::FollowerId, user_id)
                        .or(Filter::eq(Field::FollowingId, user_id)),
                );
                plan.delete_many(Collection::Like, owned.clone());
                plan.delete_many(Collection::Post, owned);
                plan.delete_many(Collection::Login, Filter::eq(Field::Email, email));
                plan.store_actions.push(StoreAction::DeleteOne {
                    collection: Collection::User,
                    id: *user_id,
                });

                plan.invalidate(CacheKey::User(*user_id));
                plan.invalidate(CacheKey::PostsByUser(*user_id));
                plan.invalidate(CacheKey::FollowingsByFollower(*user_id));
                plan.invalidate(CacheKey::CommentsByUser(*user_id));
                plan.invalidate(CacheKey::HidesByUser(*user_id));
            }
            Mutation::UserUpdated { user_id } => {
                plan.invalidate(CacheKey::User(*user_id));
            }
        }

        plan
    }

    fn comment_effects(
        &mut self,
        post_id: Uuid,
        user_id: Uuid,
        post_owner: Option<Uuid>,
        delta: i64,
    ) {
        self.increment(post_id, Counter::CommentCount, delta);
        self.invalidate(CacheKey::CommentsByPost(post_id));
        self.invalidate(CacheKey::Post(post_id));
        self.invalidate(CacheKey::CommentsByUser(user_id));
        if let Some(owner) = post_owner {
            self.invalidate(CacheKey::PostsByUser(owner));
        }
    }

    fn like_effects(&mut self, post_id: Uuid, user_id: Uuid, post_owner: Option<Uuid>, delta: i64) {
        self.increment(post_id, Counter::LikeCount, delta);
        if let Some(owner) = post_owner {
            self.invalidate(CacheKey::PostsByUser(owner));
        }
        self.invalidate(CacheKey::PostsByUser(user_id));
        self.invalidate(CacheKey::Post(post_id));
    }

    fn following_effects(&mut self, follower_id: Uuid, following_id: Uuid, delta: i64) {
        self.increment(follower_id, Counter::FollowingCount, delta);
        self.increment(following_id, Counter::FollowerCount, delta);
        self.invalidate(CacheKey::User(follower_id));
        self.invalidate(CacheKey::User(following_id));
        self.invalidate(CacheKey::FollowingsByFollower(follower_id));
    }

    fn increment(&mut self, id: Uuid, counter: Counter, delta: i64) {
        self.store_actions
            .push(StoreAction::Increment { id, counter, delta });
    }

    fn delete_many(&mut self, collection: Collection, filter: Filter) {
        self.store_actions
            .push(StoreAction::DeleteMany { collection, filter });
    }

    fn invalidate(&mut self, key: CacheKey) {
        if !self.invalidations.contains(&key) {
            self.invalidations.push(key);
        }
    }

    /// Rendered keys, as they reach the cache backend.
    pub fn rendered_invalidations(&self) -> Vec<String> {
        let mut rendered: Vec<String> = Vec::with_capacity(self.invalidations.len());
        for key in &self.invalidations {
            let key = key.to_string();
            if !rendered.contains(&key) {
                rendered.push(key);
            }
        }
        rendered
    }
}
