//! Addressing enums for stored documents: collections, queryable fields, counters.

use std::fmt;

/// Document collections known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    User,
    Post,
    Comment,
    Following,
    Like,
    Hide,
    Login,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::User,
        Collection::Post,
        Collection::Comment,
        Collection::Following,
        Collection::Like,
        Collection::Hide,
        Collection::Login,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::User => "user",
            Collection::Post => "post",
            Collection::Comment => "comment",
            Collection::Following => "following",
            Collection::Like => "like",
            Collection::Hide => "hide",
            Collection::Login => "login",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document fields that filters may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    UserId,
    UserName,
    Email,
    PostId,
    FollowerId,
    FollowingId,
}

impl Field {
    /// Name of the field inside a stored document.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "_id",
            Field::UserId => "userID",
            Field::UserName => "userName",
            Field::Email => "email",
            Field::PostId => "postID",
            Field::FollowerId => "followerID",
            Field::FollowingId => "followingID",
        }
    }
}

/// Denormalized counters maintained by increment and decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    PostCount,
    FollowerCount,
    FollowingCount,
    LikeCount,
    CommentCount,
}

impl Counter {
    pub fn field_name(self) -> &'static str {
        match self {
            Counter::PostCount => "postCount",
            Counter::FollowerCount => "followerCount",
            Counter::FollowingCount => "followingCount",
            Counter::LikeCount => "likeCount",
            Counter::CommentCount => "commentCount",
        }
    }

    /// Collection whose documents carry this counter.
    pub fn collection(self) -> Collection {
        match self {
            Counter::PostCount | Counter::FollowerCount | Counter::FollowingCount => {
                Collection::User
            }
            Counter::LikeCount | Counter::CommentCount => Collection::Post,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_live_on_their_owning_collection() {
        assert_eq!(Counter::PostCount.collection(), Collection::User);
        assert_eq!(Counter::FollowerCount.collection(), Collection::User);
        assert_eq!(Counter::LikeCount.collection(), Collection::Post);
        assert_eq!(Counter::CommentCount.collection(), Collection::Post);
    }

    #[test]
    fn collection_names_are_unique() {
        let mut names: Vec<_> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Collection::ALL.len());
    }
}
