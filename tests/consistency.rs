//! Counter and cache consistency of entity operations over in-memory backends.

mod common;

use common::Harness;
use snapshare::application::followings::NewFollowing;
use snapshare::application::likes::NewLike;
use snapshare::application::repos::{DeleteResult, Filter};
use snapshare::cache::CacheKey;
use snapshare::domain::entities::{
    CommentRecord, FollowingRecord, LikeRecord, LoginRecord, PostRecord, UserRecord,
};
use snapshare::domain::outcome::{Outcome, Rejection};
use snapshare::domain::types::{Collection, Field};
use uuid::Uuid;

#[tokio::test]
async fn post_count_tracks_create_and_delete() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let before = h.reload_user(owner.id).await.post_count;

    let post = h.post(owner.id).await;
    assert_eq!(h.reload_user(owner.id).await.post_count, before + 1);

    let outcome = h.services.posts.delete(post.id).await.expect("delete post");
    assert_eq!(outcome.done().map(|r| r.deleted_count), Some(1));
    assert_eq!(h.reload_user(owner.id).await.post_count, before);
}

#[tokio::test]
async fn comment_creation_refreshes_cached_comment_list() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let reader = h.user("bob").await;
    let post = h.post(owner.id).await;

    // Warm the post's comment list while it is still empty.
    let cold = h.services.comments.get_by_post(post.id).await.expect("list");
    assert!(cold.is_empty());
    assert!(
        h.cache()
            .get_text(&CacheKey::CommentsByPost(post.id))
            .await
            .expect("cache read")
            .is_some()
    );

    let comment = h.comment(reader.id, post.id, "nice shot").await;
    assert_eq!(comment.user_name, "bob");

    let warm = h.services.comments.get_by_post(post.id).await.expect("list");
    assert_eq!(warm.len(), 1);
    assert_eq!(warm[0].id, comment.id);
}

#[tokio::test]
async fn self_follow_is_rejected_without_writes() {
    let h = Harness::new();
    let user = h.user("alice").await;
    let writes_before = h.store.writes();

    let outcome = h
        .services
        .followings
        .create(NewFollowing {
            follower_id: user.id,
            following_id: user.id,
            follower_name: None,
            following_name: None,
        })
        .await
        .expect("create following");

    assert_eq!(outcome.rejection(), Some(Rejection::SelfFollow));
    assert_eq!(h.store.writes(), writes_before);
    assert_eq!(h.store.len(Collection::Following), 0);

    let reloaded = h.reload_user(user.id).await;
    assert_eq!(reloaded.follower_count, 0);
    assert_eq!(reloaded.following_count, 0);
}

#[tokio::test]
async fn duplicate_like_is_rejected_and_counted_once() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let fan = h.user("bob").await;
    let post = h.post(owner.id).await;

    let like = || NewLike {
        user_id: fan.id,
        post_id: post.id,
        user_name: None,
    };

    let first = h.services.likes.create(like()).await.expect("first like");
    assert!(first.is_done());
    let second = h.services.likes.create(like()).await.expect("second like");
    assert_eq!(second.rejection(), Some(Rejection::AlreadyLiked));
    assert_eq!(second.rejection().map(Rejection::message).as_deref(), Some("already liked"));

    assert_eq!(h.reload_post(post.id).await.like_count, 1);
    assert_eq!(h.store.len(Collection::Like), 1);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_owned_documents() {
    let h = Harness::new();
    let victim = h.user("alice").await;
    let other = h.user("bob").await;

    h.post(victim.id).await;
    h.post(victim.id).await;
    let others_post = h.post(other.id).await;
    h.comment(victim.id, others_post.id, "hello").await;
    h.services
        .followings
        .create(NewFollowing {
            follower_id: victim.id,
            following_id: other.id,
            follower_name: None,
            following_name: None,
        })
        .await
        .expect("follow")
        .done()
        .expect("follow accepted");
    h.services
        .likes
        .create(NewLike {
            user_id: victim.id,
            post_id: others_post.id,
            user_name: None,
        })
        .await
        .expect("like")
        .done()
        .expect("like accepted");

    let outcome = h.services.users.delete(victim.id).await.expect("delete user");
    assert!(outcome.is_done());

    let documents = &h.services.backends.documents;
    let owned = Filter::eq(Field::UserId, victim.id);
    let posts: Vec<PostRecord> = documents.find_many(&owned).await.expect("posts");
    let comments: Vec<CommentRecord> = documents.find_many(&owned).await.expect("comments");
    let likes: Vec<LikeRecord> = documents.find_many(&owned).await.expect("likes");
    let followings: Vec<FollowingRecord> = documents
        .find_many(&Filter::eq(Field::FollowerId, victim.id))
        .await
        .expect("followings");
    assert!(posts.is_empty());
    assert!(comments.is_empty());
    assert!(likes.is_empty());
    assert!(followings.is_empty());

    assert!(
        documents
            .find::<UserRecord>(victim.id)
            .await
            .expect("user")
            .is_none()
    );
    assert!(h.services.users.get_by_id(victim.id).await.expect("read").is_none());

    // The other user's data survives.
    assert!(documents.find::<UserRecord>(other.id).await.expect("user").is_some());
    assert_eq!(h.store.len(Collection::Post), 1);
}

#[tokio::test]
async fn deleting_a_user_removes_their_login() {
    let h = Harness::new();
    let outcome = h
        .services
        .auth
        .signup(snapshare::application::auth::Signup {
            email: "carol@example.com".into(),
            password: "correct horse".into(),
            user_name: "carol".into(),
        })
        .await
        .expect("signup");
    let user = outcome.done().expect("signup accepted");

    h.services.users.delete(user.id).await.expect("delete user");

    let logins: Vec<LoginRecord> = h
        .services
        .backends
        .documents
        .find_many(&Filter::eq(Field::Email, "carol@example.com"))
        .await
        .expect("logins");
    assert!(logins.is_empty());
}

#[tokio::test]
async fn second_user_read_is_served_from_cache() {
    let h = Harness::new();
    let user = h.user("alice").await;

    let reads_before = h.store.reads();
    let first = h.reload_user(user.id).await;
    assert_eq!(h.store.reads(), reads_before + 1);
    assert!(
        h.cache()
            .get_text(&CacheKey::User(user.id))
            .await
            .expect("cache read")
            .is_some()
    );

    let second = h.reload_user(user.id).await;
    assert_eq!(h.store.reads(), reads_before + 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn post_and_comment_lifecycle_keeps_counters_and_cache_consistent() {
    let h = Harness::new();
    let author = h.user("alice").await;
    let commenter = h.user("bob").await;
    assert_eq!(h.reload_user(author.id).await.post_count, 0);

    let post = h.post(author.id).await;
    assert_eq!(h.reload_user(author.id).await.post_count, 1);

    let comment = h.comment(commenter.id, post.id, "first!").await;
    assert_eq!(h.reload_post(post.id).await.comment_count, 1);

    h.services
        .comments
        .delete(comment.id)
        .await
        .expect("delete comment")
        .done()
        .expect("comment existed");
    assert_eq!(h.reload_post(post.id).await.comment_count, 0);

    // Populate both collection keys before the post goes away.
    h.services.posts.get_by_user(author.id).await.expect("posts");
    h.services.comments.get_by_post(post.id).await.expect("comments");

    h.services
        .posts
        .delete(post.id)
        .await
        .expect("delete post")
        .done()
        .expect("post existed");
    assert_eq!(h.reload_user(author.id).await.post_count, 0);

    let cache = h.cache();
    assert!(
        cache
            .get_text(&CacheKey::PostsByUser(author.id))
            .await
            .expect("cache read")
            .is_none()
    );
    assert!(
        cache
            .get_text(&CacheKey::CommentsByPost(post.id))
            .await
            .expect("cache read")
            .is_none()
    );
}

#[tokio::test]
async fn hiding_own_post_is_rejected() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let viewer = h.user("bob").await;
    let post = h.post(owner.id).await;

    let own = h.services.hides.create(owner.id, post.id).await.expect("hide");
    assert_eq!(own.rejection(), Some(Rejection::HideOwnPost));

    let hidden = h.services.hides.create(viewer.id, post.id).await.expect("hide");
    assert!(hidden.is_done());
    let listed = h.services.hides.get_by_user(viewer.id).await.expect("hides");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].post_id, post.id);
}

#[tokio::test]
async fn following_updates_both_counters_and_rejects_duplicates() {
    let h = Harness::new();
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let follow = || NewFollowing {
        follower_id: alice.id,
        following_id: bob.id,
        follower_name: None,
        following_name: None,
    };

    let created = h
        .services
        .followings
        .create(follow())
        .await
        .expect("follow")
        .done()
        .expect("follow accepted");
    assert_eq!(created.follower_name, "alice");
    assert_eq!(created.following_name, "bob");
    assert_eq!(h.reload_user(alice.id).await.following_count, 1);
    assert_eq!(h.reload_user(bob.id).await.follower_count, 1);

    let again = h.services.followings.create(follow()).await.expect("follow");
    assert_eq!(again.rejection(), Some(Rejection::AlreadyFollowing));

    h.services
        .followings
        .delete_by_pair(alice.id, bob.id)
        .await
        .expect("unfollow")
        .done()
        .expect("following existed");
    assert_eq!(h.reload_user(alice.id).await.following_count, 0);
    assert_eq!(h.reload_user(bob.id).await.follower_count, 0);
    assert!(
        h.services
            .followings
            .get_by_follower(alice.id)
            .await
            .expect("followings")
            .is_empty()
    );
}

impl Harness {
    async fn like(&self, user_id: Uuid, post_id: Uuid) -> LikeRecord {
        self.services
            .likes
            .create(NewLike {
                user_id,
                post_id,
                user_name: None,
            })
            .await
            .expect("create like")
            .done()
            .expect("like accepted")
    }

    async fn cached(&self, key: CacheKey) -> bool {
        self.cache()
            .get_text(&key)
            .await
            .expect("cache read")
            .is_some()
    }
}

#[tokio::test]
async fn unliking_restores_like_count_and_drops_post_keys() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let fan = h.user("bob").await;
    let post = h.post(owner.id).await;

    let first = h.like(fan.id, post.id).await;
    assert_eq!(h.reload_post(post.id).await.like_count, 1);

    // Warm the singleton and both owners' post lists.
    h.services.posts.get_by_user(owner.id).await.expect("posts");
    h.services.posts.get_by_user(fan.id).await.expect("posts");
    assert!(h.cached(CacheKey::Post(post.id)).await);
    assert!(h.cached(CacheKey::PostsByUser(owner.id)).await);

    let outcome = h.services.likes.delete(first.id).await.expect("unlike");
    assert_eq!(outcome, Outcome::Done(DeleteResult::new(1)));
    assert!(!h.cached(CacheKey::Post(post.id)).await);
    assert!(!h.cached(CacheKey::PostsByUser(owner.id)).await);
    assert!(!h.cached(CacheKey::PostsByUser(fan.id)).await);
    assert_eq!(h.reload_post(post.id).await.like_count, 0);

    h.like(fan.id, post.id).await;
    h.services.posts.get_by_user(owner.id).await.expect("posts");
    assert_eq!(h.reload_post(post.id).await.like_count, 1);

    h.services
        .likes
        .delete_by_user_and_post(fan.id, post.id)
        .await
        .expect("unlike by pair")
        .done()
        .expect("like existed");
    assert!(!h.cached(CacheKey::Post(post.id)).await);
    assert!(!h.cached(CacheKey::PostsByUser(owner.id)).await);
    assert_eq!(h.reload_post(post.id).await.like_count, 0);
    assert_eq!(h.store.len(Collection::Like), 0);
}

#[tokio::test]
async fn overlapping_deletes_of_one_like_decrement_once() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let fan = h.user("bob").await;
    let post = h.post(owner.id).await;
    let like = h.like(fan.id, post.id).await;

    // Both deletes find the like before either removes it.
    h.store.yield_after_reads();
    let (first, second) = tokio::join!(
        h.services.likes.delete(like.id),
        h.services.likes.delete(like.id)
    );
    let outcomes = [first.expect("first delete"), second.expect("second delete")];

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_done()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|outcome| outcome.rejection() == Some(Rejection::Missing(Collection::Like)))
    );
    assert_eq!(h.reload_post(post.id).await.like_count, 0);
}

#[tokio::test]
async fn overlapping_deletes_of_one_post_decrement_once() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let post = h.post(owner.id).await;
    assert_eq!(h.reload_user(owner.id).await.post_count, 1);

    h.store.yield_after_reads();
    let (first, second) = tokio::join!(
        h.services.posts.delete(post.id),
        h.services.posts.delete(post.id)
    );
    let done = [first.expect("first delete"), second.expect("second delete")]
        .iter()
        .filter(|outcome| outcome.is_done())
        .count();

    assert_eq!(done, 1);
    assert_eq!(h.reload_user(owner.id).await.post_count, 0);
}

#[tokio::test]
async fn unhiding_drops_the_hiders_list() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let viewer = h.user("bob").await;
    let first = h.post(owner.id).await;
    let second = h.post(owner.id).await;

    let hide = h
        .services
        .hides
        .create(viewer.id, first.id)
        .await
        .expect("hide")
        .done()
        .expect("hide accepted");
    h.services
        .hides
        .create(viewer.id, second.id)
        .await
        .expect("hide")
        .done()
        .expect("hide accepted");

    let listed = h.services.hides.get_by_user(viewer.id).await.expect("hides");
    assert_eq!(listed.len(), 2);
    assert!(h.cached(CacheKey::HidesByUser(viewer.id)).await);

    h.services
        .hides
        .delete(hide.id)
        .await
        .expect("unhide")
        .done()
        .expect("hide existed");
    assert!(!h.cached(CacheKey::HidesByUser(viewer.id)).await);
    let listed = h.services.hides.get_by_user(viewer.id).await.expect("hides");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].post_id, second.id);

    h.services
        .hides
        .delete_by_user_and_post(viewer.id, second.id)
        .await
        .expect("unhide by pair")
        .done()
        .expect("hide existed");
    assert!(!h.cached(CacheKey::HidesByUser(viewer.id)).await);
    assert!(
        h.services
            .hides
            .get_by_user(viewer.id)
            .await
            .expect("hides")
            .is_empty()
    );
}

#[tokio::test]
async fn removing_a_comment_by_author_and_post_restores_count() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let commenter = h.user("bob").await;
    let post = h.post(owner.id).await;
    h.comment(commenter.id, post.id, "great light").await;

    // Warm the post, its comment list and the owner's post list.
    assert_eq!(h.reload_post(post.id).await.comment_count, 1);
    let comments = h.services.comments.get_by_post(post.id).await.expect("comments");
    assert_eq!(comments.len(), 1);
    h.services.posts.get_by_user(owner.id).await.expect("posts");

    let outcome = h
        .services
        .comments
        .delete_by_user_and_post(commenter.id, post.id)
        .await
        .expect("delete comment");
    assert_eq!(outcome, Outcome::Done(DeleteResult::new(1)));

    assert!(!h.cached(CacheKey::CommentsByPost(post.id)).await);
    assert!(!h.cached(CacheKey::Post(post.id)).await);
    assert!(!h.cached(CacheKey::PostsByUser(owner.id)).await);
    assert_eq!(h.reload_post(post.id).await.comment_count, 0);
    assert!(
        h.services
            .comments
            .get_by_post(post.id)
            .await
            .expect("comments")
            .is_empty()
    );
}

#[tokio::test]
async fn deleting_absent_entities_reports_them_missing() {
    let h = Harness::new();
    let user = h.user("alice").await;
    let post = h.post(user.id).await;
    let ghost = Uuid::new_v4();
    let writes_before = h.store.writes();

    let services = &h.services;
    let rejections = [
        services.users.delete(ghost).await.expect("user").rejection(),
        services.posts.delete(ghost).await.expect("post").rejection(),
        services.comments.delete(ghost).await.expect("comment").rejection(),
        services.likes.delete(ghost).await.expect("like").rejection(),
        services.followings.delete(ghost).await.expect("following").rejection(),
        services.hides.delete(ghost).await.expect("hide").rejection(),
        services
            .likes
            .delete_by_user_and_post(user.id, post.id)
            .await
            .expect("like pair")
            .rejection(),
        services
            .followings
            .delete_by_pair(user.id, ghost)
            .await
            .expect("following pair")
            .rejection(),
        services
            .hides
            .delete_by_user_and_post(user.id, post.id)
            .await
            .expect("hide pair")
            .rejection(),
        services
            .comments
            .delete_by_user_and_post(user.id, post.id)
            .await
            .expect("comment pair")
            .rejection(),
    ];
    let messages: Vec<String> = rejections
        .into_iter()
        .map(|rejection| rejection.expect("rejected").message())
        .collect();

    assert_eq!(
        messages,
        [
            "user doesn't exist",
            "post doesn't exist",
            "comment doesn't exist",
            "like doesn't exist",
            "following doesn't exist",
            "hide doesn't exist",
            "like doesn't exist",
            "following doesn't exist",
            "hide doesn't exist",
            "comment doesn't exist",
        ]
    );
    assert_eq!(h.store.writes(), writes_before);
    assert_eq!(h.reload_post(post.id).await.like_count, 0);
}

#[tokio::test]
async fn hide_singleton_outlives_its_document_until_expiry() {
    let h = Harness::new();
    let owner = h.user("alice").await;
    let viewer = h.user("bob").await;
    let post = h.post(owner.id).await;
    let hide = h
        .services
        .hides
        .create(viewer.id, post.id)
        .await
        .expect("hide")
        .done()
        .expect("hide accepted");

    let warmed = h.services.hides.get_by_id(hide.id).await.expect("read");
    assert_eq!(warmed.as_ref().map(|hide| hide.id), Some(hide.id));

    h.services
        .hides
        .delete(hide.id)
        .await
        .expect("unhide")
        .done()
        .expect("hide existed");

    assert_eq!(h.store.len(Collection::Hide), 0);
    assert!(h.cached(CacheKey::Hide(hide.id)).await);
    let stale = h.services.hides.get_by_id(hide.id).await.expect("read");
    assert_eq!(stale.map(|hide| hide.id), Some(hide.id));
}
