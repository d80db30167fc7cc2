mod common;

use common::TestApp;
use uuid::Uuid;
use vireo_client::error::ClientError;

#[tokio::test]
async fn like_is_visible_from_both_sides() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let bob = app.seed_user("bob").await;
    let post = app.seed_post(bob, "clip").await;

    app.relationships
        .like(alice, post.id)
        .await
        .expect("like succeeds");

    assert_eq!(
        app.queries.liked_post_ids(alice).await.expect("liked ids"),
        vec![post.id]
    );
    assert_eq!(
        app.queries.post_likers(post.id).await.expect("likers"),
        vec![alice]
    );

    let liked = app.queries.liked_posts(alice).await.expect("liked posts");
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].id, post.id);
}

#[tokio::test]
async fn like_twice_is_duplicate() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let bob = app.seed_user("bob").await;
    let post = app.seed_post(bob, "clip").await;

    app.relationships
        .like(alice, post.id)
        .await
        .expect("first like succeeds");
    let err = app
        .relationships
        .like(alice, post.id)
        .await
        .expect_err("second like fails");
    assert!(matches!(err, ClientError::Duplicate(_)));

    assert_eq!(
        app.queries.liked_post_ids(alice).await.expect("liked ids"),
        vec![post.id]
    );
}

#[tokio::test]
async fn like_unknown_post_is_not_found() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;

    let err = app
        .relationships
        .like(alice, Uuid::new_v4())
        .await
        .expect_err("unknown post fails");
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(app
        .queries
        .liked_post_ids(alice)
        .await
        .expect("liked ids")
        .is_empty());
}

#[tokio::test]
async fn like_unknown_user_is_not_found() {
    let app = TestApp::new();
    let bob = app.seed_user("bob").await;
    let post = app.seed_post(bob, "clip").await;

    let err = app
        .relationships
        .like(Uuid::new_v4(), post.id)
        .await
        .expect_err("unknown user fails");
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(app
        .queries
        .post_likers(post.id)
        .await
        .expect("likers")
        .is_empty());
}

#[tokio::test]
async fn unlike_removes_the_edge_and_is_idempotent() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let bob = app.seed_user("bob").await;
    let post = app.seed_post(bob, "clip").await;

    app.relationships
        .like(alice, post.id)
        .await
        .expect("like succeeds");
    app.relationships
        .unlike(alice, post.id)
        .await
        .expect("unlike succeeds");

    assert!(app
        .queries
        .liked_post_ids(alice)
        .await
        .expect("liked ids")
        .is_empty());
    assert!(app
        .queries
        .post_likers(post.id)
        .await
        .expect("likers")
        .is_empty());

    app.relationships
        .unlike(alice, post.id)
        .await
        .expect("repeat unlike is a no-op");
}

#[tokio::test]
async fn likes_from_different_users_stay_separate() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let carol = app.seed_user("carol").await;
    let bob = app.seed_user("bob").await;
    let post = app.seed_post(bob, "clip").await;

    app.relationships
        .like(alice, post.id)
        .await
        .expect("alice like succeeds");
    app.relationships
        .like(carol, post.id)
        .await
        .expect("carol like succeeds");
    app.relationships
        .unlike(alice, post.id)
        .await
        .expect("alice unlike succeeds");

    assert_eq!(
        app.queries.post_likers(post.id).await.expect("likers"),
        vec![carol]
    );
}
