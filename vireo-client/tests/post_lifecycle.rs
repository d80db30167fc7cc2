mod common;

use common::{draft, video_upload, TestApp};
use uuid::Uuid;
use vireo_client::domain::MediaRef;
use vireo_client::error::ClientError;
use vireo_client::services::PostEdit;
use vireo_client::store::memory::FaultPoint;

#[tokio::test]
async fn create_post_uploads_both_files() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;

    let post = app.seed_post(alice, "first clip").await;

    assert_eq!(post.creator, alice);
    assert!(app.store.file_exists("media", &post.video));
    assert!(app.store.file_exists("media", &post.thumbnail));

    let fetched = app.queries.get_post(post.id).await.expect("post readable");
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn create_post_requires_fresh_assets() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;

    let mut remote_draft = draft("clip");
    remote_draft.video = MediaRef::Remote("someone-elses-file".to_string());

    let err = app
        .posts
        .create_post(alice, remote_draft)
        .await
        .expect_err("remote asset fails");
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(app.store.file_count("media"), 0);
}

#[tokio::test]
async fn create_post_requires_a_title() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;

    let err = app
        .posts
        .create_post(alice, draft("   "))
        .await
        .expect_err("blank title fails");
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn create_post_for_unknown_owner_is_not_found() {
    let app = TestApp::new();

    let err = app
        .posts
        .create_post(Uuid::new_v4(), draft("clip"))
        .await
        .expect_err("unknown owner fails");
    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(app.store.file_count("media"), 0);
}

#[tokio::test]
async fn failed_document_write_reclaims_the_uploads() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;

    app.store.fail_next(FaultPoint::CreateDocument);
    let err = app
        .posts
        .create_post(alice, draft("clip"))
        .await
        .expect_err("document write fails");
    assert!(matches!(err, ClientError::Transport(_)));

    assert_eq!(app.store.file_count("media"), 0);
    assert!(app
        .queries
        .user_posts(alice)
        .await
        .expect("user posts")
        .is_empty());
}

#[tokio::test]
async fn edit_by_non_creator_is_forbidden_and_changes_nothing() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let mallory = app.seed_user("mallory").await;
    let post = app.seed_post(alice, "original").await;

    let err = app
        .posts
        .edit_post(
            post.id,
            mallory,
            PostEdit {
                title: Some("hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect_err("non-creator edit fails");
    assert!(matches!(err, ClientError::Forbidden(_)));

    let fetched = app.queries.get_post(post.id).await.expect("post readable");
    assert_eq!(fetched, post);
    assert!(app.store.file_exists("media", &post.video));
    assert!(app.store.file_exists("media", &post.thumbnail));
}

#[tokio::test]
async fn edit_replaces_the_video_and_keeps_the_thumbnail() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "original").await;

    let edited = app
        .posts
        .edit_post(
            post.id,
            alice,
            PostEdit {
                video: Some(video_upload("replacement")),
                ..Default::default()
            },
        )
        .await
        .expect("edit succeeds");

    assert_ne!(edited.video, post.video);
    assert!(!app.store.file_exists("media", &post.video));
    assert!(app.store.file_exists("media", &edited.video));

    assert_eq!(edited.thumbnail, post.thumbnail);
    assert!(app.store.file_exists("media", &post.thumbnail));
    assert_eq!(edited.title, post.title);
}

#[tokio::test]
async fn edit_title_only_keeps_both_files() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "original").await;

    let edited = app
        .posts
        .edit_post(
            post.id,
            alice,
            PostEdit {
                title: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("edit succeeds");

    assert_eq!(edited.title, "renamed");
    assert_eq!(edited.video, post.video);
    assert_eq!(edited.thumbnail, post.thumbnail);
    assert_eq!(app.store.file_count("media"), 2);
}

#[tokio::test]
async fn edit_with_current_remote_refs_keeps_the_files() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "original").await;

    let edited = app
        .posts
        .edit_post(
            post.id,
            alice,
            PostEdit {
                video: Some(MediaRef::Remote(post.video.clone())),
                thumbnail: Some(MediaRef::Remote(post.thumbnail.clone())),
                ..Default::default()
            },
        )
        .await
        .expect("edit succeeds");

    assert_eq!(edited.video, post.video);
    assert_eq!(edited.thumbnail, post.thumbnail);
    assert_eq!(app.store.file_count("media"), 2);
}

#[tokio::test]
async fn edit_with_foreign_remote_ref_is_rejected() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "original").await;

    let err = app
        .posts
        .edit_post(
            post.id,
            alice,
            PostEdit {
                video: Some(MediaRef::Remote("not-this-posts-file".to_string())),
                ..Default::default()
            },
        )
        .await
        .expect_err("foreign file ref fails");
    assert!(matches!(err, ClientError::Validation(_)));

    let fetched = app.queries.get_post(post.id).await.expect("post readable");
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn failed_edit_write_keeps_the_old_files_live() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "original").await;

    app.store.fail_document(FaultPoint::UpdateDocument, post.id);
    let err = app
        .posts
        .edit_post(
            post.id,
            alice,
            PostEdit {
                video: Some(video_upload("replacement")),
                ..Default::default()
            },
        )
        .await
        .expect_err("document write fails");
    assert!(matches!(err, ClientError::Transport(_)));

    let fetched = app.queries.get_post(post.id).await.expect("post readable");
    assert_eq!(fetched.video, post.video);
    assert!(app.store.file_exists("media", &post.video));
    // the staged replacement upload was reclaimed
    assert_eq!(app.store.file_count("media"), 2);
}

#[tokio::test]
async fn delete_post_removes_the_document_and_both_files() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "clip").await;

    app.posts
        .delete_post(post.id, alice)
        .await
        .expect("delete succeeds");

    let err = app
        .queries
        .get_post(post.id)
        .await
        .expect_err("post is gone");
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(!app.store.file_exists("media", &post.video));
    assert!(!app.store.file_exists("media", &post.thumbnail));
}

#[tokio::test]
async fn delete_by_non_owner_is_forbidden_and_keeps_everything() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let mallory = app.seed_user("mallory").await;
    let post = app.seed_post(alice, "clip").await;

    let err = app
        .posts
        .delete_post(post.id, mallory)
        .await
        .expect_err("non-owner delete fails");
    assert!(matches!(err, ClientError::Forbidden(_)));

    assert!(app.queries.get_post(post.id).await.is_ok());
    assert!(app.store.file_exists("media", &post.video));
    assert!(app.store.file_exists("media", &post.thumbnail));
}

#[tokio::test]
async fn partial_delete_failure_is_surfaced_without_rollback() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;
    let post = app.seed_post(alice, "clip").await;

    app.store.fail_next(FaultPoint::DeleteFile);
    let err = app
        .posts
        .delete_post(post.id, alice)
        .await
        .expect_err("partial failure surfaces");
    assert!(matches!(err, ClientError::Transport(_)));

    // the document delete went through and stays deleted
    let err = app
        .queries
        .get_post(post.id)
        .await
        .expect_err("post document is gone");
    assert!(matches!(err, ClientError::NotFound(_)));

    // the failed file delete is not retried; the orphan stays behind
    assert!(app.store.file_exists("media", &post.video));
    assert!(!app.store.file_exists("media", &post.thumbnail));
}

#[tokio::test]
async fn create_search_delete_round_trip() {
    let app = TestApp::new();
    let alice = app.seed_user("alice").await;

    let post = app.seed_post(alice, "T1").await;

    let mine = app.queries.user_posts(alice).await.expect("user posts");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "T1");

    let found = app.queries.search_posts("T1").await.expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, post.id);

    app.posts
        .delete_post(post.id, alice)
        .await
        .expect("delete succeeds");

    assert!(app
        .queries
        .user_posts(alice)
        .await
        .expect("user posts")
        .is_empty());
    let err = app
        .queries
        .get_post(post.id)
        .await
        .expect_err("post is gone");
    assert!(matches!(err, ClientError::NotFound(_)));
}
