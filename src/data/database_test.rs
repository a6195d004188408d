//! Database tests

use super::*;
use std::sync::Arc;
use tempfile::TempDir;

use crate::error::AppError;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn new_video(author_id: UserId, title: &str) -> NewVideo {
    NewVideo {
        author_id,
        play_url: format!("https://cdn.example.com/{}.mp4", title),
        cover_url: format!("https://cdn.example.com/{}.jpg", title),
        title: title.to_string(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_user_insert_and_lookup() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = db.insert_user("alice", "hash-a").await.unwrap();
    assert!(alice.id > 0);
    assert_eq!(alice.follow_count, 0);
    assert_eq!(alice.follower_count, 0);

    let by_id = db.get_user(alice.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");
    let by_name = db.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, alice.id);

    let duplicate = db.insert_user("alice", "hash-b").await.unwrap_err();
    assert!(matches!(duplicate, AppError::UserAlreadyExists));

    assert!(db.get_user(9_999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_users_by_ids_skips_unknown_and_empty() {
    let (db, _temp_dir) = create_test_db().await;
    let alice = db.insert_user("alice", "h").await.unwrap();
    let bob = db.insert_user("bob", "h").await.unwrap();

    assert!(db.get_users_by_ids(&[]).await.unwrap().is_empty());

    let mut users = db
        .get_users_by_ids(&[bob.id, alice.id, 404, alice.id])
        .await
        .unwrap();
    users.sort_by_key(|user| user.id);
    let names: Vec<_> = users.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_follow_transition_is_idempotent() {
    let (db, _temp_dir) = create_test_db().await;
    let a = db.insert_user("a", "h").await.unwrap();
    let b = db.insert_user("b", "h").await.unwrap();

    let first = db
        .apply_follow_transition(a.id, b.id, EdgeAction::Add)
        .await
        .unwrap();
    let second = db
        .apply_follow_transition(a.id, b.id, EdgeAction::Add)
        .await
        .unwrap();
    assert_eq!(first, TransitionOutcome::Applied);
    assert_eq!(second, TransitionOutcome::Unchanged);

    assert_eq!(db.count_follow_edges(a.id, b.id).await.unwrap(), 1);
    let a = db.get_user(a.id).await.unwrap().unwrap();
    let b = db.get_user(b.id).await.unwrap().unwrap();
    assert_eq!(a.follower_count, 1);
    assert_eq!(a.follow_count, 0);
    assert_eq!(b.follow_count, 1);
    assert_eq!(b.follower_count, 0);
}

#[tokio::test]
async fn test_follow_then_unfollow_restores_counters() {
    let (db, _temp_dir) = create_test_db().await;
    let a = db.insert_user("a", "h").await.unwrap();
    let b = db.insert_user("b", "h").await.unwrap();

    db.apply_follow_transition(a.id, b.id, EdgeAction::Add)
        .await
        .unwrap();
    let outcome = db
        .apply_follow_transition(a.id, b.id, EdgeAction::Remove)
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::Applied);

    let again = db
        .apply_follow_transition(a.id, b.id, EdgeAction::Remove)
        .await
        .unwrap();
    assert_eq!(again, TransitionOutcome::Unchanged);

    assert_eq!(db.count_follow_edges(a.id, b.id).await.unwrap(), 0);
    let a = db.get_user(a.id).await.unwrap().unwrap();
    let b = db.get_user(b.id).await.unwrap().unwrap();
    assert_eq!((a.follow_count, a.follower_count), (0, 0));
    assert_eq!((b.follow_count, b.follower_count), (0, 0));
}

#[tokio::test]
async fn test_follow_missing_target_rolls_back_edge() {
    let (db, _temp_dir) = create_test_db().await;
    let b = db.insert_user("b", "h").await.unwrap();

    let error = db
        .apply_follow_transition(777, b.id, EdgeAction::Add)
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::NotFound));

    assert_eq!(db.count_follow_edges(777, b.id).await.unwrap(), 0);
    let b = db.get_user(b.id).await.unwrap().unwrap();
    assert_eq!(b.follow_count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_follows_do_not_lose_updates() {
    const FOLLOWERS: usize = 8;

    let (db, _temp_dir) = create_test_db().await;
    let db = Arc::new(db);
    let target = db.insert_user("target", "h").await.unwrap();
    let target_id = target.id;

    let mut follower_ids = Vec::new();
    for i in 0..FOLLOWERS {
        let follower = db.insert_user(&format!("fan{}", i), "h").await.unwrap();
        follower_ids.push(follower.id);
    }

    let handles: Vec<_> = follower_ids
        .iter()
        .map(|&follower_id| {
            let db = db.clone();
            tokio::spawn(async move {
                db.apply_follow_transition(target_id, follower_id, EdgeAction::Add)
                    .await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome, TransitionOutcome::Applied);
    }

    let target = db.get_user(target_id).await.unwrap().unwrap();
    assert_eq!(target.follower_count, FOLLOWERS as i64);
    assert_eq!(db.get_followers(target_id).await.unwrap().len(), FOLLOWERS);
    for follower_id in follower_ids {
        let follower = db.get_user(follower_id).await.unwrap().unwrap();
        assert_eq!(follower.follow_count, 1);
    }
}

#[tokio::test]
async fn test_following_lists_and_batch_flags() {
    let (db, _temp_dir) = create_test_db().await;
    let a = db.insert_user("a", "h").await.unwrap();
    let b = db.insert_user("b", "h").await.unwrap();
    let c = db.insert_user("c", "h").await.unwrap();

    // c follows a, then b
    db.apply_follow_transition(a.id, c.id, EdgeAction::Add)
        .await
        .unwrap();
    db.apply_follow_transition(b.id, c.id, EdgeAction::Add)
        .await
        .unwrap();

    let following: Vec<_> = db
        .get_following(c.id)
        .await
        .unwrap()
        .into_iter()
        .map(|user| user.username)
        .collect();
    assert_eq!(following, vec!["b", "a"]);

    let followers = db.get_followers(a.id).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id, c.id);

    let flags = db.following_among(c.id, &[a.id, b.id, c.id]).await.unwrap();
    assert!(flags.contains(&a.id));
    assert!(flags.contains(&b.id));
    assert!(!flags.contains(&c.id));
    assert!(db.following_among(c.id, &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_videos_before_cursor_are_strictly_older() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("author", "h").await.unwrap();

    for (title, published_at) in [("v100", 100), ("v90", 90), ("v80", 80), ("v70", 70)] {
        db.insert_video(&new_video(author.id, title), published_at)
            .await
            .unwrap();
    }

    let page: Vec<_> = db
        .get_videos_before(90, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|video| video.published_at)
        .collect();
    assert_eq!(page, vec![80, 70]);

    let by_author = db.get_videos_by_author(author.id).await.unwrap();
    assert_eq!(by_author.len(), 4);
    assert_eq!(by_author[0].published_at, 100);
    assert!(db.get_videos_by_author(404).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_transition_updates_video_counter() {
    let (db, _temp_dir) = create_test_db().await;
    let user = db.insert_user("fan", "h").await.unwrap();
    let video = db.insert_video(&new_video(user.id, "clip"), 1).await.unwrap();

    let outcome = db
        .apply_favorite_transition(user.id, video.id, EdgeAction::Add)
        .await
        .unwrap();
    assert_eq!(outcome, TransitionOutcome::Applied);
    let duplicate = db
        .apply_favorite_transition(user.id, video.id, EdgeAction::Add)
        .await
        .unwrap();
    assert_eq!(duplicate, TransitionOutcome::Unchanged);

    let flags = db.favorited_among(user.id, &[video.id]).await.unwrap();
    assert!(flags.contains(&video.id));
    let stored = db.get_video(video.id).await.unwrap().unwrap();
    assert_eq!(stored.favorite_count, 1);
    assert_eq!(db.get_favorite_video_ids(user.id).await.unwrap(), vec![video.id]);

    db.apply_favorite_transition(user.id, video.id, EdgeAction::Remove)
        .await
        .unwrap();
    let stored = db.get_video(video.id).await.unwrap().unwrap();
    assert_eq!(stored.favorite_count, 0);
    assert!(db.favorited_among(user.id, &[video.id]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_missing_video_rolls_back_edge() {
    let (db, _temp_dir) = create_test_db().await;
    let user = db.insert_user("fan", "h").await.unwrap();

    let error = db
        .apply_favorite_transition(user.id, 404, EdgeAction::Add)
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::NotFound));
    assert!(db.get_favorite_video_ids(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_insert_and_delete_keep_counter() {
    let (db, _temp_dir) = create_test_db().await;
    let user = db.insert_user("talker", "h").await.unwrap();
    let video = db.insert_video(&new_video(user.id, "clip"), 1).await.unwrap();

    let first = db
        .insert_comment(&NewComment {
            video_id: video.id,
            user_id: user.id,
            content: "first".to_string(),
        })
        .await
        .unwrap();
    let second = db
        .insert_comment(&NewComment {
            video_id: video.id,
            user_id: user.id,
            content: "second".to_string(),
        })
        .await
        .unwrap();
    assert!(second.id > first.id);

    let stored = db.get_video(video.id).await.unwrap().unwrap();
    assert_eq!(stored.comment_count, 2);

    let contents: Vec<_> = db
        .get_comments_by_video(video.id)
        .await
        .unwrap()
        .into_iter()
        .map(|comment| comment.content)
        .collect();
    assert_eq!(contents, vec!["first", "second"]);

    assert!(db.delete_comment(first.id).await.unwrap());
    assert!(!db.delete_comment(first.id).await.unwrap());
    let remaining = db.get_comments_by_video(video.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);

    let stored = db.get_video(video.id).await.unwrap().unwrap();
    assert_eq!(stored.comment_count, 1);
}

#[tokio::test]
async fn test_comment_on_missing_video_is_not_found() {
    let (db, _temp_dir) = create_test_db().await;

    let error = db
        .insert_comment(&NewComment {
            video_id: 404,
            user_id: 1,
            content: "hello".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::NotFound));
    assert!(db.get_comments_by_video(404).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_by_missing_user_rolls_back_counter() {
    let (db, _temp_dir) = create_test_db().await;
    let author = db.insert_user("author", "h").await.unwrap();
    let video = db.insert_video(&new_video(author.id, "clip"), 1).await.unwrap();

    let error = db
        .insert_comment(&NewComment {
            video_id: video.id,
            user_id: 999,
            content: "ghost".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::NotFound));

    let stored = db.get_video(video.id).await.unwrap().unwrap();
    assert_eq!(stored.comment_count, 0);
    assert!(db.get_comments_by_video(video.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_video_by_missing_author_is_not_stored() {
    let (db, _temp_dir) = create_test_db().await;

    let error = db
        .insert_video(&new_video(999, "orphan"), 50)
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::NotFound));

    assert!(db.get_videos_before(i64::MAX, 10).await.unwrap().is_empty());
    assert!(db.get_videos_by_author(999).await.unwrap().is_empty());

    // the failed insert leaves the store writable
    let author = db.insert_user("author", "h").await.unwrap();
    let video = db.insert_video(&new_video(author.id, "clip"), 60).await.unwrap();
    assert_eq!(db.get_video(video.id).await.unwrap().unwrap().title, "clip");
}
