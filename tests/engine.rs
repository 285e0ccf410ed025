use chrono::NaiveDate;
use futures::future::join_all;

use tanuki::database::{Database, DatabaseConfig, Record};
use tanuki::model::{User, Video, VideoId};
use tanuki::service::{blobs, catalog, favorites, histogram, ledger, users, EngineError};

async fn memdb() -> Database {
    Database::connect(&DatabaseConfig::memory())
        .await
        .expect("connect to an in-memory database")
}

fn video(name: &str, category: &str, payload: &[u8]) -> Video {
    Video::new(
        name.to_string(),
        category.to_string(),
        "video/mp4".to_string(),
        payload.to_vec(),
    )
}

fn user(id: &str) -> User {
    User::new(
        Record::new(id),
        "opaque-credential".to_string(),
        "member".to_string(),
    )
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn upload_then_fetch_returns_exact_payload() {
    let db = memdb().await;
    let payload = b"\x00\x01binary video bytes\xff\xfe".to_vec();

    let id = blobs::put(&db, video("daily show", "talk", &payload))
        .await
        .unwrap();

    let stored = blobs::get(&db, &id).await.unwrap();

    assert_eq!(stored.payload, payload);
    assert_eq!(stored.content_type, "video/mp4");
    assert_eq!(stored.name, "daily show");
    assert_eq!(stored.views, 0);
}

#[tokio::test]
async fn payloads_survive_records_created_by_raw_sql() {
    let db = memdb().await;
    let payload = vec![0u8, 1, 2, 3, 255, 254];

    // bypass `put` so the storage representation itself is exercised
    let created: Vec<Video> = db
        .sql(
            "CREATE videos:direct SET name = 'direct', category = 'talk', \
             content_type = 'video/mp4', payload = $payload, views = 0, \
             created_at = time::now()",
        )
        .bind(("payload", payload.clone()))
        .fetch()
        .await
        .unwrap();
    assert_eq!(created.len(), 1);

    let stored = blobs::get(&db, &Record::new("direct")).await.unwrap();
    assert_eq!(stored.payload, payload);
}

#[tokio::test]
async fn fetching_a_missing_video_is_not_found_and_leaves_stats_untouched() {
    let db = memdb().await;
    let missing: VideoId = Record::new("does-not-exist");

    let error = blobs::get(&db, &missing).await.unwrap_err();
    assert!(matches!(error, EngineError::NotFound { .. }));

    let error = ledger::record_view(&db, &missing).await.unwrap_err();
    assert!(matches!(error, EngineError::NotFound { .. }));

    let stats = ledger::stats(&db).await.unwrap();
    assert_eq!(stats.total_views, 0);
    assert_eq!(stats.total_signups, 0);
    assert!(stats.signup_history.is_empty());
}

#[tokio::test]
async fn listing_filters_by_category() {
    let db = memdb().await;

    blobs::put(&db, video("a", "talk", b"a")).await.unwrap();
    blobs::put(&db, video("b", "talk", b"b")).await.unwrap();
    blobs::put(&db, video("c", "music", b"c")).await.unwrap();

    let all = catalog::list(&db, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let talk = catalog::list(&db, Some("talk")).await.unwrap();
    assert_eq!(talk.len(), 2);
    assert!(talk.iter().all(|summary| summary.category == "talk"));

    let none = catalog::list(&db, Some("sports")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn a_thousand_concurrent_views_count_exactly() {
    let db = memdb().await;
    let id = blobs::put(&db, video("popular", "talk", b"payload"))
        .await
        .unwrap();

    let tasks = (0..1000).map(|_| {
        let db = db.clone();
        let id = id.clone();
        tokio::spawn(async move { ledger::record_view(&db, &id).await })
    });

    for outcome in join_all(tasks).await {
        outcome.expect("task completed").expect("view recorded");
    }

    let stored = blobs::get(&db, &id).await.unwrap();
    assert_eq!(stored.views, 1000, "no lost updates on the video counter");

    let stats = ledger::stats(&db).await.unwrap();
    assert_eq!(stats.total_views, 1000, "no lost updates on the global counter");
}

#[tokio::test]
async fn homepage_views_only_move_the_global_counter() {
    let db = memdb().await;
    let id = blobs::put(&db, video("show", "talk", b"payload"))
        .await
        .unwrap();

    ledger::record_homepage_view(&db).await.unwrap();
    ledger::record_homepage_view(&db).await.unwrap();
    let views = ledger::record_view(&db, &id).await.unwrap();

    assert_eq!(views, 1);

    let stats = ledger::stats(&db).await.unwrap();
    assert_eq!(
        stats.total_views, 3,
        "global total counts homepage visits too, so it exceeds the per-video sum"
    );
}

#[tokio::test]
async fn same_day_signups_share_one_histogram_entry() {
    let db = memdb().await;
    let today = date("2024-05-01");

    histogram::record_signup(&db, today).await.unwrap();
    let total = histogram::record_signup(&db, today).await.unwrap();

    assert_eq!(total, 2);

    let stats = ledger::stats(&db).await.unwrap();
    assert_eq!(stats.total_signups, 2);
    assert_eq!(stats.signup_history.len(), 1);
    assert_eq!(stats.signup_history[0].date, today);
    assert_eq!(stats.signup_history[0].count, 2);
}

#[tokio::test]
async fn signups_on_different_days_get_separate_entries() {
    let db = memdb().await;

    histogram::record_signup(&db, date("2024-05-01")).await.unwrap();
    histogram::record_signup(&db, date("2024-05-02")).await.unwrap();

    let stats = ledger::stats(&db).await.unwrap();
    assert_eq!(stats.total_signups, 2);
    assert_eq!(stats.signup_history.len(), 2);
    assert!(stats.signup_history.iter().all(|entry| entry.count == 1));
}

#[tokio::test]
async fn concurrent_same_day_signups_all_land_in_one_entry() {
    let db = memdb().await;
    let today = date("2024-05-01");

    let tasks = (0..8).map(|_| {
        let db = db.clone();
        tokio::spawn(async move { histogram::record_signup(&db, today).await })
    });

    for outcome in join_all(tasks).await {
        outcome.expect("task completed").expect("signup recorded");
    }

    let stats = ledger::stats(&db).await.unwrap();
    assert_eq!(stats.total_signups, 8);
    assert_eq!(stats.signup_history.len(), 1, "no duplicate entry for the date");
    assert_eq!(stats.signup_history[0].count, 8);
}

#[tokio::test]
async fn toggle_adds_then_removes() {
    let db = memdb().await;
    let account = users::create(&db, user("viewer@example.com")).await.unwrap();
    let id = blobs::put(&db, video("show", "talk", b"payload"))
        .await
        .unwrap();

    let set = favorites::toggle(&db, &account.id, &id).await.unwrap();
    assert_eq!(set, vec![id.clone()]);

    let set = favorites::toggle(&db, &account.id, &id).await.unwrap();
    assert!(set.is_empty(), "toggling twice returns to the original set");
}

#[tokio::test]
async fn concurrent_toggles_preserve_parity() {
    let db = memdb().await;
    let account = users::create(&db, user("viewer@example.com")).await.unwrap();
    let id: VideoId = Record::new("some-video");

    let tasks = (0..10).map(|_| {
        let db = db.clone();
        let user = account.id.clone();
        let id = id.clone();
        tokio::spawn(async move { favorites::toggle(&db, &user, &id).await })
    });

    for outcome in join_all(tasks).await {
        outcome.expect("task completed").expect("toggle applied");
    }

    let stored = users::find(&db, &account.id).await.unwrap();
    assert!(
        stored.favorites.is_empty(),
        "an even number of toggles lands back on the initial membership"
    );

    favorites::toggle(&db, &account.id, &id).await.unwrap();
    let stored = users::find(&db, &account.id).await.unwrap();
    assert_eq!(stored.favorites, vec![id]);
}

#[tokio::test]
async fn toggling_an_unknown_video_still_succeeds() {
    let db = memdb().await;
    let account = users::create(&db, user("viewer@example.com")).await.unwrap();
    let ghost: VideoId = Record::new("never-uploaded");

    let set = favorites::toggle(&db, &account.id, &ghost).await.unwrap();
    assert_eq!(set, vec![ghost], "favorites tolerate dangling references");
}

#[tokio::test]
async fn toggling_for_a_missing_user_is_not_found() {
    let db = memdb().await;
    let ghost: VideoId = Record::new("some-video");

    let error = favorites::toggle(&db, &Record::new("nobody@example.com"), &ghost)
        .await
        .unwrap_err();

    assert!(matches!(error, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn resolving_favorites_skips_dangling_references() {
    let db = memdb().await;
    let account = users::create(&db, user("viewer@example.com")).await.unwrap();
    let real = blobs::put(&db, video("show", "talk", b"payload"))
        .await
        .unwrap();
    let ghost: VideoId = Record::new("deleted-long-ago");

    favorites::toggle(&db, &account.id, &real).await.unwrap();
    favorites::toggle(&db, &account.id, &ghost).await.unwrap();

    let resolved = favorites::resolve(&db, &account.id).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, real);
}
