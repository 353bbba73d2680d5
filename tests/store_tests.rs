mod common;

use attendlog::{AttendanceStore, MemoryStore, Patch, RecordPatch, SqliteStore, WorkMode};
use common::*;

fn open_patch(owner: &str, date: chrono::NaiveDate) -> RecordPatch {
    let mut patch = RecordPatch::new(owner, date);
    patch.sign_in_at = Patch::Set(local_dt(2025, 9, 1, 9, 0));
    patch.cumulative_break_duration_ms = Some(0);
    patch.total_hours_worked = Some(0.0);
    patch.work_mode = Some(WorkMode::Office);
    patch.location = Some("HQ".to_string());
    patch
}

async fn merge_semantics(store: &dyn AttendanceStore) {
    let date = day(2025, 9, 1);

    // first merge creates the record and stamps updated_at
    let rec = store.merge(open_patch("ada", date)).await.unwrap();
    assert!(rec.is_open());
    assert!(rec.updated_at.is_some());
    assert_eq!(rec.work_mode, Some(WorkMode::Office));
    assert_eq!(rec.location, "HQ");

    // Keep leaves fields alone; Set and Clear are explicit
    let mut patch = RecordPatch::new("ada", date);
    patch.break_in_at = Patch::Set(local_dt(2025, 9, 1, 12, 0));
    let rec = store.merge(patch).await.unwrap();
    assert!(rec.is_on_break());
    assert_eq!(rec.sign_in_at, Some(local_dt(2025, 9, 1, 9, 0)));
    assert_eq!(rec.location, "HQ");

    let mut patch = RecordPatch::new("ada", date);
    patch.break_in_at = Patch::Clear;
    patch.break_out_at = Patch::Set(local_dt(2025, 9, 1, 12, 30));
    patch.cumulative_break_duration_ms = Some(1_800_000);
    let rec = store.merge(patch).await.unwrap();
    assert!(!rec.is_on_break());
    assert!(rec.break_in_at.is_none());
    assert_eq!(rec.cumulative_break_duration_ms, 1_800_000);

    // point read returns the merged snapshot; other keys stay empty
    let fetched = store.get("ada", date).await.unwrap().unwrap();
    assert_eq!(fetched.cumulative_break_duration_ms, 1_800_000);
    assert!(store.get("ada", day(2025, 9, 2)).await.unwrap().is_none());
    assert!(store.get("bob", date).await.unwrap().is_none());
}

async fn range_queries(store: &dyn AttendanceStore) {
    for d in [3, 1, 2] {
        seed_closed_day(
            store,
            "ada",
            day(2025, 9, d),
            local_dt(2025, 9, d, 9, 0),
            local_dt(2025, 9, d, 17, 0),
            0,
            WorkMode::Office,
        )
        .await;
    }
    seed_closed_day(
        store,
        "bob",
        day(2025, 9, 2),
        local_dt(2025, 9, 2, 9, 0),
        local_dt(2025, 9, 2, 17, 0),
        0,
        WorkMode::Hybrid,
    )
    .await;

    // full history, ascending, owner-scoped
    let all = store.query("ada", None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(
        all.iter().map(|r| r.date).collect::<Vec<_>>(),
        vec![day(2025, 9, 1), day(2025, 9, 2), day(2025, 9, 3)]
    );

    // inclusive bounds on both ends
    let bounded = store
        .query("ada", Some((day(2025, 9, 2), day(2025, 9, 3))))
        .await
        .unwrap();
    assert_eq!(bounded.len(), 2);
    assert_eq!(bounded[0].date, day(2025, 9, 2));
}

#[tokio::test]
async fn memory_store_merge_semantics() {
    merge_semantics(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_store_range_queries() {
    range_queries(&MemoryStore::new()).await;
}

#[tokio::test]
async fn sqlite_store_merge_semantics() {
    merge_semantics(&SqliteStore::open_in_memory().unwrap()).await;
}

#[tokio::test]
async fn sqlite_store_range_queries() {
    range_queries(&SqliteStore::open_in_memory().unwrap()).await;
}

#[tokio::test]
async fn sqlite_store_persists_to_a_file() {
    let path = temp_out("sqlite_file", "sqlite");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.merge(open_patch("ada", day(2025, 9, 1))).await.unwrap();
    }

    // reopen and read back
    let store = SqliteStore::open(&path).unwrap();
    let rec = store.get("ada", day(2025, 9, 1)).await.unwrap().unwrap();
    assert_eq!(rec.sign_in_at, Some(local_dt(2025, 9, 1, 9, 0)));
    assert_eq!(rec.work_mode, Some(WorkMode::Office));
}

#[tokio::test]
async fn watchers_receive_post_merge_snapshots() {
    let store = MemoryStore::new();
    let date = day(2025, 9, 1);

    let mut rx = store.watch("ada", date).await.unwrap();
    assert!(rx.borrow().is_none());

    store.merge(open_patch("ada", date)).await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow().as_ref().unwrap().is_open());

    // a subscription taken after writes starts from the current snapshot
    let rx2 = store.watch("ada", date).await.unwrap();
    assert!(rx2.borrow().as_ref().unwrap().is_open());

    // writes to other keys do not signal this watcher
    store.merge(open_patch("ada", day(2025, 9, 2))).await.unwrap();
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn sqlite_watchers_receive_post_merge_snapshots() {
    let store = SqliteStore::open_in_memory().unwrap();
    let date = day(2025, 9, 1);

    let mut rx = store.watch("ada", date).await.unwrap();
    store.merge(open_patch("ada", date)).await.unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow().as_ref().unwrap().is_open());
}
