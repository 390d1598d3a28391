use assessment_core::model::{AnswerMap, AnswerOption, QuestionId, RevealSet};
use assessment_core::session::{QuizStatus, SessionState};
use assessment_core::time::fixed_now;
use storage::repository::{SnapshotRepository, Storage};
use storage::snapshot::{SNAPSHOT_KEY, SnapshotRecord};
use storage::sqlite::SqliteRepository;

fn in_progress_state() -> SessionState {
    let mut answers = AnswerMap::new();
    answers.insert(QuestionId::new(1), AnswerOption::C);
    answers.insert(QuestionId::new(2), AnswerOption::A);
    let mut shown = RevealSet::new();
    shown.insert(QuestionId::new(1), true);
    shown.insert(QuestionId::new(2), true);
    SessionState::from_parts(
        2,
        answers,
        shown,
        false,
        QuizStatus::InProgress,
        Some(fixed_now()),
    )
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_snapshot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snap_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let state = in_progress_state();
    let payload = SnapshotRecord::from_state(&state).encode().unwrap();
    repo.save_snapshot(SNAPSHOT_KEY, &payload).await.unwrap();

    let loaded = repo
        .load_snapshot(SNAPSHOT_KEY)
        .await
        .unwrap()
        .expect("snapshot present");
    let restored = SnapshotRecord::decode(&loaded).unwrap().into_state();
    assert_eq!(restored, state);
}

#[tokio::test]
async fn sqlite_save_replaces_and_clear_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snap_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.load_snapshot(SNAPSHOT_KEY).await.unwrap(), None);

    repo.save_snapshot(SNAPSHOT_KEY, "{}").await.unwrap();
    repo.save_snapshot(SNAPSHOT_KEY, r#"{"currentIndex":3}"#)
        .await
        .unwrap();
    repo.save_snapshot("another-quiz", "{}").await.unwrap();
    assert_eq!(
        repo.load_snapshot(SNAPSHOT_KEY).await.unwrap().as_deref(),
        Some(r#"{"currentIndex":3}"#)
    );

    repo.clear_snapshot(SNAPSHOT_KEY).await.unwrap();
    assert_eq!(repo.load_snapshot(SNAPSHOT_KEY).await.unwrap(), None);
    assert!(repo.load_snapshot("another-quiz").await.unwrap().is_some());

    repo.clear_snapshot(SNAPSHOT_KEY).await.unwrap();
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_snap_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn storage_sqlite_wires_snapshot_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_snap_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .snapshots
        .save_snapshot(SNAPSHOT_KEY, r#"{"completed":true}"#)
        .await
        .unwrap();

    let payload = storage
        .snapshots
        .load_snapshot(SNAPSHOT_KEY)
        .await
        .unwrap()
        .unwrap();
    let state = SnapshotRecord::decode(&payload).unwrap().into_state();
    assert_eq!(state.status(), QuizStatus::Completed);
}
