use storage::json::{read_json, write_json};
use storage::keys;
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use study_core::model::{AssignmentId, Milestone, PlanId, TrackerState};

#[tokio::test]
async fn sqlite_set_get_replace_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_basic?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("missing").await.unwrap(), None);

    repo.set("a", "1").await.unwrap();
    repo.set("a", "2").await.unwrap();
    assert_eq!(repo.get("a").await.unwrap().as_deref(), Some("2"));

    repo.remove("a").await.unwrap();
    assert_eq!(repo.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("kept", "yes").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("kept").await.unwrap().as_deref(), Some("yes"));
}

#[tokio::test]
async fn tracker_state_round_trips_through_sqlite_storage() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_tracker?mode=memory&cache=shared")
        .await
        .expect("sqlite storage");
    let plan_id = PlanId::new("2");
    let state = TrackerState {
        milestones: vec![
            Milestone::new("ds1", "Python fundamentals", "", 1).completed(true),
            Milestone::new("ds2", "NumPy and Pandas", "", 2),
        ],
        current_week: 2,
        notes: "revisit pandas joins".into(),
    };

    let key = keys::tracker_state(&plan_id);
    write_json(storage.kv.as_ref(), &key, &state).await.unwrap();
    let loaded: Option<TrackerState> = read_json(storage.kv.as_ref(), &key).await.unwrap();
    assert_eq!(loaded, Some(state));

    let other: Option<TrackerState> =
        read_json(storage.kv.as_ref(), &keys::quiz_answers(AssignmentId::new(1)))
            .await
            .unwrap();
    assert!(other.is_none());
}
