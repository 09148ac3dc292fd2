//! Repositories wired over a fixture dataset read from disk.

use std::path::PathBuf;
use std::sync::Arc;

use portfolio::domain::ports::UserStore;
use portfolio::domain::{ErrorCode, EventId, EventLevel, GetUsersArgs, UserId, UserRecord};
use portfolio::outbound::fixtures::{FixtureLoadError, FixtureSources};
use portfolio::state::{Repositories, SourcePorts, StorePorts};
use portfolio::test_support::MemoryStore;
use portfolio::test_support::cap_fs::write_file;
use rstest::{fixture, rstest};
use uuid::Uuid;

const ALICE: &str = "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01";
const BOB: &str = "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d02";
const CAROL: &str = "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d03";
const RETRO: &str = "5a3c4f2e-1b7d-4d8a-9f3e-2c1b0a9d8e7f";

const DATASET: &str = r#"{
    "presence": [
        {"id": "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01", "name": "alice", "displayName": "Alice", "state": 1},
        {"id": "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d02", "name": "bob", "state": 2},
        {"id": "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d03", "name": "carol", "state": 1}
    ],
    "directory": [
        {"id": "alice", "name": "Alice Liddell"},
        {"id": "bob", "name": "Bob Hope"}
    ],
    "calendar": [{
        "eventId": "5a3c4f2e-1b7d-4d8a-9f3e-2c1b0a9d8e7f",
        "name": "retro",
        "timeStart": "2024-04-01T09:00:00Z",
        "timeEnd": "2024-04-01T10:00:00Z",
        "admins": ["0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01"]
    }]
}"#;

/// Dataset file removed again when the test finishes.
struct DatasetFile(PathBuf);

impl Drop for DatasetFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn write_dataset(contents: &str) -> DatasetFile {
    let path = std::env::temp_dir().join(format!("portfolio-fixture-{}.json", Uuid::new_v4()));
    write_file(&path, contents.as_bytes()).expect("dataset written");
    DatasetFile(path)
}

fn id(value: &str) -> UserId {
    UserId::parse(value).expect("fixture user id")
}

#[fixture]
fn dataset() -> DatasetFile {
    write_dataset(DATASET)
}

async fn wire(dataset: &DatasetFile) -> (Repositories, Arc<MemoryStore>) {
    let sources = FixtureSources::load(&dataset.0).expect("dataset loads");
    let store = Arc::new(MemoryStore::default());
    for (user, name) in [(ALICE, "alice"), (BOB, "bob")] {
        store
            .create_user(&UserRecord {
                id: id(user),
                name: name.to_owned(),
                bio: String::new(),
                check: true,
            })
            .await
            .expect("local row");
    }
    let repositories = Repositories::assemble(
        StorePorts::shared(Arc::clone(&store)),
        SourcePorts {
            presence: Arc::new(sources.presence),
            directory: Arc::new(sources.directory),
            calendar: Arc::new(sources.calendar),
        },
    );
    (repositories, store)
}

#[rstest]
#[tokio::test]
async fn listing_keeps_only_visible_users_with_local_rows(dataset: DatasetFile) {
    let (repositories, _store) = wire(&dataset).await;

    let visible = repositories
        .users
        .get_users(&GetUsersArgs::default())
        .await
        .expect("listing");
    let ids: Vec<UserId> = visible.iter().map(|user| user.id).collect();
    assert_eq!(ids, vec![id(ALICE)], "bob is suspended and carol has no local row");
    assert_eq!(visible[0].real_name, "Alice Liddell");

    let everyone = repositories
        .users
        .get_users(&GetUsersArgs {
            include_suspended: Some(true),
            name: None,
        })
        .await
        .expect("listing with suspended");
    assert_eq!(everyone.len(), 2);
}

#[rstest]
#[tokio::test]
async fn user_without_local_row_is_not_found(dataset: DatasetFile) {
    let (repositories, _store) = wire(&dataset).await;

    let err = repositories
        .users
        .get_user(&id(CAROL))
        .await
        .expect_err("carol only exists remotely");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn admin_sees_owned_events_with_levels(dataset: DatasetFile) {
    let (repositories, _store) = wire(&dataset).await;
    let retro = EventId::parse(RETRO).expect("event id");

    repositories
        .events
        .create_event_level(&retro, EventLevel::Private)
        .await
        .expect("level stored");
    let owned = repositories
        .events
        .get_user_events(&id(ALICE))
        .await
        .expect("owned events");
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].level, EventLevel::Private);

    let none = repositories
        .events
        .get_user_events(&id(BOB))
        .await
        .expect("bob owns nothing");
    assert!(none.is_empty());
}

#[rstest]
#[tokio::test]
async fn level_for_unknown_event_is_not_found(dataset: DatasetFile) {
    let (repositories, _store) = wire(&dataset).await;

    let err = repositories
        .events
        .create_event_level(
            &EventId::parse("5a3c4f2e-1b7d-4d8a-9f3e-2c1b0a9d8e70").expect("event id"),
            EventLevel::Public,
        )
        .await
        .expect_err("calendar does not know the event");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
fn malformed_dataset_reports_json_error() {
    let file = write_dataset("{\"presence\": [");
    let err = FixtureSources::load(&file.0).expect_err("truncated JSON");
    assert!(matches!(err, FixtureLoadError::Json(_)));
}
