//! Fixture remote sources loaded from a JSON dataset.
//!
//! The dataset uses the same wire shapes as the live services, so a capture
//! of real responses can be replayed offline:
//!
//! ```json
//! {
//!   "presence": [{"id": "...", "name": "alice", "displayName": "Alice", "state": 1}],
//!   "directory": [{"id": "alice", "name": "Alice Liddell"}],
//!   "calendar": [{"eventId": "...", "name": "retro", "timeStart": "...", "timeEnd": "..."}]
//! }
//! ```

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;

use super::calendar::dto::CalendarEventDto;
use super::directory::dto::DirectoryUserDto;
use super::presence::dto::PresenceUserDto;
use crate::domain::ports::{
    CalendarEvent, DirectoryUser, FixtureCalendarSource, FixtureDirectorySource,
    FixturePresenceSource, PresenceUser,
};

/// Errors raised while loading a fixture dataset.
#[derive(Debug, thiserror::Error)]
pub enum FixtureLoadError {
    #[error("failed to read fixture dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fixture dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture dataset holds an invalid record: {0}")]
    Record(String),
}

#[derive(Debug, Default, Deserialize)]
struct FixtureDataset {
    #[serde(default)]
    presence: Vec<PresenceUserDto>,
    #[serde(default)]
    directory: Vec<DirectoryUserDto>,
    #[serde(default)]
    calendar: Vec<CalendarEventDto>,
}

/// The three fixture sources built from one dataset.
#[derive(Debug, Clone, Default)]
pub struct FixtureSources {
    pub presence: FixturePresenceSource,
    pub directory: FixtureDirectorySource,
    pub calendar: FixtureCalendarSource,
}

impl FixtureSources {
    /// Decode a dataset held in memory.
    pub fn from_json(contents: &str) -> Result<Self, FixtureLoadError> {
        let dataset: FixtureDataset = serde_json::from_str(contents)?;
        let presence = dataset
            .presence
            .into_iter()
            .map(PresenceUserDto::into_domain)
            .collect::<Result<Vec<PresenceUser>, String>>()
            .map_err(FixtureLoadError::Record)?;
        let directory: Vec<DirectoryUser> = dataset
            .directory
            .into_iter()
            .map(DirectoryUser::from)
            .collect();
        let calendar: Vec<CalendarEvent> = dataset
            .calendar
            .into_iter()
            .map(CalendarEvent::from)
            .collect();
        Ok(Self {
            presence: FixturePresenceSource::new(presence),
            directory: FixtureDirectorySource::new(directory),
            calendar: FixtureCalendarSource::new(calendar),
        })
    }

    /// Read and decode the dataset at `path`.
    pub fn load(path: &Path) -> Result<Self, FixtureLoadError> {
        let read_error = |source| FixtureLoadError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "fixture path must name a file",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let contents = dir
            .read_to_string(Path::new(file_name))
            .map_err(read_error)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CalendarSource, DirectorySource, PresenceSource, PresenceUserQuery};
    use crate::domain::{UserId, UserState};

    const DATASET: &str = r#"{
        "presence": [
            {"id": "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01", "name": "alice", "displayName": "Alice", "state": 1},
            {"id": "0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d02", "name": "bob", "state": 2}
        ],
        "directory": [{"id": "alice", "name": "Alice Liddell"}],
        "calendar": [{
            "eventId": "5a3c4f2e-1b7d-4d8a-9f3e-2c1b0a9d8e7f",
            "name": "retro",
            "timeStart": "2024-04-01T09:00:00Z",
            "timeEnd": "2024-04-01T10:00:00Z",
            "admins": ["0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01"]
        }]
    }"#;

    #[tokio::test]
    async fn dataset_populates_all_sources() {
        let sources = FixtureSources::from_json(DATASET).expect("dataset decodes");

        let visible = sources
            .presence
            .list_users(&PresenceUserQuery::default())
            .await
            .expect("listing");
        assert_eq!(visible.len(), 1, "suspended bob is hidden by default");
        assert_eq!(visible[0].state, UserState::Active);

        let alice = sources.directory.get_user("alice").await.expect("alice");
        assert_eq!(alice.real_name, "Alice Liddell");

        let owner = UserId::parse("0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01").expect("uuid");
        let owned = sources
            .calendar
            .list_events_by_owner(&owner)
            .await
            .expect("owned events");
        assert_eq!(owned.len(), 1);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        FixtureSources::from_json("{}").expect("empty dataset");
    }

    #[test]
    fn unknown_presence_state_is_rejected() {
        let err = FixtureSources::from_json(
            r#"{"presence":[{"id":"0d7c7b0e-4c53-4a43-9a34-6d0f5a0d7d01","name":"x","state":7}]}"#,
        )
        .expect_err("bad state");
        assert!(matches!(err, FixtureLoadError::Record(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("portfolio-fixture-does-not-exist.json");
        let err = FixtureSources::load(&path).expect_err("missing file");
        assert!(err.to_string().contains("portfolio-fixture-does-not-exist.json"));
    }
}
