//! DTOs for presence service JSON payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::PresenceUser;
use crate::domain::{UserId, UserState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresenceUserDto {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) display_name: String,
    #[serde(default)]
    pub(crate) bot: bool,
    pub(crate) state: i64,
}

impl PresenceUserDto {
    pub(crate) fn into_domain(self) -> Result<PresenceUser, String> {
        let state = UserState::from_code(self.state)
            .ok_or_else(|| format!("user {} has unknown state {}", self.id, self.state))?;
        Ok(PresenceUser {
            id: UserId::from_uuid(self.id),
            name: self.name,
            display_name: self.display_name,
            state,
            bot: self.bot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_state_code_is_rejected() {
        let dto: PresenceUserDto = serde_json::from_str(
            r#"{"id":"7b0c1f06-7d1f-4b8e-9a4a-0f6f1f8c2d11","name":"alice","state":9}"#,
        )
        .expect("shape decodes");
        let err = dto.into_domain().expect_err("state 9 is not a presence state");
        assert!(err.contains("unknown state 9"));
    }
}
