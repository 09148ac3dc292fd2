//! DTOs for directory service JSON payloads.
//!
//! The directory calls the handle `id` and the real name `name`.

use serde::{Deserialize, Serialize};

use crate::domain::ports::DirectoryUser;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DirectoryUserDto {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) alphabetic_name: String,
}

impl From<DirectoryUserDto> for DirectoryUser {
    fn from(dto: DirectoryUserDto) -> Self {
        Self {
            name: dto.id,
            real_name: dto.name,
            alphabetic_name: dto.alphabetic_name,
        }
    }
}
