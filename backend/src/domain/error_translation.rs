//! Translation of port failures into the domain error taxonomy.
//!
//! Services rely on these conversions through `?`, so no store or source
//! error ever escapes a repository call untranslated.

use tracing::debug;

use super::ports::{SourceError, StoreError};
use super::Error;

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity } => Self::not_found(format!("{entity} not found")),
            StoreError::Conflict { message } => Self::conflict(message),
            StoreError::Rejected { message } => Self::invalid_argument(message),
            other @ (StoreError::Connection { .. } | StoreError::Query { .. }) => {
                debug!(error = %other, "local store failure");
                Self::internal(other.to_string())
            }
        }
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        let message = err.to_string();
        match err {
            SourceError::NotFound { .. } => Self::not_found(message),
            SourceError::Status { status, path } => {
                Self::remote_failure(message, Some(status), path)
            }
            SourceError::Transport { path, .. } | SourceError::Decode { path, .. } => {
                Self::remote_failure(message, None, path)
            }
        }
    }
}
