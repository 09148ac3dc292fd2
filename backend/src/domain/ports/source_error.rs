//! Error shared by every remote source port.

use super::define_port_error;

define_port_error! {
    /// Failures raised by remote source adapters.
    ///
    /// Adapters only report [`SourceError::NotFound`] for single-record
    /// lookups; a 404 on a listing endpoint is an ordinary status failure.
    pub enum SourceError {
        /// Single-record lookup answered 404.
        NotFound { path: String } =>
            "remote record not found at {path}",
        /// Remote answered with a non-success status.
        Status { status: u16, path: String } =>
            "remote request to {path} failed with status {status}",
        /// Network transport failed before a response arrived.
        Transport { path: String, message: String } =>
            "remote transport to {path} failed: {message}",
        /// Response body could not be decoded.
        Decode { path: String, message: String } =>
            "remote response from {path} could not be decoded: {message}",
    }
}

impl SourceError {
    /// Path of the request that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::Status { path, .. }
            | Self::Transport { path, .. }
            | Self::Decode { path, .. } => path,
        }
    }
}
