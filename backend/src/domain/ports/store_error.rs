//! Error shared by every local store port.

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by store adapters.
    pub enum StoreError {
        /// Addressed row does not exist.
        NotFound { entity: String } =>
            "{entity} not found",
        /// A uniqueness rule would be violated.
        Conflict { message: String } =>
            "store conflict: {message}",
        /// Write refused because it would break a stored invariant.
        Rejected { message: String } =>
            "store rejected write: {message}",
        /// Store connection could not be established.
        Connection { message: String } =>
            "store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "store query failed: {message}",
    }
}
