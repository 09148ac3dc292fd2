//! Shared Diesel and pool error mapping for the store adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map pool errors to [`StoreError::Connection`].
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Name the referenced entity from a foreign key constraint.
///
/// Constraint names follow PostgreSQL's `<table>_<column>_fkey` default.
fn referenced_entity(constraint_name: Option<&str>, message: &str) -> &'static str {
    let haystack = constraint_name.unwrap_or(message);
    if haystack.contains("user_id") || haystack.contains("leader") {
        "user"
    } else if haystack.contains("contest_id") {
        "contest"
    } else if haystack.contains("team_id") {
        "contest team"
    } else if haystack.contains("project_id") {
        "project"
    } else if haystack.contains("group_id") {
        "group"
    } else {
        "referenced row"
    }
}

/// Map Diesel errors to store errors.
///
/// Unique violations become [`StoreError::Conflict`] and foreign key
/// violations become [`StoreError::NotFound`] for the referenced entity.
pub(crate) fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreError::not_found("record"),
        DieselError::QueryBuilderError(_) => StoreError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => StoreError::conflict(
                info.constraint_name()
                    .map_or_else(|| info.message().to_owned(), str::to_owned),
            ),
            DatabaseErrorKind::ForeignKeyViolation => StoreError::not_found(referenced_entity(
                info.constraint_name(),
                info.message(),
            )),
            DatabaseErrorKind::ClosedConnection => {
                StoreError::connection("database connection error")
            }
            _ => StoreError::query("database error"),
        },
        _ => StoreError::query("database error"),
    }
}

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}

/// Treat zero affected rows as a missing `entity`.
pub(crate) fn expect_one(affected: usize, entity: &str) -> Result<(), StoreError> {
    if affected == 0 {
        Err(StoreError::not_found(entity))
    } else {
        Ok(())
    }
}

/// Map a decoding failure of a persisted row.
pub(crate) fn corrupt_row(table: &str, detail: impl std::fmt::Display) -> StoreError {
    debug!(table, %detail, "persisted row failed validation");
    StoreError::query(format!("corrupt {table} row: {detail}"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for Diesel error classification.

    use super::*;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, StoreError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_is_a_conflict() {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"projects_name_key\"",
        ));
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[rstest]
    #[case::member_user("insert violates \"project_members_user_id_fkey\"", "user")]
    #[case::group_leader("insert violates \"groups_leader_fkey\"", "user")]
    #[case::team_contest("insert violates \"contest_teams_contest_id_fkey\"", "contest")]
    #[case::unknown("insert violates \"mystery_fkey\"", "referenced row")]
    fn foreign_key_violation_names_the_referenced_entity(
        #[case] message: &str,
        #[case] entity: &str,
    ) {
        let err = map_diesel_error(database_error(
            DatabaseErrorKind::ForeignKeyViolation,
            message,
        ));
        assert_eq!(err, StoreError::not_found(entity));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    fn affected_rows_decide_not_found(#[case] affected: usize, #[case] ok: bool) {
        let result = expect_one(affected, "account");
        assert_eq!(result.is_ok(), ok);
        if !ok {
            assert_eq!(result, Err(StoreError::not_found("account")));
        }
    }

    #[rstest]
    #[case::closed(DatabaseErrorKind::ClosedConnection, "Connection")]
    #[case::serialization(DatabaseErrorKind::SerializationFailure, "Query")]
    fn other_database_errors(#[case] kind: DatabaseErrorKind, #[case] expected: &str) {
        let err = map_diesel_error(database_error(kind, "boom"));
        match expected {
            "Connection" => assert!(matches!(err, StoreError::Connection { .. })),
            "Query" => assert!(matches!(err, StoreError::Query { .. })),
            _ => panic!("unsupported expectation: {expected}"),
        }
    }
}
