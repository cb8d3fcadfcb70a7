use repsheet::error::{DatabaseError, RepsheetError};

#[test]
fn test_repsheet_error_database() {
    let err = RepsheetError::Database(DatabaseError::Connection("test".to_string()));
    assert_eq!(err.to_string(), "Database error: Connection failed: test");
}

#[test]
fn test_repsheet_error_workout_not_found() {
    let err = RepsheetError::WorkoutNotFound { id: 42 };
    assert_eq!(err.to_string(), "Workout not found: 42");
    assert!(err.is_not_found());
}

#[test]
fn test_repsheet_error_user_not_found() {
    let err = RepsheetError::UserNotFound { id: 7 };
    assert_eq!(err.to_string(), "User not found: 7");
    assert!(err.is_not_found());
}

#[test]
fn test_repsheet_error_invalid_position() {
    let err = RepsheetError::InvalidPosition {
        position: 5,
        min: 0,
        max: 3,
    };
    assert_eq!(err.to_string(), "Invalid position 5: expected 0..=3");
    assert!(!err.is_not_found());
    assert!(!err.is_retryable());
}

#[test]
fn test_repsheet_error_config() {
    let err = RepsheetError::Config("missing url".to_string());
    assert_eq!(err.to_string(), "Configuration error: missing url");
}

#[test]
fn test_repsheet_error_internal() {
    let err = RepsheetError::Internal("boom".to_string());
    assert_eq!(err.to_string(), "Internal error: boom");
}

#[test]
fn test_repsheet_error_serialization() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: RepsheetError = json_err.into();
    assert!(err.to_string().starts_with("Serialization error:"));
}

#[test]
fn test_retryable_errors() {
    assert!(RepsheetError::Database(DatabaseError::Conflict("busy".to_string())).is_retryable());
    assert!(RepsheetError::Database(DatabaseError::Timeout).is_retryable());
    assert!(!RepsheetError::Database(DatabaseError::Connection("down".to_string())).is_retryable());
    assert!(!RepsheetError::Database(DatabaseError::Constraint("dup".to_string())).is_retryable());
    assert!(!RepsheetError::WorkoutNotFound { id: 1 }.is_retryable());
}

#[test]
fn test_database_not_found_is_not_found() {
    assert!(RepsheetError::Database(DatabaseError::NotFound).is_not_found());
    assert!(!RepsheetError::Database(DatabaseError::Query("bad".to_string())).is_not_found());
}

#[test]
fn test_database_error_messages() {
    assert_eq!(
        DatabaseError::Query("syntax".to_string()).to_string(),
        "Query failed: syntax"
    );
    assert_eq!(
        DatabaseError::Migration("v1".to_string()).to_string(),
        "Migration failed: v1"
    );
    assert_eq!(
        DatabaseError::Transaction("rolled back".to_string()).to_string(),
        "Transaction failed: rolled back"
    );
    assert_eq!(
        DatabaseError::Constraint("unique".to_string()).to_string(),
        "Constraint violation: unique"
    );
    assert_eq!(DatabaseError::NotFound.to_string(), "Not found");
    assert_eq!(
        DatabaseError::Conflict("deadlock".to_string()).to_string(),
        "Conflict: deadlock"
    );
    assert_eq!(
        DatabaseError::Timeout.to_string(),
        "Timed out waiting for the store"
    );
}

#[test]
fn test_sqlx_row_not_found_conversion() {
    let err: RepsheetError = sqlx::Error::RowNotFound.into();
    assert!(matches!(err, RepsheetError::Database(DatabaseError::NotFound)));
}

#[test]
fn test_sqlx_pool_errors_conversion() {
    let err: DatabaseError = sqlx::Error::PoolTimedOut.into();
    assert!(matches!(err, DatabaseError::Timeout));

    let err: DatabaseError = sqlx::Error::PoolClosed.into();
    assert!(matches!(err, DatabaseError::Connection(_)));
}
