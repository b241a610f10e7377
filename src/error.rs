use rusqlite::ErrorCode;
use thiserror::Error;

/// Failures raised by the schema manager and the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("database file uses schema version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: i32, supported: i32 },
    #[error("stored row is unreadable: {0}")]
    CorruptRow(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Turns a UNIQUE violation into `Duplicate`, anything else stays a database error.
    pub fn from_insert(err: rusqlite::Error, entity: &'static str) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Duplicate(entity),
            _ => StoreError::Sqlite(err),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate(_))
    }
}

/// Input rejected before it reaches storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Expected {expected} comma separated fields but got {found}")]
    WrongFieldCount { expected: &'static str, found: usize },
    #[error("Invalid amount '{0}'. Please provide a positive decimal number")]
    InvalidAmount(String),
    #[error("Invalid transaction type '{0}'. Use 'Income' or 'Expense'")]
    InvalidType(String),
    #[error("Invalid date format '{0}'. Use dd/MM/yyyy")]
    InvalidDateFormat(String),
    #[error("Date '{0}' does not exist")]
    NonexistentDate(String),
    #[error("Invalid time format '{0}'. Use HH:mm")]
    InvalidTimeFormat(String),
    #[error("Reminder date and time must be in the future")]
    AlarmNotInFuture,
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    #[error("Category name cannot be empty")]
    EmptyCategoryName,
    #[error("Invalid month '{0}'. Use a number from 1 to 12")]
    InvalidMonth(String),
    #[error("Invalid year '{0}'")]
    InvalidYear(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Line {line}: {source}")]
    Import {
        line: usize,
        #[source]
        source: Box<AppError>,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to open file '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(StoreError::Sqlite(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_from_insert_maps_unique_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();

        let mapped = StoreError::from_insert(err, "category");
        assert!(mapped.is_duplicate());
        assert_eq!(mapped.to_string(), "category already exists");
    }

    #[test]
    fn test_from_insert_keeps_other_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("INSERT INTO missing VALUES (1)", []).unwrap_err();

        let mapped = StoreError::from_insert(err, "category");
        assert!(matches!(mapped, StoreError::Sqlite(_)));
    }

    #[test]
    fn test_import_error_carries_line() {
        let err = AppError::Import {
            line: 3,
            source: Box::new(ValidationError::AlarmNotInFuture.into()),
        };
        assert_eq!(
            err.to_string(),
            "Line 3: Reminder date and time must be in the future"
        );
    }
}
