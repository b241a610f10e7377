use crate::error::StoreError;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Bumping this drops and recreates both tables on the next open.
pub const SCHEMA_VERSION: i32 = 2;

pub const DEFAULT_CATEGORIES: [&str; 4] = ["Salary", "Food", "Transport", "Leisure"];

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        amount REAL NOT NULL,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        note TEXT NOT NULL DEFAULT '',
        isAlarmEnabled INTEGER NOT NULL DEFAULT 0,
        alarmDate TEXT NOT NULL DEFAULT '',
        alarmTime TEXT NOT NULL DEFAULT '',
        UNIQUE (type, amount, category, date, note)
    );
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );
";

const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS transactions;
    DROP TABLE IF EXISTS categories;
";

pub fn establish_connection(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    debug!(path = %path.display(), "opened database");
    open(&conn)?;
    Ok(conn)
}

/// Brings the schema of `conn` to `SCHEMA_VERSION`, creating or upgrading as needed.
pub fn open(conn: &Connection) -> Result<(), StoreError> {
    let found = schema_version(conn)?;
    if found == SCHEMA_VERSION {
        return Ok(());
    }
    if found > SCHEMA_VERSION {
        warn!(found, supported = SCHEMA_VERSION, "refusing to open newer database");
        return Err(StoreError::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == 0 {
        let tx = conn.unchecked_transaction()?;
        create(&tx)?;
        tx.commit()?;
        Ok(())
    } else {
        upgrade(conn, found, SCHEMA_VERSION)
    }
}

/// Destructive migration: every stored transaction and category is discarded.
pub fn upgrade(conn: &Connection, old_version: i32, new_version: i32) -> Result<(), StoreError> {
    info!(old_version, new_version, "upgrading database, existing data is dropped");
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(DROP_TABLES)?;
    create(&tx)?;
    set_schema_version(&tx, new_version)?;
    tx.commit()?;
    Ok(())
}

/// Wipes both tables and restores the default categories.
pub fn reset(conn: &Connection) -> Result<(), StoreError> {
    upgrade(conn, schema_version(conn)?, SCHEMA_VERSION)
}

pub fn schema_version(conn: &Connection) -> Result<i32, StoreError> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    Ok(())
}

fn create(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_TABLES)?;
    debug!("tables created");
    for name in DEFAULT_CATEGORIES {
        conn.execute("INSERT OR IGNORE INTO categories (name) VALUES (?1)", [name])?;
    }
    debug!(count = DEFAULT_CATEGORIES.len(), "default categories seeded");
    set_schema_version(conn, SCHEMA_VERSION)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    open(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::category_repository::get_all_category_names;
    use tempfile::TempDir;

    fn count_rows(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_open_creates_tables_and_seeds_categories() {
        let conn = establish_test_connection().unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert_eq!(count_rows(&conn, "transactions"), 0);
        assert_eq!(
            get_all_category_names(&conn).unwrap(),
            vec!["Salary", "Food", "Transport", "Leisure"]
        );
    }

    #[test]
    fn test_open_twice_does_not_reseed() {
        let conn = establish_test_connection().unwrap();
        conn.execute("DELETE FROM categories WHERE name = 'Food'", []).unwrap();

        open(&conn).unwrap();

        assert_eq!(count_rows(&conn, "categories"), 3);
    }

    #[test]
    fn test_upgrade_discards_existing_data() {
        let conn = establish_test_connection().unwrap();
        conn.execute(
            "INSERT INTO transactions (type, amount, category, date) VALUES ('Income', 5.0, 'Salary', '01/01/2024')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO categories (name) VALUES ('Rent')", []).unwrap();

        upgrade(&conn, 1, SCHEMA_VERSION).unwrap();

        assert_eq!(count_rows(&conn, "transactions"), 0);
        assert_eq!(count_rows(&conn, "categories"), 4);
    }

    #[test]
    fn test_reopen_older_file_triggers_upgrade() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("budget.db");
        {
            let conn = establish_connection(&path).unwrap();
            conn.execute("INSERT INTO categories (name) VALUES ('Rent')", []).unwrap();
            set_schema_version(&conn, 1).unwrap();
        }

        let conn = establish_connection(&path).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert_eq!(count_rows(&conn, "categories"), 4);
    }

    #[test]
    fn test_reopen_current_file_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("budget.db");
        {
            let conn = establish_connection(&path).unwrap();
            conn.execute("INSERT INTO categories (name) VALUES ('Rent')", []).unwrap();
        }

        let conn = establish_connection(&path).unwrap();
        assert_eq!(count_rows(&conn, "categories"), 5);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        set_schema_version(&conn, SCHEMA_VERSION + 1).unwrap();

        let result = open(&conn);
        assert!(matches!(
            result,
            Err(StoreError::UnsupportedVersion { found, supported })
                if found == SCHEMA_VERSION + 1 && supported == SCHEMA_VERSION
        ));
    }

    #[test]
    fn test_reset_keeps_version_and_defaults() {
        let conn = establish_test_connection().unwrap();
        conn.execute("INSERT INTO categories (name) VALUES ('Rent')", []).unwrap();

        reset(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert_eq!(count_rows(&conn, "categories"), 4);
    }
}
