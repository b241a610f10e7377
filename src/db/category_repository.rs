use crate::error::StoreError;
use crate::models::category::Category;
use rusqlite::Connection;
use tracing::{debug, warn};

/// Inserts `name` as given; callers trim and reject empty names first.
pub fn add_category(conn: &Connection, name: &str) -> Result<i64, StoreError> {
    conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])
        .map_err(|e| StoreError::from_insert(e, "category"))
        .inspect_err(|e| warn!(name, error = %e, "category not added"))?;
    let id = conn.last_insert_rowid();
    debug!(id, name, "category added");
    Ok(id)
}

/// Returns the number of rows removed. Transactions referencing `name` are left untouched.
pub fn delete_category_by_name(conn: &Connection, name: &str) -> Result<usize, StoreError> {
    let rows = conn.execute("DELETE FROM categories WHERE name = ?1", [name])?;
    debug!(name, rows, "category delete");
    Ok(rows)
}

pub fn get_all_categories(conn: &Connection) -> Result<Vec<Category>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id ASC")?;
    let iter = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut categories = Vec::new();
    for category in iter {
        categories.push(category?);
    }
    Ok(categories)
}

pub fn get_all_category_names(conn: &Connection) -> Result<Vec<String>, StoreError> {
    Ok(get_all_categories(conn)?
        .into_iter()
        .map(|c| c.name)
        .collect())
}

pub fn category_exists(conn: &Connection, name: &str) -> Result<bool, StoreError> {
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(found > 0)
}
