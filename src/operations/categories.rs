use crate::db::category_repository;
use crate::error::{AppError, ValidationError};
use crate::models::category::Category;
use rusqlite::Connection;

pub fn add_category_db(conn: &Connection, name: &str) -> Result<i64, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName.into());
    }
    Ok(category_repository::add_category(conn, name)?)
}

/// Returns whether a category was removed.
pub fn delete_category_db(conn: &Connection, name: &str) -> Result<bool, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName.into());
    }
    Ok(category_repository::delete_category_by_name(conn, name)? > 0)
}

pub fn list_categories_db(conn: &Connection) -> Result<Vec<Category>, AppError> {
    Ok(category_repository::get_all_categories(conn)?)
}
