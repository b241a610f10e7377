pub mod add;
pub mod categories;
pub mod history;
pub mod import;
pub mod summary;
