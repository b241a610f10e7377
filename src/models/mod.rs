pub mod category;
pub mod reminder;
pub mod summary;
pub mod transaction;
