pub mod category_repository;
pub mod connection;
pub mod repository;
