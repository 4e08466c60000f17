pub mod db;
pub mod models;
pub mod pagination;
pub mod registration;
pub mod repos;
pub mod trending;
