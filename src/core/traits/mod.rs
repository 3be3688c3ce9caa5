pub mod observer;
pub mod user_db;
