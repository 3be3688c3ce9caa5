pub mod fs;
pub mod observers;
pub mod users;
