pub mod fixed;
#[cfg(unix)]
pub mod posix;
