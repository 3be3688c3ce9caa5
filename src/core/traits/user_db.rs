use std::path::{Path, PathBuf};

use crate::core::errors::Result;

/// A resolved OS user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub name: String,
    pub home: PathBuf,
    pub uid: u32,
    pub gid: u32,
}

/// Port for OS user lookup and file ownership transfer.
///
/// The store core never touches the user database or chown directly; a
/// platform adapter implements this trait (`PosixUserDatabase` on Unix),
/// and platforms without POSIX ownership semantics plug in an
/// implementation whose `set_ownership` is a no-op.
pub trait UserDatabase: Send + Sync {
    /// Resolve a user name to an account. An empty name resolves to the
    /// current process user.
    fn resolve(&self, name: &str) -> Result<UserAccount>;

    /// Transfer ownership of `path` to `account`.
    fn set_ownership(&self, path: &Path, account: &UserAccount) -> Result<()>;
}
