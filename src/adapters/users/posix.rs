use std::path::Path;

use nix::unistd::{self, Gid, Uid, User};

use crate::core::errors::{KeygateError, Result};
use crate::core::traits::user_db::{UserAccount, UserDatabase};

/// `UserDatabase` backed by the POSIX user database (`getpwnam`/`getpwuid`)
/// with ownership transfer via `chown`.
pub struct PosixUserDatabase;

impl PosixUserDatabase {
    fn lookup(name: &str) -> Result<User> {
        let found = if name.is_empty() {
            User::from_uid(unistd::getuid())
        } else {
            User::from_name(name)
        };

        match found {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(KeygateError::UserLookup {
                user: name.to_string(),
                detail: "unknown user".to_string(),
            }),
            Err(errno) => Err(KeygateError::UserLookup {
                user: name.to_string(),
                detail: errno.to_string(),
            }),
        }
    }
}

impl UserDatabase for PosixUserDatabase {
    fn resolve(&self, name: &str) -> Result<UserAccount> {
        let user = Self::lookup(name)?;
        Ok(UserAccount {
            name: user.name,
            home: user.dir,
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
        })
    }

    fn set_ownership(&self, path: &Path, account: &UserAccount) -> Result<()> {
        unistd::chown(
            path,
            Some(Uid::from_raw(account.uid)),
            Some(Gid::from_raw(account.gid)),
        )
        .map_err(|errno| KeygateError::Ownership {
            path: path.to_path_buf(),
            detail: errno.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_resolves_to_current_user() {
        let account = PosixUserDatabase.resolve("").unwrap();
        assert_eq!(account.uid, unistd::getuid().as_raw());
        assert!(!account.home.as_os_str().is_empty());
    }

    #[test]
    fn unknown_user_fails() {
        let err = PosixUserDatabase
            .resolve("keygate-no-such-user-3f9c")
            .unwrap_err();
        assert!(matches!(err, KeygateError::UserLookup { .. }));
    }
}
