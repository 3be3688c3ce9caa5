use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::errors::{KeygateError, Result};
use crate::core::traits::user_db::{UserAccount, UserDatabase};

/// `UserDatabase` over a fixed name → home-directory map.
///
/// Ownership transfer is a no-op, which makes this the adapter of choice
/// on platforms without POSIX ownership semantics and in tests that point
/// a user's home at a temp directory.
#[derive(Default)]
pub struct FixedUserDatabase {
    homes: HashMap<String, PathBuf>,
}

impl FixedUserDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with the given home directory.
    pub fn with_user(mut self, name: &str, home: impl Into<PathBuf>) -> Self {
        self.homes.insert(name.to_string(), home.into());
        self
    }
}

impl UserDatabase for FixedUserDatabase {
    fn resolve(&self, name: &str) -> Result<UserAccount> {
        let home = self
            .homes
            .get(name)
            .ok_or_else(|| KeygateError::UserLookup {
                user: name.to_string(),
                detail: "unknown user".to_string(),
            })?;
        Ok(UserAccount {
            name: name.to_string(),
            home: home.clone(),
            uid: 0,
            gid: 0,
        })
    }

    fn set_ownership(&self, _path: &Path, _account: &UserAccount) -> Result<()> {
        Ok(())
    }
}
