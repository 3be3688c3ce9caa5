//! The authorized_keys store.
//!
//! Every operation is a full read-validate-write cycle against
//! `<home>/.ssh/authorized_keys`: nothing is cached between calls, the
//! whole batch is validated before anything is written, and persistence
//! goes through the atomic writer so a failed call leaves the file in its
//! prior state.
//!
//! Updates are read-modify-write, so concurrent callers must not
//! interleave. Operations serialize on a process-wide lock table keyed by
//! the resolved store path; callers working on different users' files do
//! not contend. External writers outside this process are not protected
//! against.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use crate::adapters::fs::atomic_writer::atomic_write;
use crate::core::errors::{KeygateError, Result};
use crate::core::models::authorized_key::ListMode;
use crate::core::services::fingerprint::fingerprint;
use crate::core::traits::observer::{NullObserver, StoreObserver};
use crate::core::traits::user_db::{UserAccount, UserDatabase};

const AUTH_KEYS_FILE: &str = "authorized_keys";
const DEFAULT_FILE_MODE: u32 = 0o644;

/// One mutex per resolved authorized_keys path, shared process-wide.
fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut table = LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    table.entry(path.to_path_buf()).or_default().clone()
}

/// Manages a user's `~/.ssh/authorized_keys` file.
///
/// Generic over a [`UserDatabase`] so OS user lookup and ownership
/// transfer are pluggable; diagnostics on skipped lines go to an injected
/// [`StoreObserver`].
pub struct AuthorizedKeyStore<U: UserDatabase> {
    users: U,
    observer: Arc<dyn StoreObserver>,
}

impl<U: UserDatabase> AuthorizedKeyStore<U> {
    /// Create a store with silent diagnostics.
    pub fn new(users: U) -> Self {
        Self::with_observer(users, Arc::new(NullObserver))
    }

    /// Create a store that reports diagnostics to `observer`.
    pub fn with_observer(users: U, observer: Arc<dyn StoreObserver>) -> Self {
        Self { users, observer }
    }

    /// Add keys to `user`'s store.
    ///
    /// Every candidate must carry a comment and must collide with no
    /// existing key by fingerprint or by comment. Validation of the whole
    /// batch completes before anything is written; a failure on any
    /// candidate leaves the store untouched.
    pub fn add_keys(&self, user: &str, new_keys: &[String]) -> Result<()> {
        let (account, path) = self.resolve_store(user)?;
        let lock = lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let existing = self.read_store(&path)?;
        for new_key in new_keys {
            let (new_fp, new_comment) = fingerprint(new_key)?;
            if new_comment.is_empty() {
                return Err(KeygateError::MissingComment {
                    key: new_key.clone(),
                });
            }
            for line in &existing {
                match fingerprint(line) {
                    Err(err) => {
                        // Unrecognized stored lines are kept but skipped
                        // for comparison; only non-comment lines are worth
                        // reporting.
                        if !line.starts_with('#') {
                            self.observer.unparseable_line(line, &err.to_string());
                        }
                    }
                    Ok((fp, comment)) => {
                        if fp == new_fp {
                            return Err(KeygateError::DuplicateKey { fingerprint: fp });
                        }
                        if comment == new_comment {
                            return Err(KeygateError::DuplicateComment { comment });
                        }
                    }
                }
            }
        }

        let mut lines = existing;
        lines.extend(new_keys.iter().cloned());
        self.write_store(&account, &path, &lines)
    }

    /// Delete keys from `user`'s store.
    ///
    /// Each id may be a fingerprint or a key comment. If any id resolves
    /// to nothing the whole call fails with [`KeygateError::KeyNotFound`]
    /// and the store is left unchanged; resolution mutates in-memory maps
    /// only, which are discarded with the call.
    pub fn delete_keys(&self, user: &str, key_ids: &[String]) -> Result<()> {
        let (account, path) = self.resolve_store(user)?;
        let lock = lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut keep: Vec<String> = Vec::new();
        let mut line_by_fp: HashMap<String, String> = HashMap::new();
        let mut fp_by_comment: HashMap<String, String> = HashMap::new();
        for line in self.read_store(&path)? {
            match fingerprint(&line) {
                Err(err) => {
                    self.observer.unparseable_line(&line, &err.to_string());
                    keep.push(line);
                }
                Ok((fp, comment)) => {
                    if !comment.is_empty() {
                        fp_by_comment.insert(comment, fp.clone());
                    }
                    line_by_fp.insert(fp, line);
                }
            }
        }

        for id in key_ids {
            // An id is tried as a fingerprint first, then as a comment.
            let fp = if line_by_fp.contains_key(id) {
                id.clone()
            } else {
                fp_by_comment
                    .get(id)
                    .cloned()
                    .ok_or_else(|| KeygateError::KeyNotFound { id: id.clone() })?
            };
            line_by_fp.remove(&fp);
        }

        keep.extend(line_by_fp.into_values());
        self.write_store(&account, &path, &keep)
    }

    /// Replace every key in `user`'s store with `new_keys`.
    ///
    /// Lines that do not parse as keys are retained in front of the new
    /// keys; parsed keys are dropped. No duplicate or comment validation
    /// is applied.
    pub fn replace_keys(&self, user: &str, new_keys: &[String]) -> Result<()> {
        let (account, path) = self.resolve_store(user)?;
        let lock = lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut lines: Vec<String> = self
            .read_store(&path)?
            .into_iter()
            .filter(|line| fingerprint(line).is_err())
            .collect();
        lines.extend(new_keys.iter().cloned());
        self.write_store(&account, &path, &lines)
    }

    /// List the valid keys in `user`'s store.
    ///
    /// Stored lines that fail to parse are skipped, never an error; they
    /// are reported to the observer unless they are `#` comments.
    pub fn list_keys(&self, user: &str, mode: ListMode) -> Result<Vec<String>> {
        let (_, path) = self.resolve_store(user)?;
        let lock = lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut keys = Vec::new();
        for line in self.read_store(&path)? {
            match fingerprint(&line) {
                Err(err) => {
                    if !line.starts_with('#') {
                        self.observer.unparseable_line(&line, &err.to_string());
                    }
                }
                Ok((fp, comment)) => keys.push(match mode {
                    ListMode::Full => line,
                    ListMode::Fingerprint if comment.is_empty() => fp,
                    ListMode::Fingerprint => format!("{fp} ({comment})"),
                }),
            }
        }
        Ok(keys)
    }

    fn resolve_store(&self, user: &str) -> Result<(UserAccount, PathBuf)> {
        let account = self.users.resolve(user)?;
        let path = account.home.join(".ssh").join(AUTH_KEYS_FILE);
        Ok((account, path))
    }

    /// Read the raw line list. A missing file is an empty store. Blank
    /// lines are dropped; everything else (including `#` comments and
    /// malformed keys) is retained with its original text.
    fn read_store(&self, path: &Path) -> Result<Vec<String>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(raw
            .split('\n')
            .filter(|line| !line.trim_matches([' ', '\r']).is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Persist the line list: ensure `~/.ssh` exists (0755), keep the
    /// existing file's permission bits (0644 for a new file), write
    /// atomically with exactly one trailing newline, then hand ownership
    /// to the target user.
    fn write_store(&self, account: &UserAccount, path: &Path, lines: &[String]) -> Result<()> {
        let dir = path.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no parent directory for {}", path.display()),
            )
        })?;
        create_ssh_dir(dir)?;

        let mode = match std::fs::metadata(path) {
            Ok(meta) => file_mode(&meta),
            Err(_) => DEFAULT_FILE_MODE,
        };

        let mut contents = lines.join("\n");
        contents.push('\n');

        self.observer.writing_store(path);
        atomic_write(path, contents.as_bytes(), mode)?;
        self.users.set_ownership(path, account)
    }
}

#[cfg(unix)]
fn create_ssh_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(dir)
}

#[cfg(not(unix))]
fn create_ssh_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn file_mode(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(_meta: &std::fs::Metadata) -> u32 {
    DEFAULT_FILE_MODE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::users::fixed::FixedUserDatabase;

    const ALPHA: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAII7T9q1oW5WerXAiUY4a92zYFvjo7HzN2h7UAY6PIiP4";
    const BETA: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIPROZOdfOUjp9z+N+pRyHEzoy7TyZcR5DHArLUHPvydT";

    fn temp_store() -> (tempfile::TempDir, AuthorizedKeyStore<FixedUserDatabase>) {
        let dir = tempfile::tempdir().unwrap();
        let users = FixedUserDatabase::new().with_user("alice", dir.path());
        (dir, AuthorizedKeyStore::new(users))
    }

    fn key(raw: &str, comment: &str) -> String {
        format!("{raw} {comment}")
    }

    fn raw_file(dir: &tempfile::TempDir) -> String {
        std::fs::read_to_string(dir.path().join(".ssh/authorized_keys")).unwrap()
    }

    #[test]
    fn missing_file_is_empty_store() {
        let (_dir, store) = temp_store();
        assert!(store.list_keys("alice", ListMode::Full).unwrap().is_empty());
    }

    #[test]
    fn add_then_list_round_trips() {
        let (_dir, store) = temp_store();
        let k = key(ALPHA, "alice@host");

        store.add_keys("alice", std::slice::from_ref(&k)).unwrap();

        assert_eq!(store.list_keys("alice", ListMode::Full).unwrap(), vec![k]);
    }

    #[test]
    fn file_ends_with_single_trailing_newline() {
        let (dir, store) = temp_store();
        store.add_keys("alice", &[key(ALPHA, "a@h")]).unwrap();
        store.add_keys("alice", &[key(BETA, "b@h")]).unwrap();

        let raw = raw_file(&dir);
        assert!(raw.ends_with('\n'));
        assert!(!raw.ends_with("\n\n"));
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn add_without_comment_fails() {
        let (_dir, store) = temp_store();
        let err = store
            .add_keys("alice", &[ALPHA.to_string()])
            .unwrap_err();
        assert!(matches!(err, KeygateError::MissingComment { .. }));
    }

    #[test]
    fn add_preserves_hash_comment_lines() {
        let (dir, store) = temp_store();
        std::fs::create_dir_all(dir.path().join(".ssh")).unwrap();
        std::fs::write(
            dir.path().join(".ssh/authorized_keys"),
            "# managed block\n",
        )
        .unwrap();

        store.add_keys("alice", &[key(ALPHA, "a@h")]).unwrap();

        let raw = raw_file(&dir);
        assert_eq!(raw, format!("# managed block\n{}\n", key(ALPHA, "a@h")));
    }

    #[test]
    fn unknown_user_fails_lookup() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.list_keys("bob", ListMode::Full),
            Err(KeygateError::UserLookup { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn existing_permission_bits_survive_rewrites() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, store) = temp_store();
        store.add_keys("alice", &[key(ALPHA, "a@h")]).unwrap();

        let path = dir.path().join(".ssh/authorized_keys");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

        store.add_keys("alice", &[key(BETA, "b@h")]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn new_file_gets_default_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, store) = temp_store();
        store.add_keys("alice", &[key(ALPHA, "a@h")]).unwrap();

        let meta = std::fs::metadata(dir.path().join(".ssh/authorized_keys")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o7777, 0o644);
    }
}
