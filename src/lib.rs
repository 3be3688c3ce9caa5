//! Safe management of SSH `authorized_keys` credential stores.
//!
//! Keygate parses OpenSSH public-key lines, derives RFC4716-style MD5
//! fingerprints, and performs add/delete/replace/list mutations against a
//! user's `~/.ssh/authorized_keys` file. Every mutation re-reads the file,
//! validates the whole batch, and persists atomically (temp file + rename),
//! so readers never observe a half-written store and a failed call leaves
//! the file untouched.
//!
//! The store is generic over a [`UserDatabase`] capability so that OS user
//! lookup and ownership transfer stay out of the core logic:
//!
//! ```no_run
//! use keygate::{AuthorizedKeyStore, ListMode, PosixUserDatabase};
//!
//! # fn main() -> keygate::Result<()> {
//! let store = AuthorizedKeyStore::new(PosixUserDatabase);
//! store.add_keys("deploy", &["ssh-ed25519 AAAA... deploy@ci".to_string()])?;
//! for line in store.list_keys("deploy", ListMode::Fingerprint)? {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod core;

pub use crate::adapters::fs::atomic_writer::{atomic_write, atomic_write_with};
pub use crate::adapters::observers::log_observer::LogObserver;
pub use crate::adapters::users::fixed::FixedUserDatabase;
#[cfg(unix)]
pub use crate::adapters::users::posix::PosixUserDatabase;
pub use crate::core::errors::{KeygateError, Result};
pub use crate::core::models::authorized_key::{AuthorizedKey, ListMode};
pub use crate::core::services::fingerprint::fingerprint;
pub use crate::core::services::key_parser::{ensure_comment, parse_public_key, split_key_blob};
pub use crate::core::services::key_store::AuthorizedKeyStore;
pub use crate::core::traits::observer::{NullObserver, StoreObserver};
pub use crate::core::traits::user_db::{UserAccount, UserDatabase};
