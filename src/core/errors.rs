use std::path::PathBuf;

/// All domain errors for Keygate.
///
/// Validation failures (`MissingComment`, `DuplicateKey`, `DuplicateComment`,
/// `KeyNotFound`) abort the whole batch operation before anything is written,
/// so the persisted store is never left partially updated.
#[derive(Debug, thiserror::Error)]
pub enum KeygateError {
    #[error("cannot look up user '{user}': {detail}")]
    UserLookup { user: String, detail: String },

    #[error("invalid authorized_keys line: {line:?}")]
    InvalidKeyFormat { line: String },

    #[error("cannot add ssh key without a comment: {key:?}")]
    MissingComment { key: String },

    #[error("cannot add duplicate ssh key: {fingerprint}")]
    DuplicateKey { fingerprint: String },

    #[error("cannot add ssh key with duplicate comment: {comment}")]
    DuplicateComment { comment: String },

    #[error("cannot delete non existent key: {id}")]
    KeyNotFound { id: String },

    #[error("cannot set ownership of {path}: {detail}")]
    Ownership { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeygateError>;
