/// A parsed public key from one `authorized_keys` line.
///
/// `key_bytes` is the OpenSSH wire-format encoding of the key material
/// only — it excludes the comment and any formatting of the original
/// text, so cosmetic differences never change a key's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorizedKey {
    /// Algorithm name, e.g. `ssh-ed25519` or `ssh-rsa`.
    pub algorithm: String,
    /// Wire-format key material; this is what fingerprinting hashes.
    pub key_bytes: Vec<u8>,
    /// Trailing comment, empty when the line carries none.
    pub comment: String,
}

impl std::fmt::Display for AuthorizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.comment.is_empty() {
            write!(f, "{}", self.algorithm)
        } else {
            write!(f, "{} ({})", self.algorithm, self.comment)
        }
    }
}

/// Output shape for [`AuthorizedKeyStore::list_keys`].
///
/// [`AuthorizedKeyStore::list_keys`]: crate::AuthorizedKeyStore::list_keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Yield each valid key's original line text.
    Full,
    /// Yield `"<fingerprint> (<comment>)"`, or the bare fingerprint when
    /// the key has no comment.
    Fingerprint,
}
