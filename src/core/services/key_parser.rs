use ssh_key::PublicKey;

use crate::core::errors::{KeygateError, Result};
use crate::core::models::authorized_key::AuthorizedKey;

/// Parse a single non-comment `authorized_keys` line.
///
/// Accepts the standard `<type> <base64-data> [comment]` form described in
/// `man sshd`. Anything else — blank lines, `#` comments, truncated base64,
/// a type that does not match the embedded key material — fails with
/// [`KeygateError::InvalidKeyFormat`] carrying the offending text.
pub fn parse_public_key(line: &str) -> Result<AuthorizedKey> {
    let key = PublicKey::from_openssh(line).map_err(|_| KeygateError::InvalidKeyFormat {
        line: line.to_string(),
    })?;

    let key_bytes = key
        .to_bytes()
        .map_err(|_| KeygateError::InvalidKeyFormat {
            line: line.to_string(),
        })?;

    Ok(AuthorizedKey {
        algorithm: key.algorithm().as_str().to_string(),
        key_bytes,
        comment: key.comment().to_string(),
    })
}

/// Split a caller-supplied multi-key blob into candidate key lines.
///
/// Splits on newline, trims surrounding spaces and carriage returns, and
/// drops blank lines and `#` comments. This is input normalization only —
/// reading the persisted store keeps comment lines, see
/// [`AuthorizedKeyStore`](crate::AuthorizedKeyStore).
pub fn split_key_blob(blob: &str) -> Vec<String> {
    blob.split('\n')
        .map(|line| line.trim_matches([' ', '\r']))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Prefix a key line's comment with `prefix`, so externally added keys can
/// be told apart later.
///
/// A line that does not parse is returned unchanged (it is diagnostic
/// material, not a key). A key without a comment gets `" <prefix>sshkey"`
/// appended. A key whose comment already starts with `prefix` is left
/// alone, making this idempotent.
pub fn ensure_comment(prefix: &str, line: &str) -> String {
    let Ok(key) = parse_public_key(line) else {
        return line.to_string();
    };

    if key.comment.is_empty() {
        return format!("{line} {prefix}sshkey");
    }

    if key.comment.starts_with(prefix) {
        return line.to_string();
    }

    // Splice the prefix in front of the comment's last occurrence within
    // the original line, leaving everything before it untouched.
    match line.rfind(&key.comment) {
        Some(idx) => format!("{}{}{}", &line[..idx], prefix, &line[idx..]),
        None => line.to_string(),
    }
}
