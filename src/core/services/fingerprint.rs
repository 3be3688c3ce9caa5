use md5::{Digest, Md5};

use crate::core::errors::Result;
use crate::core::services::key_parser::parse_public_key;

/// Compute the RFC4716 (section 4) fingerprint of a public-key line.
///
/// Returns the fingerprint together with the key's comment. The digest is
/// MD5 over the wire-format key material only, formatted as lowercase
/// colon-separated hex octets, so two lines that differ only in comment or
/// whitespace share a fingerprint.
pub fn fingerprint(line: &str) -> Result<(String, String)> {
    let key = parse_public_key(line)?;

    let digest = Md5::digest(&key.key_bytes);
    let mut out = String::with_capacity(digest.len() * 3 - 1);
    for (i, byte) in digest.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push_str(&format!("{byte:02x}"));
    }

    Ok((out, key.comment))
}
