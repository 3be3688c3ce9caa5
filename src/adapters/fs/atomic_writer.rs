//! Crash-safe file replacement.
//!
//! Content goes to a temp file created in the destination's own directory
//! (same filesystem, so the final rename is atomic), a caller-supplied
//! finalize step runs against the temp path, and only then is the temp
//! file renamed over the destination. A reader of the destination path
//! never observes a half-written file, and any failure before the rename
//! removes the temp file and leaves the destination untouched.
//!
//! This primitive is generic on purpose; it has no dependency on the key
//! store and is usable by any caller that needs all-or-nothing writes.

use std::io::{self, Write};
use std::path::Path;

use crate::core::errors::Result;

/// Atomically replace `path` with `contents`, running `finalize` on the
/// temp file (e.g. to apply permission bits) before the rename.
pub fn atomic_write_with(
    path: &Path,
    contents: &[u8],
    finalize: impl FnOnce(&Path) -> io::Result<()>,
) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no parent directory for {}", path.display()),
        )
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("atomic");

    // NamedTempFile removes itself on drop, which is the cleanup path for
    // every failure between here and persist().
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .tempfile_in(dir)?;

    tmp.write_all(contents)?;
    tmp.flush()?;
    finalize(tmp.path())?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Atomically replace `path` with `contents` and set its permission bits.
///
/// `mode` is ignored on platforms without Unix permission semantics.
pub fn atomic_write(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    atomic_write_with(path, contents, |tmp| set_mode(tmp, mode))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");

        atomic_write(&dest, b"hello\n", 0o644).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello\n");
    }

    #[test]
    fn replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        std::fs::write(&dest, "old").unwrap();

        atomic_write(&dest, b"new", 0o644).unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn applies_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");

        atomic_write(&dest, b"x", 0o600).unwrap();

        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o600);
    }

    #[test]
    fn finalize_failure_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");
        std::fs::write(&dest, "prior").unwrap();

        let result = atomic_write_with(&dest, b"doomed", |_| {
            Err(io::Error::other("finalize exploded"))
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "prior");
    }

    #[test]
    fn finalize_failure_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");

        let _ = atomic_write_with(&dest, b"doomed", |_| {
            Err(io::Error::other("finalize exploded"))
        });

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "stray files: {leftovers:?}");
        assert!(!dest.exists());
    }
}
