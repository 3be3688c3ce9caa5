use std::path::Path;

use crate::core::traits::observer::StoreObserver;

/// `StoreObserver` that forwards diagnostics to the `log` facade.
///
/// The default choice for applications that already run a logger; use
/// [`NullObserver`](crate::NullObserver) to silence the store instead.
pub struct LogObserver;

impl StoreObserver for LogObserver {
    fn unparseable_line(&self, line: &str, detail: &str) {
        log::warn!("skipping unrecognised ssh key line {line:?}: {detail}");
    }

    fn writing_store(&self, path: &Path) {
        log::debug!("writing authorized keys file {}", path.display());
    }
}
