use std::path::Path;

/// Port for diagnostic events the store emits while working.
///
/// Unrecognized stored lines are skipped rather than failing the call, and
/// the store reports them here instead of logging directly, so embedding
/// applications can capture or silence the noise.
pub trait StoreObserver: Send + Sync {
    /// A stored line could not be parsed as a key and was skipped for
    /// comparison or listing (it is still retained in the file).
    fn unparseable_line(&self, line: &str, detail: &str);

    /// The store is about to rewrite the given authorized_keys file.
    fn writing_store(&self, path: &Path) {
        let _ = path;
    }
}

/// Observer that discards every event.
pub struct NullObserver;

impl StoreObserver for NullObserver {
    fn unparseable_line(&self, _line: &str, _detail: &str) {}
}
