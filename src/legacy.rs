use std::io;
use std::path::PathBuf;

/// Key under which the legacy layer kept the serialized entry list.
pub const ENTRIES_KEY: &str = "@journal_entries";
/// Key under which the legacy layer kept the serialized profile.
pub const PROFILE_KEY: &str = "@user_profile";

/// Read/clear access to the legacy key-value storage consumed once by the
/// migration step. Passed in explicitly so fresh installs can run without
/// any legacy layer at all, and tests can stub it.
pub trait LegacyStore {
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Directory-backed legacy store: each key maps to one file holding the
/// raw serialized payload.
#[derive(Debug, Clone)]
pub struct FileLegacyStore {
    dir: PathBuf,
}

impl FileLegacyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", key.trim_start_matches('@')))
    }
}

impl LegacyStore for FileLegacyStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.file_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.file_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FileLegacyStore, LegacyStore, ENTRIES_KEY, PROFILE_KEY};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn unique_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jotter-legacy-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("legacy dir should be creatable");
        dir
    }

    #[test]
    fn reads_and_removes_key_files() {
        let dir = unique_dir();
        std::fs::write(dir.join("journal_entries.json"), "[]")
            .expect("legacy payload should write");
        let store = FileLegacyStore::new(&dir);

        assert_eq!(
            store.read(ENTRIES_KEY).expect("read should succeed"),
            Some("[]".to_string())
        );
        store.remove(ENTRIES_KEY).expect("remove should succeed");
        assert_eq!(store.read(ENTRIES_KEY).expect("read should succeed"), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_keys_read_as_none_and_remove_is_idempotent() {
        let dir = unique_dir();
        let store = FileLegacyStore::new(&dir);

        assert_eq!(store.read(PROFILE_KEY).expect("read should succeed"), None);
        store
            .remove(PROFILE_KEY)
            .expect("removing a missing key should not fail");

        let _ = std::fs::remove_dir_all(dir);
    }
}
