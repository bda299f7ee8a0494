//! Deduplicated, persisted list of every wallet address seen by the app.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage key (file stem) holding the serialized address list
pub const HISTORY_KEY: &str = "wallets";

/// Backing store for the address history.
pub trait HistoryStore: Send {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, addresses: &[String]) -> Result<()>;

    /// Move unreadable stored data out of the way so a later `save` cannot
    /// overwrite it. Returns where it went, if anywhere.
    fn set_aside(&self) -> Result<Option<PathBuf>> {
        Err(anyhow::anyhow!("store cannot keep unreadable data"))
    }
}

/// JSON array of strings in `<app data dir>/wallets.json`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the app data directory next to the settings file
    pub fn in_app_dir() -> Self {
        Self::new(crate::user_settings::app_data_dir().join(format!("{}.json", HISTORY_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<path><suffix>` in the same directory
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", self.path))
    }

    fn save(&self, addresses: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        // Target is only ever replaced whole
        let tmp = self.sibling(".tmp");
        fs::write(&tmp, serde_json::to_string(addresses)?)
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;
        Ok(())
    }

    fn set_aside(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        // Never clobber an earlier backup
        let mut backup = self.sibling(".bak");
        let mut n = 1;
        while backup.exists() {
            backup = self.sibling(&format!(".bak.{}", n));
            n += 1;
        }
        fs::rename(&self.path, &backup)
            .with_context(|| format!("Failed to move {:?} to {:?}", self.path, backup))?;
        Ok(Some(backup))
    }
}

/// In-process store. Backs the history for the session when the file store
/// holds data that could not be read or set aside.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_addresses(addresses: Vec<String>) -> Self {
        Self {
            saved: Mutex::new(addresses),
        }
    }

    /// Last snapshot written by `save`
    pub fn snapshot(&self) -> Vec<String> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.snapshot())
    }

    fn save(&self, addresses: &[String]) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("history store lock poisoned"))?;
        *saved = addresses.to_vec();
        Ok(())
    }

    fn set_aside(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Order-preserving set of addresses; every new entry is flushed immediately.
pub struct AddressHistory {
    addresses: Vec<String>,
    store: Box<dyn HistoryStore>,
    backup: Option<PathBuf>,
}

impl AddressHistory {
    /// Load the stored list. Duplicates in the stored data are dropped, first one wins.
    pub fn load(store: Box<dyn HistoryStore>) -> Result<Self> {
        let stored = store.load()?;
        Ok(Self::from_stored(stored, store))
    }

    /// Load, falling back to an empty history on a corrupt or unreadable store.
    ///
    /// Unreadable data is set aside first. If that fails too, the history
    /// lives in memory for the session and the store is never written.
    pub fn load_or_empty(store: Box<dyn HistoryStore>) -> Self {
        let err = match store.load() {
            Ok(stored) => return Self::from_stored(stored, store),
            Err(e) => e,
        };
        match store.set_aside() {
            Ok(Some(backup)) => {
                tracing::warn!(
                    "Failed to load address history, starting empty. Previous data kept at {:?}: {:#}",
                    backup,
                    err
                );
                let mut history = Self::from_stored(Vec::new(), store);
                history.backup = Some(backup);
                history
            }
            Ok(None) => {
                tracing::warn!("Failed to load address history, starting empty: {:#}", err);
                Self::from_stored(Vec::new(), store)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load address history ({:#}) and could not move it aside ({:#}). \
                     New addresses are kept for this session only",
                    err,
                    e
                );
                Self::from_stored(Vec::new(), Box::new(MemoryStore::default()))
            }
        }
    }

    fn from_stored(stored: Vec<String>, store: Box<dyn HistoryStore>) -> Self {
        let mut addresses: Vec<String> = Vec::with_capacity(stored.len());
        for address in stored {
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }
        Self {
            addresses,
            store,
            backup: None,
        }
    }

    /// Where unreadable stored data was moved by `load_or_empty`
    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Append `address` unless already present. Returns `true` if it was added.
    ///
    /// The whole list is written to the store on every successful insert. If
    /// the write fails the entry stays in memory and the error is returned.
    pub fn insert(&mut self, address: &str) -> Result<bool> {
        if self.contains(address) {
            return Ok(false);
        }
        self.addresses.push(address.to_string());
        self.store.save(&self.addresses)?;
        Ok(true)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.iter().any(|a| a == address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.addresses.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.addresses
    }

    /// Write the list as a pretty JSON array to a user-chosen file
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.addresses)?;
        fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::info!("Exported {} addresses to {:?}", self.addresses.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const A: &str = "GAAQEAYEAUDAOCAJBIFQYDIOB4IBCEQTCQKRMFYYDENBWHA5DYPSABOV";
    const B: &str = "GADQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOZPI";
    const C: &str = "GCV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2XK5LVOV2WIHP";

    /// Shares its snapshot with the test after the history takes ownership
    struct SharedStore(Arc<MemoryStore>);

    impl HistoryStore for SharedStore {
        fn load(&self) -> Result<Vec<String>> {
            self.0.load()
        }
        fn save(&self, addresses: &[String]) -> Result<()> {
            self.0.save(addresses)
        }
    }

    struct FailingStore;

    impl HistoryStore for FailingStore {
        fn load(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn save(&self, _addresses: &[String]) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    fn history() -> (AddressHistory, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let history = AddressHistory::load(Box::new(SharedStore(store.clone()))).unwrap();
        (history, store)
    }

    // ==================== insert tests ====================

    #[test]
    fn test_insert_new_address_flushes() {
        let (mut history, store) = history();
        assert!(history.insert(A).unwrap());
        assert_eq!(history.len(), 1);
        assert_eq!(store.snapshot(), vec![A.to_string()]);
    }

    #[test]
    fn test_insert_duplicate_is_noop() {
        let (mut history, store) = history();
        history.insert(A).unwrap();
        assert!(!history.insert(A).unwrap());
        assert_eq!(history.len(), 1);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_insert_sequence_keeps_first_seen_order() {
        let (mut history, store) = history();
        for address in [B, A, B, C, A, C, B] {
            history.insert(address).unwrap();
        }
        let expected = vec![B.to_string(), A.to_string(), C.to_string()];
        assert_eq!(history.as_slice(), expected.as_slice());
        assert_eq!(store.snapshot(), expected);
    }

    #[test]
    fn test_insert_reports_store_failure() {
        let mut history = AddressHistory::load(Box::new(FailingStore)).unwrap();
        let err = history.insert(A).unwrap_err();
        assert!(err.to_string().contains("disk full"));
        // kept in memory for the session
        assert!(history.contains(A));
    }

    // ==================== load tests ====================

    #[test]
    fn test_load_drops_stored_duplicates() {
        let store = MemoryStore::with_addresses(vec![A.to_string(), B.to_string(), A.to_string()]);
        let history = AddressHistory::load(Box::new(store)).unwrap();
        assert_eq!(history.iter().cloned().collect::<Vec<_>>(), vec![A.to_string(), B.to_string()]);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wallets.json");

        let mut history = AddressHistory::load(Box::new(JsonFileStore::new(&path))).unwrap();
        assert!(history.is_empty());
        history.insert(A).unwrap();
        history.insert(B).unwrap();

        let reloaded = AddressHistory::load(Box::new(JsonFileStore::new(&path))).unwrap();
        assert_eq!(reloaded.as_slice(), history.as_slice());

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, format!("[\"{}\",\"{}\"]", A, B));
    }

    #[test]
    fn test_json_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("wallets.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_or_empty_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, "{not json").unwrap();

        let history = AddressHistory::load_or_empty(Box::new(JsonFileStore::new(&path)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_corrupt_file_survives_next_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let truncated = format!("[\"{}\",\"{}", A, &B[..20]);
        fs::write(&path, &truncated).unwrap();

        let mut history = AddressHistory::load_or_empty(Box::new(JsonFileStore::new(&path)));
        assert!(history.is_empty());
        history.insert(C).unwrap();

        let backup = dir.path().join("wallets.json.bak");
        assert_eq!(history.backup(), Some(backup.as_path()));
        assert_eq!(fs::read_to_string(&backup).unwrap(), truncated);
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("[\"{}\"]", C));
    }

    #[test]
    fn test_set_aside_keeps_earlier_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(dir.path().join("wallets.json.bak"), "first").unwrap();
        fs::write(&path, "second").unwrap();

        let backup = JsonFileStore::new(&path).set_aside().unwrap().unwrap();
        assert_eq!(backup, dir.path().join("wallets.json.bak.1"));
        assert_eq!(fs::read_to_string(dir.path().join("wallets.json.bak")).unwrap(), "first");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "second");
        assert!(!path.exists());
    }

    #[test]
    fn test_json_file_store_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let store = JsonFileStore::new(&path);
        store.save(&[A.to_string()]).unwrap();
        store.save(&[A.to_string(), B.to_string()]).unwrap();

        assert!(!dir.path().join("wallets.json.tmp").exists());
        assert_eq!(store.load().unwrap(), vec![A.to_string(), B.to_string()]);
    }

    /// Unreadable store that cannot move its data aside; records any write
    struct StuckStore(Arc<AtomicBool>);

    impl HistoryStore for StuckStore {
        fn load(&self) -> Result<Vec<String>> {
            Err(anyhow::anyhow!("permission denied"))
        }
        fn save(&self, _addresses: &[String]) -> Result<()> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_load_or_empty_falls_back_to_memory_store() {
        let written = Arc::new(AtomicBool::new(false));
        let mut history = AddressHistory::load_or_empty(Box::new(StuckStore(written.clone())));

        assert!(history.insert(A).unwrap());
        assert!(history.contains(A));
        assert!(!written.load(Ordering::SeqCst));
    }

    // ==================== export tests ====================

    #[test]
    fn test_export_to_writes_json_array() {
        let (mut history, _) = history();
        history.insert(A).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        history.export_to(&path).unwrap();

        let exported: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported, vec![A.to_string()]);
    }
}
