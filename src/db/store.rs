use crate::db::models::Snapshot;
use crate::error::StoreError;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// The whole database: one JSON document on disk behind a reader/writer lock.
///
/// Readers share the lock, writers exclude everyone. Writes go to a sibling
/// temp file that is synced and renamed over the real one, so a crash never
/// leaves a half-written snapshot behind.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    lock: RwLock<()>,
}

impl Store {
    /// Opens the store at `path`, creating an empty state file on first use.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            lock: RwLock::new(()),
        };
        store.ensure_initialized()?;

        info!("State file ready at {}", store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty snapshot if no state file exists yet. An existing
    /// file is left alone, even if it cannot be parsed.
    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;

        match fs::metadata(&self.path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
                }
                info!("No state file at {}, creating an empty one", self.path.display());
                self.write_snapshot(&Snapshot::default())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;
        self.read_snapshot()
    }

    /// Replaces the durable state with `snapshot`.
    ///
    /// Pairing this with a separate [`Store::load`] leaves a window in which
    /// another writer's changes get overwritten; prefer [`Store::update`].
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;
        self.write_snapshot(snapshot)
    }

    /// Runs one read-modify-write cycle under the write lock.
    ///
    /// The snapshot is only persisted when `f` succeeds; on error nothing is
    /// written and the error is handed back unchanged.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;
        let mut snapshot = self.read_snapshot()?;
        let value = f(&mut snapshot)?;
        self.write_snapshot(&snapshot)?;
        Ok(value)
    }

    fn read_snapshot(&self) -> Result<Snapshot, StoreError> {
        let data = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        let snapshot = serde_json::from_slice(&data)?;
        Ok(snapshot)
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let data = serde_json::to_vec(snapshot)?;
        let tmp_path = self.tmp_path();

        let mut file = Self::create_private(&tmp_path).map_err(|e| self.io_error(e))?;
        let mut written = file.write_all(&data).and_then(|()| file.sync_all());
        drop(file);
        if written.is_ok() {
            written = fs::rename(&tmp_path, &self.path);
        }

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(self.io_error(e));
        }

        debug!("Wrote {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }

    #[cfg(unix)]
    fn create_private(path: &Path) -> std::io::Result<File> {
        use std::os::unix::fs::OpenOptionsExt;

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
    }

    #[cfg(not(unix))]
    fn create_private(path: &Path) -> std::io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
