//! JSON file repository
//!
//! Every statement takes an advisory lock on `<store>.lock`, reloads the JSON
//! file, and applies itself to the fresh tables. Mutations write the result to
//! a uniquely named temp file in the same directory and rename it over the
//! store, so a crash leaves either the old or the new snapshot on disk and
//! processes sharing the file never overwrite each other's rows.

use super::memory::Tables;
use async_trait::async_trait;
use doorkeep_core::effects::{
    IdentityFilter, IdentityUpdate, RepositoryEffects, ScopeFilter, StateFilter, UsageFilter,
    ValidityFilter,
};
use doorkeep_core::{
    ActorState, Identity, Scope, StorageError, Timestamp, UsageRecord, ValidityWindow,
};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-backed repository, safe to share between processes on one host
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileRepository {
    /// Open the store at `path`, starting empty when the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.clone().into_os_string();
        lock_name.push(".lock");
        let repo = Self {
            path,
            lock_path: PathBuf::from(lock_name),
        };
        // Surface a corrupt file now rather than on first use.
        repo.read(|_| ()).await?;
        Ok(repo)
    }

    /// Location of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Tables) -> T + Send + 'static,
    {
        let (path, lock_path) = (self.path.clone(), self.lock_path.clone());
        tokio::task::spawn_blocking(move || -> Result<T, StorageError> {
            let lock = open_lock(&lock_path)?;
            FileExt::lock_shared(&lock)
                .map_err(|e| StorageError::ReadFailed(format!("{}: {e}", lock_path.display())))?;
            let tables = load(&path)?;
            Ok(f(&tables))
        })
        .await
        .map_err(|e| StorageError::ReadFailed(format!("store task: {e}")))?
    }

    /// Run a mutation; `f` reports whether it changed anything worth writing
    async fn write<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Tables) -> Result<(T, bool), StorageError> + Send + 'static,
    {
        let (path, lock_path) = (self.path.clone(), self.lock_path.clone());
        tokio::task::spawn_blocking(move || -> Result<T, StorageError> {
            let lock = open_lock(&lock_path)?;
            FileExt::lock_exclusive(&lock)
                .map_err(|e| StorageError::WriteFailed(format!("{}: {e}", lock_path.display())))?;
            let mut tables = load(&path)?;
            let (value, changed) = f(&mut tables)?;
            if changed {
                store(&path, &tables)?;
            }
            Ok(value)
        })
        .await
        .map_err(|e| StorageError::WriteFailed(format!("store task: {e}")))?
    }
}

/// Lock file handle; the advisory lock is released when it drops
fn open_lock(lock_path: &Path) -> Result<File, StorageError> {
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| StorageError::WriteFailed(format!("create dir: {e}")))?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| StorageError::ReadFailed(format!("{}: {e}", lock_path.display())))
}

fn load(path: &Path) -> Result<Tables, StorageError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "store file absent, starting empty");
            Ok(Tables::default())
        }
        Err(e) => Err(StorageError::ReadFailed(format!("{}: {e}", path.display()))),
    }
}

fn store(path: &Path, tables: &Tables) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(tables)
        .map_err(|e| StorageError::WriteFailed(format!("serialize: {e}")))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| StorageError::WriteFailed(format!("{}: {e}", dir.display())))?;
    tmp.write_all(&bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StorageError::WriteFailed(format!("{}: {e}", tmp.path().display())))?;
    tmp.persist(path)
        .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

#[async_trait]
impl RepositoryEffects for JsonFileRepository {
    async fn insert_identity(&self, identity: Identity) -> Result<(), StorageError> {
        self.write(move |tables| tables.insert_identity(identity).map(|()| ((), true)))
            .await
    }

    async fn update_identities(
        &self,
        filter: &IdentityFilter,
        update: &IdentityUpdate,
    ) -> Result<usize, StorageError> {
        let (filter, update) = (filter.clone(), update.clone());
        self.write(move |tables| {
            let count = tables.update_identities(&filter, &update);
            Ok((count, count > 0))
        })
        .await
    }

    async fn select_identities(
        &self,
        filter: &IdentityFilter,
    ) -> Result<Vec<Identity>, StorageError> {
        let filter = filter.clone();
        self.read(move |tables| tables.select_identities(&filter))
            .await
    }

    async fn insert_validity(&self, window: ValidityWindow) -> Result<(), StorageError> {
        self.write(move |tables| {
            tables.validity.push(window);
            Ok(((), true))
        })
        .await
    }

    async fn select_validity(
        &self,
        filter: &ValidityFilter,
    ) -> Result<Vec<ValidityWindow>, StorageError> {
        let filter = filter.clone();
        self.read(move |tables| tables.select_validity(&filter)).await
    }

    async fn insert_scope(&self, scope: Scope) -> Result<(), StorageError> {
        self.write(move |tables| {
            tables.scopes.push(scope);
            Ok(((), true))
        })
        .await
    }

    async fn select_scopes(&self, filter: &ScopeFilter) -> Result<Vec<Scope>, StorageError> {
        let filter = filter.clone();
        self.read(move |tables| tables.select_scopes(&filter)).await
    }

    async fn insert_state(&self, state: ActorState) -> Result<(), StorageError> {
        self.write(move |tables| {
            tables.states.push(state);
            Ok(((), true))
        })
        .await
    }

    async fn select_states(&self, filter: &StateFilter) -> Result<Vec<ActorState>, StorageError> {
        let filter = filter.clone();
        self.read(move |tables| tables.select_states(&filter)).await
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<(), StorageError> {
        self.write(move |tables| {
            tables.usage.push(record);
            Ok(((), true))
        })
        .await
    }

    async fn touch_usage(
        &self,
        filter: &UsageFilter,
        timestamp: Timestamp,
    ) -> Result<usize, StorageError> {
        let filter = filter.clone();
        self.write(move |tables| {
            let count = tables.touch_usage(&filter, timestamp);
            Ok((count, count > 0))
        })
        .await
    }

    async fn select_usage(&self, filter: &UsageFilter) -> Result<Vec<UsageRecord>, StorageError> {
        let filter = filter.clone();
        self.read(move |tables| tables.select_usage(&filter)).await
    }
}
