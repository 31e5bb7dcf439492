//! Document store persisted to a single JSON file.
//!
//! Each operation takes the exclusive `<file>.lock`, re-reads the file,
//! applies the change and writes it back atomically. Several processes can
//! therefore share one database; snapshot listeners are per process.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ulid::Ulid;

use super::{
    notify, subscribe, CollectionRef, Database, DocRef, Document, DocumentStore, Fields, Query,
    SetOptions, Snapshot, SnapshotCallback, SnapshotListeners,
};
use crate::error::{Error, Result};
use crate::listeners::Subscription;
use crate::lock::{lock_path_for, write_atomic, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

pub struct FileStore {
    path: PathBuf,
    lock_timeout_ms: u64,
    listeners: SnapshotListeners,
}

impl FileStore {
    /// Open (without creating) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.is_dir() {
            return Err(Error::InvalidConfig(format!(
                "document store path is a directory: {}",
                path.display()
            )));
        }
        Ok(Self {
            path,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            listeners: SnapshotListeners::new(),
        })
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(lock_path_for(&self.path), self.lock_timeout_ms)
    }

    fn load(&self) -> Result<Database> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Database::default()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Database::default());
        }
        serde_json::from_str(&content).map_err(|err| Error::CorruptStore {
            path: self.path.clone(),
            reason: err.to_string(),
        })
    }

    fn save(&self, db: &Database) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(db)?;
        bytes.push(b'\n');
        write_atomic(&self.path, &bytes)
    }

    fn read<T>(&self, f: impl FnOnce(&Database) -> T) -> Result<T> {
        let _lock = self.lock()?;
        let db = self.load()?;
        Ok(f(&db))
    }

    /// Locked read-modify-write. The file is only rewritten when `f`
    /// reports a change.
    fn write<T>(&self, f: impl FnOnce(&mut Database) -> (T, bool)) -> Result<T> {
        let _lock = self.lock()?;
        let mut db = self.load()?;
        let (value, changed) = f(&mut db);
        if changed {
            self.save(&db)?;
        }
        Ok(value)
    }
}

impl DocumentStore for FileStore {
    fn is_mock(&self) -> bool {
        false
    }

    fn add_doc(&self, collection: &CollectionRef, data: Fields) -> Result<DocRef> {
        let target = collection.doc(Ulid::new().to_string());
        self.write(|db| {
            db.insert(&target, data);
            ((), true)
        })?;
        tracing::debug!(collection = collection.path(), id = %target.id, "document added");
        notify(self, &self.listeners, collection.path());
        Ok(target)
    }

    fn set_doc(&self, doc: &DocRef, data: Fields, options: SetOptions) -> Result<()> {
        self.write(|db| {
            db.set(doc, data, options);
            ((), true)
        })?;
        tracing::debug!(collection = %doc.collection, id = %doc.id, merge = options.merge, "document set");
        notify(self, &self.listeners, &doc.collection);
        Ok(())
    }

    fn update_doc(&self, doc: &DocRef, data: Fields) -> Result<bool> {
        let updated = self.write(|db| {
            let updated = db.update(doc, data);
            (updated, updated)
        })?;
        if updated {
            tracing::debug!(collection = %doc.collection, id = %doc.id, "document updated");
            notify(self, &self.listeners, &doc.collection);
        }
        Ok(updated)
    }

    fn delete_doc(&self, doc: &DocRef) -> Result<bool> {
        let removed = self.write(|db| {
            let removed = db.delete(doc);
            (removed, removed)
        })?;
        if removed {
            tracing::debug!(collection = %doc.collection, id = %doc.id, "document deleted");
            notify(self, &self.listeners, &doc.collection);
        }
        Ok(removed)
    }

    fn get_doc(&self, doc: &DocRef) -> Result<Option<Document>> {
        self.read(|db| db.get(doc))
    }

    fn get_docs(&self, query: &Query) -> Result<Snapshot> {
        self.read(|db| db.run(query))
    }

    fn on_snapshot(&self, query: Query, callback: SnapshotCallback) -> Result<Subscription> {
        subscribe(self, &self.listeners, query, callback)
    }
}
