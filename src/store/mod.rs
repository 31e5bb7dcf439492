//! Document database layer.
//!
//! Data is organised as collections of JSON documents addressed by slash
//! paths (`users`, `data/{uid}/tasks`). Two backends implement
//! [`DocumentStore`]:
//!
//! - [`MemoryStore`]: the mock used when no backend is configured; state
//!   lives for the lifetime of the process and starts from sample data.
//! - [`FileStore`]: a single JSON file under the data directory, shared
//!   safely between processes.
//!
//! # On-disk layout
//!
//! ```text
//! <home>/db/<project_id>.json        # { schema_version, collections }
//! <home>/db/<project_id>.json.lock   # fs2 lock guarding writes
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BackendKind, Config};
use crate::error::{Error, Result};
use crate::listeners::{Callback, ListenerSet, Subscription};

pub mod file;
pub mod memory;
pub mod query;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::{order_by, where_field, Constraint, Direction, Query, WhereOp};

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// Callback invoked with the current result set of a watched query.
pub type SnapshotCallback = Box<dyn Fn(&Snapshot) + Send + Sync>;

pub const DB_SCHEMA_VERSION: &str = "tasklog.db.v1";

/// A stored document: its id plus the stored fields (which repeat the id).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        let id = id.into();
        fields.insert("id".to_string(), Value::String(id.clone()));
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Decode the document into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Reference to a collection path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn doc(&self, id: impl Into<String>) -> DocRef {
        DocRef {
            collection: self.path.clone(),
            id: id.into(),
        }
    }

    pub fn query(&self) -> Query {
        Query::new(self)
    }
}

/// Reference to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocRef {
    pub collection: String,
    pub id: String,
}

pub fn collection(path: &str) -> CollectionRef {
    CollectionRef {
        path: normalize_path(path),
    }
}

pub fn doc(collection_path: &str, id: impl Into<String>) -> DocRef {
    collection(collection_path).doc(id)
}

fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Result set of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    docs: Vec<Document>,
}

impl Snapshot {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn into_docs(self) -> Vec<Document> {
        self.docs
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// Overlay the new fields on the existing document instead of replacing it.
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }
}

/// Operations shared by every document backend.
pub trait DocumentStore: Send + Sync {
    /// True for the in-memory mock backend.
    fn is_mock(&self) -> bool;

    /// Store `data` under a generated id.
    fn add_doc(&self, collection: &CollectionRef, data: Fields) -> Result<DocRef>;

    /// Create or overwrite the document at `doc`.
    fn set_doc(&self, doc: &DocRef, data: Fields, options: SetOptions) -> Result<()>;

    /// Shallow-merge `data` into an existing document. Returns false when
    /// the document does not exist; nothing is written in that case.
    fn update_doc(&self, doc: &DocRef, data: Fields) -> Result<bool>;

    /// Returns false when the document did not exist.
    fn delete_doc(&self, doc: &DocRef) -> Result<bool>;

    fn get_doc(&self, doc: &DocRef) -> Result<Option<Document>>;

    fn get_docs(&self, query: &Query) -> Result<Snapshot>;

    /// Deliver the query result now and after every write to its collection.
    fn on_snapshot(&self, query: Query, callback: SnapshotCallback) -> Result<Subscription>;
}

/// All collections of one database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Database {
    #[serde(default = "default_schema_version")]
    schema_version: String,
    #[serde(default)]
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
}

fn default_schema_version() -> String {
    DB_SCHEMA_VERSION.to_string()
}

impl Default for Database {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            collections: BTreeMap::new(),
        }
    }
}

impl Database {
    pub(crate) fn insert(&mut self, doc: &DocRef, data: Fields) {
        let stored = Document::new(doc.id.clone(), data);
        self.collections
            .entry(doc.collection.clone())
            .or_default()
            .insert(doc.id.clone(), stored.fields);
    }

    pub(crate) fn set(&mut self, doc: &DocRef, data: Fields, options: SetOptions) {
        let existing = self
            .collections
            .get(&doc.collection)
            .and_then(|docs| docs.get(&doc.id))
            .cloned();
        let fields = match existing {
            Some(mut current) if options.merge => {
                current.extend(data);
                current
            }
            _ => data,
        };
        self.insert(doc, fields);
    }

    pub(crate) fn update(&mut self, doc: &DocRef, data: Fields) -> bool {
        let Some(current) = self
            .collections
            .get_mut(&doc.collection)
            .and_then(|docs| docs.get_mut(&doc.id))
        else {
            return false;
        };
        current.extend(data);
        current.insert("id".to_string(), Value::String(doc.id.clone()));
        true
    }

    pub(crate) fn delete(&mut self, doc: &DocRef) -> bool {
        self.collections
            .get_mut(&doc.collection)
            .map(|docs| docs.remove(&doc.id).is_some())
            .unwrap_or(false)
    }

    pub(crate) fn get(&self, doc: &DocRef) -> Option<Document> {
        self.collections
            .get(&doc.collection)
            .and_then(|docs| docs.get(&doc.id))
            .map(|fields| Document::new(doc.id.clone(), fields.clone()))
    }

    pub(crate) fn run(&self, query: &Query) -> Snapshot {
        let docs = self
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Snapshot::new(query.apply(docs))
    }
}

/// Registry of snapshot listeners keyed by their query.
pub(crate) type SnapshotListeners = ListenerSet<Query, Snapshot>;

/// Register `callback` and deliver the current result immediately.
pub(crate) fn subscribe<S: DocumentStore + ?Sized>(
    store: &S,
    listeners: &SnapshotListeners,
    query: Query,
    callback: SnapshotCallback,
) -> Result<Subscription> {
    let callback: Callback<Snapshot> = Arc::from(callback);
    let initial = store.get_docs(&query)?;
    let subscription = listeners.add(query, Arc::clone(&callback));
    callback(&initial);
    Ok(subscription)
}

/// Re-run every listener watching `collection_path`.
pub(crate) fn notify<S: DocumentStore + ?Sized>(
    store: &S,
    listeners: &SnapshotListeners,
    collection_path: &str,
) {
    for (query, callback) in listeners.matching(|query| query.collection == collection_path) {
        match store.get_docs(&query) {
            Ok(snapshot) => callback(&snapshot),
            Err(err) => {
                tracing::warn!(collection = collection_path, error = %err, "snapshot listener refresh failed")
            }
        }
    }
}

/// Open the backend selected by `config`.
///
/// `today` dates the sample tasks seeded into the mock store.
pub fn open_store(config: &Config, home: &Path, today: NaiveDate) -> Result<Box<dyn DocumentStore>> {
    match config.backend.resolve()? {
        BackendKind::File => {
            let path = config.backend.database_path(home);
            tracing::debug!(path = %path.display(), "using file document store");
            Ok(Box::new(FileStore::open(path)?))
        }
        BackendKind::Memory => {
            tracing::debug!(seed = config.backend.seed_sample_data, "using mock document store");
            if config.backend.seed_sample_data {
                Ok(Box::new(MemoryStore::seeded(today, Utc::now())))
            } else {
                Ok(Box::new(MemoryStore::new()))
            }
        }
        BackendKind::Auto => Err(Error::InvalidConfig(
            "backend kind did not resolve".to_string(),
        )),
    }
}

/// Build a field map from a serializable value (must serialize to an object).
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::OperationFailed(format!(
            "document data must be an object, got {other}"
        ))),
    }
}
