//! In-memory mock of the document database.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde_json::json;
use ulid::Ulid;

use super::{
    notify, subscribe, CollectionRef, Database, DocRef, Document, DocumentStore, Fields, Query,
    SetOptions, Snapshot, SnapshotCallback, SnapshotListeners,
};
use crate::auth::hash_password;
use crate::error::Result;
use crate::listeners::Subscription;
use crate::task::format_timestamp;

/// Uid of the seeded demo account that owns the sample tasks.
pub const DEMO_UID: &str = "user3";

/// Mock store. State lives as long as the value.
#[derive(Default)]
pub struct MemoryStore {
    db: Mutex<Database>,
    listeners: SnapshotListeners,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the sample users and demo tasks.
    pub fn seeded(today: NaiveDate, now: DateTime<Utc>) -> Self {
        let store = Self::new();
        {
            let mut db = store.db();
            seed_sample_data(&mut db, today, now);
        }
        store
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn changed(&self, collection_path: &str) {
        notify(self, &self.listeners, collection_path);
    }
}

impl DocumentStore for MemoryStore {
    fn is_mock(&self) -> bool {
        true
    }

    fn add_doc(&self, collection: &CollectionRef, data: Fields) -> Result<DocRef> {
        let target = collection.doc(format!("mock_{}", Ulid::new().to_string().to_lowercase()));
        self.db().insert(&target, data);
        tracing::debug!(collection = collection.path(), id = %target.id, "mock add");
        self.changed(collection.path());
        Ok(target)
    }

    fn set_doc(&self, doc: &DocRef, data: Fields, options: SetOptions) -> Result<()> {
        self.db().set(doc, data, options);
        tracing::debug!(collection = %doc.collection, id = %doc.id, merge = options.merge, "mock set");
        self.changed(&doc.collection);
        Ok(())
    }

    fn update_doc(&self, doc: &DocRef, data: Fields) -> Result<bool> {
        let updated = self.db().update(doc, data);
        if updated {
            self.changed(&doc.collection);
        } else {
            tracing::debug!(collection = %doc.collection, id = %doc.id, "mock update of missing document ignored");
        }
        Ok(updated)
    }

    fn delete_doc(&self, doc: &DocRef) -> Result<bool> {
        let removed = self.db().delete(doc);
        if removed {
            self.changed(&doc.collection);
        }
        Ok(removed)
    }

    fn get_doc(&self, doc: &DocRef) -> Result<Option<Document>> {
        Ok(self.db().get(doc))
    }

    fn get_docs(&self, query: &Query) -> Result<Snapshot> {
        Ok(self.db().run(query))
    }

    fn on_snapshot(&self, query: Query, callback: SnapshotCallback) -> Result<Subscription> {
        subscribe(self, &self.listeners, query, callback)
    }
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn seed_sample_data(db: &mut Database, today: NaiveDate, now: DateTime<Utc>) {
    let stamp = format_timestamp(now);
    let users = [
        ("user1", "naresh@example.com", "password123", "naresh", "Naresh Kumar"),
        ("user2", "admin@example.com", "admin123", "admin", "Administrator"),
        (DEMO_UID, "demo@example.com", "demo123", "demo", "Demo User"),
    ];
    for (uid, email, password, username, full_name) in users {
        db.insert(
            &super::doc("users", uid),
            fields(json!({
                "email": email,
                "username": username,
                "fullName": full_name,
                "displayName": full_name,
                "provider": "email",
                "passwordHash": hash_password(email, password),
                "createdAt": stamp,
            })),
        );
    }

    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    let tasks = [
        ("task1", "Complete project documentation", "work", "high", 3.5, "completed", today,
         "Write comprehensive documentation for the daily task logger project"),
        ("task2", "Review code changes", "work", "medium", 2.0, "in-progress", today,
         "Review pull requests and provide feedback"),
        ("task3", "Exercise and gym", "health", "medium", 1.5, "completed", yesterday,
         "Morning workout session"),
    ];
    let tasks_path = format!("data/{DEMO_UID}/tasks");
    for (offset, (id, title, category, priority, hours, status, date, description)) in
        tasks.into_iter().enumerate()
    {
        // Later entries are older so the default newest-first order matches the list above.
        let created = format_timestamp(now - Duration::minutes(offset as i64));
        db.insert(
            &super::doc(&tasks_path, id),
            fields(json!({
                "title": title,
                "category": category,
                "priority": priority,
                "timeSpent": hours,
                "description": description,
                "status": status,
                "date": date.format("%Y-%m-%d").to_string(),
                "createdAt": created,
                "updatedAt": created,
                "userId": DEMO_UID,
            })),
        );
    }
}
