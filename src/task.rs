//! Daily task records.
//!
//! Tasks belong to one user and live in the `data/{uid}/tasks` collection.
//! Documents use camelCase field names (`timeSpent`, `createdAt`, ...).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::config::TasksConfig;
use crate::error::{Error, Result};
use crate::lock::write_atomic;
use crate::store::{collection, order_by, to_fields, CollectionRef, Direction, DocumentStore};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-width RFC 3339 timestamp so stored values also sort as strings.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        Error::InvalidArgument(format!("invalid date '{raw}': expected YYYY-MM-DD"))
    })
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "invalid priority '{other}': must be low, medium or high"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }

    /// Human label: `in progress` rather than `in-progress`.
    pub fn label(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match normalized.as_str() {
            "pending" => Ok(Status::Pending),
            "in-progress" | "inprogress" => Ok(Status::InProgress),
            "completed" | "done" => Ok(Status::Completed),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status '{}': must be pending, in-progress or completed",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    /// Hours.
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    pub date: NaiveDate,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

/// Values for a new task. Unset options take the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub title: String,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub time_spent: f64,
    pub description: String,
    pub status: Option<Status>,
    pub date: Option<NaiveDate>,
}

/// Full replacement of the editable fields. The date is not editable.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEdit {
    pub title: String,
    pub category: String,
    pub description: String,
    pub priority: Priority,
    pub time_spent: f64,
    pub status: Status,
}

impl From<&Task> for TaskEdit {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            category: task.category.clone(),
            description: task.description.clone(),
            priority: task.priority,
            time_spent: task.time_spent,
            status: task.status,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EditFields<'a> {
    title: &'a str,
    category: &'a str,
    description: &'a str,
    priority: Priority,
    time_spent: f64,
    status: Status,
    #[serde(with = "timestamp")]
    updated_at: DateTime<Utc>,
}

fn validate_fields(config: &TasksConfig, title: &str, category: &str, time_spent: f64) -> Result<(String, String)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidTask("title cannot be empty".to_string()));
    }
    let category = config.category(category).ok_or_else(|| {
        Error::InvalidTask(format!(
            "unknown category '{}' (expected one of: {})",
            category.trim(),
            config.categories.join(", ")
        ))
    })?;
    if !time_spent.is_finite() || time_spent < 0.0 {
        return Err(Error::InvalidTask(format!(
            "time spent must be a non-negative number of hours, got {time_spent}"
        )));
    }
    Ok((title.to_string(), category))
}

/// Collection holding `uid`'s tasks.
pub fn tasks_collection(uid: &str) -> CollectionRef {
    collection(&format!("data/{uid}/tasks"))
}

/// Default export file name for `today`.
pub fn export_file_name(today: NaiveDate) -> String {
    format!("daily-tasks-{}.json", today.format(DATE_FORMAT))
}

/// Task operations for the signed-in user.
pub struct TaskLog<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    config: &'a TasksConfig,
    user: Option<User>,
    today: NaiveDate,
}

impl<'a, S: DocumentStore + ?Sized> TaskLog<'a, S> {
    pub fn new(store: &'a S, config: &'a TasksConfig, user: Option<User>, today: NaiveDate) -> Self {
        Self {
            store,
            config,
            user,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn require_user(&self, action: &str) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| Error::NotSignedIn(action.to_string()))
    }

    pub fn add(&self, input: TaskInput) -> Result<Task> {
        let user = self.require_user("add tasks")?;
        let category = input
            .category
            .unwrap_or_else(|| self.config.default_category.clone());
        let (title, category) = validate_fields(self.config, &input.title, &category, input.time_spent)?;

        let now = Utc::now().trunc_subsecs(3);
        let mut task = Task {
            id: String::new(),
            title,
            category,
            priority: match input.priority {
                Some(priority) => priority,
                None => self.config.default_priority.parse()?,
            },
            time_spent: input.time_spent,
            description: input.description.trim().to_string(),
            status: match input.status {
                Some(status) => status,
                None => self.config.default_status.parse()?,
            },
            date: input.date.unwrap_or(self.today),
            created_at: now,
            updated_at: now,
            user_id: user.uid.clone(),
        };

        let mut fields = to_fields(&task)?;
        fields.remove("id");
        let created = self.store.add_doc(&tasks_collection(&user.uid), fields)?;
        task.id = created.id;
        tracing::info!(uid = %user.uid, task_id = %task.id, "task added");
        Ok(task)
    }

    /// All tasks of the user, newest first.
    pub fn load(&self) -> Result<Vec<Task>> {
        let user = self.require_user("view tasks")?;
        let snapshot = self.store.get_docs(
            &tasks_collection(&user.uid)
                .query()
                .with(order_by("createdAt", Direction::Desc))
                .with(order_by("id", Direction::Desc)),
        )?;

        let mut tasks = Vec::with_capacity(snapshot.len());
        for doc in snapshot.iter() {
            match doc.decode::<Task>() {
                Ok(task) => tasks.push(task),
                Err(err) => tracing::warn!(task_id = %doc.id, error = %err, "skipping malformed task"),
            }
        }
        tracing::debug!(uid = %user.uid, count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        let user = self.require_user("view tasks")?;
        let doc = self
            .store
            .get_doc(&tasks_collection(&user.uid).doc(id))?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        doc.decode()
    }

    /// Replace the editable fields of task `id`.
    pub fn edit(&self, id: &str, edit: TaskEdit) -> Result<Task> {
        let user = self.require_user("edit tasks")?;
        let (title, category) = validate_fields(self.config, &edit.title, &edit.category, edit.time_spent)?;

        let fields = to_fields(&EditFields {
            title: &title,
            category: &category,
            description: edit.description.trim(),
            priority: edit.priority,
            time_spent: edit.time_spent,
            status: edit.status,
            updated_at: Utc::now().trunc_subsecs(3),
        })?;
        let target = tasks_collection(&user.uid).doc(id);
        if !self.store.update_doc(&target, fields)? {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        tracing::info!(uid = %user.uid, task_id = id, "task updated");
        self.get(id)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let user = self.require_user("delete tasks")?;
        if !self.store.delete_doc(&tasks_collection(&user.uid).doc(id))? {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        tracing::info!(uid = %user.uid, task_id = id, "task deleted");
        Ok(())
    }

    /// Write `tasks` as pretty JSON. Without `path`, uses the dated default
    /// name in the current directory.
    pub fn export(&self, tasks: &[Task], path: Option<&Path>) -> Result<PathBuf> {
        self.require_user("export tasks")?;
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(export_file_name(self.today)));
        let mut bytes = serde_json::to_vec_pretty(tasks)?;
        bytes.push(b'\n');
        write_atomic(&path, &bytes)?;
        tracing::info!(path = %path.display(), count = tasks.len(), "tasks exported");
        Ok(path)
    }
}
