//! tasklog task commands: add, list, show, edit, delete, stats, export.

use std::path::PathBuf;

use serde::Serialize;

use super::Context;
use crate::error::{Error, Result};
use crate::filter::{DateRange, TaskFilter};
use crate::output::{emit_success, HumanOutput};
use crate::prefs::{Preferences, View};
use crate::session;
use crate::stats::Stats;
use crate::store::DocumentStore;
use crate::task::{parse_date, Priority, Status, Task, TaskEdit, TaskInput, TaskLog, DATE_FORMAT};

/// Options for `tasklog add`
pub struct AddOptions {
    pub title: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub time: f64,
    pub description: String,
    pub status: Option<String>,
    pub date: Option<String>,
}

/// Options for `tasklog list`
pub struct ListOptions {
    pub category: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub search: Option<String>,
    pub view: Option<String>,
}

/// Options for `tasklog edit`
pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub time: Option<f64>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
struct TaskReport<'a> {
    task: &'a Task,
}

#[derive(Serialize)]
struct ListReport<'a> {
    view: View,
    filter: &'a TaskFilter,
    count: usize,
    total: usize,
    tasks: &'a [Task],
}

#[derive(Serialize)]
struct DeleteReport<'a> {
    id: &'a str,
    deleted: bool,
}

#[derive(Serialize)]
struct ExportReport {
    path: PathBuf,
    count: usize,
}

fn task_log<'a>(ctx: &'a Context, store: &'a dyn DocumentStore) -> TaskLog<'a, dyn DocumentStore + 'a> {
    let user = session::load(&ctx.home).map(|session| session.user);
    TaskLog::new(store, &ctx.config.tasks, user, ctx.today)
}

fn hours(value: f64) -> String {
    format!("{value}h")
}

fn list_line(task: &Task) -> String {
    format!(
        "{}  {}  [{}] {} ({}, {}, {})",
        task.id,
        task.date.format(DATE_FORMAT),
        task.status,
        task.title,
        task.category,
        task.priority,
        hours(task.time_spent)
    )
}

fn card(task: &Task) -> String {
    let mut lines = vec![
        task.title.clone(),
        format!("  {} | {} | {}", task.category, task.priority, task.status.label()),
    ];
    if !task.description.is_empty() {
        lines.push(format!("  {}", task.description));
    }
    lines.push(format!(
        "  {} on {}  (id: {})",
        hours(task.time_spent),
        task.date.format("%b %-d, %Y"),
        task.id
    ));
    lines.join("\n")
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("id", task.id.clone());
    human.push_summary("date", task.date.format(DATE_FORMAT).to_string());
    human.push_summary("category", task.category.clone());
    human.push_summary("priority", task.priority.to_string());
    human.push_summary("status", task.status.to_string());
    human.push_summary("time spent", hours(task.time_spent));
    if !task.description.is_empty() {
        human.push_summary("description", task.description.clone());
    }
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let input = TaskInput {
        title: options.title,
        category: options.category,
        priority: options.priority.as_deref().map(str::parse::<Priority>).transpose()?,
        time_spent: options.time,
        description: options.description,
        status: options.status.as_deref().map(str::parse::<Status>).transpose()?,
        date: options.date.as_deref().map(parse_date).transpose()?,
    };

    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    let task = log.add(input)?;

    let mut human = HumanOutput::new(format!("Task added: {}", task.title));
    push_task_summary(&mut human, &task);
    if store.is_mock() {
        human.push_warning("mock backend: this task is not persisted");
    }
    human.push_next_step("tasklog list");

    emit_success(ctx.output, "add", &TaskReport { task: &task }, Some(&human))
}

pub fn run_list(ctx: &Context, options: ListOptions) -> Result<()> {
    let filter = TaskFilter {
        category: options.category,
        status: options.status.as_deref().map(str::parse::<Status>).transpose()?,
        date: options.date.as_deref().map(str::parse::<DateRange>).transpose()?,
        search: options.search.filter(|term| !term.trim().is_empty()),
    };
    let view = match options.view.as_deref() {
        Some(raw) => raw.parse::<View>()?,
        None => Preferences::load(&ctx.home)?.view,
    };

    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    let tasks = log.load()?;
    let shown = filter.apply(&tasks, ctx.today);

    let mut human = if shown.is_empty() {
        let mut human = HumanOutput::new("No tasks found");
        if tasks.is_empty() {
            human.push_next_step("tasklog add \"<title>\" --time <hours>");
        }
        human
    } else {
        HumanOutput::new(format!("Tasks ({} of {})", shown.len(), tasks.len()))
    };
    for task in &shown {
        match view {
            View::List => human.push_detail(list_line(task)),
            View::Card => human.push_detail(card(task)),
        }
    }

    emit_success(
        ctx.output,
        "list",
        &ListReport {
            view,
            filter: &filter,
            count: shown.len(),
            total: tasks.len(),
            tasks: &shown,
        },
        Some(&human),
    )
}

pub fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    let task = log.get(id)?;

    let mut human = HumanOutput::new(task.title.clone());
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("tasklog edit {}", task.id));

    emit_success(ctx.output, "show", &TaskReport { task: &task }, Some(&human))
}

pub fn run_edit(ctx: &Context, options: EditOptions) -> Result<()> {
    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    let current = log.get(&options.id)?;

    let mut edit = TaskEdit::from(&current);
    if let Some(title) = options.title {
        edit.title = title;
    }
    if let Some(category) = options.category {
        edit.category = category;
    }
    if let Some(description) = options.description {
        edit.description = description;
    }
    if let Some(priority) = options.priority {
        edit.priority = priority.parse::<Priority>()?;
    }
    if let Some(time) = options.time {
        edit.time_spent = time;
    }
    if let Some(status) = options.status {
        edit.status = status.parse::<Status>()?;
    }

    let task = log.edit(&options.id, edit)?;

    let mut human = HumanOutput::new(format!("Task updated: {}", task.title));
    push_task_summary(&mut human, &task);
    if store.is_mock() {
        human.push_warning("mock backend: this change is not persisted");
    }
    emit_success(ctx.output, "edit", &TaskReport { task: &task }, Some(&human))
}

pub fn run_delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    if !yes {
        return Err(Error::InvalidArgument(format!(
            "refusing to delete task {id} without --yes"
        )));
    }

    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    log.delete(id)?;

    let mut human = HumanOutput::new(format!("Task deleted: {id}"));
    if store.is_mock() {
        human.push_warning("mock backend: this change is not persisted");
    }
    emit_success(ctx.output, "delete", &DeleteReport { id, deleted: true }, Some(&human))
}

pub fn run_stats(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    let tasks = log.load()?;
    let stats = Stats::compute(&tasks, ctx.today);

    let mut human = HumanOutput::new("Task statistics");
    human.push_summary("total tasks", stats.total.to_string());
    human.push_summary("completed", stats.completed.to_string());
    human.push_summary("time spent", stats.time_spent_label());
    human.push_summary("streak", format!("{} day(s)", stats.streak));
    for (category, count) in &stats.by_category {
        human.push_detail(format!("{category}: {count}"));
    }

    emit_success(ctx.output, "stats", &stats, Some(&human))
}

pub fn run_export(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let store = ctx.open_store()?;
    let log = task_log(ctx, store.as_ref());
    let tasks = log.load()?;
    let path = log.export(&tasks, output.as_deref())?;

    let mut human = HumanOutput::new("Tasks exported successfully!");
    human.push_summary("path", path.display().to_string());
    human.push_summary("tasks", tasks.len().to_string());

    emit_success(
        ctx.output,
        "export",
        &ExportReport {
            path,
            count: tasks.len(),
        },
        Some(&human),
    )
}
