//! tasklog view and config commands

use std::path::PathBuf;

use serde::Serialize;

use super::Context;
use crate::config::{BackendKind, TasksConfig, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::prefs::{Preferences, View};

#[derive(Serialize)]
struct ViewReport {
    view: View,
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    home: &'a PathBuf,
    config_file: PathBuf,
    config_file_exists: bool,
    backend: BackendKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<PathBuf>,
    tasks: &'a TasksConfig,
}

pub fn run_view(ctx: &Context, raw: &str) -> Result<()> {
    let view: View = raw.parse()?;
    let mut prefs = Preferences::load(&ctx.home)?;
    prefs.view = view;
    prefs.save(&ctx.home)?;

    let human = HumanOutput::new(format!("Default view set to {view}"));
    emit_success(ctx.output, "view", &ViewReport { view }, Some(&human))
}

pub fn run_config_show(ctx: &Context) -> Result<()> {
    let backend = ctx.config.backend.resolve()?;
    let database = match backend {
        BackendKind::File => Some(ctx.config.backend.database_path(&ctx.home)),
        _ => None,
    };
    let config_file = ctx.home.join(CONFIG_FILE);

    let mut human = HumanOutput::new("tasklog configuration");
    human.push_summary("home", ctx.home.display().to_string());
    human.push_summary(
        "backend",
        match backend {
            BackendKind::File => "file",
            _ => "memory (mock)",
        },
    );
    if let Some(path) = &database {
        human.push_summary("database", path.display().to_string());
    }
    human.push_summary("categories", ctx.config.tasks.categories.join(", "));
    human.push_summary("default category", ctx.config.tasks.default_category.clone());
    human.push_summary("default priority", ctx.config.tasks.default_priority.clone());
    human.push_summary("default status", ctx.config.tasks.default_status.clone());
    if !config_file.exists() {
        human.push_warning(format!("{} not found; using defaults", config_file.display()));
    }

    emit_success(
        ctx.output,
        "config show",
        &ConfigReport {
            home: &ctx.home,
            config_file_exists: config_file.exists(),
            config_file,
            backend,
            database,
            tasks: &ctx.config.tasks,
        },
        Some(&human),
    )
}
