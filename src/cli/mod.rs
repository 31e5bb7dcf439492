//! Command-line interface for tasklog
//!
//! This module defines the CLI structure using clap derive macros.
//! Each group of subcommands is implemented in its own submodule.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::config::{self, Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::OutputOptions;
use crate::store::{open_store, DocumentStore};
use crate::task::parse_date;

mod auth;
mod settings;
mod task;

/// tasklog - daily task logger
///
/// Log what you worked on each day, then filter, summarize and export it.
#[derive(Parser, Debug)]
#[command(name = "tasklog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding config, session and the document store
    #[arg(long, global = true, env = "TASKLOG_HOME")]
    pub home: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the current calendar day (YYYY-MM-DD)
    #[arg(long, global = true, env = "TASKLOG_TODAY", hide = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm: String,
    },

    /// Sign in with a Google account (mock provider)
    LoginGoogle,

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Log a task
    Add {
        /// Task title
        title: String,

        /// Category (see `tasklog config show`)
        #[arg(short, long)]
        category: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Hours spent
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Status: pending, in-progress, completed
        #[arg(short, long)]
        status: Option<String>,

        /// Day the task belongs to (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List tasks, newest first
    List {
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        /// Date window: today, yesterday, week, month
        #[arg(long)]
        date: Option<String>,

        /// Case-insensitive text search over title, description and category
        #[arg(long)]
        search: Option<String>,

        /// Render as list or card (defaults to the saved preference)
        #[arg(long)]
        view: Option<String>,
    },

    /// Show one task
    Show {
        id: String,
    },

    /// Edit a task; omitted fields keep their current value
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        time: Option<f64>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        status: Option<String>,
    },

    /// Delete a task
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Totals, completion, time spent and daily streak
    Stats,

    /// Export all tasks as JSON
    Export {
        /// Output file (defaults to daily-tasks-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set the default list view
    View {
        /// list or card
        view: String,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and backend
    Show,
}

/// Resolved global state shared by every command.
pub struct Context {
    pub home: PathBuf,
    pub config: Config,
    pub today: NaiveDate,
    pub output: OutputOptions,
}

impl Context {
    fn new(home: Option<PathBuf>, today: Option<&str>, output: OutputOptions) -> Result<Self> {
        let home = config::resolve_home(home.as_deref());
        let config_path = home.join(CONFIG_FILE);
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            Config::default()
        };
        let today = match today.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => parse_date(raw)?,
            None => Local::now().date_naive(),
        };
        tracing::debug!(home = %home.display(), %today, "resolved context");
        Ok(Self {
            home,
            config,
            today,
            output,
        })
    }

    pub fn open_store(&self) -> Result<Box<dyn DocumentStore>> {
        open_store(&self.config, &self.home, self.today)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = Context::new(self.home, self.today.as_deref(), output)?;

        match self.command {
            Commands::Login { email, password } => auth::run_login(&ctx, &email, &password),
            Commands::Register { email, password, confirm } => {
                auth::run_register(&ctx, &email, &password, &confirm)
            }
            Commands::LoginGoogle => auth::run_login_google(&ctx),
            Commands::Logout => auth::run_logout(&ctx),
            Commands::Whoami => auth::run_whoami(&ctx),
            Commands::Add { title, category, priority, time, description, status, date } => {
                task::run_add(
                    &ctx,
                    task::AddOptions {
                        title,
                        category,
                        priority,
                        time,
                        description,
                        status,
                        date,
                    },
                )
            }
            Commands::List { category, status, date, search, view } => task::run_list(
                &ctx,
                task::ListOptions {
                    category,
                    status,
                    date,
                    search,
                    view,
                },
            ),
            Commands::Show { id } => task::run_show(&ctx, &id),
            Commands::Edit { id, title, category, priority, time, description, status } => {
                task::run_edit(
                    &ctx,
                    task::EditOptions {
                        id,
                        title,
                        category,
                        priority,
                        time,
                        description,
                        status,
                    },
                )
            }
            Commands::Delete { id, yes } => task::run_delete(&ctx, &id, yes),
            Commands::Stats => task::run_stats(&ctx),
            Commands::Export { output } => task::run_export(&ctx, output),
            Commands::View { view } => settings::run_view(&ctx, &view),
            Commands::Config(ConfigCommands::Show) => settings::run_config_show(&ctx),
        }
    }
}
