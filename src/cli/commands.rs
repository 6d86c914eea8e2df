use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::model::{
    ClientConfig, CompleteVia, DEFAULT_REST_BASE, DEFAULT_SYNC_URL, DEFAULT_TIMEOUT_SECS,
    TOKEN_ENV,
};

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdeck v", env!("CARGO_PKG_VERSION"), " - your task list in the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// API token (read from the environment when not given)
    #[arg(long, env = TOKEN_ENV, hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Base URL of the REST surface
    #[arg(long, env = "TD_REST_BASE", default_value = DEFAULT_REST_BASE, global = true)]
    pub rest_base: String,

    /// URL of the Sync endpoint
    #[arg(long, env = "TD_SYNC_URL", default_value = DEFAULT_SYNC_URL, global = true)]
    pub sync_url: String,

    /// Give up on a request after this many seconds
    #[arg(long, env = "TD_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,

    /// How tasks are completed
    #[arg(long, env = "TD_COMPLETE_VIA", value_enum, default_value_t = CompleteVia::Rest, global = true)]
    pub complete_via: CompleteVia,

    /// Sort task lists by priority when they are opened
    #[arg(long, global = true)]
    pub sort: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Append logs to this file
    #[arg(long, env = "TD_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects
    Projects,
    /// List open tasks due today, or in one project
    Tasks(TasksArgs),
    /// Complete a task
    Done(TaskIdArgs),
    /// Reopen a task, due today
    Reopen(TaskIdArgs),
    /// Add a task and print its id
    Add(AddArgs),
    /// Delete a task
    Delete(TaskIdArgs),
}

#[derive(Args)]
pub struct TasksArgs {
    /// Project id (default: tasks due today)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct TaskIdArgs {
    /// Task id
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub content: String,
    /// Project id (default: due today in the Inbox)
    #[arg(long)]
    pub project: Option<String>,
}

impl Cli {
    /// The token, if one was given and is not blank
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Resolve endpoints and switches into a client config.
    pub fn client_config(&self, token: &str) -> Result<ClientConfig, url::ParseError> {
        Ok(ClientConfig {
            token: token.to_string(),
            rest_base: Url::parse(&self.rest_base)?,
            sync_url: Url::parse(&self.sync_url)?,
            timeout: Duration::from_secs(self.timeout),
            complete_via: self.complete_via,
            sort_on_open: self.sort,
        })
    }
}
