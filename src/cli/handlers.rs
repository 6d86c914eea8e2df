use chrono::NaiveDate;
use tracing::info;

use crate::cli::commands::{AddArgs, Cli, Commands, TaskIdArgs, TasksArgs};
use crate::cli::output::*;
use crate::io::sync::{SyncCommand, new_token};
use crate::io::{HttpTransport, RemoteClient};
use crate::model::{ClientConfig, CompleteVia, Project, Scope};
use crate::ops::reconcile::{ReconcileError, Session, SessionOptions};

type CmdResult = Result<Vec<String>, Box<dyn std::error::Error>>;

/// Run a subcommand against the service and print what it produced.
pub fn dispatch(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        return Ok(());
    };
    let client = RemoteClient::new(Box::new(HttpTransport::new(config)));
    let today = chrono::Local::now().date_naive();
    let lines = run(&client, command, SessionOptions::from(config), cli.json, today)?;
    for line in &lines {
        println!("{}", line);
    }
    Ok(())
}

/// Execute one command and return its output lines.
pub fn run(
    client: &RemoteClient,
    command: Commands,
    options: SessionOptions,
    json: bool,
    today: NaiveDate,
) -> CmdResult {
    match command {
        Commands::Projects => cmd_projects(client, json),
        Commands::Tasks(args) => cmd_tasks(client, args, options, json, today),
        Commands::Done(args) => cmd_done(client, args, options.complete_via, json),
        Commands::Reopen(args) => cmd_reopen(client, args, json),
        Commands::Add(args) => cmd_add(client, args, json),
        Commands::Delete(args) => cmd_delete(client, args, json),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_projects(client: &RemoteClient, json: bool) -> CmdResult {
    let projects = Project::load_list(&client.get_projects()?)?;
    if json {
        return Ok(vec![serde_json::to_string_pretty(&projects)?]);
    }
    Ok(projects.iter().map(format_project_line).collect())
}

fn cmd_tasks(
    client: &RemoteClient,
    args: TasksArgs,
    options: SessionOptions,
    json: bool,
    today: NaiveDate,
) -> CmdResult {
    let scope = scope_for(args.project);
    let session = Session::open(client, scope, options)?;
    let tasks = session.collection().tasks();
    if json {
        let listing = TaskListJson {
            scope: session.scope().title(),
            tasks,
        };
        return Ok(vec![serde_json::to_string_pretty(&listing)?]);
    }
    Ok(format_task_list(tasks, today))
}

// ---------------------------------------------------------------------------
// Mutating commands
// ---------------------------------------------------------------------------

fn cmd_done(client: &RemoteClient, args: TaskIdArgs, via: CompleteVia, json: bool) -> CmdResult {
    match via {
        CompleteVia::Rest => client.close_task(&args.id)?,
        CompleteVia::Sync => {
            client.sync(&[SyncCommand::postpone(&args.id)])?;
        }
    }
    info!(task = %args.id, ?via, "completed");
    change(&args.id, "completed", json)
}

fn cmd_reopen(client: &RemoteClient, args: TaskIdArgs, json: bool) -> CmdResult {
    client.sync(&[SyncCommand::reopen(&args.id)])?;
    info!(task = %args.id, "reopened");
    change(&args.id, "reopened", json)
}

fn cmd_add(client: &RemoteClient, args: AddArgs, json: bool) -> CmdResult {
    let content = args.content.trim();
    if content.is_empty() {
        return Err("nothing to add: task text is blank".into());
    }
    let scope = scope_for(args.project);
    let temp_id = new_token();
    let response = client.sync(&[SyncCommand::add_item(content, &scope, &temp_id)])?;
    let id = response
        .real_id(&temp_id)
        .ok_or_else(|| ReconcileError::Mapping(temp_id.clone()))?;
    info!(task = %id, "added");
    if json {
        return Ok(vec![serde_json::to_string_pretty(&AddedJson {
            id: &id,
            content,
        })?]);
    }
    Ok(vec![id])
}

fn cmd_delete(client: &RemoteClient, args: TaskIdArgs, json: bool) -> CmdResult {
    client.delete_task(&args.id)?;
    info!(task = %args.id, "deleted");
    change(&args.id, "deleted", json)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A project id names only the project; its title is not needed here.
fn scope_for(project: Option<String>) -> Scope {
    match project {
        Some(id) => Scope::Project {
            name: id.clone(),
            id,
        },
        None => Scope::Today,
    }
}

fn change(id: &str, action: &str, json: bool) -> CmdResult {
    if json {
        return Ok(vec![serde_json::to_string(&ChangeJson { id, action })?]);
    }
    Ok(vec![format!("{} {}", action, id)])
}
