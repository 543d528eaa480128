//! Taskflow CLI
//!
//! Logs in against the task-approval backend, lists and creates tasks, and
//! lets managers approve or reject pending work.

use anyhow::{Result, bail};
use clap::Parser;
use std::io::{BufRead, Write};
use taskflow_client::TaskClient;
use taskflow_client::cli::tasks::{ListArgs, TasksCommand};
use taskflow_client::cli::{Cli, Command};
use taskflow_client::config::{Config, ConfigLoader, ConfigPaths};
use taskflow_client::format::{self, OutputFormat};
use taskflow_client::logging::{self, LogTarget};
use taskflow_client::probe::Readiness;
use taskflow_client::types::{Registration, TaskDraft, TaskStatus};
use taskflow_client::view::{self, ViewState};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "using config file");
    }

    let config = loader.config_mut();
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(session) = &cli.session {
        config.session.path = Some(session.into());
    }
    if let Some(format) = cli.format {
        config.view.format = format;
    }
    let config = loader.into_config();

    let client = TaskClient::from_config(&config)?;
    run(&client, &config, cli.command).await
}

async fn run(client: &TaskClient, config: &Config, command: Command) -> Result<()> {
    let output = config.view.format;

    match command {
        Command::WaitReady => {
            let outcome = wait_ready(client).await?;
            info!(attempts = outcome, "backend ready");
            emit(output, &serde_json::json!({ "ready": true, "attempts": outcome }), || {
                format!("Backend ready after {outcome} attempt(s).\n")
            });
        }

        Command::Login {
            username,
            password,
            no_wait,
        } => {
            if !no_wait {
                wait_ready(client).await?;
            }
            let password = match password {
                Some(password) => password,
                None => prompt_password(&username)?,
            };
            let session = client.login(&username, &password).await?;
            emit(output, &session, || format::format_session_markdown(&session));
        }

        Command::Logout => {
            client.logout()?;
            emit(output, &serde_json::json!({ "logged_out": true }), || {
                "Logged out.\n".to_string()
            });
        }

        Command::Whoami { check } => {
            let session = client.session().current();
            if check && !session.is_empty() {
                let valid = client.validate_session().await?;
                emit(output, &serde_json::json!({ "session": session, "valid": valid }), || {
                    let mut md = format::format_session_markdown(&session);
                    md.push_str(if valid {
                        "Token accepted by the identity service.\n"
                    } else {
                        "Token rejected by the identity service.\n"
                    });
                    md
                });
            } else {
                emit(output, &session, || format::format_session_markdown(&session));
            }
        }

        Command::Register {
            username,
            email,
            password,
            role,
        } => {
            let registration = Registration {
                username,
                email,
                password,
                role,
            };
            client.register(&registration).await?;
            emit(output, &serde_json::json!({ "registered": registration.username }), || {
                format!("Registered **{}**.\n", registration.username)
            });
        }

        Command::Users => {
            require_session(client).await?;
            let users = client.workflow().users();
            emit(output, &users, || format::format_users_markdown(&users));
        }

        Command::Tasks(command) => run_tasks(client, config, command).await?,

        Command::Dashboard => {
            require_session(client).await?;
            if !client.session().is_manager() {
                bail!("The dashboard is only available to managers.");
            }
            let board = view::dashboard(&client.workflow().tasks());
            emit(output, &board, || format::format_dashboard_markdown(&board));
        }
    }

    Ok(())
}

async fn run_tasks(client: &TaskClient, config: &Config, command: TasksCommand) -> Result<()> {
    let output = config.view.format;
    require_session(client).await?;
    let workflow = client.workflow();

    match command {
        TasksCommand::List(ListArgs { status, sort }) => {
            let defaults = config.view.state();
            let state = ViewState {
                filter: status.unwrap_or(defaults.filter),
                sort: sort.unwrap_or(defaults.sort),
            };
            let tasks = view::project_view(&workflow.tasks(), state);
            emit(output, &tasks, || format::format_tasks_markdown(&tasks));
        }
        TasksCommand::Create(args) => {
            let draft = TaskDraft::from(args);
            workflow.create(&draft).await?;
            let tasks = view::project_view(&workflow.tasks(), config.view.state());
            emit(output, &tasks, || {
                format!("Created **{}**.\n\n{}", draft.title, format::format_tasks_markdown(&tasks))
            });
        }
        TasksCommand::Approve { id } => change_status(client, output, &id, TaskStatus::Approved).await?,
        TasksCommand::Reject { id } => change_status(client, output, &id, TaskStatus::Rejected).await?,
    }

    Ok(())
}

async fn change_status(
    client: &TaskClient,
    output: OutputFormat,
    id: &str,
    status: TaskStatus,
) -> Result<()> {
    client.workflow().update_status(id, status).await?;
    match client.workflow().task(id) {
        Some(task) => emit(output, &task, || format::format_task_markdown(&task)),
        None => emit(output, &serde_json::json!({ "id": id, "status": status }), || {
            format!("Task `{id}` is now {status}.\n")
        }),
    }
    Ok(())
}

/// Poll until the backend answers. Returns the number of attempts.
async fn wait_ready(client: &TaskClient) -> Result<u32> {
    let probe = client.readiness_probe();
    eprintln!("Waiting for backend at {}...", client.api().base_url());
    let handle = probe.spawn();
    let Some(outcome) = handle.finished().await else {
        bail!("readiness probe was cancelled");
    };
    if outcome.readiness() == Readiness::Superseded {
        debug!("already logged in, skipped readiness wait");
    }
    Ok(outcome.attempts())
}

/// Restore the persisted session and load its tasks and users.
async fn require_session(client: &TaskClient) -> Result<()> {
    if !client.resume().await {
        bail!("Not logged in. Run `taskflow login` first.");
    }
    Ok(())
}

fn prompt_password(username: &str) -> Result<String> {
    eprint!("Password for {username}: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn emit<T: serde::Serialize>(output: OutputFormat, value: &T, markdown: impl FnOnce() -> String) {
    match output {
        OutputFormat::Json => println!("{}", format::to_json(value)),
        OutputFormat::Markdown => print!("{}", markdown()),
    }
}
