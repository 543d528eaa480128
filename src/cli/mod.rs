//! CLI command definitions for taskflow.
//!
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod tasks;

use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use tasks::TasksCommand;

/// Task approval client
#[derive(Parser, Debug)]
#[command(name = "taskflow", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Gateway base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to the session file (overrides config)
    #[arg(long, global = true)]
    pub session: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll the backend until it accepts logins
    WaitReady,

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (prompted on stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Skip the readiness probe
        #[arg(long)]
        no_wait: bool,
    },

    /// Clear the session and all stored client state
    Logout,

    /// Show the current session
    Whoami {
        /// Also ask the identity service whether the token is valid
        #[arg(long)]
        check: bool,
    },

    /// Register a new account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long, default_value = "USER")]
        role: String,
    },

    /// List users available as assignees
    Users,

    /// Task operations
    #[command(subcommand)]
    Tasks(TasksCommand),

    /// Manager dashboard: pending tasks and history
    Dashboard,
}
