//! Sprint Pilot CLI library

pub mod app;
pub mod auth;

use std::path::PathBuf;

use clap::Args;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

/// Default remote document store endpoint.
pub const DEFAULT_REMOTE_URL: &str =
    "https://sprint-pilot-db-default-rtdb.asia-southeast1.firebasedatabase.app";

#[derive(Parser)]
#[command(name = "sp")]
#[command(about = "Sprint Pilot goal and sprint tracker")]
#[command(version, author, long_about = None)]
pub struct Cli {
    /// Directory for the local store, session, and snapshot files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the remote document store
    #[arg(long, global = true, default_value = DEFAULT_REMOTE_URL)]
    pub remote_url: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Goal lifecycle commands
    Goal {
        #[command(subcommand)]
        subcommand: GoalCommands,
    },

    /// Record a completed sprint against the active goal
    Sprint(SprintOptions),

    /// Show the active goal and its progress
    Status,

    /// List all goals with their sprint counts
    Goals,

    /// Show sprint history
    History(HistoryOptions),

    /// Synchronize with the remote store
    Sync {
        #[command(subcommand)]
        subcommand: SyncCommands,
    },

    /// Sign in and decide what to do with local data
    Login(LoginOptions),

    /// Sign out and restore the pre-login snapshot
    Logout,

    /// Show the current user and sync scope
    Whoami,
}

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Start a new goal, giving up any currently active one
    New {
        /// Goal title
        title: String,

        /// Target number of sprints
        #[arg(short, long)]
        target: Option<i64>,
    },

    /// Complete the active goal
    Done,

    /// Give up the active goal
    GiveUp,
}

#[derive(Args)]
pub struct SprintOptions {
    /// What you worked on
    pub task: String,

    /// Planned sprint length in seconds
    #[arg(long, default_value_t = 1500)]
    pub target_secs: i64,

    /// Seconds actually spent
    #[arg(long)]
    pub actual_secs: i64,
}

#[derive(Args, Default)]
pub struct HistoryOptions {
    /// Only show sprints created at or after this epoch-millis timestamp
    #[arg(long)]
    pub from_ms: Option<i64>,

    /// Only show sprints created at or before this epoch-millis timestamp
    #[arg(long)]
    pub to_ms: Option<i64>,
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Push local data to the remote store
    Push {
        /// Defer to the background trigger: wait for connectivity, retry on failure
        #[arg(long)]
        background: bool,
    },

    /// Replace local data with the remote scope's contents
    Pull,
}

#[derive(Args)]
pub struct LoginOptions {
    /// User identifier to sign in as
    pub user: String,

    /// Restore data from the cloud after signing in
    #[arg(long, conflicts_with_all = ["backup", "later"])]
    pub restore: bool,

    /// Back up local data to the cloud after signing in
    #[arg(long, conflicts_with = "later")]
    pub backup: bool,

    /// Keep local data and decide later
    #[arg(long)]
    pub later: bool,
}

impl Cli {
    /// Build the application context and execute the requested command.
    pub async fn run(self) -> anyhow::Result<()> {
        let app = app::App::new(self.data_dir, &self.remote_url)?;
        app.run(self.command).await
    }
}
