//! Command execution context.
//!
//! `App` owns the component lifecycle: it constructs the store, auth, remote
//! client, sync engine, vault, and scheduler once per process and passes them
//! where they are needed instead of relying on global singletons.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use sp_core::{AuthProvider, ScopeResolver};
use sp_local_db::{Database, LocalStore};
use sp_remote::{HttpRemoteStore, RemoteStore};
use sp_sync::{SnapshotVault, SyncEngine, SyncScheduler};

use crate::auth::SessionAuth;
use crate::{Commands, GoalCommands, HistoryOptions, LoginOptions, SprintOptions, SyncCommands};

enum SyncDecision {
    Restore,
    Backup,
    Later,
}

/// Fully wired application context.
pub struct App {
    store: LocalStore,
    auth: Arc<SessionAuth>,
    engine: Arc<SyncEngine>,
    vault: SnapshotVault,
    scheduler: SyncScheduler,
}

impl App {
    /// Construct the components against the given data directory and remote
    /// endpoint.
    pub fn new(data_dir: Option<PathBuf>, remote_url: &str) -> Result<Self> {
        let db_path = match &data_dir {
            Some(dir) => dir.join("sprint.db"),
            None => Database::default_path()?,
        };
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => db_path
                .parent()
                .map(PathBuf::from)
                .context("Database path has no parent directory")?,
        };

        let store = LocalStore::open(&db_path)
            .with_context(|| format!("Failed to open local store at {}", db_path.display()))?;
        std::fs::create_dir_all(&data_dir)?;

        let auth = Arc::new(SessionAuth::new(data_dir.join("session.json")));
        let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::from_url(remote_url)?);
        let engine = Arc::new(SyncEngine::new(store.clone(), remote, auth.clone()));
        let vault = SnapshotVault::new(store.clone(), &data_dir);
        let scheduler = SyncScheduler::new(engine.clone());

        Ok(Self {
            store,
            auth,
            engine,
            vault,
            scheduler,
        })
    }

    /// Access the local store (used by tests).
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Execute one command.
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Goal { subcommand } => match subcommand {
                GoalCommands::New { title, target } => self.goal_new(&title, target),
                GoalCommands::Done => self.goal_done().await,
                GoalCommands::GiveUp => self.goal_give_up(),
            },
            Commands::Sprint(options) => self.sprint(options).await,
            Commands::Status => self.status().await,
            Commands::Goals => self.goals(),
            Commands::History(options) => self.history(options),
            Commands::Sync { subcommand } => match subcommand {
                SyncCommands::Push { background } => self.sync_push(background).await,
                SyncCommands::Pull => self.sync_pull().await,
            },
            Commands::Login(options) => self.login(options).await,
            Commands::Logout => self.logout().await,
            Commands::Whoami => self.whoami(),
        }
    }

    fn goal_new(&self, title: &str, target: Option<i64>) -> Result<()> {
        let goal = self.store.create_goal(title, target)?;
        println!("Started goal #{}: {}", goal.id, goal.title);
        Ok(())
    }

    async fn goal_done(&self) -> Result<()> {
        let Some(progress) = self.store.active_goal_with_progress()? else {
            bail!("No active goal to complete.");
        };
        self.store.complete_goal(progress.goal.id)?;
        println!(
            "Completed goal #{} ({}) after {} sprints.",
            progress.goal.id, progress.goal.title, progress.completed_sprints
        );
        self.push_best_effort().await;
        Ok(())
    }

    fn goal_give_up(&self) -> Result<()> {
        let Some(progress) = self.store.active_goal_with_progress()? else {
            bail!("No active goal to give up.");
        };
        self.store.give_up_goal(progress.goal.id)?;
        println!("Gave up goal #{} ({}).", progress.goal.id, progress.goal.title);
        Ok(())
    }

    async fn sprint(&self, options: SprintOptions) -> Result<()> {
        let Some(progress) = self.store.active_goal_with_progress()? else {
            bail!("No active goal. Start one with `sp goal new <title>`.");
        };
        let record = self.store.record_sprint(
            progress.goal.id,
            &options.task,
            options.target_secs,
            options.actual_secs,
        )?;
        println!(
            "Recorded sprint #{} against goal #{} ({}s of {}s).",
            record.id, progress.goal.id, record.actual_duration_secs, record.target_duration_secs
        );
        self.push_best_effort().await;
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        // Opportunistic refresh before reading, like the app does on resume.
        if self.auth.is_authenticated() {
            if let Err(e) = self.engine.pull().await {
                eprintln!("Warning: sync pull failed ({}); showing local data.", e);
            }
        }

        match self.store.active_goal_with_progress()? {
            Some(progress) => {
                let target = match progress.goal.target_sprints {
                    Some(target) => format!("{}/{}", progress.completed_sprints, target),
                    None => progress.completed_sprints.to_string(),
                };
                println!(
                    "Active goal #{}: {} ({} sprints)",
                    progress.goal.id, progress.goal.title, target
                );
            }
            None => println!("No active goal. Start one with `sp goal new <title>`."),
        }
        Ok(())
    }

    fn goals(&self) -> Result<()> {
        let goals = self.store.goals_with_sprint_counts()?;
        if goals.is_empty() {
            println!("No goals yet.");
            return Ok(());
        }
        for (goal, sprint_count) in goals {
            println!(
                "#{:<4} {:<9} {:>3} sprints  {}",
                goal.id,
                goal.status.as_str(),
                sprint_count,
                goal.title
            );
        }
        Ok(())
    }

    fn history(&self, options: HistoryOptions) -> Result<()> {
        let items = if options.from_ms.is_some() || options.to_ms.is_some() {
            self.store.history_between(
                options.from_ms.unwrap_or(0),
                options.to_ms.unwrap_or(i64::MAX),
            )?
        } else {
            self.store.history()?
        };

        if items.is_empty() {
            println!("No sprints recorded.");
            return Ok(());
        }
        for item in items {
            println!(
                "{}  {:>5}s  [{}]  {}",
                format_timestamp(item.record.created_at),
                item.record.actual_duration_secs,
                item.goal_title.as_deref().unwrap_or("-"),
                item.record.task_content
            );
        }
        Ok(())
    }

    async fn sync_push(&self, background: bool) -> Result<()> {
        if !self.auth.is_authenticated() {
            println!("Not signed in; nothing to push.");
            return Ok(());
        }

        if background {
            if self.scheduler.schedule_push() {
                println!("Push scheduled; waiting for connectivity...");
            } else {
                println!("A push is already scheduled.");
            }
            self.scheduler.wait_idle().await;
        } else {
            self.engine.push().await?;
            println!("Pushed local data to {}.", self.scope_path());
        }
        Ok(())
    }

    async fn sync_pull(&self) -> Result<()> {
        if !self.auth.is_authenticated() {
            println!("Not signed in; nothing to pull.");
            return Ok(());
        }
        self.engine.pull().await?;
        println!("Restored data from {}.", self.scope_path());
        Ok(())
    }

    async fn login(&self, options: LoginOptions) -> Result<()> {
        // Best-effort checkpoint of the anonymous data before the identity
        // changes under it.
        if let Err(e) = self.vault.capture().await {
            eprintln!("Warning: could not capture a local snapshot ({}).", e);
        }

        self.auth.sign_in(&options.user)?;
        println!("Signed in as {}.", options.user);

        let decision = if options.restore {
            SyncDecision::Restore
        } else if options.backup {
            SyncDecision::Backup
        } else if options.later {
            SyncDecision::Later
        } else {
            prompt_sync_decision()?
        };

        let outcome = match decision {
            SyncDecision::Restore => self
                .engine
                .pull()
                .await
                .map(|_| "Restored data from the cloud."),
            SyncDecision::Backup => self
                .engine
                .push()
                .await
                .map(|_| "Backed up local data to the cloud."),
            SyncDecision::Later => Ok("Keeping local data; sync later with `sp sync push`."),
        };

        match outcome {
            Ok(message) => {
                println!("{}", message);
                if let Err(e) = self.vault.clear() {
                    eprintln!("Warning: could not remove the pre-login snapshot ({}).", e);
                }
            }
            // The snapshot stays around so a later sign-out can still roll
            // back to the pre-login state.
            Err(e) => eprintln!("Warning: sync failed ({}); pre-login snapshot kept.", e),
        }
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.auth.sign_out()?;
        if let Err(e) = self.vault.restore().await {
            eprintln!("Warning: could not restore the pre-login snapshot ({}).", e);
        }
        if let Err(e) = self.vault.clear() {
            eprintln!("Warning: could not remove the pre-login snapshot ({}).", e);
        }
        println!("Signed out.");
        Ok(())
    }

    fn whoami(&self) -> Result<()> {
        match self.auth.current_user_id() {
            Some(user_id) => println!("Signed in as {} (sync scope {}).", user_id, self.scope_path()),
            None => println!("Not signed in (sync scope {}).", self.scope_path()),
        }
        Ok(())
    }

    async fn push_best_effort(&self) {
        if !self.auth.is_authenticated() {
            return;
        }
        if let Err(e) = self.engine.push().await {
            eprintln!("Warning: sync push failed ({}); data kept locally.", e);
        }
    }

    fn scope_path(&self) -> String {
        ScopeResolver::new(self.auth.clone()).resolve().path()
    }
}

/// Prompt the user interactively for the post-sign-in sync decision.
fn prompt_sync_decision() -> Result<SyncDecision> {
    print!("Restore from cloud, back up local data, or decide later? [r/b/L]: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => {
            // EOF reached (non-interactive environment)
            Err(anyhow::anyhow!(
                "Error: Non-interactive environment, use --restore, --backup or --later."
            ))
        }
        Ok(_) => {
            let answer = input.trim().to_lowercase();
            Ok(if answer.starts_with('r') {
                SyncDecision::Restore
            } else if answer.starts_with('b') {
                SyncDecision::Backup
            } else {
                SyncDecision::Later
            })
        }
        Err(e) => Err(anyhow::anyhow!("Failed to read input: {}", e)),
    }
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}
