//! Tests for CLI argument parsing and the identity-transition choreography.

use sp_cli::app::App;
use sp_cli::{Cli, Commands, GoalCommands, LoginOptions, Parser, SyncCommands};
use tempfile::TempDir;

#[test]
fn test_parse_goal_new_with_target() {
    let cli = Cli::try_parse_from(["sp", "goal", "new", "Read a book", "--target", "4"]).unwrap();
    match cli.command {
        Commands::Goal {
            subcommand: GoalCommands::New { title, target },
        } => {
            assert_eq!(title, "Read a book");
            assert_eq!(target, Some(4));
        }
        _ => panic!("parsed into the wrong command"),
    }
}

#[test]
fn test_parse_sprint_defaults_target_seconds() {
    let cli = Cli::try_parse_from(["sp", "sprint", "Deep work", "--actual-secs", "900"]).unwrap();
    match cli.command {
        Commands::Sprint(options) => {
            assert_eq!(options.task, "Deep work");
            assert_eq!(options.target_secs, 1500);
            assert_eq!(options.actual_secs, 900);
        }
        _ => panic!("parsed into the wrong command"),
    }
}

#[test]
fn test_parse_sync_push_background_flag() {
    let cli = Cli::try_parse_from(["sp", "sync", "push", "--background"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Sync {
            subcommand: SyncCommands::Push { background: true }
        }
    ));
}

#[test]
fn test_login_decision_flags_are_mutually_exclusive() {
    assert!(Cli::try_parse_from(["sp", "login", "u1", "--restore", "--backup"]).is_err());
    assert!(Cli::try_parse_from(["sp", "login", "u1", "--backup", "--later"]).is_err());
    assert!(Cli::try_parse_from(["sp", "login", "u1", "--restore"]).is_ok());
}

fn new_goal(title: &str) -> Commands {
    Commands::Goal {
        subcommand: GoalCommands::New {
            title: title.into(),
            target: None,
        },
    }
}

fn login(decision: fn(&mut LoginOptions)) -> Commands {
    let mut options = LoginOptions {
        user: "u1".into(),
        restore: false,
        backup: false,
        later: false,
    };
    decision(&mut options);
    Commands::Login(options)
}

/// An explicit defer completes the sync decision, so the snapshot is deleted
/// and local data carries over the identity transition untouched.
#[tokio::test]
async fn test_login_later_clears_snapshot_and_keeps_local_data() {
    let dir = TempDir::new().unwrap();
    let app = App::new(Some(dir.path().to_path_buf()), "http://localhost:1").unwrap();

    app.run(new_goal("Before login")).await.unwrap();

    app.run(login(|o| o.later = true)).await.unwrap();
    assert!(
        !dir.path().join("pre_login_snapshot.json").exists(),
        "an explicit defer completes the decision and drops the snapshot"
    );
    assert!(dir.path().join("session.json").exists());

    app.run(new_goal("While signed in")).await.unwrap();
    app.run(Commands::Logout).await.unwrap();

    // Nothing to roll back to: both goals survive the sign-out.
    assert_eq!(app.store().all_goals().unwrap().len(), 2);
    assert!(!dir.path().join("session.json").exists());
}

/// When the post-sign-in sync fails, the snapshot is kept so a later
/// sign-out can still roll the store back to its pre-login state.
#[tokio::test]
async fn test_failed_backup_keeps_snapshot_for_logout_rollback() {
    let dir = TempDir::new().unwrap();
    // Nothing listens on port 1, so the backup push fails fast.
    let app = App::new(Some(dir.path().to_path_buf()), "http://localhost:1").unwrap();

    app.run(new_goal("Before login")).await.unwrap();

    app.run(login(|o| o.backup = true)).await.unwrap();
    assert!(
        dir.path().join("pre_login_snapshot.json").exists(),
        "a failed sync decision keeps the snapshot"
    );

    app.run(new_goal("While signed in")).await.unwrap();
    assert_eq!(app.store().all_goals().unwrap().len(), 2);

    app.run(Commands::Logout).await.unwrap();

    let goals = app.store().all_goals().unwrap();
    assert_eq!(goals.len(), 1, "sign-out rolls back to the pre-login state");
    assert_eq!(goals[0].title, "Before login");
    assert!(!dir.path().join("pre_login_snapshot.json").exists());
}
