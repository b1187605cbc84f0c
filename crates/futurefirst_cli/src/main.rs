//! Maintenance entry point for the FutureFirst local data store.
//!
//! # Responsibility
//! - Inspect namespaced keys and the users that own them.
//! - Run destructive resets out-of-band from the dashboard UI.

use clap::{Parser, Subcommand};
use futurefirst_core::{
    bulk_reset, core_version, init_logging, ConfigError, CoreConfig, Dashboard, LogTarget,
    SweepReport, UserId,
};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// FutureFirst local data maintenance.
///
/// Settings come from `FUTUREFIRST_*` environment variables; flags override
/// them.
#[derive(Parser)]
#[command(name = "futurefirst")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Key-value database file [env: FUTUREFIRST_DB_PATH].
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Account whose tagged records survive resets
    /// [env: FUTUREFIRST_PROTECTED_ACCOUNT].
    #[arg(long, global = true)]
    protected_account: Option<String>,

    /// Key fragment marking protected records
    /// [env: FUTUREFIRST_PROTECTED_TAG, default: raffle].
    #[arg(long, global = true)]
    protected_tag: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    /// [env: FUTUREFIRST_LOG_DIR].
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error [env: FUTUREFIRST_LOG_LEVEL].
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List user ids that own at least one record.
    Users,

    /// List namespaced keys.
    Keys {
        /// Only keys owned by this user.
        #[arg(long)]
        user: Option<String>,
    },

    /// Delete every user record except protected-account tagged ones.
    Reset {
        /// Report what would be removed without deleting.
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete one user's records.
    ClearUser {
        user: String,

        /// Email of the user; the protected account keeps tagged records.
        #[arg(long)]
        email: Option<String>,
    },

    /// Print the core version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match resolve_config(&cli, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let target = config
        .log_dir
        .clone()
        .map_or(LogTarget::Stderr, LogTarget::Dir);
    if let Err(err) = init_logging(&config.log_level, target) {
        eprintln!("logging disabled: {err}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Environment settings with command-line flags layered on top.
fn resolve_config(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<CoreConfig, ConfigError> {
    let mut config = CoreConfig::from_lookup(lookup)?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }
    config.override_protected_account(
        cli.protected_account.as_deref(),
        cli.protected_tag.as_deref(),
    )?;
    Ok(config)
}

fn run(command: Commands, config: &CoreConfig) -> Result<(), Box<dyn Error>> {
    if let Commands::Version = command {
        println!("futurefirst_core version={}", core_version());
        return Ok(());
    }

    let mut dashboard = Dashboard::open(config)?;
    match command {
        Commands::Users => {
            for user_id in dashboard.data().list_user_ids() {
                println!("{user_id}");
            }
        }
        Commands::Keys { user } => {
            let keys = match user {
                Some(raw) => dashboard.data().user_keys(&UserId::parse(raw)?)?,
                None => dashboard.data().namespaced_keys()?,
            };
            for key in keys {
                println!("{key}");
            }
        }
        Commands::Reset { dry_run } => {
            let report = bulk_reset(
                dashboard.data().backend(),
                config.protected_account.as_ref(),
                dry_run,
            )?;
            print_report(if dry_run { "would remove" } else { "removed" }, &report);
        }
        Commands::ClearUser { user, email } => {
            let report = dashboard.reset_user(&UserId::parse(user)?, email.as_deref());
            print_report("removed", &report);
        }
        Commands::Version => {}
    }
    Ok(())
}

fn print_report(removed_label: &str, report: &SweepReport) {
    for key in &report.preserved {
        println!("preserved {key}");
    }
    for key in &report.failed {
        println!("failed {key}");
    }
    println!(
        "{removed_label}={} preserved={} failed={}",
        report.removed_count(),
        report.preserved_count(),
        report.failed_count()
    );
}
