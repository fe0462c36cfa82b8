mod commands;
mod config;
mod error;
mod picker;
mod profile;
mod resolve;
mod state;
mod switch;
mod tenants;
mod tui;
mod types;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use config::{LogLevel, Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "aztx",
    version,
    about = "Azure subscription context switcher",
    long_about = "\
Switch the default subscription in the Azure CLI profile with a fuzzy \
finder, and jump back to the previous one with `aztx -`.\n\
\n\
Run without arguments to pick a subscription interactively.\n\
\n\
The profile is read from ~/.azure/azureProfile.json (or \
$AZURE_CONFIG_DIR). The previous context is remembered in ~/.aztx.json.",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Subscription name or ID to switch to; `-` restores the previous one
    target: Option<String>,

    /// Select a tenant before choosing a subscription
    #[arg(long, env = "AZTX_BY_TENANT")]
    by_tenant: bool,

    /// Log level
    #[arg(long, value_enum, env = "AZTX_LOG_LEVEL", global = true)]
    log_level: Option<LogLevel>,

    /// Azure CLI profile to edit
    #[arg(long, env = "AZTX_PROFILE_FILE", global = true)]
    profile_file: Option<PathBuf>,

    /// File remembering the previous context
    #[arg(long, env = "AZTX_STATE_FILE", global = true)]
    state_file: Option<PathBuf>,

    /// Give up on a switch that has not committed after this many seconds
    #[arg(long, value_name = "SECONDS", env = "AZTX_TIMEOUT", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List subscriptions in the profile
    #[command(alias = "ls")]
    List,

    /// Show the active subscription and the previous one
    Current,

    /// Manage tenant display names
    #[command(subcommand)]
    Tenant(TenantCommands),

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum TenantCommands {
    /// List tenants derived from the subscriptions
    #[command(alias = "ls")]
    List,

    /// Give a tenant a custom display name
    Rename {
        /// Tenant ID (UUID)
        tenant_id: String,
        /// New display name
        name: String,
    },
}

fn main() {
    if let Err(e) = run() {
        if e
            .downcast_ref::<error::Error>()
            .is_some_and(error::Error::is_aborted)
        {
            return;
        }
        eprintln!("\n  {} {:#}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "aztx", &mut std::io::stdout());
        return Ok(());
    }

    let settings = Settings::resolve(Overrides {
        profile_file: cli.profile_file,
        state_file: cli.state_file,
        log_level: cli.log_level,
        timeout_secs: cli.timeout,
    })?;
    init_tracing(settings.log_level);

    match (cli.command, cli.target.as_deref()) {
        (Some(Commands::List), _) => commands::list(&settings),
        (Some(Commands::Current), _) => commands::current(&settings),
        (Some(Commands::Tenant(TenantCommands::List)), _) => commands::tenant_list(&settings),
        (Some(Commands::Tenant(TenantCommands::Rename { tenant_id, name })), _) => {
            commands::tenant_rename(&settings, &tenant_id, &name)
        }
        (Some(Commands::Completions { .. }), _) => Ok(()),
        (None, Some("-")) => commands::previous(&settings),
        (None, Some(target)) => commands::switch_to(&settings, target),
        (None, None) => commands::interactive(&settings, cli.by_tenant),
    }
}

fn init_tracing(level: LogLevel) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
