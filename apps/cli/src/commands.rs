//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use docauditor_client::AuditClient;
use docauditor_core::AuditSession;
use docauditor_session::SessionStore;
use docauditor_shared::{
    AppConfig, AuditError, config_dir, init_config, load_config, scenario_catalog,
};

use crate::render;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DocAuditor — detect contradictions between docs and changelogs.
#[derive(Parser)]
#[command(
    name = "docauditor",
    version,
    about = "Audit documentation against changelogs and ask questions about the knowledge base.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Backend base URL (overrides the config file).
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the built-in demo scenarios.
    Scenarios,

    /// Ingest the global knowledge base (non-scenario mode).
    Ingest,

    /// Load a demo scenario server-side.
    Load {
        /// Scenario id (see `docauditor scenarios`).
        scenario: String,
    },

    /// Run the audit agent and render its findings.
    Audit {
        /// Load this scenario first, then audit it.
        #[arg(short, long)]
        scenario: Option<String>,
    },

    /// Ask a free-form question about the loaded documents.
    Ask {
        /// The question to send.
        message: String,
    },

    /// Print the persistent session identifier.
    Session,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docauditor=info",
        1 => "docauditor=debug",
        _ => "docauditor=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scenarios => cmd_scenarios(),
        Command::Ingest => cmd_ingest(cli.server.as_deref()).await,
        Command::Load { scenario } => cmd_load(cli.server.as_deref(), &scenario).await,
        Command::Audit { scenario } => {
            cmd_audit(cli.server.as_deref(), scenario.as_deref()).await
        }
        Command::Ask { message } => cmd_ask(cli.server.as_deref(), &message).await,
        Command::Session => cmd_session(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Session construction
// ---------------------------------------------------------------------------

/// Load config and apply the `--server` override.
fn resolve_config(server_override: Option<&str>) -> Result<AppConfig> {
    let mut config = load_config()?;
    if let Some(server) = server_override {
        config.server.base_url = server.to_string();
    }
    Ok(config)
}

/// Directory where the session identifier is persisted.
fn session_state_dir(config: &AppConfig) -> Result<PathBuf> {
    if config.session.state_dir.is_empty() {
        Ok(config_dir()?)
    } else {
        Ok(PathBuf::from(&config.session.state_dir))
    }
}

/// Build an orchestrator session from config: persistent session id,
/// HTTP client, fresh workflow state.
fn build_session(config: &AppConfig) -> Result<AuditSession> {
    let base_url = Url::parse(&config.server.base_url)
        .map_err(|e| eyre!("invalid server URL '{}': {e}", config.server.base_url))?;

    let store = SessionStore::in_dir(session_state_dir(config)?);
    let session_id = store.get_or_create();

    let client = AuditClient::new(base_url, session_id, config.server.timeout_secs)
        .map_err(|e| eyre!(render::user_message(&e)))?;

    Ok(AuditSession::new(client))
}

/// Spinner shown while a network call is in flight.
fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(msg.to_string());
    spinner
}

/// Convert an operation failure into a user-facing CLI error.
fn surface(e: AuditError) -> color_eyre::eyre::Report {
    eyre!(render::user_message(&e))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_scenarios() -> Result<()> {
    println!();
    println!("  Available scenarios:");
    println!();
    for scenario in scenario_catalog() {
        println!("  {:<16} {}", scenario.id, scenario.name);
    }
    println!();
    Ok(())
}

async fn cmd_ingest(server: Option<&str>) -> Result<()> {
    let config = resolve_config(server)?;
    let mut session = build_session(&config)?;

    info!("ingesting knowledge base");
    let progress = spinner("Ingesting documents...");
    let result = session.ingest().await;
    progress.finish_and_clear();

    result.map_err(surface)?;
    println!("Documents ingested. The knowledge base is ready for queries.");
    Ok(())
}

async fn cmd_load(server: Option<&str>, scenario: &str) -> Result<()> {
    let config = resolve_config(server)?;
    let mut session = build_session(&config)?;

    info!(scenario, "loading scenario");
    let progress = spinner("Loading scenario...");
    let result = session.select_and_load(scenario).await;
    progress.finish_and_clear();

    result.map_err(surface)?;
    println!("Scenario '{scenario}' loaded. Run `docauditor audit` to scan it.");
    Ok(())
}

async fn cmd_audit(server: Option<&str>, scenario: Option<&str>) -> Result<()> {
    let config = resolve_config(server)?;
    let mut session = build_session(&config)?;

    if let Some(scenario) = scenario {
        info!(scenario, "loading scenario before audit");
        let progress = spinner("Loading scenario...");
        let result = session.select_and_load(scenario).await;
        progress.finish_and_clear();
        result.map_err(surface)?;
    }

    info!("running audit");
    let progress = spinner("Auditing documents...");
    let result = session.run_audit().await;
    progress.finish_and_clear();

    let report = result.map_err(surface)?;
    render::render_audit(session.state(), &report);
    Ok(())
}

async fn cmd_ask(server: Option<&str>, message: &str) -> Result<()> {
    let config = resolve_config(server)?;
    let mut session = build_session(&config)?;

    let progress = spinner("Analyzing documents...");
    let result = session.ask(message).await;
    progress.finish_and_clear();

    let sent = result.map_err(surface)?;
    if !sent {
        println!("Please enter a question before submitting.");
        return Ok(());
    }

    println!();
    println!("{}", session.state().last_answer);
    println!();
    Ok(())
}

fn cmd_session() -> Result<()> {
    let config = resolve_config(None)?;
    let store = SessionStore::in_dir(session_state_dir(&config)?);
    println!("{}", store.get_or_create());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
