//! `vaultsync` CLI: sync secrets between the remote vault, a local JSON
//! cache, and `.env` files.
//!
//! Conversion commands run fully offline. Vault commands build a
//! [`SecretManager`] from the global connection options, which fall back to
//! the `BW_*` environment variables.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vaultsync_core::cache::{DEFAULT_CACHE_FILE, LocalCache};
use vaultsync_core::convert::{self, DEFAULT_ENV_FILE};
use vaultsync_core::error::ManagerError;
use vaultsync_core::gateway::GatewayConfig;
use vaultsync_core::manager::SecretManager;

/// Default input of `push-secrets`. Never the sync cache.
const DEFAULT_PUSH_FILE: &str = "data/formatted.json";

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// vaultsync: keep a remote vault, a local cache, and .env files in sync.
#[derive(Parser)]
#[command(
    name = "vaultsync",
    version,
    about = "vaultsync CLI: sync vault secrets to a local cache and convert between JSON and .env",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         BW_ACCESS_TOKEN   Vault access token\n  \
         ORGANIZATION_ID   Organization UUID\n  \
         BW_PROJECT_ID     Project UUID\n\n\
         {DIM}Examples:{RESET}\n  \
         vaultsync sync-secrets\n  \
         vaultsync convert-to-env\n  \
         vaultsync convert-to-json-formatted --project myapp --env dev --env-file .env"
    ),
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug logging on stderr.
    #[arg(long, short, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Remote vault connection. Only validated by commands that need it.
#[derive(Args)]
struct ConnectionArgs {
    /// Vault access token.
    #[arg(long, env = "BW_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    /// Organization UUID.
    #[arg(long, env = "ORGANIZATION_ID", global = true)]
    organization_id: Option<String>,

    /// Project UUID new secrets are created in.
    #[arg(long, env = "BW_PROJECT_ID", global = true)]
    project_id: Option<String>,

    /// Vault API base URL.
    #[arg(long, env = "BW_API_URL", global = true)]
    api_url: Option<String>,

    /// Vault identity base URL.
    #[arg(long, env = "BW_IDENTITY_URL", global = true)]
    identity_url: Option<String>,
}

impl ConnectionArgs {
    fn gateway_config(&self) -> Result<GatewayConfig> {
        let mut config = GatewayConfig::new(
            self.access_token.clone().unwrap_or_default(),
            self.organization_id.as_deref().unwrap_or_default(),
            self.project_id.as_deref().unwrap_or_default(),
        )?;
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url);
        }
        if let Some(url) = &self.identity_url {
            config = config.with_identity_url(url);
        }
        Ok(config)
    }

    fn manager(&self, cache_file: &Path) -> Result<SecretManager> {
        let config = self.gateway_config()?;
        Ok(SecretManager::connect(&config, LocalCache::open(cache_file))?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one secret from the vault by key.
    #[command(name = "get-secret")]
    GetSecret {
        /// Secret key.
        name: String,
    },
    /// Create a secret in the vault.
    #[command(name = "create-secret")]
    CreateSecret {
        /// Secret key.
        name: String,
        /// Secret value.
        value: String,
        /// Free-form note.
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Fetch every vault secret and overwrite the local cache.
    #[command(name = "sync-secrets")]
    SyncSecrets {
        /// Local cache file.
        #[arg(long, default_value = DEFAULT_CACHE_FILE)]
        json_file: PathBuf,
    },
    /// List every vault secret with its note.
    #[command(name = "list-secrets")]
    ListSecrets,
    /// List secrets from the local cache, without contacting the vault.
    #[command(name = "local-secrets")]
    LocalSecrets {
        /// Local cache file.
        #[arg(long, default_value = DEFAULT_CACHE_FILE)]
        json_file: PathBuf,
    },
    /// Create every record of a JSON record file in the vault.
    #[command(name = "push-secrets")]
    PushSecrets {
        /// JSON record file, e.g. the output of convert-to-json-formatted.
        #[arg(long, default_value = DEFAULT_PUSH_FILE)]
        json_file: PathBuf,
    },
    /// Export a JSON record file as a .env file.
    #[command(name = "convert-to-env")]
    ConvertToEnv {
        #[command(flatten)]
        files: FileArgs,
    },
    /// Import an exported .env file back into a JSON record file.
    #[command(name = "convert-to-json")]
    ConvertToJson {
        #[command(flatten)]
        files: FileArgs,
    },
    /// Import a project's .env file as namespaced PROJECT/ENV/VAR records.
    #[command(name = "convert-to-json-formatted")]
    ConvertToJsonFormatted {
        #[command(flatten)]
        files: FileArgs,
        /// Project name, uppercased into the key.
        #[arg(long)]
        project: String,
        /// Environment name, uppercased into the key.
        #[arg(long)]
        env: String,
    },
}

#[derive(Args)]
struct FileArgs {
    /// JSON record file.
    #[arg(long, default_value = DEFAULT_CACHE_FILE)]
    json_file: PathBuf,
    /// .env file.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

fn print_note(note: &str) {
    for line in note.lines() {
        println!("  {CYAN}│{RESET} {DIM}{line}{RESET}");
    }
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli.connection, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(connection: &ConnectionArgs, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::GetSecret { name } => {
            cmd_get_secret(&connection.manager(Path::new(DEFAULT_CACHE_FILE))?, &name).await
        }
        Commands::CreateSecret { name, value, note } => {
            let manager = connection.manager(Path::new(DEFAULT_CACHE_FILE))?;
            cmd_create_secret(&manager, &name, &value, &note).await
        }
        Commands::SyncSecrets { json_file } => {
            cmd_sync_secrets(&connection.manager(&json_file)?).await
        }
        Commands::ListSecrets => {
            cmd_list_secrets(&connection.manager(Path::new(DEFAULT_CACHE_FILE))?).await
        }
        Commands::LocalSecrets { json_file } => cmd_local_secrets(&json_file).await,
        Commands::PushSecrets { json_file } => {
            let manager = connection.manager(Path::new(DEFAULT_CACHE_FILE))?;
            cmd_push_secrets(&manager, &json_file).await
        }
        Commands::ConvertToEnv { files } => cmd_convert_to_env(&files).await,
        Commands::ConvertToJson { files } => cmd_convert_to_json(&files).await,
        Commands::ConvertToJsonFormatted {
            files,
            project,
            env,
        } => cmd_convert_to_json_formatted(&files, &project, &env).await,
    }
}

// ── Vault commands ───────────────────────────────────────────────────

async fn cmd_get_secret(manager: &SecretManager, name: &str) -> Result<()> {
    let record = match manager.get_secret(name).await {
        Ok(record) => record,
        Err(ManagerError::NotFound { .. }) => bail!("secret '{name}' not found"),
        Err(e) => return Err(e).context("failed to fetch secret"),
    };

    println!();
    header("🔑", &format!("Secret: {}", record.key));
    kv_line("ID", &record.id);
    kv_line("Value", &record.value);
    if !record.note.is_empty() {
        kv_line("Note", "");
        print_note(&record.note);
    }
    println!();
    Ok(())
}

async fn cmd_create_secret(
    manager: &SecretManager,
    name: &str,
    value: &str,
    note: &str,
) -> Result<()> {
    let created = manager
        .create_secret(name, value, note)
        .await
        .with_context(|| format!("failed to create secret '{name}'"))?;
    success(&format!(
        "Created {BOLD}{}{RESET} {DIM}({}){RESET}",
        created.key, created.id
    ));
    Ok(())
}

async fn cmd_sync_secrets(manager: &SecretManager) -> Result<()> {
    let count = manager
        .sync_to_cache()
        .await
        .context("failed to sync secrets")?;
    success(&format!(
        "Synced {BOLD}{count}{RESET} secrets to {BOLD}{}{RESET}",
        manager.cache().location()
    ));
    Ok(())
}

async fn cmd_list_secrets(manager: &SecretManager) -> Result<()> {
    let records = manager
        .list_secrets()
        .await
        .context("failed to list secrets")?;

    println!();
    header("📂", &format!("Vault secrets ({})", records.len()));
    if records.is_empty() {
        println!("  {DIM}(empty){RESET}");
    }
    for record in &records {
        println!("  {CYAN}├─{RESET} {}", record.key);
        print_note(&record.note);
    }
    println!();
    Ok(())
}

async fn cmd_local_secrets(json_file: &Path) -> Result<()> {
    let index = LocalCache::open(json_file)
        .load()
        .await
        .context("failed to load local cache")?;

    println!();
    header("💾", &format!("Local secrets ({})", index.len()));
    if index.is_empty() {
        println!("  {DIM}(empty){RESET}");
    }
    for (key, record) in index.iter() {
        println!("  {CYAN}├─{RESET} {key}");
        print_note(&record.note);
    }
    println!();
    Ok(())
}

async fn cmd_push_secrets(manager: &SecretManager, json_file: &Path) -> Result<()> {
    let Some(records) = convert::read_json_file(json_file).await? else {
        bail!("file not found: {}", json_file.display());
    };
    if records.is_empty() {
        warning(&format!("no records in {}", json_file.display()));
        return Ok(());
    }

    let created = manager
        .create_many(&records)
        .await
        .context("failed to push secrets")?;
    for record in &created {
        println!("  {GREEN}✓{RESET} {}", record.key);
    }
    println!();
    success(&format!("Pushed {BOLD}{}{RESET} secrets to the vault", created.len()));
    Ok(())
}

// ── Conversion commands ──────────────────────────────────────────────

async fn cmd_convert_to_env(files: &FileArgs) -> Result<()> {
    let count = convert::convert_json_to_env(&files.json_file, &files.env_file).await?;
    report_conversion(count, &files.json_file, &files.env_file);
    Ok(())
}

async fn cmd_convert_to_json(files: &FileArgs) -> Result<()> {
    let count = convert::convert_env_to_json(&files.env_file, &files.json_file).await?;
    report_conversion(count, &files.env_file, &files.json_file);
    Ok(())
}

async fn cmd_convert_to_json_formatted(files: &FileArgs, project: &str, env: &str) -> Result<()> {
    let count =
        convert::convert_env_to_json_namespaced(&files.env_file, &files.json_file, project, env)
            .await?;
    report_conversion(count, &files.env_file, &files.json_file);
    Ok(())
}

/// A missing source converts nothing and is not an error.
fn report_conversion(count: Option<usize>, source: &Path, target: &Path) {
    let Some(count) = count else {
        warning(&format!("{} not found, nothing converted", source.display()));
        return;
    };
    success(&format!(
        "Converted {BOLD}{count}{RESET} secrets from {} to {BOLD}{}{RESET}",
        source.display(),
        target.display()
    ));
}
