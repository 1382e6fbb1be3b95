//! Ludosafe CLI - Command line interface for encrypted backups.
//!
//! The backup core deliberately has no file I/O; this tool supplies it.
//! Snapshots go in as JSON files, backup records come out as JSON files,
//! and differential chains are passed explicitly with repeated
//! `--previous` arguments, oldest first.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ludosafe_backup::{BackupConfig, BackupEngine, BackupRecord};
use ludosafe_crypto::{CipherSuite, KdfParams};

#[derive(Parser)]
#[command(name = "ludosafe")]
#[command(about = "Ludosafe - Encrypted differential backups for JSON snapshots")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a backup record from a JSON snapshot file.
    Create {
        /// Snapshot file to back up (JSON).
        #[arg(short, long)]
        source: PathBuf,

        /// Output path for the backup record.
        #[arg(short, long)]
        output: PathBuf,

        /// Prior records of the chain, oldest first. When given, the newest
        /// one becomes the diff base and the result is differential.
        #[arg(short, long)]
        previous: Vec<PathBuf>,

        /// Cipher suite: "aes-256-cbc" or "xchacha20-poly1305".
        #[arg(short, long, default_value = "aes-256-cbc")]
        cipher: String,

        /// Use reduced KDF parameters (faster, weaker; not for long-lived
        /// backups).
        #[arg(long)]
        fast_kdf: bool,
    },

    /// Restore a snapshot from a backup record.
    Restore {
        /// Backup record to restore.
        #[arg(short, long)]
        backup: PathBuf,

        /// Prior records of the chain, oldest first. Required when the
        /// record is differential.
        #[arg(short, long)]
        previous: Vec<PathBuf>,

        /// Output path for the restored snapshot (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a backup record's metadata without decrypting it.
    Info {
        /// Backup record to inspect.
        #[arg(short, long)]
        backup: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Create {
            source,
            output,
            previous,
            cipher,
            fast_kdf,
        } => cmd_create(&source, &output, &previous, &cipher, fast_kdf).await,

        Commands::Restore {
            backup,
            previous,
            output,
        } => cmd_restore(&backup, &previous, output.as_deref()).await,

        Commands::Info { backup } => cmd_info(&backup),
    }
}

/// Prompt for a password securely.
fn prompt_password(prompt: &str) -> Result<String> {
    rpassword::prompt_password(prompt).context("Failed to read password")
}

/// Load a backup record from a JSON file.
fn load_record(path: &Path) -> Result<BackupRecord> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup record {}", path.display()))?;
    BackupRecord::from_json(&json)
        .with_context(|| format!("Invalid backup record {}", path.display()))
}

/// Load the predecessor chain, oldest first.
fn load_chain(paths: &[PathBuf]) -> Result<Vec<BackupRecord>> {
    paths.iter().map(|p| load_record(p)).collect()
}

/// Create a backup record.
async fn cmd_create(
    source: &Path,
    output: &Path,
    previous: &[PathBuf],
    cipher: &str,
    fast_kdf: bool,
) -> Result<()> {
    let suite = match cipher {
        "aes-256-cbc" => CipherSuite::Aes256Cbc,
        "xchacha20-poly1305" => CipherSuite::XChaCha20Poly1305,
        _ => {
            anyhow::bail!("Invalid cipher. Use: aes-256-cbc or xchacha20-poly1305");
        }
    };

    let kdf = if fast_kdf {
        KdfParams::fast()
    } else {
        KdfParams::standard()
    };

    let snapshot = fs::read_to_string(source)
        .with_context(|| format!("Failed to read snapshot {}", source.display()))?;
    let data: Value = serde_json::from_str(&snapshot)
        .with_context(|| format!("Snapshot {} is not valid JSON", source.display()))?;

    let chain = load_chain(previous)?;

    let password = prompt_password("Enter password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    info!("Creating backup of {}", source.display());

    let engine = BackupEngine::new(BackupConfig { kdf, cipher: suite });
    let record = engine
        .create_backup(data, password, chain)
        .await
        .context("Failed to create backup")?;

    fs::write(output, record.to_json()?)
        .with_context(|| format!("Failed to write backup record {}", output.display()))?;

    println!("Backup created: {}", output.display());
    println!("  Differential: {}", record.metadata.differential);
    println!("  Original size: {} bytes", record.metadata.original_size);
    println!("  Compressed size: {} bytes", record.metadata.compressed_size);

    Ok(())
}

/// Restore a snapshot from a backup record.
async fn cmd_restore(backup: &Path, previous: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let record = load_record(backup)?;
    let chain = load_chain(previous)?;

    if record.is_differential() && chain.is_empty() {
        anyhow::bail!(
            "{} is a differential backup; pass its chain with --previous, oldest first",
            backup.display()
        );
    }

    let password = prompt_password("Enter password: ")?;

    info!("Restoring backup {}", backup.display());

    let engine = BackupEngine::with_defaults();
    let data = engine
        .restore_backup(record, password, chain)
        .await
        .context("Failed to restore backup")?;

    let pretty = serde_json::to_string_pretty(&data)?;
    match output {
        Some(path) => {
            fs::write(path, pretty)
                .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
            println!("Snapshot restored: {}", path.display());
        }
        None => println!("{}", pretty),
    }

    Ok(())
}

/// Print a record's metadata.
fn cmd_info(backup: &Path) -> Result<()> {
    let record = load_record(backup)?;
    let meta = &record.metadata;

    let created = DateTime::from_timestamp_millis(meta.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("{} ms", meta.timestamp));

    println!("Backup record: {}", backup.display());
    println!("  Algorithm: {}", meta.algorithm);
    println!("  KDF: pbkdf2-{} x {}", meta.digest, meta.iterations);
    println!("  Differential: {}", meta.differential);
    println!("  Compressed: {}", meta.compressed);
    println!("  Created: {}", created);
    println!("  Original size: {} bytes", meta.original_size);
    println!("  Compressed size: {} bytes", meta.compressed_size);

    Ok(())
}
