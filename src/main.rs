//! rclone-nav: config inspection CLI
//!
//! Drives the navigation engine against a config file from a shell, without
//! a bot transport: list remotes, resolve provider kinds, list directories
//! and probe paths. Handy for checking what a user's menus will show.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rclone_nav::rclone::{list_dir, path_exists, ListOptions, ProviderKind, Rclone, RemoteConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let config = RemoteConfig::read(&cli.config)
        .with_context(|| format!("Failed to read config: {:?}", cli.config))?;

    match cli.command {
        Command::Remotes => {
            for section in config.sections() {
                let marker = if section.is_crypt() { " (crypt)" } else { "" };
                println!("{} [{}]{}", section.name, section.remote_type, marker);
            }
        }
        Command::Resolve { remote } => {
            let kind = config.provider_kind(&remote)?;
            match kind {
                ProviderKind::Drive => println!("{remote}: Google Drive"),
                ProviderKind::Other => println!("{remote}: other provider"),
            }
        }
        Command::Ls {
            remote,
            path,
            fast,
        } => {
            let rclone = Rclone::new(&cli.rclone_exe).with_config(&cli.config);
            let options = if fast {
                ListOptions::fast()
            } else {
                ListOptions::default()
            };
            let entries = list_dir(&rclone, &remote, &path, options).await?;
            for entry in entries {
                let glyph = if entry.is_dir { "d" } else { "-" };
                println!("{glyph} {}", entry.name);
            }
        }
        Command::Exists { remote, path } => {
            let rclone = Rclone::new(&cli.rclone_exe).with_config(&cli.config);
            if path_exists(&rclone, &remote, &path).await? {
                println!("exists");
            } else {
                println!("not found");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// CLI arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect rclone configs the way bot menus see them")]
struct Cli {
    /// Path to the rclone config file
    #[arg(long, short)]
    config: PathBuf,

    /// Path to the rclone executable
    #[arg(long, default_value = "rclone")]
    rclone_exe: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured remotes in file order
    Remotes,
    /// Resolve a remote's provider kind, unwrapping crypt indirection
    Resolve { remote: String },
    /// List one directory of a remote
    Ls {
        remote: String,
        #[arg(default_value = "")]
        path: String,
        /// Use fast enumeration (--fast-list --no-modtime)
        #[arg(long)]
        fast: bool,
    },
    /// Probe whether a path exists (exit status reflects the answer)
    Exists {
        remote: String,
        #[arg(default_value = "")]
        path: String,
    },
}
