// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::common::RfsContext;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "rfs")]
struct Cli {
    /// Host directory served as the remote root (overrides config and REMOTEFS_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// YAML client configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metadata for one path
    Stat {
        path: String,
        /// Print the entry as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Show permissions, ownership, size and modification time
        #[arg(short, long)]
        long: bool,
    },
    /// Write a remote file to stdout
    Cat { path: String },
    /// Copy a local file to the remote filesystem
    Put {
        local: PathBuf,
        remote: String,
        /// Local read size in bytes
        #[arg(long)]
        buffer_size: Option<usize>,
    },
    /// Copy a remote file to the local filesystem
    Get {
        remote: String,
        local: PathBuf,
        /// Remote read size in bytes
        #[arg(long)]
        buffer_size: Option<usize>,
    },
    /// Create a directory and any missing parents
    Mkdir { path: String },
    /// Remove a file or directory
    Rm {
        path: String,
        /// Remove non-empty directories
        #[arg(short, long)]
        recursive: bool,
        /// Skip the path safety checks
        #[arg(short, long)]
        force: bool,
    },
    /// Remove an empty directory
    Rmdir { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let ctx = RfsContext::new(cli.root, cli.config);

    match cli.command {
        Commands::Stat { path, json } => {
            commands::stat_command(&ctx, &path, json, |line| println!("{}", line)).await
        }
        Commands::Ls {
            path,
            recursive,
            long,
        } => commands::list_command(&ctx, &path, recursive, long, |line| println!("{}", line)).await,
        Commands::Cat { path } => {
            let mut stdout = tokio::io::stdout();
            commands::cat_command(&ctx, &path, &mut stdout).await.map(|_| ())
        }
        Commands::Put {
            local,
            remote,
            buffer_size,
        } => {
            let written = commands::put_command(&ctx, &local, &remote, buffer_size).await?;
            println!("{} bytes written to {}", written, remote);
            Ok(())
        }
        Commands::Get {
            remote,
            local,
            buffer_size,
        } => {
            let copied = commands::get_command(&ctx, &remote, &local, buffer_size).await?;
            println!("{} bytes copied to {}", copied, local.display());
            Ok(())
        }
        Commands::Mkdir { path } => commands::mkdir_command(&ctx, &path).await,
        Commands::Rm {
            path,
            recursive,
            force,
        } => commands::rm_command(&ctx, &path, recursive, force).await,
        Commands::Rmdir { path } => commands::rmdir_command(&ctx, &path).await,
    }
}
