#![allow(dead_code)]

use crate::areas::repository::Repository;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod areas;
mod artifacts;
mod commands;

#[derive(Parser)]
#[command(
    name = "jit",
    version = "0.1.0",
    about = "A snapshot-based version control system",
    long_about = "jit tracks the state of a working directory across time via \
    content-addressed immutable snapshots organised into a commit graph, \
    with named branches and a single HEAD position.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Stage files or directories")]
    Add {
        #[arg(index = 1, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(name = "commit", about = "Record the staged snapshot")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "branch",
        about = "List branches, or create one at the current position"
    )]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
    },
    #[command(name = "checkout", about = "Switch to a branch or commit")]
    Checkout {
        #[arg(
            short = 'b',
            long = "branch",
            help = "Create the branch before switching to it"
        )]
        new_branch: Option<String>,
        #[arg(index = 1, help = "Branch name or commit checksum")]
        target: Option<String>,
    },
    #[command(name = "log", about = "Print history from HEAD")]
    Log,
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
    #[command(
        name = "diff",
        about = "Diff the working tree, or two branches as branchA..branchB"
    )]
    Diff {
        #[arg(index = 1, help = "Optional branchA..branchB range")]
        range: Option<String>,
    },
    #[command(name = "clone", about = "Copy a local repository")]
    Clone {
        #[arg(index = 1, help = "Path of the repository to clone")]
        repository: String,
        #[arg(index = 2, help = "Target directory (defaults to the repository name)")]
        target: Option<String>,
        #[arg(short, long, help = "Clone only this branch")]
        branch: Option<String>,
        #[arg(short, long, help = "Limit a branch clone to the N most recent commits")]
        depth: Option<usize>,
    },
}

fn open_repository(path: Option<&str>) -> Result<Repository> {
    let path = match path {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    Repository::new(path, Box::new(std::io::stdout()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => {
            let mut repository = open_repository(path.as_deref())?;
            repository.init().await?
        }
        Commands::Add { paths } => {
            let mut repository = open_repository(None)?;
            repository.add(paths).await?
        }
        Commands::Status => {
            let mut repository = open_repository(None)?;
            repository.status().await?
        }
        Commands::Commit { message } => {
            let mut repository = open_repository(None)?;
            repository.commit(message).await?
        }
        Commands::Branch { name } => {
            let mut repository = open_repository(None)?;
            match name {
                Some(name) => repository.create_branch(name).await?,
                None => repository.list_branches().await?,
            }
        }
        Commands::Checkout { new_branch, target } => {
            let mut repository = open_repository(None)?;
            match (new_branch, target) {
                (Some(name), _) => repository.create_branch(name).await?,
                (None, Some(target)) => repository.checkout(target).await?,
                (None, None) => anyhow::bail!("checkout requires a target or -b <name>"),
            }
        }
        Commands::Log => {
            let mut repository = open_repository(None)?;
            repository.log().await?
        }
        Commands::Merge { branch } => {
            let mut repository = open_repository(None)?;
            repository.merge(branch).await?
        }
        Commands::Diff { range } => {
            let mut repository = open_repository(None)?;
            repository.diff(range.as_deref()).await?
        }
        Commands::Clone {
            repository,
            target,
            branch,
            depth,
        } => {
            let source = PathBuf::from(repository);
            let target = match target {
                Some(target) => PathBuf::from(target),
                None => source
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("clone")),
            };

            let mut target_repository =
                Repository::new(target, Box::new(std::io::stdout()))?;
            match branch {
                Some(branch) => {
                    target_repository
                        .clone_branch_from(branch, &source, *depth)
                        .await?
                }
                None => target_repository.clone_from(&source).await?,
            }
        }
    }

    Ok(())
}
