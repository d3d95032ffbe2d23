use clap::{Args, Parser, Subcommand};
use lnkr_core::LinkKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lnkr",
    about = "Keep hard and symbolic links between a project and a remote directory",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update .lnkr.toml for the current directory
    Init(InitArgs),
    /// Register a path for linking
    Add(AddArgs),
    /// Create the links for every registered path
    Link(LinkArgs),
    /// Remove the links for every registered path from the local directory
    Unlink,
    /// Show the state of every registered link
    Status(StatusArgs),
    /// Forget a registered path and everything beneath it
    Remove(RemoveArgs),
    /// Delete .lnkr.toml and the lnkr block of the git exclude file
    Clean,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Remote directory (defaults to one derived from LNKR_REMOTE_ROOT)
    #[arg(short, long)]
    pub remote: Option<PathBuf>,
    /// Create the remote directory if it does not exist
    #[arg(long)]
    pub create_remote: bool,
    /// Git exclude file to maintain
    #[arg(long)]
    pub git_exclude_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Path relative to the local (or remote) directory
    pub path: PathBuf,
    /// Add every file under a directory as a hard link
    #[arg(short, long)]
    pub recursive: bool,
    /// Shorthand for --type symbolic
    #[arg(short, long, conflicts_with = "kind")]
    pub symbolic: bool,
    /// Link type: hard or symbolic
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_kind)]
    pub kind: Option<LinkKind>,
    /// Resolve the path against the remote directory
    #[arg(long)]
    pub from_remote: bool,
}

impl AddArgs {
    pub fn link_kind(&self) -> LinkKind {
        if self.symbolic {
            LinkKind::Symbolic
        } else {
            self.kind.unwrap_or_default()
        }
    }
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Link from the remote directory into the local one
    #[arg(long)]
    pub from_remote: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print rows as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub path: PathBuf,
}

fn parse_kind(value: &str) -> Result<LinkKind, String> {
    value.parse::<LinkKind>().map_err(|e| e.to_string())
}
