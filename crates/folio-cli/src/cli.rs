use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio — documentation assets with reviewable proposals",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Settings file (TOML)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a proposed version of an asset against the current one
    Diff(DiffArgs),
    /// Print the breadcrumb trail of a page
    Ancestors(AncestorsArgs),
    /// Render an asset directory as a tree
    Tree(TreeArgs),
    /// Check a page tree for integrity errors
    CheckTree(CheckTreeArgs),
    /// Add an entry to an array in a JSON config file, once
    ConfigAppend(ConfigAppendArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub current: PathBuf,
    pub proposed: PathBuf,
    /// Print the merged document with <diff> wrappers
    #[arg(long)]
    pub markup: bool,
    /// Show word-level changes inside replaced blocks
    #[arg(long)]
    pub words: bool,
}

#[derive(Args)]
pub struct AncestorsArgs {
    /// Page tree as JSON (`{"id": {"title": …, "children": […]}}`)
    pub tree: PathBuf,
    pub page: String,
}

#[derive(Args)]
pub struct TreeArgs {
    #[arg(default_value = ".")]
    pub dir: PathBuf,
    /// Include hidden files and directories
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CheckTreeArgs {
    pub tree: PathBuf,
}

#[derive(Args)]
pub struct ConfigAppendArgs {
    /// Directory of the config file, relative to --root
    pub folder: PathBuf,
    pub file: String,
    /// Dot path of the target array
    pub path: String,
    /// Value to append; parsed as JSON when possible, else taken as a string
    pub value: String,
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Document to start from when the file does not exist
    #[arg(long, default_value = "{}")]
    pub default: String,
    /// Print the result without writing
    #[arg(long)]
    pub dry_run: bool,
}
