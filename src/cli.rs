use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "nas-gallery")]
#[command(about = "Browse the photo folders of a NAS share and stage their images locally")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON) instead of the default ones
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the folders below a path on the share, with their image counts
    Folders(FoldersArgs),

    /// Stage the images of one folder locally and print their shooting dates
    Fetch(FetchArgs),

    /// Manage stored folder snapshots
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Which snapshot a command is about.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Folder to start from, relative to the configured base folder
    #[arg(long, default_value = "")]
    pub base: String,

    /// Levels to descend past the immediate subfolders (defaults to the
    /// configured depth)
    #[arg(long)]
    pub depth: Option<u32>,
}

#[derive(Debug, Args)]
pub struct FoldersArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Ignore any stored snapshot and crawl the share again
    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Folder to fetch, relative to the configured base folder
    pub folder: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Remove every stored snapshot
    Clear,

    /// Remove the stored snapshot for one query
    Invalidate(QueryArgs),
}
