use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stevedore",
    about = "Migrate a deployment between hosts via selective export/import."
)]
pub struct Cli {
    /// Print debug diagnostics on stderr
    #[arg(long, global = true)]
    pub debug: bool,
    /// Alternate settings file
    #[arg(long, global = true, value_name = "path")]
    pub settings: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export selected components into a new backup directory
    Export(ExportArgs),
    /// Import selected components from an existing backup directory
    Import(ImportArgs),
}

/// One flag per migratable component. No flags selects all of them.
#[derive(Args)]
pub struct ComponentFlags {
    /// Installed extensions
    #[arg(short = 'a', long)]
    pub apps: bool,
    /// Relational database
    #[arg(short = 'b', long)]
    pub database: bool,
    /// Application config file
    #[arg(short = 'c', long)]
    pub config: bool,
    /// Bulk file data
    #[arg(short = 'd', long)]
    pub data: bool,
    /// Per-user encryption keys
    #[arg(short = 'e', long)]
    pub keys: bool,
    /// TLS certificates
    #[arg(short = 'f', long)]
    pub certs: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub components: ComponentFlags,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub components: ComponentFlags,
    /// Backup directory produced by a previous export
    #[arg(value_name = "backup-dir")]
    pub backup_dir: PathBuf,
}
