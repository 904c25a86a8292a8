//! treeform cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; treeform ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble a directory tree and print the finalized documents
    Build(BuildCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct BuildCommand {
    #[clap(flatten)]
    pub source: SourceArgs,

    #[clap(flatten)]
    pub data: DataArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct SourceArgs {
    /// Directory to assemble
    ///
    /// Its name becomes the root-level scope unless --relative is given.
    #[arg(default_value = ".")]
    pub source: PathBuf,

    /// Treat SOURCE as the tree root and assemble this path below it
    #[clap(short = 'r', long = "relative")]
    pub relative: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DataArgs {
    /// Load data bag entries from a json or yaml file
    ///
    /// Can be specified multiple times, later files win.
    #[clap(short = 'd', long = "data")]
    pub files: Vec<PathBuf>,

    /// Set a data bag entry (NAME=VALUE), wins over files
    #[clap(short = 'v', long = "var")]
    pub vars: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Raw documents before finalizing
    Documents(DevDocumentsCommand),
    /// Tokens derived for a relative path
    Scope(DevScopeCommand),
}

#[derive(Parser, Debug)]
pub struct DevDocumentsCommand {
    #[clap(flatten)]
    pub source: SourceArgs,

    #[clap(flatten)]
    pub data: DataArgs,
}

#[derive(Parser, Debug)]
pub struct DevScopeCommand {
    /// Relative path, e.g. orders/{id}
    pub relative: PathBuf,

    /// Suffix appended to every token
    #[clap(short = 's', long = "suffix", default_value = "")]
    pub suffix: String,
}
