//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Rigging - a recipe-driven build orchestrator for CMake projects
#[derive(Parser)]
#[command(name = "rigging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to Rigging.toml (defaults to searching upward from cwd)
    #[arg(long, global = true, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    /// Override a setting, e.g. `-s build_type=Debug` (repeatable)
    #[arg(short = 's', long = "setting", global = true, value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the version resolved from the recipe's version file
    Version,

    /// Show the planned build directories
    Layout(LayoutArgs),

    /// Write the toolchain and dependency files
    Generate,

    /// Generate, configure and build
    Build(BuildArgs),

    /// Remove build output
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Print the layout as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Remove all build types, not just the current settings
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
