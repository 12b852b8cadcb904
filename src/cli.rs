use crate::report::{self, Scope};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repotally")]
#[command(about = "Per-author and per-file Git contribution statistics")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Branch treated as the main line of development", default_value = "main")]
    pub main_branch: String,

    #[arg(long, help = "Skip 'git fetch --all' before reading history")]
    pub no_fetch: bool,

    #[arg(long, help = "Lookahead depth when searching for source directories", default_value_t = 1)]
    pub src_depth: u32,

    #[arg(long, help = "JSON file mapping raw author names to display names")]
    pub aliases: Option<PathBuf>,

    #[arg(long, help = "Name of the combined entry when several repositories are given", default_value = "All Projects")]
    pub combined_name: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full report: author tables and file tables
    Report {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(help = "Repository working trees to analyze")]
        paths: Vec<PathBuf>,
    },
    /// Per-author tables only
    Authors {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(help = "Repository working trees to analyze")]
        paths: Vec<PathBuf>,
    },
    /// Per-file tables only
    Files {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(help = "Repository working trees to analyze")]
        paths: Vec<PathBuf>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report { json, ndjson, paths } => {
                report::exec(self.common, Scope::Full, json, ndjson, paths)
            }
            Commands::Authors { json, ndjson, paths } => {
                report::exec(self.common, Scope::Authors, json, ndjson, paths)
            }
            Commands::Files { json, ndjson, paths } => {
                report::exec(self.common, Scope::Files, json, ndjson, paths)
            }
        }
    }
}
