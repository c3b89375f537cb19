use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "task_swarm")]
#[command(about = "Run a command over files matched by glob patterns, spread across worker processes")]
#[command(version)]
pub struct Cli {
    /// Number of worker processes (defaults to the number of CPUs, capped at the item count)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Suppress progress logs and worker stderr
    #[arg(short, long)]
    pub silent: bool,

    /// JSON file with run options (`concurrency`, `silent`)
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Comma-separated files passed to the command together as one item
    #[arg(short, long = "group", value_name = "FILES")]
    pub groups: Vec<String>,

    /// Glob patterns to expand; prefix with `!` to exclude
    #[arg(required = false)]
    pub patterns: Vec<String>,

    /// Command run for each item; the item's paths are appended as arguments
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<OsString>,
}

impl Cli {
    /// `--group` occurrences split into their file lists
    pub fn group_lists(&self) -> Vec<Vec<String>> {
        self.groups
            .iter()
            .map(|group| {
                group
                    .split(',')
                    .map(str::trim)
                    .filter(|path| !path.is_empty())
                    .map(String::from)
                    .collect()
            })
            .collect()
    }
}
