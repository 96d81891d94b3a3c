//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Suite-based test runner
#[derive(Parser, Debug)]
#[command(name = "suitecheck")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.0")]
#[command(about = "Run fixture-based test suites and benchmarks")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the selected tests or benchmarks
    Run(RunArgs),

    /// List the selected tests without running them
    List(ListArgs),

    /// Show recognised SUITECHECK_* environment variables
    Env,
}

/// Options shared by every command that selects tests
#[derive(ClapArgs, Debug)]
pub struct SelectArgs {
    /// Regular expression selecting suites and tests
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Select benchmarks instead of tests
    #[arg(short = 'b', long = "bench")]
    pub benchmark: bool,

    /// YAML or JSON configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Output format (summary, json, json-pretty)
    #[arg(long, default_value = "summary")]
    pub format: String,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Report passing tests too
    #[arg(short, long)]
    pub verbose: bool,

    /// Stream test output as it is produced (single worker only)
    #[arg(long = "vv")]
    pub stream: bool,

    /// Approximate run time of each benchmark (e.g. 1s, 200ms)
    #[arg(long = "btime")]
    pub benchmark_time: Option<String>,

    /// Report allocations per benchmark iteration
    #[arg(long = "bmem")]
    pub benchmark_mem: bool,

    /// Keep work directories and print their paths
    #[arg(long = "work")]
    pub keep_work_dir: bool,

    /// Number of suites run in parallel
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub select: SelectArgs,
}
