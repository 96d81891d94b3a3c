//! suitecheck - run fixture-based test suites from the command line
//!
//! ## Usage
//!
//! ```bash
//! # Run every bundled test
//! suitecheck run
//!
//! # Run one suite, reporting passes too
//! suitecheck run --filter 'Arithmetic' -v
//!
//! # Four suites at a time, JSON summary
//! suitecheck run -j 4 --format json
//!
//! # Benchmarks with allocation counts
//! suitecheck run -b --btime 200ms --bmem
//!
//! # List what a filter selects
//! suitecheck list --filter 'Test(Add|Write)'
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use suitecheck::benchmark::CountingAllocator;
use suitecheck::config::{print_env_help, ConfigFile, EnvConfig};
use suitecheck::output::{OutputFormat, OutputWriter, ResultFormatter};
use suitecheck::utils::logger::{init_logger, LogLevel};
use suitecheck::Dispatcher;

mod cli;
mod suites;

use cli::{Args, Command, ListArgs, RunArgs, SelectArgs};

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = LogLevel::parse(&args.log_level).unwrap_or_default();
    init_logger(level);

    match args.command {
        Command::Run(run_args) => {
            if !run_suites(run_args).await? {
                std::process::exit(1);
            }
        }
        Command::List(list_args) => {
            list_suites(list_args)?;
        }
        Command::Env => {
            print_env_help();
        }
    }

    Ok(())
}

/// Returns whether the run passed
async fn run_suites(args: RunArgs) -> Result<bool> {
    let env = EnvConfig::load();
    if env.list_or(false) {
        list_suites(ListArgs { select: args.select })?;
        return Ok(true);
    }

    let mut file = load_config(&args.select, &env)?;
    if args.verbose {
        file.verbose = Some(true);
    }
    if args.stream {
        file.stream = Some(true);
    }
    if args.benchmark_time.is_some() {
        file.benchmark_time = args.benchmark_time.clone();
    }
    if args.benchmark_mem {
        file.benchmark_mem = Some(true);
    }
    if args.keep_work_dir {
        file.keep_work_dir = Some(true);
    }
    if args.workers.is_some() {
        file.workers = args.workers;
    }
    let conf = file.to_run_conf()?;
    debug!("Run configuration: {:?}", conf);

    let format = parse_format(&args.select.format)?;
    // Keep stdout parseable when the summary is JSON
    let output = match format {
        OutputFormat::Summary => OutputWriter::stdout(),
        OutputFormat::Json | OutputFormat::JsonPretty => OutputWriter::new(std::io::stderr()),
    };

    let dispatcher = Dispatcher::new(suites::registry()).with_output(output);
    info!("Registered {} suites", dispatcher.registry().len());

    let result = dispatcher.run_all(&conf).await;
    println!("{}", ResultFormatter::new(format).format_result(&result));

    Ok(result.passed())
}

fn list_suites(args: ListArgs) -> Result<()> {
    let env = EnvConfig::load();
    let conf = load_config(&args.select, &env)?.to_run_conf()?;
    let format = parse_format(&args.select.format)?;

    let ids = Dispatcher::new(suites::registry())
        .list_all(&conf)
        .context("Failed to select tests")?;
    let text = ResultFormatter::new(format).format_list(&ids);
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
    Ok(())
}

/// Config file, then environment, then selection flags
fn load_config(select: &SelectArgs, env: &EnvConfig) -> Result<ConfigFile> {
    let path = select.config.clone().or_else(|| env.config_file.clone());
    let file = match path {
        Some(path) => ConfigFile::load(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => ConfigFile::default(),
    };

    if env.has_any() {
        debug!("Environment overrides: {:?}", env);
    }
    let mut file = file.merge_env(env);
    if select.filter.is_some() {
        file.filter = select.filter.clone();
    }
    if select.benchmark {
        file.benchmark = Some(true);
    }
    Ok(file)
}

fn parse_format(raw: &str) -> Result<OutputFormat> {
    OutputFormat::parse(raw).ok_or_else(|| anyhow::anyhow!("Unknown output format: {raw}"))
}
