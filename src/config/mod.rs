//! Configuration module
//!
//! Holds the immutable run configuration and loads it from files and
//! environment variables.

mod env;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default approximate run time for each benchmark
pub const DEFAULT_BENCHMARK_TIME: Duration = Duration::from_secs(1);

/// Run-time options for one run
///
/// Built once per run and never mutated afterwards; every `with_*`
/// method consumes and returns a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConf {
    filter: String,
    verbose: bool,
    stream: bool,
    benchmark: bool,
    benchmark_time: Duration,
    benchmark_mem: bool,
    keep_work_dir: bool,
    workers: usize,
}

impl Default for RunConf {
    fn default() -> Self {
        Self {
            filter: String::new(),
            verbose: false,
            stream: false,
            benchmark: false,
            benchmark_time: DEFAULT_BENCHMARK_TIME,
            benchmark_mem: false,
            keep_work_dir: false,
            workers: 1,
        }
    }
}

impl RunConf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regular expression selecting suites and tests
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Emit output as produced instead of buffering it per test
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_benchmark(mut self, benchmark: bool) -> Self {
        self.benchmark = benchmark;
        self
    }

    pub fn with_benchmark_time(mut self, time: Duration) -> Self {
        self.benchmark_time = time;
        self
    }

    pub fn with_benchmark_mem(mut self, enabled: bool) -> Self {
        self.benchmark_mem = enabled;
        self
    }

    pub fn with_keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }

    /// Number of parallel suite workers, clamped to at least one
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Streaming is only honoured for single-worker runs
    pub fn stream(&self) -> bool {
        self.stream && self.workers <= 1
    }

    pub fn benchmark(&self) -> bool {
        self.benchmark
    }

    pub fn benchmark_time(&self) -> Duration {
        self.benchmark_time
    }

    pub fn benchmark_mem(&self) -> bool {
        self.benchmark_mem
    }

    pub fn keep_work_dir(&self) -> bool {
        self.keep_work_dir
    }

    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }

    /// Passing tests are reported when verbose or streaming
    pub fn reports_passes(&self) -> bool {
        self.verbose || self.stream()
    }
}

/// On-disk run configuration (YAML or JSON)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Selection pattern
    pub filter: Option<String>,

    /// Verbose reporting
    pub verbose: Option<bool>,

    /// Disable output buffering
    pub stream: Option<bool>,

    /// Run benchmarks instead of tests
    pub benchmark: Option<bool>,

    /// Benchmark target duration, e.g. "1s" or "250ms"
    pub benchmark_time: Option<String>,

    /// Report allocations per benchmark iteration
    pub benchmark_mem: Option<bool>,

    /// Keep per-test work directories
    pub keep_work_dir: Option<bool>,

    /// Parallel suite workers
    pub workers: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Environment values win over file values
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if env.filter.is_some() {
            self.filter = env.filter.clone();
        }
        if env.benchmark_time.is_some() {
            self.benchmark_time = env.benchmark_time.clone();
        }
        self.verbose = env.verbose.or(self.verbose);
        self.stream = env.stream.or(self.stream);
        self.benchmark = env.benchmark.or(self.benchmark);
        self.benchmark_mem = env.benchmark_mem.or(self.benchmark_mem);
        self.keep_work_dir = env.keep_work_dir.or(self.keep_work_dir);
        self.workers = env.workers.or(self.workers);
        self
    }

    /// Resolve into a run configuration
    pub fn to_run_conf(&self) -> Result<RunConf> {
        let benchmark_time = match &self.benchmark_time {
            Some(raw) => {
                parse_duration(raw).with_context(|| format!("Invalid benchmark time: {raw}"))?
            }
            None => DEFAULT_BENCHMARK_TIME,
        };

        Ok(RunConf::new()
            .with_filter(self.filter.clone().unwrap_or_default())
            .with_verbose(self.verbose.unwrap_or(false))
            .with_stream(self.stream.unwrap_or(false))
            .with_benchmark(self.benchmark.unwrap_or(false))
            .with_benchmark_time(benchmark_time)
            .with_benchmark_mem(self.benchmark_mem.unwrap_or(false))
            .with_keep_work_dir(self.keep_work_dir.unwrap_or(false))
            .with_workers(self.workers.unwrap_or(1)))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Parse durations such as `1s`, `250ms` or `1m 30s`
///
/// A bare integer is read as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs = raw.parse::<u64>().context("Duration out of range")?;
        return Ok(Duration::from_secs(secs));
    }
    Ok(humantime::parse_duration(raw)?)
}
