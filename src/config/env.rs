//! Environment variable configuration
//!
//! Provides `SUITECHECK_*` overrides so a host `#[test]` can be steered
//! without command-line flags.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SUITECHECK";

/// Configuration read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Selection pattern from SUITECHECK_FILTER
    pub filter: Option<String>,
    /// Verbose from SUITECHECK_VERBOSE
    pub verbose: Option<bool>,
    /// Streaming from SUITECHECK_STREAM
    pub stream: Option<bool>,
    /// Benchmark mode from SUITECHECK_BENCH
    pub benchmark: Option<bool>,
    /// Benchmark time from SUITECHECK_BENCH_TIME
    pub benchmark_time: Option<String>,
    /// Memory benchmarks from SUITECHECK_BENCH_MEM
    pub benchmark_mem: Option<bool>,
    /// List mode from SUITECHECK_LIST
    pub list: Option<bool>,
    /// Work directory retention from SUITECHECK_KEEP_WORK
    pub keep_work_dir: Option<bool>,
    /// Worker count from SUITECHECK_WORKERS
    pub workers: Option<usize>,
    /// Config file from SUITECHECK_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            filter: get_env("FILTER"),
            verbose: get_env_bool("VERBOSE"),
            stream: get_env_bool("STREAM"),
            benchmark: get_env_bool("BENCH"),
            benchmark_time: get_env("BENCH_TIME"),
            benchmark_mem: get_env_bool("BENCH_MEM"),
            list: get_env_bool("LIST"),
            keep_work_dir: get_env_bool("KEEP_WORK"),
            workers: get_env_parse("WORKERS"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.filter.is_some()
            || self.verbose.is_some()
            || self.stream.is_some()
            || self.benchmark.is_some()
            || self.benchmark_time.is_some()
            || self.benchmark_mem.is_some()
            || self.list.is_some()
            || self.keep_work_dir.is_some()
            || self.workers.is_some()
            || self.config_file.is_some()
    }

    pub fn list_or(&self, default: bool) -> bool {
        self.list.unwrap_or(default)
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_FILTER"), filter.into()));
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_VERBOSE"), verbose.to_string()));
        self
    }

    pub fn list(mut self, list: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_LIST"), list.to_string()));
        self
    }

    pub fn keep_work_dir(mut self, keep: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_KEEP_WORK"), keep.to_string()));
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_WORKERS"), workers.to_string()));
        self
    }

    pub fn benchmark_time(mut self, time: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_BENCH_TIME"), time.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all SUITECHECK environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_FILTER      Regular expression selecting suites and tests");
    println!("  {ENV_PREFIX}_VERBOSE     Report every test (true/false)");
    println!("  {ENV_PREFIX}_STREAM      Stream output as produced (single worker only)");
    println!("  {ENV_PREFIX}_BENCH       Run benchmarks instead of tests");
    println!("  {ENV_PREFIX}_BENCH_TIME  Approximate run time per benchmark (e.g. 1s, 200ms)");
    println!("  {ENV_PREFIX}_BENCH_MEM   Report allocations per benchmark iteration");
    println!("  {ENV_PREFIX}_LIST        List selected tests instead of running them");
    println!("  {ENV_PREFIX}_KEEP_WORK   Keep work directories and print their paths");
    println!("  {ENV_PREFIX}_WORKERS     Number of parallel suite workers");
    println!("  {ENV_PREFIX}_CONFIG      Path to a YAML or JSON configuration file");
    println!();
    println!("Example:");
    println!("  {ENV_PREFIX}_FILTER='Math\\.TestAdd' {ENV_PREFIX}_VERBOSE=1 cargo test");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.filter.is_none());
        assert!(!config.list_or(false));
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .filter("Math")
            .workers(3)
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.filter, Some("Math".to_string()));
        assert_eq!(config.workers, Some(3));
        assert!(config.has_any());
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = EnvBuilder::new().keep_work_dir(true).apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.keep_work_dir, Some(true));
    }
}
