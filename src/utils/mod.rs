//! Shared helpers: logging setup, timers and work directories

pub mod logger;
pub mod timer;
pub mod workdir;
