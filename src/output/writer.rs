//! Shared report sink
//!
//! Workers write whole report blocks under one lock so reports from
//! parallel suites never interleave mid-block.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::warn;

/// Cloneable handle to a locked writer
#[derive(Clone)]
pub struct OutputWriter {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputWriter {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Writer collecting into memory, plus a handle to read it back
    pub fn capture() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        (Self::new(captured.clone()), captured)
    }

    /// Write one block atomically
    pub fn write_block(&self, text: &str) {
        let mut sink = self.sink.lock();
        if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
            warn!("Failed to write report output: {}", e);
        }
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for OutputWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OutputWriter")
    }
}

/// In-memory output shared with an [`OutputWriter`]
#[derive(Clone, Default)]
pub struct CapturedOutput {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
