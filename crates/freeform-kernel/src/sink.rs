//! Error sinks: where detected errors are reported.

use crate::config::ErrorPolicy;
use crate::error::KernelError;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives every error the kernel detects, before it is returned.
pub trait ErrorSink: Send + Sync {
    /// Report one error.
    fn report(&self, err: &KernelError);
}

/// Logs errors at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, err: &KernelError) {
        log::error!("{err}");
    }
}

/// Panics on the first error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicSink;

impl ErrorSink for PanicSink {
    fn report(&self, err: &KernelError) {
        panic!("fatal kernel error: {err}");
    }
}

/// Records error messages. Clones share one record.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of errors reported so far.
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, err: &KernelError) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err.to_string());
    }
}

/// Default sink for a policy.
pub fn sink_for(policy: ErrorPolicy) -> Box<dyn ErrorSink> {
    match policy {
        ErrorPolicy::Log => Box::new(LogSink),
        ErrorPolicy::Panic => Box::new(PanicSink),
        ErrorPolicy::Collect => Box::new(CollectingSink::new()),
    }
}
