use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, error, warn, Level};

/// Recoverable problems found while resolving affiliations.
///
/// None of these abort a parse; the offending block, fragment or author is
/// skipped and the rest of the input is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("unexpected string for affiliation: {block:?}")]
    MalformedBlock { block: String },

    #[error("author processor must return a list; failed on {fragment:?}: {reason}")]
    ProcessorContract { fragment: String, reason: String },

    #[error("match for author [{key}] failed ({matches} found)")]
    AmbiguousAuthorMatch { key: String, matches: usize },

    #[error("no roster entry for author initials [{key}]")]
    UnresolvedAuthor { key: String },

    #[error("dropped {} department(s) with no institution in block {block:?}", .pending.len())]
    UnresolvedDeferred {
        block: String,
        pending: Vec<(String, String)>,
    },
}

impl Diagnostic {
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::MalformedBlock { .. } => Level::WARN,
            Diagnostic::UnresolvedDeferred { .. } => Level::DEBUG,
            _ => Level::ERROR,
        }
    }
}

/// Destination for diagnostics, supplied by the caller on every call.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the active `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let level = diagnostic.level();
        if level == Level::ERROR {
            error!("{}", diagnostic);
        } else if level == Level::WARN {
            warn!("{}", diagnostic);
        } else {
            debug!("{}", diagnostic);
        }
    }
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    seen: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(diagnostic);
        }
    }
}
