//! Non-fatal conditions surfaced during a synthesis run.
//!
//! Diagnostics never block completion. They are collected on the run context
//! so callers (and tests) can count them, and each one is also logged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A reserved parsing strategy was selected; synthesis continues without one.
    UnimplementedStrategy,
    /// A compound version token was malformed and resolved by fallback rules.
    AliasParseAmbiguity,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnimplementedStrategy => write!(f, "unimplemented_strategy"),
            DiagnosticKind::AliasParseAmbiguity => write!(f, "alias_parse_ambiguity"),
        }
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Sink for diagnostics. Implemented by the run context and by plain vectors
/// so pure components can be exercised without one.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(kind = %diagnostic.kind, "{}", diagnostic.message);
        self.push(diagnostic);
    }
}
