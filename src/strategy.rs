//! Parsing strategy selection for knowledge store ingestion.
//!
//! Codes map to a closed set of choices; anything else means "no strategy".
//! Dispatch is an exhaustive match so a new choice cannot fall through.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::model::PARSING_MODEL_ID;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognised parsing strategy code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsingStrategyChoice {
    Default,
    FoundationModel,
    /// Reserved; not implemented yet.
    DataAutomation,
}

impl ParsingStrategyChoice {
    pub const ALL: [ParsingStrategyChoice; 3] = [
        ParsingStrategyChoice::Default,
        ParsingStrategyChoice::FoundationModel,
        ParsingStrategyChoice::DataAutomation,
    ];

    /// Parse a code. Matching is exact and case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DEFAULT" => Some(ParsingStrategyChoice::Default),
            "FOUNDATION_MODEL" => Some(ParsingStrategyChoice::FoundationModel),
            "DATA_AUTOMATION" => Some(ParsingStrategyChoice::DataAutomation),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ParsingStrategyChoice::Default => "DEFAULT",
            ParsingStrategyChoice::FoundationModel => "FOUNDATION_MODEL",
            ParsingStrategyChoice::DataAutomation => "DATA_AUTOMATION",
        }
    }
}

impl fmt::Display for ParsingStrategyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How ingested documents are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsingStrategy {
    /// Delegate parsing to a secondary foundation model.
    FoundationModel { parsing_model: String },
}

/// Whether `code` is one of the recognised strategy codes.
pub fn is_valid_code(code: &str) -> bool {
    ParsingStrategyChoice::from_code(code).is_some()
}

/// Select the parsing strategy for `code`.
///
/// Only the reserved `DATA_AUTOMATION` code emits a diagnostic. Unrecognised
/// codes are treated as absent configuration.
pub fn strategy_for(code: &str, sink: &mut dyn DiagnosticSink) -> Option<ParsingStrategy> {
    let Some(choice) = ParsingStrategyChoice::from_code(code) else {
        tracing::debug!(code, "unrecognised parsing strategy code, using none");
        return None;
    };
    match choice {
        ParsingStrategyChoice::Default => None,
        ParsingStrategyChoice::FoundationModel => Some(ParsingStrategy::FoundationModel {
            parsing_model: PARSING_MODEL_ID.to_string(),
        }),
        ParsingStrategyChoice::DataAutomation => {
            sink.emit(Diagnostic::new(
                DiagnosticKind::UnimplementedStrategy,
                "parsing strategy DATA_AUTOMATION is not implemented yet; ingesting without one",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognised_codes_are_valid() {
        for choice in ParsingStrategyChoice::ALL {
            assert!(is_valid_code(choice.code()), "{}", choice);
        }
        for code in ["BOGUS", "", "default", "FOUNDATION_MODEL ", "DATA"] {
            assert!(!is_valid_code(code), "{:?}", code);
        }
    }

    #[test]
    fn test_foundation_model_yields_strategy() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        let strategy = strategy_for("FOUNDATION_MODEL", &mut sink);
        assert_eq!(
            strategy,
            Some(ParsingStrategy::FoundationModel {
                parsing_model: PARSING_MODEL_ID.to_string()
            })
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_data_automation_emits_one_diagnostic() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        assert_eq!(strategy_for("DATA_AUTOMATION", &mut sink), None);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].kind, DiagnosticKind::UnimplementedStrategy);
    }

    #[test]
    fn test_default_and_unknown_are_silent() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        assert_eq!(strategy_for("DEFAULT", &mut sink), None);
        assert_eq!(strategy_for("BOGUS", &mut sink), None);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mut first: Vec<Diagnostic> = Vec::new();
        let mut second: Vec<Diagnostic> = Vec::new();
        assert_eq!(
            strategy_for("FOUNDATION_MODEL", &mut first),
            strategy_for("FOUNDATION_MODEL", &mut second)
        );
    }
}
