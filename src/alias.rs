//! Alias publication for prepared agents.
//!
//! Preparing an agent yields a compound token `<resource-id>|<version>`. Only
//! the version is advertised. Recovery rules for malformed tokens:
//!
//! | token      | version    |
//! |------------|------------|
//! | `agent\|3` | `3`        |
//! | `agent`    | `agent`    |
//! | `a\|b\|c`  | `c`        |
//! | `a\|`      | `a`        |
//! | `\|`       | agent name |

use crate::agent::{AgentSpec, AgentState};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};

/// Separator between resource id and version in a compound token.
pub const VERSION_SEPARATOR: char = '|';

/// Name every published alias carries.
pub const DEFAULT_ALIAS_NAME: &str = "latest";

/// A version extracted from a compound token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub version: String,
    /// Set when a fallback rule was applied.
    pub ambiguity: Option<String>,
}

/// Extract the version component of `token`.
///
/// An empty last segment falls back to the last non-empty one. When no
/// segment has content the version is empty and the caller picks a fallback.
pub fn extract_version(token: &str) -> ParsedVersion {
    let separators = token.matches(VERSION_SEPARATOR).count();
    match token.rsplit_once(VERSION_SEPARATOR) {
        None => ParsedVersion {
            version: token.trim().to_string(),
            ambiguity: Some(format!(
                "version token '{}' has no '{}' separator; using the whole token",
                token, VERSION_SEPARATOR
            )),
        },
        Some((_, last)) if !last.trim().is_empty() => ParsedVersion {
            version: last.to_string(),
            ambiguity: (separators > 1).then(|| {
                format!(
                    "version token '{}' has {} separators; using the last segment",
                    token, separators
                )
            }),
        },
        Some(_) => match token
            .rsplit(VERSION_SEPARATOR)
            .find(|segment| !segment.trim().is_empty())
        {
            Some(segment) => ParsedVersion {
                version: segment.to_string(),
                ambiguity: Some(format!(
                    "version token '{}' ends with an empty segment; using '{}'",
                    token, segment
                )),
            },
            None => ParsedVersion {
                version: String::new(),
                ambiguity: Some(format!("version token '{}' has no non-empty segment", token)),
            },
        },
    }
}

/// A stable pointer to one prepared agent version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasSpec {
    pub name: String,
    /// Name of the agent the alias points at.
    pub agent: String,
    pub version: String,
    /// Token the version was extracted from.
    pub token: String,
}

/// Publish an alias for a prepared agent and move it to `Aliased`.
///
/// Fallback rules surface as one diagnostic each. A token with no usable
/// segment advertises the agent's own name as its version.
pub fn publish_alias(
    sink: &mut dyn DiagnosticSink,
    agent: &mut AgentSpec,
    alias_name: &str,
    token: &str,
) -> Result<AliasSpec> {
    if agent.state != AgentState::Prepared {
        return Err(SynthError::InvalidPlan(format!(
            "alias '{}' requires agent '{}' to be prepared, but it is {}",
            alias_name, agent.name, agent.state
        )));
    }

    let mut parsed = extract_version(token);
    if parsed.version.is_empty() {
        parsed.version = agent.name.clone();
        parsed.ambiguity = parsed
            .ambiguity
            .map(|message| format!("{}; falling back to agent name", message));
    }
    if let Some(message) = parsed.ambiguity.take() {
        sink.emit(Diagnostic::new(DiagnosticKind::AliasParseAmbiguity, message));
    }

    agent.advance(AgentState::Aliased)?;
    tracing::info!(
        agent = %agent.name,
        alias = alias_name,
        version = %parsed.version,
        "published alias"
    );

    Ok(AliasSpec {
        name: alias_name.to_string(),
        agent: agent.name.clone(),
        version: parsed.version,
        token: token.to_string(),
    })
}
