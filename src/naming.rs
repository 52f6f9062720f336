//! Deterministic naming rules for derived resources.
//!
//! Every derived name is a pure function of the configuration, so re-running
//! synthesis with identical input yields identical names.

use crate::error::{Result, SynthError};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Extension appended to an entry's base name when no file name is given.
pub const HANDLER_FILE_EXTENSION: &str = "py";

static STACK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("stack id pattern"));

static RESOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Za-z][_-]?){1,100}$").expect("resource name pattern")
});

/// Whether `s` is usable as a stack id.
pub fn is_valid_stack_id(s: &str) -> bool {
    STACK_ID.is_match(s)
}

/// Whether `s` is usable as an agent or action group name.
pub fn is_valid_resource_name(s: &str) -> bool {
    RESOURCE_NAME.is_match(s)
}

/// Derive an agent name from the owning stack and the agent's logical id.
///
/// Format: `{stack_id}-{logical_id}` with `/` replaced by `-`.
pub fn agent_name(stack_id: &str, logical_id: &str) -> Result<String> {
    let name = format!("{}-{}", stack_id, logical_id).replace('/', "-");
    if !is_valid_resource_name(&name) {
        return Err(SynthError::config(
            "agents.logical_id",
            format!(
                "derived agent name '{}' must be 1-100 alphanumerics separated by single '-' or '_'",
                name
            ),
        ));
    }
    Ok(name)
}

/// Default handler file name: the entry's base name plus the fixed extension.
///
/// `src/backend/agents/lambda/account_actions` -> `account_actions.py`
pub fn default_file_name(entry: &str) -> Result<String> {
    let base = Path::new(entry)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            SynthError::config(
                "handler.entry",
                format!("cannot derive a file name from entry '{}'", entry),
            )
        })?;
    Ok(format!("{}.{}", base, HANDLER_FILE_EXTENSION))
}

/// Default function name: `{file stem}-{stack_id}`.
///
/// Suffixing the stack id keeps structurally identical handlers of different
/// stacks apart.
pub fn default_function_name(file_name: &str, stack_id: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("{}-{}", stem, stack_id)
}
