//! Seam to the provisioning platform.

use crate::agent::AgentSpec;
use crate::alias::VERSION_SEPARATOR;
use crate::error::Result;

/// Builds agents and reports the resulting compound version token.
pub trait Platform {
    /// Trigger a build of `agent` and return `<resource-id>|<version>`.
    fn prepare_agent(&mut self, agent: &AgentSpec) -> Result<String>;
}

/// Offline platform: every agent is built as version 1 of itself.
#[derive(Debug, Clone, Default)]
pub struct LocalPlatform;

impl Platform for LocalPlatform {
    fn prepare_agent(&mut self, agent: &AgentSpec) -> Result<String> {
        Ok(format!("{}{}1", agent.name, VERSION_SEPARATOR))
    }
}
