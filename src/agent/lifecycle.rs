//! Forward-only agent lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an agent is in its single-run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Specification created; attachments may still be staged.
    #[default]
    Defined,
    /// A build was triggered on the platform.
    Prepared,
    /// A stable alias points at the prepared version.
    Aliased,
    /// Action groups and/or a knowledge store are attached.
    Bound,
}

impl AgentState {
    /// The only state this one may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            AgentState::Defined => Some(AgentState::Prepared),
            AgentState::Prepared => Some(AgentState::Aliased),
            AgentState::Aliased => Some(AgentState::Bound),
            AgentState::Bound => None,
        }
    }

    /// Whether a platform build exists for the agent.
    pub fn is_prepared(self) -> bool {
        self >= AgentState::Prepared
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Defined => write!(f, "defined"),
            AgentState::Prepared => write!(f, "prepared"),
            AgentState::Aliased => write!(f, "aliased"),
            AgentState::Bound => write!(f, "bound"),
        }
    }
}
