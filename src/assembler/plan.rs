//! The synthesized specification set and its structural validation.

use crate::action_group::{ActionGroupSpec, PermissionGrant};
use crate::agent::{AgentSpec, AgentState};
use crate::alias::AliasSpec;
use crate::dashboard::DashboardSpec;
use crate::diagnostics::Diagnostic;
use crate::error::{Result, SynthError};
use crate::handler::{HandlerSpec, LibrarySpec};
use crate::knowledge::KnowledgeStoreSpec;
use crate::queue::QueueSpec;
use crate::role::RoleSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything one run hands to the provisioning platform, in dependency order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisPlan {
    pub stack_id: String,
    pub account: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_store: Option<KnowledgeStoreSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibrarySpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_queue: Option<QueueSpec>,
    pub agents: Vec<AgentSpec>,
    pub roles: Vec<RoleSpec>,
    pub handlers: Vec<HandlerSpec>,
    pub grants: Vec<PermissionGrant>,
    pub action_groups: Vec<ActionGroupSpec>,
    pub aliases: Vec<AliasSpec>,
    pub dashboard: DashboardSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

fn invalid(message: String) -> SynthError {
    SynthError::InvalidPlan(message)
}

fn ensure_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(invalid(format!("duplicate {} name '{}'", kind, name)));
        }
    }
    Ok(())
}

impl SynthesisPlan {
    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn handler(&self, function_name: &str) -> Option<&HandlerSpec> {
        self.handlers.iter().find(|h| h.function_name == function_name)
    }

    pub fn role(&self, name: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn alias_for(&self, agent: &str) -> Option<&AliasSpec> {
        self.aliases.iter().find(|a| a.agent == agent)
    }

    /// Re-check the whole graph before it is handed off.
    pub fn validate(&self) -> Result<()> {
        ensure_unique("agent", self.agents.iter().map(|a| a.name.as_str()))?;
        ensure_unique("handler", self.handlers.iter().map(|h| h.function_name.as_str()))?;
        ensure_unique("role", self.roles.iter().map(|r| r.name.as_str()))?;
        self.validate_handlers()?;
        self.validate_roles()?;
        self.validate_action_groups()?;
        self.validate_agents()?;
        Ok(())
    }

    fn validate_handlers(&self) -> Result<()> {
        let mut role_owner: BTreeMap<&str, &str> = BTreeMap::new();
        for handler in &self.handlers {
            if let Some(role) = &handler.role {
                if self.role(role.as_str()).is_none() {
                    return Err(invalid(format!(
                        "handler '{}' references unknown role '{}'",
                        handler.function_name, role
                    )));
                }
                if let Some(other) = role_owner.insert(role.as_str(), &handler.function_name) {
                    return Err(invalid(format!(
                        "role '{}' is shared by handlers '{}' and '{}'",
                        role, other, handler.function_name
                    )));
                }
            }
            if let Some(queue) = &handler.failure_queue
                && self
                    .failure_queue
                    .as_ref()
                    .is_none_or(|q| q.name != queue.as_str())
            {
                return Err(invalid(format!(
                    "handler '{}' references unknown failure queue '{}'",
                    handler.function_name, queue
                )));
            }
            for library in &handler.libraries {
                if !self.libraries.iter().any(|l| &l.name == library) {
                    return Err(invalid(format!(
                        "handler '{}' references undeclared library '{}'",
                        handler.function_name, library
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_roles(&self) -> Result<()> {
        for role in &self.roles {
            let has_queue = self.handlers.iter().any(|h| {
                h.role.as_ref().is_some_and(|r| r.as_str() == role.name)
                    && h.failure_queue.is_some()
            });
            role.check_least_privilege(has_queue)?;
        }
        Ok(())
    }

    fn validate_action_groups(&self) -> Result<()> {
        let mut bound = BTreeSet::new();
        for group in &self.action_groups {
            if !bound.insert((group.agent.as_str(), group.name.as_str())) {
                return Err(invalid(format!(
                    "action group '{}' is bound to agent '{}' twice",
                    group.name, group.agent
                )));
            }
            let agent = self.agent(&group.agent).ok_or_else(|| {
                invalid(format!(
                    "action group '{}' is bound to unknown agent '{}'",
                    group.name, group.agent
                ))
            })?;
            if !agent.action_groups.contains(&group.name) {
                return Err(invalid(format!(
                    "agent '{}' does not list action group '{}'",
                    agent.name, group.name
                )));
            }
            if self.handler(group.handler.as_str()).is_none() {
                return Err(invalid(format!(
                    "action group '{}' references unknown handler '{}'",
                    group.name, group.handler
                )));
            }
            if !self
                .grants
                .iter()
                .any(|g| g.handler == group.handler && g.source_arn == agent.arn)
            {
                return Err(invalid(format!(
                    "handler '{}' is not invocable by agent '{}'",
                    group.handler, agent.name
                )));
            }
        }
        Ok(())
    }

    fn validate_agents(&self) -> Result<()> {
        ensure_unique("alias target", self.aliases.iter().map(|a| a.agent.as_str()))?;
        for alias in &self.aliases {
            let agent = self.agent(&alias.agent).ok_or_else(|| {
                invalid(format!(
                    "alias '{}' targets unknown agent '{}'",
                    alias.name, alias.agent
                ))
            })?;
            if !agent.state.is_prepared() || alias.version.is_empty() {
                return Err(invalid(format!(
                    "alias '{}' does not point at a prepared version of '{}'",
                    alias.name, agent.name
                )));
            }
        }
        for agent in &self.agents {
            if self.alias_for(&agent.name).is_none() {
                return Err(invalid(format!("agent '{}' has no alias", agent.name)));
            }
            if let Some(store) = &agent.knowledge_store
                && self.knowledge_store.as_ref().is_none_or(|kb| &kb.name != store)
            {
                return Err(invalid(format!(
                    "agent '{}' attaches unknown knowledge store '{}'",
                    agent.name, store
                )));
            }
            let expected = if agent.has_attachments() {
                AgentState::Bound
            } else {
                AgentState::Aliased
            };
            if agent.state != expected {
                return Err(invalid(format!(
                    "agent '{}' finished {} instead of {}",
                    agent.name, agent.state, expected
                )));
            }
        }
        Ok(())
    }
}
