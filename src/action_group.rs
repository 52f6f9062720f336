//! Action group binding.
//!
//! A group joins one registered handler and one interface contract to one
//! agent. The handler must already be invocable by that agent; the grant is an
//! explicit earlier step, never implied by binding.

use crate::agent::AgentSpec;
use crate::assets;
use crate::context::SynthContext;
use crate::error::{Result, SynthError};
use crate::handler::HandlerRef;
use crate::naming;
use serde::{Deserialize, Serialize};

/// File name of the interface contract inside a variant directory.
pub const CONTRACT_FILE_NAME: &str = "schema.json";

/// Path of the contract for `variant` beneath `capability_base`.
pub fn contract_path(capability_base: &str, variant: &str) -> String {
    format!(
        "{}/{}/{}",
        capability_base.trim_end_matches('/'),
        variant.trim_matches('/'),
        CONTRACT_FILE_NAME
    )
}

/// Permission for the agent service to invoke a handler for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub handler: HandlerRef,
    pub principal: String,
    /// ARN of the agent the grant is scoped to.
    pub source_arn: String,
}

/// A bound action group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGroupSpec {
    pub name: String,
    pub description: String,
    /// Name of the owning agent.
    pub agent: String,
    pub handler: HandlerRef,
    /// Contract path relative to the asset root.
    pub contract: String,
}

/// What to bind, as declared.
#[derive(Debug, Clone, Copy)]
pub struct BindRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub capability_base: &'a str,
    pub variant: &'a str,
}

/// Bind `handler` and its contract to `agent` as a named capability.
pub fn bind_action_group(
    ctx: &SynthContext,
    agent: &mut AgentSpec,
    handler: &HandlerRef,
    request: BindRequest<'_>,
) -> Result<ActionGroupSpec> {
    if !naming::is_valid_resource_name(request.name) {
        return Err(SynthError::config(
            format!("agents.{}.action_groups.name", agent.logical_id),
            format!("'{}' is not a valid action group name", request.name),
        ));
    }
    if ctx.handler(handler.as_str()).is_none() {
        return Err(SynthError::InvalidPlan(format!(
            "action group '{}' references unregistered handler '{}'",
            request.name, handler
        )));
    }
    if !ctx.has_grant(handler, &agent.arn) {
        return Err(SynthError::InvalidPlan(format!(
            "handler '{}' has not been granted to agent '{}' before binding '{}'",
            handler, agent.name, request.name
        )));
    }

    let contract = contract_path(request.capability_base, request.variant);
    assets::read_json(ctx.asset_root(), &contract)?;

    agent.attach_action_group(request.name)?;
    tracing::debug!(
        agent = %agent.name,
        group = request.name,
        handler = %handler,
        "bound action group"
    );

    Ok(ActionGroupSpec {
        name: request.name.to_string(),
        description: request.description.to_string(),
        agent: agent.name.clone(),
        handler: handler.clone(),
        contract,
    })
}
