//! Resource graph assembly.
//!
//! One call to [`assemble`] turns a validated [`StackConfig`] into a
//! [`SynthesisPlan`]. Construction order is fixed:
//!
//! 1. knowledge store and shared libraries (optional inputs)
//! 2. agents
//! 3. per action group: failure queue, role, handler, grant, binding
//! 4. prepare and alias each agent
//! 5. dashboard
//! 6. knowledge store attachment
//!
//! A resource is only ever referenced by a later step. Any fatal error aborts
//! the run and no plan is returned; optional inputs that are absent are skipped.

mod plan;

#[cfg(test)]
mod tests;

pub use plan::SynthesisPlan;

use crate::action_group::{BindRequest, bind_action_group};
use crate::agent::{AgentSpec, AgentState};
use crate::alias::{DEFAULT_ALIAS_NAME, publish_alias};
use crate::config::{HandlerConfig, StackConfig};
use crate::context::SynthContext;
use crate::dashboard::DashboardComposer;
use crate::error::{Result, SynthError};
use crate::handler::{HandlerProps, HandlerRef, create_handler, declare_library, render_environment};
use crate::knowledge::build_knowledge_store;
use crate::model::{EMBEDDINGS_DISPLAY_NAME, EMBEDDINGS_INPUT_PRICE};
use crate::platform::{LocalPlatform, Platform};
use crate::role::{StorageLocation, synthesize_role};
use crate::template::{Vars, vars};
use std::collections::BTreeMap;

/// Assemble `config` on a fresh context against the local platform.
pub fn synthesize(config: &StackConfig) -> Result<SynthesisPlan> {
    let mut ctx = SynthContext::for_config(config);
    assemble(config, &mut ctx, &mut LocalPlatform)
}

/// Assemble the resource graph for one stack.
///
/// `ctx` must be fresh; it belongs to this run only.
pub fn assemble(
    config: &StackConfig,
    ctx: &mut SynthContext,
    platform: &mut dyn Platform,
) -> Result<SynthesisPlan> {
    tracing::info!(stack = %config.stack_id, agents = config.agents.len(), "assembling stack");

    // Step 1: optional data store and shared libraries
    let knowledge_store = match &config.knowledge_store {
        Some(kb) => Some(build_knowledge_store(ctx, kb, config.parser_strategy.as_deref())?),
        None => {
            tracing::debug!("no knowledge store configured, skipping");
            None
        }
    };
    let libraries = config
        .libraries
        .iter()
        .map(|l| declare_library(ctx, l))
        .collect::<Result<Vec<_>>>()?;

    // Step 2: agents
    let mut agents = config
        .agents
        .iter()
        .map(|a| AgentSpec::define(ctx, config, a))
        .collect::<Result<Vec<_>>>()?;

    // Step 3: handlers, roles and bindings
    let env_vars = environment_vars(config);
    let mut built: BTreeMap<&str, (&HandlerConfig, HandlerRef)> = BTreeMap::new();
    let mut action_groups = Vec::new();

    for (agent_config, agent) in config.agents.iter().zip(agents.iter_mut()) {
        for group in &agent_config.action_groups {
            let declared = &group.handler;
            let handler = match built.get(declared.logical_id.as_str()) {
                Some((previous, handler_ref)) if *previous == declared => handler_ref.clone(),
                Some(_) => {
                    return Err(SynthError::config(
                        "handler.logical_id",
                        format!(
                            "handler '{}' is declared twice with different settings",
                            declared.logical_id
                        ),
                    ));
                }
                None => {
                    let handler_ref = build_handler(ctx, config, declared, &env_vars)?;
                    built.insert(&declared.logical_id, (declared, handler_ref.clone()));
                    handler_ref
                }
            };

            ctx.grant_invoke(&handler, &agent.arn)?;
            let bound = bind_action_group(
                ctx,
                agent,
                &handler,
                BindRequest {
                    name: &group.name,
                    description: &group.description,
                    capability_base: &group.capability_base,
                    variant: &group.variant,
                },
            )?;
            action_groups.push(bound);
        }
    }

    // Step 4: prepare and alias
    let mut aliases = Vec::with_capacity(agents.len());
    for agent in &mut agents {
        let token = platform.prepare_agent(agent)?;
        agent.advance(AgentState::Prepared)?;
        aliases.push(publish_alias(ctx, agent, DEFAULT_ALIAS_NAME, &token)?);
    }

    // Step 5: dashboard
    let mut composer = DashboardComposer::new(dashboard_name(config), &config.region);
    if let Some(kb) = &knowledge_store {
        composer.add_model_monitoring(
            EMBEDDINGS_DISPLAY_NAME,
            &kb.embeddings_model,
            EMBEDDINGS_INPUT_PRICE,
            0.0,
        );
    }
    for model in &config.dashboard.models {
        composer.add_configured(model);
    }
    let dashboard = composer.build();

    // Step 6: knowledge store attachment
    for (agent_config, agent) in config.agents.iter().zip(agents.iter_mut()) {
        if !agent_config.attach_knowledge_store {
            continue;
        }
        match &knowledge_store {
            Some(kb) => agent.attach_knowledge_store(&kb.name)?,
            None => tracing::debug!(agent = %agent.name, "no knowledge store to attach, skipping"),
        }
    }
    for agent in &mut agents {
        if agent.has_attachments() {
            agent.advance(AgentState::Bound)?;
        }
    }

    let plan = SynthesisPlan {
        stack_id: ctx.stack_id.clone(),
        account: ctx.account.clone(),
        region: ctx.region.clone(),
        knowledge_store,
        libraries,
        failure_queue: ctx.failure_queue().cloned(),
        agents,
        roles: ctx.roles().to_vec(),
        handlers: ctx.handlers().to_vec(),
        grants: ctx.grants().to_vec(),
        action_groups,
        aliases,
        dashboard,
        diagnostics: ctx.diagnostics().to_vec(),
    };
    plan.validate()?;

    tracing::info!(
        stack = %plan.stack_id,
        handlers = plan.handlers.len(),
        roles = plan.roles.len(),
        action_groups = plan.action_groups.len(),
        diagnostics = plan.diagnostics.len(),
        "stack assembled"
    );
    Ok(plan)
}

/// Synthesize the handler's queue and role, then the handler itself.
fn build_handler(
    ctx: &mut SynthContext,
    config: &StackConfig,
    declared: &HandlerConfig,
    env_vars: &Vars,
) -> Result<HandlerRef> {
    let failure_queue = declared
        .failure_queue
        .then(|| ctx.failure_queue_or_create(&config.failure_queue.name_prefix));

    let role = if declared.query_access {
        let storage = config.storage.as_ref().ok_or_else(|| {
            SynthError::config(
                "storage",
                format!("handler '{}' requests query access", declared.logical_id),
            )
        })?;
        let data = StorageLocation::new(&storage.data_bucket)?;
        let output = StorageLocation::new(&storage.output_bucket)?;
        Some(synthesize_role(
            ctx,
            &format!("{}Role", declared.logical_id),
            &data,
            &output,
            &config.query.workgroup,
            failure_queue.as_ref(),
        )?)
    } else {
        None
    };

    create_handler(
        ctx,
        HandlerProps {
            logical_id: declared.logical_id.clone(),
            entry: declared.entry.clone(),
            file_name: declared.file_name.clone(),
            function_name: declared.function_name.clone(),
            limits: declared.limits,
            role,
            libraries: declared.libraries.clone(),
            environment: render_environment(&declared.environment, env_vars)?,
            failure_queue,
        },
    )
}

fn environment_vars(config: &StackConfig) -> Vars {
    let mut values = vars([
        ("stack_id", config.stack_id.as_str()),
        ("region", config.region.as_str()),
        ("account", config.account.as_str()),
    ]);
    if let Some(storage) = &config.storage {
        values.insert("data_bucket".to_string(), storage.data_bucket.clone());
        values.insert("output_bucket".to_string(), storage.output_bucket.clone());
    }
    values
}

fn dashboard_name(config: &StackConfig) -> String {
    if config.dashboard.name.trim().is_empty() {
        format!("{}-model-costs", config.stack_id)
    } else {
        config.dashboard.name.clone()
    }
}
