//! Agent specification construction and attachment.

use super::lifecycle::AgentState;
use crate::config::{AgentConfig, InferenceConfig, PromptStage, StackConfig};
use crate::context::SynthContext;
use crate::error::{Result, SynthError};
use crate::model::ModelProfile;
use crate::naming;
use crate::template::{render_template, vars};
use serde::{Deserialize, Serialize};

/// A prompt override with its template text already read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOverrideStep {
    pub stage: PromptStage,
    pub enabled: bool,
    pub template: String,
    pub inference: InferenceConfig,
}

/// A fully resolved agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Deterministic name: `<stack_id>-<logical_id>`.
    pub name: String,
    pub logical_id: String,
    pub arn: String,
    pub model: ModelProfile,
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_input_enabled: bool,
    pub code_interpreter_enabled: bool,
    /// Always true: an alias may only point at a built version.
    pub should_prepare: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompt_overrides: Vec<PromptOverrideStep>,
    /// Names of attached action groups, in binding order.
    pub action_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_store: Option<String>,
    pub state: AgentState,
}

impl AgentSpec {
    /// Resolve one declared agent, reading its instruction and
    /// prompt templates from the asset root.
    pub fn define(ctx: &SynthContext, stack: &StackConfig, config: &AgentConfig) -> Result<Self> {
        let name = naming::agent_name(&ctx.stack_id, &config.logical_id)?;

        let body = ctx.read_asset(&config.instruction_file)?;
        let instruction = match &config.instruction_preamble {
            Some(preamble) => {
                let values = vars([
                    ("company_name", stack.company_name.as_str()),
                    ("agent_name", stack.agent_name.as_str()),
                    ("stack_id", ctx.stack_id.as_str()),
                    ("variant", config.logical_id.as_str()),
                ]);
                let rendered = render_template(preamble, &values).map_err(|e| {
                    SynthError::config(
                        format!("agents.{}.instruction_preamble", config.logical_id),
                        e.to_string(),
                    )
                })?;
                format!("{}\n{}", rendered, body)
            }
            None => body,
        };

        let prompt_overrides = config
            .prompt_overrides
            .iter()
            .map(|o| {
                Ok(PromptOverrideStep {
                    stage: o.stage,
                    enabled: o.enabled,
                    template: ctx.read_asset(&o.template_file)?,
                    inference: o.inference.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let arn = ctx.arn("bedrock", &format!("agent/{}", name));

        Ok(Self {
            name,
            logical_id: config.logical_id.clone(),
            arn,
            model: ModelProfile::from_config(&config.model, &ctx.region),
            instruction,
            description: config.description.clone(),
            user_input_enabled: config.user_input_enabled,
            code_interpreter_enabled: config.code_interpreter_enabled,
            should_prepare: true,
            prompt_overrides,
            action_groups: Vec::new(),
            knowledge_store: None,
            state: AgentState::Defined,
        })
    }

    /// Stage an action group so the prepared build includes it.
    pub fn attach_action_group(&mut self, group_name: &str) -> Result<()> {
        if self.state != AgentState::Defined {
            return Err(SynthError::InvalidPlan(format!(
                "action group '{}' attached to agent '{}' after it was {}",
                group_name, self.name, self.state
            )));
        }
        if self.action_groups.iter().any(|g| g == group_name) {
            return Err(SynthError::config(
                format!("agents.{}.action_groups", self.logical_id),
                format!("action group '{}' is bound twice", group_name),
            ));
        }
        self.action_groups.push(group_name.to_string());
        Ok(())
    }

    /// Attach a knowledge store to an aliased agent.
    pub fn attach_knowledge_store(&mut self, store_name: &str) -> Result<()> {
        if self.state != AgentState::Aliased {
            return Err(SynthError::InvalidPlan(format!(
                "knowledge store '{}' attached to agent '{}' while {}",
                store_name, self.name, self.state
            )));
        }
        self.knowledge_store = Some(store_name.to_string());
        Ok(())
    }

    pub fn has_attachments(&self) -> bool {
        !self.action_groups.is_empty() || self.knowledge_store.is_some()
    }

    /// Move to `to`, which must be the immediate successor of the current state.
    pub fn advance(&mut self, to: AgentState) -> Result<()> {
        if self.state.next() != Some(to) {
            return Err(SynthError::InvalidPlan(format!(
                "agent '{}' cannot move from {} to {}",
                self.name, self.state, to
            )));
        }
        tracing::debug!(agent = %self.name, from = %self.state, to = %to, "agent transition");
        self.state = to;
        Ok(())
    }
}
