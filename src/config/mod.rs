//! Configuration model for fleetplan.
//!
//! This module defines the StackConfig struct that represents `fleetplan.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::StackConfig;
pub use types::{
    ActionGroupConfig, AgentConfig, ChunkingConfig, DashboardConfig, FailureQueueConfig,
    HandlerConfig, HandlerLimits, InferenceConfig, KnowledgeStoreConfig, LibraryConfig,
    ModelConfig, MonitoredModelConfig, PromptOverrideConfig, PromptStage, QueryConfig,
    RegionClass, StorageConfig,
};

/// Template written by `fleetplan init`.
pub const TEMPLATE_YAML: &str = r#"# fleetplan stack configuration
stack_id: ChatbotStack
company_name: AnyCompany
agent_name: Penny
# DEFAULT | FOUNDATION_MODEL | DATA_AUTOMATION
parser_strategy: DEFAULT
account: "000000000000"
region: us-east-1
asset_root: .

libraries:
  - name: powertools

dashboard:
  name: Agents_Dashboard
  models:
    - display_name: Anthropic Claude Sonnet 3.5 v2.0
      model_id: anthropic.claude-3-5-sonnet-20241022-v2:0
      input_price: 0.003
      output_price: 0.015

agents:
  - logical_id: QnAActionsAgent
    model:
      model_id: anthropic.claude-3-5-sonnet-20241022-v2:0
      region_class: us
    instruction_file: prompt/instruction/chatbot/instruction.txt
    instruction_preamble: "You are a helpful customer service agent for {company_name} named {agent_name}."
    action_groups:
      - name: agent-account-actions
        description: Use these functions to take actions on authenticated user's accounts
        capability_base: src/backend/agents/lambda
        variant: account_actions
        handler:
          logical_id: AgentAccountActions
          entry: src/backend/agents/lambda/account_actions
          limits:
            timeout_seconds: 300
            memory_mb: 2048
            reserved_concurrency: 5
          libraries: [powertools]
          environment:
            DEBUG: "false"
"#;
