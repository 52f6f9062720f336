//! Configuration types and defaults for fleetplan.
//!
//! This module defines the nested sections of `fleetplan.yaml` and the
//! default value functions used by serde.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geographic routing class for a cross-region inference profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegionClass {
    /// Route within Asia Pacific regions.
    Apac,
    /// Route within United States regions.
    Us,
    /// Route within European regions.
    Eu,
    /// Route across all commercial regions.
    Global,
    /// Invoke the foundation model directly in the stack's region.
    #[default]
    None,
}

impl RegionClass {
    /// Prefix prepended to the model id to form an inference profile id.
    pub fn profile_prefix(self) -> Option<&'static str> {
        match self {
            RegionClass::Apac => Some("apac"),
            RegionClass::Us => Some("us"),
            RegionClass::Eu => Some("eu"),
            RegionClass::Global => Some("global"),
            RegionClass::None => None,
        }
    }
}

/// Agent stage a prompt override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptStage {
    PreProcessing,
    #[default]
    Orchestration,
    KnowledgeBaseResponseGeneration,
    PostProcessing,
}

/// Foundation model selection for one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Foundation model identifier, e.g. `anthropic.claude-3-5-sonnet-20241022-v2:0`.
    pub model_id: String,
    pub region_class: RegionClass,
}

/// Inference parameters attached to a prompt override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub maximum_length: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            top_k: 250,
            maximum_length: 2048,
            stop_sequences: Vec::new(),
        }
    }
}

/// A prompt override step, before its template file is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOverrideConfig {
    #[serde(default)]
    pub stage: PromptStage,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Template path relative to the asset root.
    pub template_file: String,
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Resource limits for a compute handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerLimits {
    pub timeout_seconds: u32,
    pub memory_mb: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_concurrency: Option<u32>,
}

impl Default for HandlerLimits {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            memory_mb: default_memory_mb(),
            reserved_concurrency: None,
        }
    }
}

/// Declaration of the compute handler behind an action group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Construct id of the handler, unique per stack.
    pub logical_id: String,
    /// Handler source directory relative to the asset root.
    pub entry: String,
    /// Explicit entry file name; defaults to `<basename(entry)>.py`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Explicit function name; defaults to `<file stem>-<stack_id>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    pub limits: HandlerLimits,
    /// Names of shared libraries declared under `libraries`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,
    /// Environment values; each value is a template.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Synthesize a least-privilege query role for this handler.
    pub query_access: bool,
    /// Route failed invocations to the stack's failure queue.
    pub failure_queue: bool,
}

/// An action group bound to one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionGroupConfig {
    pub name: String,
    pub description: String,
    /// Directory holding one sub-directory per contract variant.
    pub capability_base: String,
    /// Variant sub-path, e.g. `athena_actions/claude`.
    pub variant: String,
    pub handler: HandlerConfig,
}

/// Declaration of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub logical_id: String,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub instruction_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_preamble: Option<String>,
    #[serde(default = "default_true")]
    pub user_input_enabled: bool,
    #[serde(default)]
    pub code_interpreter_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompt_overrides: Vec<PromptOverrideConfig>,
    #[serde(default)]
    pub attach_knowledge_store: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_groups: Vec<ActionGroupConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            logical_id: String::new(),
            model: ModelConfig::default(),
            description: None,
            instruction_file: String::new(),
            instruction_preamble: None,
            user_input_enabled: true,
            code_interpreter_enabled: false,
            prompt_overrides: Vec::new(),
            attach_knowledge_store: false,
            action_groups: Vec::new(),
        }
    }
}

/// The storage pair a query role is scoped to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_bucket: String,
    pub output_bucket: String,
}

/// The named query execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub workgroup: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            workgroup: default_workgroup(),
        }
    }
}

/// Settings for the stack's single failure queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureQueueConfig {
    pub name_prefix: String,
}

impl Default for FailureQueueConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_queue_prefix(),
        }
    }
}

/// A shared library layer handlers may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub name: String,
    /// Local asset directory, relative to the asset root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fixed-size chunking parameters for knowledge store ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_tokens: u32,
    pub overlap_percentage: u32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            overlap_percentage: 20,
        }
    }
}

/// The optional knowledge store agents may consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeStoreConfig {
    pub name: String,
    pub instruction: String,
    pub data_bucket: String,
    pub embeddings_model: String,
    pub chunking: ChunkingConfig,
}

impl Default for KnowledgeStoreConfig {
    fn default() -> Self {
        Self {
            name: "AgentKnowledgeBase".to_string(),
            instruction: String::new(),
            data_bucket: String::new(),
            embeddings_model: default_embeddings_model(),
            chunking: ChunkingConfig::default(),
        }
    }
}

/// One monitored model with on-demand prices per 1K tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoredModelConfig {
    pub display_name: String,
    pub model_id: String,
    pub input_price: f64,
    pub output_price: f64,
}

/// Cost/usage dashboard settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub name: String,
    pub models: Vec<MonitoredModelConfig>,
}

// Default value functions for serde
pub(crate) fn default_true() -> bool {
    true
}
pub(crate) fn default_account() -> String {
    "000000000000".to_string()
}
pub(crate) fn default_region() -> String {
    "us-east-1".to_string()
}
pub(crate) fn default_asset_root() -> String {
    ".".to_string()
}
pub(crate) fn default_timeout_seconds() -> u32 {
    300
}
pub(crate) fn default_memory_mb() -> u32 {
    256
}
pub(crate) fn default_workgroup() -> String {
    "primary".to_string()
}
pub(crate) fn default_queue_prefix() -> String {
    "HandlerFailureQueue".to_string()
}
pub(crate) fn default_embeddings_model() -> String {
    "amazon.titan-embed-text-v2:0".to_string()
}
