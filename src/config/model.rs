//! StackConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for one stack.
///
/// This struct represents the contents of `fleetplan.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    // =========================================================================
    // Identity
    // =========================================================================
    /// Owning stack id; prefixes every derived agent name.
    pub stack_id: String,

    /// Company name interpolated into instruction preambles.
    pub company_name: String,

    /// Agent display name interpolated into instruction preambles.
    pub agent_name: String,

    /// Parsing strategy code for knowledge store ingestion.
    /// Unrecognized codes are tolerated and mean "no strategy".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_strategy: Option<String>,

    // =========================================================================
    // Addressing
    // =========================================================================
    #[serde(default = "default_account")]
    pub account: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Base directory for instructions, prompts, handlers and contracts.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,

    // =========================================================================
    // Shared resources
    // =========================================================================
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    pub query: QueryConfig,

    pub failure_queue: FailureQueueConfig,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<LibraryConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_store: Option<KnowledgeStoreConfig>,

    pub dashboard: DashboardConfig,

    // =========================================================================
    // Agents
    // =========================================================================
    pub agents: Vec<AgentConfig>,

    /// Directory the config was loaded from; relative asset roots resolve here.
    #[serde(skip)]
    pub(crate) base_dir: PathBuf,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_id: String::new(),
            company_name: String::new(),
            agent_name: String::new(),
            parser_strategy: None,
            account: default_account(),
            region: default_region(),
            asset_root: default_asset_root(),
            storage: None,
            query: QueryConfig::default(),
            failure_queue: FailureQueueConfig::default(),
            libraries: Vec::new(),
            knowledge_store: None,
            dashboard: DashboardConfig::default(),
            agents: Vec::new(),
            base_dir: PathBuf::new(),
            extra: BTreeMap::new(),
        }
    }
}
