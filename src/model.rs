//! Foundation model identities and routing profiles.

use crate::config::{ModelConfig, RegionClass};
use serde::{Deserialize, Serialize};

/// Model used to parse ingested documents under the foundation-model strategy.
pub const PARSING_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

/// Default embeddings model for knowledge stores.
pub const EMBEDDINGS_MODEL_ID: &str = "amazon.titan-embed-text-v2:0";

/// Display name used when the embeddings model is monitored on a dashboard.
pub const EMBEDDINGS_DISPLAY_NAME: &str = "Amazon Titan Text Embeddings v2.0";

/// On-demand price per 1K input tokens for the embeddings model.
pub const EMBEDDINGS_INPUT_PRICE: f64 = 0.00002;

/// ARN of a foundation model in `region`. Foundation model ARNs carry no account.
pub fn foundation_model_arn(region: &str, model_id: &str) -> String {
    format!("arn:aws:bedrock:{}::foundation-model/{}", region, model_id)
}

/// A foundation model plus the routing class used to invoke it.
///
/// Chosen once per agent and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Foundation model identifier.
    pub model_id: String,
    pub region_class: RegionClass,
    /// Identifier the agent invokes: the cross-region inference profile id,
    /// or the bare model id when routing is regional.
    pub invocation_id: String,
    /// ARN of the underlying foundation model.
    pub model_arn: String,
}

impl ModelProfile {
    pub fn new(model_id: &str, region_class: RegionClass, region: &str) -> Self {
        let invocation_id = match region_class.profile_prefix() {
            Some(prefix) => format!("{}.{}", prefix, model_id),
            None => model_id.to_string(),
        };
        Self {
            model_id: model_id.to_string(),
            region_class,
            invocation_id,
            model_arn: foundation_model_arn(region, model_id),
        }
    }

    pub fn from_config(config: &ModelConfig, region: &str) -> Self {
        Self::new(&config.model_id, config.region_class, region)
    }

    /// Whether invocations may be routed outside the stack's region.
    pub fn is_cross_region(&self) -> bool {
        self.region_class != RegionClass::None
    }
}
