//! Optional knowledge store with one bucket-backed data source.

use crate::config::{ChunkingConfig, KnowledgeStoreConfig};
use crate::context::SynthContext;
use crate::error::{Result, SynthError};
use crate::model::foundation_model_arn;
use crate::role::StorageLocation;
use crate::strategy::{ParsingStrategy, strategy_for};
use serde::{Deserialize, Serialize};

/// Chunking applied to ingested documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkingStrategy {
    FixedSize {
        max_tokens: u32,
        overlap_percentage: u32,
    },
}

impl From<ChunkingConfig> for ChunkingStrategy {
    fn from(c: ChunkingConfig) -> Self {
        ChunkingStrategy::FixedSize {
            max_tokens: c.max_tokens,
            overlap_percentage: c.overlap_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSpec {
    pub name: String,
    pub bucket_arn: String,
    pub chunking: ChunkingStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing_strategy: Option<ParsingStrategy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStoreSpec {
    pub name: String,
    pub instruction: String,
    pub embeddings_model: String,
    pub embeddings_model_arn: String,
    pub data_source: DataSourceSpec,
}

/// Build the knowledge store. `parser_code` selects the parsing strategy;
/// absent or unrecognised codes mean none.
pub fn build_knowledge_store(
    ctx: &mut SynthContext,
    config: &KnowledgeStoreConfig,
    parser_code: Option<&str>,
) -> Result<KnowledgeStoreSpec> {
    if config.name.trim().is_empty() {
        return Err(SynthError::config("knowledge_store.name", "must not be empty"));
    }
    let bucket = StorageLocation::new(&config.data_bucket).map_err(|_| {
        SynthError::config(
            "knowledge_store.data_bucket",
            format!("'{}' is not a single named bucket", config.data_bucket),
        )
    })?;

    let parsing_strategy = match parser_code {
        Some(code) => strategy_for(code, ctx),
        None => None,
    };

    Ok(KnowledgeStoreSpec {
        name: config.name.clone(),
        instruction: config.instruction.clone(),
        embeddings_model: config.embeddings_model.clone(),
        embeddings_model_arn: foundation_model_arn(&ctx.region, &config.embeddings_model),
        data_source: DataSourceSpec {
            name: format!("{}DataSource", config.name),
            bucket_arn: bucket.bucket_arn(),
            chunking: config.chunking.into(),
            parsing_strategy,
        },
    })
}
