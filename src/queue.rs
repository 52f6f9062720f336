//! The stack's failure queue.

use crate::context::SynthContext;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side encryption applied to the failure queue.
pub const QUEUE_ENCRYPTION: &str = "SQS_MANAGED";

/// Reference to the run's failure queue by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueRef(String);

impl QueueRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure-routing destination shared by every handler that opts in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSpec {
    /// `<prefix>-<account>-<region>`.
    pub name: String,
    pub arn: String,
    pub encryption: String,
    /// Deny any access that is not over TLS.
    pub enforce_ssl: bool,
}

impl QueueSpec {
    pub fn new(ctx: &SynthContext, name_prefix: &str) -> Self {
        let name = format!("{}-{}-{}", name_prefix, ctx.account, ctx.region);
        Self {
            arn: ctx.arn("sqs", &name),
            name,
            encryption: QUEUE_ENCRYPTION.to_string(),
            enforce_ssl: true,
        }
    }
}
