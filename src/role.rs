//! Least-privilege execution roles for query handlers.
//!
//! A role carries exactly these statement groups, in order:
//!
//! 1. query execution, scoped to one named workgroup
//! 2. catalog read, scoped to the catalog root plus `database/*` and `table/*`
//! 3. storage read/write, scoped to two named buckets and their objects
//! 4. failure-queue send, only when a queue was supplied
//!
//! Every call produces an independent role. Roles are never shared between
//! handlers, even when the storage pair is identical.

use crate::context::{HANDLER_SERVICE_PRINCIPAL, SynthContext};
use crate::error::{Result, SynthError};
use crate::queue::QueueRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Managed policy granting handlers permission to write their own logs.
pub const BASIC_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

const QUERY_ACTIONS: &[&str] = &[
    "athena:StartQueryExecution",
    "athena:GetQueryExecution",
    "athena:GetQueryResults",
];

const CATALOG_ACTIONS: &[&str] = &[
    "glue:GetDatabase",
    "glue:GetTable",
    "glue:GetTables",
    "glue:GetPartitions",
];

const STORAGE_ACTIONS: &[&str] = &[
    "s3:GetBucketLocation",
    "s3:GetObject",
    "s3:ListBucket",
    "s3:PutObject",
];

const QUEUE_ACTIONS: &[&str] = &["sqs:SendMessage"];

/// Resources no statement may ever name.
const FORBIDDEN_RESOURCES: &[&str] = &["*", "arn:aws:s3:::*", "arn:aws:s3:::*/*"];

/// Reference to a synthesized role by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRef(String);

impl RoleRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named storage bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    bucket: String,
}

impl StorageLocation {
    /// A bucket name; wildcards and path separators are rejected.
    pub fn new(bucket: &str) -> Result<Self> {
        let bucket = bucket.trim();
        if bucket.is_empty() || bucket.contains('*') || bucket.contains('/') {
            return Err(SynthError::config(
                "storage",
                format!("'{}' is not a single named bucket", bucket),
            ));
        }
        Ok(Self {
            bucket: bucket.to_string(),
        })
    }

    pub fn bucket_arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.bucket)
    }

    pub fn objects_arn(&self) -> String {
        format!("arn:aws:s3:::{}/*", self.bucket)
    }
}

/// One (actions, resources) statement group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub sid: String,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl PolicyStatement {
    fn new(sid: &str, actions: &[&str], resources: Vec<String>) -> Self {
        Self {
            sid: sid.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
        }
    }
}

/// An execution role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    /// Service principal allowed to assume the role.
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
    pub statements: Vec<PolicyStatement>,
}

impl RoleSpec {
    /// Build the statement groups for a storage pair.
    pub fn least_privilege(
        ctx: &SynthContext,
        name: &str,
        data: &StorageLocation,
        output: &StorageLocation,
        workgroup: &str,
        queue_arn: Option<&str>,
    ) -> Result<Self> {
        let workgroup = workgroup.trim();
        if workgroup.is_empty() || workgroup.contains('*') {
            return Err(SynthError::config(
                "query.workgroup",
                "a role must be scoped to one named workgroup",
            ));
        }

        let mut statements = vec![
            PolicyStatement::new(
                "QueryExecution",
                QUERY_ACTIONS,
                vec![ctx.arn("athena", &format!("workgroup/{}", workgroup))],
            ),
            PolicyStatement::new(
                "CatalogRead",
                CATALOG_ACTIONS,
                vec![
                    ctx.arn("glue", "catalog"),
                    ctx.arn("glue", "database/*"),
                    ctx.arn("glue", "table/*"),
                ],
            ),
            PolicyStatement::new(
                "StorageReadWrite",
                STORAGE_ACTIONS,
                vec![
                    data.bucket_arn(),
                    data.objects_arn(),
                    output.bucket_arn(),
                    output.objects_arn(),
                ],
            ),
        ];
        if let Some(arn) = queue_arn {
            statements.push(PolicyStatement::new(
                "FailureQueueSend",
                QUEUE_ACTIONS,
                vec![arn.to_string()],
            ));
        }

        let spec = Self {
            name: name.to_string(),
            assumed_by: HANDLER_SERVICE_PRINCIPAL.to_string(),
            managed_policies: vec![BASIC_EXECUTION_POLICY.to_string()],
            statements,
        };
        spec.check_least_privilege(queue_arn.is_some())?;
        Ok(spec)
    }

    /// Check the statement-group invariants.
    pub fn check_least_privilege(&self, has_queue: bool) -> Result<()> {
        let expected = if has_queue { 4 } else { 3 };
        if self.statements.len() != expected {
            return Err(SynthError::InvalidPlan(format!(
                "role '{}' has {} statement groups, expected {}",
                self.name,
                self.statements.len(),
                expected
            )));
        }
        if self.has_queue_statement() != has_queue {
            return Err(SynthError::InvalidPlan(format!(
                "role '{}' failure queue statement does not match its handler",
                self.name
            )));
        }
        for statement in &self.statements {
            for resource in &statement.resources {
                if FORBIDDEN_RESOURCES.contains(&resource.as_str())
                    || resource.ends_with(":workgroup/*")
                {
                    return Err(SynthError::InvalidPlan(format!(
                        "role '{}' statement '{}' uses unscoped resource '{}'",
                        self.name, statement.sid, resource
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether the role may send to the failure queue.
    pub fn has_queue_statement(&self) -> bool {
        self.statements.iter().any(|s| s.sid == "FailureQueueSend")
    }
}

/// Synthesize a role for `data`/`output` and register it on the run.
pub fn synthesize_role(
    ctx: &mut SynthContext,
    name: &str,
    data: &StorageLocation,
    output: &StorageLocation,
    workgroup: &str,
    queue: Option<&QueueRef>,
) -> Result<RoleRef> {
    let queue_arn = match queue {
        Some(q) => match ctx.failure_queue() {
            Some(spec) if spec.name == q.as_str() => Some(spec.arn.clone()),
            _ => {
                return Err(SynthError::InvalidPlan(format!(
                    "role '{}' references unknown queue '{}'",
                    name, q
                )));
            }
        },
        None => None,
    };
    let spec = RoleSpec::least_privilege(ctx, name, data, output, workgroup, queue_arn.as_deref())?;
    ctx.register_role(spec)
}
