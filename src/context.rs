//! Per-run synthesis context.
//!
//! A [`SynthContext`] is created by the caller of the assembler, passed by
//! reference into every builder, and dropped when the run ends. It owns the
//! only mutable state of a run: the handler and role registries, the single
//! failure queue, invocation grants, and collected diagnostics. Nothing here
//! is global, so independent runs can never observe each other's resources.

use crate::action_group::PermissionGrant;
use crate::assets;
use crate::config::StackConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Result, SynthError};
use crate::handler::{HandlerRef, HandlerSpec};
use crate::queue::{QueueRef, QueueSpec};
use crate::role::{RoleRef, RoleSpec};
use std::path::{Path, PathBuf};

/// Service principal the agent platform invokes handlers as.
pub const AGENT_SERVICE_PRINCIPAL: &str = "bedrock.amazonaws.com";

/// Service principal handlers execute as.
pub const HANDLER_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";

/// State owned by exactly one synthesis run.
#[derive(Debug)]
pub struct SynthContext {
    /// Owning stack id.
    pub stack_id: String,
    pub account: String,
    pub region: String,
    /// Directory asset paths resolve against.
    pub asset_root: PathBuf,

    handlers: Vec<HandlerSpec>,
    roles: Vec<RoleSpec>,
    failure_queue: Option<QueueSpec>,
    grants: Vec<PermissionGrant>,
    diagnostics: Vec<Diagnostic>,
}

impl SynthContext {
    pub fn new(
        stack_id: impl Into<String>,
        account: impl Into<String>,
        region: impl Into<String>,
        asset_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stack_id: stack_id.into(),
            account: account.into(),
            region: region.into(),
            asset_root: asset_root.into(),
            handlers: Vec::new(),
            roles: Vec::new(),
            failure_queue: None,
            grants: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Create a fresh context for one run of `config`.
    pub fn for_config(config: &StackConfig) -> Self {
        Self::new(
            &config.stack_id,
            &config.account,
            &config.region,
            config.asset_root_path(),
        )
    }

    /// Regional, account-scoped ARN: `arn:aws:{service}:{region}:{account}:{resource}`.
    pub fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:aws:{}:{}:{}:{}",
            service, self.region, self.account, resource
        )
    }

    /// Scoped read of a text asset.
    pub fn read_asset(&self, rel: &str) -> Result<String> {
        assets::read_text(&self.asset_root, rel)
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    // =========================================================================
    // Handler registry
    // =========================================================================

    /// Register a handler. Function names are unique within a run.
    pub(crate) fn register_handler(&mut self, spec: HandlerSpec) -> Result<HandlerRef> {
        if self.handler(&spec.function_name).is_some() {
            return Err(SynthError::config(
                "handler.function_name",
                format!(
                    "function name '{}' is already used by another handler in stack '{}'",
                    spec.function_name, self.stack_id
                ),
            ));
        }
        let handler_ref = HandlerRef::new(&spec.function_name);
        tracing::debug!(function = %spec.function_name, "registered handler");
        self.handlers.push(spec);
        Ok(handler_ref)
    }

    pub fn handler(&self, function_name: &str) -> Option<&HandlerSpec> {
        self.handlers.iter().find(|h| h.function_name == function_name)
    }

    /// Registered handlers in construction order.
    pub fn handlers(&self) -> &[HandlerSpec] {
        &self.handlers
    }

    // =========================================================================
    // Role registry
    // =========================================================================

    /// Register a role. Role names are unique within a run.
    pub(crate) fn register_role(&mut self, spec: RoleSpec) -> Result<RoleRef> {
        if self.role(&spec.name).is_some() {
            return Err(SynthError::config(
                "handler.logical_id",
                format!("role '{}' is already defined; roles are never shared", spec.name),
            ));
        }
        let role_ref = RoleRef::new(&spec.name);
        tracing::debug!(role = %spec.name, statements = spec.statements.len(), "registered role");
        self.roles.push(spec);
        Ok(role_ref)
    }

    pub fn role(&self, name: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Registered roles in construction order.
    pub fn roles(&self) -> &[RoleSpec] {
        &self.roles
    }

    // =========================================================================
    // Failure queue
    // =========================================================================

    /// The run's failure queue, created on first use.
    pub(crate) fn failure_queue_or_create(&mut self, name_prefix: &str) -> QueueRef {
        let spec = match self.failure_queue.take() {
            Some(existing) => existing,
            None => {
                let created = QueueSpec::new(self, name_prefix);
                tracing::debug!(queue = %created.name, "created failure queue");
                created
            }
        };
        let queue_ref = QueueRef::new(&spec.name);
        self.failure_queue = Some(spec);
        queue_ref
    }

    pub fn failure_queue(&self) -> Option<&QueueSpec> {
        self.failure_queue.as_ref()
    }

    // =========================================================================
    // Invocation grants
    // =========================================================================

    /// Allow the agent service to invoke `handler` on behalf of `agent_arn`.
    ///
    /// Granting twice for the same pair is a no-op.
    pub fn grant_invoke(&mut self, handler: &HandlerRef, agent_arn: &str) -> Result<()> {
        if self.handler(handler.as_str()).is_none() {
            return Err(SynthError::InvalidPlan(format!(
                "cannot grant invocation of unknown handler '{}'",
                handler
            )));
        }
        if !self.has_grant(handler, agent_arn) {
            self.grants.push(PermissionGrant {
                handler: handler.clone(),
                principal: AGENT_SERVICE_PRINCIPAL.to_string(),
                source_arn: agent_arn.to_string(),
            });
        }
        Ok(())
    }

    pub fn has_grant(&self, handler: &HandlerRef, agent_arn: &str) -> bool {
        self.grants
            .iter()
            .any(|g| &g.handler == handler && g.source_arn == agent_arn)
    }

    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl DiagnosticSink for SynthContext {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.emit(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_is_region_and_account_scoped() {
        let ctx = SynthContext::new("Stack", "123456789012", "ap-northeast-2", ".");
        assert_eq!(
            ctx.arn("athena", "workgroup/primary"),
            "arn:aws:athena:ap-northeast-2:123456789012:workgroup/primary"
        );
    }

    #[test]
    fn test_failure_queue_created_once() {
        let mut ctx = SynthContext::new("Stack", "123456789012", "us-east-1", ".");
        let a = ctx.failure_queue_or_create("Dlq");
        let b = ctx.failure_queue_or_create("Ignored");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Dlq-123456789012-us-east-1");
        let queue = ctx.failure_queue().unwrap();
        assert_eq!(queue.name, a.as_str());
        assert_eq!(queue.arn, "arn:aws:sqs:us-east-1:123456789012:Dlq-123456789012-us-east-1");
    }

    #[test]
    fn test_contexts_do_not_share_registries() {
        let mut first = SynthContext::new("Stack", "1", "us-east-1", ".");
        first.failure_queue_or_create("Dlq");
        let second = SynthContext::new("Stack", "1", "us-east-1", ".");
        assert!(second.failure_queue().is_none());
        assert!(second.handlers().is_empty());
    }
}
