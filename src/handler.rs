//! Compute handler factory.
//!
//! Builds a handler spec from an entry directory plus limits, role, libraries,
//! environment and an optional failure queue, then registers it on the run so
//! later steps can grant invocation permissions against it.

use crate::assets;
use crate::config::{HandlerLimits, LibraryConfig};
use crate::context::SynthContext;
use crate::error::{Result, SynthError};
use crate::naming;
use crate::queue::QueueRef;
use crate::role::RoleRef;
use crate::template::{Vars, render_template};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Runtime every handler is packaged for.
pub const HANDLER_RUNTIME: &str = "python3.11";

/// Function inside the entry file the platform calls.
pub const HANDLER_ENTRY_FUNCTION: &str = "lambda_handler";

/// Reference to a registered handler by function name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(String);

impl HandlerRef {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self(function_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs to [`create_handler`].
#[derive(Debug, Clone, Default)]
pub struct HandlerProps {
    pub logical_id: String,
    /// Entry directory relative to the asset root.
    pub entry: String,
    pub file_name: Option<String>,
    pub function_name: Option<String>,
    pub limits: HandlerLimits,
    pub role: Option<RoleRef>,
    pub libraries: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub failure_queue: Option<QueueRef>,
}

/// A resolved compute handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub logical_id: String,
    pub function_name: String,
    pub file_name: String,
    /// Entry directory as declared.
    pub entry: String,
    pub runtime: String,
    /// `<file stem>.<entry function>`.
    pub handler: String,
    pub limits: HandlerLimits,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_queue: Option<QueueRef>,
}

/// Build a handler and register it on the run.
///
/// The entry directory and its entry file must exist. A function name already
/// used in this run is a configuration error.
pub fn create_handler(ctx: &mut SynthContext, props: HandlerProps) -> Result<HandlerRef> {
    if props.entry.trim().is_empty() {
        return Err(SynthError::config(
            "handler.entry",
            format!("handler '{}' has no entry path", props.logical_id),
        ));
    }
    let entry_dir = assets::require_dir(ctx.asset_root(), &props.entry)?;

    let file_name = match props.file_name {
        Some(name) => name,
        None => naming::default_file_name(&props.entry)?,
    };
    assets::require_file(&entry_dir.join(&file_name))?;

    let function_name = props
        .function_name
        .unwrap_or_else(|| naming::default_function_name(&file_name, &ctx.stack_id));

    if let Some(role) = &props.role
        && ctx.role(role.as_str()).is_none()
    {
        return Err(SynthError::InvalidPlan(format!(
            "handler '{}' references role '{}' before it was synthesized",
            function_name, role
        )));
    }
    if let Some(queue) = &props.failure_queue
        && ctx.failure_queue().is_none_or(|q| q.name != queue.as_str())
    {
        return Err(SynthError::InvalidPlan(format!(
            "handler '{}' references unknown failure queue '{}'",
            function_name, queue
        )));
    }

    let stem = file_name
        .strip_suffix(&format!(".{}", naming::HANDLER_FILE_EXTENSION))
        .unwrap_or(&file_name);
    let spec = HandlerSpec {
        logical_id: props.logical_id,
        handler: format!("{}.{}", stem, HANDLER_ENTRY_FUNCTION),
        function_name,
        file_name,
        entry: props.entry,
        runtime: HANDLER_RUNTIME.to_string(),
        limits: props.limits,
        role: props.role,
        libraries: props.libraries,
        environment: props.environment,
        failure_queue: props.failure_queue,
    };
    ctx.register_handler(spec)
}

/// Render each environment value as a template.
pub fn render_environment(
    environment: &BTreeMap<String, String>,
    variables: &Vars,
) -> Result<BTreeMap<String, String>> {
    environment
        .iter()
        .map(|(key, value)| {
            let rendered = render_template(value, variables).map_err(|e| {
                SynthError::config(format!("handler.environment.{}", key), e.to_string())
            })?;
            Ok((key.clone(), rendered))
        })
        .collect()
}

/// A shared library layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Declare a library; its asset directory, when given, must exist.
pub fn declare_library(ctx: &SynthContext, config: &LibraryConfig) -> Result<LibrarySpec> {
    if let Some(asset) = &config.asset {
        assets::require_dir(ctx.asset_root(), asset)?;
    }
    Ok(LibrarySpec {
        name: config.name.clone(),
        asset: config.asset.clone(),
        description: config.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::vars;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SynthContext) {
        let dir = TempDir::new().unwrap();
        let entry = dir.path().join("lambda/athena_actions/claude/account_actions");
        fs::create_dir_all(&entry).unwrap();
        fs::write(entry.join("account_actions.py"), "def lambda_handler(e, c): pass\n").unwrap();
        let ctx = SynthContext::new("ChatbotStack", "123456789012", "us-east-1", dir.path());
        (dir, ctx)
    }

    fn props() -> HandlerProps {
        HandlerProps {
            logical_id: "AccountActions".to_string(),
            entry: "lambda/athena_actions/claude/account_actions".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_names_default_from_entry_and_stack() {
        let (_dir, mut ctx) = fixture();
        let handler = create_handler(&mut ctx, props()).unwrap();
        let spec = ctx.handler(handler.as_str()).unwrap();
        assert_eq!(spec.file_name, "account_actions.py");
        assert_eq!(spec.function_name, "account_actions-ChatbotStack");
        assert!(spec.function_name.contains("ChatbotStack"));
        assert_eq!(spec.handler, "account_actions.lambda_handler");
        assert_eq!(spec.runtime, HANDLER_RUNTIME);
    }

    #[test]
    fn test_explicit_names_win() {
        let (dir, mut ctx) = fixture();
        let entry = dir.path().join("lambda/athena_actions/claude/account_actions");
        fs::write(entry.join("main.py"), "").unwrap();
        let mut p = props();
        p.file_name = Some("main.py".to_string());
        p.function_name = Some("accounts".to_string());
        let handler = create_handler(&mut ctx, p).unwrap();
        assert_eq!(handler.as_str(), "accounts");
        assert_eq!(ctx.handler("accounts").unwrap().handler, "main.lambda_handler");
    }

    #[test]
    fn test_missing_entry_is_missing_resource() {
        let (_dir, mut ctx) = fixture();
        let mut p = props();
        p.entry = "lambda/nowhere".to_string();
        assert!(matches!(
            create_handler(&mut ctx, p),
            Err(SynthError::MissingResource { .. })
        ));
    }

    #[test]
    fn test_missing_entry_file_is_missing_resource() {
        let (_dir, mut ctx) = fixture();
        let mut p = props();
        p.file_name = Some("absent.py".to_string());
        assert!(matches!(
            create_handler(&mut ctx, p),
            Err(SynthError::MissingResource { .. })
        ));
    }

    #[test]
    fn test_function_name_collision_is_configuration_error() {
        let (_dir, mut ctx) = fixture();
        create_handler(&mut ctx, props()).unwrap();
        assert!(matches!(
            create_handler(&mut ctx, props()),
            Err(SynthError::Configuration { .. })
        ));
    }

    #[test]
    fn test_unsynthesized_role_is_rejected() {
        let (_dir, mut ctx) = fixture();
        let mut p = props();
        p.role = Some(RoleRef::new("LaterRole"));
        assert!(matches!(
            create_handler(&mut ctx, p),
            Err(SynthError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_environment_values_are_rendered() {
        let env = BTreeMap::from([("BUCKET".to_string(), "{data_bucket}".to_string())]);
        let rendered =
            render_environment(&env, &vars([("data_bucket", "sales-data")])).unwrap();
        assert_eq!(rendered["BUCKET"], "sales-data");
        assert!(render_environment(&env, &Vars::new()).is_err());
    }

    #[test]
    fn test_library_asset_must_exist() {
        let (dir, ctx) = fixture();
        fs::create_dir_all(dir.path().join("layers/powertools")).unwrap();
        let ok = LibraryConfig {
            name: "powertools".to_string(),
            asset: Some("layers/powertools".to_string()),
            description: None,
        };
        assert!(declare_library(&ctx, &ok).is_ok());
        let missing = LibraryConfig {
            asset: Some("layers/absent".to_string()),
            ..ok
        };
        assert!(declare_library(&ctx, &missing).is_err());
    }
}
