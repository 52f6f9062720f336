//! Config loading, validation, and path resolution.

use super::model::StackConfig;
use crate::error::{Result, SynthError};
use crate::naming::{is_valid_resource_name, is_valid_stack_id};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

impl StackConfig {
    /// Load config from a YAML file.
    ///
    /// A relative `asset_root` is resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            SynthError::missing(path, format!("failed to read config file: {}", e))
        })?;

        let mut config = Self::from_yaml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: StackConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SynthError::config("<document>", format!("failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            SynthError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Absolute-or-cwd-relative directory that asset paths resolve against.
    pub fn asset_root_path(&self) -> PathBuf {
        let root = Path::new(&self.asset_root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.base_dir.join(root)
        }
    }

    /// Validate config values and return the first offending key.
    ///
    /// The parsing strategy code is deliberately not validated here: an
    /// unrecognized code degrades to "no strategy" rather than failing.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_stack_id(&self.stack_id) {
            return Err(SynthError::config(
                "stack_id",
                format!(
                    "'{}' must start with a letter and contain only letters, digits and '-'",
                    self.stack_id
                ),
            ));
        }
        require_non_blank("company_name", &self.company_name)?;
        require_non_blank("agent_name", &self.agent_name)?;
        require_non_blank("account", &self.account)?;
        require_non_blank("region", &self.region)?;

        if let Some(storage) = &self.storage {
            validate_bucket("storage.data_bucket", &storage.data_bucket)?;
            validate_bucket("storage.output_bucket", &storage.output_bucket)?;
        }
        require_non_blank("query.workgroup", &self.query.workgroup)?;
        if self.query.workgroup.contains('*') {
            return Err(SynthError::config(
                "query.workgroup",
                "must name a single workgroup, not a wildcard",
            ));
        }
        require_non_blank("failure_queue.name_prefix", &self.failure_queue.name_prefix)?;

        let mut libraries = BTreeSet::new();
        for lib in &self.libraries {
            require_non_blank("libraries.name", &lib.name)?;
            if !libraries.insert(lib.name.as_str()) {
                return Err(SynthError::config(
                    "libraries.name",
                    format!("duplicate library '{}'", lib.name),
                ));
            }
        }

        if let Some(ks) = &self.knowledge_store {
            require_non_blank("knowledge_store.name", &ks.name)?;
            validate_bucket("knowledge_store.data_bucket", &ks.data_bucket)?;
            require_non_blank("knowledge_store.embeddings_model", &ks.embeddings_model)?;
            if ks.chunking.max_tokens == 0 {
                return Err(SynthError::config(
                    "knowledge_store.chunking.max_tokens",
                    "must be greater than 0",
                ));
            }
            if ks.chunking.overlap_percentage >= 100 {
                return Err(SynthError::config(
                    "knowledge_store.chunking.overlap_percentage",
                    "must be below 100",
                ));
            }
        }

        for model in &self.dashboard.models {
            require_non_blank("dashboard.models.display_name", &model.display_name)?;
            require_non_blank("dashboard.models.model_id", &model.model_id)?;
            for (key, price) in [
                ("dashboard.models.input_price", model.input_price),
                ("dashboard.models.output_price", model.output_price),
            ] {
                if !price.is_finite() || price < 0.0 {
                    return Err(SynthError::config(
                        key,
                        format!("price for '{}' must be a non-negative number", model.model_id),
                    ));
                }
            }
        }

        self.validate_agents(&libraries)
    }

    fn validate_agents(&self, libraries: &BTreeSet<&str>) -> Result<()> {
        if self.agents.is_empty() {
            return Err(SynthError::config("agents", "at least one agent is required"));
        }

        let mut logical_ids = BTreeSet::new();
        for agent in &self.agents {
            require_non_blank("agents.logical_id", &agent.logical_id)?;
            if !logical_ids.insert(agent.logical_id.as_str()) {
                return Err(SynthError::config(
                    "agents.logical_id",
                    format!("duplicate agent '{}'", agent.logical_id),
                ));
            }
            require_non_blank("agents.model.model_id", &agent.model.model_id)?;
            require_non_blank("agents.instruction_file", &agent.instruction_file)?;

            for step in &agent.prompt_overrides {
                require_non_blank("agents.prompt_overrides.template_file", &step.template_file)?;
                let inf = &step.inference;
                if !(0.0..=1.0).contains(&inf.temperature) {
                    return Err(SynthError::config(
                        "agents.prompt_overrides.inference.temperature",
                        format!("{} is outside [0, 1]", inf.temperature),
                    ));
                }
                if !(0.0..=1.0).contains(&inf.top_p) {
                    return Err(SynthError::config(
                        "agents.prompt_overrides.inference.top_p",
                        format!("{} is outside [0, 1]", inf.top_p),
                    ));
                }
            }

            let mut group_names = BTreeSet::new();
            for group in &agent.action_groups {
                if !is_valid_resource_name(&group.name) {
                    return Err(SynthError::config(
                        "agents.action_groups.name",
                        format!("'{}' is not a valid action group name", group.name),
                    ));
                }
                if !group_names.insert(group.name.as_str()) {
                    return Err(SynthError::config(
                        "agents.action_groups.name",
                        format!(
                            "duplicate action group '{}' on agent '{}'",
                            group.name, agent.logical_id
                        ),
                    ));
                }
                require_non_blank("agents.action_groups.capability_base", &group.capability_base)?;
                require_non_blank("agents.action_groups.variant", &group.variant)?;

                let handler = &group.handler;
                require_non_blank("handler.logical_id", &handler.logical_id)?;
                require_non_blank("handler.entry", &handler.entry)?;
                if !(1..=900).contains(&handler.limits.timeout_seconds) {
                    return Err(SynthError::config(
                        "handler.limits.timeout_seconds",
                        format!("{} is outside 1..=900", handler.limits.timeout_seconds),
                    ));
                }
                if !(128..=10240).contains(&handler.limits.memory_mb) {
                    return Err(SynthError::config(
                        "handler.limits.memory_mb",
                        format!("{} is outside 128..=10240", handler.limits.memory_mb),
                    ));
                }
                for lib in &handler.libraries {
                    if !libraries.contains(lib.as_str()) {
                        return Err(SynthError::config(
                            "handler.libraries",
                            format!(
                                "handler '{}' references undeclared library '{}'",
                                handler.logical_id, lib
                            ),
                        ));
                    }
                }
                if handler.query_access && self.storage.is_none() {
                    return Err(SynthError::config(
                        "storage",
                        format!(
                            "handler '{}' requests query access but no storage pair is configured",
                            handler.logical_id
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn require_non_blank(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SynthError::config(key, "is required and must not be empty"));
    }
    Ok(())
}

fn validate_bucket(key: &str, bucket: &str) -> Result<()> {
    require_non_blank(key, bucket)?;
    if bucket.contains('*') || bucket.contains('/') {
        return Err(SynthError::config(
            key,
            format!("'{}' must be a single bucket name without wildcards or paths", bucket),
        ));
    }
    Ok(())
}
