//! Implementation of the `fleetplan init` command.
//!
//! Writes a commented template stack configuration. An existing file is never
//! overwritten; the command fails instead.

use crate::cli::ConfigArgs;
use crate::config::{StackConfig, TEMPLATE_YAML};
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::fs::write_new_file;
use serde_json::json;
use std::path::Path;

/// Audit log location relative to the config's directory.
pub(crate) const INIT_EVENTS_PATH: &str = "fleetplan.out/events.ndjson";

/// Execute the `fleetplan init` command.
pub fn cmd_init(args: ConfigArgs) -> Result<()> {
    let stack_id = init_config(&args.config)?;

    println!("Wrote template stack config to {}", args.config.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the stack id, company and agent names.");
    println!("  2. Add instruction files, handler entries and contracts under the asset root.");
    println!("  3. Run `fleetplan check` to validate, then `fleetplan synth`.");
    println!();
    println!("Stack: {}", stack_id);
    Ok(())
}

/// Write the template to `path` and record the event. Returns the template's stack id.
pub(crate) fn init_config(path: &Path) -> Result<String> {
    // The template must always be a valid config.
    let template = StackConfig::from_yaml(TEMPLATE_YAML)?;
    write_new_file(path, TEMPLATE_YAML)?;
    tracing::info!(path = %path.display(), "wrote template config");

    let events_path = path
        .parent()
        .unwrap_or(Path::new("."))
        .join(INIT_EVENTS_PATH);
    let event = Event::new(EventAction::Init)
        .with_stack(&template.stack_id)
        .with_details(json!({ "config": path.display().to_string() }));
    append_event(&events_path, &event)?;

    Ok(template.stack_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynthError;
    use crate::events::read_events;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fleetplan.yaml");

        let stack_id = init_config(&path).unwrap();

        let config = StackConfig::load(&path).unwrap();
        assert_eq!(config.stack_id, stack_id);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE_YAML);
        assert!(!temp_dir.path().join(".fleetplan.yaml.tmp").exists());

        let events = read_events(temp_dir.path().join(INIT_EVENTS_PATH)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, EventAction::Init);
    }

    #[test]
    fn test_init_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fleetplan.yaml");
        std::fs::write(&path, "stack_id: Mine\n").unwrap();

        let err = init_config(&path).unwrap_err();

        assert!(matches!(err, SynthError::UserError(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "stack_id: Mine\n");
    }
}
