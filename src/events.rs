//! Append-only audit log of synthesis runs.
//!
//! Events are NDJSON: one JSON object per line with
//! - `ts`: RFC3339 timestamp
//! - `action`: `init` or `synth`
//! - `actor`: `user@HOST`
//! - `stack`: stack id, when one was loaded
//! - `details`: action-specific object
//!
//! ```no_run
//! use fleetplan::events::{Event, EventAction, append_event};
//! use serde_json::json;
//!
//! let event = Event::new(EventAction::Synth)
//!     .with_stack("ChatbotStack")
//!     .with_details(json!({"handlers": 2}));
//! append_event("fleetplan.out/events.ndjson", &event)?;
//! # Ok::<(), fleetplan::error::SynthError>(())
//! ```

use crate::error::{Result, SynthError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Actions that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Template config written
    Init,
    /// Plan synthesized and written
    Synth,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Synth => write!(f, "synth"),
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    pub action: EventAction,
    /// `user@HOST` of whoever ran the command.
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub details: Value,
}

impl Event {
    /// Create an event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            stack: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_stack(mut self, stack_id: impl Into<String>) -> Self {
        self.stack = Some(stack_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SynthError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append `event` as one line to the log at `path`, creating it if needed.
pub fn append_event<P: AsRef<Path>>(path: P, event: &Event) -> Result<()> {
    let path = path.as_ref();
    let json_line = event.to_ndjson_line()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SynthError::UserError(format!(
                "failed to create events directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            SynthError::UserError(format!(
                "failed to open events file '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        SynthError::UserError(format!(
            "failed to write event to '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        SynthError::UserError(format!(
            "failed to sync events file '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read every event from the log at `path`.
pub fn read_events<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|e| {
        SynthError::UserError(format!(
            "failed to read events file '{}': {}",
            path.display(),
            e
        ))
    })?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                SynthError::UserError(format!(
                    "malformed event on line {} of '{}': {}",
                    i + 1,
                    path.display(),
                    e
                ))
            })
        })
        .collect()
}
