//! Implementation of `fleetplan synth` and `fleetplan check`.

use crate::agent::AgentSpec;
use crate::assembler::{SynthesisPlan, synthesize};
use crate::cli::{ConfigArgs, SynthArgs};
use crate::config::StackConfig;
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::fs::atomic_write_json;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Execute the `fleetplan synth` command.
pub fn cmd_synth(args: SynthArgs) -> Result<()> {
    let plan = run_synth(&args.config.config, &args.out, args.events.as_deref())?;

    print_summary(&plan);
    println!();
    println!("Plan written to {}", args.out.display());
    Ok(())
}

/// Execute the `fleetplan check` command. Writes nothing.
pub fn cmd_check(args: ConfigArgs) -> Result<()> {
    let config = StackConfig::load(&args.config)?;
    let plan = synthesize(&config)?;

    print_summary(&plan);
    println!();
    println!("Stack '{}' is valid.", plan.stack_id);
    Ok(())
}

/// Load, assemble and validate the stack, then write the plan atomically and
/// append one audit event. Nothing is written if any step fails.
pub fn run_synth(config_path: &Path, out: &Path, events: Option<&Path>) -> Result<SynthesisPlan> {
    let config = StackConfig::load(config_path)?;
    let plan = synthesize(&config)?;

    atomic_write_json(out, &plan)?;
    tracing::info!(path = %out.display(), "wrote plan");

    let events_path = events
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_events_path(out));
    let event = Event::new(EventAction::Synth)
        .with_stack(&plan.stack_id)
        .with_details(json!({
            "plan": out.display().to_string(),
            "agents": plan.agents.len(),
            "handlers": plan.handlers.len(),
            "roles": plan.roles.len(),
            "action_groups": plan.action_groups.len(),
            "diagnostics": plan.diagnostics.len(),
        }));
    append_event(&events_path, &event)?;

    Ok(plan)
}

/// Token volume the summary prices each monitored model at.
const COST_REFERENCE_TOKENS: u64 = 1_000_000;

fn default_events_path(out: &Path) -> PathBuf {
    out.parent().unwrap_or(Path::new(".")).join("events.ndjson")
}

fn print_summary(plan: &SynthesisPlan) {
    println!("Stack: {} ({} / {})", plan.stack_id, plan.account, plan.region);
    println!();
    println!("Agents:");
    for agent in &plan.agents {
        println!("  {}", agent_line(plan, agent));
        for group in &agent.action_groups {
            println!("    - {}", group);
        }
    }
    println!();
    println!("Handlers:      {}", plan.handlers.len());
    println!("Roles:         {}", plan.roles.len());
    println!("Action groups: {}", plan.action_groups.len());
    println!(
        "Failure queue: {}",
        plan.failure_queue
            .as_ref()
            .map(|q| q.name.as_str())
            .unwrap_or("none")
    );
    println!(
        "Knowledge:     {}",
        plan.knowledge_store
            .as_ref()
            .map(|kb| kb.name.as_str())
            .unwrap_or("none")
    );
    println!(
        "Dashboard:     {} ({} widgets)",
        plan.dashboard.name,
        plan.dashboard.widgets.len()
    );
    for line in cost_lines(plan) {
        println!("  {}", line);
    }

    if !plan.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        for diagnostic in &plan.diagnostics {
            println!("  {}", diagnostic);
        }
    }
}

fn agent_line(plan: &SynthesisPlan, agent: &AgentSpec) -> String {
    let version = plan
        .alias_for(&agent.name)
        .map(|a| format!("{} -> v{}", a.name, a.version))
        .unwrap_or_else(|| "no alias".to_string());
    let routing = if agent.model.is_cross_region() {
        "cross-region"
    } else {
        "regional"
    };
    format!(
        "{:<40} {:<10} {} ({}) [{}]",
        agent.name,
        agent.state.to_string(),
        agent.model.invocation_id,
        routing,
        version
    )
}

/// Estimated on-demand cost per model for a reference volume of tokens.
fn cost_lines(plan: &SynthesisPlan) -> Vec<String> {
    plan.dashboard
        .monitors()
        .map(|m| {
            format!(
                "{:<40} ${:.4} per {}K input + {}K output tokens",
                m.display_name,
                m.estimate_cost(COST_REFERENCE_TOKENS, COST_REFERENCE_TOKENS),
                COST_REFERENCE_TOKENS / 1000,
                COST_REFERENCE_TOKENS / 1000
            )
        })
        .collect()
}
