//! Tests for resource graph assembly.

use super::*;
use crate::dashboard::Widget;
use crate::diagnostics::DiagnosticKind;
use crate::strategy::ParsingStrategy;
use crate::test_support::{create_test_stack, load_test_stack};

#[test]
fn test_two_agents_form_independent_subgraphs() {
    let dir = create_test_stack();
    let config = load_test_stack(&dir);
    let plan = synthesize(&config).unwrap();

    assert_eq!(plan.agents.len(), 2);
    let alpha = plan.agent("FleetStack-AlphaAgent").unwrap();
    let beta = plan.agent("FleetStack-BetaAgent").unwrap();
    assert_eq!(
        alpha.model.invocation_id,
        "us.anthropic.claude-3-5-sonnet-20241022-v2:0"
    );
    assert_eq!(beta.model.invocation_id, "amazon.nova-pro-v1:0");

    // No role instance is shared.
    assert_eq!(plan.roles.len(), 2);
    let alpha_handler = plan.handler("alpha_actions-FleetStack").unwrap();
    let beta_handler = plan.handler("beta_actions-FleetStack").unwrap();
    assert_ne!(alpha_handler.role, beta_handler.role);

    // Each alias resolves to its own agent's built version.
    for agent in [alpha, beta] {
        let alias = plan.alias_for(&agent.name).unwrap();
        assert_eq!(alias.name, "latest");
        assert_eq!(alias.version, "1");
        assert_eq!(alias.token, format!("{}|1", agent.name));
        assert!(agent.state.is_prepared());
    }

    // Each action group is bound only to its own agent.
    let alpha_groups: Vec<_> = plan
        .action_groups
        .iter()
        .filter(|g| g.agent == alpha.name)
        .collect();
    assert_eq!(alpha_groups.len(), 1);
    assert_eq!(alpha_groups[0].handler.as_str(), "alpha_actions-FleetStack");
    assert_eq!(alpha_groups[0].contract, "schema/athena_actions/alpha/schema.json");
    let beta_groups: Vec<_> = plan
        .action_groups
        .iter()
        .filter(|g| g.agent == beta.name)
        .collect();
    assert_eq!(beta_groups.len(), 1);
    assert_eq!(beta_groups[0].handler.as_str(), "beta_actions-FleetStack");
}

#[test]
fn test_agents_finish_bound_with_instruction_and_overrides() {
    let dir = create_test_stack();
    let plan = synthesize(&load_test_stack(&dir)).unwrap();

    let alpha = plan.agent("FleetStack-AlphaAgent").unwrap();
    assert_eq!(alpha.state, AgentState::Bound);
    assert_eq!(
        alpha.instruction,
        "You are Penny, an assistant for AnyCompany.\nAnswer questions about sales data."
    );
    assert_eq!(alpha.prompt_overrides.len(), 1);
    assert_eq!(alpha.prompt_overrides[0].template, "$instruction$\n$tools$");
    assert_eq!(alpha.knowledge_store.as_deref(), Some("HandbookKnowledgeBase"));

    let beta = plan.agent("FleetStack-BetaAgent").unwrap();
    assert_eq!(beta.state, AgentState::Bound);
    assert!(beta.knowledge_store.is_none());
}

#[test]
fn test_failure_queue_is_shared_and_only_where_requested() {
    let dir = create_test_stack();
    let plan = synthesize(&load_test_stack(&dir)).unwrap();

    let queue = plan.failure_queue.as_ref().unwrap();
    assert_eq!(queue.name, "HandlerFailureQueue-123456789012-us-west-2");

    let alpha = plan.handler("alpha_actions-FleetStack").unwrap();
    let beta = plan.handler("beta_actions-FleetStack").unwrap();
    assert_eq!(alpha.failure_queue.as_ref().map(|q| q.as_str()), Some(queue.name.as_str()));
    assert!(beta.failure_queue.is_none());

    let alpha_role = plan.role(alpha.role.as_ref().unwrap().as_str()).unwrap();
    let beta_role = plan.role(beta.role.as_ref().unwrap().as_str()).unwrap();
    assert_eq!(alpha_role.statements.len(), 4);
    assert_eq!(beta_role.statements.len(), 3);
}

#[test]
fn test_handler_environment_and_libraries() {
    let dir = create_test_stack();
    let plan = synthesize(&load_test_stack(&dir)).unwrap();

    let alpha = plan.handler("alpha_actions-FleetStack").unwrap();
    assert_eq!(alpha.environment["OUTPUT_LOCATION"], "s3://query-results/results/");
    assert_eq!(alpha.libraries, vec!["powertools"]);
    assert_eq!(plan.libraries.len(), 1);
}

#[test]
fn test_grants_precede_bindings() {
    let dir = create_test_stack();
    let plan = synthesize(&load_test_stack(&dir)).unwrap();

    assert_eq!(plan.grants.len(), 2);
    for group in &plan.action_groups {
        let agent = plan.agent(&group.agent).unwrap();
        assert!(
            plan.grants
                .iter()
                .any(|g| g.handler == group.handler && g.source_arn == agent.arn)
        );
    }
}

#[test]
fn test_dashboard_lists_embeddings_then_configured_models() {
    let dir = create_test_stack();
    let plan = synthesize(&load_test_stack(&dir)).unwrap();

    assert_eq!(plan.dashboard.name, "FleetCosts");
    assert_eq!(plan.dashboard.widgets[0], Widget::AllModels);
    let names: Vec<_> = plan
        .dashboard
        .monitors()
        .map(|m| m.display_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Amazon Titan Text Embeddings v2.0", "Claude 3.5 Sonnet v2", "Nova Pro"]
    );
}

#[test]
fn test_knowledge_store_uses_configured_parsing_strategy() {
    let dir = create_test_stack();
    let plan = synthesize(&load_test_stack(&dir)).unwrap();

    let kb = plan.knowledge_store.as_ref().unwrap();
    assert!(matches!(
        kb.data_source.parsing_strategy,
        Some(ParsingStrategy::FoundationModel { .. })
    ));
    assert!(plan.diagnostics.is_empty());
}

#[test]
fn test_identical_config_yields_identical_plan() {
    let dir = create_test_stack();
    let config = load_test_stack(&dir);
    let first = serde_json::to_string(&synthesize(&config).unwrap()).unwrap();
    let second = serde_json::to_string(&synthesize(&config).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_handler_entry_aborts_run() {
    let dir = create_test_stack();
    std::fs::remove_dir_all(dir.path().join("lambda/beta")).unwrap();
    let err = synthesize(&load_test_stack(&dir)).unwrap_err();
    assert!(matches!(err, SynthError::MissingResource { .. }));
}

#[test]
fn test_missing_contract_aborts_run() {
    let dir = create_test_stack();
    std::fs::remove_file(dir.path().join("schema/athena_actions/beta/schema.json")).unwrap();
    let err = synthesize(&load_test_stack(&dir)).unwrap_err();
    assert!(matches!(err, SynthError::MissingResource { .. }));
}

#[test]
fn test_missing_instruction_aborts_run() {
    let dir = create_test_stack();
    std::fs::remove_file(dir.path().join("prompt/alpha/instruction.txt")).unwrap();
    assert!(synthesize(&load_test_stack(&dir)).is_err());
}

#[test]
fn test_absent_knowledge_store_is_skipped() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    config.knowledge_store = None;
    let plan = synthesize(&config).unwrap();

    assert!(plan.knowledge_store.is_none());
    let alpha = plan.agent("FleetStack-AlphaAgent").unwrap();
    assert!(alpha.knowledge_store.is_none());
    assert_eq!(plan.dashboard.monitors().count(), 2);
}

#[test]
fn test_data_automation_degrades_with_one_diagnostic() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    config.parser_strategy = Some("DATA_AUTOMATION".to_string());
    let plan = synthesize(&config).unwrap();

    let kb = plan.knowledge_store.as_ref().unwrap();
    assert!(kb.data_source.parsing_strategy.is_none());
    assert_eq!(plan.diagnostics.len(), 1);
    assert_eq!(plan.diagnostics[0].kind, DiagnosticKind::UnimplementedStrategy);
}

#[test]
fn test_agent_without_attachments_stays_aliased() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    config.agents[1].action_groups.clear();
    let plan = synthesize(&config).unwrap();

    let beta = plan.agent("FleetStack-BetaAgent").unwrap();
    assert_eq!(beta.state, AgentState::Aliased);
    assert!(plan.alias_for(&beta.name).is_some());
}

#[test]
fn test_same_handler_backs_groups_on_independent_agents() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    let shared = config.agents[0].action_groups[0].handler.clone();
    config.agents[1].action_groups[0].handler = shared;
    let plan = synthesize(&config).unwrap();

    assert_eq!(plan.handlers.len(), 1);
    assert_eq!(plan.roles.len(), 1);
    // One grant per agent.
    assert_eq!(plan.grants.len(), 2);
    assert!(plan.action_groups.iter().all(|g| g.handler.as_str() == "alpha_actions-FleetStack"));
}

#[test]
fn test_conflicting_handler_declarations_are_rejected() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    config.agents[1].action_groups[0].handler.logical_id = "AlphaQueryHandler".to_string();
    let err = synthesize(&config).unwrap_err();
    assert!(
        matches!(err, SynthError::Configuration { ref key, .. } if key == "handler.logical_id")
    );
}

#[test]
fn test_function_name_collision_is_rejected() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    config.agents[1].action_groups[0].handler.function_name =
        Some("alpha_actions-FleetStack".to_string());
    let err = synthesize(&config).unwrap_err();
    assert!(matches!(
        err,
        SynthError::Configuration { ref key, .. } if key == "handler.function_name"
    ));
}

struct AmbiguousPlatform;

impl Platform for AmbiguousPlatform {
    fn prepare_agent(&mut self, agent: &AgentSpec) -> Result<String> {
        Ok(format!("{}|draft|2", agent.name))
    }
}

#[test]
fn test_ambiguous_tokens_are_diagnosed_per_agent() {
    let dir = create_test_stack();
    let config = load_test_stack(&dir);
    let mut ctx = SynthContext::for_config(&config);
    let plan = assemble(&config, &mut ctx, &mut AmbiguousPlatform).unwrap();

    assert!(plan.aliases.iter().all(|a| a.version == "2"));
    let ambiguities = ctx
        .diagnostics()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::AliasParseAmbiguity)
        .count();
    assert_eq!(ambiguities, 2);
}

struct TrailingSeparatorPlatform;

impl Platform for TrailingSeparatorPlatform {
    fn prepare_agent(&mut self, agent: &AgentSpec) -> Result<String> {
        Ok(format!("{}|", agent.name))
    }
}

#[test]
fn test_empty_version_segment_degrades_to_diagnostic() {
    let dir = create_test_stack();
    let config = load_test_stack(&dir);
    let mut ctx = SynthContext::for_config(&config);
    let plan = assemble(&config, &mut ctx, &mut TrailingSeparatorPlatform).unwrap();

    for alias in &plan.aliases {
        assert_eq!(alias.version, alias.agent);
    }
    let ambiguities = plan
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::AliasParseAmbiguity)
        .count();
    assert_eq!(ambiguities, 2);
}

#[test]
fn test_plan_validation_rejects_shared_role() {
    let dir = create_test_stack();
    let mut plan = synthesize(&load_test_stack(&dir)).unwrap();
    let alpha_role = plan.handlers[0].role.clone();
    plan.handlers[1].role = alpha_role;
    assert!(matches!(plan.validate(), Err(SynthError::InvalidPlan(_))));
}

#[test]
fn test_plan_validation_rejects_missing_grant() {
    let dir = create_test_stack();
    let mut plan = synthesize(&load_test_stack(&dir)).unwrap();
    plan.grants.pop();
    assert!(matches!(plan.validate(), Err(SynthError::InvalidPlan(_))));
}

#[test]
fn test_plan_validation_rejects_wildcard_storage() {
    let dir = create_test_stack();
    let mut plan = synthesize(&load_test_stack(&dir)).unwrap();
    plan.roles[0].statements[2].resources.push("arn:aws:s3:::*".to_string());
    assert!(matches!(plan.validate(), Err(SynthError::InvalidPlan(_))));
}

#[test]
fn test_assets_resolve_against_asset_root() {
    let dir = create_test_stack();
    let mut config = load_test_stack(&dir);
    config.asset_root = dir.path().to_string_lossy().to_string();
    assert!(synthesize(&config).is_ok());
}
