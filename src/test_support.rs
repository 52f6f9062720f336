use crate::config::StackConfig;
use std::path::Path;
use tempfile::TempDir;

/// Two independent agents: alpha on a cross-region Claude profile, beta on a
/// regional Nova model. Each has its own query handler and action group.
pub(crate) const FLEET_YAML: &str = r#"
stack_id: FleetStack
company_name: AnyCompany
agent_name: Penny
account: "123456789012"
region: us-west-2
parser_strategy: FOUNDATION_MODEL
storage:
  data_bucket: sales-data
  output_bucket: query-results
libraries:
  - name: powertools
    asset: layers/powertools
knowledge_store:
  name: HandbookKnowledgeBase
  instruction: Company handbook and policies
  data_bucket: handbook-docs
dashboard:
  name: FleetCosts
  models:
    - display_name: Claude 3.5 Sonnet v2
      model_id: anthropic.claude-3-5-sonnet-20241022-v2:0
      input_price: 0.003
      output_price: 0.015
    - display_name: Nova Pro
      model_id: amazon.nova-pro-v1:0
      input_price: 0.0008
      output_price: 0.0032
agents:
  - logical_id: AlphaAgent
    model:
      model_id: anthropic.claude-3-5-sonnet-20241022-v2:0
      region_class: us
    instruction_file: prompt/alpha/instruction.txt
    instruction_preamble: "You are {agent_name}, an assistant for {company_name}."
    prompt_overrides:
      - stage: orchestration
        template_file: prompt/alpha/orchestration.txt
    attach_knowledge_store: true
    action_groups:
      - name: QueryAthena
        description: Run SQL against the sales database
        capability_base: schema/athena_actions
        variant: alpha
        handler:
          logical_id: AlphaQueryHandler
          entry: lambda/alpha/alpha_actions
          libraries: [powertools]
          environment:
            OUTPUT_LOCATION: "s3://{output_bucket}/results/"
          query_access: true
          failure_queue: true
  - logical_id: BetaAgent
    model:
      model_id: amazon.nova-pro-v1:0
    instruction_file: prompt/beta/instruction.txt
    action_groups:
      - name: QueryAthena
        description: Run SQL against the sales database
        capability_base: schema/athena_actions
        variant: beta
        handler:
          logical_id: BetaQueryHandler
          entry: lambda/beta/beta_actions
          query_access: true
"#;

const ASSETS: &[(&str, &str)] = &[
    ("prompt/alpha/instruction.txt", "Answer questions about sales data."),
    ("prompt/alpha/orchestration.txt", "$instruction$\n$tools$"),
    ("prompt/beta/instruction.txt", "Answer questions briefly."),
    (
        "lambda/alpha/alpha_actions/alpha_actions.py",
        "def lambda_handler(event, context):\n    pass\n",
    ),
    (
        "lambda/beta/beta_actions/beta_actions.py",
        "def lambda_handler(event, context):\n    pass\n",
    ),
    ("layers/powertools/requirements.txt", "aws-lambda-powertools\n"),
    ("schema/athena_actions/alpha/schema.json", r#"{"openapi": "3.0.0", "paths": {}}"#),
    ("schema/athena_actions/beta/schema.json", r#"{"openapi": "3.0.0", "paths": {}}"#),
];

pub(crate) fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// A stack directory with `fleetplan.yaml` and every asset it references.
pub(crate) fn create_test_stack() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (rel, content) in ASSETS {
        write_file(temp_dir.path(), rel, content);
    }
    write_file(temp_dir.path(), "fleetplan.yaml", FLEET_YAML);
    temp_dir
}

pub(crate) fn load_test_stack(dir: &TempDir) -> StackConfig {
    StackConfig::load(dir.path().join("fleetplan.yaml")).unwrap()
}
