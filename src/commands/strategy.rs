//! Implementation of the `fleetplan strategy` command.

use crate::cli::StrategyArgs;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::strategy::{ParsingStrategy, ParsingStrategyChoice, strategy_for};

/// Execute the `fleetplan strategy` command.
pub fn cmd_strategy(args: StrategyArgs) -> Result<()> {
    for line in describe(&args.code) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(code: &str) -> Vec<String> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let strategy = strategy_for(code, &mut diagnostics);

    let mut lines = Vec::new();
    match ParsingStrategyChoice::from_code(code) {
        Some(choice) => lines.push(format!("Code:       {} (recognised)", choice)),
        None => lines.push(format!(
            "Code:       {} (unrecognised; treated as absent)",
            code
        )),
    }
    lines.push(match strategy {
        Some(ParsingStrategy::FoundationModel { parsing_model }) => {
            format!("Strategy:   foundation model parsing with {}", parsing_model)
        }
        None => "Strategy:   none".to_string(),
    });
    for diagnostic in &diagnostics {
        lines.push(format!("Diagnostic: {}", diagnostic));
    }
    lines
}
