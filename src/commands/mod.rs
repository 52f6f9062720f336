//! Command implementations for fleetplan.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod init;
mod strategy;
mod synth;

use crate::cli::Command;
use crate::error::Result;

pub use init::cmd_init;
pub use strategy::cmd_strategy;
pub use synth::{cmd_check, cmd_synth, run_synth};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init(args) => cmd_init(args),
        Command::Synth(args) => cmd_synth(args),
        Command::Check(args) => cmd_check(args),
        Command::Strategy(args) => cmd_strategy(args),
    }
}
