//! Agent specifications and their lifecycle.
//!
//! An agent is defined once per run, then only moves forward:
//!
//! ```text
//! Defined -> Prepared -> Aliased -> Bound
//! ```
//!
//! Action groups are staged while the agent is `Defined` so the prepared
//! build includes them. A knowledge store is attached after aliasing. An
//! agent with at least one attachment ends the run `Bound`.

mod lifecycle;
mod spec;

pub use lifecycle::AgentState;
pub use spec::{AgentSpec, PromptOverrideStep};
