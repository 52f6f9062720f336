//! Fleetplan: dependency-ordered, least-privilege spec synthesis for
//! conversational agent fleets.
//!
//! A [`config::StackConfig`] declares agents, model profiles and the action
//! groups each agent may call. [`assembler::assemble`] turns it into a
//! validated [`assembler::SynthesisPlan`] for the provisioning platform.

pub mod action_group;
pub mod agent;
pub mod alias;
pub mod assembler;
pub mod assets;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod handler;
pub mod knowledge;
pub mod model;
pub mod naming;
pub mod platform;
pub mod queue;
pub mod role;
pub mod strategy;
pub mod template;

#[cfg(test)]
mod test_support;
