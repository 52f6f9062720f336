//! Filesystem utilities for fleetplan.
//!
//! Plans and generated configs are written atomically so a crash never leaves
//! a half-written file where the platform would pick it up.

pub mod atomic;

pub use atomic::{atomic_write, atomic_write_file, atomic_write_json, write_new_file};
