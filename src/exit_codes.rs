//! Exit code constants for the fleetplan CLI.
//!
//! - 0: Success
//! - 1: Configuration or user error
//! - 2: Missing local resource (instruction, prompt, handler, contract)
//! - 3: Assembled plan failed structural validation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Configuration value missing or malformed, or bad invocation.
pub const USER_ERROR: i32 = 1;

/// A referenced local file does not exist or could not be read.
pub const MISSING_RESOURCE: i32 = 2;

/// The resource graph violates an ordering, scoping, or reference invariant.
pub const INVALID_PLAN: i32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, MISSING_RESOURCE, INVALID_PLAN];
        for (i, &a) in codes.iter().enumerate() {
            for &b in &codes[i + 1..] {
                assert_ne!(a, b, "Exit codes must be distinct");
            }
        }
    }
}
