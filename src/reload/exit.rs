//! Supervisor exit decision on instance completion.
//!
//! # Rules
//! ```text
//! termination requested, instance failed     → exit with its code
//! no instance left                           → exit with its code (0 when clean)
//! otherwise                                  → keep supervising
//! ```

use crate::process::ProcessStatus;

/// What the supervisor loop does after an instance finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Continue,
    Exit(i32),
}

/// Decide from the termination flag, the finished instance's status and the
/// number of instances still tracked after its removal.
pub fn decide_exit(terminated: bool, status: &ProcessStatus, remaining: usize) -> ExitDecision {
    let code = status.exit_code().unwrap_or(0);

    if terminated && code != 0 {
        return ExitDecision::Exit(code);
    }
    if remaining == 0 {
        return ExitDecision::Exit(code);
    }
    ExitDecision::Continue
}
