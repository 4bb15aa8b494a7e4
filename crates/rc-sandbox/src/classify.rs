//! Run-phase outcome classification (spec §4.3 table).
//!
//! Kept as a pure function so the totality/disjointness property in the
//! spec's testable properties (§8) can be checked directly, independent of
//! any container engine.

use rc_schemas::PasteStatus;

/// Classify a run-phase outcome. Exactly one terminal status is returned for
/// every `(deadline_expired, exit_code, oom_killed)` tuple.
///
/// Precedence: deadline expiry beats any exit signal; OOM/exit-137 beats a
/// generic nonzero exit.
pub fn classify_run_outcome(deadline_expired: bool, exit_code: i64, oom_killed: bool) -> PasteStatus {
    if deadline_expired {
        return PasteStatus::TimeLimitExceeded;
    }
    if oom_killed || exit_code == 137 {
        return PasteStatus::MemoryLimitExceeded;
    }
    if exit_code == 0 {
        return PasteStatus::Completed;
    }
    PasteStatus::RuntimeError
}
