//! Transition invariants - sanity checks that detect bugs.
//!
//! A correct rule engine never violates these. They back the property tests
//! and fuzz targets rather than gameplay.

use std::fmt;

use crate::game::{GameRule, Outcome, Transition};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check a resolved transition from energies `before` against the rule.
///
/// Returns every violation found, or an empty list if all invariants hold.
#[must_use]
pub fn check_transition(
    rule: &GameRule,
    before: (u32, u32),
    transition: &Transition,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let max = rule.max_energy();

    for (who, prev, next) in [
        ("agent", before.0, transition.agent),
        ("opponent", before.1, transition.opponent),
    ] {
        if next > max {
            violations.push(InvariantViolation {
                message: format!("{who} energy {next} > max {max}"),
            });
        }
        // One round moves energy by at most one charge or one top-level attack.
        if next > prev.saturating_add(1) || next < prev.saturating_sub(rule.level()) {
            violations.push(InvariantViolation {
                message: format!("{who} energy jumped from {prev} to {next}"),
            });
        }
    }

    // Winning requires an attack, and attacks cost energy.
    if transition.outcome == Outcome::AgentWins && transition.agent >= before.0 {
        violations.push(InvariantViolation {
            message: format!(
                "agent won without spending energy ({} -> {})",
                before.0, transition.agent
            ),
        });
    }

    violations
}
