// SZS-style status reporting and the serializable proof-step records the CLI prints or hands
// off as JSON (spec.md 6's per-problem output format). Grounded on the teacher's own
// `Display`-impl convention for user-facing reporting (`prover.rs`'s `Outcome`), extended here
// with `serde::Serialize` since batch/portfolio output benefits from a machine-readable form
// and `serde` is already part of the teacher's dependency stack.

use std::fmt;

use serde::Serialize;

use crate::proof_step::{ClauseId, ProofStep, Role, Rule};
use crate::saturation::SaturationOutcome;

/// The SZS status vocabulary exercised by `original_source/CASC/CLTBMode.cpp`'s competition
/// driver (SPEC_FULL.md's supplemented feature; spec.md itself only names
/// `Theorem | GaveUp | Timeout`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SzsStatus {
    /// A refutation was found and the input contained a negated conjecture.
    Theorem,
    /// A refutation was found with no conjecture present: the axioms alone are unsatisfiable.
    ContradictoryAxioms,
    /// Saturated to completion with no conjecture present: the axioms are satisfiable.
    Unsatisfiable,
    /// Saturated to completion with a conjecture present: the conjecture is disproved.
    CounterSatisfiable,
    GaveUp,
    Timeout,
}

impl fmt::Display for SzsStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            SzsStatus::Theorem => "Theorem",
            SzsStatus::ContradictoryAxioms => "ContradictoryAxioms",
            SzsStatus::Unsatisfiable => "Unsatisfiable",
            SzsStatus::CounterSatisfiable => "CounterSatisfiable",
            SzsStatus::GaveUp => "GaveUp",
            SzsStatus::Timeout => "Timeout",
        };
        write!(f, "{}", word)
    }
}

impl SzsStatus {
    /// Maps a finished loop's `SaturationOutcome` to the SZS status the driver reports
    /// (spec.md 6/7), given whether the input contained a negated conjecture.
    pub fn from_outcome(outcome: &SaturationOutcome, has_goal: bool) -> SzsStatus {
        match outcome {
            SaturationOutcome::Refutation(_) => {
                if has_goal {
                    SzsStatus::Theorem
                } else {
                    SzsStatus::ContradictoryAxioms
                }
            }
            SaturationOutcome::Satisfiable => {
                if has_goal {
                    SzsStatus::CounterSatisfiable
                } else {
                    SzsStatus::Unsatisfiable
                }
            }
            SaturationOutcome::TimeLimit => SzsStatus::Timeout,
            SaturationOutcome::MemoryLimit | SaturationOutcome::Incomplete | SaturationOutcome::Inappropriate => {
                SzsStatus::GaveUp
            }
        }
    }

    /// Only a clean refutation or a complete-search satisfiable model is an answer to emit as
    /// a proof; every other status writes no proof body (spec.md 7's "the driver only writes
    /// a refutation for clean Refutation(cl) outcomes").
    pub fn has_proof_body(&self) -> bool {
        matches!(self, SzsStatus::Theorem | SzsStatus::ContradictoryAxioms)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClauseInfo {
    pub id: ClauseId,
    pub text: String,
    pub rule: String,
    pub premises: Vec<ClauseId>,
    pub role: String,
}

impl ClauseInfo {
    pub fn from_step(id: ClauseId, step: &ProofStep) -> ClauseInfo {
        ClauseInfo {
            id,
            text: step.clause.to_string(),
            rule: step.rule.name().to_string(),
            premises: step.dependencies(),
            role: match step.role {
                Role::Axiom => "axiom".to_string(),
                Role::NegatedGoal => "negated_conjecture".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProofInfo {
    pub problem: String,
    pub status: String,
    pub steps: Vec<ClauseInfo>,
}

/// Walks a refutation's dependency graph backward from `root`, collecting every clause it
/// transitively depends on in an order where each clause's premises precede it (spec.md 8's
/// "Inference chain rooted entirely in S").
pub fn collect_proof(root: ClauseId, lookup: impl Fn(ClauseId) -> Option<ProofStep>) -> Vec<ClauseInfo> {
    let mut order = vec![];
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![root];
    let mut pending = vec![];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(step) = lookup(id) {
            for dep in step.dependencies() {
                stack.push(dep);
            }
            pending.push((id, step));
        }
    }
    pending.sort_by_key(|(_, step)| step.age);
    for (id, step) in pending {
        order.push(ClauseInfo::from_step(id, &step));
    }
    order
}

pub fn format_status_line(status: SzsStatus, problem: &str) -> String {
    format!("% SZS status {} for {}", status, problem)
}

pub fn format_started_line(problem: &str) -> String {
    format!("% SZS status Started for {}", problem)
}

pub fn format_ended_line(problem: &str) -> String {
    format!("% SZS status Ended for {}", problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::Clause;
    use crate::literal::Literal;
    use crate::term::TermFactory;

    #[test]
    fn test_status_from_refutation_with_goal() {
        let status = SzsStatus::from_outcome(&SaturationOutcome::Refutation(3), true);
        assert_eq!(status, SzsStatus::Theorem);
        assert!(status.has_proof_body());
    }

    #[test]
    fn test_status_from_satisfiable_without_goal() {
        let status = SzsStatus::from_outcome(&SaturationOutcome::Satisfiable, false);
        assert_eq!(status, SzsStatus::Unsatisfiable);
        assert!(!status.has_proof_body());
    }

    #[test]
    fn test_format_status_line() {
        let line = format_status_line(SzsStatus::Timeout, "PUZ001-1");
        assert_eq!(line, "% SZS status Timeout for PUZ001-1");
    }

    #[test]
    fn test_collect_proof_orders_premises_before_descendants() {
        let mut factory = TermFactory::new();
        let p = factory.parse("p(c0)");
        let p_lit = Literal::positive_atom(&mut factory, p);
        let axiom = Clause::new(&factory, vec![p_lit]);
        let axiom_step = ProofStep::input(axiom, Role::Axiom);

        let np = factory.parse("p(x0)");
        let np_lit = Literal::negative_atom(&mut factory, np);
        let goal = Clause::new(&factory, vec![np_lit]);
        let goal_step = ProofStep::input(goal, Role::NegatedGoal);

        let empty = Clause::impossible();
        let resolved = ProofStep::binary_resolution(0, &axiom_step, 1, &goal_step, empty);

        let steps: std::collections::HashMap<ClauseId, ProofStep> =
            [(0, axiom_step), (1, goal_step), (2, resolved)].into_iter().collect();
        let order = collect_proof(2, |id| steps.get(&id).cloned());
        assert_eq!(order.len(), 3);
        assert_eq!(order.last().unwrap().id, 2);
    }
}
