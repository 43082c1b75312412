// The given-clause loop (spec.md 4.7 C7). Owns every container a clause passes through
// (Unprocessed -> Passive -> Active) and the shared TermFactory/Ordering/LiteralSelector a
// strategy is configured with.
//
// Adapted from the teacher's prover.rs: the public `Outcome`-returning `run`/`search_for_
// contradiction` shape, the `verbose` print-as-you-go style, and `Arc<AtomicBool>` stop flags
// all carry over directly. Acorn-specific pieces (the Normalizer/BindingMap/AcornValue frontend,
// `useful_passive`/proof-difficulty scoring, LSP `Location` plumbing) are dropped since this
// loop operates on clauses handed to it directly rather than on a source-level goal.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nohash_hasher::IntMap;

use crate::active_set::{ActiveSet, GeneratingRule};
use crate::atom::Atom;
use crate::clause::Clause;
use crate::containers::{Passive, Unprocessed};
use crate::inferences::trivial;
use crate::literal::Literal;
use crate::ordering::TermOrdering;
use crate::proof_step::{ClauseId, ProofStep, Role};
use crate::selector::LiteralSelector;
use crate::term::{Term, TermFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaturationOutcome {
    Refutation(ClauseId),
    Satisfiable,
    TimeLimit,
    MemoryLimit,
    Incomplete,
    Inappropriate,
}

impl fmt::Display for SaturationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SaturationOutcome::Refutation(id) => write!(f, "Refutation({})", id),
            SaturationOutcome::Satisfiable => write!(f, "Satisfiable"),
            SaturationOutcome::TimeLimit => write!(f, "TimeLimit"),
            SaturationOutcome::MemoryLimit => write!(f, "MemoryLimit"),
            SaturationOutcome::Incomplete => write!(f, "Incomplete"),
            SaturationOutcome::Inappropriate => write!(f, "Inappropriate"),
        }
    }
}

pub struct SaturationLoop {
    pub factory: TermFactory,
    ordering: Box<dyn TermOrdering>,
    selector: Box<dyn LiteralSelector>,
    active: ActiveSet,
    passive: Passive,
    unprocessed: Unprocessed,
    clauses: IntMap<ClauseId, ProofStep>,
    next_id: ClauseId,
    /// Whether every enabled generating/simplifying rule is known complete (spec.md 4.7's
    /// `isComplete()`); `Satisfiable` is only ever reported when this holds.
    complete: bool,
    pub verbose: bool,
    pub stop_flags: Vec<Arc<AtomicBool>>,
}

impl SaturationLoop {
    pub fn new(
        factory: TermFactory,
        ordering: Box<dyn TermOrdering>,
        selector: Box<dyn LiteralSelector>,
        age_weight: u32,
        weight_weight: u32,
        complete: bool,
        verbose: bool,
    ) -> SaturationLoop {
        SaturationLoop {
            factory,
            ordering,
            selector,
            active: ActiveSet::new(),
            passive: Passive::new(age_weight, weight_weight),
            unprocessed: Unprocessed::new(),
            clauses: IntMap::default(),
            next_id: 0,
            complete,
            verbose,
            stop_flags: vec![],
        }
    }

    fn fresh_id(&mut self) -> ClauseId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn get(&self, id: ClauseId) -> Option<&ProofStep> {
        self.clauses.get(&id)
    }

    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    pub fn num_passive(&self) -> usize {
        self.passive.size()
    }

    /// Adds an input clause (preprocessor output) to Unprocessed (spec.md 4.7's
    /// "push input clauses to Unprocessed").
    pub fn add_input_clause(&mut self, clause: Clause, role: Role) -> ClauseId {
        let id = self.fresh_id();
        self.unprocessed.push(id);
        self.clauses.insert(id, ProofStep::input(clause, role));
        id
    }

    /// Runs the deterministic, finite rewrite spec.md 4.7 calls `immediateSimplify`: tautology
    /// check and duplicate-literal removal happen inside `Clause::new` already; this adds
    /// variable-to-variable equality resolution and distinct-constant equality simplification,
    /// both to fixpoint.
    fn immediate_simplify(&self, clause: Clause) -> Clause {
        let mut literals = clause.literals;
        loop {
            if let Some(idx) = literals.iter().position(is_variable_disequality) {
                let lit = literals.remove(idx);
                let a = lit.left.as_variable().unwrap();
                let b = lit.right.as_variable().unwrap();
                let (keep, drop) = if a < b { (a, b) } else { (b, a) };
                let mut subst = HashMap::new();
                subst.insert(drop, self.factory.var(keep));
                literals = literals
                    .into_iter()
                    .map(|l| {
                        Literal::new(
                            l.positive,
                            l.left.substitute(&self.factory, &subst),
                            l.right.substitute(&self.factory, &subst),
                        )
                    })
                    .collect();
                continue;
            }
            if let Some(idx) = literals.iter().position(|l| l.positive && is_distinct_constants(&l.left, &l.right)) {
                literals.remove(idx);
                continue;
            }
            break;
        }
        Clause::new(&self.factory, literals)
    }

    fn deadline_exceeded(&self, start: Instant, budget: Duration) -> bool {
        if start.elapsed() >= budget {
            return true;
        }
        self.stop_flags.iter().any(|f| f.load(AtomicOrdering::Relaxed))
    }

    /// The given-clause loop itself (spec.md 4.7). Runs until a refutation is found, Passive
    /// empties out, or `time_budget`/a stop flag cuts the search short.
    pub fn run(&mut self, time_budget: Duration) -> SaturationOutcome {
        let start = Instant::now();
        loop {
            while let Some(id) = self.unprocessed.pop() {
                let step = match self.clauses.get(&id) {
                    Some(step) => step.clone(),
                    None => continue,
                };
                let simplified = self.immediate_simplify(step.clause.clone());
                if simplified.is_impossible() {
                    let mut final_step = step;
                    final_step.clause = simplified;
                    self.clauses.insert(id, final_step);
                    if self.verbose {
                        println!("refutation found at clause {}", id);
                    }
                    return SaturationOutcome::Refutation(id);
                }
                if trivial::is_trivial(&simplified) {
                    continue;
                }
                let weight = simplified.weight();
                let age = step.age;
                let mut new_step = step;
                new_step.clause = simplified;
                self.passive.add(id, age, weight);
                self.clauses.insert(id, new_step);
            }

            if self.passive.size() == 0 {
                return if self.complete {
                    SaturationOutcome::Satisfiable
                } else {
                    SaturationOutcome::Incomplete
                };
            }

            if self.deadline_exceeded(start, time_budget) {
                return SaturationOutcome::TimeLimit;
            }

            let given_id = match self.passive.select_best() {
                Some(id) => id,
                None => {
                    return if self.complete {
                        SaturationOutcome::Satisfiable
                    } else {
                        SaturationOutcome::Incomplete
                    };
                }
            };
            let given_step = match self.clauses.get(&given_id) {
                Some(step) => step.clone(),
                None => continue,
            };

            let reduced = match self.active.forward_simplify(&self.factory, self.ordering.as_ref(), &given_step.clause) {
                None => continue,
                Some(c) => c,
            };

            if reduced != given_step.clause {
                let new_id = self.fresh_id();
                let mut new_step = given_step;
                new_step.clause = reduced;
                new_step.simplification_premises.push(given_id);
                self.clauses.insert(new_id, new_step);
                self.unprocessed.push(new_id);
                continue;
            }

            if reduced.is_impossible() {
                if self.verbose {
                    println!("refutation found at clause {}", given_id);
                }
                return SaturationOutcome::Refutation(given_id);
            }

            let updates = self.active.backward_simplify(&self.factory, self.ordering.as_ref(), &reduced);
            for (affected_id, replacement) in updates {
                self.active.remove(affected_id);
                self.passive.remove(affected_id);
                if let Some(new_clause) = replacement {
                    let new_id = self.fresh_id();
                    if let Some(mut affected_step) = self.clauses.get(&affected_id).cloned() {
                        affected_step.clause = new_clause;
                        affected_step.simplification_premises.push(affected_id);
                        self.clauses.insert(new_id, affected_step);
                        self.unprocessed.push(new_id);
                    }
                }
            }

            self.active.insert(self.ordering.as_ref(), given_id, given_step.clone());
            if self.verbose {
                println!("activated #{}: {}", given_id, reduced);
            }

            let children = self.active.generate(&self.factory, self.ordering.as_ref(), self.selector.as_ref(), given_id, &reduced);
            for (rule, clause) in children {
                let new_id = self.fresh_id();
                let step = self.build_step(rule, clause);
                self.clauses.insert(new_id, step);
                self.unprocessed.push(new_id);
            }
        }
    }

    fn build_step(&self, rule: GeneratingRule, clause: Clause) -> ProofStep {
        match rule {
            GeneratingRule::Factoring(id) => ProofStep::factoring(id, self.premise(id), clause),
            GeneratingRule::EqualityResolution(id) => ProofStep::equality_resolution(id, self.premise(id), clause),
            GeneratingRule::EqualityFactoring(id) => ProofStep::equality_factoring(id, self.premise(id), clause),
            GeneratingRule::BinaryResolution { left_id, right_id } => {
                ProofStep::binary_resolution(left_id, self.premise(left_id), right_id, self.premise(right_id), clause)
            }
            GeneratingRule::Superposition { paramodulator_id, resolver_id } => ProofStep::superposition(
                paramodulator_id,
                self.premise(paramodulator_id),
                resolver_id,
                self.premise(resolver_id),
                clause,
            ),
        }
    }

    fn premise(&self, id: ClauseId) -> &ProofStep {
        self.clauses
            .get(&id)
            .or_else(|| self.active.get(id))
            .expect("generated clause must cite a tracked premise")
    }
}

fn is_variable_disequality(literal: &Literal) -> bool {
    !literal.positive
        && literal.left.as_variable().is_some()
        && literal.right.as_variable().is_some()
        && literal.left != literal.right
}

fn is_distinct_constants(a: &Term, b: &Term) -> bool {
    matches!(a.head(), Atom::Symbol(_))
        && matches!(b.head(), Atom::Symbol(_))
        && a.args().is_empty()
        && b.args().is_empty()
        && a != b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Kbo;
    use crate::selector::MaximalitySelector;

    fn new_loop(factory: TermFactory) -> SaturationLoop {
        let ordering = Kbo::from_signature(&factory.signature);
        SaturationLoop::new(factory, Box::new(ordering), Box::new(MaximalitySelector), 1, 1, true, false)
    }

    #[test]
    fn test_refutation_via_binary_resolution() {
        let mut factory = TermFactory::new();
        let p = factory.parse("p(c0)");
        let p_lit = Literal::positive_atom(&mut factory, p);
        let fact = Clause::new(&factory, vec![p_lit]);
        let np = factory.parse("p(x0)");
        let np_lit = Literal::negative_atom(&mut factory, np);
        let goal = Clause::new(&factory, vec![np_lit]);

        let mut sat = new_loop(factory);
        sat.add_input_clause(fact, Role::Axiom);
        sat.add_input_clause(goal, Role::NegatedGoal);
        let outcome = sat.run(Duration::from_secs(5));
        match outcome {
            SaturationOutcome::Refutation(id) => {
                let step = sat.get(id).unwrap();
                assert!(step.clause.is_impossible());
                assert_eq!(step.role, Role::NegatedGoal);
            }
            other => panic!("expected Refutation, got {:?}", other),
        }
    }

    #[test]
    fn test_refutation_via_superposition() {
        let mut factory = TermFactory::new();
        let f_c0 = factory.parse("f(c0)");
        let c1 = factory.parse("c1");
        let equation = Clause::new(&factory, vec![Literal::equals(f_c0, c1)]);

        let g_f_x0 = factory.parse("g(f(x0))");
        let g_c1 = factory.parse("g(c1)");
        let goal = Clause::new(&factory, vec![Literal::not_equals(g_f_x0, g_c1)]);

        let mut sat = new_loop(factory);
        sat.add_input_clause(equation, Role::Axiom);
        sat.add_input_clause(goal, Role::NegatedGoal);
        let outcome = sat.run(Duration::from_secs(5));
        match outcome {
            SaturationOutcome::Refutation(id) => {
                let step = sat.get(id).unwrap();
                assert!(step.clause.is_impossible());
            }
            other => panic!("expected Refutation, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_demodulation_before_activation() {
        let mut factory = TermFactory::new();
        let f_x0 = factory.parse("f(x0)");
        let x0 = factory.parse("x0");
        let rule = Clause::new(&factory, vec![Literal::equals(f_x0, x0)]);

        let p_f_c0 = factory.parse("p(f(c0))");
        let q_c1 = factory.parse("q(c1)");
        let p_f_c0_lit = Literal::positive_atom(&mut factory, p_f_c0);
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let disjunction = Clause::new(&factory, vec![p_f_c0_lit, q_c1_lit]);

        let mut sat = new_loop(factory);
        sat.add_input_clause(rule, Role::Axiom);
        sat.add_input_clause(disjunction, Role::Axiom);
        let outcome = sat.run(Duration::from_secs(5));
        assert_eq!(outcome, SaturationOutcome::Satisfiable);

        let p_c0 = sat.factory.parse("p(c0)");
        let q_c1 = sat.factory.parse("q(c1)");
        let p_c0_lit = Literal::positive_atom(&mut sat.factory, p_c0);
        let q_c1_lit = Literal::positive_atom(&mut sat.factory, q_c1);
        let expected = Clause::new(&sat.factory, vec![p_c0_lit, q_c1_lit]);
        let found = (0..sat.next_id).any(|id| sat.active.get(id).map_or(false, |step| step.clause == expected));
        assert!(found, "Active should contain the demodulated clause, not the original");
    }

    #[test]
    fn test_subsumption_deletes_weaker_clause_on_activation() {
        let mut factory = TermFactory::new();
        let p_x0 = factory.parse("p(x0)");
        let p_x0_lit = Literal::positive_atom(&mut factory, p_x0);
        let unit = Clause::new(&factory, vec![p_x0_lit]);

        let p_c0 = factory.parse("p(c0)");
        let q_c1 = factory.parse("q(c1)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let weaker = Clause::new(&factory, vec![p_c0_lit, q_c1_lit]);

        let mut sat = new_loop(factory);
        sat.add_input_clause(unit, Role::Axiom);
        sat.add_input_clause(weaker, Role::Axiom);
        let outcome = sat.run(Duration::from_secs(5));
        assert_eq!(outcome, SaturationOutcome::Satisfiable);
        assert_eq!(sat.num_active(), 1, "the weaker disjunction should never reach Active");
    }

    #[test]
    fn test_time_limit_reports_time_limit_outcome() {
        let mut factory = TermFactory::new();
        let p = factory.parse("p(c0)");
        let p_lit = Literal::positive_atom(&mut factory, p);
        let fact = Clause::new(&factory, vec![p_lit]);

        let mut sat = new_loop(factory);
        sat.add_input_clause(fact, Role::Axiom);
        let outcome = sat.run(Duration::from_secs(0));
        assert_eq!(outcome, SaturationOutcome::TimeLimit);
    }

    #[test]
    fn test_satisfiable_set_terminates() {
        let mut factory = TermFactory::new();
        let p_c0 = factory.parse("p(c0)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let fact = Clause::new(&factory, vec![p_c0_lit]);
        let q_c1 = factory.parse("q(c1)");
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let other = Clause::new(&factory, vec![q_c1_lit]);

        let mut sat = new_loop(factory);
        sat.add_input_clause(fact, Role::Axiom);
        sat.add_input_clause(other, Role::Axiom);
        let outcome = sat.run(Duration::from_secs(5));
        assert_eq!(outcome, SaturationOutcome::Satisfiable);
    }

    #[test]
    fn test_immediate_simplify_resolves_variable_disequality() {
        let mut factory = TermFactory::new();
        let x0 = factory.parse("x0");
        let x1 = factory.parse("x1");
        let p_x1 = factory.parse("p(x1)");
        let neq_lit = Literal::not_equals(x0, x1);
        let p_x1_lit = Literal::positive_atom(&mut factory, p_x1);
        let clause = Clause::new(&factory, vec![neq_lit, p_x1_lit]);
        let sat = new_loop(factory);
        let simplified = sat.immediate_simplify(clause);
        assert_eq!(simplified.len(), 1);
        assert!(simplified.literals[0].positive);
    }

    #[test]
    fn test_immediate_simplify_drops_distinct_constant_equality() {
        let mut factory = TermFactory::new();
        let c0 = factory.parse("c0");
        let c1 = factory.parse("c1");
        let p_c2 = factory.parse("p(c2)");
        let eq_lit = Literal::equals(c0, c1);
        let p_c2_lit = Literal::positive_atom(&mut factory, p_c2);
        let clause = Clause::new(&factory, vec![eq_lit, p_c2_lit]);
        let sat = new_loop(factory);
        let simplified = sat.immediate_simplify(clause);
        assert_eq!(simplified.len(), 1);
    }
}
