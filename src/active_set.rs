// The set of clauses that have passed through the given-clause loop once and are now available
// as premises for generating and simplifying rules (spec.md 4.6's "Active"). Owns the indexes
// over those clauses and is the one place inference engines are actually invoked against real
// premises, as opposed to the bare algorithms in `inferences/`.
//
// Grounded on the teacher's active_set.rs, which plays the same role for Acorn's rewrite-based
// calculus: an indexed container plus find_resolutions/simplify/activate methods. The indexing
// strategy is simplified (see index_manager.rs) and the inference set is this calculus's
// instead of Acorn's, but the three-method shape (generate/forward_simplify/backward_simplify
// around an indexed Active) carries over directly.

use std::collections::HashSet;

use nohash_hasher::IntMap;

use crate::clause::Clause;
use crate::containers::{Active, ActiveObserver};
use crate::index_manager::IndexManager;
use crate::inferences::demodulation::{self, RewriteRule};
use crate::inferences::{equality, resolution, subsumption, superposition, trivial};
use crate::ordering::TermOrdering;
use crate::proof_step::{ClauseId, ProofStep};
use crate::selector::LiteralSelector;
use crate::term::TermFactory;

/// Which inference produced a generated clause, with enough premise information for the
/// saturation loop to build the matching `ProofStep` (spec.md 4.5's generating rules).
pub enum GeneratingRule {
    Factoring(ClauseId),
    EqualityResolution(ClauseId),
    EqualityFactoring(ClauseId),
    BinaryResolution { left_id: ClauseId, right_id: ClauseId },
    Superposition { paramodulator_id: ClauseId, resolver_id: ClauseId },
}

#[derive(Default)]
pub struct ActiveSet {
    active: Active,
    index: IndexManager,
    steps: IntMap<ClauseId, ProofStep>,
}

impl ActiveSet {
    pub fn new() -> ActiveSet {
        ActiveSet::default()
    }

    pub fn len(&self) -> usize {
        self.active.size()
    }

    pub fn contains(&self, id: ClauseId) -> bool {
        self.active.contains(id)
    }

    pub fn get(&self, id: ClauseId) -> Option<&ProofStep> {
        self.steps.get(&id)
    }

    /// Activates a clause: indexes it (via `IndexManager`'s `ActiveObserver` subscription) and
    /// adds it to Active (spec.md 4.6's "activate"). The caller is responsible for having
    /// already forward-simplified `step.clause` against the current Active set.
    pub fn insert(&mut self, ordering: &dyn TermOrdering, id: ClauseId, step: ProofStep) {
        let mut observers: Vec<&mut dyn ActiveObserver> = vec![&mut self.index];
        self.active.add(id, &step.clause, ordering, &mut observers);
        self.steps.insert(id, step);
    }

    pub fn remove(&mut self, id: ClauseId) {
        let mut observers: Vec<&mut dyn ActiveObserver> = vec![&mut self.index];
        self.active.remove(id, &mut observers);
        self.steps.remove(&id);
    }

    /// Clause ids in Active that share an indexed, unifiable subterm with some literal of
    /// `clause` -- the candidate set `generate` needs to run pairwise inferences against,
    /// instead of every clause in Active (spec.md 4.4's indexed retrieval).
    fn candidate_ids(&self, factory: &TermFactory, clause: &Clause) -> Vec<ClauseId> {
        let mut seen = HashSet::new();
        let mut ids = vec![];
        for literal in &clause.literals {
            for term in [&literal.left, &literal.right] {
                for (_, subterm) in term.rewritable_subterms() {
                    for (cid, ..) in self.index.unifiable_subterms(factory, &subterm) {
                        if seen.insert(cid) {
                            ids.push(cid);
                        }
                    }
                }
            }
        }
        ids
    }

    /// Oriented rewrite rules from Active whose left-hand side could match some subterm of
    /// `clause`, found by querying `IndexManager`'s code tree instead of rebuilding every
    /// active unit equation's rule from scratch.
    fn rewrite_rule_candidates<'a>(
        &'a self,
        factory: &TermFactory,
        ordering: &'a dyn TermOrdering,
        clause: &Clause,
    ) -> Vec<RewriteRule<'a>> {
        let mut seen = HashSet::new();
        let mut rules = vec![];
        for literal in &clause.literals {
            for term in [&literal.left, &literal.right] {
                for (_, subterm) in term.rewritable_subterms() {
                    for (cid, _) in self.index.rewrite_candidates(factory, &subterm) {
                        if !seen.insert(cid) {
                            continue;
                        }
                        if let Some(step) = self.steps.get(&cid) {
                            if let Some(rule) = RewriteRule::from_clause(&step.clause, ordering) {
                                rules.push(rule);
                            }
                        }
                    }
                }
            }
        }
        rules
    }

    /// Generates every clause obtainable from one inference step between `given` and Active,
    /// plus `given` against itself (spec.md 4.6's "generate children of the given clause").
    pub fn generate(
        &self,
        factory: &TermFactory,
        ordering: &dyn TermOrdering,
        selector: &dyn LiteralSelector,
        given_id: ClauseId,
        given: &Clause,
    ) -> Vec<(GeneratingRule, Clause)> {
        let mut out = vec![];
        for clause in resolution::factoring(factory, given) {
            out.push((GeneratingRule::Factoring(given_id), clause));
        }
        for clause in equality::equality_resolution(factory, given) {
            out.push((GeneratingRule::EqualityResolution(given_id), clause));
        }
        for clause in equality::equality_factoring(factory, ordering, given) {
            out.push((GeneratingRule::EqualityFactoring(given_id), clause));
        }
        for clause in superposition::superpose(factory, ordering, selector, given, given) {
            out.push((
                GeneratingRule::Superposition {
                    paramodulator_id: given_id,
                    resolver_id: given_id,
                },
                clause,
            ));
        }

        for id in self.candidate_ids(factory, given) {
            if let Some(step) = self.steps.get(&id) {
                for clause in resolution::binary_resolution(factory, ordering, selector, given, &step.clause) {
                    out.push((
                        GeneratingRule::BinaryResolution { left_id: given_id, right_id: id },
                        clause,
                    ));
                }
                for clause in resolution::binary_resolution(factory, ordering, selector, &step.clause, given) {
                    out.push((
                        GeneratingRule::BinaryResolution { left_id: id, right_id: given_id },
                        clause,
                    ));
                }
                for clause in superposition::superpose(factory, ordering, selector, given, &step.clause) {
                    out.push((
                        GeneratingRule::Superposition {
                            paramodulator_id: given_id,
                            resolver_id: id,
                        },
                        clause,
                    ));
                }
                for clause in superposition::superpose(factory, ordering, selector, &step.clause, given) {
                    out.push((
                        GeneratingRule::Superposition {
                            paramodulator_id: id,
                            resolver_id: given_id,
                        },
                        clause,
                    ));
                }
            }
        }
        out
    }

    /// Forward-simplifies `clause` against rewrite rules and subsumers currently in Active
    /// (spec.md 4.6). Returns `None` if `clause` turns out redundant (a tautology, or subsumed
    /// outright), `Some` of the simplified clause otherwise.
    pub fn forward_simplify(&self, factory: &TermFactory, ordering: &dyn TermOrdering, clause: &Clause) -> Option<Clause> {
        let mut current = clause.clone();
        // `forward_demodulate` only fixpoints over the rule slice it's given; re-query the
        // index after every successful rewrite, since a rewrite can expose a subterm that
        // matches a rule the first pass's narrower candidate set didn't include.
        loop {
            let rules = self.rewrite_rule_candidates(factory, ordering, &current);
            match demodulation::forward_demodulate(factory, &current, &rules) {
                Some(rewritten) => current = rewritten,
                None => break,
            }
        }
        if trivial::is_trivial(&current) {
            return None;
        }
        for id in self.active.iter() {
            if let Some(step) = self.steps.get(id) {
                if subsumption::subsumes(&step.clause, &current) {
                    return None;
                }
                if let Some(simplified) = subsumption::subsumption_resolution(factory, &step.clause, &current) {
                    current = simplified;
                }
            }
        }
        Some(current)
    }

    /// Backward-simplifies Active against a clause about to be activated (spec.md 4.6): which
    /// members become redundant (`None`) or need rewriting (`Some`) now that `given` is
    /// available as a premise. The caller retracts and re-queues accordingly.
    pub fn backward_simplify(
        &self,
        factory: &TermFactory,
        ordering: &dyn TermOrdering,
        given: &Clause,
    ) -> Vec<(ClauseId, Option<Clause>)> {
        let mut out = vec![];
        let rule = RewriteRule::from_clause(given, ordering);
        let mut rewritten_ids = HashSet::new();

        if let Some(ref rule) = rule {
            // The dual query of `rewrite_rule_candidates`: which already-indexed active
            // subterms does this new rule's left-hand side generalize?
            for (cid, ..) in self.index.instance_subterms(factory, rule.lhs) {
                if !rewritten_ids.insert(cid) {
                    continue;
                }
                if let Some(step) = self.steps.get(&cid) {
                    if let Some(rewritten) = demodulation::forward_demodulate(factory, &step.clause, std::slice::from_ref(rule)) {
                        out.push((cid, Some(rewritten)));
                    } else {
                        rewritten_ids.remove(&cid);
                    }
                }
            }
        }

        for id in self.active.iter() {
            if rewritten_ids.contains(id) {
                continue;
            }
            if let Some(step) = self.steps.get(id) {
                if subsumption::subsumes(given, &step.clause) {
                    out.push((*id, None));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use crate::ordering::Kbo;
    use crate::proof_step::Role;
    use crate::selector::MaximalitySelector;

    #[test]
    fn test_binary_resolution_against_active_member() {
        let mut factory = TermFactory::new();
        let ordering = Kbo::from_signature(&factory.signature);
        let selector = MaximalitySelector;

        let p = factory.parse("p(c0)");
        let p_lit = Literal::positive_atom(&mut factory, p);
        let fact = Clause::new(&factory, vec![p_lit]);
        let mut set = ActiveSet::new();
        set.insert(&ordering, 0, ProofStep::input(fact, Role::Axiom));

        let np = factory.parse("p(x0)");
        let np_lit = Literal::negative_atom(&mut factory, np);
        let goal = Clause::new(&factory, vec![np_lit]);
        let results = set.generate(&factory, &ordering, &selector, 1, &goal);
        assert!(results.iter().any(|(_, c)| c.is_impossible()));
    }

    #[test]
    fn test_forward_simplify_removes_subsumed_clause() {
        let mut factory = TermFactory::new();
        let ordering = Kbo::from_signature(&factory.signature);

        let p_x0 = factory.parse("p(x0)");
        let p_x0_lit = Literal::positive_atom(&mut factory, p_x0);
        let fact = Clause::new(&factory, vec![p_x0_lit]);
        let mut set = ActiveSet::new();
        set.insert(&ordering, 0, ProofStep::input(fact, Role::Axiom));

        let p_c0 = factory.parse("p(c0)");
        let q_c1 = factory.parse("q(c1)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let candidate = Clause::new(&factory, vec![p_c0_lit, q_c1_lit]);
        assert!(set.forward_simplify(&factory, &ordering, &candidate).is_none());
    }

    #[test]
    fn test_backward_simplify_rewrites_active_member() {
        let mut factory = TermFactory::new();
        let ordering = Kbo::from_signature(&factory.signature);

        let f_c1 = factory.parse("f(c1)");
        let c2 = factory.parse("c2");
        let target = Clause::new(&factory, vec![Literal::equals(f_c1, c2)]);
        let mut set = ActiveSet::new();
        set.insert(&ordering, 0, ProofStep::input(target, Role::Axiom));

        let lhs = factory.parse("f(x0)");
        let rhs = factory.parse("c0");
        let rule_clause = Clause::new(&factory, vec![Literal::equals(lhs, rhs)]);
        let updates = set.backward_simplify(&factory, &ordering, &rule_clause);
        assert_eq!(updates.len(), 1);
        assert!(updates[0].1.is_some());
    }
}
