// Owns the indexes over Active and lets inference engines request/release a reference rather
// than each engine keeping its own copy (spec.md 4.4: "the SaturationLoop wires an IndexManager
// that owns indexes and lets inference engines request/release them; indexes subscribe to
// Active's add/remove events"). Grounded on the teacher's active_set.rs, which keeps exactly
// this set of indexes (inline, one per retrieval need) directly on the ActiveSet struct; here
// they are factored out so more than one engine can share a request-counted handle. Occurrence
// entries are keyed by a plain integer id, so `nohash_hasher` skips hashing them; the
// request-counter keys are interned `&'static str` tags, so `fxhash` is the better fit there --
// both carried over from the teacher's dependency stack for these exact hot-path map shapes.

use fxhash::FxHashMap;
use nohash_hasher::IntMap;

use crate::atom::AtomId;
use crate::clause::Clause;
use crate::code_tree::{CodeTree, EntryId as CodeEntryId};
use crate::containers::ActiveObserver;
use crate::ordering::TermOrdering;
use crate::proof_step::ClauseId;
use crate::substitution_tree::{EntryId, SubstitutionTree};
use crate::term::{Term, TermFactory};

/// One indexed occurrence: which clause and literal a subterm came from, and the path to it
/// within that literal's left-hand side (path `[]` denotes the literal's top-level term).
#[derive(Debug, Clone, Copy)]
pub struct Occurrence {
    pub clause_id: ClauseId,
    pub literal_index: usize,
    pub left_side: bool,
}

/// The full set of indexes a superposition-based saturation loop needs over Active, plus the
/// request-counted handles inference engines check out before querying them.
#[derive(Default)]
pub struct IndexManager {
    /// All rewritable non-variable subterms of every literal in Active, for superposition's
    /// "find subterm to rewrite into" queries (unification retrieval).
    subterms: SubstitutionTree,
    /// Oriented positive-unit left-hand sides, for forward/backward demodulation (generalization
    /// retrieval against a code tree, since this is the throughput-critical path).
    rewrite_lhs: CodeTree,
    occurrences: IntMap<u64, Occurrence>,
    next_entry: u64,
    requests: FxHashMap<&'static str, u32>,
}

impl IndexManager {
    pub fn new() -> IndexManager {
        IndexManager::default()
    }

    pub fn request(&mut self, name: &'static str) {
        *self.requests.entry(name).or_insert(0) += 1;
    }

    pub fn release(&mut self, name: &'static str) {
        if let Some(count) = self.requests.get_mut(name) {
            *count = count.saturating_sub(1);
        }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_entry;
        self.next_entry += 1;
        id
    }

    /// Indexes every rewritable subterm of `term` under a fresh entry id, recording its
    /// occurrence for removal and for mapping a hit back to a clause.
    pub fn add_subterms(&mut self, clause_id: ClauseId, literal_index: usize, left_side: bool, term: &Term) {
        for (_, subterm) in term.rewritable_subterms() {
            let id = self.fresh_id();
            self.subterms.insert(EntryId(id), subterm);
            self.occurrences.insert(
                id,
                Occurrence {
                    clause_id,
                    literal_index,
                    left_side,
                },
            );
        }
    }

    pub fn add_rewrite_rule(&mut self, clause_id: ClauseId, lhs: &Term) {
        let id = self.fresh_id();
        self.rewrite_lhs.insert(CodeEntryId(id), lhs.clone());
        self.occurrences.insert(
            id,
            Occurrence {
                clause_id,
                literal_index: 0,
                left_side: true,
            },
        );
    }

    /// Removes every indexed entry attributed to `clause_id` (demodulation/backward-simplify
    /// deletion, or plain clause retirement).
    pub fn remove_clause(&mut self, clause_id: ClauseId) {
        let dead: Vec<u64> = self
            .occurrences
            .iter()
            .filter(|(_, occ)| occ.clause_id == clause_id)
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            self.subterms.remove(EntryId(id));
            self.rewrite_lhs.remove(CodeEntryId(id));
            self.occurrences.remove(&id);
        }
    }

    pub fn unifiable_subterms(&self, factory: &TermFactory, query: &Term) -> Vec<(ClauseId, usize, bool, Term)> {
        self.subterms
            .unifiable(factory, query)
            .into_iter()
            .filter_map(|(EntryId(id), term)| {
                self.occurrences
                    .get(&id)
                    .map(|occ| (occ.clause_id, occ.literal_index, occ.left_side, term))
            })
            .collect()
    }

    pub fn rewrite_candidates(&self, factory: &TermFactory, query: &Term) -> Vec<(ClauseId, Term)> {
        self.rewrite_lhs
            .generalizations(factory, query)
            .into_iter()
            .filter_map(|(CodeEntryId(id), term)| self.occurrences.get(&id).map(|occ| (occ.clause_id, term)))
            .collect()
    }

    /// Indexed subterms that `query` generalizes: the backward-demodulation direction, used
    /// when `query` is a newly oriented rewrite rule's left-hand side and the caller needs
    /// every already-active occurrence that rule could now rewrite.
    pub fn instance_subterms(&self, factory: &TermFactory, query: &Term) -> Vec<(ClauseId, usize, bool, Term)> {
        self.subterms
            .instances(factory, query)
            .into_iter()
            .filter_map(|(EntryId(id), term)| {
                self.occurrences
                    .get(&id)
                    .map(|occ| (occ.clause_id, occ.literal_index, occ.left_side, term))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.subterms.is_empty() && self.rewrite_lhs.is_empty()
    }
}

impl ActiveObserver for IndexManager {
    /// Indexes a clause just activated: every literal's rewritable subterms for unification
    /// retrieval, plus its oriented left-hand side if it qualifies as a rewrite rule. This is
    /// the logic `ActiveSet::insert` used to apply by hand; moving it here means the index
    /// stays in sync purely by subscribing to `Active`'s events (spec.md 4.6).
    fn on_added(&mut self, id: ClauseId, clause: &Clause, ordering: &dyn TermOrdering) {
        for (i, literal) in clause.literals.iter().enumerate() {
            self.add_subterms(id, i, true, &literal.left);
            self.add_subterms(id, i, false, &literal.right);
        }
        if clause.is_rewrite_rule(ordering) {
            self.add_rewrite_rule(id, &clause.literals[0].left);
        }
    }

    fn on_removed(&mut self, id: ClauseId) {
        self.remove_clause(id);
    }
}

pub type VarId = AtomId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_clause() {
        let mut factory = TermFactory::new();
        let mut mgr = IndexManager::new();
        let term = factory.parse("f(g(x0))");
        mgr.add_subterms(7, 0, true, &term);
        assert!(!mgr.is_empty());
        mgr.remove_clause(7);
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_unifiable_subterms_reports_clause() {
        let mut factory = TermFactory::new();
        let mut mgr = IndexManager::new();
        let term = factory.parse("f(x0)");
        mgr.add_subterms(1, 0, true, &term);

        let query = factory.parse("f(c0)");
        let hits = mgr.unifiable_subterms(&factory, &query);
        assert!(hits.iter().any(|(cid, ..)| *cid == 1));
    }

    #[test]
    fn test_instance_subterms_finds_rewritable_occurrence() {
        let mut factory = TermFactory::new();
        let mut mgr = IndexManager::new();
        let term = factory.parse("f(c0)");
        mgr.add_subterms(1, 0, true, &term);

        let rule_lhs = factory.parse("f(x0)");
        let hits = mgr.instance_subterms(&factory, &rule_lhs);
        assert!(hits.iter().any(|(cid, ..)| *cid == 1));
    }

    #[test]
    fn test_on_added_indexes_and_on_removed_clears() {
        use crate::clause::Clause;
        use crate::literal::Literal;
        use crate::ordering::Kbo;

        let mut factory = TermFactory::new();
        let lhs = factory.parse("f(x0)");
        let rhs = factory.parse("c0");
        let clause = Clause::new(&factory, vec![Literal::equals(lhs, rhs)]);
        let ordering = Kbo::from_signature(&factory.signature);

        let mut mgr = IndexManager::new();
        mgr.on_added(1, &clause, &ordering);
        assert!(!mgr.is_empty());

        let query = factory.parse("f(c1)");
        assert!(!mgr.rewrite_candidates(&factory, &query).is_empty());

        mgr.on_removed(1);
        assert!(mgr.is_empty());
    }
}
