// A mapping from variable id to term, used as one scope's half of a Unifier's substitution.
//
// Grounded on the teacher's unifier.rs, which keeps one VariableMap per bank ("scope") so
// that two clauses can be unified without first renaming either of them apart.

use std::fmt;

use crate::atom::AtomId;
use crate::term::Term;

#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    bindings: Vec<Option<Term>>,
}

impl VariableMap {
    pub fn new() -> VariableMap {
        VariableMap::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn push_none(&mut self) {
        self.bindings.push(None);
    }

    pub fn has_mapping(&self, id: AtomId) -> bool {
        (id as usize) < self.bindings.len() && self.bindings[id as usize].is_some()
    }

    pub fn get_mapping(&self, id: AtomId) -> Option<&Term> {
        self.bindings.get(id as usize).and_then(|t| t.as_ref())
    }

    pub fn set(&mut self, id: AtomId, term: Term) {
        let idx = id as usize;
        if idx >= self.bindings.len() {
            self.bindings.resize(idx + 1, None);
        }
        self.bindings[idx] = Some(term);
    }

    /// Removes a binding, used to implement the unifier's `backtrack` contract from spec.md
    /// 4.1: failed unification attempts must leave no bindings committed.
    pub fn unset(&mut self, id: AtomId) {
        if let Some(slot) = self.bindings.get_mut(id as usize) {
            *slot = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &Term)> {
        self.bindings
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (i as AtomId, t)))
    }

    pub fn apply_to_all(&mut self, mut f: impl FnMut(&Term) -> Term) {
        for slot in &mut self.bindings {
            if let Some(t) = slot {
                *t = f(t);
            }
        }
    }
}

impl fmt::Display for VariableMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.iter() {
            writeln!(f, "x{} -> {}", i, t)?;
        }
        Ok(())
    }
}
