// A clause: a multiset of literals, universally quantified over its variables. Duplicates are
// allowed at creation but eliminated by Clause::new's canonical dedup step (spec.md 3).
//
// Adapted from the teacher's clause.rs: the sort/dedup/renumber pipeline is unchanged, but
// literals are no longer Acorn-specific (they carry shared Terms from a TermFactory), and
// `is_rewrite_rule` takes an explicit ordering instead of a single hardcoded KBO.

use std::collections::HashMap;
use std::fmt;

use crate::atom::AtomId;
use crate::literal::Literal;
use crate::ordering::TermOrdering;
use crate::term::TermFactory;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub literals: Vec<Literal>,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.literals.is_empty() {
            return write!(f, "$false");
        }
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}

impl Clause {
    /// Sorts literals, removes duplicates and any literal that is trivially false (`s != s`),
    /// and renumbers variables to a canonical `0..n` sequence in order of first appearance.
    /// An empty result represents the empty clause (`⊥`).
    pub fn new(factory: &TermFactory, literals: Vec<Literal>) -> Clause {
        let mut literals: Vec<Literal> = literals
            .into_iter()
            .filter(|l| !l.is_impossible())
            .collect();
        literals.sort();
        literals.dedup();

        let mut next_id: AtomId = 0;
        let mut map: HashMap<AtomId, AtomId> = HashMap::new();
        for literal in &literals {
            for v in literal.left.free_vars().iter().chain(literal.right.free_vars()) {
                map.entry(*v).or_insert_with(|| {
                    let id = next_id;
                    next_id += 1;
                    id
                });
            }
        }
        let literals = literals
            .into_iter()
            .map(|l| {
                Literal::new(
                    l.positive,
                    l.left.map_vars(factory, &map),
                    l.right.map_vars(factory, &map),
                )
            })
            .collect();
        Clause { literals }
    }

    pub fn impossible() -> Clause {
        Clause { literals: vec![] }
    }

    pub fn from_literal(literal: Literal, factory: &TermFactory) -> Clause {
        Clause::new(factory, vec![literal])
    }

    pub fn num_quantifiers(&self) -> AtomId {
        self.literals
            .iter()
            .map(|l| l.num_quantifiers())
            .max()
            .unwrap_or(0)
    }

    /// A clause is a tautology if it contains a literal and its negation, or a reflexive
    /// equality `s = s` (spec.md 4.7's `immediateSimplify`).
    pub fn is_tautology(&self) -> bool {
        if let Some(first_pos) = self.literals.iter().position(|l| l.positive) {
            for neg in &self.literals[..first_pos] {
                for pos in &self.literals[first_pos..] {
                    if neg.left == pos.left && neg.right == pos.right {
                        return true;
                    }
                }
            }
        }
        self.literals.iter().any(|l| l.is_tautology())
    }

    pub fn is_impossible(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Sum of literal sizes, used as the "Weight" in spec.md 3's age/weight passive ordering.
    pub fn weight(&self) -> u32 {
        self.literals.iter().map(|l| l.atom_count()).sum()
    }

    /// A unit equation `l = r` that is oriented `l ≻ r` by `ordering` can serve as a rewrite
    /// rule for demodulation (spec.md 4.5).
    pub fn is_rewrite_rule(&self, ordering: &dyn TermOrdering) -> bool {
        if self.literals.len() != 1 {
            return false;
        }
        let literal = &self.literals[0];
        literal.positive
            && literal.is_equality_literal()
            && literal.argument_order(ordering) == crate::ordering::Comparison::Greater
    }

    pub fn has_any_variable(&self) -> bool {
        self.literals.iter().any(|l| l.has_any_variable())
    }

    pub fn num_positive_literals(&self) -> usize {
        self.literals.iter().filter(|l| l.positive).count()
    }

    /// Multiset containment, used by subsumption (`Dσ ⊆ C`, spec.md 4.5).
    pub fn contains(&self, other: &Clause) -> bool {
        let mut remaining = self.literals.clone();
        for lit in &other.literals {
            match remaining.iter().position(|l| l == lit) {
                Some(idx) => {
                    remaining.remove(idx);
                }
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Kbo;

    fn parse_clause(factory: &mut TermFactory, s: &str) -> Clause {
        let mut literals = vec![];
        for part in s.split(" | ") {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix('~') {
                let atom = factory.parse(rest);
                literals.push(Literal::negative_atom(factory, atom));
            } else if let Some((l, r)) = part.split_once(" != ") {
                literals.push(Literal::not_equals(factory.parse(l), factory.parse(r)));
            } else if let Some((l, r)) = part.split_once(" = ") {
                literals.push(Literal::equals(factory.parse(l), factory.parse(r)));
            } else {
                let atom = factory.parse(part);
                literals.push(Literal::positive_atom(factory, atom));
            }
        }
        Clause::new(factory, literals)
    }

    #[test]
    fn test_tautology_detection() {
        let mut factory = TermFactory::new();
        let clause = parse_clause(&mut factory, "p(x0) | ~p(x0)");
        assert!(clause.is_tautology());
    }

    #[test]
    fn test_dedup_and_impossible_filtering() {
        let mut factory = TermFactory::new();
        let clause = parse_clause(&mut factory, "p(c0) | p(c0)");
        assert_eq!(clause.len(), 1);
    }

    #[test]
    fn test_variable_renumbering() {
        let mut factory = TermFactory::new();
        let left = Literal::not_equals(factory.parse("x5"), factory.parse("c0"));
        let right = Literal::equals(factory.parse("x5"), factory.parse("x2"));
        let clause = Clause::new(&factory, vec![left, right]);
        let rendered = format!("{}", clause);
        assert!(rendered.contains("x0"));
        assert!(!rendered.contains("x5"));
    }

    #[test]
    fn test_clause_is_rewrite_rule() {
        let mut factory = TermFactory::new();
        let ordering = Kbo::from_signature(&factory.signature);
        assert!(parse_clause(&mut factory, "c0(x0) = x0").is_rewrite_rule(&ordering));
        assert!(!parse_clause(&mut factory, "c0(x0) != x0").is_rewrite_rule(&ordering));
    }
}
