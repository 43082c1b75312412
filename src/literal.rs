// A literal: a signed equality `s = t` or `s != t`. Plain predicate atoms `p(args)` are
// stored as `p(args) = $true`, so every literal shares one representation and the ordering,
// demodulation, and superposition code never need a predicate-only code path. This mirrors
// the teacher's clause.rs/active_set.rs, which do the same thing with an `is_true()` helper.

use std::fmt;

use crate::atom::{Atom, AtomId};
use crate::ordering::{Comparison, TermOrdering};
use crate::term::{Term, TermFactory, TRUTH_SYMBOL};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub positive: bool,
    pub left: Term,
    pub right: Term,
}

impl Literal {
    pub fn new(positive: bool, left: Term, right: Term) -> Literal {
        Literal {
            positive,
            left,
            right,
        }
    }

    pub fn equals(left: Term, right: Term) -> Literal {
        Literal::new(true, left, right)
    }

    pub fn not_equals(left: Term, right: Term) -> Literal {
        Literal::new(false, left, right)
    }

    pub fn positive_atom(factory: &mut TermFactory, atom: Term) -> Literal {
        let truth = factory.truth();
        Literal::new(true, atom, truth)
    }

    pub fn negative_atom(factory: &mut TermFactory, atom: Term) -> Literal {
        let truth = factory.truth();
        Literal::new(false, atom, truth)
    }

    pub fn is_true(&self) -> bool {
        is_truth_term(&self.right)
    }

    /// True iff this literal is a genuine equality between two non-boolean sides, as opposed
    /// to a dressed-up predicate atom. Compares against the reserved `$true` symbol id
    /// (`TRUTH_SYMBOL`), not a formatted name, so a user-defined symbol that merely prints the
    /// same way can never be mistaken for the marker.
    pub fn is_equality_literal(&self) -> bool {
        !is_truth_term(&self.right) && !is_truth_term(&self.left)
    }

    /// `s = s` or `s != t` where `s` and `t` are identical: always true or always false.
    pub fn is_tautology(&self) -> bool {
        self.positive && self.left == self.right
    }

    pub fn is_impossible(&self) -> bool {
        !self.positive && self.left == self.right
    }

    pub fn atom_count(&self) -> u32 {
        self.left.symbol_count() + self.right.symbol_count()
    }

    pub fn has_any_variable(&self) -> bool {
        !self.left.free_vars().is_empty() || !self.right.free_vars().is_empty()
    }

    /// Returns `(forwards, s, t)` for each orientation this literal could be used to rewrite
    /// with, if it is an oriented or unoriented positive equation. An unoriented equation
    /// yields both orientations (spec.md 4.5: "unoriented equalities yield two attempts").
    pub fn both_term_pairs(&self) -> Vec<(bool, &Term, &Term)> {
        if !self.positive || is_truth_term(&self.right) {
            return vec![];
        }
        vec![(true, &self.left, &self.right), (false, &self.right, &self.left)]
    }

    /// Caches and returns this literal's argument order under `ordering` (spec.md 4.2's
    /// `getEqualityArgumentOrder`). Non-equality (predicate) literals always compare `Equal`,
    /// since rewriting never needs to pick a maximal side for them.
    pub fn argument_order(&self, ordering: &dyn TermOrdering) -> Comparison {
        if is_truth_term(&self.right) {
            return Comparison::Equal;
        }
        ordering.compare(&self.left, &self.right)
    }

    /// The literal with its sides swapped, and `flipped = true` reported so callers can
    /// update any trace that records orientation.
    pub fn flip(&self) -> Literal {
        Literal::new(self.positive, self.right.clone(), self.left.clone())
    }

    /// Canonicalizes an output literal by swapping sides when the left weighs more than the
    /// right, purely to give the same literal the same representation regardless of which
    /// order an inference happened to produce it in; returns whether it swapped.
    pub fn new_with_flip(positive: bool, left: Term, right: Term) -> (Literal, bool) {
        if left.weight() < right.weight()
            || (left.weight() == right.weight() && format!("{}", left) > format!("{}", right))
        {
            (Literal::new(positive, right, left), true)
        } else {
            (Literal::new(positive, left, right), false)
        }
    }

    pub fn num_quantifiers(&self) -> AtomId {
        let max_left = self.left.free_vars().iter().copied().max();
        let max_right = self.right.free_vars().iter().copied().max();
        match (max_left, max_right) {
            (Some(a), Some(b)) => a.max(b) + 1,
            (Some(a), None) => a + 1,
            (None, Some(b)) => b + 1,
            (None, None) => 0,
        }
    }
}

fn is_truth_term(term: &Term) -> bool {
    term.args().is_empty() && *term.head() == Atom::Symbol(TRUTH_SYMBOL)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if is_truth_term(&self.right) {
            if !self.positive {
                write!(f, "~")?;
            }
            return write!(f, "{}", self.left);
        }
        let op = if self.positive { "=" } else { "!=" };
        write!(f, "{} {} {}", self.left, op, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tautology() {
        let mut factory = TermFactory::new();
        let t = factory.parse("x0");
        assert!(Literal::equals(t.clone(), t.clone()).is_tautology());
        assert!(!Literal::not_equals(t.clone(), t).is_tautology());
    }

    #[test]
    fn test_predicate_as_equality() {
        let mut factory = TermFactory::new();
        let atom = factory.parse("p(x0)");
        let lit = Literal::positive_atom(&mut factory, atom);
        assert!(!lit.is_equality_literal());
        assert_eq!(format!("{}", lit), "p(x0)");
    }
}
