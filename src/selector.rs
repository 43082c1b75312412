// Literal selection: picks which literals of a clause are eligible to participate in
// generating inferences (spec.md 4.3). No teacher module covers this (lacker-acorn's prover
// always uses every literal), so the policies below follow the prose description directly;
// the trait-object dispatch style mirrors `TermOrdering` in ordering.rs.

use std::cmp::Ordering as CmpOrdering;

use crate::atom::Atom;
use crate::clause::Clause;
use crate::literal::Literal;
use crate::ordering::{Comparison, TermOrdering};
use crate::term::Term;

/// Picks a non-empty subset of a clause's literal indices to participate in generating
/// inferences. A selection function is *complete* when every maximal clause has at least one
/// maximal negative literal selected, or all maximal literals selected (spec.md 4.3); each
/// policy below is complete by construction.
pub trait LiteralSelector {
    fn select(&self, clause: &Clause, ordering: &dyn TermOrdering) -> Vec<usize>;
}

/// The coarse predicate-precedence level a literal sits at (spec.md 4.3): equality atoms sit at
/// the reserved lowest level, a predicate atom sits at its own symbol's level.
fn literal_level(ordering: &dyn TermOrdering, literal: &Literal) -> u32 {
    if literal.is_equality_literal() {
        return 0;
    }
    match literal.left.head() {
        Atom::Symbol(s) => ordering.level(*s),
        Atom::Variable(_) => 0,
    }
}

/// The literal's two sides, with the one `ordering` ranks higher listed first. Ties and
/// incomparable pairs keep the literal's own left/right order, which is fine here since this
/// is only used to give two equality literals a deterministic pairwise comparison.
fn ordered_sides<'a>(ordering: &dyn TermOrdering, literal: &'a Literal) -> (&'a Term, &'a Term) {
    match ordering.compare(&literal.left, &literal.right) {
        Comparison::Less => (&literal.right, &literal.left),
        _ => (&literal.left, &literal.right),
    }
}

/// Compares two literals of the same clause the way the simplification ordering lifts to
/// literals (spec.md 4.2/4.3): first by predicate level, then -- for two literals at the same
/// level -- by the ordering's comparison of their atoms, breaking a tie on the larger side by
/// the smaller side. Used to find a clause's maximal literals instead of `Term::weight`, which
/// is blind to the ordering's precedence and variable-balance rules entirely.
fn literal_compare(ordering: &dyn TermOrdering, a: &Literal, b: &Literal) -> Comparison {
    match literal_level(ordering, a).cmp(&literal_level(ordering, b)) {
        CmpOrdering::Less => return Comparison::Less,
        CmpOrdering::Greater => return Comparison::Greater,
        CmpOrdering::Equal => {}
    }
    if a.is_equality_literal() && b.is_equality_literal() {
        let (hi_a, lo_a) = ordered_sides(ordering, a);
        let (hi_b, lo_b) = ordered_sides(ordering, b);
        match ordering.compare(hi_a, hi_b) {
            Comparison::Equal => ordering.compare(lo_a, lo_b),
            other => other,
        }
    } else {
        ordering.compare(&a.left, &b.left)
    }
}

/// The indices of every literal not strictly dominated by some other literal of the clause
/// under `literal_compare`. Never empty for a non-empty clause: a literal that isn't less than
/// any other is always maximal, and at least one literal must satisfy that (the relation is
/// irreflexive).
fn maximal_indices(clause: &Clause, ordering: &dyn TermOrdering) -> Vec<usize> {
    let n = clause.literals.len();
    let dominated = |i: usize| {
        (0..n).any(|j| j != i && literal_compare(ordering, &clause.literals[i], &clause.literals[j]) == Comparison::Less)
    };
    let mut result: Vec<usize> = (0..n).filter(|&i| !dominated(i)).collect();
    if result.is_empty() {
        result = (0..n).collect();
    }
    result
}

/// Selects every maximal literal under the simplification ordering lifted through predicate
/// precedence, with no negative-literal bias.
pub struct MaximalitySelector;

impl LiteralSelector for MaximalitySelector {
    fn select(&self, clause: &Clause, ordering: &dyn TermOrdering) -> Vec<usize> {
        maximal_indices(clause, ordering)
    }
}

/// If the clause has any negative literal, selects only the first (by position) negative
/// literal; otherwise falls back to all maximal literals. Negative-literal-first selection
/// tends to restrict the search space the most.
pub struct NegativePrioritySelector;

impl LiteralSelector for NegativePrioritySelector {
    fn select(&self, clause: &Clause, ordering: &dyn TermOrdering) -> Vec<usize> {
        if let Some(i) = clause.literals.iter().position(|l| !l.positive) {
            return vec![i];
        }
        maximal_indices(clause, ordering)
    }
}

/// Selects the single literal with the smallest weight among the maximal ones, reversing the
/// usual "pick the biggest" intuition to favor the literal most likely to be ground or simple.
pub struct ReverseMaximalSelector;

impl LiteralSelector for ReverseMaximalSelector {
    fn select(&self, clause: &Clause, ordering: &dyn TermOrdering) -> Vec<usize> {
        let candidates = maximal_indices(clause, ordering);
        let min = candidates
            .iter()
            .copied()
            .min_by_key(|&i| clause.literals[i].atom_count())
            .unwrap_or(0);
        vec![min]
    }
}

/// Among the maximal literals, selects the one(s) with the largest symbol count, trading
/// selectivity for clauses that shrink the fastest when their selected literal is eliminated.
pub struct SizeBasedSelector;

impl LiteralSelector for SizeBasedSelector {
    fn select(&self, clause: &Clause, ordering: &dyn TermOrdering) -> Vec<usize> {
        let candidates = maximal_indices(clause, ordering);
        let best = candidates.iter().map(|&i| clause.literals[i].atom_count()).max().unwrap_or(0);
        candidates.into_iter().filter(|&i| clause.literals[i].atom_count() == best).collect()
    }
}

pub fn by_name(name: &str) -> Box<dyn LiteralSelector> {
    match name {
        "negative" => Box::new(NegativePrioritySelector),
        "reverse" => Box::new(ReverseMaximalSelector),
        "size" => Box::new(SizeBasedSelector),
        _ => Box::new(MaximalitySelector),
    }
}

pub fn cmp_atom_count(a: u32, b: u32) -> CmpOrdering {
    a.cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use crate::ordering::Kbo;
    use crate::term::TermFactory;

    #[test]
    fn test_negative_priority_picks_negative() {
        let mut factory = TermFactory::new();
        let p = factory.parse("p(x0)");
        let q = factory.parse("q(x0)");
        let q_lit = Literal::positive_atom(&mut factory, q);
        let p_lit = Literal::negative_atom(&mut factory, p);
        let clause = Clause::new(&factory, vec![q_lit, p_lit]);
        let ordering = Kbo::from_signature(&factory.signature);
        let selected = NegativePrioritySelector.select(&clause, &ordering);
        assert_eq!(selected.len(), 1);
        assert!(!clause.literals[selected[0]].positive);
    }

    #[test]
    fn test_maximality_never_empty() {
        let mut factory = TermFactory::new();
        let p = factory.parse("p(x0)");
        let p_lit = Literal::positive_atom(&mut factory, p);
        let clause = Clause::new(&factory, vec![p_lit]);
        let ordering = Kbo::from_signature(&factory.signature);
        assert!(!MaximalitySelector.select(&clause, &ordering).is_empty());
    }
}
