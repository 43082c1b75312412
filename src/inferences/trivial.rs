// Tautology deletion and duplicate-literal removal already happen inside Clause::new's
// construction pipeline (clause.rs); this module exposes the standalone predicate spec.md 4.5's
// "immediate simplify" step checks before a new clause is queued, plus pure-literal elimination
// for the satisfiability-oriented saturation modes that want it run once up front.

use std::collections::HashSet;

use crate::clause::Clause;
use crate::term::{Term, TermFactory};

pub fn is_trivial(clause: &Clause) -> bool {
    clause.is_tautology()
}

/// Drops every clause that contains a pure literal: an atom that occurs with only one polarity
/// across the whole set (spec.md 4.5). A clause containing one is satisfied by assigning that
/// atom the polarity it always carries, so the whole clause is redundant, not just the literal.
pub fn eliminate_pure_literals(factory: &TermFactory, clauses: &[Clause]) -> Vec<Clause> {
    let mut positive_atoms: HashSet<(Term, Term)> = HashSet::new();
    let mut negative_atoms: HashSet<(Term, Term)> = HashSet::new();
    for clause in clauses {
        for literal in &clause.literals {
            let key = (literal.left.clone(), literal.right.clone());
            if literal.positive {
                positive_atoms.insert(key);
            } else {
                negative_atoms.insert(key);
            }
        }
    }

    let mut out = vec![];
    'clauses: for clause in clauses {
        for literal in &clause.literals {
            let key = (literal.left.clone(), literal.right.clone());
            let pure = if literal.positive {
                !negative_atoms.contains(&key)
            } else {
                !positive_atoms.contains(&key)
            };
            if pure {
                continue 'clauses;
            }
        }
        out.push(Clause::new(factory, clause.literals.clone()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;

    #[test]
    fn test_is_trivial_matches_tautology() {
        let mut factory = TermFactory::new();
        let p1 = factory.parse("p(x0)");
        let p2 = factory.parse("p(x0)");
        let p1_lit = Literal::positive_atom(&mut factory, p1);
        let p2_lit = Literal::negative_atom(&mut factory, p2);
        let clause = Clause::new(&factory, vec![p1_lit, p2_lit]);
        assert!(is_trivial(&clause));
    }

    #[test]
    fn test_pure_literal_elimination_drops_whole_clause() {
        let mut factory = TermFactory::new();
        let p_c0 = factory.parse("p(c0)");
        let q_c1 = factory.parse("q(c1)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let clause_a = Clause::new(&factory, vec![p_c0_lit, q_c1_lit]);
        // q never appears negated anywhere, so q(c1) is pure and clause_a is redundant.
        let q_c2 = factory.parse("q(c2)");
        let q_c2_lit = Literal::positive_atom(&mut factory, q_c2);
        let clause_b = Clause::new(&factory, vec![q_c2_lit]);

        let filtered = eliminate_pure_literals(&factory, &[clause_a, clause_b]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_pure_literal_elimination_keeps_mixed_clauses() {
        let mut factory = TermFactory::new();
        let p_c0 = factory.parse("p(c0)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let clause_a = Clause::new(&factory, vec![p_c0_lit]);
        let p_c1 = factory.parse("p(c1)");
        let p_c1_lit = Literal::negative_atom(&mut factory, p_c1);
        let clause_b = Clause::new(&factory, vec![p_c1_lit]);

        let filtered = eliminate_pure_literals(&factory, &[clause_a, clause_b]);
        assert_eq!(filtered.len(), 2);
    }
}
