// Binary resolution and ordinary (non-equality) factoring.
//
// Grounded on the teacher's unifier.rs unify/apply_to_literal machinery; the control logic
// (iterate selected-literal pairs, try to unify, build the survivor clause) follows the same
// shape active_set.rs uses for its resolution loop, generalized from whole-clause scanning to
// the selected-literal subset spec.md 4.3 requires.

use crate::clause::Clause;
use crate::literal::Literal;
use crate::ordering::TermOrdering;
use crate::selector::LiteralSelector;
use crate::term::TermFactory;
use crate::unifier::{Scope, Unifier};

/// Binary resolution between a selected literal `L` in `c` and a complementary selected literal
/// `¬K` in `d` (spec.md 4.5): `L` and `¬K` must be non-equality atoms of opposite sign whose
/// atoms unify. Equality literals are handled by equality resolution / superposition instead.
pub fn binary_resolution(
    factory: &TermFactory,
    ordering: &dyn TermOrdering,
    selector: &dyn LiteralSelector,
    c: &Clause,
    d: &Clause,
) -> Vec<Clause> {
    let mut results = vec![];
    let c_selected = selector.select(c, ordering);
    let d_selected = selector.select(d, ordering);

    for &i in &c_selected {
        let l = &c.literals[i];
        if l.is_equality_literal() {
            continue;
        }
        for &j in &d_selected {
            let k = &d.literals[j];
            if k.is_equality_literal() || k.positive == l.positive {
                continue;
            }
            let mut u = Unifier::new(3);
            if !u.unify(factory, Scope::LEFT, &l.left, Scope::RIGHT, &k.left) {
                continue;
            }
            let mut literals = vec![];
            for (idx, lit) in c.literals.iter().enumerate() {
                if idx == i {
                    continue;
                }
                let (applied, _) = u.apply_to_literal(factory, Scope::LEFT, lit);
                literals.push(applied);
            }
            for (idx, lit) in d.literals.iter().enumerate() {
                if idx == j {
                    continue;
                }
                let (applied, _) = u.apply_to_literal(factory, Scope::RIGHT, lit);
                literals.push(applied);
            }
            results.push(Clause::new(factory, literals));
        }
    }
    results
}

/// Ordinary factoring: from `C ∨ L ∨ L'` with σ = mgu(L, L'), produce `(C ∨ L)σ` (spec.md 4.5).
/// `L` and `L'` must have the same sign and both be non-equality atoms.
pub fn factoring(factory: &TermFactory, clause: &Clause) -> Vec<Clause> {
    let mut results = vec![];
    let n = clause.literals.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&clause.literals[i], &clause.literals[j]);
            if a.is_equality_literal() || b.is_equality_literal() || a.positive != b.positive {
                continue;
            }
            let mut u = Unifier::new(1);
            let scope = crate::unifier::Scope::OUTPUT;
            if !u.unify(factory, scope, &a.left, scope, &b.left) {
                continue;
            }
            let mut literals = vec![];
            for (idx, lit) in clause.literals.iter().enumerate() {
                if idx == j {
                    continue;
                }
                let (applied, _) = u.apply_to_literal(factory, scope, lit);
                literals.push(applied);
            }
            results.push(Clause::new(factory, literals));
        }
    }
    results
}

pub fn is_complementary(a: &Literal, b: &Literal) -> bool {
    a.positive != b.positive && a.left == b.left && a.right == b.right
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Kbo;
    use crate::selector::MaximalitySelector;

    #[test]
    fn test_binary_resolution_refutation() {
        let mut factory = TermFactory::new();
        let p = factory.parse("p(c0)");
        let p_lit = Literal::positive_atom(&mut factory, p);
        let c = Clause::new(&factory, vec![p_lit]);
        let np = factory.parse("p(x0)");
        let np_lit = Literal::negative_atom(&mut factory, np);
        let d = Clause::new(&factory, vec![np_lit]);

        let ordering = Kbo::from_signature(&factory.signature);
        let results = binary_resolution(&factory, &ordering, &MaximalitySelector, &c, &d);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_impossible());
    }

    #[test]
    fn test_factoring() {
        let mut factory = TermFactory::new();
        let p1 = factory.parse("p(x0)");
        let p2 = factory.parse("p(c0)");
        let p1_lit = Literal::positive_atom(&mut factory, p1);
        let p2_lit = Literal::positive_atom(&mut factory, p2);
        let clause = Clause::new(&factory, vec![p1_lit, p2_lit]);
        let results = factoring(&factory, &clause);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].len(), 1);
    }
}
