// Equality resolution and equality factoring: the two generating rules that consume a single
// premise (spec.md 4.5), grounded on the same Unifier::unify/apply_to_literal primitives
// resolution.rs uses.

use crate::clause::Clause;
use crate::literal::Literal;
use crate::ordering::{Comparison, TermOrdering};
use crate::term::TermFactory;
use crate::unifier::{Scope, Unifier};

/// From `C ∨ s ≠ t`, if σ = mgu(s, t), produce `Cσ` (spec.md 4.5). Tries every negative literal
/// in turn since more than one may unify.
pub fn equality_resolution(factory: &TermFactory, clause: &Clause) -> Vec<Clause> {
    let mut results = vec![];
    for (i, literal) in clause.literals.iter().enumerate() {
        if literal.positive {
            continue;
        }
        let mut u = Unifier::new(1);
        let scope = Scope::OUTPUT;
        if !u.unify(factory, scope, &literal.left, scope, &literal.right) {
            continue;
        }
        let mut literals = vec![];
        for (idx, lit) in clause.literals.iter().enumerate() {
            if idx == i {
                continue;
            }
            let (applied, _) = u.apply_to_literal(factory, scope, lit);
            literals.push(applied);
        }
        results.push(Clause::new(factory, literals));
    }
    results
}

/// From `C ∨ s = t ∨ u = v` with σ = mgu(s, u), produce `(C ∨ t ≠ v ∨ u = v)σ` when the ordering
/// side-condition holds: `sσ` must not be strictly smaller than `tσ` under `ordering` (spec.md
/// 4.5). Tries every ordered pair of positive equality literals.
pub fn equality_factoring(factory: &TermFactory, ordering: &dyn TermOrdering, clause: &Clause) -> Vec<Clause> {
    let mut results = vec![];
    let equalities: Vec<usize> = clause
        .literals
        .iter()
        .enumerate()
        .filter(|(_, l)| l.positive && l.is_equality_literal())
        .map(|(i, _)| i)
        .collect();

    for &i in &equalities {
        for &j in &equalities {
            if i == j {
                continue;
            }
            for (s, t) in [
                (&clause.literals[i].left, &clause.literals[i].right),
                (&clause.literals[i].right, &clause.literals[i].left),
            ] {
                let (u_side, v_side) = (&clause.literals[j].left, &clause.literals[j].right);
                let mut uni = Unifier::new(1);
                let scope = Scope::OUTPUT;
                if !uni.unify(factory, scope, s, scope, u_side) {
                    continue;
                }
                let s_applied = uni.apply(factory, scope, s);
                let t_applied = uni.apply(factory, scope, t);
                if ordering.compare(&s_applied, &t_applied) == Comparison::Less {
                    continue;
                }
                let u_applied = uni.apply(factory, scope, u_side);
                let v_applied = uni.apply(factory, scope, v_side);

                let mut literals = vec![
                    Literal::not_equals(t_applied, v_applied),
                    Literal::equals(u_applied, s_applied.clone()),
                ];
                for (idx, lit) in clause.literals.iter().enumerate() {
                    if idx == i || idx == j {
                        continue;
                    }
                    let (applied, _) = uni.apply_to_literal(factory, scope, lit);
                    literals.push(applied);
                }
                results.push(Clause::new(factory, literals));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Kbo;

    #[test]
    fn test_equality_resolution_closes_trivial_inequality() {
        let mut factory = TermFactory::new();
        let left = factory.parse("x0");
        let right = factory.parse("x0");
        let clause = Clause::new(&factory, vec![Literal::not_equals(left, right)]);
        // This clause is already a tautology-filtered impossible-free case; use a non-ground
        // variant that genuinely needs unification.
        let s = factory.parse("f(x0)");
        let t = factory.parse("f(x1)");
        let c2 = Clause::new(&factory, vec![Literal::not_equals(s, t)]);
        let _ = clause;
        let results = equality_resolution(&factory, &c2);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_impossible());
    }

    #[test]
    fn test_equality_factoring_produces_clause() {
        let mut factory = TermFactory::new();
        let s = factory.parse("x0");
        let t = factory.parse("c0");
        let u_term = factory.parse("x0");
        let v_term = factory.parse("c1");
        let clause = Clause::new(
            &factory,
            vec![Literal::equals(s, t), Literal::equals(u_term, v_term)],
        );
        let ordering = Kbo::from_signature(&factory.signature);
        let results = equality_factoring(&factory, &ordering, &clause);
        assert!(!results.is_empty());
    }
}
