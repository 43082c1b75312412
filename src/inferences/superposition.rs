// Superposition: the one generating rule that reaches into a subterm of another clause
// (spec.md 4.4/4.5). Grounded on Unifier::superpose_clauses, which already carries the
// path-splicing logic; this module is responsible for proposing candidate (paramodulator
// literal, resolver literal, subterm path) triples and checking the ordering side-conditions
// before committing to a unifier.

use crate::clause::Clause;
use crate::ordering::{Comparison, TermOrdering};
use crate::selector::LiteralSelector;
use crate::term::TermFactory;
use crate::unifier::{Scope, Unifier};

/// All superposition inferences from a positive equation selected in `pm` into a subterm of a
/// selected literal of `res` (spec.md 4.5's superposition rule). `pm` and `res` may be the same
/// clause (self-superposition), since the two scopes keep their variables separate regardless.
pub fn superpose(
    factory: &TermFactory,
    ordering: &dyn TermOrdering,
    selector: &dyn LiteralSelector,
    pm: &Clause,
    res: &Clause,
) -> Vec<Clause> {
    let mut results = vec![];
    let pm_selected = selector.select(pm, ordering);
    let res_selected = selector.select(res, ordering);

    for &pi in &pm_selected {
        let pm_literal = &pm.literals[pi];
        if !pm_literal.positive {
            continue;
        }
        for (_, s, t) in pm_literal.both_term_pairs() {
            if s.is_variable() {
                continue;
            }
            for &ri in &res_selected {
                let res_literal = &res.literals[ri];
                for res_forwards in [true, false] {
                    let u = if res_forwards { &res_literal.left } else { &res_literal.right };
                    for (path, subterm) in u.rewritable_subterms() {
                        let mut unifier = Unifier::new(3);
                        if !unifier.unify(factory, Scope::LEFT, s, Scope::RIGHT, &subterm) {
                            continue;
                        }
                        let s_applied = unifier.apply(factory, Scope::LEFT, s);
                        let t_applied = unifier.apply(factory, Scope::LEFT, t);
                        if ordering.compare(&s_applied, &t_applied) == Comparison::Less {
                            continue;
                        }
                        let literals = unifier.superpose_clauses(factory, t, pm, pi, &path, res, ri, res_forwards);
                        results.push(Clause::new(factory, literals));
                    }
                }
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use crate::ordering::Kbo;
    use crate::selector::MaximalitySelector;

    #[test]
    fn test_superposition_rewrites_subterm() {
        let mut factory = TermFactory::new();
        // f(x0) = c0  |  p(f(c1))  =>  p(c0)
        let fx0 = factory.parse("f(x0)");
        let c0 = factory.parse("c0");
        let pm_lit = Literal::equals(fx0, c0);
        let pm = Clause::new(&factory, vec![pm_lit]);

        let fc1 = factory.parse("f(c1)");
        let p_symbol = factory.signature.intern("p", 1);
        let p_fc1 = factory.app(p_symbol, vec![fc1]);
        let res_lit = Literal::positive_atom(&mut factory, p_fc1);
        let res = Clause::new(&factory, vec![res_lit]);

        let ordering = Kbo::from_signature(&factory.signature);
        let results = superpose(&factory, &ordering, &MaximalitySelector, &pm, &res);
        assert!(!results.is_empty());
        let rewritten = factory.parse("p(c0)");
        let truth = factory.truth();
        let expected_lit = Literal::new_with_flip(true, rewritten, truth).0;
        let expected = Clause::new(&factory, vec![expected_lit]);
        assert!(results.iter().any(|c| *c == expected));
    }

    #[test]
    fn test_self_superposition_refutes_incompatible_unit_equations() {
        let mut factory = TermFactory::new();
        let f_x0 = factory.parse("f(x0)");
        let c0 = factory.parse("c0");
        let pm = Clause::new(&factory, vec![Literal::equals(f_x0, c0)]);

        let f_c1 = factory.parse("f(c1)");
        let c2 = factory.parse("c2");
        let res = Clause::new(&factory, vec![Literal::not_equals(f_c1, c2)]);

        let ordering = Kbo::from_signature(&factory.signature);
        let results = superpose(&factory, &ordering, &MaximalitySelector, &pm, &res);
        assert!(!results.is_empty());
    }
}
