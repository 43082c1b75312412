// Subsumption and subsumption resolution (spec.md 4.5). Both are expressed as variants of the
// same backtracking multiset-match: find a substitution that embeds one clause's literals into
// another's. `Clause::contains` only checks exact (already-instantiated) containment, so this
// module adds the substitution-aware version subsumption actually needs.

use std::collections::HashMap;

use crate::atom::{Atom, AtomId};
use crate::clause::Clause;
use crate::literal::Literal;
use crate::term::{Term, TermFactory};

fn match_term(general: &Term, specific: &Term, bindings: &mut HashMap<AtomId, Term>) -> bool {
    if let Some(v) = general.as_variable() {
        return match bindings.get(&v) {
            Some(bound) => bound == specific,
            None => {
                bindings.insert(v, specific.clone());
                true
            }
        };
    }
    match (general.head(), specific.head()) {
        (Atom::Symbol(a), Atom::Symbol(b)) => {
            if a != b || general.args().len() != specific.args().len() {
                return false;
            }
            general.args().iter().zip(specific.args()).all(|(g, s)| match_term(g, s, bindings))
        }
        _ => false,
    }
}

/// Matches one literal of the subsumer against one literal of the candidate, trying both
/// orientations since equality (and `$true`-dressed predicate atoms) is symmetric. Returns the
/// bindings extended with whatever this literal required, or `None` if no orientation matches.
fn literal_matches(
    general: &Literal,
    specific: &Literal,
    bindings: &HashMap<AtomId, Term>,
) -> Option<HashMap<AtomId, Term>> {
    if general.positive != specific.positive {
        return None;
    }
    let mut direct = bindings.clone();
    if match_term(&general.left, &specific.left, &mut direct) && match_term(&general.right, &specific.right, &mut direct) {
        return Some(direct);
    }
    let mut swapped = bindings.clone();
    if match_term(&general.left, &specific.right, &mut swapped) && match_term(&general.right, &specific.left, &mut swapped) {
        return Some(swapped);
    }
    None
}

fn try_embed(
    remaining: &[Literal],
    pool: &[Literal],
    used: &mut [bool],
    bindings: &HashMap<AtomId, Term>,
) -> bool {
    let (first, rest) = match remaining.split_first() {
        None => return true,
        Some(pair) => pair,
    };
    for (i, candidate) in pool.iter().enumerate() {
        if used[i] {
            continue;
        }
        if let Some(extended) = literal_matches(first, candidate, bindings) {
            used[i] = true;
            if try_embed(rest, pool, used, &extended) {
                return true;
            }
            used[i] = false;
        }
    }
    false
}

/// Whether `subsumer` subsumes `candidate`: some substitution σ makes `subsumer`σ a sub-multiset
/// of `candidate`'s literals (spec.md 4.5). A subsumed clause is redundant and can be deleted
/// outright, forwards if found while simplifying a new clause, backwards if it makes an existing
/// Active/Passive clause redundant instead.
pub fn subsumes(subsumer: &Clause, candidate: &Clause) -> bool {
    if subsumer.len() > candidate.len() {
        return false;
    }
    let mut used = vec![false; candidate.len()];
    try_embed(&subsumer.literals, &candidate.literals, &mut used, &HashMap::new())
}

/// Subsumption resolution (spec.md 4.5): if `D ∨ m` and `C ∨ l` are such that `m` and `l` are
/// complementary under some substitution σ and `Dσ ⊆ C`, then `C` simplifies to `C` with `l`
/// removed. Tries every literal of `subsumer` as the complementary one.
pub fn subsumption_resolution(factory: &TermFactory, subsumer: &Clause, target: &Clause) -> Option<Clause> {
    for (mi, m) in subsumer.literals.iter().enumerate() {
        for (li, l) in target.literals.iter().enumerate() {
            if m.positive == l.positive {
                continue;
            }
            let mut bindings = HashMap::new();
            let matched = (match_term(&m.left, &l.left, &mut bindings) && match_term(&m.right, &l.right, &mut bindings))
                || {
                    bindings.clear();
                    match_term(&m.left, &l.right, &mut bindings) && match_term(&m.right, &l.left, &mut bindings)
                };
            if !matched {
                continue;
            }
            let rest_subsumer: Vec<Literal> = subsumer
                .literals
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != mi)
                .map(|(_, l)| l.clone())
                .collect();
            let rest_target: Vec<Literal> = target
                .literals
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != li)
                .map(|(_, l)| l.clone())
                .collect();
            let mut used = vec![false; rest_target.len()];
            if try_embed(&rest_subsumer, &rest_target, &mut used, &bindings) {
                return Some(Clause::new(factory, rest_target));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_clause_subsumes_instance() {
        let mut factory = TermFactory::new();
        let p_x0 = factory.parse("p(x0)");
        let p_x0_lit = Literal::positive_atom(&mut factory, p_x0);
        let subsumer = Clause::new(&factory, vec![p_x0_lit]);
        let p_c0 = factory.parse("p(c0)");
        let q_c1 = factory.parse("q(c1)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let candidate = Clause::new(&factory, vec![p_c0_lit, q_c1_lit]);
        assert!(subsumes(&subsumer, &candidate));
    }

    #[test]
    fn test_non_matching_sign_does_not_subsume() {
        let mut factory = TermFactory::new();
        let p_x0 = factory.parse("p(x0)");
        let p_x0_lit = Literal::negative_atom(&mut factory, p_x0);
        let subsumer = Clause::new(&factory, vec![p_x0_lit]);
        let p_c0 = factory.parse("p(c0)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let candidate = Clause::new(&factory, vec![p_c0_lit]);
        assert!(!subsumes(&subsumer, &candidate));
    }

    #[test]
    fn test_subsumption_resolution_drops_complementary_literal() {
        let mut factory = TermFactory::new();
        // D = ~p(x0) ; C = p(c0) | q(c1)  =>  C simplifies to q(c1)
        let p_x0 = factory.parse("p(x0)");
        let p_x0_lit = Literal::negative_atom(&mut factory, p_x0);
        let subsumer = Clause::new(&factory, vec![p_x0_lit]);
        let p_c0 = factory.parse("p(c0)");
        let q_c1 = factory.parse("q(c1)");
        let p_c0_lit = Literal::positive_atom(&mut factory, p_c0);
        let q_c1_lit = Literal::positive_atom(&mut factory, q_c1);
        let target = Clause::new(&factory, vec![p_c0_lit, q_c1_lit]);
        let result = subsumption_resolution(&factory, &subsumer, &target).expect("should simplify");
        assert_eq!(result.len(), 1);
        assert!(result.literals[0].positive);
    }
}
