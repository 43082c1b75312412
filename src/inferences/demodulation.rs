// Demodulation: simplification by rewriting with an oriented unit equation (spec.md 4.5).
// Forward demodulation rewrites the given clause using equations already in Active; backward
// demodulation runs the other way when a new oriented unit equation is about to enter Active,
// checking whether it can simplify clauses already there. Both share one core: find a subterm
// matching (not unifying with) the rule's left-hand side, under a substitution that strictly
// decreases the term ordering once applied.

use crate::clause::Clause;
use crate::literal::Literal;
use crate::ordering::{Comparison, TermOrdering};
use crate::term::{match_generalization, Term, TermFactory};

/// A single oriented rewrite rule `lhs -> rhs`, taken from a unit equation clause that is
/// strictly ordered under `ordering` (spec.md 4.2: "is_rewrite_rule").
pub struct RewriteRule<'a> {
    pub lhs: &'a Term,
    pub rhs: &'a Term,
}

impl<'a> RewriteRule<'a> {
    /// Builds the rule a unit equation clause represents, if it is in fact orientable.
    pub fn from_clause(clause: &'a Clause, ordering: &dyn TermOrdering) -> Option<RewriteRule<'a>> {
        if clause.literals.len() != 1 || !clause.literals[0].positive {
            return None;
        }
        let literal = &clause.literals[0];
        match ordering.compare(&literal.left, &literal.right) {
            Comparison::Greater => Some(RewriteRule { lhs: &literal.left, rhs: &literal.right }),
            Comparison::Less => Some(RewriteRule { lhs: &literal.right, rhs: &literal.left }),
            Comparison::Equal | Comparison::Incomparable => None,
        }
    }
}

/// Rewrites one subterm of `term` using `rule`, if some subterm is a generalization-match for
/// `rule.lhs`. Tries subterms top-down, left to right, and stops at the first hit (spec.md 4.5:
/// demodulation only needs one rewrite per simplification attempt; the loop outside reapplies
/// it until no more rules fire).
fn rewrite_one_step(factory: &TermFactory, term: &Term, rule: &RewriteRule) -> Option<Term> {
    for (path, subterm) in term.rewritable_subterms() {
        if let Some(bindings) = match_generalization(rule.lhs, &subterm) {
            let replacement = rule.rhs.substitute(factory, &bindings);
            return Some(splice(factory, term, &path, &replacement));
        }
    }
    None
}

fn splice(factory: &TermFactory, term: &Term, path: &[usize], replacement: &Term) -> Term {
    match path.split_first() {
        None => replacement.clone(),
        Some((&i, rest)) => {
            let mut args: Vec<Term> = term.args().to_vec();
            args[i] = splice(factory, &args[i], rest, replacement);
            match term.head() {
                crate::atom::Atom::Symbol(s) => factory.app(*s, args),
                crate::atom::Atom::Variable(_) => unreachable!("path descends into a variable"),
            }
        }
    }
}

/// Rewrites `clause` to a fixed point against `rules`, returning `None` if nothing applied.
/// Mirrors spec.md 4.6's "forward-simplify the selected clause against Active": repeatedly
/// rewrite until no rule matches any literal.
pub fn forward_demodulate(factory: &TermFactory, clause: &Clause, rules: &[RewriteRule]) -> Option<Clause> {
    let mut literals = clause.literals.clone();
    let mut changed = false;
    loop {
        let mut progressed = false;
        for literal in literals.iter_mut() {
            for rule in rules {
                if let Some(new_left) = rewrite_one_step(factory, &literal.left, rule) {
                    literal.left = new_left;
                    progressed = true;
                    changed = true;
                }
                if let Some(new_right) = rewrite_one_step(factory, &literal.right, rule) {
                    literal.right = new_right;
                    progressed = true;
                    changed = true;
                }
            }
        }
        if !progressed {
            break;
        }
    }
    if changed {
        Some(Clause::new(factory, literals))
    } else {
        None
    }
}

/// Backward demodulation: given a newly oriented unit rule, finds which clauses in `candidates`
/// it can simplify (spec.md 4.5). Returns the rewritten replacements; the caller is responsible
/// for retracting the originals from Active and re-queuing the replacements.
pub fn backward_demodulate(factory: &TermFactory, rule: &RewriteRule, candidates: &[Clause]) -> Vec<(usize, Clause)> {
    let mut out = vec![];
    for (i, candidate) in candidates.iter().enumerate() {
        if let Some(rewritten) = forward_demodulate(factory, candidate, std::slice::from_ref(rule)) {
            out.push((i, rewritten));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Kbo;

    #[test]
    fn test_forward_demodulation_rewrites_ground_subterm() {
        let mut factory = TermFactory::new();
        let lhs = factory.parse("f(x0)");
        let rhs = factory.parse("c0");
        let rule_clause = Clause::new(&factory, vec![Literal::equals(lhs, rhs)]);
        let ordering = Kbo::from_signature(&factory.signature);
        let rule = RewriteRule::from_clause(&rule_clause, &ordering).expect("should orient");

        let f_c1 = factory.parse("f(c1)");
        let c2 = factory.parse("c2");
        let target = Clause::new(&factory, vec![Literal::equals(f_c1, c2)]);

        let rewritten = forward_demodulate(&factory, &target, &[rule]).expect("should rewrite");
        let c0_again = factory.parse("c0");
        let c2_again = factory.parse("c2");
        let expected = Clause::new(&factory, vec![Literal::equals(c0_again, c2_again)]);
        assert_eq!(rewritten, expected);
    }

    #[test]
    fn test_forward_demodulation_no_match_returns_none() {
        let mut factory = TermFactory::new();
        let lhs = factory.parse("f(x0)");
        let rhs = factory.parse("c0");
        let rule_clause = Clause::new(&factory, vec![Literal::equals(lhs, rhs)]);
        let ordering = Kbo::from_signature(&factory.signature);
        let rule = RewriteRule::from_clause(&rule_clause, &ordering).expect("should orient");

        let g_c1 = factory.parse("g(c1)");
        let c2 = factory.parse("c2");
        let target = Clause::new(&factory, vec![Literal::equals(g_c1, c2)]);
        assert!(forward_demodulate(&factory, &target, &[rule]).is_none());
    }

    #[test]
    fn test_unorientable_equation_yields_no_rule() {
        let mut factory = TermFactory::new();
        let x0 = factory.parse("x0");
        let x1 = factory.parse("x1");
        let clause = Clause::new(&factory, vec![Literal::equals(x0, x1)]);
        let ordering = Kbo::from_signature(&factory.signature);
        assert!(RewriteRule::from_clause(&clause, &ordering).is_none());
    }
}
