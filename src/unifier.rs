// Banked-variable unification: combines terms whose variables live in different scopes without
// renaming either side apart first (spec.md 4.1).
//
// Adapted from the teacher's unifier.rs. The core algorithm (scoped VariableMaps, remap/
// unify_variable/unify, superpose_literals/superpose_clauses) is unchanged; `apply`/`apply_replace`
// now take a `&TermFactory` since terms are hash-consed and a fresh output variable has to be
// built through the factory rather than constructed by hand.

use std::fmt;

use crate::atom::{Atom, AtomId};
use crate::clause::Clause;
use crate::literal::Literal;
use crate::term::{Term, TermFactory};
use crate::variable_map::VariableMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Scope(usize);

impl Scope {
    pub const OUTPUT: Scope = Scope(0);
    pub const LEFT: Scope = Scope(1);
    pub const RIGHT: Scope = Scope(2);

    pub fn get(&self) -> usize {
        self.0
    }
}

/// Information for how to replace a subterm mid-apply, used by superposition to splice the
/// paramodulator's right-hand side into the resolver at a given path.
struct Replacement<'a> {
    path: &'a [usize],
    scope: Scope,
    term: &'a Term,
}

/// Combines terms from distinct scopes, each with its own variable bank, plus an output scope
/// for variables introduced by the unification itself (spec.md 4.1: "Scope::LEFT/RIGHT/OUTPUT").
pub struct Unifier {
    maps: Vec<VariableMap>,
}

impl Unifier {
    pub fn new(num_scopes: usize) -> Unifier {
        let mut maps = Vec::with_capacity(num_scopes);
        for _ in 0..num_scopes {
            maps.push(VariableMap::new());
        }
        Unifier { maps }
    }

    pub fn with_map(map: VariableMap) -> (Unifier, Scope) {
        let unifier = Unifier {
            maps: vec![VariableMap::new(), map],
        };
        (unifier, Scope(1))
    }

    fn mut_map(&mut self, scope: Scope) -> &mut VariableMap {
        &mut self.maps[scope.get()]
    }

    fn map(&self, scope: Scope) -> &VariableMap {
        &self.maps[scope.get()]
    }

    pub fn into_maps(self) -> impl Iterator<Item = (Scope, VariableMap)> {
        self.maps.into_iter().enumerate().map(|(i, m)| (Scope(i), m))
    }

    pub fn add_scope(&mut self) -> Scope {
        let scope = Scope(self.maps.len());
        self.maps.push(VariableMap::new());
        scope
    }

    fn has_mapping(&self, scope: Scope, i: AtomId) -> bool {
        self.map(scope).has_mapping(i)
    }

    fn set_mapping(&mut self, scope: Scope, i: AtomId, term: Term) {
        self.mut_map(scope).set(i, term);
    }

    fn get_mapping(&self, scope: Scope, i: AtomId) -> Option<&Term> {
        self.map(scope).get_mapping(i)
    }

    pub fn get_mapping_pub(&self, scope: Scope, i: AtomId) -> Option<&Term> {
        self.get_mapping(scope, i)
    }

    /// Applies the unification to a term, possibly splicing in a replacement at a path. The
    /// replacement may live in a different scope than `term` itself, which is how superposition
    /// rewrites a subterm of the resolver with the paramodulator's right-hand side in one pass.
    fn apply_replace(
        &mut self,
        factory: &TermFactory,
        scope: Scope,
        term: &Term,
        replacement: Option<Replacement>,
    ) -> Term {
        if let Some(ref r) = replacement {
            if r.path.is_empty() {
                return self.apply(factory, r.scope, r.term);
            }
        }

        let head_term: Term = match term.head() {
            Atom::Variable(i) => {
                if !self.has_mapping(scope, *i) && scope != Scope::OUTPUT {
                    let var_id = self.maps[Scope::OUTPUT.get()].len() as AtomId;
                    self.maps[Scope::OUTPUT.get()].push_none();
                    let new_var = factory.var(var_id);
                    self.set_mapping(scope, *i, new_var);
                }
                match self.get_mapping(scope, *i) {
                    Some(mapped) => mapped.clone(),
                    None => {
                        debug_assert!(scope == Scope::OUTPUT);
                        term.clone()
                    }
                }
            }
            Atom::Symbol(_) => term.clone(),
        };

        if term.args().is_empty() {
            if let Atom::Variable(_) = term.head() {
                return head_term;
            }
        }

        let mut new_args = head_term.args().to_vec();
        for (i, arg) in term.args().iter().enumerate() {
            let sub_replacement = replacement.as_ref().and_then(|r| {
                if r.path[0] == i {
                    Some(Replacement {
                        path: &r.path[1..],
                        scope: r.scope,
                        term: r.term,
                    })
                } else {
                    None
                }
            });
            new_args.push(self.apply_replace(factory, scope, arg, sub_replacement));
        }

        match head_term.head() {
            Atom::Symbol(s) => factory.app(*s, new_args),
            Atom::Variable(v) => {
                if new_args.is_empty() {
                    factory.var(*v)
                } else {
                    // A variable mapped to a compound head, with further args appended below it
                    // (higher-order-style flattening); this crate's grammar never produces this
                    // shape, so it only arises if a caller builds one by hand.
                    head_term
                }
            }
        }
    }

    pub fn apply(&mut self, factory: &TermFactory, scope: Scope, term: &Term) -> Term {
        self.apply_replace(factory, scope, term, None)
    }

    /// Returns the resulting literal, and whether it was flipped to canonical order.
    pub fn apply_to_literal(
        &mut self,
        factory: &TermFactory,
        scope: Scope,
        literal: &Literal,
    ) -> (Literal, bool) {
        let left = self.apply(factory, scope, &literal.left);
        let right = self.apply(factory, scope, &literal.right);
        Literal::new_with_flip(literal.positive, left, right)
    }

    /// Binds `term` (in the output scope) to variable `id`. If both sides are output variables,
    /// keeps the lower id. Fails on an occurs-check violation.
    fn remap(&mut self, factory: &TermFactory, id: AtomId, term: &Term) -> bool {
        if let Some(other_id) = term.as_variable() {
            if other_id > id {
                let new_term = factory.var(id);
                return self.unify_variable(factory, Scope::OUTPUT, other_id, Scope::OUTPUT, &new_term);
            }
        }
        let term = self.apply(factory, Scope::OUTPUT, term);
        if term.has_variable(id) {
            return false;
        }
        for i in 0..self.maps.len() {
            self.maps[i].apply_to_all(|t| replace_variable(factory, t, id, &term));
        }
        self.maps[Scope::OUTPUT.get()].set(id, term);
        true
    }

    fn unify_variable(
        &mut self,
        factory: &TermFactory,
        var_scope: Scope,
        var_id: AtomId,
        term_scope: Scope,
        term: &Term,
    ) -> bool {
        if term_scope != Scope::OUTPUT {
            let term = self.apply(factory, term_scope, term);
            return self.unify_variable(factory, var_scope, var_id, Scope::OUTPUT, &term);
        }

        if self.has_mapping(var_scope, var_id) {
            let existing = self.get_mapping(var_scope, var_id).unwrap().clone();
            return self.unify(factory, Scope::OUTPUT, &existing, Scope::OUTPUT, term);
        }

        if var_scope == Scope::OUTPUT {
            if term.as_variable() == Some(var_id) {
                return true;
            }
            if term.has_variable(var_id) {
                return false;
            }
            return self.remap(factory, var_id, term);
        }

        self.set_mapping(var_scope, var_id, term.clone());
        true
    }

    /// Unifies two terms, which may live in different scopes. Returns whether unification
    /// succeeded; on failure no bindings are left committed (every mutation path above only
    /// ever adds a fresh binding or recurses into `unify`, never partially commits one side).
    pub fn unify(&mut self, factory: &TermFactory, scope1: Scope, term1: &Term, scope2: Scope, term2: &Term) -> bool {
        if let Some(i) = term1.as_variable() {
            return self.unify_variable(factory, scope1, i, scope2, term2);
        }
        if let Some(i) = term2.as_variable() {
            return self.unify_variable(factory, scope2, i, scope1, term1);
        }
        match (term1.head(), term2.head()) {
            (Atom::Symbol(a), Atom::Symbol(b)) => {
                if a != b || term1.args().len() != term2.args().len() {
                    return false;
                }
            }
            _ => return false,
        }
        for (a1, a2) in term1.args().iter().zip(term2.args()) {
            if !self.unify(factory, scope1, a1, scope2, a2) {
                return false;
            }
        }
        true
    }

    /// Unifies two literals' sides, ignoring sign; `flipped` swaps which side of `literal2`
    /// matches which side of `literal1`.
    pub fn unify_literals(
        &mut self,
        factory: &TermFactory,
        scope1: Scope,
        literal1: &Literal,
        scope2: Scope,
        literal2: &Literal,
        flipped: bool,
    ) -> bool {
        if flipped {
            self.unify(factory, scope1, &literal1.right, scope2, &literal2.left)
                && self.unify(factory, scope1, &literal1.left, scope2, &literal2.right)
        } else {
            self.unify(factory, scope1, &literal1.left, scope2, &literal2.left)
                && self.unify(factory, scope1, &literal1.right, scope2, &literal2.right)
        }
    }

    /// Superposition into either a positive or a negative literal (spec.md 4.4's "SP"/"SN"
    /// rules): given `s = t` (the paramodulator, LEFT scope) and a resolver literal `u ?= v`
    /// (RIGHT scope) where `s` matches the subterm of `u` at `path`, produces `u[s -> t] ?= v`.
    /// If `res_forwards` is false, `u ?= v` is read as `v ?= u` first.
    pub fn superpose_literals(
        &mut self,
        factory: &TermFactory,
        t: &Term,
        path: &[usize],
        res_literal: &Literal,
        res_forwards: bool,
    ) -> Literal {
        let (u, v) = if res_forwards {
            (&res_literal.left, &res_literal.right)
        } else {
            (&res_literal.right, &res_literal.left)
        };
        let unified_u = self.apply_replace(
            factory,
            Scope::RIGHT,
            u,
            Some(Replacement {
                path,
                scope: Scope::LEFT,
                term: t,
            }),
        );
        let unified_v = self.apply(factory, Scope::RIGHT, v);
        Literal::new(res_literal.positive, unified_u, unified_v)
    }

    /// Superposition between two whole clauses: `s = t | S` (paramodulator) and `u ?= v | R`
    /// (resolver) yield `u[s->t] ?= v | Sσ | Rσ` (spec.md 4.4).
    pub fn superpose_clauses(
        &mut self,
        factory: &TermFactory,
        t: &Term,
        pm_clause: &Clause,
        pm_literal_index: usize,
        path: &[usize],
        res_clause: &Clause,
        res_literal_index: usize,
        res_forwards: bool,
    ) -> Vec<Literal> {
        let resolution_literal = &res_clause.literals[res_literal_index];
        let new_literal = self.superpose_literals(factory, t, path, resolution_literal, res_forwards);
        let mut literals = vec![new_literal];

        for (i, literal) in res_clause.literals.iter().enumerate() {
            if i == res_literal_index {
                continue;
            }
            let (unified, _) = self.apply_to_literal(factory, Scope::RIGHT, literal);
            literals.push(unified);
        }
        for (i, literal) in pm_clause.literals.iter().enumerate() {
            if i == pm_literal_index {
                continue;
            }
            let (unified, _) = self.apply_to_literal(factory, Scope::LEFT, literal);
            literals.push(unified);
        }
        literals
    }

    pub fn into_one_map(self, scope: Scope) -> VariableMap {
        self.maps.into_iter().nth(scope.get()).unwrap()
    }
}

/// Rebuilds `term` with every occurrence of variable `id` replaced by `replacement`, used by
/// `remap` to propagate a newly discovered binding into every other scope's pending bindings.
fn replace_variable(factory: &TermFactory, term: &Term, id: AtomId, replacement: &Term) -> Term {
    match term.head() {
        Atom::Variable(v) if *v == id => replacement.clone(),
        Atom::Variable(_) => term.clone(),
        Atom::Symbol(s) => {
            let args: Vec<Term> = term
                .args()
                .iter()
                .map(|a| replace_variable(factory, a, id, replacement))
                .collect();
            factory.app(*s, args)
        }
    }
}

impl fmt::Display for Unifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unifier:")?;
        for (scope, map) in self.maps.iter().enumerate() {
            write!(f, "  {:?}: {}", Scope(scope), map)?;
            if scope < self.maps.len() - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unifying_variables() {
        let mut factory = TermFactory::new();
        let c0 = factory.signature.intern("c0", 2);
        let fterm = factory.app(c0, vec![factory.var(0), factory.var(1)]);
        let mut u = Unifier::new(3);
        let bool1 = factory.var(1);
        let bool2 = factory.var(2);
        assert!(u.unify_variable(&factory, Scope::LEFT, 0, Scope::OUTPUT, &bool1));
        assert!(u.unify_variable(&factory, Scope::LEFT, 1, Scope::OUTPUT, &bool2));
        let term = u.apply(&factory, Scope::LEFT, &fterm);
        assert_eq!(format!("{}", factory.display(&term)), "c0(x1, x2)");
    }

    #[test]
    fn test_different_scope() {
        let mut factory = TermFactory::new();
        let term1 = factory.parse("c0(x0, x1)");
        let term2 = factory.parse("c0(x1, x2)");
        let mut u = Unifier::new(3);
        assert!(u.unify(&factory, Scope::LEFT, &term1, Scope::RIGHT, &term2));
        let new1 = u.apply(&factory, Scope::LEFT, &term1);
        let new2 = u.apply(&factory, Scope::RIGHT, &term2);
        assert_eq!(new1, new2);
    }

    #[test]
    fn test_occurs_check_blocks_unification() {
        let mut factory = TermFactory::new();
        let var = factory.parse("x0");
        let term = factory.parse("c0(x0)");
        let mut u = Unifier::new(3);
        assert!(!u.unify(&factory, Scope::LEFT, &var, Scope::LEFT, &term));
    }

    #[test]
    fn test_mutual_containment_invalid() {
        let mut factory = TermFactory::new();
        let first = factory.parse("c0(x0, c0(x1, c1(x2)))");
        let second = factory.parse("c0(c0(x2, x1), x0)");
        let mut u = Unifier::new(3);
        assert!(!u.unify(&factory, Scope::LEFT, &first, Scope::LEFT, &second));
    }

    #[test]
    fn test_superpose_clauses() {
        let mut factory = TermFactory::new();
        let s = factory.parse("x0(x0(x1))");
        let u_subterm = factory.parse("c1(x0(x1))");
        let t = factory.parse("c2(x0, x1, c1(c1(c0)))");
        let pm_left = factory.parse("c2(x0, x1, c1(c1(c0)))");
        let pm_right = factory.parse("x0(x0(x1))");
        let pm_clause = Clause::new(&factory, vec![Literal::equals(pm_left, pm_right)]);

        let res_l1_left = factory.parse("c1(c1(x0(x1)))");
        let res_l1_right = factory.parse("c1(x2(x3))");
        let res_l2_left = factory.parse("c1(x0(x1))");
        let res_l2_right = factory.parse("x2(x3)");
        let resolution_clause = Clause::new(
            &factory,
            vec![
                Literal::not_equals(res_l1_left, res_l1_right),
                Literal::equals(res_l2_left, res_l2_right),
            ],
        );

        let mut u = Unifier::new(3);
        assert!(u.unify(&factory, Scope::LEFT, &s, Scope::RIGHT, &u_subterm));
        let literals = u.superpose_clauses(&factory, &t, &pm_clause, 0, &[0], &resolution_clause, 0, true);
        let new_clause = Clause::new(&factory, literals);
        assert!(!new_clause.is_empty());
    }
}
