// Maximally-shared first-order terms.
//
// Terms are hash-consed through a `TermFactory`: two terms built from the same factory are
// structurally equal iff they are the same `Rc` allocation. This gives the engine cheap
// pointer-based equality checks on the hot path (superposition's subterm matching, the
// substitution tree's node lookups) while keeping `PartialEq`/`Hash` structural so a term
// built outside the factory (e.g. in a doctest) still compares sensibly.
//
// See the design note in SPEC_FULL.md: in the source this sharing table is a process-wide
// singleton. Here it's an explicit value threaded through the saturation context, which is
// what lets the thread-based portfolio executor run several independent searches in one
// address space.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::atom::{Atom, AtomId};

pub type SymbolId = AtomId;

/// The reserved nullary "true" symbol's id. `TermFactory::new` always interns the equality
/// symbol first (id 0) and this symbol second (id 1), so the id is fixed for any factory built
/// that way. `Literal`'s truth-term check compares a term's head against this constant instead
/// of formatting the term to a string, which would not even round-trip: `Term`'s bare `Display`
/// has no signature to resolve names against and falls back to `s<id>`.
pub const TRUTH_SYMBOL: SymbolId = 1;

/// Metadata about one function/predicate symbol, computed once at startup from the
/// signature order (spec.md 4.2): arity, a KBO weight, and a slot in the total precedence
/// order used by both KBO and LPO. `level` is the separate, coarser ordering used by literal
/// selectors (equality is the lowest level).
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub arity: u32,
    pub weight: u32,
    pub precedence: u32,
    pub level: u32,
    pub is_equality: bool,
    pub introduced: bool,
}

/// The total signature of the problem: every function and predicate symbol seen so far,
/// plus the derived precedence/level orders the simplification ordering consults.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    symbols: Vec<SymbolInfo>,
    by_name: HashMap<String, SymbolId>,
    pub equality_symbol: Option<SymbolId>,
    pub truth_symbol: Option<SymbolId>,
}

impl Signature {
    pub fn new() -> Signature {
        Signature::default()
    }

    /// Looks up or creates a symbol with the given name and arity. Symbols are identified by
    /// name alone (as in the teacher's clause parser); a name reused with a different arity
    /// keeps the first-seen arity, since the minimal reader this crate ships never needs to
    /// disambiguate overloaded names.
    pub fn intern(&mut self, name: &str, arity: u32) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.symbols.len() as SymbolId;
        let precedence = id;
        self.symbols.push(SymbolInfo {
            name: name.to_string(),
            arity,
            weight: 1,
            precedence,
            level: precedence + 1,
            is_equality: false,
            introduced: false,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Registers the distinguished equality symbol, which sits at the lowest literal-selection
    /// level (spec.md 4.2: "equality is the lowest level").
    pub fn intern_equality(&mut self) -> SymbolId {
        if let Some(id) = self.equality_symbol {
            return id;
        }
        let id = self.intern("=", 2);
        self.symbols[id as usize].is_equality = true;
        self.symbols[id as usize].level = 0;
        self.equality_symbol = Some(id);
        id
    }

    /// Registers the distinguished `$true` symbol (see `TRUTH_SYMBOL`), used to represent
    /// plain predicate atoms as `p(args) = $true`.
    pub fn intern_truth(&mut self) -> SymbolId {
        if let Some(id) = self.truth_symbol {
            return id;
        }
        let id = self.intern("$true", 0);
        self.truth_symbol = Some(id);
        id
    }

    pub fn info(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id as usize]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.symbols[id as usize].name
    }

    pub fn arity(&self, id: SymbolId) -> u32 {
        self.symbols[id as usize].arity
    }

    pub fn is_equality(&self, id: SymbolId) -> bool {
        self.symbols[id as usize].is_equality
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Marks a symbol as introduced (e.g. a skolem function or a CNF-transform predicate) and
    /// boosts it above interpreted symbols in precedence, per spec.md 4.2.
    pub fn mark_introduced(&mut self, id: SymbolId) {
        let n = self.symbols.len() as u32;
        let info = &mut self.symbols[id as usize];
        info.introduced = true;
        // Open Question #3 in SPEC_FULL.md: we use the negated id as the precedence key for
        // every precedence-sensitive heuristic, not only the default one.
        info.precedence = n + (n - info.precedence);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct TermNode {
    head: Atom,
    args: Vec<Term>,
}

/// A shared, immutable term. Cheap to clone (an `Rc` bump).
#[derive(Debug, Clone)]
pub struct Term(Rc<TermData>);

#[derive(Debug)]
struct TermData {
    node: TermNode,
    ground: bool,
    weight: u32,
    free_vars: Vec<AtomId>,
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.node == other.0.node
    }
}
impl Eq for Term {}

impl std::hash::Hash for Term {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.node.hash(state)
    }
}

// Ordering on terms is purely a canonicalization device (stable storage order inside a
// Clause's literal vector, substitution-tree key comparisons); it has nothing to do with the
// simplification ordering in ordering.rs, which is partial and defined separately.
impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.node.cmp(&other.0.node)
    }
}

impl Term {
    pub fn head(&self) -> &Atom {
        &self.0.node.head
    }

    pub fn args(&self) -> &[Term] {
        &self.0.node.args
    }

    pub fn is_variable(&self) -> bool {
        self.0.node.head.is_variable() && self.0.node.args.is_empty()
    }

    pub fn as_variable(&self) -> Option<AtomId> {
        if self.0.node.args.is_empty() {
            self.0.node.head.as_variable()
        } else {
            None
        }
    }

    pub fn is_ground(&self) -> bool {
        self.0.ground
    }

    pub fn weight(&self) -> u32 {
        self.0.weight
    }

    pub fn free_vars(&self) -> &[AtomId] {
        &self.0.free_vars
    }

    pub fn has_variable(&self, id: AtomId) -> bool {
        self.0.free_vars.contains(&id)
    }

    /// Returns the subterm at the given path (a sequence of argument indices), or `None` if
    /// the path runs past a leaf.
    pub fn at_path(&self, path: &[usize]) -> Option<&Term> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.args().get(i)?.at_path(rest),
        }
    }

    /// All non-variable subterms, paired with their path, in the order demodulation and
    /// superposition should try them (top-down, left to right, the term itself first).
    pub fn rewritable_subterms(&self) -> Vec<(Vec<usize>, Term)> {
        let mut out = vec![];
        self.collect_rewritable(&mut vec![], &mut out);
        out
    }

    fn collect_rewritable(&self, path: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, Term)>) {
        if !self.is_variable() {
            out.push((path.clone(), self.clone()));
        }
        for (i, arg) in self.args().iter().enumerate() {
            path.push(i);
            arg.collect_rewritable(path, out);
            path.pop();
        }
    }

    /// Rebuilds this term with every free variable renamed according to `map` (variables not
    /// present in `map` are left alone). Used by `Clause::new` to renumber variables into a
    /// canonical 0..n form on construction.
    pub fn map_vars(&self, factory: &TermFactory, map: &HashMap<AtomId, AtomId>) -> Term {
        match self.head() {
            Atom::Variable(v) => {
                let new_v = *map.get(v).unwrap_or(v);
                factory.var(new_v)
            }
            Atom::Symbol(s) => {
                let new_args: Vec<Term> =
                    self.args().iter().map(|a| a.map_vars(factory, map)).collect();
                factory.app(*s, new_args)
            }
        }
    }

    pub fn symbol_count(&self) -> u32 {
        1 + self.args().iter().map(|a| a.symbol_count()).sum::<u32>()
    }

    /// Rebuilds this term substituting each variable per `substitution`, leaving unmapped
    /// variables alone. Used to instantiate a matched generalization's right-hand side.
    pub fn substitute(&self, factory: &TermFactory, substitution: &HashMap<AtomId, Term>) -> Term {
        match self.head() {
            Atom::Variable(v) => substitution.get(v).cloned().unwrap_or_else(|| self.clone()),
            Atom::Symbol(s) => {
                let args: Vec<Term> = self.args().iter().map(|a| a.substitute(factory, substitution)).collect();
                factory.app(*s, args)
            }
        }
    }
}

/// True iff `general` matches `specific` under a substitution applied only to `general`'s
/// variables; when it does, returns that substitution. This is a one-sided match (only
/// `general`'s variables bind), not a full unification -- the operation both demodulation's
/// "does this rewrite rule apply here" check and subsumption's literal matching reduce to.
pub fn match_generalization(general: &Term, specific: &Term) -> Option<HashMap<AtomId, Term>> {
    let mut bindings = HashMap::new();
    if match_generalization_rec(general, specific, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

fn match_generalization_rec(general: &Term, specific: &Term, bindings: &mut HashMap<AtomId, Term>) -> bool {
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
            general
                .args()
                .iter()
                .zip(specific.args())
                .all(|(g, s)| match_generalization_rec(g, s, bindings))
        }
        _ => false,
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_term(f, self, None)
    }
}

fn write_term(f: &mut fmt::Formatter, term: &Term, sig: Option<&Signature>) -> fmt::Result {
    match term.head() {
        Atom::Variable(i) => write!(f, "x{}", i)?,
        Atom::Symbol(id) => match sig {
            Some(sig) => write!(f, "{}", sig.name(*id))?,
            None => write!(f, "s{}", id)?,
        },
    }
    if !term.args().is_empty() {
        write!(f, "(")?;
        for (i, arg) in term.args().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write_term(f, arg, sig)?;
        }
        write!(f, ")")?;
    }
    Ok(())
}

/// Displays a term using real symbol names from a `Signature`, rather than `s<id>`.
pub struct DisplayTerm<'a> {
    pub term: &'a Term,
    pub signature: &'a Signature,
}

impl<'a> fmt::Display for DisplayTerm<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_term(f, self.term, Some(self.signature))
    }
}

/// Owns the signature and the hash-consing table. One `TermFactory` per saturation context;
/// see the module doc comment.
#[derive(Debug, Default)]
pub struct TermFactory {
    pub signature: Signature,
    table: RefCell<HashMap<TermNode, Term>>,
}

impl TermFactory {
    pub fn new() -> TermFactory {
        let mut factory = TermFactory::default();
        factory.signature.intern_equality();
        factory.signature.intern_truth();
        factory
    }

    /// Returns the canonical representative for this (head, args) pair: the "share" operation
    /// from spec.md 4.1. Two terms returned from the same factory for structurally equal
    /// input are the same `Rc` allocation.
    fn share(&self, node: TermNode) -> Term {
        if let Some(existing) = self.table.borrow().get(&node) {
            return existing.clone();
        }
        let ground = match &node.head {
            Atom::Variable(_) => false,
            Atom::Symbol(_) => node.args.iter().all(|a| a.is_ground()),
        };
        let weight = 1 + node.args.iter().map(|a| a.weight()).sum::<u32>();
        let mut free_vars = vec![];
        if let Atom::Variable(v) = &node.head {
            free_vars.push(*v);
        }
        for arg in &node.args {
            for v in arg.free_vars() {
                if !free_vars.contains(v) {
                    free_vars.push(*v);
                }
            }
        }
        free_vars.sort_unstable();
        let term = Term(Rc::new(TermData {
            node: node.clone(),
            ground,
            weight,
            free_vars,
        }));
        self.table.borrow_mut().insert(node, term.clone());
        term
    }

    pub fn var(&self, id: AtomId) -> Term {
        self.share(TermNode {
            head: Atom::Variable(id),
            args: vec![],
        })
    }

    pub fn app(&self, symbol: SymbolId, args: Vec<Term>) -> Term {
        self.share(TermNode {
            head: Atom::Symbol(symbol),
            args,
        })
    }

    pub fn constant(&mut self, name: &str) -> Term {
        let id = self.signature.intern(name, 0);
        self.app(id, vec![])
    }

    pub fn equality_symbol(&mut self) -> SymbolId {
        self.signature.intern_equality()
    }

    /// The reserved nullary "true" term. Plain predicate literals `p(args)` are stored
    /// internally as the equality `p(args) = true`, the same uniform representation the
    /// teacher's clause/literal types use, so demodulation and superposition never need a
    /// separate code path for predicates versus equalities.
    pub fn truth(&mut self) -> Term {
        let id = self.signature.intern_truth();
        self.app(id, vec![])
    }

    /// True iff the same allocation backs both terms. Used by tests to check the maximal
    /// sharing invariant from spec.md 8 directly, rather than relying on `PartialEq`, which
    /// is structural and would pass even without interning.
    pub fn ptr_eq(&self, a: &Term, b: &Term) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub fn display<'a>(&'a self, term: &'a Term) -> DisplayTerm<'a> {
        DisplayTerm {
            term,
            signature: &self.signature,
        }
    }

    /// Parses the small surface syntax used throughout this crate's tests and the minimal CNF
    /// reader: `x0`, `x1`, ... are variables; any other identifier is a function/predicate
    /// symbol, applied to a parenthesized, comma-separated argument list if one follows.
    pub fn parse(&mut self, s: &str) -> Term {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('x') {
            if let Ok(id) = rest.parse::<AtomId>() {
                return self.var(id);
            }
        }
        let (name, rest) = match s.find('(') {
            Some(idx) => (&s[..idx], &s[idx + 1..s.len() - 1]),
            None => (s, ""),
        };
        let arg_strs = split_top_level(rest);
        let args: Vec<Term> = arg_strs.iter().map(|a| self.parse(a)).collect();
        let id = self.signature.intern(name, args.len() as u32);
        self.app(id, args)
    }
}

/// Splits a comma-separated argument list at top level, respecting nested parens.
pub fn split_top_level(s: &str) -> Vec<&str> {
    if s.trim().is_empty() {
        return vec![];
    }
    let mut parts = vec![];
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharing() {
        let mut factory = TermFactory::new();
        let a = factory.parse("f(x0, c0)");
        let b = factory.parse("f(x0, c0)");
        assert!(factory.ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_ground_and_weight() {
        let mut factory = TermFactory::new();
        let ground = factory.parse("f(c0, c1)");
        assert!(ground.is_ground());
        assert_eq!(ground.weight(), 3);

        let nonground = factory.parse("f(x0, c1)");
        assert!(!nonground.is_ground());
        assert_eq!(nonground.free_vars(), &[0]);
    }

    #[test]
    fn test_rewritable_subterms() {
        let mut factory = TermFactory::new();
        let t = factory.parse("f(g(x0), c0)");
        let subs = t.rewritable_subterms();
        // f(g(x0), c0), g(x0), c0 -- x0 itself is a variable and excluded.
        assert_eq!(subs.len(), 3);
    }

    #[test]
    fn test_at_path() {
        let mut factory = TermFactory::new();
        let t = factory.parse("f(g(x0), c0)");
        let sub = t.at_path(&[0]).unwrap();
        assert_eq!(format!("{}", sub), "g(x0)");
    }

    #[test]
    fn test_match_generalization_and_substitute() {
        let mut factory = TermFactory::new();
        let rule_lhs = factory.parse("f(x0, c0)");
        let query = factory.parse("f(c1, c0)");
        let bindings = match_generalization(&rule_lhs, &query).unwrap();

        let rule_rhs = factory.parse("g(x0)");
        let instantiated = rule_rhs.substitute(&factory, &bindings);
        assert_eq!(format!("{}", instantiated), "g(c1)");
    }

    #[test]
    fn test_match_generalization_rejects_mismatch() {
        let mut factory = TermFactory::new();
        let rule_lhs = factory.parse("f(x0, x0)");
        let query = factory.parse("f(c0, c1)");
        assert!(match_generalization(&rule_lhs, &query).is_none());
    }
}
