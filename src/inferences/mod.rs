// The inference engines: generating rules (produce new clauses, keep their premises) and
// simplifying rules (produce a replacement clause and mark a premise redundant). spec.md 4.5
// divides them the same way; each submodule here grounds one family on the pattern the
// teacher's unifier.rs/active_set.rs already established for the operations they share
// (unification, superposition, literal replacement).

pub mod demodulation;
pub mod equality;
pub mod resolution;
pub mod subsumption;
pub mod superposition;
pub mod trivial;
