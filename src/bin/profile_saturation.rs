// A representative saturation run, to use for profiling.
// Try:
//   cargo flamegraph --bin=profile_saturation

use std::time::Duration;

use vamp_saturate::ordering::Kbo;
use vamp_saturate::proof_step::Role;
use vamp_saturate::saturation::SaturationLoop;
use vamp_saturate::selector::MaximalitySelector;
use vamp_saturate::term::TermFactory;
use vamp_saturate::tptp;

const PROBLEM: &str = "\
cnf(associativity, axiom, mul(mul(X, Y), Z) = mul(X, mul(Y, Z))).
cnf(identity, axiom, mul(e, X) = X).
cnf(inverse, axiom, mul(inv(X), X) = e).
cnf(left_cancel, axiom, mul(X, Y) != mul(X, Z) | Y = Z).
cnf(goal, negated_conjecture, mul(a, b) != mul(b, a)).
";

fn main() {
    let mut factory = TermFactory::new();
    let clauses = tptp::parse_cnf_file(&mut factory, PROBLEM).expect("representative problem parses");
    let has_goal = clauses.iter().any(|c| c.role == Role::NegatedGoal);

    let ordering = Box::new(Kbo::from_signature(&factory.signature));
    let selector = Box::new(MaximalitySelector);
    let mut loop_ = SaturationLoop::new(factory, ordering, selector, 1, 1, true, true);
    for clause in clauses {
        loop_.add_input_clause(clause.clause, clause.role);
    }

    let outcome = loop_.run(Duration::from_secs(30));
    println!("outcome: {} (goal present: {})", outcome, has_goal);
    println!("active: {}, passive: {}", loop_.num_active(), loop_.num_passive());
}
