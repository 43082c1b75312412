// A ProofStep pairs a clause with the Inference that produced it: the rule and its premise
// clause ids (spec.md 3: "an Inference record... used for proof reconstruction and redundancy
// reasoning") plus an Age counter (inference depth from the inputs) and cached Weight.
//
// Adapted from the teacher's proof_step.rs: the Rule enum and premises()/dependencies() style
// carries over directly, but the rule variants now name this calculus's inferences (binary
// resolution, equality resolution/factoring, superposition, demodulation, subsumption
// resolution) instead of Acorn's rewrite/specialization/function-elimination set, and the
// `LiteralTrace`/source-reconstruction machinery is dropped -- this crate never regenerates
// source-level proof code, only the SZS-style premise graph (spec.md 6).

use std::fmt;

use crate::clause::Clause;

pub type ClauseId = usize;

/// Which side of the input problem a clause traces back to. Mixing roles in one derivation is
/// what lets the driver report a refutation: a clause derived from both an axiom and the
/// negated goal is still counterfactual, since it is only true under the goal's negation.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Role {
    /// True unconditionally: a hypothesis of the problem.
    Axiom,
    /// The negation of the conjecture being proved; true only under that assumption.
    NegatedGoal,
}

impl Role {
    /// Combining two roles keeps whichever is "more conditional" -- a descendant of the
    /// negated goal is itself conditional on it, regardless of what else it touches.
    pub fn combine(&self, other: Role) -> Role {
        match (self, other) {
            (Role::NegatedGoal, _) | (_, Role::NegatedGoal) => Role::NegatedGoal,
            (Role::Axiom, Role::Axiom) => Role::Axiom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionInfo {
    pub left_id: ClauseId,
    pub right_id: ClauseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoringInfo {
    pub id: ClauseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityResolutionInfo {
    pub id: ClauseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityFactoringInfo {
    pub id: ClauseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperpositionInfo {
    /// The clause supplying the rewriting equation `s = t`.
    pub paramodulator_id: ClauseId,
    /// The clause supplying the literal being rewritten into.
    pub resolver_id: ClauseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemodulationInfo {
    pub rewritten_id: ClauseId,
    pub rule_id: ClauseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsumptionResolutionInfo {
    pub subsumer_id: ClauseId,
    pub resolved_id: ClauseId,
}

/// The rules that can produce a clause, along with the premises used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A clause read directly from the input problem (spec.md 3's "created by the
    /// preprocessor").
    Input,
    BinaryResolution(ResolutionInfo),
    Factoring(FactoringInfo),
    EqualityResolution(EqualityResolutionInfo),
    EqualityFactoring(EqualityFactoringInfo),
    Superposition(SuperpositionInfo),
    ForwardDemodulation(DemodulationInfo),
    BackwardDemodulation(DemodulationInfo),
    SubsumptionResolution(SubsumptionResolutionInfo),
}

impl Rule {
    pub fn premises(&self) -> Vec<ClauseId> {
        match self {
            Rule::Input => vec![],
            Rule::BinaryResolution(info) => vec![info.left_id, info.right_id],
            Rule::Factoring(info) => vec![info.id],
            Rule::EqualityResolution(info) => vec![info.id],
            Rule::EqualityFactoring(info) => vec![info.id],
            Rule::Superposition(info) => vec![info.paramodulator_id, info.resolver_id],
            Rule::ForwardDemodulation(info) => vec![info.rewritten_id, info.rule_id],
            Rule::BackwardDemodulation(info) => vec![info.rewritten_id, info.rule_id],
            Rule::SubsumptionResolution(info) => vec![info.subsumer_id, info.resolved_id],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Input => "input",
            Rule::BinaryResolution(_) => "binary resolution",
            Rule::Factoring(_) => "factoring",
            Rule::EqualityResolution(_) => "equality resolution",
            Rule::EqualityFactoring(_) => "equality factoring",
            Rule::Superposition(_) => "superposition",
            Rule::ForwardDemodulation(_) => "forward demodulation",
            Rule::BackwardDemodulation(_) => "backward demodulation",
            Rule::SubsumptionResolution(_) => "subsumption resolution",
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, Rule::Input)
    }
}

/// A clause plus the derivation that produced it (spec.md 3's "Inference record").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub clause: Clause,
    pub role: Role,
    pub rule: Rule,
    /// Extra premises consumed by simplifying rules applied after the primary inference (e.g.
    /// a forward-demodulation chain run on a freshly generated clause before it settles).
    pub simplification_premises: Vec<ClauseId>,
    /// Inference depth from the inputs (spec.md 3's "Age"). Input clauses have age zero.
    pub age: u32,
}

impl fmt::Display for ProofStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ; rule = {}", self.clause, self.rule.name())
    }
}

impl ProofStep {
    pub fn input(clause: Clause, role: Role) -> ProofStep {
        ProofStep {
            clause,
            role,
            rule: Rule::Input,
            simplification_premises: vec![],
            age: 0,
        }
    }

    pub fn binary_resolution(
        left_id: ClauseId,
        left_step: &ProofStep,
        right_id: ClauseId,
        right_step: &ProofStep,
        clause: Clause,
    ) -> ProofStep {
        ProofStep {
            clause,
            role: left_step.role.combine(right_step.role),
            rule: Rule::BinaryResolution(ResolutionInfo { left_id, right_id }),
            simplification_premises: vec![],
            age: left_step.age.max(right_step.age) + 1,
        }
    }

    pub fn factoring(id: ClauseId, step: &ProofStep, clause: Clause) -> ProofStep {
        ProofStep {
            clause,
            role: step.role,
            rule: Rule::Factoring(FactoringInfo { id }),
            simplification_premises: vec![],
            age: step.age + 1,
        }
    }

    pub fn equality_resolution(id: ClauseId, step: &ProofStep, clause: Clause) -> ProofStep {
        ProofStep {
            clause,
            role: step.role,
            rule: Rule::EqualityResolution(EqualityResolutionInfo { id }),
            simplification_premises: vec![],
            age: step.age + 1,
        }
    }

    pub fn equality_factoring(id: ClauseId, step: &ProofStep, clause: Clause) -> ProofStep {
        ProofStep {
            clause,
            role: step.role,
            rule: Rule::EqualityFactoring(EqualityFactoringInfo { id }),
            simplification_premises: vec![],
            age: step.age + 1,
        }
    }

    pub fn superposition(
        paramodulator_id: ClauseId,
        paramodulator_step: &ProofStep,
        resolver_id: ClauseId,
        resolver_step: &ProofStep,
        clause: Clause,
    ) -> ProofStep {
        ProofStep {
            clause,
            role: paramodulator_step.role.combine(resolver_step.role),
            rule: Rule::Superposition(SuperpositionInfo {
                paramodulator_id,
                resolver_id,
            }),
            simplification_premises: vec![],
            age: paramodulator_step.age.max(resolver_step.age) + 1,
        }
    }

    pub fn forward_demodulation(
        rewritten_id: ClauseId,
        rewritten_step: &ProofStep,
        rule_id: ClauseId,
        rule_step: &ProofStep,
        clause: Clause,
    ) -> ProofStep {
        ProofStep {
            clause,
            role: rewritten_step.role.combine(rule_step.role),
            rule: Rule::ForwardDemodulation(DemodulationInfo { rewritten_id, rule_id }),
            simplification_premises: vec![],
            age: rewritten_step.age,
        }
    }

    pub fn backward_demodulation(
        rewritten_id: ClauseId,
        rewritten_step: &ProofStep,
        rule_id: ClauseId,
        rule_step: &ProofStep,
        clause: Clause,
    ) -> ProofStep {
        ProofStep {
            clause,
            role: rewritten_step.role.combine(rule_step.role),
            rule: Rule::BackwardDemodulation(DemodulationInfo { rewritten_id, rule_id }),
            simplification_premises: vec![],
            age: rewritten_step.age,
        }
    }

    pub fn subsumption_resolution(
        subsumer_id: ClauseId,
        subsumer_step: &ProofStep,
        resolved_id: ClauseId,
        resolved_step: &ProofStep,
        clause: Clause,
    ) -> ProofStep {
        ProofStep {
            clause,
            role: subsumer_step.role.combine(resolved_step.role),
            rule: Rule::SubsumptionResolution(SubsumptionResolutionInfo {
                subsumer_id,
                resolved_id,
            }),
            simplification_premises: vec![],
            age: resolved_step.age,
        }
    }

    /// Every clause id this step's derivation mathematically depends on.
    pub fn dependencies(&self) -> Vec<ClauseId> {
        let mut answer = self.rule.premises();
        answer.extend(self.simplification_premises.iter().copied());
        answer
    }

    pub fn depends_on(&self, id: ClauseId) -> bool {
        self.dependencies().contains(&id)
    }

    pub fn finishes_proof(&self) -> bool {
        self.clause.is_impossible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermFactory;

    fn mock(factory: &mut TermFactory, s: &str) -> ProofStep {
        let atom = factory.parse(s);
        let lit = crate::literal::Literal::positive_atom(factory, atom);
        let clause = Clause::new(factory, vec![lit]);
        ProofStep::input(clause, Role::Axiom)
    }

    #[test]
    fn test_role_combine_propagates_negated_goal() {
        assert_eq!(Role::Axiom.combine(Role::Axiom), Role::Axiom);
        assert_eq!(Role::Axiom.combine(Role::NegatedGoal), Role::NegatedGoal);
    }

    #[test]
    fn test_resolution_age_and_dependencies() {
        let mut factory = TermFactory::new();
        let left = mock(&mut factory, "p(c0)");
        let right = mock(&mut factory, "q(c0)");
        let combined_atom = factory.parse("r(c0)");
        let lit = crate::literal::Literal::positive_atom(&mut factory, combined_atom);
        let clause = Clause::new(&factory, vec![lit]);
        let step = ProofStep::binary_resolution(0, &left, 1, &right, clause);
        assert_eq!(step.age, 1);
        assert_eq!(step.dependencies(), vec![0, 1]);
    }
}
