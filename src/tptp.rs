// A minimal CNF-subset reader (spec.md 6: "TPTP problem files... for inputFile"). Handles the
// `cnf(name, role, disjunction).` statement form only -- full FOF/TFF parsing, includes, and
// type declarations are out of scope (SPEC_FULL.md 1: "explicitly a placeholder for a real
// Parser"). This is the one module with no direct teacher analog since the teacher parses
// Acorn source, not TPTP; its recursive-descent shape still follows `term.rs`'s own
// `TermFactory::parse`/`split_top_level` pair, reused here for the inner term syntax. Name
// validation leans on `regex`, carried over from the teacher's dependency stack.

use std::collections::HashMap;

use regex::Regex;

use crate::clause::Clause;
use crate::error::ProverError;
use crate::literal::Literal;
use crate::proof_step::Role;
use crate::term::{split_top_level, Term, TermFactory};

/// TPTP's `lower_word`/`upper_word` lexical rule: a letter followed by letters, digits, or
/// underscores. Real TPTP files are machine-generated, so a malformed name is almost always a
/// typo in a hand-edited problem file rather than an input worth limping through -- caught here
/// with a clear `UserError` instead of surfacing as a confusing parse failure deeper in.
fn valid_identifier(s: &str) -> bool {
    let re = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static pattern");
    re.is_match(s)
}

#[derive(Debug)]
pub struct TptpClause {
    pub name: String,
    pub role: Role,
    pub clause: Clause,
}

/// Parses every `cnf(...).` statement in `text`, in file order.
pub fn parse_cnf_file(factory: &mut TermFactory, text: &str) -> Result<Vec<TptpClause>, ProverError> {
    let stripped = strip_comments(text);
    let mut out = vec![];
    let mut pos = 0;
    while let Some(found) = stripped[pos..].find("cnf(") {
        let begin = pos + found;
        let open_paren = begin + 3;
        let close_paren = matching_paren(&stripped, open_paren)
            .ok_or_else(|| ProverError::UserError(format!("unterminated cnf statement at byte {}", begin)))?;
        let body = &stripped[open_paren + 1..close_paren];
        out.push(parse_cnf_statement(factory, body)?);
        pos = close_paren + 1;
    }
    Ok(out)
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find('%') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b as char {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level_by(s: &str, delim: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == delim && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

fn strip_outer_parens(s: &str) -> &str {
    let s = s.trim();
    if s.starts_with('(') && s.ends_with(')') && matching_paren(s, 0) == Some(s.len() - 1) {
        s[1..s.len() - 1].trim()
    } else {
        s
    }
}

fn parse_cnf_statement(factory: &mut TermFactory, body: &str) -> Result<TptpClause, ProverError> {
    let parts = split_top_level(body);
    if parts.len() < 3 {
        return Err(ProverError::UserError(format!("malformed cnf statement: {}", body)));
    }
    let name = parts[0].trim().to_string();
    if !valid_identifier(&name) {
        return Err(ProverError::UserError(format!("malformed clause name: {}", name)));
    }
    let role = match parts[1].trim() {
        "negated_conjecture" => Role::NegatedGoal,
        _ => Role::Axiom,
    };
    let formula = strip_outer_parens(parts[2]);
    let mut vars: HashMap<String, u32> = HashMap::new();
    let mut literals = vec![];
    for piece in split_top_level_by(formula, '|') {
        literals.push(parse_literal(factory, piece, &mut vars)?);
    }
    let clause = Clause::new(factory, literals);
    Ok(TptpClause { name, role, clause })
}

fn parse_literal(factory: &mut TermFactory, s: &str, vars: &mut HashMap<String, u32>) -> Result<Literal, ProverError> {
    let s = strip_outer_parens(s);
    let (negated, rest) = match s.strip_prefix('~') {
        Some(rest) => (true, rest.trim()),
        None => (false, s),
    };
    let rest = strip_outer_parens(rest);

    if let Some(idx) = find_top_level(rest, "!=") {
        let left = parse_term(factory, &rest[..idx], vars)?;
        let right = parse_term(factory, &rest[idx + 2..], vars)?;
        let literal = Literal::not_equals(left, right);
        return Ok(if negated { flip(literal) } else { literal });
    }
    if let Some(idx) = find_top_level(rest, "=") {
        let left = parse_term(factory, &rest[..idx], vars)?;
        let right = parse_term(factory, &rest[idx + 1..], vars)?;
        let literal = Literal::equals(left, right);
        return Ok(if negated { flip(literal) } else { literal });
    }

    let atom = parse_term(factory, rest, vars)?;
    Ok(if negated {
        Literal::negative_atom(factory, atom)
    } else {
        Literal::positive_atom(factory, atom)
    })
}

fn flip(literal: Literal) -> Literal {
    Literal::new(!literal.positive, literal.left, literal.right)
}

/// Finds `needle` outside any parenthesized group, used for the infix `=`/`!=` operators
/// which otherwise look exactly like the rest of the term grammar.
fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    let bytes = s.as_bytes();
    let needle_bytes = needle.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] as char {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && bytes[i..].starts_with(needle_bytes) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn parse_term(factory: &mut TermFactory, s: &str, vars: &mut HashMap<String, u32>) -> Result<Term, ProverError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ProverError::UserError("empty term".to_string()));
    }
    let (name, args_str) = match s.find('(') {
        Some(idx) if s.ends_with(')') => (&s[..idx], &s[idx + 1..s.len() - 1]),
        Some(_) => return Err(ProverError::UserError(format!("malformed term: {}", s))),
        None => (s, ""),
    };

    if args_str.is_empty() && s.find('(').is_none() && starts_uppercase(name) {
        let next_id = vars.len() as u32;
        let id = *vars.entry(name.to_string()).or_insert(next_id);
        return Ok(factory.var(id));
    }

    if !valid_identifier(name) {
        return Err(ProverError::UserError(format!("malformed symbol name: {}", name)));
    }
    let arg_strs = split_top_level(args_str);
    let mut args = vec![];
    for a in arg_strs {
        args.push(parse_term(factory, a, vars)?);
    }
    let id = factory.signature.intern(name, args.len() as u32);
    Ok(factory.app(id, args))
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_atom_clause() {
        let mut factory = TermFactory::new();
        let clauses = parse_cnf_file(&mut factory, "cnf(ax1, axiom, p(a)).").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].role, Role::Axiom);
        assert_eq!(clauses[0].clause.len(), 1);
    }

    #[test]
    fn test_parses_negated_conjecture_with_disjunction_and_variable() {
        let mut factory = TermFactory::new();
        let text = "cnf(goal, negated_conjecture, ~p(X) | q(X)).";
        let clauses = parse_cnf_file(&mut factory, text).unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].role, Role::NegatedGoal);
        assert_eq!(clauses[0].clause.len(), 2);
    }

    #[test]
    fn test_parses_equality_literal() {
        let mut factory = TermFactory::new();
        let text = "cnf(refl, axiom, f(X) = X).";
        let clauses = parse_cnf_file(&mut factory, text).unwrap();
        assert!(clauses[0].clause.literals[0].is_equality_literal());
    }

    #[test]
    fn test_rejects_malformed_symbol_name() {
        let mut factory = TermFactory::new();
        let err = parse_cnf_file(&mut factory, "cnf(ax1, axiom, 1bad(a)).").unwrap_err();
        assert!(matches!(err, ProverError::UserError(_)));
    }

    #[test]
    fn test_strips_comments_and_parses_multiple_statements() {
        let mut factory = TermFactory::new();
        let text = "% a comment\ncnf(a1, axiom, p(a)).\n% another\ncnf(a2, axiom, q(b)).";
        let clauses = parse_cnf_file(&mut factory, text).unwrap();
        assert_eq!(clauses.len(), 2);
    }
}
