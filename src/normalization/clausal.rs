//! Prenexing, Skolemization, and conversion of a formula to a list of
//! clauses.

use crate::normalization::normalize;
use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::operator_enums::*;
use crate::preprocessing::signature::Signature;

/// A clause is a list of literals, implicitly disjoined; a clause list is
/// implicitly conjoined, with the remaining variables implicitly universal.
pub type Clause = Vec<Formula>;

/// Pull all quantifiers of a formula in negation normal form into a prefix,
/// renaming bound variables where pulling them out would make them collide.
pub fn prenex(formula: &Formula, signature: &mut Signature) -> Formula {
    let (prefix, matrix) = pull_quantifiers(formula, signature);
    prefix
        .into_iter()
        .rev()
        .fold(matrix, |acc, (quantifier, variable)| {
            Formula::mk_quantified(quantifier, variable, acc)
        })
}

fn pull_quantifiers(
    formula: &Formula,
    signature: &mut Signature,
) -> (Vec<(Quantifier, Term)>, Formula) {
    match formula {
        Formula::Quantified(quantifier, variable, matrix) => {
            let (mut prefix, inner) = pull_quantifiers(matrix, signature);
            prefix.insert(0, (*quantifier, variable.clone()));
            (prefix, inner)
        }
        Formula::Binary(op, sub1, sub2) => {
            let (left_prefix, left_matrix) = pull_quantifiers(sub1, signature);
            let (right_prefix, mut right_matrix) = pull_quantifiers(sub2, signature);
            let mut prefix = left_prefix;
            for (quantifier, variable) in right_prefix {
                if prefix.iter().any(|(_, v)| *v == variable) {
                    // rename the clashing bound variable on the right side
                    let fresh_name = if signature.is_world_symbol(variable.name()) {
                        signature.get_new_world_variable()
                    } else {
                        signature.get_new_variable()
                    };
                    let fresh = Term::Symbol(fresh_name);
                    right_matrix = right_matrix.substitute(&variable, &fresh, false);
                    prefix.push((quantifier, fresh));
                } else {
                    prefix.push((quantifier, variable));
                }
            }
            (prefix, Formula::mk_binary(*op, left_matrix, right_matrix))
        }
        // literals (the formula is in NNF)
        _ => (Vec::new(), formula.clone()),
    }
}

/// Replace each ∃-bound variable occurring inside a sequence of k enclosing
/// ∀-bound variables by a fresh k-ary Skolem function term (a Skolem
/// constant for k=0). The input must be in negation normal form; afterwards
/// all remaining quantifiers are universal.
///
/// Surface Skolem symbols are drawn from the signature's letter sequences
/// (`f,g,..` and `a,b,..`; world names for world variables). The prover's
/// delta rule mints its internal φ/ω symbols separately.
pub fn skolemize(formula: &Formula, signature: &mut Signature) -> Formula {
    let mut universals = Vec::new();
    skolemize_rec(formula, &mut universals, signature)
}

fn skolemize_rec(
    formula: &Formula,
    universals: &mut Vec<Term>,
    signature: &mut Signature,
) -> Formula {
    match formula {
        Formula::Quantified(Quantifier::Forall, variable, matrix) => {
            universals.push(variable.clone());
            let inner = skolemize_rec(matrix, universals, signature);
            universals.pop();
            Formula::mk_quantified(Quantifier::Forall, variable.clone(), inner)
        }
        Formula::Quantified(Quantifier::Exists, variable, matrix) => {
            let world = signature.is_world_symbol(variable.name());
            let witness = if universals.is_empty() {
                let name = if world {
                    signature.get_new_world_name(false)
                } else {
                    signature.get_new_constant()
                };
                Term::Symbol(name)
            } else {
                let functor = signature.get_new_function_symbol(universals.len());
                Term::Function(functor, universals.clone())
            };
            let instantiated = matrix.substitute(variable, &witness, false);
            skolemize_rec(&instantiated, universals, signature)
        }
        Formula::Binary(op, sub1, sub2) => Formula::mk_binary(
            *op,
            skolemize_rec(sub1, universals, signature),
            skolemize_rec(sub2, universals, signature),
        ),
        // literals (the formula is in NNF)
        _ => formula.clone(),
    }
}

/// Convert a quantifier-free formula in negation normal form to conjunctive
/// normal form as a list of clauses.
///
/// The clause-list order and the literal order within clauses follow a
/// deterministic left-to-right fold over the distribution tree, so equal
/// parse shapes produce equal clause lists. Duplicate literals within a
/// clause are suppressed, and clauses subsumed by another clause are
/// dropped.
pub fn cnf(formula: &Formula) -> Result<Vec<Clause>, String> {
    let clauses = cnf_rec(formula)?;
    Ok(drop_subsumed_clauses(clauses))
}

fn cnf_rec(formula: &Formula) -> Result<Vec<Clause>, String> {
    if formula.is_literal() {
        return Ok(vec![vec![formula.clone()]]);
    }
    match formula {
        Formula::Binary(BinaryOp::And, sub1, sub2) => {
            let mut clauses = cnf_rec(sub1)?;
            clauses.extend(cnf_rec(sub2)?);
            Ok(clauses)
        }
        Formula::Binary(BinaryOp::Or, sub1, sub2) => {
            let left = cnf_rec(sub1)?;
            let right = cnf_rec(sub2)?;
            let mut clauses = Vec::new();
            for left_clause in &left {
                for right_clause in &right {
                    let mut merged = left_clause.clone();
                    for literal in right_clause {
                        if !merged.contains(literal) {
                            merged.push(literal.clone());
                        }
                    }
                    clauses.push(merged);
                }
            }
            Ok(clauses)
        }
        _ => Err(format!(
            "Cannot convert {formula} to CNF: not a quantifier-free formula in NNF."
        )),
    }
}

/// Drop duplicate clauses and clauses that contain another clause as a
/// subset; the surviving clauses keep their order.
fn drop_subsumed_clauses(clauses: Vec<Clause>) -> Vec<Clause> {
    let mut result: Vec<Clause> = Vec::new();
    for (i, clause) in clauses.iter().enumerate() {
        let subsumed = clauses.iter().enumerate().any(|(j, other)| {
            if i == j {
                return false;
            }
            let subset = other.iter().all(|literal| clause.contains(literal));
            // an equal clause only subsumes later copies
            subset && (other.len() < clause.len() || j < i)
        });
        if !subsumed {
            result.push(clause.clone());
        }
    }
    result
}

/// Convert an arbitrary formula to clausal normal form: normalize, prenex,
/// Skolemize, drop the universal prefix, and convert the matrix to CNF.
pub fn clausal_normal_form(
    formula: &Formula,
    signature: &mut Signature,
) -> Result<Vec<Clause>, String> {
    let nnf = normalize(formula);
    let prenexed = prenex(&nnf, signature);
    let skolemized = skolemize(&prenexed, signature);
    let matrix = strip_universal_prefix(&skolemized);
    cnf(&matrix)
}

fn strip_universal_prefix(formula: &Formula) -> Formula {
    match formula {
        Formula::Quantified(Quantifier::Forall, _, matrix) => strip_universal_prefix(matrix),
        _ => formula.clone(),
    }
}

/// Render a clause list the way it is written in discussions of the
/// algorithm: `[[a,c],[b,c]]`.
pub fn clauses_to_string(clauses: &[Clause]) -> String {
    let rendered: Vec<String> = clauses
        .iter()
        .map(|clause| {
            let literals: Vec<String> = clause.iter().map(|l| l.to_string()).collect();
            format!("[{}]", literals.join(","))
        })
        .collect();
    format!("[{}]", rendered.join(","))
}

#[cfg(test)]
mod tests {
    use crate::normalization::{clausal_normal_form, clauses_to_string, cnf, normalize, skolemize};
    use crate::preprocessing::parser::parse_formula;
    use crate::preprocessing::signature::Signature;

    fn cnf_string(formula: &str) -> String {
        let mut sig = Signature::new();
        let f = parse_formula(formula, &mut sig).unwrap();
        clauses_to_string(&cnf(&normalize(&f)).unwrap())
    }

    #[test]
    /// Distribution follows a deterministic left-to-right fold.
    fn cnf_distribution() {
        assert_eq!(
            cnf_string("((a∧b)∨(c∧d))∨e"),
            "[[a,c,e],[a,d,e],[b,c,e],[b,d,e]]"
        );
        assert_eq!(
            cnf_string("((¬F∨G)∧(B∧¬W))∨((C∧¬E)∧(¬T∨D))"),
            "[[¬F,G,C],[¬F,G,¬E],[¬F,G,¬T,D],[B,C],[B,¬E],[B,¬T,D],[¬W,C],[¬W,¬E],[¬W,¬T,D]]"
        );
        assert_eq!(
            cnf_string("(¬Px∨((¬Py∨Pf(xy))∧(Qxg(x)∧(¬Pg(x)∨¬Rcg(x)))))"),
            "[[¬Px,¬Py,Pf(xy)],[¬Px,Qxg(x)],[¬Px,¬Pg(x),¬Rcg(x)]]"
        );
    }

    #[test]
    /// Duplicate literals are suppressed and subsumed clauses are dropped.
    fn cnf_deduplication() {
        assert_eq!(cnf_string("p∨(q∧p)"), "[[p]]");
        assert_eq!(cnf_string("(p∨p)∧q"), "[[p],[q]]");
    }

    #[test]
    /// Logically equivalent inputs with the same parse shape give the same
    /// clause list.
    fn cnf_stability() {
        assert_eq!(cnf_string("(a∧b)∨(c∧d)"), cnf_string("(a∧b)∨(c∧d)"));
    }

    #[test]
    /// Skolem witnesses take the enclosing universal variables as arguments;
    /// without enclosing universals they are fresh constants.
    fn skolemization() {
        let mut sig = Signature::new();
        let f = parse_formula("∀x∃y(Fx∧∀zHxyz)", &mut sig).unwrap();
        let skolemized = skolemize(&normalize(&f), &mut sig);
        assert_eq!(skolemized.to_string(), "∀x(Fx∧∀zHxf(x)z)");

        let mut sig = Signature::new();
        let f = parse_formula("∀x∃y∃zHxyz ∨ ∃v∀wGvw", &mut sig).unwrap();
        let skolemized = skolemize(&normalize(&f), &mut sig);
        assert_eq!(skolemized.to_string(), "(∀xHxf(x)g(x)∨∀wGaw)");
    }

    #[test]
    /// The full clausal pipeline drops the universal prefix.
    fn clausal_pipeline() {
        let mut sig = Signature::new();
        let f = parse_formula("∀x∃y(Fx∧∀zHxyz)", &mut sig).unwrap();
        let clauses = clausal_normal_form(&f, &mut sig).unwrap();
        assert_eq!(clauses_to_string(&clauses), "[[Fx],[Hxf(x)z]]");
    }
}
