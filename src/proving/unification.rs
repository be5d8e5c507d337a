//! Term unification for the free-variable tableau's closure test.
//!
//! Only the prover's own placeholder variables (ξ.., ζ..) unify; every other
//! symbol is a rigid constant or function symbol.

use crate::preprocessing::formula::{Formula, Term};

use std::collections::HashMap;

/// A substitution mapping free-variable names to terms.
pub type Substitution = HashMap<String, Term>;

/// Try to unify two atoms with the same predicate, returning the most
/// general unifier of their argument lists.
pub fn unify_atoms(a: &Formula, b: &Formula) -> Option<Substitution> {
    match (a, b) {
        (Formula::Atomic(pred_a, args_a), Formula::Atomic(pred_b, args_b)) => {
            if pred_a != pred_b || args_a.len() != args_b.len() {
                return None;
            }
            let mut substitution = Substitution::new();
            for (ta, tb) in args_a.iter().zip(args_b.iter()) {
                if !unify_terms(ta, tb, &mut substitution) {
                    return None;
                }
            }
            Some(substitution)
        }
        _ => None,
    }
}

/// Extend `substitution` so that it unifies `a` and `b`; false on clash.
pub fn unify_terms(a: &Term, b: &Term, substitution: &mut Substitution) -> bool {
    let a = walk(a, substitution);
    let b = walk(b, substitution);
    if a == b {
        return true;
    }
    match (&a, &b) {
        (Term::Symbol(name), _) if is_unifiable_variable(&a) => {
            if occurs(name, &b, substitution) {
                return false;
            }
            substitution.insert(name.clone(), b);
            true
        }
        (_, Term::Symbol(name)) if is_unifiable_variable(&b) => {
            if occurs(name, &a, substitution) {
                return false;
            }
            substitution.insert(name.clone(), a);
            true
        }
        (Term::Function(functor_a, args_a), Term::Function(functor_b, args_b)) => {
            if functor_a != functor_b || args_a.len() != args_b.len() {
                return false;
            }
            args_a
                .iter()
                .zip(args_b.iter())
                .all(|(ta, tb)| unify_terms(ta, tb, substitution))
        }
        _ => false,
    }
}

/// Apply a substitution to all terms of a formula.
pub fn apply_substitution(formula: &Formula, substitution: &Substitution) -> Formula {
    match formula {
        Formula::Atomic(predicate, terms) => Formula::Atomic(
            predicate.clone(),
            terms
                .iter()
                .map(|t| apply_substitution_term(t, substitution))
                .collect(),
        ),
        Formula::Negation(sub) => {
            Formula::mk_negation(apply_substitution(sub, substitution))
        }
        Formula::Binary(op, sub1, sub2) => Formula::mk_binary(
            *op,
            apply_substitution(sub1, substitution),
            apply_substitution(sub2, substitution),
        ),
        Formula::Quantified(quantifier, variable, matrix) => Formula::mk_quantified(
            *quantifier,
            variable.clone(),
            apply_substitution(matrix, substitution),
        ),
        Formula::Modal(op, sub) => Formula::mk_modal(*op, apply_substitution(sub, substitution)),
    }
}

/// Apply a substitution to a single term.
pub fn apply_substitution_term(term: &Term, substitution: &Substitution) -> Term {
    match term {
        Term::Symbol(name) => match substitution.get(name) {
            Some(bound) => apply_substitution_term(bound, substitution),
            None => term.clone(),
        },
        Term::Function(functor, args) => Term::Function(
            functor.clone(),
            args.iter()
                .map(|arg| apply_substitution_term(arg, substitution))
                .collect(),
        ),
    }
}

fn is_unifiable_variable(term: &Term) -> bool {
    term.is_free_variable()
}

/// Resolve a term through the substitution until its root is no longer a
/// bound variable.
fn walk(term: &Term, substitution: &Substitution) -> Term {
    let mut current = term.clone();
    loop {
        let next = match &current {
            Term::Symbol(name) => substitution.get(name).cloned(),
            Term::Function(..) => None,
        };
        match next {
            Some(bound) => current = bound,
            None => return current,
        }
    }
}

fn occurs(name: &str, term: &Term, substitution: &Substitution) -> bool {
    match walk(term, substitution) {
        Term::Symbol(s) => s == name,
        Term::Function(_, args) => args.iter().any(|arg| occurs(name, arg, substitution)),
    }
}
