//! The standard translation between modal formulae and their first-order
//! correlates with an explicit world argument, in both directions.

use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::operator_enums::*;
use crate::preprocessing::signature::{Signature, ACCESSIBILITY, ACTUAL_WORLD};

/// Translate a (possibly modal) formula into its first-order correlate.
///
/// Every predicate of arity n becomes an (n+1)-ary predicate whose last
/// argument is the current world; `□A` becomes `∀v(Rwv→A[v])` and `◇A`
/// becomes `∃v(Rwv∧A[v])`, with `R` the reserved accessibility predicate and
/// `w` the distinguished world constant naming the base world. The
/// translation also works on purely propositional input, where sentence
/// letters simply gain world-arity 1.
pub fn translate_from_modal(
    formula: &Formula,
    signature: &mut Signature,
) -> Result<Formula, String> {
    signature.register_expression(ACTUAL_WORLD, ExpressionKind::WorldConstant, 0)?;
    signature.register_expression(ACCESSIBILITY, ExpressionKind::Predicate, 2)?;
    if formula.contains_modal_operators() {
        signature.is_modal = true;
    }
    let base_world = Term::Symbol(ACTUAL_WORLD.to_string());
    translate_at_world(formula, &base_world, signature)
}

fn translate_at_world(
    formula: &Formula,
    world: &Term,
    signature: &mut Signature,
) -> Result<Formula, String> {
    match formula {
        Formula::Atomic(predicate, terms) => {
            if predicate == ACCESSIBILITY {
                return Err(format!(
                    "The predicate {ACCESSIBILITY} is reserved for accessibility."
                ));
            }
            let mut world_terms = terms.clone();
            world_terms.push(world.clone());
            signature.update_arity(predicate, world_terms.len());
            Ok(Formula::Atomic(predicate.clone(), world_terms))
        }
        Formula::Negation(sub) => Ok(Formula::mk_negation(translate_at_world(
            sub, world, signature,
        )?)),
        Formula::Binary(op, sub1, sub2) => Ok(Formula::mk_binary(
            *op,
            translate_at_world(sub1, world, signature)?,
            translate_at_world(sub2, world, signature)?,
        )),
        Formula::Quantified(quantifier, variable, matrix) => Ok(Formula::mk_quantified(
            *quantifier,
            variable.clone(),
            translate_at_world(matrix, world, signature)?,
        )),
        Formula::Modal(ModalOp::Box, sub) => {
            let fresh = Term::Symbol(signature.get_new_world_variable());
            let access = Formula::Atomic(
                ACCESSIBILITY.to_string(),
                vec![world.clone(), fresh.clone()],
            );
            let inner = translate_at_world(sub, &fresh, signature)?;
            Ok(Formula::mk_quantified(
                Quantifier::Forall,
                fresh,
                Formula::mk_binary(BinaryOp::Imp, access, inner),
            ))
        }
        Formula::Modal(ModalOp::Diamond, sub) => {
            let fresh = Term::Symbol(signature.get_new_world_variable());
            let access = Formula::Atomic(
                ACCESSIBILITY.to_string(),
                vec![world.clone(), fresh.clone()],
            );
            let inner = translate_at_world(sub, &fresh, signature)?;
            Ok(Formula::mk_quantified(
                Quantifier::Exists,
                fresh,
                Formula::mk_binary(BinaryOp::And, access, inner),
            ))
        }
    }
}

/// True for an accessibility atom `Rxy`.
pub fn is_accessibility_atom(formula: &Formula) -> bool {
    matches!(formula, Formula::Atomic(predicate, terms) if predicate == ACCESSIBILITY && terms.len() == 2)
}

/// Translate a first-order formula of the shapes produced by
/// [translate_from_modal] — or derivable from them by tableau expansion —
/// back into modal notation.
///
/// World arguments are stripped from predicates, `∀v(Rwv→A)` becomes `□A`,
/// and `∃v(Rwv∧A)` becomes `◇A`. The second component of the result is the
/// world label at which the formula is evaluated, used only for display;
/// accessibility atoms keep their first-order shape and carry no label.
pub fn translate_to_modal(
    formula: &Formula,
    signature: &Signature,
) -> Result<(Formula, Option<Term>), String> {
    match formula {
        Formula::Atomic(predicate, terms) => {
            if is_accessibility_atom(formula) {
                return Ok((formula.clone(), None));
            }
            match terms.split_last() {
                Some((world, rest)) => Ok((
                    Formula::Atomic(predicate.clone(), rest.to_vec()),
                    Some(world.clone()),
                )),
                None => Err(format!(
                    "Atom {formula} has no world argument to strip."
                )),
            }
        }
        Formula::Negation(sub) => {
            let (inner, world) = translate_to_modal(sub, signature)?;
            Ok((Formula::mk_negation(inner), world))
        }
        Formula::Binary(op, sub1, sub2) => {
            let (left, world1) = translate_to_modal(sub1, signature)?;
            let (right, world2) = translate_to_modal(sub2, signature)?;
            let world = if world1 == world2 { world1 } else { None };
            Ok((Formula::mk_binary(*op, left, right), world))
        }
        Formula::Quantified(quantifier, variable, matrix) => {
            if signature.is_world_symbol(variable.name()) {
                translate_world_quantifier(*quantifier, variable, matrix, signature)
            } else {
                let (inner, world) = translate_to_modal(matrix, signature)?;
                Ok((
                    Formula::mk_quantified(*quantifier, variable.clone(), inner),
                    world,
                ))
            }
        }
        Formula::Modal(..) => Err(format!("Formula {formula} is already modal.")),
    }
}

fn translate_world_quantifier(
    quantifier: Quantifier,
    variable: &Term,
    matrix: &Formula,
    signature: &Signature,
) -> Result<(Formula, Option<Term>), String> {
    // the guarded shapes produced by the translation itself
    if let Formula::Binary(op, guard, body) = matrix {
        let guarded = match (quantifier, op) {
            (Quantifier::Forall, BinaryOp::Imp) => true,
            (Quantifier::Exists, BinaryOp::And) => true,
            _ => false,
        };
        if guarded {
            if let Formula::Atomic(predicate, terms) = guard.as_ref() {
                if predicate == ACCESSIBILITY && terms.len() == 2 && &terms[1] == variable {
                    let (inner, _) = translate_to_modal(body, signature)?;
                    let op = match quantifier {
                        Quantifier::Forall => ModalOp::Box,
                        Quantifier::Exists => ModalOp::Diamond,
                    };
                    return Ok((Formula::mk_modal(op, inner), Some(terms[0].clone())));
                }
            }
        }
    }
    // the collapsed S5 shapes quantify over worlds without a guard
    let (inner, _) = translate_to_modal(matrix, signature)?;
    let op = match quantifier {
        Quantifier::Forall => ModalOp::Box,
        Quantifier::Exists => ModalOp::Diamond,
    };
    Ok((Formula::mk_modal(op, inner), None))
}
