//! Conversion of formulae to negation normal form.

use crate::preprocessing::formula::Formula;
use crate::preprocessing::operator_enums::*;

/// Return an equivalent formula in negation normal form: negations are
/// pushed down to atoms, `→` and `↔` are eliminated (`↔` as a disjunction of
/// the two conjunctive cases), and double negations are removed.
///
/// The conversion is idempotent and preserves logical equivalence.
pub fn normalize(formula: &Formula) -> Formula {
    match formula {
        Formula::Atomic(..) => formula.clone(),
        Formula::Binary(BinaryOp::And, sub1, sub2) => {
            Formula::mk_binary(BinaryOp::And, normalize(sub1), normalize(sub2))
        }
        Formula::Binary(BinaryOp::Or, sub1, sub2) => {
            Formula::mk_binary(BinaryOp::Or, normalize(sub1), normalize(sub2))
        }
        Formula::Binary(BinaryOp::Imp, sub1, sub2) => Formula::mk_binary(
            BinaryOp::Or,
            normalize(&sub1.negate()),
            normalize(sub2),
        ),
        Formula::Binary(BinaryOp::Iff, sub1, sub2) => Formula::mk_binary(
            BinaryOp::Or,
            Formula::mk_binary(BinaryOp::And, normalize(sub1), normalize(sub2)),
            Formula::mk_binary(
                BinaryOp::And,
                normalize(&sub1.negate()),
                normalize(&sub2.negate()),
            ),
        ),
        Formula::Quantified(quantifier, variable, matrix) => {
            Formula::mk_quantified(*quantifier, variable.clone(), normalize(matrix))
        }
        Formula::Modal(op, sub) => Formula::mk_modal(*op, normalize(sub)),
        Formula::Negation(sub) => match sub.as_ref() {
            Formula::Atomic(..) => formula.clone(),
            Formula::Negation(inner) => normalize(inner),
            Formula::Binary(BinaryOp::And, sub1, sub2) => Formula::mk_binary(
                BinaryOp::Or,
                normalize(&sub1.negate()),
                normalize(&sub2.negate()),
            ),
            Formula::Binary(BinaryOp::Or, sub1, sub2) => Formula::mk_binary(
                BinaryOp::And,
                normalize(&sub1.negate()),
                normalize(&sub2.negate()),
            ),
            Formula::Binary(BinaryOp::Imp, sub1, sub2) => Formula::mk_binary(
                BinaryOp::And,
                normalize(sub1),
                normalize(&sub2.negate()),
            ),
            Formula::Binary(BinaryOp::Iff, sub1, sub2) => Formula::mk_binary(
                BinaryOp::Or,
                Formula::mk_binary(
                    BinaryOp::And,
                    normalize(sub1),
                    normalize(&sub2.negate()),
                ),
                Formula::mk_binary(
                    BinaryOp::And,
                    normalize(&sub1.negate()),
                    normalize(sub2),
                ),
            ),
            Formula::Quantified(Quantifier::Forall, variable, matrix) => Formula::mk_quantified(
                Quantifier::Exists,
                variable.clone(),
                normalize(&matrix.negate()),
            ),
            Formula::Quantified(Quantifier::Exists, variable, matrix) => Formula::mk_quantified(
                Quantifier::Forall,
                variable.clone(),
                normalize(&matrix.negate()),
            ),
            Formula::Modal(ModalOp::Box, inner) => {
                Formula::mk_modal(ModalOp::Diamond, normalize(&inner.negate()))
            }
            Formula::Modal(ModalOp::Diamond, inner) => {
                Formula::mk_modal(ModalOp::Box, normalize(&inner.negate()))
            }
        },
    }
}
