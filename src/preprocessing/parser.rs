//! Contains functionality regarding parsing a formula (or formula tokens)
//! into a syntax tree, and registering its symbols with the signature.
//!
//! The operator precedence is following (the lower, the stronger):
//!  - prefix operators (negation, modal operators, quantifiers): 1
//!  - boolean binary operators: and=2, or=3, imp=4, iff=5
//!

use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::operator_enums::*;
use crate::preprocessing::signature::Signature;
use crate::preprocessing::tokenizer::{try_tokenize_formula, FormulaToken};

/// Parse a formula string representation into an actual formula tree, and
/// register every symbol it contains with the signature.
///
/// Symbols are classified by their syntactic position: a symbol in formula
/// position is a predicate; in term position, letters bound by an enclosing
/// quantifier are variables, letters from `t..z` are (free) variables, and
/// the remaining letters are individual constants.
pub fn parse_formula(formula: &str, signature: &mut Signature) -> Result<Formula, String> {
    let tokens = try_tokenize_formula(formula)?;
    let tree = parse_formula_tokens(&tokens)?;
    register_symbols(&tree, signature, &mut Vec::new())?;
    if tree.contains_modal_operators() {
        signature.is_modal = true;
    }
    if !is_propositional(&tree) {
        signature.is_propositional = false;
    }
    Ok(tree)
}

/// Parse `tokens` of a formula into an abstract syntax tree using recursive
/// steps.
pub fn parse_formula_tokens(tokens: &[FormulaToken]) -> Result<Formula, String> {
    parse_1_iff(tokens)
}

/// Utility method to find the first occurrence of a specific token in the
/// token tree.
fn index_of_first(tokens: &[FormulaToken], token: FormulaToken) -> Option<usize> {
    tokens.iter().position(|t| *t == token)
}

/// Recursive parsing step 1: extract `↔` operators.
fn parse_1_iff(tokens: &[FormulaToken]) -> Result<Formula, String> {
    let iff_token = index_of_first(tokens, FormulaToken::Binary(BinaryOp::Iff));
    Ok(if let Some(i) = iff_token {
        Formula::mk_binary(
            BinaryOp::Iff,
            parse_2_imp(&tokens[..i])?,
            parse_1_iff(&tokens[(i + 1)..])?,
        )
    } else {
        parse_2_imp(tokens)?
    })
}

/// Recursive parsing step 2: extract `→` operators.
fn parse_2_imp(tokens: &[FormulaToken]) -> Result<Formula, String> {
    let imp_token = index_of_first(tokens, FormulaToken::Binary(BinaryOp::Imp));
    Ok(if let Some(i) = imp_token {
        Formula::mk_binary(
            BinaryOp::Imp,
            parse_3_or(&tokens[..i])?,
            parse_2_imp(&tokens[(i + 1)..])?,
        )
    } else {
        parse_3_or(tokens)?
    })
}

/// Recursive parsing step 3: extract `∨` operators.
fn parse_3_or(tokens: &[FormulaToken]) -> Result<Formula, String> {
    let or_token = index_of_first(tokens, FormulaToken::Binary(BinaryOp::Or));
    Ok(if let Some(i) = or_token {
        Formula::mk_binary(
            BinaryOp::Or,
            parse_4_and(&tokens[..i])?,
            parse_3_or(&tokens[(i + 1)..])?,
        )
    } else {
        parse_4_and(tokens)?
    })
}

/// Recursive parsing step 4: extract `∧` operators.
fn parse_4_and(tokens: &[FormulaToken]) -> Result<Formula, String> {
    let and_token = index_of_first(tokens, FormulaToken::Binary(BinaryOp::And));
    Ok(if let Some(i) = and_token {
        Formula::mk_binary(
            BinaryOp::And,
            parse_5_prefix(&tokens[..i])?,
            parse_4_and(&tokens[(i + 1)..])?,
        )
    } else {
        parse_5_prefix(tokens)?
    })
}

/// Recursive parsing step 5: extract prefix operators (negation, modal
/// operators, and quantifiers).
fn parse_5_prefix(tokens: &[FormulaToken]) -> Result<Formula, String> {
    Ok(match tokens.first() {
        Some(FormulaToken::Not) => Formula::mk_negation(parse_5_prefix(&tokens[1..])?),
        Some(FormulaToken::Modal(op)) => Formula::mk_modal(*op, parse_5_prefix(&tokens[1..])?),
        Some(FormulaToken::Quant(quantifier, variable)) => Formula::mk_quantified(
            *quantifier,
            Term::Symbol(variable.clone()),
            parse_5_prefix(&tokens[1..])?,
        ),
        _ => parse_6_terminal_and_parentheses(tokens)?,
    })
}

/// Recursive parsing step 6: extract terminals and recursively solve
/// sub-formulae in parentheses.
fn parse_6_terminal_and_parentheses(tokens: &[FormulaToken]) -> Result<Formula, String> {
    if tokens.is_empty() {
        Err("Expected formula, found nothing.".to_string())
    } else {
        if tokens.len() == 1 {
            match &tokens[0] {
                FormulaToken::Atom(predicate, terms) => {
                    return Ok(Formula::Atomic(predicate.clone(), terms.clone()))
                }
                // recursively solve sub-formulae in parentheses
                FormulaToken::Tokens(inner) => return parse_formula_tokens(inner),
                _ => {} // otherwise, fall through to the error at the end
            }
        }
        Err(format!("Unexpected: {tokens:?}. Expecting formula."))
    }
}

/// Walk the parsed tree and register every symbol with the signature,
/// checking for arity and kind conflicts along the way.
fn register_symbols(
    formula: &Formula,
    signature: &mut Signature,
    bound: &mut Vec<String>,
) -> Result<(), String> {
    match formula {
        Formula::Atomic(predicate, terms) => {
            signature.register_expression(predicate, ExpressionKind::Predicate, terms.len())?;
            for term in terms {
                register_term(term, signature, bound)?;
            }
            Ok(())
        }
        Formula::Negation(sub) | Formula::Modal(_, sub) => register_symbols(sub, signature, bound),
        Formula::Binary(_, sub1, sub2) => {
            register_symbols(sub1, signature, bound)?;
            register_symbols(sub2, signature, bound)
        }
        Formula::Quantified(_, variable, matrix) => {
            let name = variable.name().to_string();
            signature.register_expression(&name, ExpressionKind::Variable, 0)?;
            bound.push(name);
            let result = register_symbols(matrix, signature, bound);
            bound.pop();
            result
        }
    }
}

fn register_term(
    term: &Term,
    signature: &mut Signature,
    bound: &mut Vec<String>,
) -> Result<(), String> {
    match term {
        Term::Symbol(name) => {
            let kind = if bound.contains(name) || name.starts_with(|c| ('t'..='z').contains(&c)) {
                ExpressionKind::Variable
            } else {
                ExpressionKind::IndividualConstant
            };
            signature.register_expression(name, kind, 0)
        }
        Term::Function(functor, args) => {
            signature.register_expression(functor, ExpressionKind::FunctionSymbol, args.len())?;
            for arg in args {
                register_term(arg, signature, bound)?;
            }
            Ok(())
        }
    }
}

/// A formula is propositional while every predicate is a sentence letter and
/// no quantifier occurs (modal operators are fine).
fn is_propositional(formula: &Formula) -> bool {
    match formula {
        Formula::Atomic(_, terms) => terms.is_empty(),
        Formula::Negation(sub) | Formula::Modal(_, sub) => is_propositional(sub),
        Formula::Binary(_, sub1, sub2) => is_propositional(sub1) && is_propositional(sub2),
        Formula::Quantified(..) => false,
    }
}
