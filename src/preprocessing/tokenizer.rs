//! Contains functionality regarding the tokenizing of a formula string.

use crate::preprocessing::formula::Term;
use crate::preprocessing::operator_enums::*;

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Enum of all possible tokens occurring in a formula string.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FormulaToken {
    /// Negation: '¬' or '~'.
    Not,
    /// Modal operators: '□' (also '[]') and '◇' (also '<>').
    Modal(ModalOp),
    /// Binary connectives: '∧'/'&', '∨'/'|', '→'/'->', '↔'/'<->'.
    Binary(BinaryOp),
    /// Quantifier together with its bound variable: '∀x', '∃y'.
    Quant(Quantifier, String),
    /// Predicate symbol with its (possibly empty) term list, e.g. `p`,
    /// `Hxyz`, or `Pf(xy)`.
    Atom(String, Vec<Term>),
    /// A block of tokens inside parentheses.
    Tokens(Vec<FormulaToken>),
}

/// Try to tokenize the given formula string.
///
/// This is a wrapper for the (more general) recursive [try_tokenize_recursive]
/// function.
pub fn try_tokenize_formula(formula: &str) -> Result<Vec<FormulaToken>, String> {
    try_tokenize_recursive(&mut formula.chars().peekable(), true)
}

/// Process a peekable iterator of characters into a vector of `FormulaToken`s.
fn try_tokenize_recursive(
    input_chars: &mut Peekable<Chars>,
    top_level: bool,
) -> Result<Vec<FormulaToken>, String> {
    let mut output = Vec::new();

    while let Some(c) = input_chars.next() {
        match c {
            c if c.is_whitespace() => {} // skip whitespace
            '¬' | '~' => output.push(FormulaToken::Not),
            '∧' | '&' => output.push(FormulaToken::Binary(BinaryOp::And)),
            '∨' | '|' => output.push(FormulaToken::Binary(BinaryOp::Or)),
            '→' => output.push(FormulaToken::Binary(BinaryOp::Imp)),
            '↔' => output.push(FormulaToken::Binary(BinaryOp::Iff)),
            '□' => output.push(FormulaToken::Modal(ModalOp::Box)),
            '◇' => output.push(FormulaToken::Modal(ModalOp::Diamond)),
            '-' => {
                if Some('>') == input_chars.next() {
                    output.push(FormulaToken::Binary(BinaryOp::Imp));
                } else {
                    return Err("Expected '>' after '-'.".to_string());
                }
            }
            // '<' starts either '<->' or the ASCII diamond '<>'
            '<' => match input_chars.next() {
                Some('>') => output.push(FormulaToken::Modal(ModalOp::Diamond)),
                Some('-') => {
                    if Some('>') == input_chars.next() {
                        output.push(FormulaToken::Binary(BinaryOp::Iff));
                    } else {
                        return Err("Expected '>' after '<-'.".to_string());
                    }
                }
                _ => return Err("Expected '>' or '->' after '<'.".to_string()),
            },
            '[' => {
                if Some(']') == input_chars.next() {
                    output.push(FormulaToken::Modal(ModalOp::Box));
                } else {
                    return Err("Expected ']' after '['.".to_string());
                }
            }
            '∀' => {
                let variable = collect_quantified_variable(input_chars, '∀')?;
                output.push(FormulaToken::Quant(Quantifier::Forall, variable));
            }
            '∃' => {
                let variable = collect_quantified_variable(input_chars, '∃')?;
                output.push(FormulaToken::Quant(Quantifier::Exists, variable));
            }
            ')' => {
                return if !top_level {
                    Ok(output)
                } else {
                    Err("Unexpected ')' without opening counterpart.".to_string())
                }
            }
            '(' => {
                // start a nested token group
                let token_group = try_tokenize_recursive(input_chars, false)?;
                output.push(FormulaToken::Tokens(token_group));
            }
            // uppercase letter: a predicate, greedily followed by its terms
            c if c.is_ascii_uppercase() => {
                let name = collect_name(c, input_chars);
                let terms = collect_terms(input_chars)?;
                output.push(FormulaToken::Atom(name, terms));
            }
            // lowercase letter in formula position: an arity-0 predicate
            c if c.is_ascii_lowercase() => {
                let name = collect_name(c, input_chars);
                output.push(FormulaToken::Atom(name, Vec::new()));
            }
            _ => return Err(format!("Unexpected char '{c}'.")),
        }
    }

    if top_level {
        Ok(output)
    } else {
        Err("Expected ')' to previously encountered opening counterpart.".to_string())
    }
}

/// Check if given char can continue a symbol name (names are a letter plus
/// an optional digit suffix).
fn is_name_digit(option_char: Option<&char>) -> bool {
    matches!(option_char, Some(c) if c.is_ascii_digit())
}

/// Collect a symbol name: the already consumed first letter plus digits.
fn collect_name(first: char, input_chars: &mut Peekable<Chars>) -> String {
    let mut name = first.to_string();
    while is_name_digit(input_chars.peek()) {
        name.push(input_chars.next().unwrap());
    }
    name
}

/// Collect the variable bound by a quantifier, skipping whitespace.
fn collect_quantified_variable(
    input_chars: &mut Peekable<Chars>,
    quantifier: char,
) -> Result<String, String> {
    while matches!(input_chars.peek(), Some(c) if c.is_whitespace()) {
        input_chars.next();
    }
    match input_chars.next() {
        Some(c) if c.is_ascii_lowercase() => Ok(collect_name(c, input_chars)),
        _ => Err(format!("Expected a variable after '{quantifier}'.")),
    }
}

/// Collect the juxtaposed term list following a predicate symbol, e.g. the
/// `xf(xy)` in `Pxf(xy)`. Terms are lowercase symbols or function
/// applications `f(..)` whose arguments are again juxtaposed terms.
fn collect_terms(input_chars: &mut Peekable<Chars>) -> Result<Vec<Term>, String> {
    let mut terms = Vec::new();
    while matches!(input_chars.peek(), Some(c) if c.is_ascii_lowercase()) {
        let first = input_chars.next().unwrap();
        let name = collect_name(first, input_chars);
        if input_chars.peek() == Some(&'(') {
            input_chars.next();
            let args = collect_terms(input_chars)?;
            if args.is_empty() {
                return Err(format!("Function term {name}() has no arguments."));
            }
            if Some(')') != input_chars.next() {
                return Err(format!("Expected ')' after the arguments of {name}."));
            }
            terms.push(Term::Function(name, args));
        } else {
            terms.push(Term::Symbol(name));
        }
    }
    Ok(terms)
}

impl fmt::Display for FormulaToken {
    /// Display tokens for debug purposes.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormulaToken::Not => write!(f, "¬"),
            FormulaToken::Modal(op) => write!(f, "{op}"),
            FormulaToken::Binary(op) => write!(f, "{op}"),
            FormulaToken::Quant(quantifier, variable) => write!(f, "{quantifier}{variable}"),
            FormulaToken::Atom(predicate, terms) => {
                write!(f, "{predicate}")?;
                for term in terms {
                    write!(f, "{term}")?;
                }
                Ok(())
            }
            FormulaToken::Tokens(_) => write!(f, "( TOKENS )"), // debug purposes only
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocessing::formula::Term;
    use crate::preprocessing::operator_enums::*;
    use crate::preprocessing::tokenizer::{try_tokenize_formula, FormulaToken};

    fn symbol(s: &str) -> Term {
        Term::Symbol(s.to_string())
    }

    #[test]
    /// Test tokenization on several valid formulae, covering the whole range
    /// of operators and both the Unicode and the ASCII spellings.
    fn tokenize_valid_formulae() {
        let tokens = try_tokenize_formula("□p→◇q").unwrap();
        let expected_tokens = vec![
            FormulaToken::Modal(ModalOp::Box),
            FormulaToken::Atom("p".to_string(), vec![]),
            FormulaToken::Binary(BinaryOp::Imp),
            FormulaToken::Modal(ModalOp::Diamond),
            FormulaToken::Atom("q".to_string(), vec![]),
        ];
        assert_eq!(tokens, expected_tokens);
        let ascii_tokens = try_tokenize_formula("[]p -> <>q").unwrap();
        assert_eq!(ascii_tokens, expected_tokens);

        let tokens = try_tokenize_formula("∀x∃y(Fx∧∀zHxyz)").unwrap();
        let expected_tokens = vec![
            FormulaToken::Quant(Quantifier::Forall, "x".to_string()),
            FormulaToken::Quant(Quantifier::Exists, "y".to_string()),
            FormulaToken::Tokens(vec![
                FormulaToken::Atom("F".to_string(), vec![symbol("x")]),
                FormulaToken::Binary(BinaryOp::And),
                FormulaToken::Quant(Quantifier::Forall, "z".to_string()),
                FormulaToken::Atom("H".to_string(), vec![symbol("x"), symbol("y"), symbol("z")]),
            ]),
        ];
        assert_eq!(tokens, expected_tokens);

        let tokens = try_tokenize_formula("¬p ↔ ~q").unwrap();
        let expected_tokens = vec![
            FormulaToken::Not,
            FormulaToken::Atom("p".to_string(), vec![]),
            FormulaToken::Binary(BinaryOp::Iff),
            FormulaToken::Not,
            FormulaToken::Atom("q".to_string(), vec![]),
        ];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    /// Function terms nest and juxtapose like their surrounding term lists.
    fn tokenize_function_terms() {
        let tokens = try_tokenize_formula("Pf(xy)").unwrap();
        let expected_tokens = vec![FormulaToken::Atom(
            "P".to_string(),
            vec![Term::Function(
                "f".to_string(),
                vec![symbol("x"), symbol("y")],
            )],
        )];
        assert_eq!(tokens, expected_tokens);

        let tokens = try_tokenize_formula("Rcg(x)").unwrap();
        let expected_tokens = vec![FormulaToken::Atom(
            "R".to_string(),
            vec![
                symbol("c"),
                Term::Function("g".to_string(), vec![symbol("x")]),
            ],
        )];
        assert_eq!(tokens, expected_tokens);

        let tokens = try_tokenize_formula("Qf(xg(y))").unwrap();
        let expected_tokens = vec![FormulaToken::Atom(
            "Q".to_string(),
            vec![Term::Function(
                "f".to_string(),
                vec![
                    symbol("x"),
                    Term::Function("g".to_string(), vec![symbol("y")]),
                ],
            )],
        )];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    /// Test tokenization on several invalid formulae, covering a wide range
    /// of potential frequent mistakes.
    fn tokenize_invalid_formulae() {
        let invalid_formulae = vec![
            "p -",
            "p <",
            "p <- q",
            "p [ q",
            "∀(Fx)",
            "∀",
            "p ∧ q)",
            "(p ∧ q",
            "Pf()",
            "Pf(x",
            "p # q",
            "p = q",
        ];

        for formula in invalid_formulae {
            assert!(try_tokenize_formula(formula).is_err());
        }
    }

    #[test]
    /// Whitespace is insignificant between tokens.
    fn tokenize_with_whitespaces() {
        let valid_formula = "  ∀ x (  Fx   →  ◇  p ) ";
        assert!(try_tokenize_formula(valid_formula).is_ok());
    }
}
