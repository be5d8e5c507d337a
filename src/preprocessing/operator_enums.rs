//! Contains enum structures for the different kinds of operators, expansion
//! classes, and symbol kinds occurring in a formula.

use std::fmt;

/// Enum for all binary connectives occurring in a formula.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum BinaryOp {
    And, // '∧'
    Or,  // '∨'
    Imp, // '→'
    Iff, // '↔'
}

/// Enum for the two first-order quantifiers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Quantifier {
    Forall, // '∀'
    Exists, // '∃'
}

/// Enum for the two modal operators.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum ModalOp {
    Box,     // '□'
    Diamond, // '◇'
}

/// Smullyan-style classification of a formula's tableau expansion behaviour.
///
/// The class decides which rule applies to the formula:
///     - `Alpha`: conjunctive, one linear expansion with two results.
///     - `Beta`: disjunctive, a branching expansion with two results.
///     - `Gamma`: universal, reusable instantiation.
///     - `Delta`: existential, consumed by a Skolem instantiation.
///     - `Boxy` / `Diamondy`: modal analogues of gamma / delta.
///     - `DoubleNegation`: `¬¬A`, eliminated by a single linear step.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExpansionClass {
    Literal,
    Alpha,
    Beta,
    Gamma,
    Delta,
    Boxy,
    Diamondy,
    DoubleNegation,
}

/// Enum for the syntactic kind a symbol is registered with in the signature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExpressionKind {
    IndividualConstant,
    WorldConstant,
    Predicate,
    FunctionSymbol,
    Variable,
    WorldVariable,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::And => write!(f, "∧"),
            BinaryOp::Or => write!(f, "∨"),
            BinaryOp::Imp => write!(f, "→"),
            BinaryOp::Iff => write!(f, "↔"),
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Quantifier::Forall => write!(f, "∀"),
            Quantifier::Exists => write!(f, "∃"),
        }
    }
}

impl fmt::Display for ModalOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModalOp::Box => write!(f, "□"),
            ModalOp::Diamond => write!(f, "◇"),
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExpressionKind::IndividualConstant => write!(f, "individual constant"),
            ExpressionKind::WorldConstant => write!(f, "world constant"),
            ExpressionKind::Predicate => write!(f, "predicate"),
            ExpressionKind::FunctionSymbol => write!(f, "function symbol"),
            ExpressionKind::Variable => write!(f, "variable"),
            ExpressionKind::WorldVariable => write!(f, "world variable"),
        }
    }
}
