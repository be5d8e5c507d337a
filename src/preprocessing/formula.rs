//! Syntax trees for first-order and modal formulae, and the algebra the
//! tableau machinery relies on: decomposition, substitution, and negation.

use crate::preprocessing::operator_enums::*;

use rand::prelude::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;

/// A term is either an atomic symbol (constant, variable, or world name), or
/// a function symbol applied to an ordered list of argument terms.
///
/// Free variables introduced by the prover start with 'ξ' (individuals) or
/// 'ζ' (worlds); Skolem symbols start with 'φ' (individuals) or 'ω' (worlds).
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Term {
    Symbol(String),
    Function(String, Vec<Term>),
}

impl Term {
    /// The symbol at the root of the term (the functor for applications).
    pub fn name(&self) -> &str {
        match self {
            Term::Symbol(s) => s.as_str(),
            Term::Function(functor, _) => functor.as_str(),
        }
    }

    /// True for the placeholder variables minted by the prover (ξ.., ζ..).
    pub fn is_free_variable(&self) -> bool {
        matches!(self, Term::Symbol(s) if s.starts_with('ξ') || s.starts_with('ζ'))
    }

    /// True if the term is rooted at a Skolem symbol (φ.., ω..).
    pub fn is_skolem(&self) -> bool {
        self.name().starts_with('φ') || self.name().starts_with('ω')
    }

    /// Number of symbol occurrences in the term.
    pub fn size(&self) -> usize {
        match self {
            Term::Symbol(_) => 1,
            Term::Function(_, args) => 1 + args.iter().map(Term::size).sum::<usize>(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Symbol(s) => write!(f, "{s}"),
            Term::Function(functor, args) => {
                write!(f, "{functor}(")?;
                for arg in args {
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A single node in the syntax tree of a formula.
///
/// Formulae are value-like: every manipulation produces a fresh tree, and the
/// derived `PartialEq` is structural equality on abstract syntax (which is
/// deliberately not logical equivalence).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Formula {
    /// Predicate symbol applied to an ordered term list. Propositional
    /// letters are atoms of arity 0.
    Atomic(String, Vec<Term>),
    Negation(Box<Formula>),
    Binary(BinaryOp, Box<Formula>, Box<Formula>),
    Quantified(Quantifier, Term, Box<Formula>),
    /// Absent after translation to first order.
    Modal(ModalOp, Box<Formula>),
}

impl Formula {
    pub fn mk_atom(predicate: &str, terms: Vec<Term>) -> Formula {
        Formula::Atomic(predicate.to_string(), terms)
    }

    pub fn mk_proposition(predicate: &str) -> Formula {
        Formula::Atomic(predicate.to_string(), Vec::new())
    }

    pub fn mk_negation(sub: Formula) -> Formula {
        Formula::Negation(Box::new(sub))
    }

    pub fn mk_binary(op: BinaryOp, sub1: Formula, sub2: Formula) -> Formula {
        Formula::Binary(op, Box::new(sub1), Box::new(sub2))
    }

    pub fn mk_quantified(quantifier: Quantifier, variable: Term, matrix: Formula) -> Formula {
        Formula::Quantified(quantifier, variable, Box::new(matrix))
    }

    pub fn mk_modal(op: ModalOp, sub: Formula) -> Formula {
        Formula::Modal(op, Box::new(sub))
    }

    /// Return `¬self`, without any simplification.
    pub fn negate(&self) -> Formula {
        Formula::mk_negation(self.clone())
    }

    /// The expansion class grouping the tableau rule behaviour of the formula.
    pub fn expansion_class(&self) -> ExpansionClass {
        match self {
            Formula::Atomic(..) => ExpansionClass::Literal,
            Formula::Binary(BinaryOp::And, ..) => ExpansionClass::Alpha,
            Formula::Binary(..) => ExpansionClass::Beta,
            Formula::Quantified(Quantifier::Forall, ..) => ExpansionClass::Gamma,
            Formula::Quantified(Quantifier::Exists, ..) => ExpansionClass::Delta,
            Formula::Modal(ModalOp::Box, _) => ExpansionClass::Boxy,
            Formula::Modal(ModalOp::Diamond, _) => ExpansionClass::Diamondy,
            Formula::Negation(sub) => match sub.as_ref() {
                Formula::Atomic(..) => ExpansionClass::Literal,
                Formula::Negation(_) => ExpansionClass::DoubleNegation,
                Formula::Binary(BinaryOp::And, ..) => ExpansionClass::Beta,
                Formula::Binary(BinaryOp::Iff, ..) => ExpansionClass::Beta,
                Formula::Binary(..) => ExpansionClass::Alpha,
                Formula::Quantified(Quantifier::Forall, ..) => ExpansionClass::Delta,
                Formula::Quantified(Quantifier::Exists, ..) => ExpansionClass::Gamma,
                Formula::Modal(ModalOp::Box, _) => ExpansionClass::Diamondy,
                Formula::Modal(ModalOp::Diamond, _) => ExpansionClass::Boxy,
            },
        }
    }

    /// True for atoms and negated atoms.
    pub fn is_literal(&self) -> bool {
        self.expansion_class() == ExpansionClass::Literal
    }

    /// For a literal, return its polarity and the underlying atom.
    pub fn as_literal(&self) -> Option<(bool, &Formula)> {
        match self {
            Formula::Atomic(..) => Some((true, self)),
            Formula::Negation(sub) if matches!(sub.as_ref(), Formula::Atomic(..)) => {
                Some((false, sub))
            }
            _ => None,
        }
    }

    /// The i-th (i ∈ {1,2}) result of the alpha (conjunctive) rule, with the
    /// standard classical signs. For example, alpha of `¬(A→B)` is `A` (i=1)
    /// and `¬B` (i=2). Returns `None` on non-alpha formulae.
    pub fn alpha(&self, i: u8) -> Option<Formula> {
        match self {
            Formula::Binary(BinaryOp::And, sub1, sub2) => Some(if i == 1 {
                (**sub1).clone()
            } else {
                (**sub2).clone()
            }),
            Formula::Negation(sub) => match sub.as_ref() {
                Formula::Binary(BinaryOp::Or, sub1, sub2) => Some(if i == 1 {
                    sub1.negate()
                } else {
                    sub2.negate()
                }),
                Formula::Binary(BinaryOp::Imp, sub1, sub2) => Some(if i == 1 {
                    (**sub1).clone()
                } else {
                    sub2.negate()
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// The i-th (i ∈ {1,2}) result of the beta (disjunctive) rule. A
    /// biconditional branches into the two conjunctive cases: beta of `A↔B`
    /// is `A∧B` (i=1) and `¬A∧¬B` (i=2). Returns `None` on non-beta formulae.
    pub fn beta(&self, i: u8) -> Option<Formula> {
        match self {
            Formula::Binary(BinaryOp::Or, sub1, sub2) => Some(if i == 1 {
                (**sub1).clone()
            } else {
                (**sub2).clone()
            }),
            Formula::Binary(BinaryOp::Imp, sub1, sub2) => Some(if i == 1 {
                sub1.negate()
            } else {
                (**sub2).clone()
            }),
            Formula::Binary(BinaryOp::Iff, sub1, sub2) => Some(if i == 1 {
                Formula::mk_binary(BinaryOp::And, (**sub1).clone(), (**sub2).clone())
            } else {
                Formula::mk_binary(BinaryOp::And, sub1.negate(), sub2.negate())
            }),
            Formula::Negation(sub) => match sub.as_ref() {
                Formula::Binary(BinaryOp::And, sub1, sub2) => Some(if i == 1 {
                    sub1.negate()
                } else {
                    sub2.negate()
                }),
                Formula::Binary(BinaryOp::Iff, sub1, sub2) => Some(if i == 1 {
                    Formula::mk_binary(BinaryOp::And, (**sub1).clone(), sub2.negate())
                } else {
                    Formula::mk_binary(BinaryOp::And, sub1.negate(), (**sub2).clone())
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// Return a fresh formula in which every occurrence of `old` is replaced
    /// by `new`. With `shallow` set, only exact whole-term matches at
    /// argument positions are replaced; otherwise the substitution also
    /// descends into composite function terms that contain `old`.
    ///
    /// Substitution never captures: the variables introduced by the prover
    /// are globally fresh, so capture cannot arise from well-typed input.
    pub fn substitute(&self, old: &Term, new: &Term, shallow: bool) -> Formula {
        match self {
            Formula::Atomic(predicate, terms) => Formula::Atomic(
                predicate.clone(),
                terms
                    .iter()
                    .map(|t| substitute_term(t, old, new, shallow))
                    .collect(),
            ),
            Formula::Negation(sub) => Formula::mk_negation(sub.substitute(old, new, shallow)),
            Formula::Binary(op, sub1, sub2) => Formula::mk_binary(
                *op,
                sub1.substitute(old, new, shallow),
                sub2.substitute(old, new, shallow),
            ),
            Formula::Quantified(quantifier, variable, matrix) => Formula::mk_quantified(
                *quantifier,
                variable.clone(),
                matrix.substitute(old, new, shallow),
            ),
            Formula::Modal(op, sub) => Formula::mk_modal(*op, sub.substitute(old, new, shallow)),
        }
    }

    /// Collect the prover's free variables (ξ.., ζ..) in order of first
    /// occurrence, without duplicates.
    pub fn free_prover_variables(&self) -> Vec<Term> {
        let mut result = Vec::new();
        self.walk_terms(&mut |term| collect_free_variables(term, &mut result));
        result
    }

    /// Apply `visit` to every term list of every atom, in pre-order.
    pub fn walk_terms<F: FnMut(&Term)>(&self, visit: &mut F) {
        match self {
            Formula::Atomic(_, terms) => {
                for term in terms {
                    visit(term);
                }
            }
            Formula::Negation(sub) | Formula::Modal(_, sub) => sub.walk_terms(visit),
            Formula::Binary(_, sub1, sub2) => {
                sub1.walk_terms(visit);
                sub2.walk_terms(visit);
            }
            Formula::Quantified(_, _, matrix) => matrix.walk_terms(visit),
        }
    }

    /// True if the formula contains a modal operator anywhere.
    pub fn contains_modal_operators(&self) -> bool {
        match self {
            Formula::Atomic(..) => false,
            Formula::Modal(..) => true,
            Formula::Negation(sub) => sub.contains_modal_operators(),
            Formula::Binary(_, sub1, sub2) => {
                sub1.contains_modal_operators() || sub2.contains_modal_operators()
            }
            Formula::Quantified(_, _, matrix) => matrix.contains_modal_operators(),
        }
    }

    /// Create a random tree of Boolean operations over the given
    /// propositions. The `tree_height` is the number of levels in the tree
    /// (not counting random negation nodes inserted between levels); the
    /// number of leaves is `2^tree_height`.
    pub fn new_random_boolean(tree_height: u8, propositions: &[String], seed: u64) -> Formula {
        let num_props = propositions.len() as u32;
        let mut rand = StdRng::seed_from_u64(seed);

        if tree_height <= 1 {
            let prop_index = rand.next_u32() % num_props;
            return Formula::mk_proposition(&propositions[prop_index as usize]);
        }

        let binary_op = match rand.next_u32() % 4 {
            0 => BinaryOp::And,
            1 => BinaryOp::Or,
            2 => BinaryOp::Imp,
            _ => BinaryOp::Iff,
        };

        let binary_node = Formula::mk_binary(
            binary_op,
            Formula::new_random_boolean(tree_height - 1, propositions, rand.next_u64()),
            Formula::new_random_boolean(tree_height - 1, propositions, rand.next_u64()),
        );

        if rand.next_u32() % 2 == 0 {
            Formula::mk_negation(binary_node)
        } else {
            binary_node
        }
    }
}

fn substitute_term(term: &Term, old: &Term, new: &Term, shallow: bool) -> Term {
    if term == old {
        return new.clone();
    }
    match term {
        Term::Function(functor, args) if !shallow => Term::Function(
            functor.clone(),
            args.iter()
                .map(|arg| substitute_term(arg, old, new, shallow))
                .collect(),
        ),
        _ => term.clone(),
    }
}

fn collect_free_variables(term: &Term, out: &mut Vec<Term>) {
    match term {
        Term::Symbol(_) => {
            if term.is_free_variable() && !out.contains(term) {
                out.push(term.clone());
            }
        }
        Term::Function(_, args) => {
            for arg in args {
                collect_free_variables(arg, out);
            }
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::Atomic(predicate, terms) => {
                write!(f, "{predicate}")?;
                for term in terms {
                    write!(f, "{term}")?;
                }
                Ok(())
            }
            Formula::Negation(sub) => write!(f, "¬{sub}"),
            Formula::Binary(op, sub1, sub2) => write!(f, "({sub1}{op}{sub2})"),
            Formula::Quantified(quantifier, variable, matrix) => {
                write!(f, "{quantifier}{variable}{matrix}")
            }
            Formula::Modal(op, sub) => write!(f, "{op}{sub}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocessing::formula::{Formula, Term};
    use crate::preprocessing::operator_enums::*;

    fn atom(name: &str) -> Formula {
        Formula::mk_proposition(name)
    }

    #[test]
    /// Test display of formulae and terms against their canonical strings.
    fn formula_display() {
        let f = Formula::mk_binary(
            BinaryOp::Imp,
            Formula::mk_modal(ModalOp::Box, atom("p")),
            atom("p"),
        );
        assert_eq!(f.to_string(), "(□p→p)");

        let t = Term::Function("f".to_string(), vec![
            Term::Symbol("x".to_string()),
            Term::Function("g".to_string(), vec![Term::Symbol("y".to_string())]),
        ]);
        let f = Formula::mk_atom("P", vec![Term::Symbol("a".to_string()), t]);
        assert_eq!(f.to_string(), "Paf(xg(y))");

        let f = Formula::mk_quantified(
            Quantifier::Forall,
            Term::Symbol("x".to_string()),
            Formula::mk_atom("F", vec![Term::Symbol("x".to_string())]),
        );
        assert_eq!(f.to_string(), "∀xFx");
    }

    #[test]
    /// The alpha decomposition follows the standard classical signs.
    fn alpha_decomposition() {
        // alpha of ¬(A→B) gives A and ¬B
        let f = Formula::mk_binary(BinaryOp::Imp, atom("A"), atom("B")).negate();
        assert_eq!(f.alpha(1).unwrap(), atom("A"));
        assert_eq!(f.alpha(2).unwrap(), atom("B").negate());

        // alpha of A∧B gives the two conjuncts
        let f = Formula::mk_binary(BinaryOp::And, atom("A"), atom("B"));
        assert_eq!(f.alpha(1).unwrap(), atom("A"));
        assert_eq!(f.alpha(2).unwrap(), atom("B"));

        // alpha of ¬(A∨B) gives the two negated disjuncts
        let f = Formula::mk_binary(BinaryOp::Or, atom("A"), atom("B")).negate();
        assert_eq!(f.alpha(1).unwrap(), atom("A").negate());
        assert_eq!(f.alpha(2).unwrap(), atom("B").negate());

        // a disjunction has no alpha decomposition
        let f = Formula::mk_binary(BinaryOp::Or, atom("A"), atom("B"));
        assert!(f.alpha(1).is_none());
    }

    #[test]
    /// The beta decomposition follows the standard classical signs; a
    /// biconditional branches into the two conjunctive cases.
    fn beta_decomposition() {
        let f = Formula::mk_binary(BinaryOp::Iff, atom("A"), atom("B"));
        assert_eq!(f.beta(1).unwrap().to_string(), "(A∧B)");
        assert_eq!(f.beta(2).unwrap().to_string(), "(¬A∧¬B)");

        let f = Formula::mk_binary(BinaryOp::Iff, atom("A"), atom("B")).negate();
        assert_eq!(f.beta(1).unwrap().to_string(), "(A∧¬B)");
        assert_eq!(f.beta(2).unwrap().to_string(), "(¬A∧B)");

        let f = Formula::mk_binary(BinaryOp::Imp, atom("A"), atom("B"));
        assert_eq!(f.beta(1).unwrap(), atom("A").negate());
        assert_eq!(f.beta(2).unwrap(), atom("B"));
    }

    #[test]
    /// Classification covers all expansion classes.
    fn expansion_classes() {
        let x = Term::Symbol("x".to_string());
        let fx = Formula::mk_atom("F", vec![x.clone()]);
        assert_eq!(fx.expansion_class(), ExpansionClass::Literal);
        assert_eq!(fx.negate().expansion_class(), ExpansionClass::Literal);
        assert_eq!(
            fx.negate().negate().expansion_class(),
            ExpansionClass::DoubleNegation
        );
        assert_eq!(
            Formula::mk_quantified(Quantifier::Forall, x.clone(), fx.clone()).expansion_class(),
            ExpansionClass::Gamma
        );
        assert_eq!(
            Formula::mk_quantified(Quantifier::Exists, x.clone(), fx.clone())
                .negate()
                .expansion_class(),
            ExpansionClass::Gamma
        );
        assert_eq!(
            Formula::mk_quantified(Quantifier::Forall, x, fx.clone())
                .negate()
                .expansion_class(),
            ExpansionClass::Delta
        );
        assert_eq!(
            Formula::mk_modal(ModalOp::Box, atom("p")).expansion_class(),
            ExpansionClass::Boxy
        );
        assert_eq!(
            Formula::mk_modal(ModalOp::Diamond, atom("p"))
                .negate()
                .expansion_class(),
            ExpansionClass::Boxy
        );
        assert_eq!(
            Formula::mk_binary(BinaryOp::Iff, atom("p"), atom("q")).expansion_class(),
            ExpansionClass::Beta
        );
    }

    #[test]
    /// Shallow substitution only replaces whole argument terms; deep
    /// substitution also descends into composite function terms.
    fn substitution_depth() {
        let x = Term::Symbol("x".to_string());
        let a = Term::Symbol("a".to_string());
        let fx = Term::Function("f".to_string(), vec![x.clone()]);
        // P(x, f(x))
        let formula = Formula::mk_atom("P", vec![x.clone(), fx]);

        let deep = formula.substitute(&x, &a, false);
        assert_eq!(deep.to_string(), "Paf(a)");

        let shallow = formula.substitute(&x, &a, true);
        assert_eq!(shallow.to_string(), "Paf(x)");
    }

    #[test]
    /// Whole Skolem terms are replaced by a single substitution step.
    fn substitute_whole_skolem_term() {
        let xi = Term::Symbol("ξ1".to_string());
        let skolem = Term::Function("φ1".to_string(), vec![xi.clone()]);
        let b = Term::Symbol("b".to_string());
        let formula = Formula::mk_atom("P", vec![xi, skolem.clone()]);

        let named = formula.substitute(&skolem, &b, false);
        assert_eq!(named.to_string(), "Pξ1b");
    }

    #[test]
    /// Free prover variables are collected in order of first occurrence.
    fn free_prover_variable_collection() {
        let xi1 = Term::Symbol("ξ1".to_string());
        let zeta = Term::Symbol("ζ2".to_string());
        let nested = Term::Function("f".to_string(), vec![zeta.clone(), xi1.clone()]);
        let formula = Formula::mk_binary(
            BinaryOp::And,
            Formula::mk_atom("P", vec![xi1.clone(), nested]),
            Formula::mk_atom("Q", vec![Term::Symbol("a".to_string())]),
        );
        assert_eq!(formula.free_prover_variables(), vec![xi1, zeta]);
    }

    #[test]
    /// Random formula generation is reproducible for a fixed seed.
    fn random_boolean_reproducible() {
        let props = vec!["p".to_string(), "q".to_string(), "r".to_string()];
        let f1 = Formula::new_random_boolean(4, &props, 7);
        let f2 = Formula::new_random_boolean(4, &props, 7);
        assert_eq!(f1, f2);
    }
}
