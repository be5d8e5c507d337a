//! The free-variable tableau prover: rule provenance, branch bookkeeping,
//! unification, and the bounded search itself.

pub mod search;
pub mod unification;

use crate::preprocessing::formula::{Formula, Term};

use std::fmt;

/// The tableau rule that produced a node.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rule {
    Initial,
    Alpha,
    Beta,
    Gamma,
    Delta,
    ModalGamma,
    ModalDelta,
    /// Double-negation elimination; only synthesized during sentence-tree
    /// construction, never by the prover (whose formulae are in NNF).
    Dne,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rule::Initial => write!(f, "assumption"),
            Rule::Alpha => write!(f, "alpha"),
            Rule::Beta => write!(f, "beta"),
            Rule::Gamma => write!(f, "gamma"),
            Rule::Delta => write!(f, "delta"),
            Rule::ModalGamma => write!(f, "modal gamma"),
            Rule::ModalDelta => write!(f, "modal delta"),
            Rule::Dne => write!(f, "dne"),
        }
    }
}

/// A node of the free-variable tableau. Nodes live in the arena owned by
/// [FvTree] and reference each other by index.
#[derive(Clone, Debug)]
pub struct FvNode {
    /// The formula, in negation normal form (modulo the global substitutions
    /// applied by unification closures).
    pub formula: Formula,
    /// The premise(s) of the rule application that produced this node.
    pub from_nodes: Vec<usize>,
    pub from_rule: Rule,
    /// The term substituted by gamma/delta/modal expansions.
    pub instance_term: Option<Term>,
    /// Identifies the rule application that produced this node together with
    /// its siblings from the same application.
    pub expansion_step: usize,
    /// Whether the node participates in the closure of a branch.
    pub used: bool,
}

/// A branch of the free-variable tableau, as an ordered list of node
/// indices; branches share the nodes of their common prefix.
#[derive(Clone, Debug)]
pub struct FvBranch {
    pub nodes: Vec<usize>,
}

/// The result of the free-variable tableau search, consumed by the
/// sentence-tree assembler and the countermodel reader.
#[derive(Clone, Debug)]
pub struct FvTree {
    pub nodes: Vec<FvNode>,
    /// The initial formulas as entered (the conclusion already negated).
    pub init_formulas: Vec<Formula>,
    /// The initial formulas after the standard translation.
    pub init_formulas_nonmodal: Vec<Formula>,
    /// The translated initial formulas in negation normal form.
    pub init_formulas_normalized: Vec<Formula>,
    pub closed_branches: Vec<FvBranch>,
    pub open_branches: Vec<FvBranch>,
    pub s5: bool,
    /// Number of expansion steps assigned so far; the sentence tree
    /// continues the numbering for its synthesized nodes.
    pub num_steps: usize,
}

impl FvTree {
    /// True if the search found a proof: every branch is closed.
    pub fn is_closed(&self) -> bool {
        self.open_branches.is_empty() && !self.closed_branches.is_empty()
    }
}
