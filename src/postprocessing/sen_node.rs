//! A single entry of the sentence tableau.

use crate::preprocessing::formula::{Formula, Term};
use crate::proving::{FvNode, Rule};

/// Index of a node in the arena owned by its
/// [SenTree](crate::postprocessing::sen_tree::SenTree).
///
/// Origin links (`from_nodes`, `dne_to`, `swapped_with`) form a DAG over the
/// nodes, so nodes reference each other by stable arena indices, and every
/// node owns its `from_nodes` list (rewriting one node's origins never
/// affects another node's).
pub type NodeId = usize;

/// A node of the sentence tableau.
#[derive(Clone, Debug)]
pub struct SenNode {
    pub formula: Formula,
    /// The premise(s) of the rule application that produced this node.
    pub from_nodes: Vec<NodeId>,
    pub from_rule: Rule,
    /// The term substituted by gamma/delta/modal expansions.
    pub instance_term: Option<Term>,
    /// Identifies the rule application that produced this node together with
    /// its siblings/descendants from that application.
    pub expansion_step: usize,
    /// Whether this node participates in the closure of a branch.
    pub used: bool,
    /// True iff this node terminates a closed branch.
    pub closed_end: bool,
    pub parent: Option<NodeId>,
    /// At most two children; two children mark a branch point.
    pub children: Vec<NodeId>,
    /// World label attached by the modalizer, for display only.
    pub world: Option<Term>,
    /// Intermediate conjunction produced by expanding a biconditional;
    /// collapsed away before display.
    pub biconditional_expansion: bool,
    /// The double-negation elimination node spliced in below this node.
    pub dne_to: Option<NodeId>,
    /// The partner this node was reordered with by `reverse`.
    pub swapped_with: Option<NodeId>,
    pub is_removed: bool,
}

impl SenNode {
    /// Start a sentence node from a transferred free-variable node; the
    /// formula and origins are rewritten by the denormalizer afterwards.
    pub fn from_fv(node: &FvNode) -> SenNode {
        SenNode {
            formula: node.formula.clone(),
            from_nodes: Vec::new(),
            from_rule: node.from_rule,
            instance_term: node.instance_term.clone(),
            expansion_step: node.expansion_step,
            used: node.used,
            closed_end: false,
            parent: None,
            children: Vec::new(),
            world: None,
            biconditional_expansion: false,
            dne_to: None,
            swapped_with: None,
            is_removed: false,
        }
    }

    /// A fresh node for one of the initial formulas.
    pub fn initial(formula: Formula, expansion_step: usize) -> SenNode {
        SenNode {
            formula,
            from_nodes: Vec::new(),
            from_rule: Rule::Initial,
            instance_term: None,
            expansion_step,
            used: true,
            closed_end: false,
            parent: None,
            children: Vec::new(),
            world: None,
            biconditional_expansion: false,
            dne_to: None,
            swapped_with: None,
            is_removed: false,
        }
    }
}
