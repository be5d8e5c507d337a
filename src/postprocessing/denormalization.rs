//! Rebuilding the unnormalized expansions of the free-variable proof.
//!
//! The prover expanded the negation normal forms of the initial formulas,
//! but the NNF results are pointwise equivalent to applying the textbook
//! rules directly on the unnormalized originals. For each transferred node
//! the denormalizer therefore recomputes what the origin's textbook rule
//! produces and adopts the candidate whose NNF matches the prover's formula:
//! the tableau reads as if it had never been normalized.

use crate::normalization::normalize;
use crate::postprocessing::sen_node::{NodeId, SenNode};
use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::operator_enums::*;
use crate::preprocessing::signature::{Signature, ACCESSIBILITY};
use crate::proving::{FvNode, FvTree, Rule};

use std::collections::HashMap;

fn is_access_guard(guard: &Formula, variable: &Term) -> bool {
    matches!(guard, Formula::Atomic(predicate, terms)
        if predicate == ACCESSIBILITY && terms.len() == 2 && &terms[1] == variable)
}

impl SenTree {
    /// Transfer one free-variable node into the tree below `tip`.
    pub(crate) fn transfer_node(
        &mut self,
        fv: &FvTree,
        fv_idx: usize,
        tip: NodeId,
        fv_map: &HashMap<usize, NodeId>,
        _signature: &mut Signature,
    ) -> Result<NodeId, String> {
        let node = &fv.nodes[fv_idx];
        let &origin_fv = node
            .from_nodes
            .first()
            .ok_or_else(|| format!("Node {} has no origin.", node.formula))?;
        let origin_mapped = *fv_map
            .get(&origin_fv)
            .ok_or_else(|| format!("The origin of {} was never transferred.", node.formula))?;
        let origin = self.resolve_origin(origin_mapped);

        match node.from_rule {
            Rule::Alpha => Ok(self.transfer_alpha(node, origin, tip)),
            Rule::Beta => Ok(self.transfer_beta(node, origin, tip)),
            Rule::Gamma | Rule::Delta | Rule::ModalDelta => {
                Ok(self.transfer_instantiation(node, origin, tip))
            }
            Rule::ModalGamma => {
                let access = node
                    .from_nodes
                    .get(1)
                    .and_then(|i| fv_map.get(i))
                    .copied();
                Ok(self.transfer_modal_gamma(node, origin, access, tip))
            }
            Rule::Initial | Rule::Dne => Err(format!(
                "Unexpected transfer of a {} node.",
                node.from_rule
            )),
        }
    }

    /// Resolve an origin whose reconstructed formula is a double negation:
    /// such a node never expands directly, its spliced-in elimination result
    /// does.
    fn resolve_origin(&mut self, mut origin: NodeId) -> NodeId {
        loop {
            if self.nodes[origin].formula.expansion_class() != ExpansionClass::DoubleNegation {
                return origin;
            }
            if self.nodes[origin].dne_to.is_none() {
                self.expand_double_negation(origin);
            }
            origin = self.nodes[origin].dne_to.expect("dne_to was just set");
        }
    }

    /// Synthesize the double-negation elimination step below `origin`:
    /// a new node with the doubly-unnegated formula is spliced between the
    /// origin and whatever followed it, and every origin pointer at the old
    /// node is redirected to the new one.
    ///
    /// When the origin is the first result of an alpha pair, the new node is
    /// inserted after the second result instead, so the nodes of one rule
    /// application stay together.
    pub(crate) fn expand_double_negation(&mut self, origin: NodeId) {
        let inner = match &self.nodes[origin].formula {
            Formula::Negation(sub) => match sub.as_ref() {
                Formula::Negation(inner) => (**inner).clone(),
                _ => return,
            },
            _ => return,
        };
        let step = self.fresh_step();
        let id = self.adopt(SenNode {
            formula: inner,
            from_nodes: vec![origin],
            from_rule: Rule::Dne,
            instance_term: None,
            expansion_step: step,
            used: self.nodes[origin].used,
            closed_end: false,
            parent: None,
            children: Vec::new(),
            world: None,
            biconditional_expansion: false,
            dne_to: None,
            swapped_with: None,
            is_removed: false,
        });

        // splice below the alpha sibling when the origin is the first of a
        // pair
        let mut at = origin;
        if let Some(&sibling) = self.nodes[origin]
            .children
            .iter()
            .find(|&&c| self.nodes[c].expansion_step == self.nodes[origin].expansion_step)
        {
            at = sibling;
        }

        let displaced = std::mem::take(&mut self.nodes[at].children);
        for &child in &displaced {
            self.nodes[child].parent = Some(id);
        }
        self.nodes[id].children = displaced;
        self.nodes[id].parent = Some(at);
        self.nodes[at].children.push(id);
        if self.nodes[at].closed_end {
            self.nodes[at].closed_end = false;
            self.nodes[id].closed_end = true;
        }
        let position = self
            .node_list
            .iter()
            .position(|&n| n == at)
            .map(|p| p + 1)
            .unwrap_or(self.node_list.len());
        self.node_list.insert(position, id);
        self.nodes[origin].dne_to = Some(id);

        // redirect the origin pointers of every other node
        for other in 0..self.nodes.len() {
            if other == id {
                continue;
            }
            for slot in &mut self.nodes[other].from_nodes {
                if *slot == origin {
                    *slot = id;
                }
            }
        }
    }

    /// Reinsert the double-negation eliminations a closed branch relies on:
    /// a branch may close against a literal that the denormalizer rebuilt as
    /// `¬¬A`, and the elimination step makes the complement explicit.
    pub(crate) fn expand_closing_double_negations(&mut self, tip: NodeId) {
        loop {
            let mut expanded = false;
            let mut current = Some(self.advance_tip(tip));
            while let Some(node) = current {
                if self.nodes[node].used
                    && self.nodes[node].dne_to.is_none()
                    && self.nodes[node].formula.expansion_class() == ExpansionClass::DoubleNegation
                {
                    self.expand_double_negation(node);
                    expanded = true;
                    break;
                }
                current = self.nodes[node].parent;
            }
            if !expanded {
                return;
            }
        }
    }

    /// Transfer a linear two-result expansion. When both candidates
    /// normalize to the prover's formula, the first transferred sibling of
    /// the application takes the first candidate; afterwards the pair is
    /// reordered if it arrived with the second result on top.
    fn transfer_alpha(&mut self, node: &FvNode, origin: NodeId, tip: NodeId) -> NodeId {
        let origin_formula = self.nodes[origin].formula.clone();
        let candidate1 = origin_formula.alpha(1);
        let candidate2 = origin_formula.alpha(2);
        let formula = match (&candidate1, &candidate2) {
            (Some(a1), Some(a2)) => {
                let matches1 = normalize(a1) == node.formula;
                let matches2 = normalize(a2) == node.formula;
                if matches1 && matches2 {
                    let first_taken = self.nodes.iter().any(|n| {
                        !n.is_removed
                            && n.from_rule == Rule::Alpha
                            && n.expansion_step == node.expansion_step
                            && n.from_nodes.first() == Some(&origin)
                            && &n.formula == a1
                    });
                    if first_taken { a2.clone() } else { a1.clone() }
                } else if matches1 {
                    a1.clone()
                } else if matches2 {
                    a2.clone()
                } else {
                    println!(
                        "No alpha result of {origin_formula} normalizes to {}; keeping the \
                         prover's formula.",
                        node.formula
                    );
                    node.formula.clone()
                }
            }
            _ => {
                println!(
                    "Transferred node {} claims an alpha origin {origin_formula}; keeping the \
                     prover's formula.",
                    node.formula
                );
                node.formula.clone()
            }
        };

        // expansions of a biconditional byproduct display as expansions of
        // the biconditional itself
        let from_nodes = if self.nodes[origin].biconditional_expansion {
            self.nodes[origin].from_nodes.clone()
        } else {
            vec![origin]
        };
        let mut sen_node = SenNode::from_fv(node);
        sen_node.formula = formula.clone();
        sen_node.from_nodes = from_nodes;
        let id = self.adopt_under(tip, sen_node);

        // the first alpha result belongs above the second
        if let (Some(a1), Some(a2)) = (candidate1, candidate2) {
            if formula == a1
                && self.nodes[tip].from_rule == Rule::Alpha
                && self.nodes[tip].expansion_step == node.expansion_step
                && self.nodes[tip].from_nodes == self.nodes[id].from_nodes
                && self.nodes[tip].formula == a2
            {
                self.reverse(tip, id);
            }
        }
        id
    }

    /// Transfer a branching two-result expansion. Candidate ambiguity is
    /// resolved by which child slot is still free; afterwards the children
    /// are swapped if the first beta result ended up on the right.
    fn transfer_beta(&mut self, node: &FvNode, origin: NodeId, tip: NodeId) -> NodeId {
        let origin_formula = self.nodes[origin].formula.clone();
        let candidate1 = origin_formula.beta(1);
        let candidate2 = origin_formula.beta(2);
        let formula = match (&candidate1, &candidate2) {
            (Some(b1), Some(b2)) => {
                let matches1 = normalize(b1) == node.formula;
                let matches2 = normalize(b2) == node.formula;
                if matches1 && matches2 {
                    if self.nodes[tip].children.is_empty() {
                        b1.clone()
                    } else {
                        b2.clone()
                    }
                } else if matches1 {
                    b1.clone()
                } else if matches2 {
                    b2.clone()
                } else {
                    println!(
                        "No beta result of {origin_formula} normalizes to {}; keeping the \
                         prover's formula.",
                        node.formula
                    );
                    node.formula.clone()
                }
            }
            _ => {
                println!(
                    "Transferred node {} claims a beta origin {origin_formula}; keeping the \
                     prover's formula.",
                    node.formula
                );
                node.formula.clone()
            }
        };

        let biconditional = matches!(&origin_formula, Formula::Binary(BinaryOp::Iff, ..))
            || matches!(&origin_formula, Formula::Negation(sub)
                if matches!(sub.as_ref(), Formula::Binary(BinaryOp::Iff, ..)));

        let mut sen_node = SenNode::from_fv(node);
        sen_node.formula = formula.clone();
        sen_node.from_nodes = vec![origin];
        if biconditional {
            // the intermediate conjunctions of a biconditional expansion are
            // display artifacts and never count as used
            sen_node.biconditional_expansion = true;
            sen_node.used = false;
        }
        let id = self.adopt_under(tip, sen_node);

        if self.nodes[tip].children.len() == 2 {
            if let Some(b1) = candidate1 {
                let first = self.nodes[tip].children[0];
                if self.nodes[id].formula == b1 && self.nodes[first].formula != b1 {
                    self.nodes[tip].children.swap(0, 1);
                }
            }
        }
        id
    }

    /// Transfer a single-result quantifier instantiation (gamma, delta, or
    /// the world Skolemization of a possibility claim): recover the matrix
    /// from the unnormalized origin and substitute the recorded instance.
    fn transfer_instantiation(&mut self, node: &FvNode, origin: NodeId, tip: NodeId) -> NodeId {
        let origin_formula = self.nodes[origin].formula.clone();
        let formula = match &node.instance_term {
            Some(term) => match self.instantiate_unnormalized(&origin_formula, term) {
                Some(candidate) if normalize(&candidate) == node.formula => candidate,
                Some(candidate) => {
                    println!(
                        "Instantiating {origin_formula} gives {candidate}, which does not \
                         normalize to {}; keeping the prover's formula.",
                        node.formula
                    );
                    node.formula.clone()
                }
                None => {
                    println!(
                        "Node {} claims a quantified origin {origin_formula}; keeping the \
                         prover's formula.",
                        node.formula
                    );
                    node.formula.clone()
                }
            },
            None => node.formula.clone(),
        };
        let mut sen_node = SenNode::from_fv(node);
        sen_node.formula = formula;
        sen_node.from_nodes = vec![origin];
        self.adopt_under(tip, sen_node)
    }

    fn instantiate_unnormalized(&self, origin_formula: &Formula, term: &Term) -> Option<Formula> {
        match origin_formula {
            Formula::Quantified(_, variable, matrix) => {
                Some(self.instantiate_matrix(matrix, variable, term, false))
            }
            Formula::Negation(inner) => match inner.as_ref() {
                Formula::Quantified(_, variable, matrix) => {
                    Some(self.instantiate_matrix(matrix, variable, term, true))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn instantiate_matrix(
        &self,
        matrix: &Formula,
        variable: &Term,
        term: &Term,
        negated: bool,
    ) -> Formula {
        // with universal accessibility the guard is bypassed and the
        // instance goes directly into the remaining matrix
        let body = if self.s5 {
            match matrix {
                Formula::Binary(BinaryOp::Imp, guard, body)
                | Formula::Binary(BinaryOp::And, guard, body)
                    if is_access_guard(guard, variable) =>
                {
                    body.as_ref()
                }
                _ => matrix,
            }
        } else {
            matrix
        };
        let result = body.substitute(variable, term, false);
        if negated {
            result.negate()
        } else {
            result
        }
    }

    /// Transfer a box-claim instantiation: `∀v(Rwv→Av)` and `¬∃v(Rwv∧Av)`
    /// produce `Au` and `¬Au` for the accessible world `u`.
    fn transfer_modal_gamma(
        &mut self,
        node: &FvNode,
        origin: NodeId,
        access: Option<NodeId>,
        tip: NodeId,
    ) -> NodeId {
        let origin_formula = self.nodes[origin].formula.clone();
        let formula = match &node.instance_term {
            Some(term) => match self.modal_gamma_candidate(&origin_formula, term) {
                Some(candidate) if normalize(&candidate) == node.formula => candidate,
                Some(candidate) => {
                    println!(
                        "The box claim {origin_formula} yields {candidate}, which does not \
                         normalize to {}; keeping the prover's formula.",
                        node.formula
                    );
                    node.formula.clone()
                }
                None => {
                    println!(
                        "Node {} claims a box-claim origin {origin_formula}; keeping the \
                         prover's formula.",
                        node.formula
                    );
                    node.formula.clone()
                }
            },
            None => node.formula.clone(),
        };
        let mut from_nodes = vec![origin];
        if let Some(access) = access {
            from_nodes.push(access);
        }
        let mut sen_node = SenNode::from_fv(node);
        sen_node.formula = formula;
        sen_node.from_nodes = from_nodes;
        self.adopt_under(tip, sen_node)
    }

    fn modal_gamma_candidate(&self, origin_formula: &Formula, term: &Term) -> Option<Formula> {
        match origin_formula {
            Formula::Quantified(Quantifier::Forall, variable, matrix) => match matrix.as_ref() {
                Formula::Binary(BinaryOp::Imp, guard, body) if is_access_guard(guard, variable) => {
                    Some(body.substitute(variable, term, false))
                }
                _ => Some(matrix.substitute(variable, term, false)),
            },
            Formula::Negation(inner) => match inner.as_ref() {
                Formula::Quantified(Quantifier::Exists, variable, matrix) => {
                    match matrix.as_ref() {
                        Formula::Binary(BinaryOp::And, guard, body)
                            if is_access_guard(guard, variable) =>
                        {
                            Some(body.substitute(variable, term, false).negate())
                        }
                        _ => Some(matrix.substitute(variable, term, false).negate()),
                    }
                }
                _ => None,
            },
            _ => None,
        }
    }
}
