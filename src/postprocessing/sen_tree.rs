//! The sentence-tableau assembler: owns the node arena, replays the
//! free-variable branches, and performs the tree surgery (append, reverse,
//! remove, pruning) the denormalizer relies on.

use crate::postprocessing::sen_node::{NodeId, SenNode};
use crate::preprocessing::formula::Formula;
use crate::preprocessing::signature::Signature;
use crate::proving::{FvTree, Rule};

use std::collections::HashMap;
use std::fmt;

/// The sentence tableau: a node arena, the tree root, and the flat node list
/// in adoption order (a pre-order walk of the final tree along the main
/// branch, once the `reverse` reorderings are taken into account).
#[derive(Clone, Debug)]
pub struct SenTree {
    pub nodes: Vec<SenNode>,
    pub root: NodeId,
    pub node_list: Vec<NodeId>,
    /// The initial formulas as entered.
    pub init_formulas: Vec<Formula>,
    /// The initial formulas after the standard translation.
    pub init_formulas_nonmodal: Vec<Formula>,
    /// The translated initial formulas in negation normal form.
    pub init_formulas_normalized: Vec<Formula>,
    /// True if every branch of the source tableau is closed.
    pub closed: bool,
    pub s5: bool,
    next_step: usize,
}

impl SenTree {
    /// Build the sentence tableau from a finished free-variable tableau:
    /// adopt the (demodalized, unnormalized) initial formulas, replay every
    /// branch through the denormalizer, and prune the nodes that do not
    /// contribute to the proof.
    ///
    /// The naming pass ([SenTree::assign_surface_names]) and the optional
    /// [SenTree::modalize] run separately.
    pub fn from_fv_tree(fv: &FvTree, signature: &mut Signature) -> Result<SenTree, String> {
        if fv.init_formulas_nonmodal.is_empty() {
            return Err("Cannot build a sentence tableau without initial formulas.".to_string());
        }
        let mut tree = SenTree {
            nodes: Vec::new(),
            root: 0,
            node_list: Vec::new(),
            init_formulas: fv.init_formulas.clone(),
            init_formulas_nonmodal: fv.init_formulas_nonmodal.clone(),
            init_formulas_normalized: fv.init_formulas_normalized.clone(),
            closed: fv.is_closed(),
            s5: fv.s5,
            next_step: fv.num_steps,
        };
        tree.transfer_nodes(fv, signature)?;
        tree.prune_unused_nodes();
        Ok(tree)
    }

    fn transfer_nodes(&mut self, fv: &FvTree, signature: &mut Signature) -> Result<(), String> {
        // adopt the initial formulas as a linear chain below the root
        let init_indices: Vec<usize> = fv
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.from_rule == Rule::Initial)
            .map(|(i, _)| i)
            .collect();
        if init_indices.len() != self.init_formulas_nonmodal.len() {
            return Err("Initial formulas and initial tableau nodes are misaligned.".to_string());
        }

        let mut fv_map: HashMap<usize, NodeId> = HashMap::new();
        let mut previous: Option<NodeId> = None;
        for (formula, &fv_idx) in self.init_formulas_nonmodal.clone().iter().zip(&init_indices) {
            let node = SenNode::initial(formula.clone(), fv.nodes[fv_idx].expansion_step);
            let id = self.adopt(node);
            match previous {
                None => {
                    self.root = id;
                    self.node_list.push(id);
                }
                Some(parent) => self.append_child(parent, id),
            }
            fv_map.insert(fv_idx, id);
            previous = Some(id);
        }

        // replay every branch, transferring the nodes it adds
        let all_branches = fv.closed_branches.iter().map(|b| (b, true)).chain(
            fv.open_branches.iter().map(|b| (b, false)),
        );
        for (branch, branch_closed) in all_branches {
            let mut tip = self.root;
            for &fv_idx in &branch.nodes {
                if let Some(&mapped) = fv_map.get(&fv_idx) {
                    tip = mapped;
                    continue;
                }
                tip = self.advance_tip(tip);
                let id = self.transfer_node(fv, fv_idx, tip, &fv_map, signature)?;
                fv_map.insert(fv_idx, id);
                tip = id;
            }
            if branch_closed {
                self.expand_closing_double_negations(tip);
                let leaf = self.advance_tip(tip);
                self.nodes[leaf].closed_end = true;
            }
        }
        Ok(())
    }

    /// Walk past nodes that were spliced or reordered below `tip` after its
    /// adoption, so the next append continues the branch at its real end.
    pub(crate) fn advance_tip(&self, mut tip: NodeId) -> NodeId {
        loop {
            if self.nodes[tip].children.len() != 1 {
                return tip;
            }
            let child = self.nodes[tip].children[0];
            if self.nodes[child].from_rule == Rule::Dne
                || self.nodes[child].swapped_with == Some(tip)
            {
                tip = child;
            } else {
                return tip;
            }
        }
    }

    /// A fresh expansion step for nodes synthesized after the search.
    pub(crate) fn fresh_step(&mut self) -> usize {
        self.next_step += 1;
        self.next_step
    }

    /// Adopt a node into the arena; `parent`/`children` start empty.
    pub(crate) fn adopt(&mut self, node: SenNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Adopt a node and append it below `parent`.
    pub(crate) fn adopt_under(&mut self, parent: NodeId, node: SenNode) -> NodeId {
        let id = self.adopt(node);
        self.append_child(parent, id);
        id
    }

    /// Append `child` below `parent` and record it in the flat list. A
    /// closed-end marker on the parent moves down to the new leaf.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.node_list.push(child);
        if self.nodes[parent].closed_end {
            self.nodes[parent].closed_end = false;
            self.nodes[child].closed_end = true;
        }
    }

    /// Swap `b` (the only child of `a`) with its parent, so that `b` ends up
    /// above `a`. Leaf markers stay at the leaf, both partners remember the
    /// swap, and the flat list mirrors the new order.
    pub fn reverse(&mut self, a: NodeId, b: NodeId) {
        if self.nodes[a].children != vec![b] {
            return;
        }
        let grandparent = self.nodes[a].parent;
        let b_children = std::mem::take(&mut self.nodes[b].children);
        for &c in &b_children {
            self.nodes[c].parent = Some(a);
        }
        self.nodes[a].children = b_children;
        self.nodes[b].children = vec![a];
        self.nodes[a].parent = Some(b);
        self.nodes[b].parent = grandparent;
        match grandparent {
            Some(g) => {
                let slot = self.nodes[g]
                    .children
                    .iter()
                    .position(|&c| c == a)
                    .expect("parent links are consistent");
                self.nodes[g].children[slot] = b;
            }
            None => self.root = b,
        }

        let closed_a = self.nodes[a].closed_end;
        self.nodes[a].closed_end = self.nodes[b].closed_end;
        self.nodes[b].closed_end = closed_a;
        self.nodes[a].swapped_with = Some(b);
        self.nodes[b].swapped_with = Some(a);

        let pos_a = self.node_list.iter().position(|&n| n == a);
        let pos_b = self.node_list.iter().position(|&n| n == b);
        if let (Some(pos_a), Some(pos_b)) = (pos_a, pos_b) {
            self.node_list.swap(pos_a, pos_b);
        }
    }

    /// Remove a node from the tree, splicing its children into its place.
    ///
    /// Removal is refused (returns false) when the node has two children
    /// while its parent also has two children, and for the root. A removed
    /// node is unreachable and no longer in the flat list.
    pub fn remove(&mut self, n: NodeId) -> bool {
        if self.nodes[n].is_removed {
            return false;
        }
        let Some(parent) = self.nodes[n].parent else {
            return false;
        };
        let siblings = self.nodes[parent].children.len();
        let kids = self.nodes[n].children.clone();
        if siblings > 1 && kids.len() > 1 {
            return false;
        }

        let slot = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == n)
            .expect("parent links are consistent");
        self.nodes[parent].children.remove(slot);
        for (offset, &kid) in kids.iter().enumerate() {
            self.nodes[kid].parent = Some(parent);
            self.nodes[parent].children.insert(slot + offset, kid);
        }
        // a quantifier instance survives on the promoted child
        if let Some(term) = self.nodes[n].instance_term.clone() {
            if kids.len() == 1 && self.nodes[kids[0]].instance_term.is_none() {
                self.nodes[kids[0]].instance_term = Some(term);
            }
        }

        self.nodes[n].is_removed = true;
        self.nodes[n].parent = None;
        self.nodes[n].children.clear();
        self.node_list.retain(|&x| x != n);
        true
    }

    /// All nodes produced by the same rule application as `n`: the linear
    /// ancestors and descendants sharing its expansion step, plus siblings
    /// on parallel paths immediately below the common parent.
    pub fn get_expansion(&self, n: NodeId) -> Vec<NodeId> {
        let step = self.nodes[n].expansion_step;
        let mut result = vec![n];

        // linear ancestors
        let mut top = n;
        while let Some(parent) = self.nodes[top].parent {
            if self.nodes[parent].expansion_step == step {
                result.push(parent);
                top = parent;
            } else {
                break;
            }
        }
        // descendants below the topmost member
        self.collect_expansion_below(top, step, &mut result);
        // siblings on parallel paths below the common parent
        if let Some(parent) = self.nodes[top].parent {
            for &sibling in self.nodes[parent].children.clone().iter() {
                if sibling != top && self.nodes[sibling].expansion_step == step {
                    result.push(sibling);
                    self.collect_expansion_below(sibling, step, &mut result);
                }
            }
        }
        result
    }

    fn collect_expansion_below(&self, from: NodeId, step: usize, result: &mut Vec<NodeId>) {
        for &child in &self.nodes[from].children {
            if self.nodes[child].expansion_step == step && !result.contains(&child) {
                result.push(child);
                self.collect_expansion_below(child, step, result);
            }
        }
    }

    /// Remove the nodes that do not contribute to the proof. Only applies to
    /// closed tableaux.
    ///
    /// First every used node marks its whole rule application used (skipping
    /// biconditional byproducts); then every node still unused is removed.
    /// A node whose removal is refused simply survives.
    pub fn prune_unused_nodes(&mut self) {
        if !self.closed {
            return;
        }
        for id in self.node_list.clone() {
            if self.nodes[id].used {
                for member in self.get_expansion(id) {
                    if !self.nodes[member].biconditional_expansion {
                        self.nodes[member].used = true;
                    }
                }
            }
        }
        for id in self.node_list.clone() {
            if !self.nodes[id].is_removed && !self.nodes[id].used {
                self.remove(id);
            }
        }
    }

    /// Number of a node in the displayed tableau (1-based flat-list order).
    pub fn display_number(&self, id: NodeId) -> Option<usize> {
        self.node_list.iter().position(|&n| n == id).map(|p| p + 1)
    }

    fn fmt_subtree(
        &self,
        f: &mut fmt::Formatter,
        id: NodeId,
        depth: usize,
    ) -> fmt::Result {
        let node = &self.nodes[id];
        let number = self.display_number(id).unwrap_or(0);
        write!(f, "{:indent$}{number}. {}", "", node.formula, indent = depth * 2)?;
        if let Some(world) = &node.world {
            write!(f, " ({world})")?;
        }
        if node.from_rule != Rule::Initial {
            let origins: Vec<String> = node
                .from_nodes
                .iter()
                .filter_map(|&o| self.display_number(o))
                .map(|n| n.to_string())
                .collect();
            write!(f, "  [{} {}]", origins.join(","), node.from_rule)?;
        }
        if node.closed_end {
            write!(f, " ✗")?;
        }
        writeln!(f)?;
        for &child in &node.children {
            self.fmt_subtree(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for SenTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_subtree(f, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::postprocessing::sen_node::SenNode;
    use crate::postprocessing::sen_tree::SenTree;
    use crate::preprocessing::formula::Formula;

    /// A small linear tree for exercising the primitive operations.
    fn scaffold(formulas: &[&str]) -> SenTree {
        let mut tree = SenTree {
            nodes: Vec::new(),
            root: 0,
            node_list: Vec::new(),
            init_formulas: Vec::new(),
            init_formulas_nonmodal: Vec::new(),
            init_formulas_normalized: Vec::new(),
            closed: true,
            s5: false,
            next_step: 0,
        };
        let mut previous = None;
        for name in formulas {
            let step = tree.fresh_step();
            let node = SenNode::initial(Formula::mk_proposition(name), step);
            let id = tree.adopt(node);
            match previous {
                None => {
                    tree.root = id;
                    tree.node_list.push(id);
                }
                Some(parent) => tree.append_child(parent, id),
            }
            previous = Some(id);
        }
        tree
    }

    #[test]
    /// `reverse` swaps a node with its only child and keeps bookkeeping.
    fn reverse_swaps_parent_and_child() {
        let mut tree = scaffold(&["a", "b", "c"]);
        tree.nodes[2].closed_end = true;
        tree.reverse(1, 2);
        // a is still the root; c now sits above b
        assert_eq!(tree.root, 0);
        assert_eq!(tree.nodes[0].children, vec![2]);
        assert_eq!(tree.nodes[2].children, vec![1]);
        assert_eq!(tree.nodes[1].parent, Some(2));
        assert_eq!(tree.nodes[1].swapped_with, Some(2));
        assert_eq!(tree.nodes[2].swapped_with, Some(1));
        // the leaf marker stays at the leaf
        assert!(tree.nodes[1].closed_end);
        assert!(!tree.nodes[2].closed_end);
        // the flat list mirrors the new order
        assert_eq!(tree.node_list, vec![0, 2, 1]);
    }

    #[test]
    /// Removing a linear node promotes its child; removal of a node with two
    /// children is refused when its parent branches as well.
    fn remove_splices_and_refuses() {
        let mut tree = scaffold(&["a", "b", "c"]);
        assert!(tree.remove(1));
        assert_eq!(tree.nodes[0].children, vec![2]);
        assert_eq!(tree.nodes[2].parent, Some(0));
        assert!(tree.nodes[1].is_removed);
        assert_eq!(tree.node_list, vec![0, 2]);

        // build: a branches to (b, c); b has children d, e
        let mut tree = scaffold(&["a", "b"]);
        let c = tree.adopt(SenNode::initial(Formula::mk_proposition("c"), 3));
        tree.append_child(0, c);
        let d = tree.adopt(SenNode::initial(Formula::mk_proposition("d"), 4));
        tree.append_child(1, d);
        let e = tree.adopt(SenNode::initial(Formula::mk_proposition("e"), 5));
        tree.append_child(1, e);
        // b has two children and a sibling: removal refused
        assert!(!tree.remove(1));
        assert!(!tree.nodes[1].is_removed);
        // the root is never removed
        assert!(!tree.remove(0));
    }

    #[test]
    /// A removed branching node hands both children to a linear parent.
    fn remove_promotes_two_children() {
        let mut tree = scaffold(&["a", "b"]);
        let c = tree.adopt(SenNode::initial(Formula::mk_proposition("c"), 3));
        tree.append_child(1, c);
        let d = tree.adopt(SenNode::initial(Formula::mk_proposition("d"), 4));
        tree.append_child(1, d);
        assert!(tree.remove(1));
        assert_eq!(tree.nodes[0].children, vec![2, 3]);
        assert_eq!(tree.nodes[2].parent, Some(0));
        assert_eq!(tree.nodes[3].parent, Some(0));
    }

    #[test]
    /// The expansion group covers linear members and parallel siblings.
    fn expansion_groups() {
        let mut tree = scaffold(&["a"]);
        // linear pair sharing step 10
        let b = tree.adopt(SenNode::initial(Formula::mk_proposition("b"), 10));
        tree.append_child(0, b);
        let c = tree.adopt(SenNode::initial(Formula::mk_proposition("c"), 10));
        tree.append_child(b, c);
        let mut group = tree.get_expansion(c);
        group.sort();
        assert_eq!(group, vec![b, c]);

        // branching pair sharing step 20
        let d = tree.adopt(SenNode::initial(Formula::mk_proposition("d"), 20));
        tree.append_child(c, d);
        let e = tree.adopt(SenNode::initial(Formula::mk_proposition("e"), 20));
        tree.append_child(c, e);
        let mut group = tree.get_expansion(d);
        group.sort();
        assert_eq!(group, vec![d, e]);
    }

    #[test]
    /// The closed-end marker transfers from parent to appended child.
    fn closed_end_transfer() {
        let mut tree = scaffold(&["a", "b"]);
        tree.nodes[1].closed_end = true;
        let c = tree.adopt(SenNode::initial(Formula::mk_proposition("c"), 3));
        tree.append_child(1, c);
        assert!(!tree.nodes[1].closed_end);
        assert!(tree.nodes[2].closed_end);
    }
}
