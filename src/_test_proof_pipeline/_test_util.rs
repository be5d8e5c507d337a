//! Shared helpers for the pipeline tests.

use crate::modal_translation::translate_from_modal;
use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::Formula;
use crate::preprocessing::parser::parse_formula;
use crate::preprocessing::signature::Signature;
use crate::proving::search::{prove, SearchLimits};
use crate::proving::{FvTree, Rule};

use std::collections::HashSet;

/// Run the search for the given inference and return the raw result
/// together with the signature.
pub fn search(premises: &[&str], conclusion: &str, s5: bool) -> (FvTree, Signature) {
    let mut signature = Signature::new();
    let mut init_formulas: Vec<Formula> = Vec::new();
    for premise in premises {
        init_formulas.push(parse_formula(premise, &mut signature).unwrap());
    }
    let parsed = parse_formula(conclusion, &mut signature).unwrap();
    init_formulas.push(parsed.negate());

    let init_nonmodal: Vec<Formula> = if signature.is_modal {
        init_formulas
            .iter()
            .map(|f| translate_from_modal(f, &mut signature).unwrap())
            .collect()
    } else {
        init_formulas.clone()
    };
    let tree = prove(
        &init_formulas,
        &init_nonmodal,
        &mut signature,
        s5,
        &SearchLimits::default(),
    );
    (tree, signature)
}

/// Build the named sentence tableau of a successful proof (before
/// modalization).
pub fn build_tree(premises: &[&str], conclusion: &str, s5: bool) -> (SenTree, Signature) {
    let (fv_tree, mut signature) = search(premises, conclusion, s5);
    assert!(fv_tree.is_closed(), "no proof found for {conclusion}");
    let mut tree = SenTree::from_fv_tree(&fv_tree, &mut signature).unwrap();
    tree.assign_surface_names(&mut signature);
    (tree, signature)
}

/// Check the structural invariants every finished tableau must satisfy.
pub fn assert_well_formed(tree: &SenTree) {
    // every node in the flat list is reachable from the root, and the other
    // way around; removed nodes are in neither
    let mut reachable = HashSet::new();
    let mut stack = vec![tree.root];
    while let Some(id) = stack.pop() {
        assert!(reachable.insert(id), "node {id} is reachable twice");
        assert!(
            tree.nodes[id].children.len() <= 2,
            "node {id} has more than two children"
        );
        for &child in &tree.nodes[id].children {
            assert_eq!(tree.nodes[child].parent, Some(id));
            stack.push(child);
        }
    }
    let listed: HashSet<_> = tree.node_list.iter().copied().collect();
    assert_eq!(listed, reachable, "flat list and tree disagree");
    for &id in &tree.node_list {
        assert!(!tree.nodes[id].is_removed, "removed node {id} in the list");
    }

    // every origin of a non-initial node is a strict ancestor
    for &id in &tree.node_list {
        if tree.nodes[id].from_rule == Rule::Initial {
            continue;
        }
        for &origin in &tree.nodes[id].from_nodes {
            let mut ancestor = tree.nodes[id].parent;
            let mut found = false;
            while let Some(a) = ancestor {
                if a == origin {
                    found = true;
                    break;
                }
                ancestor = tree.nodes[a].parent;
            }
            assert!(found, "origin {origin} of node {id} is not an ancestor");
        }
    }
}

/// Check that no formula in the tree still mentions the prover's internal
/// symbols (ξ, ζ, φ, ω).
pub fn assert_fully_named(tree: &SenTree) {
    for &id in &tree.node_list {
        let rendered = tree.nodes[id].formula.to_string();
        for internal in ['ξ', 'ζ', 'φ', 'ω'] {
            assert!(
                !rendered.contains(internal),
                "node {rendered} still mentions {internal}"
            );
        }
    }
}
