//! End-to-end tests of sentence-tableau construction: denormalization,
//! double-negation splicing, biconditional collapsing, pruning, naming, and
//! modalization.

use crate::_test_proof_pipeline::_test_util::{
    assert_fully_named, assert_well_formed, build_tree, search,
};
use crate::postprocessing::sen_tree::SenTree;
use crate::proving::Rule;

#[test]
/// A propositional proof denormalizes back to the textbook rules: the
/// tableau shows the unnormalized alpha results, and every branch ends
/// closed.
fn propositional_tree() {
    let (tree, _) = build_tree(&[], "¬(p∧¬q)∨p", false);
    assert_well_formed(&tree);
    assert!(tree.closed);
    let formulas: Vec<String> = tree
        .node_list
        .iter()
        .map(|&id| tree.nodes[id].formula.to_string())
        .collect();
    assert_eq!(formulas[0], "¬(¬(p∧¬q)∨p)");
    assert!(formulas.contains(&"¬¬(p∧¬q)".to_string()));
    // every leaf of a closed tableau carries the closed-end marker
    for &id in &tree.node_list {
        if tree.nodes[id].children.is_empty() {
            assert!(tree.nodes[id].closed_end);
        }
    }
}

#[test]
/// The denormalizer reinserts the double negation the NNF erased, splicing
/// the elimination step after the second alpha result.
fn double_negation_splicing() {
    let (tree, _) = build_tree(&[], "¬¬p→p", false);
    assert_well_formed(&tree);
    let formulas: Vec<String> = tree
        .node_list
        .iter()
        .map(|&id| tree.nodes[id].formula.to_string())
        .collect();
    assert_eq!(formulas, vec!["¬(¬¬p→p)", "¬¬p", "¬p", "p"]);

    let dne: Vec<_> = tree
        .node_list
        .iter()
        .copied()
        .filter(|&id| tree.nodes[id].from_rule == Rule::Dne)
        .collect();
    assert_eq!(dne.len(), 1);
    let origin = tree.nodes[dne[0]].from_nodes[0];
    assert_eq!(tree.nodes[origin].formula.to_string(), "¬¬p");
    assert_eq!(tree.nodes[origin].dne_to, Some(dne[0]));
    // spliced below the second alpha result, not directly below its origin
    assert_eq!(tree.nodes[dne[0]].parent.map(|p| tree.nodes[p].formula.to_string()),
        Some("¬p".to_string()));
}

#[test]
/// The byproduct conjunctions of a biconditional expansion are collapsed
/// away: their alpha results display as direct expansions of the
/// biconditional itself.
fn biconditional_byproducts() {
    let (tree, _) = build_tree(&[], "(p↔q)→(p→q)", false);
    assert_well_formed(&tree);
    for &id in &tree.node_list {
        assert!(
            !tree.nodes[id].biconditional_expansion,
            "byproduct node survived pruning"
        );
    }
    let biconditional = tree
        .node_list
        .iter()
        .copied()
        .find(|&id| tree.nodes[id].formula.to_string() == "(p↔q)")
        .expect("the biconditional premise is displayed");
    let direct_expansions: Vec<_> = tree
        .node_list
        .iter()
        .copied()
        .filter(|&id| tree.nodes[id].from_nodes.first() == Some(&biconditional))
        .collect();
    assert!(
        !direct_expansions.is_empty(),
        "no expansion points at the biconditional"
    );
    for id in direct_expansions {
        assert!(tree.nodes[id].formula.is_literal());
    }
}

#[test]
/// Used-set closure: after pruning, the expansion partners of every used
/// node are still present.
fn used_set_closure() {
    let (tree, _) = build_tree(&[], "((p→q)→p)→p", false);
    assert_well_formed(&tree);
    for &id in &tree.node_list {
        if tree.nodes[id].used {
            for member in tree.get_expansion(id) {
                assert!(
                    tree.node_list.contains(&member),
                    "expansion partner of a used node was pruned"
                );
            }
        }
    }
}

#[test]
/// A first-order proof instantiates the textbook gamma rule and the naming
/// pass eliminates every internal symbol deterministically.
fn first_order_naming() {
    let (tree, _) = build_tree(&["∀x(Fx→Gx)", "Fa"], "Ga", false);
    assert_well_formed(&tree);
    assert_fully_named(&tree);
    let formulas: Vec<String> = tree
        .node_list
        .iter()
        .map(|&id| tree.nodes[id].formula.to_string())
        .collect();
    assert!(formulas.contains(&"(Fa→Ga)".to_string()));
    let gamma = tree
        .node_list
        .iter()
        .copied()
        .find(|&id| tree.nodes[id].from_rule == Rule::Gamma)
        .expect("a gamma step is displayed");
    assert_eq!(
        tree.nodes[gamma].instance_term.as_ref().map(|t| t.to_string()),
        Some("a".to_string())
    );
}

#[test]
/// Skolem terms become surface constants, and rebuilding the same tableau
/// from the same free-variable tree yields identical formulas.
fn naming_determinism() {
    let (fv_tree, signature) = search(&[], "∃y∀xRxy→∀x∃yRxy", false);
    assert!(fv_tree.is_closed());

    let render = |tree: &SenTree| -> Vec<String> {
        tree.node_list
            .iter()
            .map(|&id| tree.nodes[id].formula.to_string())
            .collect()
    };

    let mut signature_one = signature.clone();
    let mut tree_one = SenTree::from_fv_tree(&fv_tree, &mut signature_one).unwrap();
    tree_one.assign_surface_names(&mut signature_one);
    assert_fully_named(&tree_one);

    let mut signature_two = signature.clone();
    let mut tree_two = SenTree::from_fv_tree(&fv_tree, &mut signature_two).unwrap();
    tree_two.assign_surface_names(&mut signature_two);

    assert_eq!(render(&tree_one), render(&tree_two));
}

#[test]
/// A modal K proof: the box claims expand through the accessibility facts,
/// and modalization rewrites the whole tableau into modal vocabulary.
fn modal_k_tree() {
    let (fv_tree, mut signature) = search(&[], "□(p→q)→(□p→□q)", false);
    assert!(fv_tree.is_closed());
    let mut tree = SenTree::from_fv_tree(&fv_tree, &mut signature).unwrap();
    tree.assign_surface_names(&mut signature);
    assert_well_formed(&tree);
    assert_fully_named(&tree);
    let modal_gammas = tree
        .node_list
        .iter()
        .filter(|&&id| tree.nodes[id].from_rule == Rule::ModalGamma)
        .count();
    assert!(modal_gammas >= 2, "both box premises must fire");

    tree.modalize(&signature).unwrap();
    assert_well_formed(&tree);
    let formulas: Vec<String> = tree
        .node_list
        .iter()
        .map(|&id| tree.nodes[id].formula.to_string())
        .collect();
    assert_eq!(formulas[0], "¬(□(p→q)→(□p→□q))");
    assert!(formulas.contains(&"□(p→q)".to_string()));
    // the quantified first-order shapes are gone from every displayed node
    for formula in &formulas {
        assert!(!formula.contains('∀'), "unmodalized node: {formula}");
        assert!(!formula.contains('∃'), "unmodalized node: {formula}");
    }
    // the surviving box expansions carry a world label
    let labelled = tree
        .node_list
        .iter()
        .filter(|&&id| tree.nodes[id].world.is_some())
        .count();
    assert!(labelled > 0);
}

#[test]
/// Under S5 the accessibility structure collapses: the T axiom becomes
/// provable and its tableau never materializes an accessibility literal.
fn modal_s5_tree() {
    let (fv_tree, mut signature) = search(&[], "□p→p", true);
    assert!(fv_tree.is_closed());
    let mut tree = SenTree::from_fv_tree(&fv_tree, &mut signature).unwrap();
    tree.assign_surface_names(&mut signature);
    assert_well_formed(&tree);
    assert_fully_named(&tree);
    tree.modalize(&signature).unwrap();
    let formulas: Vec<String> = tree
        .node_list
        .iter()
        .map(|&id| tree.nodes[id].formula.to_string())
        .collect();
    assert_eq!(formulas[0], "¬(□p→p)");
    for formula in &formulas {
        assert!(!formula.contains('R'), "accessibility surfaced under S5");
    }
}
