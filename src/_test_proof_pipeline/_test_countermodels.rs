//! End-to-end tests of countermodel extraction from open branches.

use crate::_test_proof_pipeline::_test_util::search;
use crate::postprocessing::countermodel::get_counter_model;
use crate::postprocessing::sen_tree::SenTree;

fn counter_model(premises: &[&str], conclusion: &str, s5: bool) -> Option<crate::model::Model> {
    let (fv_tree, mut signature) = search(premises, conclusion, s5);
    assert!(!fv_tree.is_closed(), "{conclusion} unexpectedly proved");
    let mut tree = SenTree::from_fv_tree(&fv_tree, &mut signature).unwrap();
    tree.assign_surface_names(&mut signature);
    let model = get_counter_model(&tree, &signature)?;
    let mut check = model.clone();
    assert!(check.satisfies_init_formulas(&fv_tree.init_formulas_nonmodal, &signature));
    Some(model)
}

#[test]
/// An invalid propositional inference yields a model making the premises
/// true and the conclusion false.
fn propositional_counter_model() {
    let model = counter_model(&[], "p→q", false).unwrap();
    // p holds, q does not; the empty domain was promoted to a singleton
    assert!(model.extensions["p"].contains(&Vec::new()));
    assert!(!model.extensions.contains_key("q") || !model.extensions["q"].contains(&Vec::new()));
    assert_eq!(model.domain.len(), 1);
}

#[test]
/// The open branch's ground terms become the domain, positive atoms the
/// extensions.
fn first_order_counter_model() {
    let model = counter_model(&["Fa"], "∀xFx", false).unwrap();
    assert_eq!(model.denotations["a"], 0);
    assert!(model.extensions["F"].contains(&vec![0]));
    assert!(model.domain.len() >= 2, "the witness against ∀xFx is new");
}

#[test]
/// The T axiom fails in K: the countermodel has a world where p fails and no
/// accessibility edge forcing it.
fn modal_counter_model() {
    let model = counter_model(&[], "□p→p", false).unwrap();
    assert_eq!(model.worlds.first(), Some(&0), "world 0 is the base world");
    assert!(!model.extensions.contains_key("p") || !model.extensions["p"].contains(&vec![0]));
}

#[test]
/// The converse Barcan-style claim p→□p fails even under S5.
fn s5_counter_model() {
    let model = counter_model(&[], "p→□p", true).unwrap();
    assert!(model.worlds.len() >= 2);
    assert!(model.extensions["p"].contains(&vec![0]));
}
