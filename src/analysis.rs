//! High-level wrappers joining parsing, translation, proof search, and
//! presentation of the result.

use crate::modal_translation::translate_from_modal;
use crate::model::Model;
use crate::postprocessing::countermodel::get_counter_model;
use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::Formula;
use crate::preprocessing::parser::parse_formula;
use crate::preprocessing::signature::Signature;
use crate::proving::search::{prove, SearchLimits};
use crate::result_print::{
    print_counter_model, print_if_allowed, print_sen_tree, PrintOptions,
};

/// The outcome of a proof attempt.
pub enum ProofOutcome {
    /// A closed tableau was found; the sentence tableau shows the proof.
    Proved(Box<SenTree>),
    /// The search saturated with an open branch and a countermodel was read
    /// off it.
    Refuted(Box<Model>),
    /// Neither: the bounded search gave out, or the open branch yielded no
    /// countermodel.
    Undecided,
}

/// Prove `conclusion` from `premises` (both in concrete syntax) and render
/// the result according to `print_options`. Returns the outcome together
/// with the signature accumulated along the way.
pub fn analyse_inference(
    premises: &[String],
    conclusion: &str,
    s5: bool,
    limits: &SearchLimits,
    print_options: PrintOptions,
) -> Result<(ProofOutcome, Signature), String> {
    let mut signature = Signature::new();
    let mut init_formulas: Vec<Formula> = Vec::new();
    for premise in premises {
        init_formulas.push(parse_formula(premise, &mut signature)?);
    }
    let parsed_conclusion = parse_formula(conclusion, &mut signature)?;
    init_formulas.push(parsed_conclusion.negate());

    let init_nonmodal: Vec<Formula> = if signature.is_modal {
        let mut translated = Vec::new();
        for formula in &init_formulas {
            translated.push(translate_from_modal(formula, &mut signature)?);
        }
        translated
    } else {
        init_formulas.clone()
    };

    let fv_tree = prove(&init_formulas, &init_nonmodal, &mut signature, s5, limits);
    print_if_allowed(
        format!(
            "Search finished after {} steps: {} closed and {} open branches.",
            fv_tree.num_steps,
            fv_tree.closed_branches.len(),
            fv_tree.open_branches.len()
        ),
        print_options,
    );

    if fv_tree.is_closed() {
        let mut tree = SenTree::from_fv_tree(&fv_tree, &mut signature)?;
        tree.assign_surface_names(&mut signature);
        if signature.is_modal {
            tree.modalize(&signature)?;
        }
        print_sen_tree(&tree, &signature, print_options);
        return Ok((ProofOutcome::Proved(Box::new(tree)), signature));
    }

    let mut tree = SenTree::from_fv_tree(&fv_tree, &mut signature)?;
    tree.assign_surface_names(&mut signature);
    match get_counter_model(&tree, &signature) {
        Some(mut model) => {
            if !model.satisfies_init_formulas(&fv_tree.init_formulas_nonmodal, &signature) {
                print_if_allowed(
                    "The open branch yielded no verifiable countermodel.".to_string(),
                    print_options,
                );
                return Ok((ProofOutcome::Undecided, signature));
            }
            print_counter_model(&model, print_options);
            Ok((ProofOutcome::Refuted(Box::new(model)), signature))
        }
        None => {
            print_if_allowed(
                "The open branch yielded no verifiable countermodel.".to_string(),
                print_options,
            );
            Ok((ProofOutcome::Undecided, signature))
        }
    }
}
