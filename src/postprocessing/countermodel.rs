//! Reading a canonical countermodel off an open branch of the finished
//! sentence tableau.

use crate::model::Model;
use crate::postprocessing::sen_node::NodeId;
use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::signature::Signature;

/// Build a model from the first open-branch leaf: walking up to the root,
/// every ground term met is assigned a fresh domain element (world constants
/// populate the worlds set, with world 0 reserved for the base world `w`),
/// and every positively occurring atom lands in its predicate's extension.
/// Negated atoms are ignored; an open canonical branch provides only
/// positive facts.
///
/// The collected formulas are then replayed through
/// [Model::extend_to_satisfy]; if any extension fails, there is no
/// countermodel to report and the result is `None`.
pub fn get_counter_model(tree: &SenTree, signature: &Signature) -> Option<Model> {
    let leaf = tree
        .node_list
        .iter()
        .copied()
        .find(|&id| tree.nodes[id].children.is_empty() && !tree.nodes[id].closed_end)?;

    let mut branch: Vec<NodeId> = Vec::new();
    let mut current = Some(leaf);
    while let Some(id) = current {
        branch.push(id);
        current = tree.nodes[id].parent;
    }

    let mut model = Model::new();
    if signature.is_modal {
        model.reserve_base_world();
    }
    for &id in &branch {
        let formula = &tree.nodes[id].formula;
        register_ground_terms(formula, &mut model, signature);
        if let Some((true, Formula::Atomic(predicate, terms))) = formula.as_literal() {
            let tuple: Vec<usize> = terms
                .iter()
                .map(|t| model.denote_term(t, signature))
                .collect();
            model
                .extensions
                .entry(predicate.clone())
                .or_default()
                .insert(tuple);
        }
    }
    if model.domain.is_empty() {
        // an empty domain is promoted to a single anonymous individual
        let anonymous = Term::Symbol("#0".to_string());
        model.denote_term(&anonymous, signature);
    }

    for &id in &branch {
        let formula = tree.nodes[id].formula.clone();
        if !model.extend_to_satisfy(&formula, signature) {
            return None;
        }
    }
    Some(model)
}

/// Assign denotations to the ground terms of a formula, in the order the
/// formula mentions them. Terms containing an unresolved variable are left
/// to the quantifier machinery.
fn register_ground_terms(formula: &Formula, model: &mut Model, signature: &Signature) {
    let mut ground = Vec::new();
    formula.walk_terms(&mut |term| {
        if is_ground(term, signature) {
            ground.push(term.clone());
        }
    });
    for term in ground {
        model.denote_term(&term, signature);
    }
}

fn is_ground(term: &Term, signature: &Signature) -> bool {
    match term {
        Term::Symbol(name) => {
            !matches!(
                signature.kind_of(name),
                Some(crate::preprocessing::operator_enums::ExpressionKind::Variable)
                    | Some(crate::preprocessing::operator_enums::ExpressionKind::WorldVariable)
            )
        }
        Term::Function(_, args) => args.iter().all(|arg| is_ground(arg, signature)),
    }
}
