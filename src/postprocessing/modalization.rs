//! Re-expressing the finished first-order tableau in modal notation.

use crate::modal_translation::{is_accessibility_atom, translate_to_modal};
use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::Formula;
use crate::preprocessing::operator_enums::BinaryOp;
use crate::preprocessing::signature::Signature;
use crate::proving::Rule;

impl SenTree {
    /// Rewrite every node's formula back into modal notation and attach its
    /// world label for presentation.
    ///
    /// The intermediate conjunctions a possibility claim expands into
    /// (`Rwu∧Au`) are hidden: their own expansions point back at the modal
    /// premise, and the conjunction node is removed. The accessibility
    /// literals themselves stay visible.
    pub fn modalize(&mut self, signature: &Signature) -> Result<(), String> {
        for id in self.node_list.clone() {
            if self.nodes[id].is_removed || self.nodes[id].from_rule != Rule::ModalDelta {
                continue;
            }
            // a possibility instantiation is either `Rwu∧Au` (from ◇) or
            // `¬(Rwu→Au)` (from ¬□)
            let hidden = match &self.nodes[id].formula {
                Formula::Binary(BinaryOp::And, guard, _) => is_accessibility_atom(guard),
                Formula::Negation(sub) => matches!(sub.as_ref(),
                    Formula::Binary(BinaryOp::Imp, guard, _) if is_accessibility_atom(guard)),
                _ => false,
            };
            if !hidden {
                continue;
            }
            let premise = self.nodes[id].from_nodes.clone();
            if let Some(&premise) = premise.first() {
                for other in 0..self.nodes.len() {
                    if other == id {
                        continue;
                    }
                    for slot in &mut self.nodes[other].from_nodes {
                        if *slot == id {
                            *slot = premise;
                        }
                    }
                }
            }
            self.remove(id);
        }

        for id in self.node_list.clone() {
            let (formula, world) = translate_to_modal(&self.nodes[id].formula, signature)?;
            self.nodes[id].formula = formula;
            self.nodes[id].world = world;
        }
        Ok(())
    }
}
