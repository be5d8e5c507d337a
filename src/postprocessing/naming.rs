//! The naming pass: replaces the prover's free variables and Skolem terms
//! with fresh surface constants, in a deterministic order that follows the
//! finished tree.

use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::signature::Signature;
use crate::proving::unification::{apply_substitution_term, Substitution};

impl SenTree {
    /// Walk the flat node list in order and replace every free variable
    /// (ξ.., ζ..) and every whole Skolem term (rooted at φ or ω) by a fresh
    /// surface constant: individuals from `a..o` (then `a2..`), worlds from
    /// `v,u,t,..` (skipping the reserved base world `w`).
    ///
    /// The translation map persists across the whole pass, so the same term
    /// becomes the same constant everywhere; the constants assigned are
    /// fully determined by the final tree shape. Letters the signature
    /// already uses for anything else are skipped, and every claimed letter
    /// is registered.
    pub fn assign_surface_names(&mut self, signature: &mut Signature) {
        let mut mapping: Vec<(Term, Term)> = Vec::new();
        for id in self.node_list.clone() {
            let formula = self.nodes[id].formula.clone();
            let mut occurrences = Vec::new();
            collect_renameable(&formula, &mut occurrences);
            for term in occurrences {
                if mapping.iter().any(|(key, _)| key == &term) {
                    continue;
                }
                let world = term.name().starts_with('ζ') || term.name().starts_with('ω');
                let fresh = if world {
                    signature.get_new_world_name(false)
                } else {
                    signature.get_new_constant()
                };
                mapping.push((term, Term::Symbol(fresh)));
            }

            // apply larger terms first, so the arguments of a Skolem term
            // are still recognizable when the whole term is replaced
            let mut ordered: Vec<&(Term, Term)> = mapping.iter().collect();
            ordered.sort_by(|(a, _), (b, _)| b.size().cmp(&a.size()));
            let mut renamed = formula;
            for (key, replacement) in ordered {
                renamed = renamed.substitute(key, replacement, false);
            }
            self.nodes[id].formula = renamed;

            if let Some(instance) = self.nodes[id].instance_term.clone() {
                let substitution: Substitution = mapping
                    .iter()
                    .filter_map(|(key, replacement)| match key {
                        Term::Symbol(name) => Some((name.clone(), replacement.clone())),
                        Term::Function(..) => None,
                    })
                    .collect();
                let direct = mapping
                    .iter()
                    .find(|(key, _)| key == &instance)
                    .map(|(_, replacement)| replacement.clone());
                self.nodes[id].instance_term = Some(match direct {
                    Some(replacement) => replacement,
                    None => apply_substitution_term(&instance, &substitution),
                });
            }
        }
    }
}

/// Collect the renameable terms of a formula in left-to-right order: free
/// prover variables as themselves, Skolem applications as whole terms
/// (their arguments disappear with the replacement).
fn collect_renameable(formula: &Formula, out: &mut Vec<Term>) {
    formula.walk_terms(&mut |term| collect_renameable_term(term, out));
}

fn collect_renameable_term(term: &Term, out: &mut Vec<Term>) {
    match term {
        Term::Symbol(_) => {
            if term.is_free_variable() || term.is_skolem() {
                out.push(term.clone());
            }
        }
        Term::Function(_, args) => {
            if term.is_skolem() {
                out.push(term.clone());
            } else {
                for arg in args {
                    collect_renameable_term(arg, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocessing::formula::{Formula, Term};
    use crate::postprocessing::naming::collect_renameable;

    fn symbol(s: &str) -> Term {
        Term::Symbol(s.to_string())
    }

    #[test]
    /// Skolem applications are collected as whole terms, their arguments are
    /// not collected separately.
    fn renameable_collection() {
        let skolem = Term::Function("φ1".to_string(), vec![symbol("ξ1")]);
        let formula = Formula::mk_atom("P", vec![symbol("ξ1"), skolem.clone(), symbol("a")]);
        let mut out = Vec::new();
        collect_renameable(&formula, &mut out);
        assert_eq!(out, vec![symbol("ξ1"), skolem]);
    }
}
