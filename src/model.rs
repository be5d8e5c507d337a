//! A finite first-order model that grows on demand: the countermodel reader
//! collects the facts of an open branch and asks the model to extend itself
//! until it satisfies them.

use crate::normalization::normalize;
use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::operator_enums::*;
use crate::preprocessing::signature::{Signature, ACTUAL_WORLD};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// A model over a domain of small integers. Ground terms denote elements
/// through `denotations`; predicates are interpreted by their extensions
/// (with an anti-extension recording what must stay false); function symbols
/// are interpreted pointwise.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub domain: Vec<usize>,
    pub worlds: Vec<usize>,
    /// Ground term string → denoted element.
    pub denotations: HashMap<String, usize>,
    pub extensions: BTreeMap<String, BTreeSet<Vec<usize>>>,
    anti_extensions: BTreeMap<String, BTreeSet<Vec<usize>>>,
    pub functions: BTreeMap<String, BTreeMap<Vec<usize>, usize>>,
    /// A representative term per element, used to instantiate quantifiers.
    representatives: HashMap<usize, Term>,
    next_element: usize,
    next_witness: usize,
}

impl Model {
    pub fn new() -> Model {
        Model::default()
    }

    /// Reserve element 0 of the worlds set for the base world `w`.
    pub fn reserve_base_world(&mut self) {
        if self.denotations.contains_key(ACTUAL_WORLD) {
            return;
        }
        let element = self.fresh_element(true, Term::Symbol(ACTUAL_WORLD.to_string()));
        self.denotations.insert(ACTUAL_WORLD.to_string(), element);
    }

    fn fresh_element(&mut self, world: bool, representative: Term) -> usize {
        let element = self.next_element;
        self.next_element += 1;
        if world {
            self.worlds.push(element);
        } else {
            self.domain.push(element);
        }
        self.representatives.insert(element, representative);
        element
    }

    /// The element a ground term denotes, assigned incrementally the first
    /// time the term string is seen. A composite term also fixes the
    /// interpretation of its function symbol at its arguments.
    pub fn denote_term(&mut self, term: &Term, signature: &Signature) -> usize {
        let key = term.to_string();
        if let Some(&element) = self.denotations.get(&key) {
            return element;
        }
        let element = match term {
            Term::Symbol(name) => {
                let world = signature.is_world_symbol(name);
                self.fresh_element(world, term.clone())
            }
            Term::Function(functor, args) => {
                let arg_elements: Vec<usize> = args
                    .iter()
                    .map(|arg| self.denote_term(arg, signature))
                    .collect();
                let world = signature.is_world_symbol(functor);
                let element = self.fresh_element(world, term.clone());
                self.functions
                    .entry(functor.clone())
                    .or_default()
                    .insert(arg_elements, element);
                element
            }
        };
        self.denotations.insert(key, element);
        element
    }

    /// Extend the model so that it satisfies `formula`, or report failure
    /// without a definite verdict on satisfiability. Positive facts are
    /// added to extensions, negative facts to anti-extensions; disjunctions
    /// try their cases against a snapshot; quantifiers range over the
    /// current finite domain (an existential may mint one fresh witness).
    pub fn extend_to_satisfy(&mut self, formula: &Formula, signature: &Signature) -> bool {
        let nnf = normalize(formula);
        self.extend_nnf(&nnf, signature)
    }

    fn extend_nnf(&mut self, formula: &Formula, signature: &Signature) -> bool {
        match formula {
            Formula::Atomic(predicate, terms) => {
                let tuple: Vec<usize> = terms
                    .iter()
                    .map(|t| self.denote_term(t, signature))
                    .collect();
                if self
                    .anti_extensions
                    .get(predicate)
                    .map(|set| set.contains(&tuple))
                    .unwrap_or(false)
                {
                    return false;
                }
                self.extensions
                    .entry(predicate.clone())
                    .or_default()
                    .insert(tuple);
                true
            }
            Formula::Negation(sub) => match sub.as_ref() {
                Formula::Atomic(predicate, terms) => {
                    let tuple: Vec<usize> = terms
                        .iter()
                        .map(|t| self.denote_term(t, signature))
                        .collect();
                    if self
                        .extensions
                        .get(predicate)
                        .map(|set| set.contains(&tuple))
                        .unwrap_or(false)
                    {
                        return false;
                    }
                    self.anti_extensions
                        .entry(predicate.clone())
                        .or_default()
                        .insert(tuple);
                    true
                }
                // the formula is in NNF
                _ => false,
            },
            Formula::Binary(BinaryOp::And, sub1, sub2) => {
                self.extend_nnf(sub1, signature) && self.extend_nnf(sub2, signature)
            }
            Formula::Binary(BinaryOp::Or, sub1, sub2) => {
                let snapshot = self.clone();
                if self.extend_nnf(sub1, signature) {
                    return true;
                }
                *self = snapshot;
                self.extend_nnf(sub2, signature)
            }
            Formula::Quantified(Quantifier::Forall, variable, matrix) => {
                let world = signature.is_world_symbol(variable.name());
                let elements = if world {
                    self.worlds.clone()
                } else {
                    self.domain.clone()
                };
                for element in elements {
                    let representative = self.representatives[&element].clone();
                    let instance = matrix.substitute(variable, &representative, false);
                    if !self.extend_nnf(&instance, signature) {
                        return false;
                    }
                }
                true
            }
            Formula::Quantified(Quantifier::Exists, variable, matrix) => {
                let world = signature.is_world_symbol(variable.name());
                let elements = if world {
                    self.worlds.clone()
                } else {
                    self.domain.clone()
                };
                for element in elements {
                    let snapshot = self.clone();
                    let representative = self.representatives[&element].clone();
                    let instance = matrix.substitute(variable, &representative, false);
                    if self.extend_nnf(&instance, signature) {
                        return true;
                    }
                    *self = snapshot;
                }
                // mint one fresh witness
                self.next_witness += 1;
                let witness = Term::Symbol(format!("#{}", self.next_witness));
                let element = self.fresh_element(world, witness.clone());
                self.denotations.insert(witness.to_string(), element);
                let instance = matrix.substitute(variable, &witness, false);
                self.extend_nnf(&instance, signature)
            }
            _ => false,
        }
    }

    /// Check that the model satisfies all (translated) initial formulas.
    pub fn satisfies_init_formulas(
        &mut self,
        init_nonmodal: &[Formula],
        signature: &Signature,
    ) -> bool {
        init_nonmodal
            .iter()
            .all(|formula| self.extend_to_satisfy(formula, signature))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let domain: Vec<String> = self.domain.iter().map(|e| e.to_string()).collect();
        writeln!(f, "Domain: {{{}}}", domain.join(", "))?;
        if !self.worlds.is_empty() {
            let worlds: Vec<String> = self.worlds.iter().map(|e| e.to_string()).collect();
            writeln!(f, "Worlds: {{{}}}", worlds.join(", "))?;
        }
        let mut names: Vec<(&String, &usize)> = self.denotations.iter().collect();
        names.sort();
        for (name, element) in names {
            writeln!(f, "{name}: {element}")?;
        }
        for (predicate, extension) in &self.extensions {
            let tuples: Vec<String> = extension
                .iter()
                .map(|tuple| {
                    let parts: Vec<String> = tuple.iter().map(|e| e.to_string()).collect();
                    format!("({})", parts.join(","))
                })
                .collect();
            writeln!(f, "{predicate}: {{{}}}", tuples.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Model;
    use crate::preprocessing::parser::parse_formula;
    use crate::preprocessing::signature::Signature;

    #[test]
    /// Positive and negative facts extend the model until they clash.
    fn extension_and_conflict() {
        let mut sig = Signature::new();
        let fa = parse_formula("Fa", &mut sig).unwrap();
        let not_fa = fa.negate();
        let mut model = Model::new();
        assert!(model.extend_to_satisfy(&fa, &sig));
        assert!(!model.extend_to_satisfy(&not_fa, &sig));
        assert_eq!(model.domain.len(), 1);
        assert_eq!(model.denotations["a"], 0);
    }

    #[test]
    /// Disjunctions roll back the failed case before trying the other one.
    fn disjunction_backtracking() {
        let mut sig = Signature::new();
        let fa = parse_formula("Fa", &mut sig).unwrap();
        let choice = parse_formula("¬Fa ∨ Ga", &mut sig).unwrap();
        let mut model = Model::new();
        assert!(model.extend_to_satisfy(&fa, &sig));
        assert!(model.extend_to_satisfy(&choice, &sig));
        assert!(model.extensions["G"].contains(&vec![0]));
    }

    #[test]
    /// A universal claim ranges over the current domain; an existential may
    /// mint a fresh witness.
    fn quantifier_extension() {
        let mut sig = Signature::new();
        let fa = parse_formula("Fa ∧ Fb", &mut sig).unwrap();
        let all = parse_formula("∀xFx", &mut sig).unwrap();
        let some_g = parse_formula("∃xGx", &mut sig).unwrap();
        let mut model = Model::new();
        assert!(model.extend_to_satisfy(&fa, &sig));
        assert!(model.extend_to_satisfy(&all, &sig));
        assert!(model.extend_to_satisfy(&some_g, &sig));
        assert_eq!(model.domain.len(), 2);
    }

    #[test]
    /// Composite terms interpret their function symbol pointwise.
    fn function_interpretation() {
        let mut sig = Signature::new();
        let fact = parse_formula("Pf(a)", &mut sig).unwrap();
        let mut model = Model::new();
        assert!(model.extend_to_satisfy(&fact, &sig));
        assert_eq!(model.denotations["a"], 0);
        assert_eq!(model.denotations["f(a)"], 1);
        assert_eq!(model.functions["f"][&vec![0]], 1);
    }
}
