//! The bounded free-variable tableau search.
//!
//! The prover works on the negation normal forms of the (translated) initial
//! formulae. Branches close on complementary literal pairs, either
//! syntactically or through unification, in which case the most general
//! unifier is applied to the whole tree. Gamma applications are bounded per
//! node, so the search always terminates; proof-search optimization is out
//! of scope.

use crate::normalization::normalize;
use crate::preprocessing::formula::{Formula, Term};
use crate::preprocessing::operator_enums::*;
use crate::preprocessing::signature::{Signature, ACCESSIBILITY};
use crate::proving::unification::{
    apply_substitution, apply_substitution_term, unify_atoms, Substitution,
};
use crate::proving::{FvBranch, FvNode, FvTree, Rule};

use std::collections::{HashMap, HashSet};

/// Bounds keeping the search finite.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    /// Maximal number of instances of a single universal node per branch.
    pub gamma_instances: usize,
    /// Maximal number of rule applications overall.
    pub max_steps: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            gamma_instances: 3,
            max_steps: 400,
        }
    }
}

/// Per-branch bookkeeping during the search.
#[derive(Clone, Debug)]
struct BranchState {
    nodes: Vec<usize>,
    closed: bool,
    /// Alpha/beta/delta nodes already expanded on this branch.
    expanded: HashSet<usize>,
    /// Number of instances produced per universal node on this branch.
    gamma_counts: HashMap<usize, usize>,
    /// (universal node, accessibility node) pairs already consumed.
    modal_pairs: HashSet<(usize, usize)>,
}

/// Search for a closed free-variable tableau refuting the conjunction of the
/// initial formulae. `init_formulas` are the formulae as entered (with the
/// conclusion already negated); `init_nonmodal` their standard translations
/// (identical for non-modal input).
pub fn prove(
    init_formulas: &[Formula],
    init_nonmodal: &[Formula],
    signature: &mut Signature,
    s5: bool,
    limits: &SearchLimits,
) -> FvTree {
    let mut searcher = Searcher {
        signature,
        s5,
        limits: *limits,
        nodes: Vec::new(),
        branches: Vec::new(),
        steps: 0,
    };
    searcher.run(init_nonmodal);

    let mut closed_branches = Vec::new();
    let mut open_branches = Vec::new();
    for branch in searcher.branches {
        let fv_branch = FvBranch {
            nodes: branch.nodes,
        };
        if branch.closed {
            closed_branches.push(fv_branch);
        } else {
            open_branches.push(fv_branch);
        }
    }
    FvTree {
        nodes: searcher.nodes,
        init_formulas: init_formulas.to_vec(),
        init_formulas_nonmodal: init_nonmodal.to_vec(),
        init_formulas_normalized: init_nonmodal.iter().map(normalize).collect(),
        closed_branches,
        open_branches,
        s5,
        num_steps: searcher.steps,
    }
}

struct Searcher<'a> {
    signature: &'a mut Signature,
    s5: bool,
    limits: SearchLimits,
    nodes: Vec<FvNode>,
    branches: Vec<BranchState>,
    steps: usize,
}

impl Searcher<'_> {
    fn run(&mut self, init_nonmodal: &[Formula]) {
        let mut init_indices = Vec::new();
        for formula in init_nonmodal {
            let step = self.fresh_step();
            let idx = self.add_node(FvNode {
                formula: normalize(formula),
                from_nodes: Vec::new(),
                from_rule: Rule::Initial,
                instance_term: None,
                expansion_step: step,
                used: true,
            });
            init_indices.push(idx);
        }
        self.branches.push(BranchState {
            nodes: init_indices,
            closed: false,
            expanded: HashSet::new(),
            gamma_counts: HashMap::new(),
            modal_pairs: HashSet::new(),
        });

        // close branches that are contradictory from the start
        for idx in self.branches[0].nodes.clone() {
            if !self.branches[0].closed {
                self.try_close(0, idx);
            }
        }

        while self.steps < self.limits.max_steps {
            let Some((branch_idx, node_idx)) = self.pick_expansion() else {
                break;
            };
            self.expand(branch_idx, node_idx);
        }
    }

    fn fresh_step(&mut self) -> usize {
        self.steps += 1;
        self.steps
    }

    fn add_node(&mut self, node: FvNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Pick the next rule application: the first open branch with anything
    /// applicable, preferring alpha, then delta, then beta, then the
    /// universal rules.
    fn pick_expansion(&self) -> Option<(usize, usize)> {
        for (branch_idx, branch) in self.branches.iter().enumerate() {
            if branch.closed {
                continue;
            }
            for &idx in &branch.nodes {
                if self.nodes[idx].formula.expansion_class() == ExpansionClass::Alpha
                    && !branch.expanded.contains(&idx)
                {
                    return Some((branch_idx, idx));
                }
            }
            for &idx in &branch.nodes {
                if self.nodes[idx].formula.expansion_class() == ExpansionClass::Delta
                    && !branch.expanded.contains(&idx)
                {
                    return Some((branch_idx, idx));
                }
            }
            for &idx in &branch.nodes {
                if self.nodes[idx].formula.expansion_class() == ExpansionClass::Beta
                    && !branch.expanded.contains(&idx)
                {
                    return Some((branch_idx, idx));
                }
            }
            // universal nodes, preferring the least-instantiated one
            let mut best: Option<(usize, usize)> = None;
            for &idx in &branch.nodes {
                if self.nodes[idx].formula.expansion_class() != ExpansionClass::Gamma {
                    continue;
                }
                let count = branch.gamma_counts.get(&idx).copied().unwrap_or(0);
                if self.world_gamma_parts(idx).is_some() && !self.s5 {
                    if self.find_modal_instance(branch, idx).is_some()
                        && best.map(|(_, c)| count < c).unwrap_or(true)
                    {
                        best = Some((idx, count));
                    }
                } else if count < self.limits.gamma_instances
                    && best.map(|(_, c)| count < c).unwrap_or(true)
                {
                    best = Some((idx, count));
                }
            }
            if let Some((idx, _)) = best {
                return Some((branch_idx, idx));
            }
        }
        None
    }

    /// If `idx` is a translated box claim `∀v(¬Rxv∨A)`, return its bound
    /// world variable, source world, and body.
    fn world_gamma_parts(&self, idx: usize) -> Option<(Term, Term, Formula)> {
        if let Formula::Quantified(Quantifier::Forall, variable, matrix) = &self.nodes[idx].formula
        {
            if !self.signature.is_world_symbol(variable.name()) {
                return None;
            }
            if let Formula::Binary(BinaryOp::Or, guard, body) = matrix.as_ref() {
                if let Formula::Negation(atom) = guard.as_ref() {
                    if let Formula::Atomic(predicate, terms) = atom.as_ref() {
                        if predicate == ACCESSIBILITY && terms.len() == 2 && &terms[1] == variable {
                            return Some((variable.clone(), terms[0].clone(), (**body).clone()));
                        }
                    }
                }
            }
        }
        None
    }

    /// Find an accessibility fact `Rxu` on the branch that the box claim
    /// `idx` has not consumed yet.
    fn find_modal_instance(&self, branch: &BranchState, idx: usize) -> Option<usize> {
        let (_, source, _) = self.world_gamma_parts(idx)?;
        branch.nodes.iter().copied().find(|&j| {
            if branch.modal_pairs.contains(&(idx, j)) {
                return false;
            }
            match &self.nodes[j].formula {
                Formula::Atomic(predicate, terms) => {
                    predicate == ACCESSIBILITY && terms.len() == 2 && terms[0] == source
                }
                _ => false,
            }
        })
    }

    fn expand(&mut self, branch_idx: usize, node_idx: usize) {
        match self.nodes[node_idx].formula.expansion_class() {
            ExpansionClass::Alpha => self.expand_alpha(branch_idx, node_idx),
            ExpansionClass::Beta => self.expand_beta(branch_idx, node_idx),
            ExpansionClass::Delta => self.expand_delta(branch_idx, node_idx),
            ExpansionClass::Gamma => self.expand_gamma(branch_idx, node_idx),
            _ => {}
        }
    }

    fn expand_alpha(&mut self, branch_idx: usize, node_idx: usize) {
        let formula = self.nodes[node_idx].formula.clone();
        let step = self.fresh_step();
        self.branches[branch_idx].expanded.insert(node_idx);
        for i in [1, 2] {
            // in NNF the only alpha shape is a conjunction
            let Some(component) = formula.alpha(i) else {
                return;
            };
            let idx = self.add_node(FvNode {
                formula: component,
                from_nodes: vec![node_idx],
                from_rule: Rule::Alpha,
                instance_term: None,
                expansion_step: step,
                used: false,
            });
            self.branches[branch_idx].nodes.push(idx);
            if !self.branches[branch_idx].closed {
                self.try_close(branch_idx, idx);
            }
        }
    }

    fn expand_beta(&mut self, branch_idx: usize, node_idx: usize) {
        let formula = self.nodes[node_idx].formula.clone();
        let (Some(left), Some(right)) = (formula.beta(1), formula.beta(2)) else {
            return;
        };
        let step = self.fresh_step();
        self.branches[branch_idx].expanded.insert(node_idx);
        let mut right_branch = self.branches[branch_idx].clone();

        let left_idx = self.add_node(FvNode {
            formula: left,
            from_nodes: vec![node_idx],
            from_rule: Rule::Beta,
            instance_term: None,
            expansion_step: step,
            used: false,
        });
        self.branches[branch_idx].nodes.push(left_idx);

        let right_idx = self.add_node(FvNode {
            formula: right,
            from_nodes: vec![node_idx],
            from_rule: Rule::Beta,
            instance_term: None,
            expansion_step: step,
            used: false,
        });
        right_branch.nodes.push(right_idx);
        self.branches.insert(branch_idx + 1, right_branch);

        if !self.branches[branch_idx].closed {
            self.try_close(branch_idx, left_idx);
        }
        if !self.branches[branch_idx + 1].closed {
            self.try_close(branch_idx + 1, right_idx);
        }
    }

    fn expand_delta(&mut self, branch_idx: usize, node_idx: usize) {
        let Formula::Quantified(Quantifier::Exists, variable, matrix) =
            self.nodes[node_idx].formula.clone()
        else {
            return;
        };
        let world = self.signature.is_world_symbol(variable.name());
        let free_variables = matrix.free_prover_variables();
        let name = self
            .signature
            .get_new_skolem_symbol(world, free_variables.len());
        let witness = if free_variables.is_empty() {
            Term::Symbol(name)
        } else {
            Term::Function(name, free_variables)
        };

        // under S5 the accessibility conjunct of a possibility claim is
        // never materialized
        let result = if world && self.s5 {
            match matrix.as_ref() {
                Formula::Binary(BinaryOp::And, guard, body)
                    if is_accessibility_guard(guard, &variable) =>
                {
                    body.substitute(&variable, &witness, false)
                }
                _ => matrix.substitute(&variable, &witness, false),
            }
        } else {
            matrix.substitute(&variable, &witness, false)
        };

        let step = self.fresh_step();
        self.branches[branch_idx].expanded.insert(node_idx);
        let idx = self.add_node(FvNode {
            formula: result,
            from_nodes: vec![node_idx],
            from_rule: if world { Rule::ModalDelta } else { Rule::Delta },
            instance_term: Some(witness),
            expansion_step: step,
            used: false,
        });
        self.branches[branch_idx].nodes.push(idx);
        if !self.branches[branch_idx].closed {
            self.try_close(branch_idx, idx);
        }
    }

    fn expand_gamma(&mut self, branch_idx: usize, node_idx: usize) {
        let count = self.branches[branch_idx]
            .gamma_counts
            .get(&node_idx)
            .copied()
            .unwrap_or(0);

        if let Some((variable, _, body)) = self.world_gamma_parts(node_idx) {
            if self.s5 {
                // with universal accessibility the box claim instantiates
                // freely
                let fresh = Term::Symbol(self.signature.get_new_free_variable(true));
                let result = body.substitute(&variable, &fresh, false);
                self.push_gamma_result(
                    branch_idx,
                    node_idx,
                    None,
                    result,
                    fresh,
                    Rule::ModalGamma,
                );
                self.branches[branch_idx]
                    .gamma_counts
                    .insert(node_idx, count + 1);
                return;
            }
            let Some(access_idx) = self.find_modal_instance(&self.branches[branch_idx], node_idx)
            else {
                return;
            };
            let Formula::Atomic(_, terms) = &self.nodes[access_idx].formula else {
                return;
            };
            let target = terms[1].clone();
            let result = body.substitute(&variable, &target, false);
            self.branches[branch_idx]
                .modal_pairs
                .insert((node_idx, access_idx));
            self.push_gamma_result(
                branch_idx,
                node_idx,
                Some(access_idx),
                result,
                target,
                Rule::ModalGamma,
            );
            return;
        }

        let Formula::Quantified(Quantifier::Forall, variable, matrix) =
            self.nodes[node_idx].formula.clone()
        else {
            return;
        };
        let world = self.signature.is_world_symbol(variable.name());
        let fresh = Term::Symbol(self.signature.get_new_free_variable(world));
        let result = matrix.substitute(&variable, &fresh, false);
        self.branches[branch_idx]
            .gamma_counts
            .insert(node_idx, count + 1);
        self.push_gamma_result(branch_idx, node_idx, None, result, fresh, Rule::Gamma);
    }

    fn push_gamma_result(
        &mut self,
        branch_idx: usize,
        node_idx: usize,
        access_idx: Option<usize>,
        result: Formula,
        instance: Term,
        rule: Rule,
    ) {
        let step = self.fresh_step();
        let mut from_nodes = vec![node_idx];
        if let Some(access) = access_idx {
            from_nodes.push(access);
        }
        let idx = self.add_node(FvNode {
            formula: result,
            from_nodes,
            from_rule: rule,
            instance_term: Some(instance),
            expansion_step: step,
            used: false,
        });
        self.branches[branch_idx].nodes.push(idx);
        if !self.branches[branch_idx].closed {
            self.try_close(branch_idx, idx);
        }
    }

    /// Close the branch if the new literal has a complement on it, first
    /// syntactically, then through unification (whose most general unifier
    /// is applied to the whole tree).
    fn try_close(&mut self, branch_idx: usize, new_idx: usize) -> bool {
        let Some((polarity, atom)) = self.nodes[new_idx].formula.as_literal() else {
            return false;
        };
        let atom = atom.clone();
        let candidates: Vec<usize> = self.branches[branch_idx]
            .nodes
            .iter()
            .copied()
            .filter(|&j| j != new_idx)
            .filter(|&j| {
                matches!(self.nodes[j].formula.as_literal(), Some((p, _)) if p != polarity)
            })
            .collect();

        for &j in &candidates {
            let (_, other) = self.nodes[j].formula.as_literal().unwrap();
            if *other == atom {
                self.close(branch_idx, new_idx, j);
                return true;
            }
        }
        for &j in &candidates {
            let (_, other) = self.nodes[j].formula.as_literal().unwrap();
            if let Some(substitution) = unify_atoms(&atom, other) {
                if !substitution.is_empty() {
                    self.apply_substitution_globally(&substitution);
                }
                self.close(branch_idx, new_idx, j);
                return true;
            }
        }
        false
    }

    fn close(&mut self, branch_idx: usize, a: usize, b: usize) {
        self.branches[branch_idx].closed = true;
        self.mark_used(a);
        self.mark_used(b);
    }

    fn mark_used(&mut self, idx: usize) {
        if self.nodes[idx].used {
            return;
        }
        self.nodes[idx].used = true;
        for origin in self.nodes[idx].from_nodes.clone() {
            self.mark_used(origin);
        }
    }

    // TODO: closing by unification commits the whole tree to the chosen
    // substitution; restoring the pre-substitution state when the commitment
    // later blocks another branch would make the search complete for
    // formulas that need a different unifier per branch.
    fn apply_substitution_globally(&mut self, substitution: &Substitution) {
        for node in &mut self.nodes {
            node.formula = apply_substitution(&node.formula, substitution);
            if let Some(term) = &node.instance_term {
                node.instance_term = Some(apply_substitution_term(term, substitution));
            }
        }
    }
}

fn is_accessibility_guard(guard: &Formula, variable: &Term) -> bool {
    matches!(guard, Formula::Atomic(predicate, terms)
        if predicate == ACCESSIBILITY && terms.len() == 2 && &terms[1] == variable)
}
