//! The symbol bookkeeping shared by parsing, translation, proving, and the
//! naming pass: arities, expression kinds, and fresh-symbol generation.

use crate::preprocessing::operator_enums::ExpressionKind;

use std::collections::HashMap;

/// The reserved accessibility predicate of the standard translation.
pub const ACCESSIBILITY: &str = "R";

/// The distinguished world constant naming the base world.
pub const ACTUAL_WORLD: &str = "w";

/// Registry of every symbol occurring in the formulae under consideration,
/// together with generators for fresh symbols of each family.
///
/// Surface constants are drawn from short letter sequences (individuals
/// `a..o`, worlds `v,u,t,..`); the prover's internal symbols use the Greek
/// prefixes ξ/ζ (free variables) and φ/ω (Skolem symbols) and are later
/// renamed by the naming pass.
#[derive(Clone, Debug)]
pub struct Signature {
    pub arities: HashMap<String, usize>,
    pub expression_types: HashMap<String, ExpressionKind>,
    /// Set once a modal operator has been seen.
    pub is_modal: bool,
    /// True while every parsed predicate is a sentence letter.
    pub is_propositional: bool,
    free_variable_count: usize,
    world_variable_count: usize,
    skolem_count: usize,
    world_skolem_count: usize,
}

const CONSTANT_LETTERS: [char; 15] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
];
const WORLD_LETTERS: [char; 7] = ['v', 'u', 't', 's', 'r', 'q', 'p'];
const FUNCTION_LETTERS: [char; 6] = ['f', 'g', 'h', 'i', 'j', 'k'];
const VARIABLE_LETTERS: [char; 6] = ['x', 'y', 'z', 't', 'u', 'v'];

impl Signature {
    pub fn new() -> Signature {
        Signature {
            arities: HashMap::new(),
            expression_types: HashMap::new(),
            is_modal: false,
            is_propositional: true,
            free_variable_count: 0,
            world_variable_count: 0,
            skolem_count: 0,
            world_skolem_count: 0,
        }
    }

    /// Record `symbol` with the given kind and arity. Re-registration with
    /// identical data is a no-op; conflicting data is an error.
    pub fn register_expression(
        &mut self,
        symbol: &str,
        kind: ExpressionKind,
        arity: usize,
    ) -> Result<(), String> {
        if let Some(old_kind) = self.expression_types.get(symbol) {
            if *old_kind != kind {
                return Err(format!(
                    "Symbol {symbol} is used both as {old_kind} and as {kind}."
                ));
            }
            let old_arity = self.arities[symbol];
            if old_arity != arity {
                return Err(format!(
                    "Symbol {symbol} is used with arity {old_arity} and with arity {arity}."
                ));
            }
            return Ok(());
        }
        self.expression_types.insert(symbol.to_string(), kind);
        self.arities.insert(symbol.to_string(), arity);
        Ok(())
    }

    /// Overwrite the recorded arity of an already registered symbol. Used by
    /// the modal translation when predicates acquire their world argument.
    pub fn update_arity(&mut self, symbol: &str, arity: usize) {
        self.arities.insert(symbol.to_string(), arity);
    }

    pub fn is_registered(&self, symbol: &str) -> bool {
        self.expression_types.contains_key(symbol)
    }

    pub fn kind_of(&self, symbol: &str) -> Option<ExpressionKind> {
        self.expression_types.get(symbol).copied()
    }

    /// True if the symbol denotes a world (by registered kind, or by the
    /// prover's ζ/ω prefixes).
    pub fn is_world_symbol(&self, symbol: &str) -> bool {
        if symbol.starts_with('ζ') || symbol.starts_with('ω') {
            return true;
        }
        matches!(
            self.kind_of(symbol),
            Some(ExpressionKind::WorldConstant) | Some(ExpressionKind::WorldVariable)
        )
    }

    /// A fresh surface individual constant: `a..o`, then `a2..o2`, etc.
    /// The constant is registered before it is returned.
    pub fn get_new_constant(&mut self) -> String {
        let name = self.fresh_from_letters(&CONSTANT_LETTERS);
        self.expression_types
            .insert(name.clone(), ExpressionKind::IndividualConstant);
        self.arities.insert(name.clone(), 0);
        name
    }

    /// A fresh world name. Skolem world names use the internal ω prefix and
    /// are later renamed; surface world names are drawn from `v,u,t,..`
    /// (skipping the reserved `w`), then `w2,w3,..`.
    pub fn get_new_world_name(&mut self, is_skolem: bool) -> String {
        let name = if is_skolem {
            self.world_skolem_count += 1;
            format!("ω{}", self.world_skolem_count)
        } else {
            self.fresh_world_letter()
        };
        self.expression_types
            .insert(name.clone(), ExpressionKind::WorldConstant);
        self.arities.insert(name.clone(), 0);
        name
    }

    /// A fresh surface function symbol `f,g,h,..`, registered with `arity`.
    pub fn get_new_function_symbol(&mut self, arity: usize) -> String {
        let name = self.fresh_from_letters(&FUNCTION_LETTERS);
        self.expression_types
            .insert(name.clone(), ExpressionKind::FunctionSymbol);
        self.arities.insert(name.clone(), arity);
        name
    }

    /// A fresh surface individual variable, used by prenexing when bound
    /// variables would collide.
    pub fn get_new_variable(&mut self) -> String {
        let name = self.fresh_from_letters(&VARIABLE_LETTERS);
        self.expression_types
            .insert(name.clone(), ExpressionKind::Variable);
        self.arities.insert(name.clone(), 0);
        name
    }

    /// A fresh world variable for the standard translation, drawn from the
    /// same letter sequence as surface world names.
    pub fn get_new_world_variable(&mut self) -> String {
        let name = self.fresh_world_letter();
        self.expression_types
            .insert(name.clone(), ExpressionKind::WorldVariable);
        self.arities.insert(name.clone(), 0);
        name
    }

    /// A fresh prover free variable: ξ1, ξ2, .. for individuals, ζ1, ζ2, ..
    /// for worlds.
    pub fn get_new_free_variable(&mut self, world: bool) -> String {
        let name = if world {
            self.world_variable_count += 1;
            format!("ζ{}", self.world_variable_count)
        } else {
            self.free_variable_count += 1;
            format!("ξ{}", self.free_variable_count)
        };
        let kind = if world {
            ExpressionKind::WorldVariable
        } else {
            ExpressionKind::Variable
        };
        self.expression_types.insert(name.clone(), kind);
        self.arities.insert(name.clone(), 0);
        name
    }

    /// A fresh Skolem symbol for the prover's delta rule: φ1, φ2, .. for
    /// individuals, ω1, ω2, .. for worlds, registered with `arity`.
    pub fn get_new_skolem_symbol(&mut self, world: bool, arity: usize) -> String {
        let name = if world {
            self.world_skolem_count += 1;
            format!("ω{}", self.world_skolem_count)
        } else {
            self.skolem_count += 1;
            format!("φ{}", self.skolem_count)
        };
        let kind = if arity > 0 {
            ExpressionKind::FunctionSymbol
        } else if world {
            ExpressionKind::WorldConstant
        } else {
            ExpressionKind::IndividualConstant
        };
        self.expression_types.insert(name.clone(), kind);
        self.arities.insert(name.clone(), arity);
        name
    }

    fn fresh_from_letters(&self, letters: &[char]) -> String {
        // first the bare letters, then the numbered rounds: a2, b2, .., a3, ..
        for round in 1.. {
            for letter in letters {
                let candidate = if round == 1 {
                    letter.to_string()
                } else {
                    format!("{letter}{round}")
                };
                if !self.is_registered(&candidate) {
                    return candidate;
                }
            }
        }
        unreachable!()
    }

    fn fresh_world_letter(&self) -> String {
        for letter in WORLD_LETTERS {
            let candidate = letter.to_string();
            if !self.is_registered(&candidate) {
                return candidate;
            }
        }
        for round in 2.. {
            let candidate = format!("{ACTUAL_WORLD}{round}");
            if !self.is_registered(&candidate) {
                return candidate;
            }
        }
        unreachable!()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocessing::operator_enums::ExpressionKind;
    use crate::preprocessing::signature::Signature;

    #[test]
    /// Registration accepts repeats and rejects conflicting kinds or arities.
    fn registration_conflicts() {
        let mut sig = Signature::new();
        sig.register_expression("P", ExpressionKind::Predicate, 2)
            .unwrap();
        assert!(sig
            .register_expression("P", ExpressionKind::Predicate, 2)
            .is_ok());
        assert!(sig
            .register_expression("P", ExpressionKind::Predicate, 3)
            .is_err());
        assert!(sig
            .register_expression("P", ExpressionKind::FunctionSymbol, 2)
            .is_err());
    }

    #[test]
    /// Fresh constants skip registered letters and continue with numbered
    /// rounds once the alphabet section is exhausted.
    fn fresh_constants_skip_registered() {
        let mut sig = Signature::new();
        sig.register_expression("a", ExpressionKind::Variable, 0)
            .unwrap();
        sig.register_expression("b", ExpressionKind::Predicate, 0)
            .unwrap();
        assert_eq!(sig.get_new_constant(), "c");
        assert_eq!(sig.get_new_constant(), "d");

        for _ in 0..11 {
            sig.get_new_constant();
        }
        // a..o are now all taken
        assert_eq!(sig.get_new_constant(), "a2");
        assert_eq!(sig.get_new_constant(), "b2");
    }

    #[test]
    /// World names skip the reserved base world `w` and anything already
    /// registered, then fall back to w2, w3, ..
    fn fresh_world_names() {
        let mut sig = Signature::new();
        assert_eq!(sig.get_new_world_name(false), "v");
        assert_eq!(sig.get_new_world_name(false), "u");
        for _ in 0..5 {
            sig.get_new_world_name(false);
        }
        assert_eq!(sig.get_new_world_name(false), "w2");
        assert_eq!(sig.get_new_world_name(false), "w3");
    }

    #[test]
    /// Skolem world names are ω-prefixed until the naming pass renames them.
    fn skolem_names_are_internal() {
        let mut sig = Signature::new();
        assert_eq!(sig.get_new_world_name(true), "ω1");
        assert_eq!(sig.get_new_skolem_symbol(false, 1), "φ1");
        assert_eq!(sig.get_new_skolem_symbol(false, 0), "φ2");
        assert!(sig.is_world_symbol("ω1"));
        assert!(sig.is_world_symbol("ζ9"));
        assert!(!sig.is_world_symbol("φ1"));
    }

    #[test]
    /// Prover variables count up independently per family.
    fn fresh_prover_variables() {
        let mut sig = Signature::new();
        assert_eq!(sig.get_new_free_variable(false), "ξ1");
        assert_eq!(sig.get_new_free_variable(false), "ξ2");
        assert_eq!(sig.get_new_free_variable(true), "ζ1");
    }
}
