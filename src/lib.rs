//! A small library implementing an analytic tableau theorem prover for
//! classical first-order and propositional modal logic. As of now, the
//! library supports:
//!  - Parsing of (modal) formulae and signature bookkeeping for their
//!    symbols.
//!  - The standard translation between modal and first-order vocabulary, in
//!    both directions (including the collapsed S5 treatment).
//!  - Negation normal, prenex, Skolem, and clausal normal forms.
//!  - A bounded free-variable tableau search with unification.
//!  - Reconstruction of the human-readable sentence tableau from the
//!    free-variable proof, with deterministic surface naming.
//!  - Countermodel extraction from open branches.
//!

pub mod analysis;
pub mod modal_translation;
pub mod model;
pub mod normalization;
pub mod postprocessing;
pub mod preprocessing;
pub mod proving;
pub mod result_print;

/// **(internal)** Several complex end-to-end scenarios for the whole proof
/// pipeline.
#[cfg(test)]
mod _test_proof_pipeline;
