//! Components regarding normal forms: negation normal form, prenex form,
//! Skolemization, and clausal (conjunctive) normal form.

mod clausal;
mod nnf;

pub use clausal::{clausal_normal_form, clauses_to_string, cnf, prenex, skolemize, Clause};
pub use nnf::normalize;
