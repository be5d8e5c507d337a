//! Construction of the displayed sentence tableau from the free-variable
//! proof: node transfer and denormalization, tree surgery, the naming pass,
//! re-modalization, and countermodel extraction.

pub mod countermodel;
pub mod denormalization;
pub mod modalization;
pub mod naming;
pub mod sen_node;
pub mod sen_tree;
