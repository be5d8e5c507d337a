//! Several complex end-to-end scenarios for the whole proof pipeline, from
//! concrete syntax to the finished sentence tableau or countermodel.

mod _test_countermodels;
mod _test_sentence_trees;
mod _test_util;
