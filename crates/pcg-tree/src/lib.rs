//! The decision-tree evaluator: loads a text tree of marker comparisons and
//! walks it to a [`pcg_core::Verdict`] for one recording's marker context.

mod eval;
mod format;

pub use eval::evaluate;
pub use format::{parse_text, to_text, Child, InternalNode, Tree};
