//! Semantic analysis (component C/D boundary, spec §9 supplement): a
//! small advisory, non-gating type checker. There is no borrow checker,
//! lifetime analysis, or information-flow pass — Kapila has no concept
//! of ownership or user-defined types beyond the tagged [`crate::vm::Value`]
//! union (spec §10 Non-goals).

pub mod typeck;
pub mod types;

pub use typeck::{TypeChecker, TypeWarning};
pub use types::Type;
