//! Error types and diagnostic reporting shared by the lexer, parser, VM,
//! and code generator.

pub mod error;
pub mod report;
pub mod span;

pub use error::*;
pub use report::*;
pub use span::*;
