//! `kapila-compiler` — the lexer, parser, virtual machine, and C code
//! generator for Kapila, a Kannada-script stack-oriented language.
//!
//! Components are exposed in dependency order (spec §2):
//!
//! - [`script`] — component A, the Kannada/ASCII script classifier.
//! - [`lexer`] — component B, tokenisation.
//! - [`parser`] — component C, the AST used by the code generator.
//! - [`vm`] — component D, the dual-mode tree-walking virtual machine.
//! - [`codegen`] — component E, the C translation-unit emitter.
//!
//! [`errors`] and [`diagnostics`] are the ambient error-reporting stack
//! all four components share; [`semantics`] holds the advisory (non-
//! gating) type checker; [`driver`] wires the whole pipeline together
//! for `tools/kapila` and `tools/kapilac`.

pub mod codegen;
pub mod diagnostics;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod script;
pub mod semantics;
pub mod vm;
