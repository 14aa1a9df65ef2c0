//! Parser (component C): builds the [`ast::Program`] that the code
//! generator and canonical printer walk (spec §3, §4.3). The VM never
//! sees this tree — it re-scans the token stream directly (spec §4.4).

pub mod ast;
pub mod grammar;
pub mod printer;

pub use ast::{AstNode, Expr, LogicOp, NumberLit, OpKind, Program, RawBlock, Stmt, UnaryOpKind};
pub use grammar::{ParseError, Parser};
pub use printer::print_program;
