//! Pipeline orchestration (spec §2 data flow), shared by both CLI
//! binaries so neither reimplements "lex, then parse-or-run".

pub mod session;

pub use session::{advisory_typecheck, compile_source, lex, parse, run_source, CompileError};
