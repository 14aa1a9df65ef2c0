//! Pipeline orchestration shared by `tools/kapila` and `tools/kapilac`
//! (spec §2 data flow: "source text → A+B → token sequence → {C → AST →
//! E → C source} or {D direct execution}"). Each phase is wrapped in a
//! `tracing` span/event, one per pipeline stage, with no intermediate
//! optimization stages since none are named here.

use crate::codegen::{self, CodegenError};
use crate::errors::KapilaError;
use crate::lexer::{Lexer, Token};
use crate::parser::{ast::Program, ParseError, Parser};
use crate::semantics::{TypeChecker, TypeWarning};
use crate::vm::Vm;

/// Lex a whole source string into tokens (component A+B).
pub fn lex(source: &str) -> Vec<Token> {
    let _span = tracing::debug_span!("lex").entered();
    let tokens = Lexer::tokenize_all(source);
    tracing::debug!(tokens = tokens.len(), "lexed source");
    tokens
}

/// Parse a token stream into a [`Program`] plus any parse diagnostics
/// (component C). Only used by the compiler path — the interpreter
/// re-scans tokens directly (spec §4.4).
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<ParseError>) {
    let _span = tracing::debug_span!("parse").entered();
    let (program, errors) = Parser::new(tokens).parse();
    if errors.is_empty() {
        tracing::debug!(statements = program.len(), "parsed program");
    } else {
        tracing::warn!(errors = errors.len(), "parse completed with errors");
    }
    (program, errors)
}

/// Run the advisory type checker over a parsed program. Its warnings are
/// informational only — nothing in this module, the VM, or the code
/// generator consults them to decide whether to proceed (spec §9 Open
/// Question 1).
pub fn advisory_typecheck(program: &Program) -> Vec<TypeWarning> {
    let _span = tracing::debug_span!("typecheck").entered();
    let warnings = TypeChecker::new().check(program);
    if !warnings.is_empty() {
        tracing::debug!(warnings = warnings.len(), "advisory type warnings");
    }
    warnings
}

/// Feed one more chunk of source into a live `Vm` and run it to
/// completion (component D, the interpreter path). Used by both file
/// execution and each REPL line — the `Vm` persists its stack,
/// dictionary, and variables across calls (spec §3 "Lifecycle").
pub fn run_source(vm: &mut Vm<'_>, source: &str) -> Result<(), KapilaError> {
    let _span = tracing::debug_span!("run").entered();
    vm.feed(lex(source));
    vm.run()
}

/// Errors from the compile-to-C path (component E), distinct from
/// [`KapilaError`] because parse errors here are a batch, not a single
/// fatal condition (spec §7 "parse errors are collected").
#[derive(Debug)]
pub enum CompileError {
    Parse(Vec<ParseError>),
    Codegen(CodegenError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(errors) => {
                writeln!(f, "ದೋಷ: {} ಪಾರ್ಸ್ ದೋಷ(ಗಳು)", errors.len())?;
                for e in errors {
                    writeln!(f, "  - {} ({})", e.message, e.span)?;
                }
                Ok(())
            }
            CompileError::Codegen(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Lex, parse, advisory-typecheck, then lower to C (component E, the
/// compiler path). Type warnings are logged via `tracing`, never
/// returned as failures.
pub fn compile_source(source: &str) -> Result<String, CompileError> {
    let tokens = lex(source);
    let (program, errors) = parse(tokens);
    if !errors.is_empty() {
        return Err(CompileError::Parse(errors));
    }

    for warning in advisory_typecheck(&program) {
        tracing::warn!("{warning}");
    }

    let _span = tracing::debug_span!("codegen").entered();
    codegen::generate(&program).map_err(CompileError::Codegen)
}
