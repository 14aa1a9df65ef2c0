//! Advisory type checker (spec §9 supplement). Runs after parsing and
//! produces [`TypeWarning`]s the driver may print, but is wired into
//! nothing that gates execution or code generation.

use super::types::{common_type, Type};
use crate::parser::ast::*;
use crate::vm::vocabulary;
use std::collections::HashMap;

/// One advisory diagnostic. Never raised as a [`crate::errors::KapilaError`]
/// — the driver decides whether to print it at all.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeWarning {
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for TypeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ಮಾದರಿ ದೋಷ (ಸಾಲು {}): {}", self.line, self.message)
    }
}

fn builtin_types() -> HashMap<&'static str, Type> {
    use vocabulary::canon::*;
    let any_block = || Type::Block { params: 0, returns: Box::new(Type::Any) };
    [
        DUP, DROP, SWAP, OVER, ROT, AND, OR, NOT, PRINT, LENGTH, NTH, APPEND, FIRST, REST, CONCAT,
        MAP, FILTER, FOLD, EACH, TIMES, DO,
    ]
    .into_iter()
    .map(|name| (name, any_block()))
    .collect()
}

pub struct TypeChecker {
    builtins: HashMap<&'static str, Type>,
    /// Innermost scope last; word definitions and variable assignments at
    /// the top level land in `scopes[0]`, a block literal's parameters
    /// push a fresh scope that pops on exit (spec §9 "child scope").
    scopes: Vec<HashMap<String, Type>>,
    warnings: Vec<TypeWarning>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            builtins: builtin_types(),
            scopes: vec![HashMap::new()],
            warnings: Vec::new(),
        }
    }

    pub fn check(mut self, program: &Program) -> Vec<TypeWarning> {
        for stmt in program {
            self.visit_stmt(stmt);
        }
        self.warnings
    }

    fn error(&mut self, message: impl Into<String>) {
        // No node in this tree carries a line number (spec §4.3's AST is
        // line-agnostic), so warnings report line 0; the driver's textual
        // rendering can fold in source context if it chooses to.
        self.warnings.push(TypeWarning { message: message.into(), line: 0 });
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn define(&mut self, name: String, ty: Type) {
        self.scopes.last_mut().expect("always at least one scope").insert(name, ty);
    }

    fn lookup(&self, name: &str) -> Option<Type> {
        for scope in self.scopes.iter().rev() {
            if let Some(t) = scope.get(name) {
                return Some(t.clone());
            }
        }
        if let Some(canon) = vocabulary::resolve_builtin(name) {
            return self.builtins.get(canon).cloned();
        }
        if vocabulary::resolve_operator_word(name).is_some() {
            return Some(Type::Block { params: 2, returns: Box::new(Type::Number) });
        }
        None
    }

    fn word_type(&self, name: &str) -> Type {
        self.lookup(name).unwrap_or(Type::Any)
    }

    // -- statements --------------------------------------------------------

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::WordDef { name, params, .. } => {
                // The body is raw postfix tokens with no infix tree to
                // type, so the word is registered with an `Any` return
                // rather than attempting stack simulation.
                self.define(
                    name.clone(),
                    Type::Block { params: params.len(), returns: Box::new(Type::Any) },
                );
            }
            Stmt::VarAssign { name, value } => {
                let ty = self.visit_expr(value);
                self.define(name.clone(), ty);
            }
            Stmt::ExprStmt { expr } => {
                self.visit_expr(expr);
            }
        }
    }

    // -- expressions ---------------------------------------------------------

    fn visit_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::NumberLit(NumberLit::Int(_)) => Type::Int,
            Expr::NumberLit(NumberLit::Float(_)) => Type::Float,
            Expr::StringLit(_) => Type::Str,
            Expr::BoolLit(_) => Type::Bool,
            Expr::Word(name) => self.word_type(name),
            // A quoted word is pushed as a `Value::Symbol`, which the VM
            // treats like an `Rc<str>` (spec §3) — string-like for typing.
            Expr::QuotedWord(_) => Type::Str,
            Expr::Block(block) => self.visit_block(block),
            Expr::ListLit(items) => {
                let mut elem = None;
                for item in items {
                    let t = self.visit_expr(item);
                    elem = Some(match elem {
                        None => t,
                        Some(prev) => common_type(&prev, &t),
                    });
                }
                Type::List(Box::new(elem.unwrap_or(Type::Any)))
            }
            Expr::MapLit(entries) => {
                let mut value = None;
                for (_, v) in entries {
                    let t = self.visit_expr(v);
                    value = Some(match value {
                        None => t,
                        Some(prev) => common_type(&prev, &t),
                    });
                }
                Type::Map(Box::new(Type::Str), Box::new(value.unwrap_or(Type::Any)))
            }
            Expr::BinaryExpr { op, left, right } => self.visit_binary(*op, left, right),
            Expr::UnaryExpr { op, operand } => self.visit_unary(*op, operand),
            Expr::LogicExpr { op: _, left, right } => {
                let lt = self.visit_expr(left);
                let rt = self.visit_expr(right);
                if !lt.is_bool_like() {
                    self.error(format!("ತಾರ್ಕಿಕ ಕಾರ್ಯಕ್ಕೆ ಎಡಭಾಗ ಬೂಲ್ ಆಗಿರಬೇಕು, '{lt}' ಅಲ್ಲ"));
                }
                if !rt.is_bool_like() {
                    self.error(format!("ತಾರ್ಕಿಕ ಕಾರ್ಯಕ್ಕೆ ಬಲಭಾಗ ಬೂಲ್ ಆಗಿರಬೇಕು, '{rt}' ಅಲ್ಲ"));
                }
                Type::Bool
            }
            Expr::Conditional { cond, then_block, else_block } => {
                let ct = self.visit_expr(cond);
                if !ct.is_bool_like() {
                    self.error(format!("ಷರತ್ತು ಬೂಲ್ ಆಗಿರಬೇಕು, '{ct}' ಅಲ್ಲ"));
                }
                let then_ty = self.visit_block(then_block);
                let else_ty = match else_block {
                    Some(eb) => self.visit_block(eb),
                    None => Type::Void,
                };
                common_type(&then_ty, &else_ty)
            }
            Expr::PostfixAction { value, actions } => {
                let mut current = self.visit_expr(value);
                for action in actions {
                    current = match self.lookup(action) {
                        Some(Type::Block { returns, .. }) => *returns,
                        _ => Type::Any,
                    };
                }
                current
            }
        }
    }

    fn visit_binary(&mut self, op: OpKind, left: &Expr, right: &Expr) -> Type {
        let lt = self.visit_expr(left);
        let rt = self.visit_expr(right);
        match op {
            OpKind::Add | OpKind::Sub | OpKind::Mul | OpKind::Div | OpKind::Mod => {
                if !lt.is_numeric() && !matches!(lt, Type::Any) {
                    self.error(format!("ಎಡ ಭಾಗ ಸಂಖ್ಯೆ ಆಗಿರಬೇಕು, '{lt}' ಅಲ್ಲ"));
                }
                if !rt.is_numeric() && !matches!(rt, Type::Any) {
                    self.error(format!("ಬಲ ಭಾಗ ಸಂಖ್ಯೆ ಆಗಿರಬೇಕು, '{rt}' ಅಲ್ಲ"));
                }
                if op == OpKind::Div {
                    Type::Float
                } else if matches!(lt, Type::Float) || matches!(rt, Type::Float) {
                    Type::Float
                } else {
                    Type::Number
                }
            }
            OpKind::Eq | OpKind::Neq | OpKind::Lt | OpKind::Gt | OpKind::Lte | OpKind::Gte => {
                Type::Bool
            }
        }
    }

    fn visit_unary(&mut self, op: UnaryOpKind, operand: &Expr) -> Type {
        let t = self.visit_expr(operand);
        match op {
            UnaryOpKind::Neg => {
                if !t.is_numeric() && !matches!(t, Type::Any) {
                    self.error(format!("ಋಣಾತ್ಮಕಕ್ಕೆ ಸಂಖ್ಯೆ ಬೇಕು, '{t}' ಅಲ್ಲ"));
                }
                t
            }
            UnaryOpKind::Not => {
                if !t.is_bool_like() {
                    self.error(format!("'not' ಕಾರ್ಯಕ್ಕೆ ಬೂಲ್ ಬೇಕು, '{t}' ಅಲ್ಲ"));
                }
                Type::Bool
            }
        }
    }

    fn visit_block(&mut self, block: &RawBlock) -> Type {
        self.push_scope();
        for param in &block.params {
            self.define(param.clone(), Type::Any);
        }
        let mut ret = Type::Void;
        for node in &block.body {
            ret = self.visit_node(node);
        }
        self.pop_scope();
        Type::Block { params: block.params.len(), returns: Box::new(ret) }
    }

    // -- raw (postfix) body nodes --------------------------------------------

    /// Word-definition/block bodies are collected raw (spec §4.3, no infix
    /// tree), so arithmetic operators and `?` appear as bare tokens rather
    /// than the `BinaryExpr`/`Conditional` nodes above; without a modeled
    /// operand stack there's nothing sound to check about them, so they're
    /// typed `Any` rather than guessed at.
    fn visit_node(&mut self, node: &AstNode) -> Type {
        match node {
            AstNode::Number(NumberLit::Int(_)) => Type::Int,
            AstNode::Number(NumberLit::Float(_)) => Type::Float,
            AstNode::Str(_) => Type::Str,
            AstNode::Word(name) => self.word_type(name),
            AstNode::QuotedWord(_) => Type::Str,
            AstNode::Op(_) | AstNode::Question => Type::Any,
            AstNode::Block(block) => self.visit_block(block),
            AstNode::List(items) => {
                let mut elem = None;
                for item in items {
                    let t = self.visit_node(item);
                    elem = Some(match elem {
                        None => t,
                        Some(prev) => common_type(&prev, &t),
                    });
                }
                Type::List(Box::new(elem.unwrap_or(Type::Any)))
            }
            AstNode::Map(entries) => {
                let mut value = None;
                for (_, v) in entries {
                    let t = self.visit_node(v);
                    value = Some(match value {
                        None => t,
                        Some(prev) => common_type(&prev, &t),
                    });
                }
                Type::Map(Box::new(Type::Str), Box::new(value.unwrap_or(Type::Any)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn check(src: &str) -> Vec<TypeWarning> {
        let (program, errors) = Parser::new(Lexer::tokenize_all(src)).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        TypeChecker::new().check(&program)
    }

    #[test]
    fn arithmetic_on_numbers_is_clean() {
        assert!(check("೫ + ೩.").is_empty());
    }

    #[test]
    fn arithmetic_on_string_reports_a_warning() {
        let warnings = check(r#""ನಮಸ್ಕಾರ" + ೫."#);
        assert!(!warnings.is_empty());
    }

    #[test]
    fn comparisons_are_always_boolean() {
        assert!(check("೫ < ೧೦.").is_empty());
    }

    #[test]
    fn unbound_word_is_lenient_any_not_an_error() {
        // An unknown word might be defined later in the file, so it
        // types as Any rather than reporting a warning.
        assert!(check("ಅಪರಿಚಿತ.").is_empty());
    }

    #[test]
    fn conditional_branches_widen_to_common_type() {
        assert!(check(r#"೫ > ೩ ? [ "ಹೌದು" ] [ "ಇಲ್ಲ" ]."#).is_empty());
    }

    #[test]
    fn block_params_are_scoped_and_do_not_leak() {
        let (program, errors) = Parser::new(Lexer::tokenize_all("[ x | x ] ನಕ್ಷೆ.")).parse();
        assert!(errors.is_empty());
        let warnings = TypeChecker::new().check(&program);
        assert!(warnings.is_empty());
    }
}
