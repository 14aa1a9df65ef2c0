//! C code generator (component E, spec §4.5): lowers a [`Program`] to a
//! single C translation unit. Unknown words and unsupported literals are
//! reported as a [`CodegenError`] rather than emitted as a silent
//! `// Unknown word: ...` comment, and unary negation handles `Float` as
//! well as `Int` operands (both departures recorded in DESIGN.md).

use crate::parser::ast::*;
use crate::vm::vocabulary;

use super::mangling::mangle;
use super::runtime_template::RUNTIME_PREAMBLE;

/// A lowering failure: either a construct the C backend cannot express
/// (lists, maps, first-class blocks, a bare `?` with no enclosing
/// then/else pair) or a reference to a word nothing defines.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenError {
    pub message: String,
}

impl CodegenError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ದೋಷ (ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆ): {}", self.message)
    }
}

impl std::error::Error for CodegenError {}

type CResult<T> = Result<T, CodegenError>;

/// Canonical built-in name → generated C function call. Anything
/// `vocabulary` doesn't resolve to one of these canonical names is
/// looked up as a user word instead (spec §4.4 word resolution order,
/// reused verbatim for codegen).
fn builtin_call(canon: &'static str) -> Option<&'static str> {
    use vocabulary::canon as c;
    Some(match canon {
        c::DUP => "kp_dup_op();",
        c::DROP => "kp_drop_op();",
        c::SWAP => "kp_swap_op();",
        c::AND => "kp_and_op();",
        c::OR => "kp_or_op();",
        c::NOT => "kp_not_op();",
        c::PRINT => "kp_print_op();",
        _ => return None,
    })
}

/// Generates one standalone C translation unit: the full runtime preamble
/// (region i), one C function per `WordDef` (region ii), and a `main`
/// wrapping the remaining top-level statements in source order (region
/// iii).
pub struct CGenerator {
    word_defs: std::collections::HashMap<String, (Vec<String>, Vec<AstNode>)>,
    out: String,
    indent: usize,
}

impl CGenerator {
    pub fn new() -> Self {
        Self {
            word_defs: std::collections::HashMap::new(),
            out: String::new(),
            indent: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> CResult<String> {
        for stmt in program {
            if let Stmt::WordDef { name, params, body } = stmt {
                self.word_defs.insert(name.clone(), (params.clone(), body.clone()));
            }
        }

        self.out.push_str(RUNTIME_PREAMBLE);
        self.out.push('\n');

        let names: Vec<String> = self.word_defs.keys().cloned().collect();
        for name in names {
            self.emit_word_function(&name)?;
        }

        self.emit_line("int main(void) {");
        self.indent += 1;
        self.emit_line("kp_stack_init();");
        let mut main_locals: Vec<String> = Vec::new();
        for stmt in program {
            match stmt {
                Stmt::WordDef { .. } => {}
                Stmt::VarAssign { name, value } => {
                    self.visit_var_assign(name, value, &main_locals)?;
                    main_locals.push(name.clone());
                }
                Stmt::ExprStmt { expr } => self.visit_expr_stmt(expr, &main_locals)?,
            }
        }
        self.emit_line("return 0;");
        self.indent -= 1;
        self.emit_line("}");

        Ok(self.out)
    }

    fn emit_line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_word_function(&mut self, name: &str) -> CResult<()> {
        let (params, body) = self.word_defs.get(name).cloned().ok_or_else(|| {
            CodegenError::new(format!("ಸಂಗ್ರಹಕ್ಕೆ ಇಲ್ಲದ ಪದ: {name}"))
        })?;

        self.emit_line(&format!("static void {}(void) {{", mangle(name)));
        self.indent += 1;
        // Word parameters are bound by popping into locals the same order
        // the VM shadows them in block mode (spec §4.4): rightmost
        // parameter is the top of the stack.
        for p in params.iter().rev() {
            self.emit_line(&format!("Value {} = kp_pop();", mangle(p)));
        }
        self.visit_body(&body, &params)?;
        self.indent -= 1;
        self.emit_line("}");
        Ok(())
    }

    fn visit_var_assign(&mut self, name: &str, value: &Expr, locals: &[String]) -> CResult<()> {
        self.visit_expr(value, locals)?;
        self.emit_line(&format!("Value {} = kp_pop();", mangle(name)));
        Ok(())
    }

    fn visit_expr_stmt(&mut self, expr: &Expr, locals: &[String]) -> CResult<()> {
        self.visit_expr(expr, locals)?;
        Ok(())
    }

    // -- infix expression tree (top-level `Expr`, spec §4.3) -------------

    fn visit_expr(&mut self, expr: &Expr, locals: &[String]) -> CResult<()> {
        match expr {
            Expr::NumberLit(NumberLit::Int(n)) => {
                self.emit_line(&format!("kp_push_int({n}LL);"));
            }
            Expr::NumberLit(NumberLit::Float(n)) => {
                self.emit_line(&format!("kp_push_float({n:?});"));
            }
            Expr::StringLit(s) => {
                self.emit_line(&format!("kp_push_str({});", c_string_literal(s)));
            }
            Expr::BoolLit(b) => {
                self.emit_line(&format!("kp_push_bool({});", if *b { "true" } else { "false" }));
            }
            Expr::Word(name) => self.visit_word(name, locals)?,
            Expr::QuotedWord(name) => {
                self.emit_line(&format!("kp_push_str({});", c_string_literal(name)));
            }
            Expr::Block(_) => {
                return Err(CodegenError::new(
                    "ಬ್ಲಾಕ್ ಮೌಲ್ಯವಾಗಿ ಬಳಸುವುದು ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆಯಲ್ಲಿ ಬೆಂಬಲಿತವಲ್ಲ",
                ))
            }
            Expr::ListLit(_) => {
                return Err(CodegenError::new("ಪಟ್ಟಿ ಸಾಹಿತ್ಯಕ್ಕೆ ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆ ಬೆಂಬಲಿತವಲ್ಲ"))
            }
            Expr::MapLit(_) => {
                return Err(CodegenError::new("ನಕ್ಷೆ ಸಾಹಿತ್ಯಕ್ಕೆ ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆ ಬೆಂಬಲಿತವಲ್ಲ"))
            }
            Expr::BinaryExpr { op, left, right } => {
                self.visit_expr(left, locals)?;
                self.visit_expr(right, locals)?;
                self.emit_line(&format!("{}", op_call(*op)));
            }
            Expr::UnaryExpr { op, operand } => {
                self.visit_expr(operand, locals)?;
                self.emit_unary(*op);
            }
            Expr::LogicExpr { op, left, right } => {
                self.visit_expr(left, locals)?;
                self.visit_expr(right, locals)?;
                self.emit_line(match op {
                    LogicOp::And => "kp_and_op();",
                    LogicOp::Or => "kp_or_op();",
                });
            }
            Expr::Conditional { cond, then_block, else_block } => {
                self.visit_conditional(cond, then_block, else_block.as_ref(), locals)?;
            }
            Expr::PostfixAction { value, actions } => {
                self.visit_expr(value, locals)?;
                for action in actions {
                    self.visit_word(action, locals)?;
                }
            }
        }
        Ok(())
    }

    fn emit_unary(&mut self, op: UnaryOpKind) {
        match op {
            UnaryOpKind::Neg => {
                self.emit_line("{ Value kp_u = kp_pop();");
                self.emit_line(
                    "  if (kp_u.type == VAL_FLOAT) kp_push_float(-kp_u.f); else kp_push_int(-kp_u.i); }",
                );
            }
            UnaryOpKind::Not => self.emit_line("kp_not_op();"),
        }
    }

    fn visit_conditional(
        &mut self,
        cond: &Expr,
        then_block: &RawBlock,
        else_block: Option<&RawBlock>,
        locals: &[String],
    ) -> CResult<()> {
        self.visit_expr(cond, locals)?;
        self.emit_line("if (kp_pop().b) {");
        self.indent += 1;
        self.visit_body(&then_block.body, &with_params(locals, &then_block.params))?;
        self.indent -= 1;
        if let Some(eb) = else_block {
            self.emit_line("} else {");
            self.indent += 1;
            self.visit_body(&eb.body, &with_params(locals, &eb.params))?;
            self.indent -= 1;
        }
        self.emit_line("}");
        Ok(())
    }

    /// Resolves a word reference shared by both the infix (`visit_expr`)
    /// and postfix (`visit_node`) walks. `locals` names every C variable
    /// visible at this point (the enclosing word/block's parameters plus,
    /// at top level, variables bound by a preceding `VarAssign`). A name
    /// matching none of the built-in/user-word/local categories is a
    /// genuinely unresolved word and is rejected rather than emitted as a
    /// read of an undeclared C identifier.
    fn visit_word(&mut self, name: &str, locals: &[String]) -> CResult<()> {
        if vocabulary::is_true_word(name) {
            self.emit_line("kp_push_bool(true);");
            return Ok(());
        }
        if vocabulary::is_false_word(name) {
            self.emit_line("kp_push_bool(false);");
            return Ok(());
        }
        if let Some(canon) = vocabulary::resolve_builtin(name) {
            if let Some(call) = builtin_call(canon) {
                self.emit_line(call);
                return Ok(());
            }
            return Err(CodegenError::new(format!(
                "ಅಂತರ್ನಿರ್ಮಿತ ಶಬ್ದ '{name}' ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆಯಲ್ಲಿ ಬೆಂಬಲಿತವಲ್ಲ (ಪಟ್ಟಿ/ನಕ್ಷೆ ಬೇಕಾಗಿದೆ)"
            )));
        }
        if let Some(sym) = vocabulary::resolve_operator_word(name) {
            self.emit_line(op_call_from_symbol(sym));
            return Ok(());
        }
        if self.word_defs.contains_key(name) {
            self.emit_line(&format!("{}();", mangle(name)));
            return Ok(());
        }
        if locals.iter().any(|p| p == name) {
            self.emit_line(&format!("kp_stack[kp_sp++] = {};", mangle(name)));
            return Ok(());
        }
        Err(CodegenError::new(format!("ಅಪರಿಚಿತ ಶಬ್ದ: {name}")))
    }

    // -- raw body sequence (word-def / block bodies, spec §4.3/§4.4) ------

    /// Bodies are a flat, unparenthesized postfix sequence (spec §4.3 doc
    /// comment on [`AstNode`]): a ternary only exists once a bare
    /// [`AstNode::Question`] is followed by its branch block(s), so this
    /// walk is index-based rather than a per-item dispatch, mirroring the
    /// VM's `run_block_body` recognising the same pattern token-by-token.
    fn visit_body(&mut self, body: &[AstNode], locals: &[String]) -> CResult<()> {
        let mut i = 0;
        while i < body.len() {
            match &body[i] {
                AstNode::Question => {
                    let then_block = match body.get(i + 1) {
                        Some(AstNode::Block(b)) => b.clone(),
                        _ => {
                            return Err(CodegenError::new(
                                "'?' ನಂತರ then-ಬ್ಲಾಕ್ ಇಲ್ಲ",
                            ))
                        }
                    };
                    let (else_block, consumed) = match body.get(i + 2) {
                        Some(AstNode::Block(b)) => (Some(b.clone()), 3),
                        _ => (None, 2),
                    };
                    self.visit_raw_conditional(&then_block, else_block.as_ref(), locals)?;
                    i += consumed;
                    continue;
                }
                other => self.visit_node(other, locals)?,
            }
            i += 1;
        }
        Ok(())
    }

    fn visit_raw_conditional(
        &mut self,
        then_block: &RawBlock,
        else_block: Option<&RawBlock>,
        locals: &[String],
    ) -> CResult<()> {
        self.emit_line("if (kp_pop().b) {");
        self.indent += 1;
        self.visit_body(&then_block.body, &with_params(locals, &then_block.params))?;
        self.indent -= 1;
        if let Some(eb) = else_block {
            self.emit_line("} else {");
            self.indent += 1;
            self.visit_body(&eb.body, &with_params(locals, &eb.params))?;
            self.indent -= 1;
        }
        self.emit_line("}");
        Ok(())
    }

    fn visit_node(&mut self, node: &AstNode, locals: &[String]) -> CResult<()> {
        match node {
            AstNode::Number(NumberLit::Int(n)) => self.emit_line(&format!("kp_push_int({n}LL);")),
            AstNode::Number(NumberLit::Float(n)) => {
                self.emit_line(&format!("kp_push_float({n:?});"))
            }
            AstNode::Str(s) => self.emit_line(&format!("kp_push_str({});", c_string_literal(s))),
            AstNode::Word(name) => self.visit_word(name, locals)?,
            AstNode::QuotedWord(name) => {
                self.emit_line(&format!("kp_push_str({});", c_string_literal(name)))
            }
            AstNode::Op(op) => self.emit_line(op_call(*op)),
            AstNode::Question => unreachable!("consumed by visit_body's lookahead"),
            AstNode::Block(_) => {
                return Err(CodegenError::new(
                    "ಬ್ಲಾಕ್ ಮೌಲ್ಯವಾಗಿ ಬಳಸುವುದು ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆಯಲ್ಲಿ ಬೆಂಬಲಿತವಲ್ಲ",
                ))
            }
            AstNode::List(_) => {
                return Err(CodegenError::new("ಪಟ್ಟಿ ಸಾಹಿತ್ಯಕ್ಕೆ ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆ ಬೆಂಬಲಿತವಲ್ಲ"))
            }
            AstNode::Map(_) => {
                return Err(CodegenError::new("ನಕ್ಷೆ ಸಾಹಿತ್ಯಕ್ಕೆ ಸಿ ಕೋಡ್ ಉತ್ಪಾದನೆ ಬೆಂಬಲಿತವಲ್ಲ"))
            }
        }
        Ok(())
    }
}

impl Default for CGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Extends an outer locals list with a nested block's own parameters,
/// without disturbing the caller's copy.
fn with_params(outer: &[String], params: &[String]) -> Vec<String> {
    let mut combined = outer.to_vec();
    combined.extend(params.iter().cloned());
    combined
}

fn op_call(op: OpKind) -> &'static str {
    match op {
        OpKind::Add => "kp_add_op();",
        OpKind::Sub => "kp_sub_op();",
        OpKind::Mul => "kp_mul_op();",
        OpKind::Div => "kp_div_op();",
        OpKind::Mod => "kp_mod_op();",
        OpKind::Eq => "kp_eq_op();",
        OpKind::Neq => "kp_neq_op();",
        OpKind::Lt => "kp_lt_op();",
        OpKind::Gt => "kp_gt_op();",
        OpKind::Lte => "kp_lte_op();",
        OpKind::Gte => "kp_gte_op();",
    }
}

/// Word-spelled counterpart to `op_call`, keyed by the ASCII symbol
/// `vocabulary::resolve_operator_word` returns rather than by `OpKind`
/// (the word forms never reach the parser as `AstNode::Op`).
fn op_call_from_symbol(sym: &str) -> &'static str {
    match sym {
        "+" => "kp_add_op();",
        "-" => "kp_sub_op();",
        "*" => "kp_mul_op();",
        "/" => "kp_div_op();",
        "%" => "kp_mod_op();",
        "=" => "kp_eq_op();",
        "!=" => "kp_neq_op();",
        "<" => "kp_lt_op();",
        ">" => "kp_gt_op();",
        "<=" => "kp_lte_op();",
        ">=" => "kp_gte_op();",
        _ => unreachable!("resolve_operator_word only returns known symbols"),
    }
}

fn c_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii() => out.push(c),
            c => out.push_str(&format!("\\u{:04x}", c as u32)),
        }
    }
    out.push('"');
    out
}

/// Entry point used by `kapilac` (spec §4.5).
pub fn generate(program: &Program) -> CResult<String> {
    CGenerator::new().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn gen(src: &str) -> CResult<String> {
        let tokens = Lexer::tokenize_all(src);
        let (program, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        generate(&program)
    }

    #[test]
    fn arithmetic_statement_emits_push_and_op_calls() {
        let c = gen("೨ ೩ +.").unwrap();
        assert!(c.contains("kp_push_int(2LL);"));
        assert!(c.contains("kp_push_int(3LL);"));
        assert!(c.contains("kp_add_op();"));
        assert!(c.contains("int main(void)"));
    }

    #[test]
    fn word_definition_becomes_a_static_c_function() {
        let c = gen("ವರ್ಗ: ನಕಲು * ॥ ೫ ವರ್ಗ ಮುದ್ರಿಸು.").unwrap();
        assert!(c.contains("static void"));
        assert!(c.contains("kp_dup_op();"));
        assert!(c.contains("kp_mul_op();"));
        assert!(c.contains("kp_print_op();"));
    }

    #[test]
    fn list_literal_is_rejected_as_unsupported() {
        let err = gen("[ ೧ ೨ ೩ ] ಮುದ್ರಿಸು.").unwrap_err();
        assert!(err.message.contains("ಪಟ್ಟಿ"));
    }

    #[test]
    fn unknown_word_is_a_codegen_error_not_an_undeclared_read() {
        let err = gen("ಅಜ್ಞಾತ.").unwrap_err();
        assert!(err.message.contains("ಅಪರಿಚಿತ"));
    }

    #[test]
    fn variable_used_inside_word_body_is_still_unresolved() {
        // `x` is bound in `main`'s C scope, not the word function's — a
        // word body referencing an outer variable has no counterpart C
        // local and must still be rejected, not emitted as a read of an
        // undeclared identifier in the wrong function.
        let err = gen("x := ೫. ಪದ: x ॥ ಪದ.").unwrap_err();
        assert!(err.message.contains("ಅಪರಿಚಿತ"));
    }

    #[test]
    fn top_level_conditional_lowers_to_if_else() {
        let c = gen("ನಿಜ ? [ ೧ ಮುದ್ರಿಸು ] [ ೦ ಮುದ್ರಿಸು ].").unwrap();
        assert!(c.contains("if (kp_pop().b) {"));
        assert!(c.contains("} else {"));
    }

    #[test]
    fn word_definition_using_kannada_operator_word_alias() {
        let c = gen("ವರ್ಗ: ನಕಲು ಗುಣಿಸು ॥ ೫ ವರ್ಗ ಮುದ್ರಿಸು.").unwrap();
        assert!(c.contains("kp_dup_op();"));
        assert!(c.contains("kp_mul_op();"));
    }
}
