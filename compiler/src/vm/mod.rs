//! Component D: the tree-walking virtual machine. Operates directly on
//! the token stream (spec §4.4) rather than on the parsed AST — the AST
//! exists for the parser/printer/code-generator path, but execution is
//! driven straight off tokens so the dual infix/postfix modes share one
//! scanner-style cursor.

pub mod builtins;
pub mod value;
pub mod vocabulary;

pub use value::{Block, Value};

use crate::errors::KapilaError;
use crate::lexer::{Token, TokenKind};
use std::collections::HashMap;
use std::io::Write;

pub struct Vm<'a> {
    stack: Vec<Value>,
    words: HashMap<String, Block>,
    variables: HashMap<String, Value>,
    tokens: Vec<Token>,
    pos: usize,
    out: &'a mut dyn Write,
}

/// The infix arithmetic/comparison operators (`+ - * / % = != < > <= >=`),
/// shared by the top-level precedence ladder and block-mode postfix
/// execution through a single `apply_binary` routine (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl BinOp {
    fn from_token(kind: TokenKind) -> Option<BinOp> {
        Some(match kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::Eq => BinOp::Eq,
            TokenKind::Neq => BinOp::Neq,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Lte => BinOp::Lte,
            TokenKind::Gte => BinOp::Gte,
            _ => return None,
        })
    }

    /// Counterpart to `from_token` for the word-spelled aliases (spec §6)
    /// resolved via `vocabulary::resolve_operator_word`.
    fn from_symbol(sym: &str) -> Option<BinOp> {
        Some(match sym {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "=" => BinOp::Eq,
            "!=" => BinOp::Neq,
            "<" => BinOp::Lt,
            ">" => BinOp::Gt,
            "<=" => BinOp::Lte,
            ">=" => BinOp::Gte,
            _ => return None,
        })
    }

    fn is_additive(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub)
    }

    fn is_multiplicative(self) -> bool {
        matches!(self, BinOp::Mul | BinOp::Div | BinOp::Mod)
    }

    fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::Lte | BinOp::Gte
        )
    }
}

/// Promote two numeric values to a common representation, lifting to
/// float if either side is a float (spec §4.4 "numeric promotion").
enum Numeric {
    Int(i64, i64),
    Float(f64, f64),
}

fn promote(a: &Value, b: &Value) -> Result<Numeric, KapilaError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Numeric::Int(*x, *y)),
        (Value::Int(x), Value::Float(y)) => Ok(Numeric::Float(*x as f64, *y)),
        (Value::Float(x), Value::Int(y)) => Ok(Numeric::Float(*x, *y as f64)),
        (Value::Float(x), Value::Float(y)) => Ok(Numeric::Float(*x, *y)),
        _ => Err(KapilaError::runtime(format!(
            "ಅಂಕಗಣಿತದ ಕಾರ್ಯಾಚರಣೆಗೆ ಸಂಖ್ಯೆಗಳು ಬೇಕು, ಸಿಕ್ಕಿದ್ದು {} ಮತ್ತು {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Apply one of the shared arithmetic/comparison operators to two
/// already-evaluated operands. `a` is the left/earlier operand, `b` the
/// right/later one, regardless of which mode called it.
fn apply_binary(op: BinOp, a: Value, b: Value) -> Result<Value, KapilaError> {
    if op.is_comparison() {
        return apply_comparison(op, a, b);
    }
    match promote(&a, &b)? {
        Numeric::Int(x, y) => match op {
            BinOp::Add => Ok(Value::Int(x + y)),
            BinOp::Sub => Ok(Value::Int(x - y)),
            BinOp::Mul => Ok(Value::Int(x * y)),
            BinOp::Div => {
                if y == 0 {
                    return Err(div_by_zero());
                }
                Ok(Value::Float(x as f64 / y as f64))
            }
            BinOp::Mod => {
                if y == 0 {
                    return Err(div_by_zero());
                }
                Ok(Value::Int(x.rem_euclid(y)))
            }
            _ => unreachable!(),
        },
        Numeric::Float(x, y) => match op {
            BinOp::Add => Ok(Value::Float(x + y)),
            BinOp::Sub => Ok(Value::Float(x - y)),
            BinOp::Mul => Ok(Value::Float(x * y)),
            BinOp::Div => {
                if y == 0.0 {
                    return Err(div_by_zero());
                }
                Ok(Value::Float(x / y))
            }
            BinOp::Mod => {
                if y == 0.0 {
                    return Err(div_by_zero());
                }
                Ok(Value::Float(x % y))
            }
            _ => unreachable!(),
        },
    }
}

fn div_by_zero() -> KapilaError {
    KapilaError::runtime("ಶೂನ್ಯದಿಂದ ಭಾಗಾಕಾರ ಸಾಧ್ಯವಿಲ್ಲ")
}

fn apply_comparison(op: BinOp, a: Value, b: Value) -> Result<Value, KapilaError> {
    let ordering = match (&a, &b) {
        (Value::Str(x), Value::Str(y)) => {
            return Ok(Value::Bool(match op {
                BinOp::Eq => x == y,
                BinOp::Neq => x != y,
                _ => {
                    return Err(KapilaError::runtime(
                        "ಪಠ್ಯಗಳನ್ನು < > <= >= ಮೂಲಕ ಹೋಲಿಸಲಾಗುವುದಿಲ್ಲ",
                    ))
                }
            }))
        }
        (Value::Bool(x), Value::Bool(y)) => {
            return Ok(Value::Bool(match op {
                BinOp::Eq => x == y,
                BinOp::Neq => x != y,
                _ => {
                    return Err(KapilaError::runtime(
                        "ಬೂಲಿಯನ್‌ಗಳನ್ನು < > <= >= ಮೂಲಕ ಹೋಲಿಸಲಾಗುವುದಿಲ್ಲ",
                    ))
                }
            }))
        }
        _ => promote(&a, &b)?,
    };
    let cmp = match ordering {
        Numeric::Int(x, y) => x.partial_cmp(&y),
        Numeric::Float(x, y) => x.partial_cmp(&y),
    };
    let Some(cmp) = cmp else {
        return Err(KapilaError::runtime("ಹೋಲಿಕೆ ವಿಫಲವಾಯಿತು (NaN)"));
    };
    use std::cmp::Ordering::*;
    Ok(Value::Bool(match op {
        BinOp::Eq => cmp == Equal,
        BinOp::Neq => cmp != Equal,
        BinOp::Lt => cmp == Less,
        BinOp::Gt => cmp == Greater,
        BinOp::Lte => cmp != Greater,
        BinOp::Gte => cmp != Less,
        _ => unreachable!(),
    }))
}

/// Whether tokens of this kind can never start a value-producing
/// expression at all — used to decide when the postfix-absorption loop
/// should stop rather than spin.
fn starts_statement_boundary(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Eof | TokenKind::Dot)
}

impl<'a> Vm<'a> {
    pub fn new(tokens: Vec<Token>, out: &'a mut dyn Write) -> Self {
        Self {
            stack: Vec::new(),
            words: HashMap::new(),
            variables: HashMap::new(),
            tokens,
            pos: 0,
            out,
        }
    }

    /// A `Vm` with nothing fed to it yet, besides the lone `Eof` every
    /// cursor needs at construction — the REPL's starting point, which
    /// then calls [`Vm::feed`] once per submitted line (spec §6).
    pub fn new_empty(out: &'a mut dyn Write) -> Self {
        Self::new(vec![Token::new(TokenKind::Eof, "", crate::lexer::Span::dummy())], out)
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Append one more line's worth of tokens to the cursor (dropping the
    /// stale trailing `Eof`), so a REPL can keep reusing the same `Vm` —
    /// and therefore the same stack/dictionary/variables — across
    /// submissions (spec §3 "Lifecycle": user words persist until the
    /// session ends). `new_tokens` must itself end in `Eof`, as produced
    /// by [`crate::lexer::Lexer::tokenize_all`].
    pub fn feed(&mut self, new_tokens: Vec<Token>) {
        if matches!(self.tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            self.tokens.pop();
        }
        self.tokens.extend(new_tokens);
    }

    /// Empty the operand stack (REPL `clear` dot-command, spec §6).
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(|s| s.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    // -- cursor helpers --------------------------------------------------

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().expect("tokens never empty"))
    }

    fn peek_next_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check_word_then(&self, kind: TokenKind) -> bool {
        self.check(TokenKind::Word) && self.peek_next_kind() == Some(kind)
    }

    fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    fn pop(&mut self) -> Result<Value, KapilaError> {
        self.stack
            .pop()
            .ok_or_else(|| KapilaError::runtime("ಸ್ಟ್ಯಾಕ್ ಖಾಲಿಯಾಗಿದೆ (stack underflow)"))
    }

    fn pop_int(&mut self) -> Result<i64, KapilaError> {
        match self.pop()? {
            Value::Int(i) => Ok(i),
            other => Err(KapilaError::runtime(format!(
                "ಪೂರ್ಣಾಂಕ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು {}",
                other.type_name()
            ))),
        }
    }

    fn pop_bool(&mut self) -> Result<bool, KapilaError> {
        match self.pop()? {
            Value::Bool(b) => Ok(b),
            other => Err(KapilaError::runtime(format!(
                "ಬೂಲಿಯನ್ ಮೌಲ್ಯ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು {}",
                other.type_name()
            ))),
        }
    }

    fn pop_list(&mut self) -> Result<std::rc::Rc<Vec<Value>>, KapilaError> {
        match self.pop()? {
            Value::List(l) => Ok(l),
            other => Err(KapilaError::runtime(format!(
                "ಪಟ್ಟಿ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು {}",
                other.type_name()
            ))),
        }
    }

    fn pop_block(&mut self) -> Result<std::rc::Rc<Block>, KapilaError> {
        match self.pop()? {
            Value::Block(b) => Ok(b),
            other => Err(KapilaError::runtime(format!(
                "ಬ್ಲಾಕ್ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು {}",
                other.type_name()
            ))),
        }
    }

    // -- top-level driver -------------------------------------------------

    /// Run the whole program: a sequence of word definitions, variable
    /// assignments, and expression statements (spec §4.3 statement
    /// dispatch, executed directly rather than via the parsed AST).
    pub fn run(&mut self) -> Result<(), KapilaError> {
        while !self.at_end() {
            if self.check_word_then(TokenKind::Colon) {
                self.define_word()?;
            } else if self.check_word_then(TokenKind::Assign) {
                self.assign_variable()?;
            } else {
                self.exec_statement()?;
            }
        }
        Ok(())
    }

    fn define_word(&mut self) -> Result<(), KapilaError> {
        let name = self.advance().lexeme; // word name
        self.advance(); // ':'
        let params = self.try_parse_params();
        let tokens = self.collect_until(|k| k == TokenKind::DefEnd, true);
        self.words.insert(name, Block { tokens, params });
        Ok(())
    }

    fn assign_variable(&mut self) -> Result<(), KapilaError> {
        let name = self.advance().lexeme; // var name
        self.advance(); // ':='
        let value = self.parse_ternary()?.ok_or_else(|| {
            KapilaError::runtime("ಚರ ನಿಯೋಜನೆಗೆ ಮೌಲ್ಯ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು")
        })?;
        self.variables.insert(name, value);
        if self.check(TokenKind::Dot) {
            self.advance();
        }
        Ok(())
    }

    /// Look for an optional `name name ... |` parameter prefix at the
    /// current position (shared by word-definition bodies and block
    /// literals, spec §3/§9 "parameter binding as destructuring").
    fn try_parse_params(&mut self) -> Vec<String> {
        let save = self.pos;
        let mut names = Vec::new();
        while self.check(TokenKind::Word) {
            names.push(self.current().lexeme.clone());
            self.pos += 1;
        }
        if !names.is_empty() && self.check(TokenKind::Pipe) {
            self.advance();
            names
        } else {
            self.pos = save;
            Vec::new()
        }
    }

    /// Collect raw tokens up to (and consuming) the first token matching
    /// `is_terminator` seen at bracket-depth 0, tracking nested `[` `]`
    /// so literal blocks/lists inside a body don't confuse the scan.
    fn collect_until(&mut self, is_terminator: impl Fn(TokenKind) -> bool, stop_at_eof: bool) -> Vec<Token> {
        let mut out = Vec::new();
        let mut depth = 0i32;
        loop {
            let kind = self.current().kind;
            if kind == TokenKind::Eof {
                if stop_at_eof {
                    return out;
                }
                return out;
            }
            if depth == 0 && is_terminator(kind) {
                self.advance();
                return out;
            }
            if kind == TokenKind::LBracket {
                depth += 1;
            } else if kind == TokenKind::RBracket {
                depth -= 1;
            }
            out.push(self.advance());
        }
    }

    // -- expression-statement execution -----------------------------------

    /// One top-level statement's worth of "expr statement": repeatedly
    /// parse one value-producing unit (number/string/bracket/variable
    /// chained through infix operators) and push it, or execute one bare
    /// `Word` as a postfix action, until `.`, EOF, or the next statement
    /// boundary (spec §4.3 "greedily absorbs trailing Word tokens").
    fn exec_statement(&mut self) -> Result<(), KapilaError> {
        loop {
            if self.at_end() {
                break;
            }
            if self.check(TokenKind::Dot) {
                self.advance();
                break;
            }
            if self.check_word_then(TokenKind::Colon) || self.check_word_then(TokenKind::Assign) {
                break;
            }
            if self.check(TokenKind::Word) {
                let name = self.advance().lexeme;
                self.execute_word(&name)?;
                continue;
            }
            match self.parse_ternary()? {
                Some(v) => self.push(v),
                None => {
                    // Nothing recognisable as a value or a word: avoid
                    // spinning forever on a token neither side consumes.
                    if starts_statement_boundary(self.current().kind) {
                        break;
                    }
                    return Err(KapilaError::parse(
                        format!("ಅನಿರೀಕ್ಷಿತ ಟೋಕನ್: {}", self.current().lexeme),
                        self.current().span.into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Run a block's body directly against `self`'s single shared token
    /// cursor by temporarily swapping in the block's own tokens, so
    /// nested block literals inside it still get parsed the normal way.
    fn execute_block(&mut self, block: &Block) -> Result<(), KapilaError> {
        // Params shadow any outer variable of the same name for the
        // duration of the block and must be restored (or removed, if
        // there was nothing to restore) on every exit path, including
        // errors (spec §4.4 "parameters are isolated per invocation").
        let mut shadowed: Vec<(String, Option<Value>)> = Vec::with_capacity(block.params.len());
        for name in block.params.iter().rev() {
            let val = self.pop()?;
            shadowed.push((name.clone(), self.variables.insert(name.clone(), val)));
        }

        let saved_tokens = std::mem::replace(&mut self.tokens, block.tokens.clone());
        let saved_pos = std::mem::replace(&mut self.pos, 0);
        let result = self.run_block_body();
        self.tokens = saved_tokens;
        self.pos = saved_pos;

        for (name, prev) in shadowed {
            match prev {
                Some(v) => {
                    self.variables.insert(name, v);
                }
                None => {
                    self.variables.remove(&name);
                }
            }
        }

        result
    }

    /// Pure postfix execution of `self.tokens` (set up by `execute_block`)
    /// until EOF: every token pushes or acts, no infix precedence.
    fn run_block_body(&mut self) -> Result<(), KapilaError> {
        while !self.at_end() {
            let tok = self.advance();
            match tok.kind {
                TokenKind::Number => self.push(number_value(&tok)),
                TokenKind::String => self.push(string_value(&tok)),
                TokenKind::LBracket => {
                    let v = self.parse_bracket_value()?;
                    self.push(v);
                }
                TokenKind::LBrace => {
                    let v = self.parse_map_literal()?;
                    self.push(v);
                }
                TokenKind::Quote => {
                    let name = self.expect_word_for_quote()?;
                    self.push(Value::Symbol(std::rc::Rc::from(name.as_str())));
                }
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Eq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Lte
                | TokenKind::Gte => {
                    let op = BinOp::from_token(tok.kind).expect("matched above");
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.push(apply_binary(op, a, b)?);
                }
                TokenKind::Question => {
                    let cond = self.pop_bool()?;
                    let then_blk = self.parse_forced_block()?;
                    let else_blk = if self.check(TokenKind::LBracket) {
                        Some(self.parse_forced_block()?)
                    } else {
                        None
                    };
                    if cond {
                        self.execute_block(&then_blk)?;
                    } else if let Some(eb) = else_blk {
                        self.execute_block(&eb)?;
                    }
                }
                TokenKind::Word => self.execute_word(&tok.lexeme)?,
                TokenKind::Dot => {}
                other => {
                    return Err(KapilaError::runtime(format!(
                        "ಬ್ಲಾಕ್‌ನಲ್ಲಿ ಅನಿರೀಕ್ಷಿತ ಟೋಕನ್: {other:?}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Resolve and execute a bare word (spec §4.4 "word resolution order,
    /// block mode"): boolean literal, then variable, then built-in, then
    /// user word, then error.
    fn execute_word(&mut self, name: &str) -> Result<(), KapilaError> {
        if vocabulary::is_true_word(name) {
            self.push(Value::Bool(true));
            return Ok(());
        }
        if vocabulary::is_false_word(name) {
            self.push(Value::Bool(false));
            return Ok(());
        }
        if let Some(v) = self.variables.get(name).cloned() {
            self.push(v);
            return Ok(());
        }
        if let Some(canon) = vocabulary::resolve_builtin(name) {
            return builtins::call(self, canon);
        }
        if let Some(sym) = vocabulary::resolve_operator_word(name) {
            let op = BinOp::from_symbol(sym).expect("resolve_operator_word yields a known symbol");
            let b = self.pop()?;
            let a = self.pop()?;
            self.push(apply_binary(op, a, b)?);
            return Ok(());
        }
        if let Some(block) = self.words.get(name).cloned() {
            return self.execute_block(&block);
        }
        Err(KapilaError::runtime(format!("ಅಪರಿಚಿತ ಶಬ್ದ: {name}")))
    }

    // -- infix expression ladder (spec §4.3 precedence chain) -------------

    /// `cond ? [then] [else]?` sits at the bottom of precedence. Per
    /// spec §4.4, the ternary itself yields no infix value: it evaluates
    /// `cond`, runs the chosen branch in block mode for its side
    /// effects, and the expression statement moves on.
    fn parse_ternary(&mut self) -> Result<Option<Value>, KapilaError> {
        let Some(cond) = self.parse_or()? else {
            return Ok(None);
        };
        if self.check(TokenKind::Question) {
            self.advance();
            let cond = cond.as_bool().ok_or_else(|| {
                KapilaError::runtime(format!(
                    "ಷರತ್ತು ಬೂಲಿಯನ್ ಆಗಿರಬೇಕು, ಸಿಕ್ಕಿದ್ದು {}",
                    cond.type_name()
                ))
            })?;
            let then_blk = self.parse_forced_block()?;
            let else_blk = if self.check(TokenKind::LBracket) {
                Some(self.parse_forced_block()?)
            } else {
                None
            };
            if cond {
                self.execute_block(&then_blk)?;
            } else if let Some(eb) = else_blk {
                self.execute_block(&eb)?;
            }
            return Ok(None);
        }
        Ok(Some(cond))
    }

    fn parse_or(&mut self) -> Result<Option<Value>, KapilaError> {
        let Some(mut left) = self.parse_and()? else {
            return Ok(None);
        };
        while self.check(TokenKind::Word) && vocabulary::is_or_word(&self.current().lexeme) {
            self.advance();
            let rhs = self.require_and()?;
            left = apply_logic_or(left, rhs)?;
        }
        Ok(Some(left))
    }

    fn require_and(&mut self) -> Result<Value, KapilaError> {
        self.parse_and()?.ok_or_else(|| self.expected_operand())
    }

    fn parse_and(&mut self) -> Result<Option<Value>, KapilaError> {
        let Some(mut left) = self.parse_comparison()? else {
            return Ok(None);
        };
        while self.check(TokenKind::Word) && vocabulary::is_and_word(&self.current().lexeme) {
            self.advance();
            let rhs = self.require_comparison()?;
            left = apply_logic_and(left, rhs)?;
        }
        Ok(Some(left))
    }

    fn require_comparison(&mut self) -> Result<Value, KapilaError> {
        self.parse_comparison()?.ok_or_else(|| self.expected_operand())
    }

    fn parse_comparison(&mut self) -> Result<Option<Value>, KapilaError> {
        let Some(mut left) = self.parse_additive()? else {
            return Ok(None);
        };
        while let Some(op) = BinOp::from_token(self.current().kind).filter(|o| o.is_comparison()) {
            self.advance();
            let rhs = self.require_additive()?;
            left = apply_binary(op, left, rhs)?;
        }
        Ok(Some(left))
    }

    fn require_additive(&mut self) -> Result<Value, KapilaError> {
        self.parse_additive()?.ok_or_else(|| self.expected_operand())
    }

    fn parse_additive(&mut self) -> Result<Option<Value>, KapilaError> {
        let Some(mut left) = self.parse_multiplicative()? else {
            return Ok(None);
        };
        while let Some(op) = BinOp::from_token(self.current().kind).filter(|o| o.is_additive()) {
            self.advance();
            let rhs = self.require_multiplicative()?;
            left = apply_binary(op, left, rhs)?;
        }
        Ok(Some(left))
    }

    fn require_multiplicative(&mut self) -> Result<Value, KapilaError> {
        self.parse_multiplicative()?.ok_or_else(|| self.expected_operand())
    }

    fn parse_multiplicative(&mut self) -> Result<Option<Value>, KapilaError> {
        let Some(mut left) = self.parse_unary()? else {
            return Ok(None);
        };
        while let Some(op) = BinOp::from_token(self.current().kind).filter(|o| o.is_multiplicative()) {
            self.advance();
            let rhs = self.require_unary()?;
            left = apply_binary(op, left, rhs)?;
        }
        Ok(Some(left))
    }

    fn require_unary(&mut self) -> Result<Value, KapilaError> {
        self.parse_unary()?.ok_or_else(|| self.expected_operand())
    }

    fn parse_unary(&mut self) -> Result<Option<Value>, KapilaError> {
        if self.check(TokenKind::Minus) {
            self.advance();
            let operand = self.require_unary_for_minus()?;
            return Ok(Some(negate(operand)?));
        }
        if self.check(TokenKind::Word) && vocabulary::is_not_word(&self.current().lexeme) {
            self.advance();
            let operand = self.require_unary_for_minus()?;
            let b = operand.as_bool().ok_or_else(|| {
                KapilaError::runtime(format!(
                    "'not' ಗೆ ಬೂಲಿಯನ್ ಬೇಕು, ಸಿಕ್ಕಿದ್ದು {}",
                    operand.type_name()
                ))
            })?;
            return Ok(Some(Value::Bool(!b)));
        }
        self.parse_primary()
    }

    fn require_unary_for_minus(&mut self) -> Result<Value, KapilaError> {
        self.parse_unary()?.ok_or_else(|| self.expected_operand())
    }

    /// Infix primary (spec §4.4): variable, then boolean literal, else
    /// "not a value" — the word is left unconsumed so the caller can try
    /// it as a postfix action instead.
    fn parse_primary(&mut self) -> Result<Option<Value>, KapilaError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Some(number_value(&tok)))
            }
            TokenKind::String => {
                self.advance();
                Ok(Some(string_value(&tok)))
            }
            TokenKind::LBracket => {
                self.advance();
                Ok(Some(self.parse_bracket_value()?))
            }
            TokenKind::LBrace => {
                self.advance();
                Ok(Some(self.parse_map_literal()?))
            }
            TokenKind::Quote => {
                self.advance();
                let name = self.expect_word_for_quote()?;
                Ok(Some(Value::Symbol(std::rc::Rc::from(name.as_str()))))
            }
            TokenKind::Word => {
                if let Some(v) = self.variables.get(&tok.lexeme).cloned() {
                    self.advance();
                    return Ok(Some(v));
                }
                if vocabulary::is_true_word(&tok.lexeme) {
                    self.advance();
                    return Ok(Some(Value::Bool(true)));
                }
                if vocabulary::is_false_word(&tok.lexeme) {
                    self.advance();
                    return Ok(Some(Value::Bool(false)));
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn expected_operand(&self) -> KapilaError {
        KapilaError::parse(
            format!("ಆಪರೇಟರ್ ನಂತರ ಮೌಲ್ಯ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು '{}'", self.current().lexeme),
            self.current().span.into(),
        )
    }

    fn expect_word_for_quote(&mut self) -> Result<String, KapilaError> {
        if self.check(TokenKind::Word) {
            Ok(self.advance().lexeme)
        } else {
            Err(KapilaError::parse(
                "' ನಂತರ ಶಬ್ದ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು",
                self.current().span.into(),
            ))
        }
    }

    // -- brackets: list vs. block disambiguation (spec §4.3) ---------------

    /// Current position is right after the opening `[`. Classify and
    /// parse the bracketed value, consuming up to and including the
    /// matching `]`.
    fn parse_bracket_value(&mut self) -> Result<Value, KapilaError> {
        if self.bracket_is_block() {
            let params = self.try_parse_params();
            let tokens = self.collect_until(|k| k == TokenKind::RBracket, false);
            Ok(Value::Block(std::rc::Rc::new(Block { tokens, params })))
        } else {
            let mut items = Vec::new();
            while !self.check(TokenKind::RBracket) && !self.at_end() {
                items.push(self.parse_list_item()?);
            }
            if self.check(TokenKind::RBracket) {
                self.advance();
            }
            Ok(Value::list(items))
        }
    }

    /// Ternary branches (and blocks invoked by higher-order built-ins
    /// via an already-popped `Value::Block`) are always literal `[...]`
    /// blocks, never lists — parse unconditionally as a block.
    fn parse_forced_block(&mut self) -> Result<Block, KapilaError> {
        if !self.check(TokenKind::LBracket) {
            return Err(KapilaError::parse(
                "'[' ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು (ಷರತ್ತಿನ ಬ್ಲಾಕ್)",
                self.current().span.into(),
            ));
        }
        self.advance();
        let params = self.try_parse_params();
        let tokens = self.collect_until(|k| k == TokenKind::RBracket, false);
        Ok(Block { tokens, params })
    }

    fn parse_list_item(&mut self) -> Result<Value, KapilaError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                Ok(number_value(&tok))
            }
            TokenKind::String => {
                self.advance();
                Ok(string_value(&tok))
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_bracket_value()
            }
            TokenKind::LBrace => {
                self.advance();
                self.parse_map_literal()
            }
            TokenKind::Quote => {
                self.advance();
                let name = self.expect_word_for_quote()?;
                Ok(Value::Symbol(std::rc::Rc::from(name.as_str())))
            }
            _ => {
                // Tolerant of stray punctuation inside list literals, same
                // spirit as map-literal tolerance (spec §4.3).
                self.advance();
                self.parse_list_item()
            }
        }
    }

    /// Depth-tracked lookahead (spec §4.3): the bracket denotes a Block
    /// if a Word (other than a boolean keyword), a `|`, or an operator
    /// token appears at depth 1; otherwise it's a List.
    fn bracket_is_block(&self) -> bool {
        let mut depth = 0i32;
        let mut i = self.pos;
        loop {
            let Some(tok) = self.tokens.get(i) else { return false };
            match tok.kind {
                TokenKind::Eof => return false,
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::Word if depth == 0 && !vocabulary::is_boolean_word(&tok.lexeme) => {
                    return true
                }
                TokenKind::Pipe if depth == 0 => return true,
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Eq
                | TokenKind::Neq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Lte
                | TokenKind::Gte
                    if depth == 0 =>
                {
                    return true
                }
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_map_literal(&mut self) -> Result<Value, KapilaError> {
        let mut entries = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            if self.check(TokenKind::Word) {
                let key = self.advance().lexeme;
                if self.check(TokenKind::Colon) {
                    self.advance();
                }
                let value = self.parse_ternary()?.ok_or_else(|| {
                    KapilaError::parse(
                        format!("ನಕ್ಷೆ ಕೀಲಿ '{key}' ಗೆ ಮೌಲ್ಯ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು"),
                        self.current().span.into(),
                    )
                })?;
                entries.push((key, value));
            } else {
                // Stray punctuation between entries is tolerated.
                self.advance();
            }
        }
        if self.check(TokenKind::RBrace) {
            self.advance();
        }
        Ok(Value::map(entries))
    }

    // -- higher-order built-in helpers, shared with `builtins` -------------

    pub(crate) fn call_block_with_value(&mut self, block: &Block, v: Value) -> Result<Value, KapilaError> {
        self.push(v);
        self.execute_block(block)?;
        self.pop()
    }

    pub(crate) fn call_block(&mut self, block: &Block) -> Result<(), KapilaError> {
        self.execute_block(block)
    }

    pub(crate) fn write_line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }
}

fn number_value(tok: &Token) -> Value {
    match &tok.literal {
        Some(crate::lexer::Literal::Int(i)) => Value::Int(*i),
        Some(crate::lexer::Literal::Float(f)) => Value::Float(*f),
        _ => Value::Int(0),
    }
}

fn string_value(tok: &Token) -> Value {
    match &tok.literal {
        Some(crate::lexer::Literal::Str(s)) => Value::str(s.clone()),
        _ => Value::str(""),
    }
}

fn negate(v: Value) -> Result<Value, KapilaError> {
    match v {
        Value::Int(i) => Ok(Value::Int(-i)),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(KapilaError::runtime(format!(
            "ಏಕಮಾನ '-' ಗೆ ಸಂಖ್ಯೆ ಬೇಕು, ಸಿಕ್ಕಿದ್ದು {}",
            other.type_name()
        ))),
    }
}

fn apply_logic_and(a: Value, b: Value) -> Result<Value, KapilaError> {
    let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) else {
        return Err(KapilaError::runtime("'and' ಗೆ ಬೂಲಿಯನ್ ಮೌಲ್ಯಗಳು ಬೇಕು"));
    };
    Ok(Value::Bool(x && y))
}

fn apply_logic_or(a: Value, b: Value) -> Result<Value, KapilaError> {
    let (Some(x), Some(y)) = (a.as_bool(), b.as_bool()) else {
        return Err(KapilaError::runtime("'or' ಗೆ ಬೂಲಿಯನ್ ಮೌಲ್ಯಗಳು ಬೇಕು"));
    };
    Ok(Value::Bool(x || y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn run_str(src: &str) -> String {
        let tokens = Lexer::tokenize_all(src);
        let mut out = Vec::new();
        let mut vm = Vm::new(tokens, &mut out);
        vm.run().expect("program should run");
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn simple_addition_and_print() {
        assert_eq!(run_str("೫ ೩ ಕೂಡು ಮುದ್ರಿಸು."), "8\n");
    }

    #[test]
    fn map_then_fold() {
        assert_eq!(
            run_str("[ ೧ ೨ ೩ ] [ dup * ] ನಕ್ಷೆ  ೦ [ + ] ಮಡಿಸು  ಮುದ್ರಿಸು."),
            "14\n"
        );
    }

    #[test]
    fn swap_swap_is_identity() {
        let tokens = Lexer::tokenize_all("೧ ೨ swap swap");
        let mut out = Vec::new();
        let mut vm = Vm::new(tokens, &mut out);
        vm.run().unwrap();
        assert!(matches!(vm.stack(), [Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn division_of_ints_yields_float() {
        let tokens = Lexer::tokenize_all("೧ ೨ /");
        let mut out = Vec::new();
        let mut vm = Vm::new(tokens, &mut out);
        vm.run().unwrap();
        assert!(matches!(vm.stack(), [Value::Float(f)] if (*f - 0.5).abs() < 1e-9));
    }

    #[test]
    fn division_by_zero_is_runtime_error() {
        let tokens = Lexer::tokenize_all("೧ ೦ /");
        let mut out = Vec::new();
        let mut vm = Vm::new(tokens, &mut out);
        assert!(vm.run().is_err());
    }

    #[test]
    fn unknown_word_is_runtime_error() {
        let tokens = Lexer::tokenize_all("ಅಜ್ಞಾತಶಬ್ದ");
        let mut out = Vec::new();
        let mut vm = Vm::new(tokens, &mut out);
        assert!(vm.run().is_err());
    }

    #[test]
    fn word_definition_and_call() {
        assert_eq!(run_str("ವರ್ಗ: ನಕಲು ಗುಣಿಸು ॥ ೫ ವರ್ಗ ಮುದ್ರಿಸು."), "25\n");
    }

    #[test]
    fn variable_assignment_isolated_per_block_param() {
        // A block param shadows an outer variable of the same name for
        // the block's dynamic extent and the outer binding is restored
        // (not dropped) once the block returns.
        let tokens = Lexer::tokenize_all("x := ೧. ೯ [ x | x ] do drop x ಮುದ್ರಿಸು.");
        let mut out = Vec::new();
        let mut vm = Vm::new(tokens, &mut out);
        vm.run().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n");
    }

    #[test]
    fn comma_word_concatenates_strings() {
        assert_eq!(run_str(r#""ಕ" "ಮಲ" , ಮುದ್ರಿಸು."#), "ಕಮಲ\n");
    }

    #[test]
    fn comparison_operator_word_alias() {
        assert_eq!(run_str("೫ ೩ ಹಿರಿದು ಮುದ್ರಿಸು."), "ಸರಿ\n");
        assert_eq!(run_str("೫ ೩ ಕಿರಿದು ಮುದ್ರಿಸು."), "ತಪ್ಪು\n");
    }

    #[test]
    fn subtraction_and_division_operator_word_aliases() {
        assert_eq!(run_str("೧೦ ೪ ಕಳೆ ಮುದ್ರಿಸು."), "6\n");
        assert_eq!(run_str("೯ ೩ ಭಾಗಿಸು ಮುದ್ರಿಸು."), "3\n");
    }
}
