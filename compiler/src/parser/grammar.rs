//! Recursive-descent parser (component C, spec §4.3). Used by the code
//! generator and the canonical printer — the VM re-scans tokens directly
//! and never builds this tree (spec §4.4).

use super::ast::*;
use crate::lexer::{Literal, Token, TokenKind};

/// A single parse diagnostic: message plus the offending token's span.
/// Collected rather than raised, so one bad statement doesn't abort the
/// rest of the file (spec §4.3, §7).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: crate::lexer::Span,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
}

type PResult<T> = Result<T, ParseError>;

const AND_WORDS: [&str; 2] = ["and", "ಮತ್ತು"];
const OR_WORDS: [&str; 2] = ["or", "ಅಥವಾ"];
const NOT_WORDS: [&str; 2] = ["not", "ಅಲ್ಲ"];
const TRUE_WORDS: [&str; 3] = ["true", "ನಿಜ", "ಹೌದು"];
const FALSE_WORDS: [&str; 4] = ["false", "ಸುಳ್ಳು", "ಬೇಸ", "ಇಲ್ಲ"];

fn is_boolean_word(w: &str) -> bool {
    TRUE_WORDS.contains(&w) || FALSE_WORDS.contains(&w) || w == "ಸರಿ" || w == "ತಪ್ಪು"
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, errors: Vec::new() }
    }

    /// Parse the whole token stream into a [`Program`] plus whatever
    /// [`ParseError`]s panic-mode recovery collected along the way.
    pub fn parse(mut self) -> (Program, Vec<ParseError>) {
        let mut program = Vec::new();
        while !self.at_end() {
            match self.parse_stmt() {
                Ok(stmt) => program.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.recover();
                }
            }
        }
        (program, self.errors)
    }

    /// Panic-mode recovery (spec §4.3): advance past the next `.` or
    /// `॥`, or stop early at the start of the next `name :` definition.
    fn recover(&mut self) {
        while !self.at_end() {
            if self.check_word_then(TokenKind::Colon) {
                return;
            }
            let tok = self.advance();
            if matches!(tok.kind, TokenKind::Dot | TokenKind::DefEnd) {
                return;
            }
        }
    }

    // -- cursor helpers ----------------------------------------------------

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| self.tokens.last().expect("never empty"))
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

    fn check_word_then(&self, kind: TokenKind) -> bool {
        self.check(TokenKind::Word) && self.peek_next_kind() == Some(kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("{what} ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು '{}'", self.current().lexeme)))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError { message: message.into(), span: self.current().span }
    }

    // -- statement dispatch (spec §4.3) -------------------------------------

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        if self.check_word_then(TokenKind::Colon) {
            self.parse_word_def()
        } else if self.check_word_then(TokenKind::Assign) {
            self.parse_var_assign()
        } else {
            self.parse_expr_stmt()
        }
    }

    fn parse_word_def(&mut self) -> PResult<Stmt> {
        let name = self.advance().lexeme;
        self.advance(); // ':'
        let params = self.try_parse_params();
        let mut body = Vec::new();
        while !self.check(TokenKind::DefEnd) && !self.at_end() {
            body.push(self.parse_raw_node()?);
        }
        if self.check(TokenKind::DefEnd) {
            self.advance();
        }
        // A missing `॥` at EOF is tolerated (spec §4.3).
        Ok(Stmt::WordDef { name, params, body })
    }

    fn parse_var_assign(&mut self) -> PResult<Stmt> {
        let name = self.advance().lexeme;
        self.advance(); // ':='
        let value = self.parse_ternary()?;
        if self.check(TokenKind::Dot) {
            self.advance();
        }
        Ok(Stmt::VarAssign { name, value })
    }

    /// Infix expression, then greedy postfix-action absorption, then an
    /// optional `.` (spec §4.3 "Expression statement").
    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let mut value = self.parse_ternary()?;
        let mut actions = Vec::new();
        loop {
            if self.check(TokenKind::Dot) {
                self.advance();
                break;
            }
            if self.check(TokenKind::Word) {
                // A trailing word immediately followed by `:` or `:=`
                // belongs to the *next* statement, not this action chain.
                if self.peek_next_kind() == Some(TokenKind::Colon)
                    || self.peek_next_kind() == Some(TokenKind::Assign)
                {
                    break;
                }
                actions.push(self.advance().lexeme);
                continue;
            }
            break;
        }
        if !actions.is_empty() {
            value = Expr::PostfixAction { value: Box::new(value), actions };
        }
        Ok(Stmt::ExprStmt { expr: value })
    }

    /// Parameter prefix shared by word-definition bodies and block
    /// literals: `name name ... |` (spec §4.3, §9).
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

    // -- infix precedence ladder (spec §4.3, low to high) -------------------

    fn parse_ternary(&mut self) -> PResult<Expr> {
        let cond = self.parse_or()?;
        if self.check(TokenKind::Question) {
            self.advance();
            let then_block = self.parse_forced_block()?;
            let else_block = if self.check(TokenKind::LBracket) {
                Some(self.parse_forced_block()?)
            } else {
                None
            };
            return Ok(Expr::Conditional { cond: Box::new(cond), then_block, else_block });
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Word) && OR_WORDS.contains(&self.current().lexeme.as_str()) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::LogicExpr { op: LogicOp::Or, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.check(TokenKind::Word) && AND_WORDS.contains(&self.current().lexeme.as_str()) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::LogicExpr { op: LogicOp::And, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        while let Some(op) = OpKind::from_token_kind(self.current().kind).filter(|o| is_comparison(*o)) {
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::BinaryExpr { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = OpKind::from_token_kind(self.current().kind).filter(|o| matches!(o, OpKind::Add | OpKind::Sub)) {
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryExpr { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(op) = OpKind::from_token_kind(self.current().kind)
            .filter(|o| matches!(o, OpKind::Mul | OpKind::Div | OpKind::Mod))
        {
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::BinaryExpr { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.check(TokenKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryExpr { op: UnaryOpKind::Neg, operand: Box::new(operand) });
        }
        if self.check(TokenKind::Word) && NOT_WORDS.contains(&self.current().lexeme.as_str()) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryExpr { op: UnaryOpKind::Not, operand: Box::new(operand) });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Expr::NumberLit(number_lit(&tok)))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::StringLit(string_lit(&tok)))
            }
            TokenKind::LBracket => self.parse_bracket_value(),
            TokenKind::LBrace => self.parse_map_literal(),
            TokenKind::Quote => {
                self.advance();
                let name = self.expect(TokenKind::Word, "' ನಂತರ ಶಬ್ದ")?.lexeme;
                Ok(Expr::QuotedWord(name))
            }
            TokenKind::Word => {
                if TRUE_WORDS.contains(&tok.lexeme.as_str()) || tok.lexeme == "ಸರಿ" {
                    self.advance();
                    return Ok(Expr::BoolLit(true));
                }
                if FALSE_WORDS.contains(&tok.lexeme.as_str()) || tok.lexeme == "ತಪ್ಪು" {
                    self.advance();
                    return Ok(Expr::BoolLit(false));
                }
                self.advance();
                Ok(Expr::Word(tok.lexeme))
            }
            _ => Err(self.error(format!("ಮೌಲ್ಯ ನಿರೀಕ್ಷಿಸಲಾಗಿತ್ತು, ಸಿಕ್ಕಿದ್ದು '{}'", tok.lexeme))),
        }
    }

    // -- bracket disambiguation (spec §4.3) ---------------------------------

    /// Classify the `[...]` starting at the current position: a Block if
    /// any Word (other than a boolean keyword), `|`, or operator token
    /// appears at depth 1; a List literal otherwise. No backtracking is
    /// needed beyond resetting the cursor after this scan.
    fn bracket_is_block(&self) -> bool {
        let mut depth = 0i32;
        let mut i = self.pos; // positioned at `[`
        loop {
            let Some(tok) = self.tokens.get(i) else { return false };
            match tok.kind {
                TokenKind::Eof => return false,
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return false;
                    }
                }
                TokenKind::Word if depth == 1 && !is_boolean_word(&tok.lexeme) => return true,
                TokenKind::Pipe if depth == 1 => return true,
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
                    if depth == 1 =>
                {
                    return true
                }
                _ => {}
            }
            i += 1;
        }
    }

    fn parse_bracket_value(&mut self) -> PResult<Expr> {
        if self.bracket_is_block() {
            Ok(Expr::Block(self.parse_forced_block()?))
        } else {
            self.advance(); // '['
            let mut items = Vec::new();
            while !self.check(TokenKind::RBracket) && !self.at_end() {
                items.push(self.parse_list_item()?);
            }
            if self.check(TokenKind::RBracket) {
                self.advance();
            }
            Ok(Expr::ListLit(items))
        }
    }

    /// Ternary branches are always literal `[...]` blocks, never lists.
    fn parse_forced_block(&mut self) -> PResult<RawBlock> {
        self.expect(TokenKind::LBracket, "'['")?;
        let params = self.try_parse_params();
        let mut body = Vec::new();
        while !self.check(TokenKind::RBracket) && !self.at_end() {
            body.push(self.parse_raw_node()?);
        }
        if self.check(TokenKind::RBracket) {
            self.advance();
        }
        Ok(RawBlock { params, body })
    }

    fn parse_list_item(&mut self) -> PResult<Expr> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                Ok(Expr::NumberLit(number_lit(&tok)))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::StringLit(string_lit(&tok)))
            }
            TokenKind::LBracket => self.parse_bracket_value(),
            TokenKind::LBrace => self.parse_map_literal(),
            TokenKind::Quote => {
                self.advance();
                let name = self.expect(TokenKind::Word, "' ನಂತರ ಶಬ್ದ")?.lexeme;
                Ok(Expr::QuotedWord(name))
            }
            _ => {
                // Tolerant of stray punctuation, matching map-literal
                // tolerance (spec §4.3).
                self.advance();
                self.parse_list_item()
            }
        }
    }

    fn parse_map_literal(&mut self) -> PResult<Expr> {
        self.advance(); // '{'
        let mut entries = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            if self.check(TokenKind::Word) {
                let key = self.advance().lexeme;
                if self.check(TokenKind::Colon) {
                    self.advance();
                }
                let value = self.parse_ternary()?;
                entries.push((key, value));
            } else {
                self.advance();
            }
        }
        if self.check(TokenKind::RBrace) {
            self.advance();
        }
        Ok(Expr::MapLit(entries))
    }

    // -- raw (postfix) body node parsing (spec §4.3 "Word definition body")

    fn parse_raw_node(&mut self) -> PResult<AstNode> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Number => Ok(AstNode::Number(number_lit(&tok))),
            TokenKind::String => Ok(AstNode::Str(string_lit(&tok))),
            TokenKind::Word => Ok(AstNode::Word(tok.lexeme)),
            TokenKind::Question => Ok(AstNode::Question),
            TokenKind::Quote => {
                let name = self.expect(TokenKind::Word, "' ನಂತರ ಶಬ್ದ")?.lexeme;
                Ok(AstNode::QuotedWord(name))
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
            | TokenKind::Gte => Ok(AstNode::Op(OpKind::from_token_kind(tok.kind).expect("matched above"))),
            TokenKind::LBracket => self.parse_raw_bracket(),
            TokenKind::LBrace => self.parse_raw_map(),
            other => Err(ParseError {
                message: format!("ದೇಹದಲ್ಲಿ ಅನಿರೀಕ್ಷಿತ ಟೋಕನ್: {other:?}"),
                span: tok.span,
            }),
        }
    }

    /// Current position is right after the `[` that started this raw
    /// node (spec §4.3 "Brackets inside a body are recursively parsed
    /// by the same rule").
    fn parse_raw_bracket(&mut self) -> PResult<AstNode> {
        self.pos -= 1; // rewind onto '[' so bracket_is_block's scan is correct
        if self.bracket_is_block() {
            self.advance(); // '['
            let params = self.try_parse_params();
            let mut body = Vec::new();
            while !self.check(TokenKind::RBracket) && !self.at_end() {
                body.push(self.parse_raw_node()?);
            }
            if self.check(TokenKind::RBracket) {
                self.advance();
            }
            Ok(AstNode::Block(RawBlock { params, body }))
        } else {
            self.advance(); // '['
            let mut items = Vec::new();
            while !self.check(TokenKind::RBracket) && !self.at_end() {
                items.push(self.parse_raw_node()?);
            }
            if self.check(TokenKind::RBracket) {
                self.advance();
            }
            Ok(AstNode::List(items))
        }
    }

    fn parse_raw_map(&mut self) -> PResult<AstNode> {
        let mut entries = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            if self.check(TokenKind::Word) {
                let key = self.advance().lexeme;
                if self.check(TokenKind::Colon) {
                    self.advance();
                }
                let value = self.parse_raw_node()?;
                entries.push((key, value));
            } else {
                self.advance();
            }
        }
        if self.check(TokenKind::RBrace) {
            self.advance();
        }
        Ok(AstNode::Map(entries))
    }
}

fn is_comparison(op: OpKind) -> bool {
    matches!(op, OpKind::Eq | OpKind::Neq | OpKind::Lt | OpKind::Gt | OpKind::Lte | OpKind::Gte)
}

fn number_lit(tok: &Token) -> NumberLit {
    match &tok.literal {
        Some(Literal::Int(i)) => NumberLit::Int(*i),
        Some(Literal::Float(f)) => NumberLit::Float(*f),
        _ => NumberLit::Int(0),
    }
}

fn string_lit(tok: &Token) -> String {
    match &tok.literal {
        Some(Literal::Str(s)) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> (Program, Vec<ParseError>) {
        Parser::new(Lexer::tokenize_all(src)).parse()
    }

    #[test]
    fn precedence_multiplicative_binds_tighter_than_additive() {
        let (program, errors) = parse("೫ + ೩ * ೨.");
        assert!(errors.is_empty());
        match &program[0] {
            Stmt::ExprStmt { expr: Expr::BinaryExpr { op: OpKind::Add, left, right } } => {
                assert!(matches!(**left, Expr::NumberLit(NumberLit::Int(5))));
                assert!(matches!(**right, Expr::BinaryExpr { op: OpKind::Mul, .. }));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn bracket_list_vs_block() {
        let (program, _) = parse("[ ೧ ೨ ೩ ].");
        assert!(matches!(&program[0], Stmt::ExprStmt { expr: Expr::ListLit(items) } if items.len() == 3));

        let (program, _) = parse("[ dup * ].");
        assert!(matches!(&program[0], Stmt::ExprStmt { expr: Expr::Block(_) }));

        let (program, _) = parse("[ ೧ + ].");
        assert!(matches!(&program[0], Stmt::ExprStmt { expr: Expr::Block(_) }));
    }

    #[test]
    fn word_definition_body_is_raw() {
        let (program, errors) = parse("ವರ್ಗ: ನಕಲು ಗುಣಿಸು ॥");
        assert!(errors.is_empty());
        match &program[0] {
            Stmt::WordDef { name, body, .. } => {
                assert_eq!(name, "ವರ್ಗ");
                assert_eq!(body.len(), 2);
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn trailing_word_before_colon_is_not_absorbed() {
        let (program, errors) = parse("೫ ಮುದ್ರಿಸು. ಚೌಕ: ನಕಲು ಗುಣಿಸು ॥");
        assert!(errors.is_empty());
        assert_eq!(program.len(), 2);
        assert!(matches!(&program[1], Stmt::WordDef { .. }));
    }

    #[test]
    fn parse_error_recovers_at_next_statement() {
        let (program, errors) = parse(") . x := ೧.");
        assert!(!errors.is_empty());
        assert!(program.iter().any(|s| matches!(s, Stmt::VarAssign { name, .. } if name == "x")));
    }
}
