//! The typed tree built by [`super::grammar::Parser`] (component C, spec
//! §3 "AST"). The VM (component D) does not consume this tree — it
//! re-scans the raw token stream directly (spec §4.4) — but the code
//! generator (component E) and the canonical printer both walk it.

use crate::lexer::TokenKind;

/// A parsed number literal: exact integer, or float once a `.` was seen
/// (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLit {
    Int(i64),
    Float(f64),
}

/// The arithmetic/comparison operator set shared by infix and postfix
/// evaluation (spec §9 "single `apply_op` routine").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
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

impl OpKind {
    pub fn from_token_kind(kind: TokenKind) -> Option<OpKind> {
        Some(match kind {
            TokenKind::Plus => OpKind::Add,
            TokenKind::Minus => OpKind::Sub,
            TokenKind::Star => OpKind::Mul,
            TokenKind::Slash => OpKind::Div,
            TokenKind::Percent => OpKind::Mod,
            TokenKind::Eq => OpKind::Eq,
            TokenKind::Neq => OpKind::Neq,
            TokenKind::Lt => OpKind::Lt,
            TokenKind::Gt => OpKind::Gt,
            TokenKind::Lte => OpKind::Lte,
            TokenKind::Gte => OpKind::Gte,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            OpKind::Add => "+",
            OpKind::Sub => "-",
            OpKind::Mul => "*",
            OpKind::Div => "/",
            OpKind::Mod => "%",
            OpKind::Eq => "=",
            OpKind::Neq => "!=",
            OpKind::Lt => "<",
            OpKind::Gt => ">",
            OpKind::Lte => "<=",
            OpKind::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Neg,
    Not,
}

/// `and`/`or` are boolean keywords rather than `OpKind` tokens (spec §6
/// lists them alongside `not` as logic built-ins, not operator glyphs),
/// but they still chain left-associatively at their own precedence tier
/// (spec §4.3), so they get their own binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// A literal `[ ... ]` block: token-level parameter names plus the raw
/// body, reparsed as [`AstNode`]s (spec §3 "Block").
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    pub params: Vec<String>,
    pub body: Vec<AstNode>,
}

/// One element of a word-definition body or block body. These are
/// collected *raw* — no infix precedence (spec §4.3) — so a body is a
/// flat sequence rather than an expression tree; `Question` marks a bare
/// `?` token, which only becomes a full ternary once followed by its
/// branch blocks (the code generator recognises this pattern when
/// lowering a body, mirroring the VM's block-mode interpreter).
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Number(NumberLit),
    Str(String),
    Word(String),
    QuotedWord(String),
    Op(OpKind),
    Question,
    Block(RawBlock),
    List(Vec<AstNode>),
    Map(Vec<(String, AstNode)>),
}

/// A top-level (infix-parsed) expression (spec §3 "Expr").
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLit(NumberLit),
    StringLit(String),
    BoolLit(bool),
    Word(String),
    QuotedWord(String),
    Block(RawBlock),
    ListLit(Vec<Expr>),
    MapLit(Vec<(String, Expr)>),
    BinaryExpr {
        op: OpKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryExpr {
        op: UnaryOpKind,
        operand: Box<Expr>,
    },
    LogicExpr {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_block: RawBlock,
        else_block: Option<RawBlock>,
    },
    PostfixAction {
        value: Box<Expr>,
        actions: Vec<String>,
    },
}

/// A top-level statement (spec §3 "Stmt").
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    WordDef {
        name: String,
        params: Vec<String>,
        body: Vec<AstNode>,
    },
    VarAssign {
        name: String,
        value: Expr,
    },
    ExprStmt {
        expr: Expr,
    },
}

pub type Program = Vec<Stmt>;
