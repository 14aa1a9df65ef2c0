//! Canonical pretty-printer: renders a [`Program`] back to Kapila source
//! text in a fixed form. Used only by the idempotence property test
//! (spec §8 "re-pretty-printing and re-parsing yields the same AST") —
//! it has no user-facing CLI surface.

use super::ast::*;

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for stmt in program {
        print_stmt(stmt, &mut out);
        out.push('\n');
    }
    out
}

fn print_stmt(stmt: &Stmt, out: &mut String) {
    match stmt {
        Stmt::WordDef { name, params, body } => {
            out.push_str(name);
            out.push_str(": ");
            print_params(params, out);
            for node in body {
                print_node(node, out);
                out.push(' ');
            }
            out.push_str("॥");
        }
        Stmt::VarAssign { name, value } => {
            out.push_str(name);
            out.push_str(" := ");
            print_expr(value, out);
            out.push('.');
        }
        Stmt::ExprStmt { expr } => {
            print_expr(expr, out);
            out.push('.');
        }
    }
}

fn print_params(params: &[String], out: &mut String) {
    if params.is_empty() {
        return;
    }
    for p in params {
        out.push_str(p);
        out.push(' ');
    }
    out.push_str("| ");
}

fn print_number(n: NumberLit, out: &mut String) {
    match n {
        NumberLit::Int(i) => out.push_str(&i.to_string()),
        NumberLit::Float(f) => out.push_str(&f.to_string()),
    }
}

fn print_string_lit(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
}

fn print_node(node: &AstNode, out: &mut String) {
    match node {
        AstNode::Number(n) => print_number(*n, out),
        AstNode::Str(s) => print_string_lit(s, out),
        AstNode::Word(w) => out.push_str(w),
        AstNode::QuotedWord(w) => {
            out.push('\'');
            out.push_str(w);
        }
        AstNode::Op(op) => out.push_str(op.symbol()),
        AstNode::Question => out.push('?'),
        AstNode::Block(b) => print_block(b, out),
        AstNode::List(items) => {
            out.push_str("[ ");
            for item in items {
                print_node(item, out);
                out.push(' ');
            }
            out.push(']');
        }
        AstNode::Map(entries) => print_map_raw(entries, out),
    }
}

fn print_block(block: &RawBlock, out: &mut String) {
    out.push_str("[ ");
    print_params(&block.params, out);
    for node in &block.body {
        print_node(node, out);
        out.push(' ');
    }
    out.push(']');
}

fn print_map_raw(entries: &[(String, AstNode)], out: &mut String) {
    out.push_str("{ ");
    for (k, v) in entries {
        out.push_str(k);
        out.push_str(": ");
        print_node(v, out);
        out.push(' ');
    }
    out.push('}');
}

fn print_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::NumberLit(n) => print_number(*n, out),
        Expr::StringLit(s) => print_string_lit(s, out),
        Expr::BoolLit(true) => out.push_str("true"),
        Expr::BoolLit(false) => out.push_str("false"),
        Expr::Word(w) => out.push_str(w),
        Expr::QuotedWord(w) => {
            out.push('\'');
            out.push_str(w);
        }
        Expr::Block(b) => print_block(b, out),
        Expr::ListLit(items) => {
            out.push_str("[ ");
            for item in items {
                print_expr(item, out);
                out.push(' ');
            }
            out.push(']');
        }
        Expr::MapLit(entries) => {
            out.push_str("{ ");
            for (k, v) in entries {
                out.push_str(k);
                out.push_str(": ");
                print_expr(v, out);
                out.push(' ');
            }
            out.push('}');
        }
        Expr::BinaryExpr { op, left, right } => {
            // No grouping parens: the lexer has no `(`/`)` tokens, and the
            // precedence ladder is strictly left-associative per level —
            // a `right` operand is always drawn from the next tier down,
            // so reparsing the flat `left op right` text reconstructs the
            // same tree without needing to disambiguate.
            print_expr(left, out);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            print_expr(right, out);
        }
        Expr::UnaryExpr { op, operand } => {
            out.push_str(match op {
                UnaryOpKind::Neg => "-",
                UnaryOpKind::Not => "not ",
            });
            print_expr(operand, out);
        }
        Expr::LogicExpr { op, left, right } => {
            print_expr(left, out);
            out.push_str(match op {
                LogicOp::And => " and ",
                LogicOp::Or => " or ",
            });
            print_expr(right, out);
        }
        Expr::Conditional { cond, then_block, else_block } => {
            print_expr(cond, out);
            out.push_str(" ? ");
            print_block(then_block, out);
            if let Some(eb) = else_block {
                out.push(' ');
                print_block(eb, out);
            }
        }
        Expr::PostfixAction { value, actions } => {
            print_expr(value, out);
            for action in actions {
                out.push(' ');
                out.push_str(action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::grammar::Parser;
    use super::*;
    use crate::lexer::Lexer;

    fn roundtrip(src: &str) -> Program {
        let (program, errors) = Parser::new(Lexer::tokenize_all(src)).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        let printed = print_program(&program);
        let (reparsed, errors2) = Parser::new(Lexer::tokenize_all(&printed)).parse();
        assert!(errors2.is_empty(), "reparse errors: {errors2:?} in {printed:?}");
        assert_eq!(program, reparsed, "not idempotent, printed: {printed:?}");
        reparsed
    }

    #[test]
    fn idempotent_on_arithmetic_and_print() {
        roundtrip("೫ ೩ ಕೂಡು ಮುದ್ರಿಸು.");
    }

    #[test]
    fn idempotent_on_word_definition() {
        roundtrip("ವರ್ಗ: ನಕಲು ಗುಣಿಸು ॥ ೫ ವರ್ಗ ಮುದ್ರಿಸು.");
    }

    #[test]
    fn idempotent_on_conditional() {
        roundtrip(r#"x := ೧೦.  x > ೫ ? [ "ದೊಡ್ಡ" ಮುದ್ರಿಸು ] [ "ಚಿಕ್ಕ" ಮುದ್ರಿಸು ]."#);
    }

    #[test]
    fn idempotent_on_higher_order_chain() {
        roundtrip("[ ೧ ೨ ೩ ] [ dup * ] ನಕ್ಷೆ  ೦ [ + ] ಮಡಿಸು  ಮುದ್ರಿಸು.");
    }
}
