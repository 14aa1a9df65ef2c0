//! Lexer (component B): turns Kapila source text into a token stream.
//! Tokenisation never throws — lexical errors surface as `Error` tokens
//! carrying a diagnostic lexeme, per spec §4.2.

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Literal, Span, Token, TokenKind};

use crate::script;

pub struct Lexer<'src> {
    scanner: Scanner<'src>,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { scanner: Scanner::new(source), done: false }
    }

    /// Tokenize the whole source, always including the trailing EOF token.
    /// Used by the parser and the VM, both of which need to see it.
    pub fn tokenize_all(source: &'src str) -> Vec<Token> {
        let mut lexer = Self::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.scanner.peek() {
                if ch.is_whitespace() {
                    self.scanner.advance();
                } else {
                    break;
                }
            }

            match (self.scanner.peek(), self.scanner.peek_next()) {
                (Some('/'), Some('/')) => {
                    self.scanner.skip_to_eol();
                    continue;
                }
                (Some('/'), Some('*')) => {
                    self.skip_block_comment();
                    continue;
                }
                _ => {}
            }
            break;
        }
    }

    fn skip_block_comment(&mut self) {
        self.scanner.advance(); // /
        self.scanner.advance(); // *
        while !self.scanner.is_eof() {
            if self.scanner.peek() == Some('*') && self.scanner.peek_next() == Some('/') {
                self.scanner.advance();
                self.scanner.advance();
                return;
            }
            self.scanner.advance();
        }
    }

    /// Produce the next token. Always returns `Eof` once the source is
    /// exhausted, and keeps returning `Eof` on subsequent calls.
    pub fn next_token(&mut self) -> Token {
        if self.done {
            return self.eof_token();
        }

        self.skip_whitespace_and_comments();

        if self.scanner.is_eof() {
            self.done = true;
            return self.eof_token();
        }

        self.scanner.start_token();
        let ch = self.scanner.advance().expect("checked not eof");

        if ch.is_ascii_digit() || script::is_kannada_digit(ch) {
            return self.scan_number();
        }
        if ch == '"' {
            return self.scan_string();
        }
        if script::is_valid_ident_start(ch) {
            return self.scan_word();
        }

        self.scan_punctuation(ch)
    }

    fn eof_token(&self) -> Token {
        Token::new(TokenKind::Eof, "", self.scanner.token_span())
    }

    fn scan_number(&mut self) -> Token {
        loop {
            match self.scanner.peek() {
                Some(ch) if ch.is_ascii_digit() || script::is_kannada_digit(ch) => {
                    self.scanner.advance();
                }
                Some('.') => {
                    if matches!(self.scanner.peek_next(), Some(n) if n.is_ascii_digit() || script::is_kannada_digit(n))
                    {
                        self.scanner.advance();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }

        let text = self.scanner.token_text();
        let span = self.scanner.token_span();
        match script::normalize_number(text) {
            Some(script::Number::Int(i)) => {
                Token::new(TokenKind::Number, text, span).with_literal(Literal::Int(i))
            }
            Some(script::Number::Float(f)) => {
                Token::new(TokenKind::Number, text, span).with_literal(Literal::Float(f))
            }
            None => Token::new(TokenKind::Error, text, span),
        }
    }

    fn scan_string(&mut self) -> Token {
        let mut value = String::new();
        loop {
            match self.scanner.peek() {
                None => {
                    let span = self.scanner.token_span();
                    return Token::new(
                        TokenKind::Error,
                        "unterminated string",
                        span,
                    );
                }
                Some('"') => {
                    self.scanner.advance();
                    break;
                }
                Some('\\') => {
                    self.scanner.advance();
                    match self.scanner.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('0') => value.push('\0'),
                        Some(other) => value.push(other),
                        None => {
                            let span = self.scanner.token_span();
                            return Token::new(TokenKind::Error, "unterminated string", span);
                        }
                    }
                }
                Some(ch) => {
                    self.scanner.advance();
                    value.push(ch);
                }
            }
        }

        let lexeme = self.scanner.token_text().to_string();
        let span = self.scanner.token_span();
        Token::new(TokenKind::String, lexeme, span).with_literal(Literal::Str(value))
    }

    fn scan_word(&mut self) -> Token {
        while let Some(ch) = self.scanner.peek() {
            if script::is_valid_ident_char(ch) {
                self.scanner.advance();
            } else {
                break;
            }
        }
        let text = self.scanner.token_text();
        Token::new(TokenKind::Word, text, self.scanner.token_span())
    }

    fn scan_punctuation(&mut self, ch: char) -> Token {
        let span_kind = match ch {
            ':' => {
                if self.scanner.peek() == Some('=') {
                    self.scanner.advance();
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            '.' => TokenKind::Dot,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '|' => TokenKind::Pipe,
            '\'' => TokenKind::Quote,
            '?' => TokenKind::Question,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Eq,
            '!' => {
                if self.scanner.peek() == Some('=') {
                    self.scanner.advance();
                    TokenKind::Neq
                } else {
                    TokenKind::Error
                }
            }
            '≠' => TokenKind::Neq,
            '<' => {
                if self.scanner.peek() == Some('=') {
                    self.scanner.advance();
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                }
            }
            '≤' => TokenKind::Lte,
            '>' => {
                if self.scanner.peek() == Some('=') {
                    self.scanner.advance();
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                }
            }
            '≥' => TokenKind::Gte,
            '॥' => TokenKind::DefEnd,
            // Not a dedicated token kind (spec §3's closed set has none) —
            // the string-concat alias `,` (spec §6) is lexed as a one-
            // character Word so it resolves through the same built-in
            // lookup as `concat`/`ಜೋಡಿಸು`.
            ',' => TokenKind::Word,
            _ => TokenKind::Error,
        };

        let text = self.scanner.token_text();
        Token::new(span_kind, text, self.scanner.token_span())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let tok = self.next_token();
        if tok.kind == TokenKind::Eof {
            self.done = true;
            return Some(tok);
        }
        Some(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize_all(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_with_single_eof() {
        let toks = Lexer::tokenize_all("೫ ೩ +");
        assert_eq!(toks.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(toks.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn no_error_tokens_for_clean_source() {
        let toks = Lexer::tokenize_all("x := ೧೦. x ಮುದ್ರಿಸು.");
        assert!(toks.iter().all(|t| t.kind != TokenKind::Error));
    }

    #[test]
    fn number_literal_values() {
        let toks = Lexer::tokenize_all("೧೨೩ ೩.೧೪ ೧2೩");
        assert_eq!(toks[0].literal, Some(Literal::Int(123)));
        match &toks[1].literal {
            Some(Literal::Float(f)) => assert!((f - 3.14).abs() < 1e-9),
            other => panic!("{other:?}"),
        }
        assert_eq!(toks[2].literal, Some(Literal::Int(123)));
    }

    #[test]
    fn dot_is_statement_terminator_not_decimal() {
        let toks = Lexer::tokenize_all("೫.");
        assert_eq!(toks[0].literal, Some(Literal::Int(5)));
        assert_eq!(toks[1].kind, TokenKind::Dot);
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(kinds("\"abc"), vec![TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn string_escapes_are_decoded() {
        let toks = Lexer::tokenize_all(r#""a\nb""#);
        assert_eq!(toks[0].literal, Some(Literal::Str("a\nb".to_string())));
    }

    #[test]
    fn two_char_operators_and_unicode_aliases() {
        assert_eq!(kinds(":="), vec![TokenKind::Assign, TokenKind::Eof]);
        assert_eq!(kinds("!="), vec![TokenKind::Neq, TokenKind::Eof]);
        assert_eq!(kinds("≠"), vec![TokenKind::Neq, TokenKind::Eof]);
        assert_eq!(kinds("॥"), vec![TokenKind::DefEnd, TokenKind::Eof]);
    }

    #[test]
    fn comma_lexes_as_the_string_concat_word() {
        let toks = Lexer::tokenize_all(",");
        assert_eq!(toks[0].kind, TokenKind::Word);
        assert_eq!(toks[0].lexeme, ",");
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("೧ // comment\n೨"), vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn block_comment_is_skipped() {
        assert_eq!(kinds("೧ /* c */ ೨"), vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }
}
