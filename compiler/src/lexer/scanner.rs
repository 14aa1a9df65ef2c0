//! Low-level character scanning: a UTF-8 cursor tracking byte position,
//! line, and column, with token-start bookkeeping for producing spans.

use super::token::Span;

pub struct Scanner<'src> {
    source: &'src str,
    position: usize,
    line: usize,
    column: usize,
    token_start: usize,
    token_start_line: usize,
    token_start_column: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.position..].chars();
        chars.next();
        chars.next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub fn start_token(&mut self) {
        self.token_start = self.position;
        self.token_start_line = self.line;
        self.token_start_column = self.column;
    }

    pub fn token_span(&self) -> Span {
        Span::with_location(
            self.token_start,
            self.position,
            self.token_start_line,
            self.token_start_column,
        )
    }

    pub fn token_text(&self) -> &'src str {
        &self.source[self.token_start..self.position]
    }

    pub fn skip_to_eol(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn position(&self) -> usize {
        self.position
    }
}
