// ABOUTME: Converts Lox source text into a token stream

use crate::diagnostics::Diagnostics;
use crate::token::{keyword_kind, Literal, Token, TokenKind};

pub struct Scanner<'a> {
    source: &'a [u8],
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    diagnostics: &'a Diagnostics,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, diagnostics: &'a Diagnostics) -> Self {
        Scanner {
            source: source.as_bytes(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            diagnostics,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, String::new(), None, self.line));
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current] as char;
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current] as char
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1] as char
        }
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned()
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_literal(kind, None);
    }

    fn add_token_literal(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.lexeme();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn scan_token(&mut self) {
        use TokenKind::*;
        let c = self.advance();
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),
            '!' => {
                let kind = if self.matches('=') { BangEqual } else { Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') { EqualEqual } else { Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') { LessEqual } else { Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') {
                    GreaterEqual
                } else {
                    Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.matches('*') {
                    self.block_comment();
                } else {
                    self.add_token(Slash);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_identifier_start(c) => self.identifier(),
            _ => self
                .diagnostics
                .error(self.line, "unexpected character"),
        }
    }

    /// Nested `/* ... */` comments, tracked with a depth counter.
    fn block_comment(&mut self) {
        let mut depth = 1usize;
        while depth > 0 {
            if self.is_at_end() {
                self.diagnostics
                    .error(self.line, "unterminated block comment");
                return;
            }
            if self.peek() == '\n' {
                self.line += 1;
                self.advance();
            } else if self.peek() == '/' && self.peek_next() == '*' {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                depth -= 1;
            } else {
                self.advance();
            }
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.error(self.line, "unterminated string");
            return;
        }

        self.advance(); // closing quote

        let value = String::from_utf8_lossy(&self.source[self.start + 1..self.current - 1])
            .into_owned();
        self.add_token_literal(TokenKind::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume the '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        let value: f64 = text.parse().expect("scanned digits form a valid f64");
        self.add_token_literal(TokenKind::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }
        let text = self.lexeme();
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<Token> {
        let d = Diagnostics::new();
        let tokens = Scanner::new(src, &d).scan_tokens();
        assert!(!d.had_error(), "unexpected scan error for {src:?}");
        tokens
    }

    #[test]
    fn single_char_tokens() {
        let tokens = scan("(){},.-+;*");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        let tokens = scan("!= == <= >= ! = < >");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_is_skipped() {
        let tokens = scan("1 // comment\n2");
        assert_eq!(tokens.len(), 3); // NUMBER, NUMBER, EOF
    }

    #[test]
    fn nested_block_comments() {
        let tokens = scan("/* outer /* inner */ still-in-comment */ 1");
        assert_eq!(tokens.len(), 2); // NUMBER, EOF
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let d = Diagnostics::new();
        Scanner::new("/* never closes", &d).scan_tokens();
        assert!(d.had_error());
    }

    #[test]
    fn string_spans_newlines_and_tracks_line() {
        let tokens = scan("\"a\nb\" 1");
        assert_eq!(tokens[0].literal, Some(Literal::String("a\nb".into())));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_errors() {
        let d = Diagnostics::new();
        Scanner::new("\"never closed", &d).scan_tokens();
        assert!(d.had_error());
    }

    #[test]
    fn number_literal_with_trailing_dot_not_consumed() {
        let tokens = scan("123.");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = scan("class fun orchard");
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(tokens[1].kind, TokenKind::Fun);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn unexpected_character_reports_and_continues() {
        let d = Diagnostics::new();
        let tokens = Scanner::new("1 @ 2", &d).scan_tokens();
        assert!(d.had_error());
        assert_eq!(tokens.len(), 3); // NUMBER, NUMBER, EOF (the @ was skipped)
    }

    #[test]
    fn final_token_is_always_eof() {
        let tokens = scan("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
