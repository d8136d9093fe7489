// A lexeme is the raw sequence of characters in the source code that represents a meaningful unit
// A token is a categorized representation of a lexeme, pairing it with its type

use crate::error::Diagnostics;
use crate::token::{Token, TokenType, KEYWORDS};

pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: i32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(diagnostics);
        }

        self.tokens.push(Token::new(TokenType::Eof, "", self.line));
        self.tokens
    }

    fn scan_token(&mut self, diagnostics: &mut Diagnostics) {
        let c: char = self.advance();
        match c {
            // single char
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),

            // can be double char
            '!' => {
                if self.r#match('=') {
                    self.add_token(TokenType::BangEqual);
                } else {
                    self.add_token(TokenType::Bang);
                }
            }
            '=' => {
                if self.r#match('=') {
                    self.add_token(TokenType::EqualEqual);
                } else {
                    self.add_token(TokenType::Equal);
                }
            }
            '<' => {
                if self.r#match('=') {
                    self.add_token(TokenType::LessEqual);
                } else {
                    self.add_token(TokenType::Less);
                }
            }
            '>' => {
                if self.r#match('=') {
                    self.add_token(TokenType::GreaterEqual);
                } else {
                    self.add_token(TokenType::Greater);
                }
            }

            // can be comment
            '/' => {
                if self.r#match('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            // ignore whitespace
            ' ' | '\t' | '\r' => (),

            // handle new line
            '\n' => {
                self.line += 1;
            }

            '"' => self.string(diagnostics),

            c => {
                if c.is_ascii_digit() {
                    self.number()
                } else if c.is_alphabetic() || c == '_' {
                    self.identifier()
                } else {
                    diagnostics.error(self.line, "Unexpected character.")
                }
            }
        }
    }

    // consume characters until we reach the closing "
    fn string(&mut self, diagnostics: &mut Diagnostics) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            diagnostics.error(self.line, "Unterminated string.");
            return;
        }

        // the closing "
        self.advance();

        // trim the surrounding quotes
        let literal: String = self.source[(self.start + 1)..(self.current - 1)]
            .iter()
            .collect();

        self.add_token(TokenType::String { literal });
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // consume the .
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let literal: f64 = text.parse().expect("scanned number could not be parsed");

        self.add_token(TokenType::Number { literal });
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let tpe = KEYWORDS
            .get(text.as_str())
            .cloned()
            .unwrap_or(TokenType::Identifier);

        self.add_token(tpe);
    }

    fn advance(&mut self) -> char {
        self.current += 1;
        self.source[self.current - 1]
    }

    // it's like advance but doesn't consume the next character
    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(token_type, &text, self.line));
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    // we only consume the current character if that is what we are looking for
    fn r#match(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Token>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        (tokens, diagnostics)
    }

    #[test]
    fn empty_source_is_a_single_eof() {
        let (tokens, diagnostics) = scan("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
        assert!(!diagnostics.had_error());
    }

    #[test]
    fn scans_operators_and_keywords() {
        let (tokens, _) = scan("var x = 1 >= 2 and break;");
        let kinds: Vec<&TokenType> = tokens.iter().map(|t| &t.token_type).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenType::Var,
                &TokenType::Identifier,
                &TokenType::Equal,
                &TokenType::Number { literal: 1.0 },
                &TokenType::GreaterEqual,
                &TokenType::Number { literal: 2.0 },
                &TokenType::And,
                &TokenType::Break,
                &TokenType::Semicolon,
                &TokenType::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_one_error_and_does_not_panic() {
        let (tokens, diagnostics) = scan("\"never closed");
        assert!(diagnostics.had_error());
        assert_eq!(diagnostics.log().len(), 1);
        assert!(tokens.last().unwrap().is_eof());
    }

    #[test]
    fn string_may_span_multiple_lines() {
        let (tokens, diagnostics) = scan("\"a\nb\" ;");
        assert!(!diagnostics.had_error());
        match &tokens[0].token_type {
            TokenType::String { literal } => assert_eq!(literal, "a\nb"),
            other => panic!("expected string token, got {other:?}"),
        }
        // the semicolon is on line 2 since the string consumed one newline
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn line_comment_emits_no_token() {
        let (tokens, _) = scan("// comment\nvar");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::Var);
    }
}
