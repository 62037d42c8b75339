use cursor::Cursor;
use diagnostics::{Diagnostics, Reporter};
use log::trace;

pub mod token;
pub use cursor::Line;
pub use token::{LiteralValue, Token, TokenType};

use TokenType::*;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character: '{0}'.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Invalid number format.")]
    InvalidNumber(String),
}

/// Scans `source` with a fresh diagnostics collector.
///
/// The returned tokens are usable even if diagnostics were reported: tokens for
/// the offending text are left out and scanning continues after it.
pub fn scan(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
    (tokens, diagnostics)
}

pub struct Scanner<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source), tokens: Vec::new() }
    }

    /// Always ends with exactly one `Eof` token, carrying the last line of the source.
    pub fn scan_tokens(mut self, reporter: &mut dyn Reporter) -> Vec<Token> {
        while !self.cursor.is_at_end() {
            self.cursor.mark_start();
            if let Err(error) = self.scan_token() {
                reporter.report(self.cursor.line(), "", &error.to_string());
            }
        }

        self.tokens.push(Token::eof(self.cursor.line()));
        self.tokens
    }

    fn scan_token(&mut self) -> Result<(), ScanErrorType> {
        let Some(c) = self.cursor.advance() else {
            return Ok(());
        };

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

            '!' => self.add_one_or_two('=', BangEqual, Bang),
            '=' => self.add_one_or_two('=', EqualEqual, Equal),
            '<' => self.add_one_or_two('=', LessEqual, Less),
            '>' => self.add_one_or_two('=', GreaterEqual, Greater),

            '/' => {
                if self.cursor.advance_if('/') {
                    // Comment, the newline is left for the next token
                    self.cursor.advance_while(|c| c != '\n');
                } else {
                    self.add_token(Slash)
                }
            }

            // The cursor counts lines itself
            ' ' | '\r' | '\t' | '\n' => (),

            '"' => return self.string(),

            d if d.is_ascii_digit() => return self.number(),

            c if is_alpha(c) => self.identifier(),

            c => return Err(ScanErrorType::UnexpectedCharacter(c)),
        }

        Ok(())
    }

    fn add_one_or_two(&mut self, second: char, two: TokenType, one: TokenType) {
        let ty = if self.cursor.advance_if(second) { two } else { one };
        self.add_token(ty)
    }

    fn add_token(&mut self, ty: TokenType) {
        self.push(ty, None)
    }

    fn add_literal(&mut self, ty: TokenType, literal: LiteralValue) {
        self.push(ty, Some(literal))
    }

    fn push(&mut self, ty: TokenType, literal: Option<LiteralValue>) {
        let token = Token::new(ty, self.cursor.lexeme(), literal, self.cursor.line());
        trace!("Scanned {token}");
        self.tokens.push(token);
    }

    fn string(&mut self) -> Result<(), ScanErrorType> {
        self.cursor.advance_while(|c| c != '"');
        if !self.cursor.advance_if('"') {
            return Err(ScanErrorType::UnterminatedString);
        }

        let lexeme = self.cursor.lexeme();
        let value = lexeme[1..lexeme.len() - 1].to_string();
        self.add_literal(Str, LiteralValue::Str(value));
        Ok(())
    }

    fn number(&mut self) -> Result<(), ScanErrorType> {
        self.cursor.advance_while(|c| c.is_ascii_digit());

        // A trailing '.' without digits after it is not part of the number
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_digit());
        }

        let text = self.cursor.lexeme();
        let value =
            text.parse::<f64>().map_err(|_| ScanErrorType::InvalidNumber(text.to_string()))?;
        self.add_literal(Number, LiteralValue::Number(value));
        Ok(())
    }

    fn identifier(&mut self) {
        self.cursor.advance_while(is_alphanumeric);
        let ty = TokenType::keyword(self.cursor.lexeme()).unwrap_or(Identifier);
        self.add_token(ty)
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}
