//! Recursive descent parser for Lox expressions.
//!
//! ```text
//! expression → equality ;
//! equality   → comparison ( ( "!=" | "==" ) comparison )* ;
//! comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
//! term       → factor ( ( "-" | "+" ) factor )* ;
//! factor     → unary ( ( "/" | "*" ) unary )* ;
//! unary      → ( "!" | "-" ) unary | primary ;
//! primary    → NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")" ;
//! ```

mod expr;
pub mod printer;

use diagnostics::Reporter;
use log::trace;
use scanner::{Line, LiteralValue, Token, TokenType};

pub use expr::Expr;
pub use printer::print_ast;

use TokenType::*;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Deepest tree the parser will build. Prefix operators, groupings and every
/// step of a binary operator chain each count as one level.
pub const MAX_DEPTH: usize = 256;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("Expect ')' after expression.")]
    ExpectedRightParen,
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Expect end of expression.")]
    ExpectedEof,
    #[error("Too much nesting.")]
    TooDeeplyNested,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[line {}] Error{}: {error}", .token.line, location(.token))]
pub struct ParseError {
    pub error: ParseErrorType,
    /// The token the parser was looking at when it gave up.
    pub token: Token,
}

impl ParseError {
    pub fn new(error: ParseErrorType, token: Token) -> Self {
        Self { error, token }
    }

    pub fn report(&self, reporter: &mut dyn Reporter) {
        reporter.report(self.token.line, &location(&self.token), &self.error.to_string());
    }
}

fn location(token: &Token) -> String {
    match token.ty {
        Eof => " at end".to_string(),
        _ => format!(" at '{}'", token.lexeme),
    }
}

/// Parses a complete token sequence into a single expression.
pub fn parse(tokens: Vec<Token>) -> Result<Expr> {
    Parser::new(tokens).parse()
}

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // The cursor relies on an Eof at the end, which the scanner always emits
        if tokens.last().map(|t| t.ty) != Some(Eof) {
            let line = tokens.last().map_or(Line(1), |t| t.line);
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0, depth: 0 }
    }

    /// Parses one expression that has to span all remaining tokens.
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.expression()?;
        if !self.is_at_end() {
            return Err(ParseError::new(ParseErrorType::ExpectedEof, self.peek().clone()));
        }
        trace!("Parsed {expr}");
        Ok(expr)
    }

    /// Parses a single expression, leaving any tokens after it unconsumed.
    pub fn expression(&mut self) -> Result<Expr> {
        // A previous expression may have bailed out half way down
        self.depth = 0;
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary(&[BangEqual, EqualEqual], Self::comparison)
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary(&[Greater, GreaterEqual, Less, LessEqual], Self::term)
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary(&[Minus, Plus], Self::factor)
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary(&[Slash, Star], Self::unary)
    }

    /// Left-associative fold of `operand ( operator operand )*`.
    fn binary(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let depth = self.depth;
        let mut expr = operand(self)?;

        // Every fold pushes the chain built so far one level further down
        while self.match_any(operators) {
            let operator = self.previous().clone();
            self.nest()?;
            let right = operand(self)?;
            expr = Expr::binary(expr, operator, right);
        }

        self.depth = depth;
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.match_any(&[Bang, Minus]) {
            let operator = self.previous().clone();
            self.nest()?;
            let right = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::unary(operator, right));
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        if self.match_any(&[False]) {
            return Ok(LiteralValue::Boolean(false).into());
        }
        if self.match_any(&[True]) {
            return Ok(LiteralValue::Boolean(true).into());
        }
        if self.match_any(&[Nil]) {
            return Ok(LiteralValue::Nil.into());
        }

        if self.match_any(&[Number, Str]) {
            let value = self.previous().literal.clone().unwrap_or(LiteralValue::Nil);
            return Ok(value.into());
        }

        if self.match_any(&[LeftParen]) {
            self.nest()?;
            let expr = self.equality()?;
            self.consume(RightParen, ParseErrorType::ExpectedRightParen)?;
            self.depth -= 1;
            return Ok(Expr::grouping(expr));
        }

        Err(ParseError::new(ParseErrorType::ExpectedExpression, self.peek().clone()))
    }

    /// Discards tokens until a likely statement boundary: just after a `;`, or
    /// right before a keyword that starts a statement.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().ty == Semicolon {
                return;
            }

            match self.peek().ty {
                Class | Fun | Var | For | If | While | Print | Return => return,
                _ => {}
            }

            self.advance();
        }
    }
}

// Helpers
impl Parser {
    pub fn is_at_end(&self) -> bool {
        self.peek().ty == Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Never moves past the final Eof.
    fn advance(&mut self) -> &Token {
        if self.is_at_end() {
            return self.peek();
        }
        self.current += 1;
        self.previous()
    }

    fn check(&self, ty: TokenType) -> bool {
        !self.is_at_end() && self.peek().ty == ty
    }

    fn match_any(&mut self, types: &[TokenType]) -> bool {
        if types.iter().any(|ty| self.check(*ty)) {
            self.advance();
            return true;
        }
        false
    }

    /// Goes one level deeper, failing at the token that crossed `MAX_DEPTH`.
    fn nest(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(ParseErrorType::TooDeeplyNested, self.previous().clone()));
        }
        Ok(())
    }

    fn consume(&mut self, ty: TokenType, error: ParseErrorType) -> Result<&Token> {
        if self.check(ty) {
            return Ok(self.advance());
        }
        Err(ParseError::new(error, self.peek().clone()))
    }
}

#[cfg(test)]
mod tests {
    use diagnostics::{Diagnostic, Diagnostics};
    use pretty_assertions::assert_eq;

    use super::*;

    #[ctor::ctor]
    fn init() {
        env_logger::init();
    }

    fn parse_source(source: &str) -> Result<Expr> {
        let (tokens, diagnostics) = scanner::scan(source);
        assert!(!diagnostics.had_error(), "unexpected diagnostics: {diagnostics}");
        parse(tokens)
    }

    fn render(source: &str) -> String {
        parse_source(source).unwrap().to_string()
    }

    fn token(ty: TokenType, lexeme: &str) -> Token {
        Token::new(ty, lexeme, None, Line(1))
    }

    fn number(n: f64) -> Expr {
        LiteralValue::Number(n).into()
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse_source("1 + 2 * 3").unwrap(),
            Expr::binary(
                number(1.0),
                token(Plus, "+"),
                Expr::binary(number(2.0), token(Star, "*"), number(3.0))
            )
        );
        assert_eq!(render("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(render("1 * 2 + 3"), "(+ (* 1 2) 3)");
        assert_eq!(render("1 < 2 == 3 >= 4"), "(== (< 1 2) (>= 3 4))");
        assert_eq!(render("-1 + 2 > 3 / 4"), "(> (+ (- 1) 2) (/ 3 4))");
    }

    #[test]
    fn left_associativity() {
        assert_eq!(
            parse_source("1 - 2 - 3").unwrap(),
            Expr::binary(
                Expr::binary(number(1.0), token(Minus, "-"), number(2.0)),
                token(Minus, "-"),
                number(3.0)
            )
        );
        assert_eq!(render("8 / 4 / 2"), "(/ (/ 8 4) 2)");
        assert_eq!(render("1 == 2 != 3"), "(!= (== 1 2) 3)");
    }

    #[test]
    fn unary_nests_to_the_right() {
        assert_eq!(render("!!-1"), "(! (! (- 1)))");
        assert_eq!(render("--1"), "(- (- 1))");
    }

    #[test]
    fn grouping() {
        assert_eq!(render("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
        assert_eq!(render("((1))"), "(group (group 1))");
        assert_eq!(render("-123 * (45.67)"), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn literals() {
        assert_eq!(parse_source("true").unwrap(), Expr::Literal(LiteralValue::Boolean(true)));
        assert_eq!(parse_source("false").unwrap(), Expr::Literal(LiteralValue::Boolean(false)));
        assert_eq!(parse_source("nil").unwrap(), Expr::Literal(LiteralValue::Nil));
        assert_eq!(
            parse_source("\"hi\"").unwrap(),
            Expr::Literal(LiteralValue::Str("hi".to_string()))
        );
        assert_eq!(render("\"a\" == nil"), "(== a nil)");
    }

    #[test]
    fn hand_built_tokens() {
        let tokens = vec![token(Bang, "!"), token(True, "true"), Token::eof(Line(1))];
        assert_eq!(
            parse(tokens).unwrap(),
            Expr::unary(token(Bang, "!"), LiteralValue::Boolean(true).into())
        );

        // A missing Eof is filled in
        let tokens = vec![Token::new(Number, "42", Some(LiteralValue::Number(42.0)), Line(3))];
        assert_eq!(parse(tokens).unwrap(), number(42.0));
    }

    #[test]
    fn missing_right_paren() {
        let error = parse_source("(1 + 2").unwrap_err();
        assert_eq!(error, ParseError::new(ParseErrorType::ExpectedRightParen, Token::eof(Line(1))));
        assert_eq!(error.to_string(), "[line 1] Error at end: Expect ')' after expression.");
    }

    #[test]
    fn expected_expression() {
        let error = parse_source("1 +").unwrap_err();
        assert_eq!(error, ParseError::new(ParseErrorType::ExpectedExpression, Token::eof(Line(1))));

        let error = parse_source(")").unwrap_err();
        assert_eq!(error.to_string(), "[line 1] Error at ')': Expect expression.");

        let error = parse(vec![]).unwrap_err();
        assert_eq!(error.error, ParseErrorType::ExpectedExpression);
    }

    #[test]
    fn trailing_tokens() {
        let error = parse_source("1 2").unwrap_err();
        assert_eq!(
            error,
            ParseError::new(
                ParseErrorType::ExpectedEof,
                Token::new(Number, "2", Some(LiteralValue::Number(2.0)), Line(1))
            )
        );

        let error = parse_source("(1)\n)").unwrap_err();
        assert_eq!(error.to_string(), "[line 2] Error at ')': Expect end of expression.");
    }

    #[test]
    fn report_to_sink() {
        let mut diagnostics = Diagnostics::new();
        parse_source("(1").unwrap_err().report(&mut diagnostics);
        parse_source("*").unwrap_err().report(&mut diagnostics);
        assert_eq!(
            diagnostics.0,
            vec![
                Diagnostic::new(Line(1), " at end", "Expect ')' after expression."),
                Diagnostic::new(Line(1), " at '*'", "Expect expression."),
            ]
        );
    }

    fn nested(open: &str, inner: &str, close: &str, depth: usize) -> String {
        format!("{}{inner}{}", open.repeat(depth), close.repeat(depth))
    }

    #[test]
    fn deep_grouping_is_an_error() {
        let error = parse_source(&nested("(", "1", ")", 5_000)).unwrap_err();
        assert_eq!(error, ParseError::new(ParseErrorType::TooDeeplyNested, token(LeftParen, "(")));
        assert_eq!(error.to_string(), "[line 1] Error at '(': Too much nesting.");
    }

    #[test]
    fn long_prefix_run_is_an_error() {
        let error = parse_source(&nested("-", "1", "", 200_000)).unwrap_err();
        assert_eq!(error, ParseError::new(ParseErrorType::TooDeeplyNested, token(Minus, "-")));

        let error = parse_source(&nested("!", "true", "", MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(error.error, ParseErrorType::TooDeeplyNested);
    }

    #[test]
    fn long_operator_chain_is_an_error() {
        let source = vec!["1"; 100_000].join(" + ");
        let error = parse_source(&source).unwrap_err();
        assert_eq!(error, ParseError::new(ParseErrorType::TooDeeplyNested, token(Plus, "+")));

        let source = vec!["2"; 50_000].join(" * ");
        assert_eq!(parse_source(&source).unwrap_err().error, ParseErrorType::TooDeeplyNested);
    }

    #[test]
    fn nesting_up_to_the_limit() {
        let expected = nested("(group ", "1", ")", MAX_DEPTH);
        assert_eq!(render(&nested("(", "1", ")", MAX_DEPTH)), expected);
        assert_eq!(render(&nested("-", "1", "", MAX_DEPTH)), nested("(- ", "1", ")", MAX_DEPTH));

        let source = vec!["1"; MAX_DEPTH + 1].join(" - ");
        assert!(render(&source).starts_with(&"(- ".repeat(MAX_DEPTH)));

        // Each operand of a chain starts from the chain's own depth again
        let operand = nested("(", "1", ")", MAX_DEPTH / 2);
        let source = vec![operand.as_str(); MAX_DEPTH / 2].join(" * ");
        assert!(parse_source(&source).is_ok());
    }

    #[test]
    fn depth_resets_between_expressions() {
        let source = format!("{}; (1)", nested("(", "1", "", 5_000));
        let mut parser = Parser::new(scanner::scan(&source).0);
        assert_eq!(parser.expression().unwrap_err().error, ParseErrorType::TooDeeplyNested);

        parser.synchronize();
        assert_eq!(parser.expression().unwrap().to_string(), "(group 1)");
    }

    #[test]
    fn advance_stops_at_eof() {
        let mut parser = Parser::new(vec![Token::eof(Line(1))]);
        assert!(parser.is_at_end());
        assert_eq!(parser.advance().ty, Eof);
        assert_eq!(parser.advance().ty, Eof);
        assert!(!parser.check(Eof));
        assert!(!parser.match_any(&[Eof]));
    }

    #[test]
    fn synchronize_after_semicolon() {
        let mut parser = Parser::new(scanner::scan("(1 + 2; 3 * 4").0);
        let error = parser.expression().unwrap_err();
        assert_eq!(error.token.ty, Semicolon);

        parser.synchronize();
        assert_eq!(parser.expression().unwrap().to_string(), "(* 3 4)");
        assert!(parser.is_at_end());
    }

    #[test]
    fn synchronize_before_statement_keyword() {
        let mut parser = Parser::new(scanner::scan("(1 2 + print 3").0);
        assert!(parser.expression().is_err());

        parser.synchronize();
        assert_eq!(parser.peek().ty, Print);
    }

    #[test]
    fn synchronize_runs_to_eof() {
        let mut parser = Parser::new(scanner::scan("(1 2 3 4").0);
        assert!(parser.expression().is_err());

        parser.synchronize();
        assert!(parser.is_at_end());

        // Nothing left to skip
        parser.synchronize();
        assert!(parser.is_at_end());
    }
}
