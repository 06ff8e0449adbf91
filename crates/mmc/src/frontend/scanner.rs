//! Scanner: a peekable wrapper over the logos lexer

use super::token::{Token, TokenKind};
use crate::common::{Span, TranslateError, TranslateResult};
use logos::Logos;

/// Scanner for MiniMat source code
pub struct Scanner<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    peeked: Option<Token>,
    at_eof: bool,
    trace: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            peeked: None,
            at_eof: false,
            trace: false,
        }
    }

    /// Echo every scanned token to stderr
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Get the next token
    pub fn next_token(&mut self) -> TranslateResult<Token> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }

        if self.at_eof {
            return Ok(Token::new(TokenKind::Eof, Span::default()));
        }

        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = self.inner.span();
                if self.trace {
                    eprintln!("[scan] {} at {}..{}", kind, span.start, span.end);
                }
                Ok(Token::new(kind, Span::new(span.start, span.end)))
            }
            Some(Err(())) => {
                let span = self.inner.span();
                Err(TranslateError::lexer(
                    format!("unexpected character '{}'", self.inner.slice()),
                    Span::new(span.start, span.end),
                ))
            }
            None => {
                self.at_eof = true;
                let len = self.inner.source().len();
                if self.trace {
                    eprintln!("[scan] end of input");
                }
                Ok(Token::new(TokenKind::Eof, Span::new(len, len)))
            }
        }
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> TranslateResult<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token()?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "void char int real Matrix if else while break return";
        let mut scanner = Scanner::new(source);

        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Void));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Char));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Int));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Real));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Matrix
        ));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::If));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Else));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::While
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Break
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Return
        ));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn test_identifiers_and_literals() {
        let source = "foo _bar42 7 3.25 'x' '\\n'";
        let mut scanner = Scanner::new(source);

        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "foo"
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "_bar42"
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::IntLiteral(7)
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::RealLiteral(x) if (x - 3.25).abs() < f64::EPSILON
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::CharLiteral('x')
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::CharLiteral('\n')
        ));
    }

    #[test]
    fn test_operators() {
        let source = "+ - * / % == != < <= > >= =";
        let mut scanner = Scanner::new(source);

        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Plus));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Minus
        ));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Star));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Slash
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Percent
        ));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::EqEq));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::NotEq
        ));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Lt));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::LtEq));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Gt));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::GtEq));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Assign
        ));
    }

    #[test]
    fn test_comments_skipped() {
        let source = "int // trailing comment\nx";
        let mut scanner = Scanner::new(source);

        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Int));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "x"
        ));
    }

    #[test]
    fn test_unexpected_character() {
        let mut scanner = Scanner::new("int @");
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Int));
        assert!(matches!(
            scanner.next_token(),
            Err(TranslateError::Lexer { .. })
        ));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut scanner = Scanner::new("x");
        assert!(matches!(
            scanner.peek().unwrap().kind,
            TokenKind::Identifier(_)
        ));
        assert!(matches!(
            scanner.next_token().unwrap().kind,
            TokenKind::Identifier(_)
        ));
        assert!(matches!(scanner.next_token().unwrap().kind, TokenKind::Eof));
    }
}
