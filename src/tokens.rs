// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Position, Result, SyntaxError};
use crate::lexer::{Source, Token, TokenKind};

/// Cursor over the token list produced by [`crate::unstable::tokenize`].
pub struct TokenStream {
    source: Source,
    tokens: Vec<Token>,
    index: usize,
}

impl TokenStream {
    pub fn new(source: &Source, tokens: Vec<Token>) -> Self {
        Self {
            source: source.clone(),
            tokens,
            index: 0,
        }
    }

    pub fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.index).map(|t| &t.0)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.index + n).map(|t| &t.0)
    }

    pub fn advance(&mut self) -> Option<TokenKind> {
        let tok = self.tokens.get(self.index).map(|t| t.0.clone());
        if tok.is_some() {
            self.index += 1;
        }
        tok
    }

    /// Step back one token. Used to position an error on the token that caused it.
    pub fn back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn skip_newlines(&mut self) {
        while self.peek() == Some(&TokenKind::Newline) {
            self.index += 1;
        }
    }

    pub fn is_grammar(&self, ch: char) -> bool {
        self.peek() == Some(&TokenKind::Grammar(ch))
    }

    /// Position of the current token, or of the last token once exhausted.
    pub fn position(&self, msg: &str) -> Option<Position> {
        let tok = self
            .tokens
            .get(self.index)
            .or_else(|| self.tokens.last())?;
        let span = &tok.1;
        Some(Position {
            line: span.line,
            col: span.col,
            context: self.source.message(span.line, span.col, "error", msg),
        })
    }

    pub fn error(&self, error: SyntaxError) -> Error {
        let position = self.position(&error.to_string());
        Error::Syntax { error, position }
    }

    /// `UnexpectedToken` at the current token, or `UnexpectedEnd`.
    pub fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(tok) => self.error(SyntaxError::UnexpectedToken {
                found: tok.to_string(),
                expected: expected.to_string(),
            }),
            None => self.error(SyntaxError::UnexpectedEnd(expected.to_string())),
        }
    }

    pub fn expect_grammar(&mut self, ch: char) -> Result<()> {
        if self.is_grammar(ch) {
            self.index += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{ch}`")))
        }
    }

    pub fn expect_word(&mut self) -> Result<String> {
        match self.peek() {
            Some(TokenKind::Word(w)) => {
                let w = w.clone();
                self.index += 1;
                Ok(w)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// A map key: a bare word or a quoted string.
    pub fn expect_key(&mut self) -> Result<String> {
        match self.peek() {
            Some(TokenKind::Word(w) | TokenKind::String(w)) => {
                let w = w.clone();
                self.index += 1;
                Ok(w)
            }
            _ => Err(self.unexpected("an identifier or string")),
        }
    }

    pub fn expect_string(&mut self) -> Result<String> {
        match self.peek() {
            Some(TokenKind::String(s)) => {
                let s = s.clone();
                self.index += 1;
                Ok(s)
            }
            _ => Err(self.unexpected("a string")),
        }
    }

    /// A shape or member body entry ends at `,`, a newline, or before the closing brace.
    pub fn expect_separator(&mut self, close: char) -> Result<()> {
        match self.peek() {
            Some(TokenKind::Grammar(',')) | Some(TokenKind::Newline) => {
                self.index += 1;
                Ok(())
            }
            Some(TokenKind::Grammar(c)) if *c == close => Ok(()),
            _ => Err(self.unexpected(&format!("`,`, newline or `{close}`"))),
        }
    }
}
