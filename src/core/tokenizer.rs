// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line tokenizer for assembly source.
//!
//! A trimmed line is split into words, single-character symbols and quoted
//! strings. The token buffer is owned by the [`Tokenizer`] and reused for
//! every line.

use thiserror::Error;

use crate::core::lexer::{is_symbol, is_white, COMMENT_CHAR, QUOTE_CHAR};

/// Maximum number of tokens in one statement.
pub const MAX_TOKENS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Symbol,
    /// Blank run. Skipped by the line tokenizer and never stored.
    Whitespace,
    QuotedString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn is_symbol(&self, c: char) -> bool {
        self.kind == TokenKind::Symbol && self.text.len() == 1 && self.text.starts_with(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("too many tokens")]
    TooManyTokens,
    #[error("unterminated string")]
    UnterminatedString,
}

/// Strip the comment and surrounding blanks from a raw source line.
///
/// A `;` inside a quoted string does not start a comment.
pub fn trim_line(raw: &str) -> &str {
    let mut in_quote = false;
    let mut escape = false;
    let mut end = raw.len();
    for (idx, c) in raw.char_indices() {
        match c {
            _ if escape => escape = false,
            '\\' if in_quote => escape = true,
            QUOTE_CHAR => in_quote = !in_quote,
            COMMENT_CHAR if !in_quote => {
                end = idx;
                break;
            }
            _ => {}
        }
    }
    raw[..end].trim_matches(is_white)
}

/// Byte cursor over a single line.
struct LineScanner<'a> {
    line: &'a str,
    input: &'a [u8],
    cursor: usize,
}

impl<'a> LineScanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            input: line.as_bytes(),
            cursor: 0,
        }
    }

    fn current_byte(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    fn peek_raw_byte(&self, offset: usize) -> Option<u8> {
        self.input.get(self.cursor + offset).copied()
    }

    fn skip_white(&mut self) {
        while let Some(c) = self.current_byte() {
            if !is_white(c as char) {
                break;
            }
            self.cursor += 1;
        }
    }

    fn is_word_end(c: u8) -> bool {
        c.is_ascii() && (is_white(c as char) || is_symbol(c as char) || c == QUOTE_CHAR as u8)
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.skip_white();
        let Some(c) = self.current_byte() else {
            return Ok(None);
        };

        if c == QUOTE_CHAR as u8 {
            return self.scan_quoted().map(Some);
        }

        let start = self.cursor;
        if c.is_ascii() && is_symbol(c as char) {
            self.cursor += 1;
            return Ok(Some(Token::new(
                &self.line[start..self.cursor],
                TokenKind::Symbol,
            )));
        }

        while let Some(c) = self.current_byte() {
            if Self::is_word_end(c) {
                break;
            }
            self.cursor += 1;
        }
        Ok(Some(Token::new(
            &self.line[start..self.cursor],
            TokenKind::Word,
        )))
    }

    fn scan_quoted(&mut self) -> Result<Token, TokenizeError> {
        self.cursor += 1;
        let mut bytes = Vec::new();
        loop {
            match self.current_byte() {
                None => return Err(TokenizeError::UnterminatedString),
                Some(b'\\') if self.peek_raw_byte(1) == Some(QUOTE_CHAR as u8) => {
                    bytes.push(QUOTE_CHAR as u8);
                    self.cursor += 2;
                }
                Some(c) if c == QUOTE_CHAR as u8 => {
                    self.cursor += 1;
                    break;
                }
                Some(c) => {
                    bytes.push(c);
                    self.cursor += 1;
                }
            }
        }
        Ok(Token::new(
            String::from_utf8_lossy(&bytes),
            TokenKind::QuotedString,
        ))
    }
}

/// Reusable line tokenizer.
#[derive(Debug, Default)]
pub struct Tokenizer {
    tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            tokens: Vec::with_capacity(MAX_TOKENS),
        }
    }

    /// Split `line` into at most `max_tokens` tokens.
    ///
    /// The previous line's tokens are discarded first. On error the buffer
    /// keeps whatever was scanned before the failure.
    pub fn tokenize_line(&mut self, line: &str, max_tokens: usize) -> Result<&[Token], TokenizeError> {
        self.tokens.clear();
        let mut scanner = LineScanner::new(line);
        while let Some(token) = scanner.next_token()? {
            if self.tokens.len() >= max_tokens {
                return Err(TokenizeError::TooManyTokens);
            }
            self.tokens.push(token);
        }
        Ok(&self.tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
