// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, LexicalError, Result};
use crate::Rc;

use core::fmt::{self, Debug, Formatter};
use core::iter::Peekable;
use core::str::CharIndices;

struct SourceInternal {
    pub file: String,
    pub contents: String,
    pub lines: Vec<(u32, u32)>,
}

/// IDL text together with its line table, shared by every token span.
#[derive(Clone)]
pub struct Source {
    src: Rc<SourceInternal>,
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.src.file.fmt(f)
    }
}

impl Source {
    pub fn from_contents(file: impl Into<String>, contents: impl Into<String>) -> Result<Source> {
        let (file, contents) = (file.into(), contents.into());
        let max_size = u32::MAX as usize - 2; // Account for rows, cols possibly starting at 1, EOF etc.
        if contents.len() > max_size {
            return Err(Error::decode(
                &file,
                format!("exceeds maximum allowed model size {max_size}"),
            ));
        }
        let mut lines = vec![];
        let mut prev_ch = ' ';
        let mut prev_pos = 0u32;
        let mut start = 0u32;
        for (i, ch) in contents.char_indices() {
            if ch == '\n' {
                let end = match prev_ch {
                    '\r' => prev_pos,
                    _ => i as u32,
                };
                lines.push((start, end));
                start = i as u32 + 1;
            }
            prev_ch = ch;
            prev_pos = i as u32;
        }

        if (start as usize) < contents.len() || contents.is_empty() {
            lines.push((start, contents.len() as u32));
        } else {
            let s = contents.len() as u32;
            lines.push((s, s));
        }
        Ok(Self {
            src: Rc::new(SourceInternal {
                file,
                contents,
                lines,
            }),
        })
    }

    pub fn file(&self) -> &String {
        &self.src.file
    }

    pub fn contents(&self) -> &String {
        &self.src.contents
    }

    pub fn line(&self, idx: u32) -> &str {
        let idx = idx as usize;
        if idx < self.src.lines.len() {
            let (start, end) = self.src.lines[idx];
            &self.src.contents[start as usize..end as usize]
        } else {
            ""
        }
    }

    pub fn message(&self, line: u32, col: u32, kind: &str, msg: &str) -> String {
        if line == 0 || line as usize > self.src.lines.len() {
            return format!("{}: invalid line {} specified", self.src.file, line);
        }

        let line_str = format!("{line}");
        let line_num_width = line_str.len() + 1;
        let col_spaces = (col as usize).saturating_sub(1);

        format!(
            "\n--> {}:{}:{}\n{:<line_num_width$}|\n\
             {:<line_num_width$}| {}\n\
             {:<line_num_width$}| {:<col_spaces$}^\n\
             {}: {}",
            self.src.file,
            line,
            col,
            "",
            line,
            self.line(line - 1),
            "",
            "",
            kind,
            msg
        )
    }

    pub fn lexical_error(&self, line: u32, col: u32, error: LexicalError) -> Error {
        let context = self.message(line, col, "error", &error.to_string());
        Error::Lexical {
            error,
            line,
            col,
            context,
        }
    }
}

#[derive(Clone)]
pub struct Span {
    pub source: Source,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.source.contents()[self.start as usize..self.end as usize]
    }

    pub fn message(&self, kind: &str, msg: &str) -> String {
        self.source.message(self.line, self.col, kind, msg)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let t = self.text().escape_debug().to_string();
        let max = 32;
        let (txt, trailer) = if t.len() > max {
            (t.get(0..max).unwrap_or(t.as_str()), "...")
        } else {
            (t.as_str(), "")
        };

        f.write_fmt(format_args!(
            "{}:{}:{}:{}, \"{}{}\"",
            self.line, self.col, self.start, self.end, txt, trailer
        ))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    /// Identifiers, keywords, shape types and `@trait` names.
    Word(String),
    /// One of `(){}[]:,=`.
    Grammar(char),
    /// Contents of a quoted or block string after escapes and dedenting.
    String(String),
    Number(String),
    /// Text of a `///` comment.
    Documentation(String),
    Newline,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => f.write_str(w),
            TokenKind::Grammar(c) => write!(f, "{c}"),
            TokenKind::String(s) => write!(f, "{s:?}"),
            TokenKind::Number(n) => f.write_str(n),
            TokenKind::Documentation(d) => write!(f, "/// {d}"),
            TokenKind::Newline => f.write_str("newline"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token(pub TokenKind, pub Span);

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '@' | '.' | '#' | '$' | '_')
}

const BLOCK_DELIMITER: &str = "\"\"\"";

#[derive(Clone)]
pub struct Lexer<'source> {
    source: Source,
    iter: Peekable<CharIndices<'source>>,
    line: u32,
    col: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source Source) -> Self {
        Self {
            source: source.clone(),
            iter: source.contents().char_indices().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> (usize, char) {
        match self.iter.peek() {
            Some((index, chr)) => (*index, *chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn peekahead(&mut self, n: usize) -> (usize, char) {
        match self.iter.clone().nth(n) {
            Some((index, chr)) => (index, chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn at_end(&mut self) -> bool {
        self.iter.peek().is_none()
    }

    // A tab is considered 4 space characters.
    fn bump(&mut self) -> char {
        let ch = self.peek().1;
        self.iter.next();
        self.col += if ch == '\t' { 4 } else { 1 };
        ch
    }

    fn newline(&mut self) {
        self.iter.next();
        self.line += 1;
        self.col = 1;
    }

    fn error(&self, line: u32, col: u32, error: LexicalError) -> Error {
        self.source.lexical_error(line, col, error)
    }

    fn token(&mut self, kind: TokenKind, line: u32, col: u32, start: usize) -> Token {
        let end = self.peek().0;
        Token(
            kind,
            Span {
                source: self.source.clone(),
                line,
                col,
                start: start as u32,
                end: end as u32,
            },
        )
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek().1, ' ' | '\t' | '\r') && !self.at_end() {
            self.bump();
        }
    }

    fn read_word(&mut self) -> Token {
        let (start, _) = self.peek();
        let (line, col) = (self.line, self.col);
        while !self.at_end() && is_word_char(self.peek().1) {
            self.bump();
        }
        let end = self.peek().0;
        let text = self.source.contents()[start..end].to_string();
        self.token(TokenKind::Word(text), line, col, start)
    }

    fn read_number(&mut self) -> Token {
        let (start, _) = self.peek();
        let (line, col) = (self.line, self.col);
        if self.peek().1 == '-' {
            self.bump();
        }
        while !self.at_end() && matches!(self.peek().1, '0'..='9' | '.') {
            self.bump();
        }
        let end = self.peek().0;
        let text = self.source.contents()[start..end].to_string();
        self.token(TokenKind::Number(text), line, col, start)
    }

    // `//` comments are dropped, `///` comments become documentation tokens.
    fn read_comment(&mut self) -> Option<Token> {
        let (start, _) = self.peek();
        let (line, col) = (self.line, self.col);
        self.bump();
        self.bump();
        let is_doc = self.peek().1 == '/';
        if is_doc {
            self.bump();
        }
        let text_start = self.peek().0;
        while !self.at_end() && self.peek().1 != '\n' {
            self.bump();
        }
        if !is_doc {
            return None;
        }
        let end = self.peek().0;
        let text = self.source.contents()[text_start..end]
            .trim()
            .to_string();
        Some(self.token(TokenKind::Documentation(text), line, col, start))
    }

    fn read_string(&mut self) -> Result<Token> {
        let (start, _) = self.peek();
        let (line, col) = (self.line, self.col);
        self.bump();
        let mut text = String::new();
        loop {
            if self.at_end() {
                return Err(self.error(line, col, LexicalError::UnterminatedString));
            }
            match self.peek().1 {
                '"' => {
                    self.bump();
                    break;
                }
                '\n' => return Err(self.error(line, col, LexicalError::UnterminatedString)),
                '\\' => {
                    self.bump();
                    let escape_col = self.col;
                    if self.at_end() {
                        return Err(self.error(line, col, LexicalError::UnterminatedString));
                    }
                    let ch = self.peek().1;
                    text.push(match ch {
                        'n' => '\n',
                        't' => '\t',
                        '"' => '"',
                        '\\' => '\\',
                        '\n' => {
                            return Err(self.error(line, col, LexicalError::UnterminatedString))
                        }
                        _ => {
                            return Err(self.error(
                                line,
                                escape_col,
                                LexicalError::UnrecognizedEscape(ch),
                            ))
                        }
                    });
                    self.bump();
                }
                _ => text.push(self.bump()),
            }
        }
        Ok(self.token(TokenKind::String(text), line, col, start))
    }

    fn is_block_delimiter(&mut self) -> bool {
        self.peek().1 == '"' && self.peekahead(1).1 == '"' && self.peekahead(2).1 == '"'
    }

    fn read_block_string(&mut self) -> Result<Token> {
        let (start, _) = self.peek();
        let (line, col) = (self.line, self.col);
        for _ in 0..BLOCK_DELIMITER.len() {
            self.bump();
        }

        // The opening delimiter must end its line.
        self.skip_ws();
        if self.at_end() {
            return Err(self.error(line, col, LexicalError::UnterminatedString));
        }
        if self.peek().1 != '\n' {
            return Err(self.error(self.line, self.col, LexicalError::CorruptBlockText));
        }
        self.newline();

        let mut lines: Vec<String> = vec![];
        let closing_indent = loop {
            let mut current = String::new();
            while !self.at_end() && matches!(self.peek().1, ' ' | '\t') {
                current.push(self.bump());
            }
            if self.at_end() {
                return Err(self.error(line, col, LexicalError::UnterminatedString));
            }
            if self.is_block_delimiter() {
                for _ in 0..BLOCK_DELIMITER.len() {
                    self.bump();
                }
                break current.chars().count();
            }
            while !self.at_end() && self.peek().1 != '\n' {
                if self.is_block_delimiter() {
                    return Err(self.error(self.line, self.col, LexicalError::CorruptBlockText));
                }
                current.push(self.bump());
            }
            if self.at_end() {
                return Err(self.error(line, col, LexicalError::UnterminatedString));
            }
            self.newline();
            if current.ends_with('\r') {
                current.pop();
            }
            lines.push(current);
        };

        Ok(self.token(
            TokenKind::String(dedent(&lines, closing_indent)),
            line,
            col,
            start,
        ))
    }

    /// Produce the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        loop {
            self.skip_ws();
            if self.at_end() {
                return Ok(None);
            }

            let (start, chr) = self.peek();
            let (line, col) = (self.line, self.col);
            return match chr {
                '\n' => {
                    self.newline();
                    Ok(Some(self.token(TokenKind::Newline, line, col, start)))
                }
                '/' if self.peekahead(1).1 == '/' => match self.read_comment() {
                    Some(tok) => Ok(Some(tok)),
                    None => continue,
                },
                '(' | ')' | '{' | '}' | '[' | ']' | ':' | ',' | '=' => {
                    self.bump();
                    Ok(Some(self.token(TokenKind::Grammar(chr), line, col, start)))
                }
                '"' if self.is_block_delimiter() => self.read_block_string().map(Some),
                '"' => self.read_string().map(Some),
                '-' if self.peekahead(1).1.is_ascii_digit() => Ok(Some(self.read_number())),
                _ if chr.is_ascii_digit() => Ok(Some(self.read_number())),
                _ if is_word_char(chr) => Ok(Some(self.read_word())),
                _ => Err(self.error(line, col, LexicalError::UnrecognizedCharacter(chr))),
            };
        }
    }
}

/// Strip the common leading indentation of a block string. The closing
/// delimiter's indentation takes part; whitespace-only lines do not.
fn dedent(lines: &[String], closing_indent: usize) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| matches!(c, ' ' | '\t')).count())
        .fold(closing_indent, usize::min);

    let mut text = String::new();
    for l in lines {
        text.extend(l.chars().skip(indent));
        text.push('\n');
    }
    text
}

/// Convert IDL text into a flat token list.
pub fn tokenize(source: &Source) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];
    while let Some(tok) = lexer.next_token()? {
        tokens.push(tok);
    }
    log::trace!("{}: {} tokens", source.file(), tokens.len());
    Ok(tokens)
}
