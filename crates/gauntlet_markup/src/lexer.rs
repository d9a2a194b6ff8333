//! Lexer for the expected-results markup.
//!
//! A token is the longest match, tried in this order at each non-whitespace position:
//! - a tag: `<` up to the next `>` (inner whitespace allowed, e.g. `<add(i64, Object)>`),
//! - a quoted string: `"` up to the next `"` (contents kept verbatim, newlines included),
//! - a word: a run of non-whitespace characters, ending before the next `<`.
//!
//! Stopping words at `<` lets a whole case sit on one line (`<c><op>1 null</op></c>`). An unclosed `<` or `"`
//! falls through to the word rule. Lexing never fails; unknown words are rejected later by
//! the section parser.
//!
//! ## Notes
//! - There is no escape syntax. A quoted string cannot contain `"`; `<` and `>` inside quotes happen to survive
//!   lexing but are not a supported part of the format.

use std::fmt;

use miette::SourceSpan;

/// Byte range of a token in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start..span.end).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name>`
    Open(String),
    /// `</name>`
    Close(String),
    /// `"text"`, stored without the quotes.
    Quoted(String),
    /// Any other whitespace-delimited run.
    Word(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Open(name) => write!(f, "open <{}>", name),
            TokenKind::Close(name) => write!(f, "close </{}>", name),
            TokenKind::Quoted(text) => write!(f, "quoted \"{}\"", text),
            TokenKind::Word(text) => write!(f, "word {}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }
            let start = self.pos;
            let scanned = match c {
                '<' => self.scan_delimited(start, '>'),
                '"' => self.scan_delimited(start, '"'),
                _ => None,
            };
            let end = scanned.unwrap_or_else(|| self.word_end(start));
            self.pos = end;
            let kind = classify(&self.source[start..end], scanned.is_some());
            self.tokens.push(Token::new(kind, Span::new(start, end)));
        }
        self.tokens
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// End offset (exclusive) of a token that opens at `start` and runs to the next `close`.
    fn scan_delimited(&self, start: usize, close: char) -> Option<usize> {
        let body = start + 1;
        self.source[body..].find(close).map(|offset| body + offset + close.len_utf8())
    }

    fn word_end(&self, start: usize) -> usize {
        self.source[start..]
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c.is_whitespace() || c == '<')
            .map_or(self.source.len(), |(offset, _)| start + offset)
    }
}

fn classify(text: &str, delimited: bool) -> TokenKind {
    if !delimited {
        return TokenKind::Word(text.to_string());
    }
    let inner = &text[1..text.len() - 1];
    if text.starts_with('"') {
        TokenKind::Quoted(inner.to_string())
    } else if let Some(name) = inner.strip_prefix('/') {
        TokenKind::Close(name.to_string())
    } else {
        TokenKind::Open(inner.to_string())
    }
}

/// Tokenize a markup document.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

/// Render tokens one per line as `start..end kind` (debug output).
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&format!("{}..{} {}\n", token.span.start, token.span.end, token.kind));
    }
    out
}
