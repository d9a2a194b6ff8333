//! Case lookup and section parsing.
//!
//! A results file is a sequence of top-level cases. A case opens with `<name>` and ends at the first `</name>` after
//! it; tokens between cases are ignored. Inside a case every value must sit in an operation section:
//!
//! ```text
//! <emptyList>
//! <size()>
//! 0
//! </size()>
//! <get(int)>
//! IndexOutOfBounds IndexOutOfBounds
//! </get(int)>
//! </emptyList>
//! ```
//!
//! Section values keep the order they are written in.

use std::path::Path;

use gauntlet_core::Value;
use miette::NamedSource;

use crate::errors::MarkupError;
use crate::lexer::{Span, Token, TokenKind, lex};
use crate::literals::{WordError, parse_word};

/// One operation section of a case.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// The tag text, normally a qualified operation name such as `get(int)`.
    pub operation: String,
    pub values: Vec<Value>,
    /// From the opening tag to the closing tag.
    pub span: Span,
}

/// The parsed sections of one case, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseResults {
    pub name: String,
    pub sections: Vec<Section>,
}

impl CaseResults {
    pub fn get(&self, operation: &str) -> Option<&[Value]> {
        self.sections
            .iter()
            .find(|s| s.operation == operation)
            .map(|s| s.values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

/// Token indices of a located case: its opening and closing tags.
#[derive(Debug, Clone, Copy)]
struct CaseRange<'a> {
    name: &'a str,
    open: usize,
    close: usize,
}

struct OpenSection {
    name: String,
    span: Span,
    values: Vec<Value>,
}

/// A lexed results file.
#[derive(Debug, Clone)]
pub struct ResultsFile {
    name: String,
    source: String,
    tokens: Vec<Token>,
}

impl ResultsFile {
    /// Lex `source`; `name` is used in diagnostics.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let tokens = lex(&source);
        Self {
            name: name.into(),
            source,
            tokens,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MarkupError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| MarkupError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded results file");
        Ok(Self::new(path.display().to_string(), source))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Names of the top-level cases, in file order.
    pub fn case_names(&self) -> Result<Vec<&str>, MarkupError> {
        let mut names = Vec::new();
        let mut from = 0;
        while let Some(range) = self.next_case(from) {
            let range = range?;
            names.push(range.name);
            from = range.close + 1;
        }
        Ok(names)
    }

    /// The raw text between a case's opening and closing tags.
    pub fn case_text(&self, case: &str) -> Result<&str, MarkupError> {
        let range = self.find_case(case)?;
        let start = self.tokens[range.open].span.end;
        let end = self.tokens[range.close].span.start;
        Ok(&self.source[start..end])
    }

    /// Parse the sections of the first case called `case`.
    #[tracing::instrument(skip(self), fields(file = %self.name))]
    pub fn read_case(&self, case: &str) -> Result<CaseResults, MarkupError> {
        let range = self.find_case(case)?;
        let mut sections: Vec<Section> = Vec::new();
        let mut current: Option<OpenSection> = None;

        for token in &self.tokens[range.open + 1..range.close] {
            match &token.kind {
                TokenKind::Open(name) => {
                    if let Some(outer) = &current {
                        return Err(MarkupError::NestedSection {
                            section: name.clone(),
                            outer: outer.name.clone(),
                            src: self.named_source(),
                            span: token.span.into(),
                            outer_span: outer.span.into(),
                        });
                    }
                    if let Some(first) = sections.iter().find(|s| s.operation == *name) {
                        return Err(MarkupError::DuplicateSection {
                            section: name.clone(),
                            case: case.to_string(),
                            src: self.named_source(),
                            span: token.span.into(),
                            first: first.span.into(),
                        });
                    }
                    current = Some(OpenSection {
                        name: name.clone(),
                        span: token.span,
                        values: Vec::new(),
                    });
                }
                TokenKind::Close(name) => {
                    let Some(open) = current.take() else {
                        return Err(self.stray(token));
                    };
                    if *name != open.name {
                        return Err(MarkupError::MismatchedClose {
                            expected: open.name,
                            found: name.clone(),
                            src: self.named_source(),
                            span: token.span.into(),
                        });
                    }
                    sections.push(Section {
                        operation: open.name,
                        values: open.values,
                        span: Span::new(open.span.start, token.span.end),
                    });
                }
                TokenKind::Word(word) => {
                    let Some(open) = current.as_mut() else {
                        return Err(self.stray(token));
                    };
                    open.values.push(self.word_value(word, token.span)?);
                }
                TokenKind::Quoted(text) => {
                    let Some(open) = current.as_mut() else {
                        return Err(self.stray(token));
                    };
                    open.values.push(Value::Str(text.clone()));
                }
            }
        }

        if let Some(open) = current {
            return Err(MarkupError::UnterminatedSection {
                section: open.name,
                src: self.named_source(),
                span: open.span.into(),
            });
        }

        tracing::debug!(sections = sections.len(), "read case");
        Ok(CaseResults {
            name: case.to_string(),
            sections,
        })
    }

    /// Parse every top-level case.
    pub fn read_all(&self) -> Result<Vec<CaseResults>, MarkupError> {
        self.case_names()?.into_iter().map(|name| self.read_case(name)).collect()
    }

    fn find_case(&self, case: &str) -> Result<CaseRange<'_>, MarkupError> {
        let mut from = 0;
        while let Some(range) = self.next_case(from) {
            let range = range?;
            if range.name == case {
                return Ok(range);
            }
            from = range.close + 1;
        }
        Err(MarkupError::CaseNotFound {
            case: case.to_string(),
            file: self.name.clone(),
        })
    }

    /// The first case whose opening tag is at or after token `from`.
    fn next_case(&self, from: usize) -> Option<Result<CaseRange<'_>, MarkupError>> {
        let (open, name) = self.tokens.get(from..)?.iter().enumerate().find_map(|(i, t)| match &t.kind {
            TokenKind::Open(name) => Some((from + i, name.as_str())),
            _ => None,
        })?;
        let close = self.tokens[open + 1..]
            .iter()
            .position(|t| matches!(&t.kind, TokenKind::Close(n) if n == name))
            .map(|i| open + 1 + i);
        Some(match close {
            Some(close) => Ok(CaseRange { name, open, close }),
            None => Err(MarkupError::UnterminatedCase {
                case: name.to_string(),
                src: self.named_source(),
                span: self.tokens[open].span.into(),
            }),
        })
    }

    fn word_value(&self, word: &str, span: Span) -> Result<Value, MarkupError> {
        parse_word(word).map_err(|err| match err {
            WordError::Unknown => MarkupError::UnknownToken {
                token: word.to_string(),
                src: self.named_source(),
                span: span.into(),
            },
            WordError::OutOfRange => MarkupError::IntegerOutOfRange {
                token: word.to_string(),
                src: self.named_source(),
                span: span.into(),
            },
        })
    }

    fn stray(&self, token: &Token) -> MarkupError {
        MarkupError::StrayToken {
            token: self.source[token.span.start..token.span.end].to_string(),
            src: self.named_source(),
            span: token.span.into(),
        }
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_core::{CursorKind, Fault, FaultKind};

    fn file(source: &str) -> ResultsFile {
        ResultsFile::new("test.results", source)
    }

    #[test]
    fn one_line_case_keeps_file_order() {
        let results = file(r#"<caseA><foo>1 2 "x" null</foo></caseA>"#).read_case("caseA").unwrap();
        assert_eq!(
            results.get("foo"),
            Some(&[Value::Int(1), Value::Int(2), Value::Str("x".into()), Value::Null][..])
        );
    }

    #[test]
    fn line_per_tag_layout() {
        let src = "<emptyList>\n<size()>\n0\n</size()>\n<get(int)>\nIndexOutOfBounds\nIndexOutOfBounds\n</get(int)>\n\
                   <iterator()>\nIterator\n</iterator()>\n</emptyList>\n";
        let results = file(src).read_case("emptyList").unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results.get("size()"), Some(&[Value::Int(0)][..]));
        let faults = results.get("get(int)").unwrap();
        assert_eq!(faults.len(), 2);
        assert!(faults.iter().all(|v| v.as_fault().map(Fault::kind) == Some(FaultKind::IndexOutOfBounds)));
        assert_eq!(results.get("iterator()"), Some(&[Value::Cursor(CursorKind::Iterator)][..]));
        assert_eq!(results.get("clear()"), None);
    }

    #[test]
    fn first_matching_case_wins_and_outside_text_is_ignored() {
        let src = "header text\n<a><x()>1</x()></a>\n<b><x()>2</x()></b>\n<a><x()>3</x()></a>";
        let f = file(src);
        assert_eq!(f.case_names().unwrap(), vec!["a", "b", "a"]);
        assert_eq!(f.read_case("a").unwrap().get("x()"), Some(&[Value::Int(1)][..]));
        assert_eq!(f.read_case("b").unwrap().get("x()"), Some(&[Value::Int(2)][..]));
    }

    #[test]
    fn section_name_inside_a_case_is_not_a_case() {
        let f = file("<outer><inner>1</inner></outer>");
        assert!(matches!(f.read_case("inner"), Err(MarkupError::CaseNotFound { .. })));
    }

    #[test]
    fn empty_case_is_empty() {
        let results = file("<nothing>\n</nothing>").read_case("nothing").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn case_text_is_raw_body() {
        assert_eq!(file("<c>\n<op()> 1 </op()>\n</c>").case_text("c").unwrap(), "\n<op()> 1 </op()>\n");
    }

    #[test]
    fn missing_case() {
        let err = file("<a></a>").read_case("zzz").unwrap_err();
        assert_eq!(err.to_string(), "case `zzz` not found in test.results");
    }

    #[test]
    fn unknown_token_is_rejected_with_span() {
        let err = file("<c><op()>1 maybe</op()></c>").read_case("c").unwrap_err();
        match err {
            MarkupError::UnknownToken { token, span, .. } => {
                assert_eq!(token, "maybe");
                assert_eq!(span.offset(), 11);
                assert_eq!(span.len(), 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn format_errors() {
        let cases: &[(&str, &str)] = &[
            ("<c>1</c>", "`1` is outside any operation section"),
            ("<c><a()>1</c>", "section `a()` is never closed"),
            ("<c><a()><b()>", "case `c` is never closed"),
            ("<c><a()><b()></b()></a()></c>", "section `b()` opened inside section `a()`"),
            ("<c><a()></b()></c>", "expected `</a()>`, found `</b()>`"),
            ("<c><a()></a()><a()></a()></c>", "section `a()` appears twice in case `c`"),
            ("<c><a()>99999999999999999999</a()></c>", "integer `99999999999999999999` does not fit in 64 bits"),
            ("<c><a()>1.5</a()></c>", "unrecognized token `1.5`"),
        ];
        for (src, message) in cases {
            let err = file(src).read_case("c").unwrap_err();
            assert_eq!(err.to_string(), *message, "{src}");
        }
    }

    #[test]
    fn read_all_parses_every_case() {
        let all = file("<a><x()>1</x()></a><b></b>").read_all().unwrap();
        assert_eq!(all.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
