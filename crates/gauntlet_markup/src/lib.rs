//! Reader for the expected-results markup: lexer, case locator, section parser, diagnostics.
//!
//! The format is a private contract between whoever authors expected results and the harness. This crate only reads
//! it; it never writes results files.
//!
//! ## Notes
//! - Value vocabulary (`null`, fault names, cursor names) is resolved through [`literals::LITERALS`] into
//!   `gauntlet_core::Value`s.
//! - Errors carry the source text and spans for miette rendering.
//!
//! ## Examples
//! ```rust
//! use gauntlet_core::Value;
//! use gauntlet_markup::ResultsFile;
//!
//! let file = ResultsFile::new("inline", r#"<caseA><foo>1 2 "x" null</foo></caseA>"#);
//! let case = file.read_case("caseA").unwrap();
//! assert_eq!(case.get("foo").unwrap().len(), 4);
//! assert_eq!(case.get("foo").unwrap()[2], Value::Str("x".into()));
//! ```

pub mod document;
pub mod errors;
pub mod lexer;
pub mod literals;

pub use document::{CaseResults, ResultsFile, Section};
pub use errors::MarkupError;
pub use lexer::{Span, Token, TokenKind, dump_tokens, lex};
