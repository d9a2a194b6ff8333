//! Errors raised while loading or reading a results file.
//!
//! Every variant that points into the file carries the source and a labelled span so the CLI can render it with
//! miette's graphical handler.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MarkupError {
    #[error("failed to read results file {path}")]
    #[diagnostic(code(gauntlet::markup::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("case `{case}` not found in {file}")]
    #[diagnostic(
        code(gauntlet::markup::case_not_found),
        help("case names are matched exactly; run `gauntlet check` to list the cases in a file")
    )]
    CaseNotFound { case: String, file: String },

    #[error("case `{case}` is never closed")]
    #[diagnostic(code(gauntlet::markup::unterminated_case))]
    UnterminatedCase {
        case: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("opened here")]
        span: SourceSpan,
    },

    #[error("unrecognized token `{token}`")]
    #[diagnostic(
        code(gauntlet::markup::unknown_token),
        help("expected null, true, false, a fault name, a cursor name, an integer or a quoted string")
    )]
    UnknownToken {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a value literal")]
        span: SourceSpan,
    },

    #[error("integer `{token}` does not fit in 64 bits")]
    #[diagnostic(code(gauntlet::markup::integer_out_of_range))]
    IntegerOutOfRange {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("section `{section}` is never closed")]
    #[diagnostic(code(gauntlet::markup::unterminated_section))]
    UnterminatedSection {
        section: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("opened here")]
        span: SourceSpan,
    },

    #[error("section `{section}` opened inside section `{outer}`")]
    #[diagnostic(
        code(gauntlet::markup::nested_section),
        help("operation sections cannot nest; close the outer section first")
    )]
    NestedSection {
        section: String,
        outer: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("nested section")]
        span: SourceSpan,
        #[label("inside this section")]
        outer_span: SourceSpan,
    },

    #[error("expected `</{expected}>`, found `</{found}>`")]
    #[diagnostic(code(gauntlet::markup::mismatched_close))]
    MismatchedClose {
        expected: String,
        found: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("does not close the open section")]
        span: SourceSpan,
    },

    #[error("`{token}` is outside any operation section")]
    #[diagnostic(
        code(gauntlet::markup::stray_token),
        help("values belong between `<operation(..)>` and `</operation(..)>`")
    )]
    StrayToken {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("stray")]
        span: SourceSpan,
    },

    #[error("section `{section}` appears twice in case `{case}`")]
    #[diagnostic(code(gauntlet::markup::duplicate_section))]
    DuplicateSection {
        section: String,
        case: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("repeated here")]
        span: SourceSpan,
        #[label("first defined here")]
        first: SourceSpan,
    },
}
