//! Lightweight Go source model for the genx pipeline.
//!
//! The pipeline emits Go source as plain text and then performs byte-range
//! surgery on it. That workflow needs three things from this crate:
//!
//! - [`lexer`]: an offset-preserving token scan (strings, comments, and
//!   operators are recognized so that brace matching and reindentation never
//!   misfire inside a literal),
//! - [`decl`]: a top-level declaration scanner producing `func`/`type`/
//!   `const`/`var` declarations with the byte spans the surgery pass needs,
//! - [`fmt`]: a deterministic canonical formatter (tab reindentation,
//!   sorted import block, collapsed blank lines).
//!
//! This is deliberately not a full Go parser: statement and expression
//! structure inside function bodies is never inspected, only balanced and
//! carried verbatim.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod decl;
pub mod fmt;
pub mod lexer;

/// Errors produced while scanning or formatting Go source.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A string, rune, or comment literal never terminates.
    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated {
        /// Kind of literal (`string`, `raw string`, `rune`, `comment`).
        what: &'static str,
        /// Byte offset of the opening delimiter.
        offset: usize,
    },

    /// The declaration scanner hit a shape it cannot model.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        offset: usize,
        /// What was expected or found.
        message: String,
    },

    /// The scanner ran out of input mid-declaration.
    #[error("unexpected end of file: {0}")]
    UnexpectedEof(String),
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
