//! Offset-preserving Go token scan.
//!
//! Produces a flat token list over the original byte offsets. No token text
//! is copied; callers slice the source with [`Token::text`]. Comments are
//! ordinary tokens so that downstream passes can either honor them (the
//! formatter) or filter them out (the declaration scanner).

use crate::{Error, Result};

/// Token classification. Coarser than the Go spec: everything that is not a
/// name, literal, or comment is an [`TokenKind::Op`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword (`func`, `type`, names).
    Ident,
    /// Integer, float, or imaginary literal (scanned loosely, never decoded).
    Number,
    /// Interpreted string literal, quotes included.
    Str,
    /// Raw string literal, backquotes included. May span lines.
    RawStr,
    /// Rune literal, quotes included.
    Rune,
    /// `// …` comment, newline excluded.
    LineComment,
    /// `/* … */` comment. May span lines.
    BlockComment,
    /// Operator or delimiter, maximal munch (`:=`, `...`, `==`, `(`, …).
    Op,
}

/// A token over `[start, end)` byte offsets of the scanned source.
#[derive(Debug, Clone, Copy)]
pub struct Token {
    /// Classification.
    pub kind: TokenKind,
    /// Byte offset of the first byte.
    pub start: usize,
    /// Byte offset one past the last byte.
    pub end: usize,
}

impl Token {
    /// Slice the source text this token covers.
    #[must_use]
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    /// True for `)`, `]`, and `}`.
    #[must_use]
    pub fn is_closer(&self, src: &str) -> bool {
        self.kind == TokenKind::Op && matches!(self.text(src), ")" | "]" | "}")
    }

    /// True for `(`, `[`, and `{`.
    #[must_use]
    pub fn is_opener(&self, src: &str) -> bool {
        self.kind == TokenKind::Op && matches!(self.text(src), "(" | "[" | "{")
    }
}

/// Multi-byte operators, longest first so maximal munch works by scanning
/// the table in order.
const OPS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^",
];

/// Scan `src` into tokens.
///
/// # Errors
///
/// Returns [`Error::Unterminated`] when a string, rune, or block comment
/// never closes. Interpreted strings and runes may not contain a newline.
pub fn lex(src: &str) -> Result<Vec<Token>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let start = i;
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                tokens.push(Token { kind: TokenKind::LineComment, start, end: i });
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                i += 2;
                loop {
                    if i + 1 >= bytes.len() {
                        return Err(Error::Unterminated { what: "comment", offset: start });
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                tokens.push(Token { kind: TokenKind::BlockComment, start, end: i });
            }
            b'"' => {
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(Error::Unterminated { what: "string", offset: start })
                        }
                        Some(b'\\') => i += 2,
                        Some(b'"') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token { kind: TokenKind::Str, start, end: i });
            }
            b'`' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'`' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(Error::Unterminated { what: "raw string", offset: start });
                }
                i += 1;
                tokens.push(Token { kind: TokenKind::RawStr, start, end: i });
            }
            b'\'' => {
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(Error::Unterminated { what: "rune", offset: start })
                        }
                        Some(b'\\') => i += 2,
                        Some(b'\'') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token { kind: TokenKind::Rune, start, end: i });
            }
            _ if is_ident_start(src, i) => {
                let start = i;
                i = scan_while(src, i, is_ident_continue);
                tokens.push(Token { kind: TokenKind::Ident, start, end: i });
            }
            b'0'..=b'9' => {
                let (start, end) = scan_number(bytes, i);
                i = end;
                tokens.push(Token { kind: TokenKind::Number, start, end });
            }
            b'.' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                let (start, end) = scan_number(bytes, i);
                i = end;
                tokens.push(Token { kind: TokenKind::Number, start, end });
            }
            _ => {
                let start = i;
                let rest = &src[i..];
                let len = OPS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .map_or_else(|| src[i..].chars().next().map_or(1, char::len_utf8), |op| op.len());
                i += len;
                tokens.push(Token { kind: TokenKind::Op, start, end: i });
            }
        }
    }

    Ok(tokens)
}

fn is_ident_start(src: &str, i: usize) -> bool {
    src[i..]
        .chars()
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn scan_while(src: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    for (off, c) in src[start..].char_indices() {
        if !pred(c) {
            return start + off;
        }
        end = start + off + c.len_utf8();
    }
    end
}

/// Loose numeric scan: digits, hex/binary/octal letters, `_` separators,
/// decimal points, and exponent signs. Values are never decoded, so over-
/// acceptance is harmless.
fn scan_number(bytes: &[u8], start: usize) -> (usize, usize) {
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
            i += 1;
        } else if (b == b'+' || b == b'-')
            && matches!(bytes.get(i.wrapping_sub(1)), Some(b'e' | b'E' | b'p' | b'P'))
        {
            i += 1;
        } else {
            break;
        }
    }
    (start, i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        lex(src)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text(src)))
            .collect()
    }

    #[test]
    fn scans_idents_ops_and_literals() {
        assert_eq!(
            kinds(r#"x := foo("a", 1.5)"#),
            vec![
                (TokenKind::Ident, "x"),
                (TokenKind::Op, ":="),
                (TokenKind::Ident, "foo"),
                (TokenKind::Op, "("),
                (TokenKind::Str, "\"a\""),
                (TokenKind::Op, ","),
                (TokenKind::Number, "1.5"),
                (TokenKind::Op, ")"),
            ]
        );
    }

    #[test]
    fn braces_inside_strings_are_opaque() {
        let toks = kinds(r#"s := "{not a brace}" // {nor this}"#);
        assert_eq!(toks[2].0, TokenKind::Str);
        assert_eq!(toks[3].0, TokenKind::LineComment);
    }

    #[test]
    fn raw_strings_span_lines() {
        let src = "t := `line1\nline2`";
        let toks = kinds(src);
        assert_eq!(toks[2], (TokenKind::RawStr, "`line1\nline2`"));
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        assert_eq!(kinds(r#""a\"b""#), vec![(TokenKind::Str, r#""a\"b""#)]);
    }

    #[test]
    fn unterminated_block_comment_errors() {
        assert!(matches!(
            lex("/* never closed"),
            Err(Error::Unterminated { what: "comment", .. })
        ));
    }

    #[test]
    fn maximal_munch_operators() {
        assert_eq!(
            kinds("a == b <= c ..."),
            vec![
                (TokenKind::Ident, "a"),
                (TokenKind::Op, "=="),
                (TokenKind::Ident, "b"),
                (TokenKind::Op, "<="),
                (TokenKind::Ident, "c"),
                (TokenKind::Op, "..."),
            ]
        );
    }
}
