//! Canonical Go formatter.
//!
//! Deterministic, idempotent, and purely textual:
//!
//! - the first `import ( … )` group is sorted by import path and deduplicated,
//! - every line is reindented with tabs to its bracket nesting depth
//!   (`case`/`default` lines sit at the switch level),
//! - blank-line runs collapse to one, trailing whitespace is trimmed, and the
//!   file ends with exactly one newline.
//!
//! Lines inside raw strings and block comments are carried verbatim. The
//! formatter never reprints tokens, so comments and intra-line spacing
//! survive untouched.

use crate::lexer::{lex, TokenKind};
use crate::Result;

/// Format Go source into the canonical form described in the module docs.
///
/// # Errors
///
/// Fails when the source does not lex (unterminated string or comment); the
/// caller treats that as a fatal format failure for the file.
pub fn format(src: &str) -> Result<String> {
    let sorted = sort_imports(src)?;
    reindent(&sorted)
}

/// Sort and deduplicate the specs of the first `import ( … )` group.
fn sort_imports(src: &str) -> Result<String> {
    let tokens = lex(src)?;

    let mut depth = 0usize;
    let mut group: Option<(usize, usize, usize)> = None; // (import start, open end, close start/end)
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        if depth == 0
            && tok.kind == TokenKind::Ident
            && tok.text(src) == "import"
            && tokens.get(i + 1).is_some_and(|t| t.text(src) == "(")
        {
            let open = tokens[i + 1];
            let mut j = i + 2;
            let mut inner = 1usize;
            while j < tokens.len() {
                let t = tokens[j];
                if t.is_opener(src) {
                    inner += 1;
                } else if t.is_closer(src) {
                    inner -= 1;
                    if inner == 0 {
                        break;
                    }
                }
                j += 1;
            }
            if j < tokens.len() {
                group = Some((tok.start, open.end, tokens[j].end));
            }
            break;
        }
        if tok.is_opener(src) {
            depth += 1;
        } else if tok.is_closer(src) {
            depth = depth.saturating_sub(1);
        }
        i += 1;
    }

    let Some((start, body_start, end)) = group else {
        return Ok(src.to_string());
    };

    let body = &src[body_start..end - 1];
    let mut specs: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    specs.sort_by_key(|l| (import_path(l).to_string(), l.to_string()));
    specs.dedup();

    let mut block = String::from("import (\n");
    for spec in specs {
        block.push('\t');
        block.push_str(spec);
        block.push('\n');
    }
    block.push(')');

    let mut out = String::with_capacity(src.len());
    out.push_str(&src[..start]);
    out.push_str(&block);
    out.push_str(&src[end..]);
    Ok(out)
}

/// The quoted path of an import spec line, or the whole line when unquoted.
fn import_path(line: &str) -> &str {
    match (line.find('"'), line.rfind('"')) {
        (Some(a), Some(b)) if b > a => &line[a + 1..b],
        _ => line,
    }
}

#[allow(clippy::too_many_lines)]
fn reindent(src: &str) -> Result<String> {
    let tokens = lex(src)?;

    let mut line_offsets = vec![0usize];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            line_offsets.push(i + 1);
        }
    }
    let line_of = |offset: usize| line_offsets.partition_point(|&s| s <= offset) - 1;
    let line_count = line_offsets.len();

    // Lines whose start lies inside a multi-line token are untouchable.
    let mut verbatim = vec![false; line_count];
    for tok in &tokens {
        if matches!(tok.kind, TokenKind::RawStr | TokenKind::BlockComment) && tok.end > tok.start {
            let first = line_of(tok.start);
            let last = line_of(tok.end - 1);
            for flag in verbatim.iter_mut().take(last + 1).skip(first + 1) {
                *flag = true;
            }
        }
    }

    // Depth at each line's first token, plus that token's index.
    let mut first_token: Vec<Option<usize>> = vec![None; line_count];
    let mut depth_at: Vec<usize> = vec![0; line_count];
    let mut depth = 0usize;
    for (idx, tok) in tokens.iter().enumerate() {
        let line = line_of(tok.start);
        if first_token[line].is_none() {
            first_token[line] = Some(idx);
            depth_at[line] = depth;
        }
        if tok.is_opener(src) {
            depth += 1;
        } else if tok.is_closer(src) {
            depth = depth.saturating_sub(1);
        }
    }

    let mut out_lines: Vec<(String, bool)> = Vec::with_capacity(line_count);
    for line in 0..line_count {
        let line_end = line_offsets
            .get(line + 1)
            .map_or(src.len(), |next| next - 1);

        if verbatim[line] {
            out_lines.push((src[line_offsets[line]..line_end].to_string(), true));
            continue;
        }

        let Some(first_idx) = first_token[line] else {
            out_lines.push((String::new(), false));
            continue;
        };

        // Leading closers pull the line back out.
        let mut closers = 0usize;
        for tok in tokens[first_idx..]
            .iter()
            .take_while(|t| line_of(t.start) == line)
        {
            if tok.is_closer(src) {
                closers += 1;
            } else {
                break;
            }
        }

        let first = tokens[first_idx];
        let mut indent = depth_at[line].saturating_sub(closers);
        if first.kind == TokenKind::Ident && matches!(first.text(src), "case" | "default") {
            indent = indent.saturating_sub(1);
        }

        let content = src[first.start..line_end].trim_end();
        let mut formatted = "\t".repeat(indent);
        formatted.push_str(content);
        out_lines.push((formatted, false));
    }

    // Collapse blank runs and drop leading blanks, except inside verbatim
    // regions; end with one newline.
    let mut out = String::with_capacity(src.len());
    let mut blank_pending = false;
    let mut any = false;
    for (line, verbatim) in &out_lines {
        if line.is_empty() && !verbatim {
            blank_pending = any;
            continue;
        }
        if blank_pending {
            out.push('\n');
            blank_pending = false;
        }
        out.push_str(line);
        out.push('\n');
        any = true;
    }
    Ok(out)
}
