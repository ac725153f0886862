//! Formatter dispatcher: one handler per output file extension.
//!
//! Go output runs through the canonical `genx-gosrc` formatter; unknown
//! extensions pass through unchanged. Handler failure is fatal to the
//! pipeline, so handlers must only reject genuinely broken content.

/// Reformat `text` according to its file extension (without the dot).
///
/// # Errors
///
/// Propagates the Go formatter's error for `.go` content that does not lex.
pub fn format_text(extension: Option<&str>, text: &str) -> Result<String, genx_gosrc::Error> {
    match extension {
        Some("go") => genx_gosrc::fmt::format(text),
        _ => Ok(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_extensions_pass_through() {
        assert_eq!(format_text(Some("graphql"), "x  ").unwrap(), "x  ");
        assert_eq!(format_text(None, "x").unwrap(), "x");
    }

    #[test]
    fn go_is_canonicalized() {
        let out = format_text(Some("go"), "package a\nvar  x = 1   \n").unwrap();
        assert_eq!(out, "package a\nvar  x = 1\n");
    }
}
