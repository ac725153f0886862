//! Top-level declaration scanner.
//!
//! Walks the token stream and models exactly the declaration shapes the
//! surgery pass cares about: `func` (with receiver, type parameters, and
//! body span), and `type`/`const`/`var`/`import` groups with their specs.
//! Everything inside a function body or composite type is balanced over
//! brackets and carried as an opaque byte span.
//!
//! All spans are byte offsets into the scanned source, so replacements can
//! be computed without reprinting any node.

use crate::lexer::{lex, Token, TokenKind};
use crate::{Error, Result};

/// A half-open byte range over the scanned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Slice the source text this span covers.
    #[must_use]
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// A named position: identifier text plus its span.
#[derive(Debug, Clone)]
pub struct Ident {
    /// Identifier text.
    pub name: String,
    /// Span of the identifier token.
    pub span: Span,
}

/// Method receiver, e.g. `(u *User[T, A])` → name `u`, type `User`.
#[derive(Debug, Clone)]
pub struct Receiver {
    /// Binding name, if the receiver is named.
    pub name: Option<String>,
    /// Base type name, pointer and type arguments stripped.
    pub type_name: String,
}

/// A top-level `func` declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    /// Span from the `func` keyword through the closing body brace.
    pub span: Span,
    /// Receiver, when this is a method.
    pub receiver: Option<Receiver>,
    /// Function or method name.
    pub name: Ident,
    /// Inner span of the parameter list (between the parentheses).
    pub params: Span,
    /// Span of the result list (parentheses included when present).
    pub results: Option<Span>,
    /// Body span, braces included.
    pub body: Span,
    /// Parameter names in declaration order.
    pub arg_names: Vec<String>,
}

/// Keyword of a [`GenDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKeyword {
    /// `const`
    Const,
    /// `var`
    Var,
    /// `type`
    Type,
    /// `import`
    Import,
}

/// A `type`, `const`, `var`, or `import` declaration, grouped or not.
#[derive(Debug, Clone)]
pub struct GenDecl {
    /// Declaration keyword.
    pub keyword: GenKeyword,
    /// Span from the keyword through the last spec (or closing paren).
    pub span: Span,
    /// Individual specs, one per entry in the group.
    pub specs: Vec<Spec>,
}

/// One spec inside a [`GenDecl`].
#[derive(Debug, Clone)]
pub enum Spec {
    /// `Name Type` or `Name = Type` inside a `type` declaration.
    Type(TypeSpec),
    /// `a, b Type = x, y` inside a `const` or `var` declaration.
    Value(ValueSpec),
    /// An import spec, opaque.
    Import(Span),
}

impl Spec {
    /// Span covering the whole spec.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Spec::Type(s) => s.span,
            Spec::Value(s) => s.span,
            Spec::Import(s) => *s,
        }
    }
}

/// A single type spec.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    /// Declared type name.
    pub name: Ident,
    /// Span of the whole spec.
    pub span: Span,
}

/// A single const/var spec. `values` is empty for declarations without an
/// initializer; otherwise it holds one span per comma-separated expression.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    /// Declared names, left to right.
    pub names: Vec<Ident>,
    /// Initializer expression spans, left to right.
    pub values: Vec<Span>,
    /// Span of the whole spec.
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    /// Function or method.
    Func(FuncDecl),
    /// `type`/`const`/`var`/`import` declaration.
    Gen(GenDecl),
}

impl Decl {
    /// Span covering the whole declaration.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Decl::Func(f) => f.span,
            Decl::Gen(g) => g.span,
        }
    }
}

/// Parse the top-level declarations of a Go source file.
///
/// The `package` clause is consumed and discarded. Comments never appear in
/// the declaration model; spans index the original text, so comment bytes
/// inside a body are carried verbatim by whoever slices the span.
///
/// # Errors
///
/// Returns [`Error::Syntax`] on a top-level shape the scanner does not
/// model and [`Error::UnexpectedEof`] when input ends mid-declaration.
pub fn parse_file(src: &str) -> Result<Vec<Decl>> {
    let toks: Vec<Token> = lex(src)?
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenKind::LineComment | TokenKind::BlockComment))
        .collect();
    let lines = line_starts(src);
    let mut p = Parser { src, toks, lines, pos: 0 };
    p.parse()
}

fn line_starts(src: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in src.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

struct Parser<'a> {
    src: &'a str,
    toks: Vec<Token>,
    lines: Vec<usize>,
    pos: usize,
}

impl Parser<'_> {
    fn parse(&mut self) -> Result<Vec<Decl>> {
        let mut decls = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.text(self.src) {
                ";" => {
                    self.pos += 1;
                }
                "package" => {
                    self.bump("package clause")?;
                    self.expect_ident()?;
                }
                "func" => decls.push(Decl::Func(self.parse_func()?)),
                "import" => decls.push(Decl::Gen(self.parse_gen(GenKeyword::Import)?)),
                "type" => decls.push(Decl::Gen(self.parse_gen(GenKeyword::Type)?)),
                "const" => decls.push(Decl::Gen(self.parse_gen(GenKeyword::Const)?)),
                "var" => decls.push(Decl::Gen(self.parse_gen(GenKeyword::Var)?)),
                other => {
                    return Err(Error::Syntax {
                        offset: tok.start,
                        message: format!("unexpected top-level token `{other}`"),
                    })
                }
            }
        }
        Ok(decls)
    }

    fn peek(&self) -> Option<Token> {
        self.toks.get(self.pos).copied()
    }

    fn bump(&mut self, context: &str) -> Result<Token> {
        let tok = self
            .peek()
            .ok_or_else(|| Error::UnexpectedEof(context.to_string()))?;
        self.pos += 1;
        Ok(tok)
    }

    fn at_text(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.text(self.src) == text)
    }

    fn expect_text(&mut self, text: &str) -> Result<Token> {
        let tok = self.bump(text)?;
        if tok.text(self.src) == text {
            Ok(tok)
        } else {
            Err(Error::Syntax {
                offset: tok.start,
                message: format!("expected `{}`, found `{}`", text, tok.text(self.src)),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<Ident> {
        let tok = self.bump("identifier")?;
        if tok.kind == TokenKind::Ident {
            Ok(Ident {
                name: tok.text(self.src).to_string(),
                span: Span { start: tok.start, end: tok.end },
            })
        } else {
            Err(Error::Syntax {
                offset: tok.start,
                message: format!("expected identifier, found `{}`", tok.text(self.src)),
            })
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.lines.partition_point(|&s| s <= offset) - 1
    }

    /// Consume a balanced bracket group starting at the current opener.
    /// Returns the opening and closing tokens.
    fn skip_balanced(&mut self) -> Result<(Token, Token)> {
        let open = self.bump("bracket group")?;
        if !open.is_opener(self.src) {
            return Err(Error::Syntax {
                offset: open.start,
                message: format!("expected bracket group, found `{}`", open.text(self.src)),
            });
        }
        let mut depth = 1usize;
        loop {
            let tok = self.bump("closing bracket")?;
            if tok.is_opener(self.src) {
                depth += 1;
            } else if tok.is_closer(self.src) {
                depth -= 1;
                if depth == 0 {
                    return Ok((open, tok));
                }
            }
        }
    }

    /// Go's semicolon-insertion rule, reduced: a spec (or expression) may end
    /// at a line break only after one of these tokens.
    fn ends_statement(&self, tok: Token) -> bool {
        match tok.kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::Str
            | TokenKind::RawStr
            | TokenKind::Rune => true,
            TokenKind::Op => matches!(tok.text(self.src), ")" | "]" | "}" | "++" | "--"),
            TokenKind::LineComment | TokenKind::BlockComment => false,
        }
    }

    /// True when the next token still belongs to the spec that ended with
    /// `last`: either same line, or `last` cannot terminate a statement.
    fn spec_continues(&self, last: Token) -> bool {
        match self.peek() {
            None => false,
            Some(next) => {
                if next.text(self.src) == ")" || next.text(self.src) == ";" {
                    false
                } else if self.line_of(next.start) == self.line_of(last.start) {
                    true
                } else {
                    !self.ends_statement(last)
                }
            }
        }
    }

    fn parse_func(&mut self) -> Result<FuncDecl> {
        let kw = self.expect_text("func")?;

        let receiver = if self.at_text("(") {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name = self.expect_ident()?;

        if self.at_text("[") {
            self.skip_balanced()?; // type parameters
        }

        if !self.at_text("(") {
            return Err(Error::Syntax {
                offset: self.peek().map_or(self.src.len(), |t| t.start),
                message: format!("expected parameter list after `{}`", name.name),
            });
        }
        let param_open = self.pos;
        let (open, close) = self.skip_balanced()?;
        let inner = &self.toks[param_open + 1..self.pos - 1];
        let arg_names = param_names(self.src, inner);
        let params = Span { start: open.end, end: close.start };

        let results = self.parse_results()?;

        if !self.at_text("{") {
            return Err(Error::Syntax {
                offset: self.peek().map_or(self.src.len(), |t| t.start),
                message: format!("expected body for `{}`", name.name),
            });
        }
        let (body_open, body_close) = self.skip_balanced()?;
        let body = Span { start: body_open.start, end: body_close.end };

        Ok(FuncDecl {
            span: Span { start: kw.start, end: body.end },
            receiver,
            name,
            params,
            results,
            body,
            arg_names,
        })
    }

    fn parse_receiver(&mut self) -> Result<Receiver> {
        let group_start = self.pos;
        self.skip_balanced()?;
        let inner = &self.toks[group_start + 1..self.pos - 1];

        let (name, rest) = if inner.len() >= 2 && inner[0].kind == TokenKind::Ident {
            (Some(inner[0].text(self.src).to_string()), &inner[1..])
        } else {
            (None, inner)
        };
        let type_name = rest
            .iter()
            .find(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(self.src).to_string())
            .ok_or_else(|| Error::Syntax {
                offset: inner.first().map_or(0, |t| t.start),
                message: "receiver has no base type name".to_string(),
            })?;
        Ok(Receiver { name, type_name })
    }

    /// Scan result tokens up to the body brace. `struct`/`interface` literal
    /// types get their brace group consumed as part of the result span.
    fn parse_results(&mut self) -> Result<Option<Span>> {
        if self.at_text("{") {
            return Ok(None);
        }
        if self.at_text("(") {
            let (open, close) = self.skip_balanced()?;
            return Ok(Some(Span { start: open.start, end: close.end }));
        }

        let mut first: Option<Token> = None;
        let mut last: Option<Token> = None;
        loop {
            let Some(tok) = self.peek() else {
                return Err(Error::UnexpectedEof("function results".to_string()));
            };
            if tok.text(self.src) == "{" {
                break;
            }
            if matches!(tok.text(self.src), "struct" | "interface") {
                let t = self.bump("type literal")?;
                first.get_or_insert(t);
                let (_, close) = self.skip_balanced()?;
                last = Some(close);
                continue;
            }
            if tok.is_opener(self.src) {
                let (open, close) = self.skip_balanced()?;
                first.get_or_insert(open);
                last = Some(close);
                continue;
            }
            let t = self.bump("result type")?;
            first.get_or_insert(t);
            last = Some(t);
        }
        Ok(match (first, last) {
            (Some(f), Some(l)) => Some(Span { start: f.start, end: l.end }),
            _ => None,
        })
    }

    fn parse_gen(&mut self, keyword: GenKeyword) -> Result<GenDecl> {
        let kw = self.bump("declaration keyword")?;
        let mut specs = Vec::new();
        let end;

        if self.at_text("(") {
            self.bump("group open")?;
            loop {
                while self.at_text(";") {
                    self.pos += 1;
                }
                if self.at_text(")") {
                    end = self.bump("group close")?.end;
                    break;
                }
                if self.peek().is_none() {
                    return Err(Error::UnexpectedEof("declaration group".to_string()));
                }
                specs.push(self.parse_spec(keyword)?);
            }
        } else {
            let spec = self.parse_spec(keyword)?;
            end = spec.span().end;
            specs.push(spec);
        }

        Ok(GenDecl {
            keyword,
            span: Span { start: kw.start, end },
            specs,
        })
    }

    fn parse_spec(&mut self, keyword: GenKeyword) -> Result<Spec> {
        match keyword {
            GenKeyword::Import => self.parse_import_spec(),
            GenKeyword::Type => self.parse_type_spec(),
            GenKeyword::Const | GenKeyword::Var => self.parse_value_spec(),
        }
    }

    fn parse_import_spec(&mut self) -> Result<Spec> {
        let first = self.bump("import spec")?;
        if first.kind == TokenKind::Str {
            return Ok(Spec::Import(Span { start: first.start, end: first.end }));
        }
        // alias form: `name "path"` or `. "path"`
        let path = self.bump("import path")?;
        if path.kind != TokenKind::Str {
            return Err(Error::Syntax {
                offset: path.start,
                message: "expected import path string".to_string(),
            });
        }
        Ok(Spec::Import(Span { start: first.start, end: path.end }))
    }

    fn parse_type_spec(&mut self) -> Result<Spec> {
        let name = self.expect_ident()?;
        let mut last = self.toks[self.pos - 1];
        loop {
            if !self.spec_continues(last) {
                break;
            }
            let Some(tok) = self.peek() else { break };
            if tok.is_opener(self.src) {
                let (_, close) = self.skip_balanced()?;
                last = close;
            } else {
                last = self.bump("type spec")?;
            }
        }
        let span = Span { start: name.span.start, end: last.end };
        Ok(Spec::Type(TypeSpec { name, span }))
    }

    fn parse_value_spec(&mut self) -> Result<Spec> {
        let first = self.expect_ident()?;
        let start = first.span.start;
        let mut names = vec![first];
        let mut last = self.toks[self.pos - 1];

        while self.at_text(",") {
            self.bump("name list comma")?;
            let name = self.expect_ident()?;
            last = self.toks[self.pos - 1];
            names.push(name);
        }

        // Optional type tokens up to `=` or the end of the spec.
        let mut values = Vec::new();
        loop {
            if self.at_text("=") {
                self.bump("assignment")?;
                values = self.parse_value_list()?;
                if let Some(v) = values.last() {
                    last = Token {
                        kind: TokenKind::Op,
                        start: v.start,
                        end: v.end,
                    };
                }
                break;
            }
            if !self.spec_continues(last) {
                break;
            }
            let Some(tok) = self.peek() else { break };
            if tok.is_opener(self.src) {
                let (_, close) = self.skip_balanced()?;
                last = close;
            } else {
                last = self.bump("value spec type")?;
            }
        }

        Ok(Spec::Value(ValueSpec {
            names,
            values,
            span: Span { start, end: last.end },
        }))
    }

    /// One expression span per top-level comma.
    fn parse_value_list(&mut self) -> Result<Vec<Span>> {
        let mut values = Vec::new();
        loop {
            let mut first: Option<Token> = None;
            let mut last: Option<Token> = None;
            loop {
                let Some(tok) = self.peek() else { break };
                if tok.text(self.src) == "," {
                    break;
                }
                if let Some(l) = last {
                    if !self.spec_continues(l) {
                        break;
                    }
                } else if tok.text(self.src) == ")" || tok.text(self.src) == ";" {
                    break;
                }
                if tok.is_opener(self.src) {
                    let (open, close) = self.skip_balanced()?;
                    first.get_or_insert(open);
                    last = Some(close);
                } else {
                    let t = self.bump("value expression")?;
                    first.get_or_insert(t);
                    last = Some(t);
                }
            }
            match (first, last) {
                (Some(f), Some(l)) => values.push(Span { start: f.start, end: l.end }),
                _ => {
                    return Err(Error::Syntax {
                        offset: self.peek().map_or(self.src.len(), |t| t.start),
                        message: "expected value expression".to_string(),
                    })
                }
            }
            if self.at_text(",") {
                self.bump("value list comma")?;
            } else {
                break;
            }
        }
        Ok(values)
    }
}

/// Parameter names in order: split the inner token run on top-level commas
/// and take the leading identifier of each group. Name-only groups (`x` in
/// `x, y T`) contribute their single token.
fn param_names(src: &str, inner: &[Token]) -> Vec<String> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut group_start = true;
    for tok in inner {
        if tok.is_opener(src) {
            depth += 1;
        } else if tok.is_closer(src) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tok.text(src) == "," {
            group_start = true;
            continue;
        }
        if group_start {
            if tok.kind == TokenKind::Ident {
                names.push(tok.text(src).to_string());
            }
            group_start = false;
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Decl> {
        parse_file(src).expect("parse should succeed")
    }

    #[test]
    fn plain_function() {
        let src = "package main\n\nfunc Create() {}\n";
        let decls = parse(src);
        assert_eq!(decls.len(), 1);
        let Decl::Func(f) = &decls[0] else { panic!("expected func") };
        assert_eq!(f.name.name, "Create");
        assert!(f.receiver.is_none());
        assert!(f.results.is_none());
        assert_eq!(f.body.text(src), "{}");
        assert!(f.arg_names.is_empty());
    }

    #[test]
    fn method_with_generic_receiver() {
        let src = "package main\n\nfunc (u *User[T, A]) List(ctx Ctx, x, y T, z A) (A, error) {\n\treturn z, nil\n}\n";
        let decls = parse(src);
        let Decl::Func(f) = &decls[0] else { panic!("expected func") };
        let recv = f.receiver.as_ref().unwrap();
        assert_eq!(recv.name.as_deref(), Some("u"));
        assert_eq!(recv.type_name, "User");
        assert_eq!(f.arg_names, vec!["ctx", "x", "y", "z"]);
        assert_eq!(f.results.unwrap().text(src), "(A, error)");
        assert_eq!(f.params.text(src), "ctx Ctx, x, y T, z A");
    }

    #[test]
    fn generic_function_type_params_are_skipped() {
        let src = "package main\n\nfunc get[T, A any](v T) (A, error) {\n\tvar nop A\n\treturn nop, nil\n}\n";
        let decls = parse(src);
        let Decl::Func(f) = &decls[0] else { panic!("expected func") };
        assert_eq!(f.name.name, "get");
        assert_eq!(f.arg_names, vec!["v"]);
    }

    #[test]
    fn braces_in_strings_do_not_confuse_body_matching() {
        let src = "package main\n\nfunc f() string {\n\treturn \"}}{{\"\n}\n";
        let decls = parse(src);
        let Decl::Func(f) = &decls[0] else { panic!("expected func") };
        assert!(f.body.text(src).contains("}}{{"));
        assert_eq!(f.results.unwrap().text(src), "string");
    }

    #[test]
    fn grouped_const_with_multi_name_specs() {
        let src = indoc! {"
            package main

            const (
                PI = 3.14
                HEIGHT, WIDTH = 2.718, 3.0
                PREFIX, SUFFIX = \"prefix\", \"suffix\"
            )
        "};
        let decls = parse(src);
        let Decl::Gen(g) = &decls[0] else { panic!("expected gen decl") };
        assert_eq!(g.keyword, GenKeyword::Const);
        assert_eq!(g.specs.len(), 3);

        let Spec::Value(spec) = &g.specs[1] else { panic!("expected value spec") };
        let names: Vec<_> = spec.names.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["HEIGHT", "WIDTH"]);
        let values: Vec<_> = spec.values.iter().map(|v| v.text(src)).collect();
        assert_eq!(values, vec!["2.718", "3.0"]);
    }

    #[test]
    fn grouped_types_and_var_with_composite_values() {
        let src = indoc! {r#"
            package main

            type (
                Bar struct {
                    Age int
                }

                Baz struct{ Height int }
            )

            var foo, foz Foo = Foo{Name: "foo"}, Foo{Name: "foz"}
        "#};
        let decls = parse(src);
        let Decl::Gen(types) = &decls[0] else { panic!("expected type group") };
        assert_eq!(types.specs.len(), 2);
        let Spec::Type(bar) = &types.specs[0] else { panic!("expected type spec") };
        assert_eq!(bar.name.name, "Bar");
        assert!(bar.span.text(src).ends_with('}'));

        let Decl::Gen(vars) = &decls[1] else { panic!("expected var decl") };
        let Spec::Value(spec) = &vars.specs[0] else { panic!("expected value spec") };
        assert_eq!(spec.names.len(), 2);
        assert_eq!(spec.values.len(), 2);
        assert_eq!(spec.values[1].text(src), r#"Foo{Name: "foz"}"#);
    }

    #[test]
    fn var_with_type_and_no_value() {
        let src = "package main\n\nvar baz Baz\nvar s []string\n";
        let decls = parse(src);
        assert_eq!(decls.len(), 2);
        let Decl::Gen(g) = &decls[1] else { panic!("expected var") };
        let Spec::Value(spec) = &g.specs[0] else { panic!("expected value spec") };
        assert_eq!(spec.names[0].name, "s");
        assert!(spec.values.is_empty());
        assert_eq!(spec.span.text(src), "s []string");
    }

    #[test]
    fn import_group_is_opaque() {
        let src = "package main\n\nimport (\n\t\"context\"\n\tx \"net/http\"\n)\n\nfunc f() {}\n";
        let decls = parse(src);
        assert_eq!(decls.len(), 2);
        let Decl::Gen(g) = &decls[0] else { panic!("expected import") };
        assert_eq!(g.keyword, GenKeyword::Import);
        assert_eq!(g.specs.len(), 2);
    }

    #[test]
    fn multiline_value_expression_continues_past_newline() {
        let src = indoc! {r#"
            package main

            var handler = func() int {
                return 1
            }
        "#};
        let decls = parse(src);
        let Decl::Gen(g) = &decls[0] else { panic!("expected var") };
        let Spec::Value(spec) = &g.specs[0] else { panic!("expected value spec") };
        assert_eq!(spec.values.len(), 1);
        assert!(spec.values[0].text(src).ends_with('}'));
    }
}
