//! The file-level rewriter.
//!
//! For one generated Go file and the identifier set of the surrounding
//! hand-written code, this module computes a set of non-overlapping byte
//! replacements:
//!
//! - **duplicate elision**: declarations whose identifiers all collide are
//!   converted to line comments; partially colliding type groups lose the
//!   colliding specs, and const/var specs lose individual names (and their
//!   values) behind inline `/* … */` ranges,
//! - **hook wrapping**: a generated function whose matching `Hook*`/`hook*`
//!   function exists in user code has its body rewritten to delegate
//!   through that hook, with the original body carried verbatim inside a
//!   synthesized closure.
//!
//! The replacements are applied right-to-left and the file is reformatted;
//! the caller re-parses the result as a consistency check.

use std::collections::BTreeSet;

use genx_core::{Error, Replacement, Result};
use genx_gosrc::decl::{Decl, FuncDecl, GenKeyword, Spec, ValueSpec};

/// Placeholder printed into the synthesized wrapper where the original
/// function body is substituted afterwards.
const HOOK_BODY_PLACEHOLDER: &str = "___GENX_HOOK_BODY_PLACEHOLDER___";

/// Canonical identifier keys contributed by `decl`, in declaration order:
/// bare names for types/consts/vars/functions, `Receiver.Method` for
/// methods.
fn decl_marks(decl: &Decl) -> Vec<String> {
    match decl {
        Decl::Func(f) => {
            let mark = match &f.receiver {
                Some(recv) => format!("{}.{}", recv.type_name, f.name.name),
                None => f.name.name.clone(),
            };
            vec![mark]
        }
        Decl::Gen(g) => {
            let mut marks = Vec::new();
            for spec in &g.specs {
                match spec {
                    Spec::Type(t) => marks.push(t.name.name.clone()),
                    Spec::Value(v) => {
                        marks.extend(v.names.iter().map(|n| n.name.clone()));
                    }
                    Spec::Import(_) => {}
                }
            }
            marks
        }
    }
}

/// The canonical identifier set of a declaration list.
pub(crate) fn ident_marks(decls: &[Decl]) -> BTreeSet<String> {
    decls.iter().flat_map(decl_marks).collect()
}

/// Offset of the start of the line containing `pos`.
fn line_start(content: &str, pos: usize) -> usize {
    content[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Convert a source snippet to line comments, preserving the minimum
/// common indentation. Blank lines stay blank.
fn convert_to_comment(code: &str) -> String {
    let lines: Vec<&str> = code.split('\n').collect();

    let mut min_indent: Option<&str> = None;
    for line in &lines {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.is_empty() {
            continue;
        }
        let indent = &line[..line.len() - trimmed.len()];
        if min_indent.is_none_or(|m| indent.len() < m.len()) {
            min_indent = Some(indent);
        }
    }
    let min_indent = min_indent.unwrap_or("");

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                (*line).to_string()
            } else if min_indent.is_empty() {
                format!("// {line}")
            } else if let Some(rest) = line.strip_prefix(min_indent) {
                format!("{min_indent}// {rest}")
            } else {
                (*line).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn comment_out(content: &str, start: usize, end: usize) -> Replacement {
    let from = line_start(content, start);
    Replacement::new(from, end, convert_to_comment(&content[from..end]))
}

/// Inline comment over `[start, end)`. A leading-position range swallows
/// the separator space before the survivor, so the comment restores it.
fn inline_comment(content: &str, start: usize, end: usize, leading: bool) -> Replacement {
    let space = if leading { " " } else { "" };
    Replacement::new(
        start,
        end,
        format!("/* {} */{space}", content[start..end].trim()),
    )
}

/// Inline-elide one colliding name (and its value when the value list has
/// more than one entry) from a multi-name const/var spec, keeping the
/// neighboring comma inside the comment so the survivors stay legal.
fn elide_spec_name(
    content: &str,
    spec: &ValueSpec,
    index: usize,
    replacements: &mut Vec<Replacement>,
) {
    let comment_value = spec.values.len() > 1;
    if index == 0 {
        let next_start = spec.names[1].span.start;
        replacements.push(inline_comment(
            content,
            spec.names[0].span.start,
            next_start,
            true,
        ));
        if comment_value {
            replacements.push(inline_comment(
                content,
                spec.values[0].start,
                spec.values[1].start,
                true,
            ));
        }
    } else {
        let prev_end = spec.names[index - 1].span.end;
        replacements.push(inline_comment(
            content,
            prev_end,
            spec.names[index].span.end,
            false,
        ));
        if comment_value {
            replacements.push(inline_comment(
                content,
                spec.values[index - 1].end,
                spec.values[index].end,
                false,
            ));
        }
    }
}

/// Duplicate elision over one generated file.
fn find_duplicates(
    content: &str,
    decls: &[Decl],
    user_marks: &BTreeSet<String>,
) -> Result<Vec<Replacement>> {
    let mut replacements = Vec::new();

    for decl in decls {
        let marks = decl_marks(decl);
        let colliding = marks.iter().filter(|m| user_marks.contains(*m)).count();
        if colliding == 0 {
            continue;
        }

        let span = decl.span();
        if colliding == marks.len() {
            replacements.push(comment_out(content, span.start, span.end));
            continue;
        }

        let Decl::Gen(gen) = decl else {
            return Err(Error::Replacement(format!(
                "partial collision on a non-group declaration at byte {}",
                span.start
            )));
        };

        match gen.keyword {
            GenKeyword::Type => {
                for spec in &gen.specs {
                    let Spec::Type(t) = spec else { continue };
                    if user_marks.contains(&t.name.name) {
                        replacements.push(comment_out(content, t.span.start, t.span.end));
                    }
                }
            }
            GenKeyword::Const | GenKeyword::Var => {
                for spec in &gen.specs {
                    let Spec::Value(v) = spec else { continue };
                    let colliding: Vec<usize> = v
                        .names
                        .iter()
                        .enumerate()
                        .filter(|(_, n)| user_marks.contains(&n.name))
                        .map(|(i, _)| i)
                        .collect();
                    if colliding.is_empty() {
                        continue;
                    }
                    if colliding.len() == v.names.len() {
                        replacements.push(comment_out(content, v.span.start, v.span.end));
                        continue;
                    }
                    for index in colliding {
                        elide_spec_name(content, v, index, &mut replacements);
                    }
                }
            }
            GenKeyword::Import => {}
        }
    }
    Ok(replacements)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn starts_lowercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

/// Hook keys to try for a generated identifier, most specific first.
///
/// Methods key on the method name's first-letter case; package-level
/// functions accept either the public (`HookFoo`) or private (`hookFoo`)
/// form, preferring the one matching the function's own case.
fn hook_marks(mark: &str) -> Vec<String> {
    if let Some((receiver, method)) = mark.split_once('.') {
        if starts_lowercase(method) {
            return vec![format!("{receiver}.hook{}", capitalize(method))];
        }
        return vec![format!("{receiver}.Hook{method}")];
    }

    let public = format!("Hook{mark}");
    let private = format!("hook{}", capitalize(mark));
    if starts_lowercase(mark) {
        vec![private, public]
    } else {
        vec![public, private]
    }
}

/// Hook wrapping over one generated file: for each function whose own
/// identifier does not collide but whose hook is declared by the user,
/// rewrite the body into `{ return hook(func(params) results <body>)(args) }`.
fn find_hooks(
    content: &str,
    decls: &[Decl],
    user_marks: &BTreeSet<String>,
) -> Result<Vec<Replacement>> {
    let mut replacements = Vec::new();

    for decl in decls {
        let Decl::Func(f) = decl else { continue };
        let marks = decl_marks(decl);
        let mark = &marks[0];
        if user_marks.contains(mark) {
            continue; // already commented out by duplicate elision
        }

        let Some(hook_mark) = hook_marks(mark)
            .into_iter()
            .find(|m| user_marks.contains(m))
        else {
            continue;
        };

        let hook_expr = match &f.receiver {
            Some(recv) => {
                let recv_name = recv.name.as_deref().ok_or_else(|| {
                    Error::Replacement(format!("method {mark} has an unnamed receiver"))
                })?;
                let method = hook_mark
                    .split_once('.')
                    .map_or(hook_mark.as_str(), |(_, m)| m);
                format!("{recv_name}.{method}")
            }
            None => hook_mark.clone(),
        };

        replacements.push(wrap_body(content, f, &hook_expr));
    }
    Ok(replacements)
}

/// Build the wrapped-body replacement for one function.
///
/// The wrapper is synthesized with a placeholder in the inner position and
/// the original body text (comments included) is substituted afterwards;
/// the whole-file reformat that follows replacement application normalizes
/// the indentation.
fn wrap_body(content: &str, f: &FuncDecl, hook_expr: &str) -> Replacement {
    let params = &content[f.params.start..f.params.end];
    let results = f
        .results
        .map(|r| format!(" {}", &content[r.start..r.end]))
        .unwrap_or_default();
    let args = f.arg_names.join(", ");

    let wrapper = format!(
        "{{\n\treturn {hook_expr}(func({params}){results} {HOOK_BODY_PLACEHOLDER})({args})\n}}"
    );
    let body = &content[f.body.start..f.body.end];
    Replacement::new(f.body.start, f.body.end, wrapper.replace(HOOK_BODY_PLACEHOLDER, body))
}

/// Compute the full replacement set for one generated file against the
/// user identifier set.
pub(crate) fn refactor_replacements(
    content: &str,
    user_marks: &BTreeSet<String>,
) -> Result<Vec<Replacement>> {
    let decls = genx_gosrc::decl::parse_file(content)?;
    let mut replacements = find_duplicates(content, &decls, user_marks)?;
    replacements.extend(find_hooks(content, &decls, user_marks)?);
    Ok(replacements)
}
