//! Annotation parser.
//!
//! An annotation is either a single expression (`$ > 0`) bound to the
//! anonymous selector `field@`, or a run of brace groups
//! (`{@:$ > 0}{max:$ < 10}`) each binding a named expression to
//! `field@name` (`@` as the name means the anonymous selector).

use smallvec::SmallVec;

use crate::error::{FieldExprError, Result};

/// Parsed `(selector, source)` pairs for one field, in annotation order.
pub type Expressions = SmallVec<[(String, String); 2]>;

/// Parses `annotation` for the field `field_name`.
///
/// Whitespace-only input yields no expressions. A malformed annotation is
/// rejected as a whole with [`FieldExprError::AnnotationSyntax`] carrying the
/// raw text; a repeated name fails with
/// [`FieldExprError::DuplicateExpressionName`].
pub fn parse(annotation: &str, field_name: &str) -> Result<Expressions> {
    let raw = annotation;
    let mut rest = annotation.trim();
    let mut out = Expressions::new();
    if rest.is_empty() {
        return Ok(out);
    }
    if !rest.starts_with('{') {
        out.push((format!("{field_name}@"), rest.to_string()));
        return Ok(out);
    }

    loop {
        let Some(group) = take_group(&mut rest) else {
            return Err(FieldExprError::syntax(raw));
        };
        rest = rest.trim_start();
        let Some((name, source)) = group.split_once(':') else {
            return Err(FieldExprError::syntax(raw));
        };
        let selector = match name.trim() {
            "" => continue,
            "@" => format!("{field_name}@"),
            name => format!("{field_name}@{name}"),
        };
        if out.iter().any(|(s, _)| *s == selector) {
            return Err(FieldExprError::duplicate(selector));
        }
        let source = source.trim();
        if source.is_empty() {
            return Err(FieldExprError::syntax(raw));
        }
        out.push((selector, source.to_string()));
        if rest.is_empty() {
            return Ok(out);
        }
    }
}

/// Removes one balanced `{...}` group from the front of `input` and returns
/// its content. `\{` and `\}` are literal braces; the backslash is dropped.
fn take_group(input: &mut &str) -> Option<String> {
    let body = input.strip_prefix('{')?;
    let mut content = String::new();
    let mut depth = 0usize;
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match body[i + 1..].chars().next() {
                Some(brace @ ('{' | '}')) => {
                    content.push(brace);
                    chars.next();
                }
                _ => content.push(c),
            },
            '{' => {
                depth += 1;
                content.push(c);
            }
            '}' if depth == 0 => {
                *input = &body[i + 1..];
                return Some(content);
            }
            '}' => {
                depth -= 1;
                content.push(c);
            }
            _ => content.push(c),
        }
    }
    None
}
