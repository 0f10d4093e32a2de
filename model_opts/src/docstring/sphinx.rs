//! Sphinx layout: `:ivar name:`, `:var name:` and `:cvar name:` field lists.

use super::{AttributeDocs, indent_of, is_field_name, push_continuation};

const ROLES: [&str; 3] = ["ivar", "var", "cvar"];

pub(super) fn parse(lines: &[&str]) -> AttributeDocs {
    let mut docs = AttributeDocs::new();
    let mut entry: Option<(usize, String, String)> = None;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = indent_of(line);
        if trimmed.starts_with(':') {
            finish(&mut entry, &mut docs);
            entry = field(trimmed).map(|(name, text)| (indent, name, text));
            continue;
        }
        match entry.as_mut() {
            Some((field_indent, _, description)) if indent > *field_indent => {
                push_continuation(description, line);
            }
            _ => finish(&mut entry, &mut docs),
        }
    }
    finish(&mut entry, &mut docs);
    docs
}

/// Parse `:role name: description` for the attribute roles.
fn field(line: &str) -> Option<(String, String)> {
    let body = line.strip_prefix(':')?;
    let (head, description) = body.split_once(':')?;
    let mut words = head.split_whitespace();
    let role = words.next()?;
    if !ROLES.contains(&role) {
        return None;
    }
    let name = words.last()?;
    if !is_field_name(name) {
        tracing::warn!(line, "skipping malformed attribute entry");
        return None;
    }
    Some((name.to_owned(), description.trim().to_owned()))
}

fn finish(entry: &mut Option<(usize, String, String)>, docs: &mut AttributeDocs) {
    if let Some((_, name, description)) = entry.take() {
        docs.insert(name, description);
    }
}
