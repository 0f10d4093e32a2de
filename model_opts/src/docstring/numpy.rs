//! NumPy layout: underlined `Attributes` header, `name : type` entries.

use super::{AttributeDocs, indent_of, is_field_name, push_continuation};

fn is_underline(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn is_header(lines: &[&str], at: usize) -> bool {
    lines
        .get(at + 1)
        .is_some_and(|next| is_underline(next))
        && lines.get(at).is_some_and(|line| !line.trim().is_empty())
}

pub(super) fn parse(lines: &[&str]) -> AttributeDocs {
    let mut docs = AttributeDocs::new();
    let mut in_attributes = false;
    let mut entry: Option<(usize, String, String)> = None;
    let mut skip_next = false;

    for (at, line) in lines.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if is_header(lines, at) {
            finish(&mut entry, &mut docs);
            in_attributes = line.trim() == "Attributes";
            skip_next = true;
            continue;
        }
        if !in_attributes || line.trim().is_empty() {
            continue;
        }
        let indent = indent_of(line);
        if let Some((entry_indent, _, description)) = entry.as_mut() {
            if indent > *entry_indent {
                push_continuation(description, line);
                continue;
            }
        }
        finish(&mut entry, &mut docs);
        let name = line
            .split_once(':')
            .map_or(*line, |(name, _)| name)
            .trim();
        if is_field_name(name) {
            entry = Some((indent, name.to_owned(), String::new()));
        } else {
            tracing::warn!(line = line.trim(), "skipping malformed attribute entry");
        }
    }
    finish(&mut entry, &mut docs);
    docs
}

fn finish(entry: &mut Option<(usize, String, String)>, docs: &mut AttributeDocs) {
    if let Some((_, name, description)) = entry.take() {
        docs.insert(name, description);
    }
}
