//! Google layout: `Attributes:` header with indented `name (type): text`.

use super::{AttributeDocs, indent_of, is_field_name, push_continuation};

const HEADERS: [&str; 2] = ["Attributes:", "Attrs:"];

pub(super) fn parse(lines: &[&str]) -> AttributeDocs {
    let mut docs = AttributeDocs::new();
    let mut section: Option<Section> = None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let indent = indent_of(line);
        if HEADERS.contains(&line.trim()) {
            flush(&mut section, &mut docs);
            section = Some(Section::new(indent));
            continue;
        }
        let Some(current) = section.as_mut() else {
            continue;
        };
        if indent <= current.header_indent {
            flush(&mut section, &mut docs);
            continue;
        }
        let item_indent = *current.item_indent.get_or_insert(indent);
        if indent > item_indent {
            if let Some((_, description)) = current.entry.as_mut() {
                push_continuation(description, line);
            }
            continue;
        }
        current.finish_entry(&mut docs);
        match split_entry(line.trim()) {
            Some((name, description)) => current.entry = Some((name, description)),
            None => tracing::warn!(line = line.trim(), "skipping malformed attribute entry"),
        }
    }
    flush(&mut section, &mut docs);
    docs
}

struct Section {
    header_indent: usize,
    item_indent: Option<usize>,
    entry: Option<(String, String)>,
}

impl Section {
    const fn new(header_indent: usize) -> Self {
        Self {
            header_indent,
            item_indent: None,
            entry: None,
        }
    }

    fn finish_entry(&mut self, docs: &mut AttributeDocs) {
        if let Some((name, description)) = self.entry.take() {
            docs.insert(name, description);
        }
    }
}

fn flush(section: &mut Option<Section>, docs: &mut AttributeDocs) {
    if let Some(mut finished) = section.take() {
        finished.finish_entry(docs);
    }
}

/// Split `name (type): description` or `name: description`.
fn split_entry(entry: &str) -> Option<(String, String)> {
    let (head, description) = entry.split_once(':')?;
    let name = head
        .split_once('(')
        .map_or(head, |(name, _)| name)
        .trim();
    is_field_name(name).then(|| (name.to_owned(), description.trim().to_owned()))
}
