//! Path lookup into nested configuration values.
//!
//! Paths use dots for object keys and brackets for array indices, e.g.
//! `"layout.columns[2].width"`. Quoted bracket keys (`a["b.c"]`) address keys
//! that themselves contain dots.
use serde_json::Value;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Split a path into segments. Empty segments (`"a..b"`) are skipped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => flush(&mut current, &mut segments),
            '[' => {
                flush(&mut current, &mut segments);
                let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
                let inner = inner.trim();
                let quoted = inner.len() >= 2
                    && ((inner.starts_with('"') && inner.ends_with('"'))
                        || (inner.starts_with('\'') && inner.ends_with('\'')));
                if quoted {
                    segments.push(PathSegment::Key(inner[1..inner.len() - 1].to_string()));
                } else if let Ok(index) = inner.parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                } else if !inner.is_empty() {
                    segments.push(PathSegment::Key(inner.to_string()));
                }
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut segments);
    segments
}

fn flush(current: &mut String, segments: &mut Vec<PathSegment>) {
    if !current.is_empty() {
        segments.push(PathSegment::Key(std::mem::take(current)));
    }
}

/// Walk `segments` starting at `root`.
pub fn lookup<'a>(root: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |value, segment| match (segment, value) {
        (PathSegment::Key(key), Value::Object(map)) => map.get(key),
        (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
        (PathSegment::Key(key), Value::Array(items)) => {
            key.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
        _ => None,
    })
}
