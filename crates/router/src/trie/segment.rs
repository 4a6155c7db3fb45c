//! Route segments.
//!
//! A route pattern is split on `/` into segments. Each segment is stored as a child key of its parent
//! node, verbatim, and only classified when matching: `{name}` binds one request segment, `prefix*`
//! captures the rest of the request path, anything else is a literal.

/// The meaning of a stored segment key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `{name}`, with whitespace inside the braces trimmed from the name
    Param(&'a str),
    /// `prefix*`, holding the prefix without the trailing `*`
    Wildcard(&'a str),
}

impl<'a> Segment<'a> {
    pub fn parse(key: &'a str) -> Self {
        if let Some(prefix) = key.strip_suffix('*') {
            return Segment::Wildcard(prefix);
        }

        if key.len() > 2 && key.starts_with('{') && key.ends_with('}') {
            return Segment::Param(key[1..key.len() - 1].trim());
        }

        Segment::Literal(key)
    }

    #[inline]
    pub fn is_param(&self) -> bool {
        matches!(self, Segment::Param(_))
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard(_))
    }
}

/// Splits `path` at `start` into the segment running up to the next `/` (or the end of the path)
/// and the position right after it.
#[inline]
pub(crate) fn next_segment(path: &str, start: usize) -> (&str, usize) {
    let end = path[start..].find('/').map_or(path.len(), |offset| start + offset);
    (&path[start..end], end)
}

/// Iterates the segment keys a route pattern is stored under.
///
/// `"/"` on its own is a single segment, the root marker. Otherwise one leading `/` per segment is
/// skipped and a trailing `/` ends the walk, so `"/a/"` and `"/a"` yield the same keys. Empty segments
/// between doubled slashes are kept as empty keys.
#[derive(Debug, Clone)]
pub(crate) struct Segments<'p> {
    path: &'p str,
    cursor: usize,
}

impl<'p> Segments<'p> {
    pub(crate) fn new(path: &'p str) -> Self {
        Self { path, cursor: 0 }
    }
}

impl<'p> Iterator for Segments<'p> {
    type Item = &'p str;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.path;
        let bytes = path.as_bytes();

        if self.cursor >= path.len() {
            return None;
        }

        if self.cursor == 0 && path == "/" {
            self.cursor = path.len();
            return Some(path);
        }

        if self.cursor == path.len() - 1 && bytes[self.cursor] == b'/' {
            self.cursor = path.len();
            return None;
        }

        if bytes[self.cursor] == b'/' {
            self.cursor += 1;
        }

        let (segment, next) = next_segment(path, self.cursor);
        self.cursor = next;
        Some(segment)
    }
}
