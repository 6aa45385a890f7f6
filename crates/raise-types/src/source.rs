//! Source frames and the traceback chain built from them.

use std::fmt;
use std::sync::Arc;

use crate::style;

/// A named piece of source text with a culprit byte range.
///
/// Produced by the parser/evaluator for every call site an exception passes
/// through. `begin == None` marks a frame whose position is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub name: String,
    pub source: Arc<str>,
    pub begin: Option<usize>,
    pub end: usize,
}

impl SourceContext {
    /// Create a frame pointing at `source[begin..end]`.
    pub fn new(name: impl Into<String>, source: impl Into<Arc<str>>, begin: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            begin: Some(begin),
            end,
        }
    }

    /// Create a frame with no known position.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Arc::from(""),
            begin: None,
            end: 0,
        }
    }

    /// Returns `(begin, end)` if the range is usable for slicing `source`.
    fn checked_range(&self) -> Option<(usize, usize)> {
        let begin = self.begin?;
        let end = self.end;
        let ok = begin <= end
            && end <= self.source.len()
            && self.source.is_char_boundary(begin)
            && self.source.is_char_boundary(end);
        ok.then_some((begin, end))
    }

    /// 1-indexed line of a byte offset.
    fn line_of(&self, pos: usize) -> usize {
        self.source[..pos].matches('\n').count() + 1
    }

    /// Render the frame header and the culprit line(s).
    ///
    /// Continuation lines are prefixed with `indent`. The culprit itself is
    /// bold and underlined; a zero-width culprit shows as `^`.
    pub fn pprint(&self, indent: &str) -> String {
        let Some(begin) = self.begin else {
            return format!("{}, unknown position", self.name);
        };
        let Some((begin, end)) = self.checked_range() else {
            return format!("{}, invalid position {}-{}", self.name, begin, self.end);
        };

        let src = &*self.source;
        let first = self.line_of(begin);
        let last = self.line_of(end);

        let line_start = src[..begin].rfind('\n').map_or(0, |i| i + 1);
        let line_end = src[end..].find('\n').map_or(src.len(), |i| end + i);

        let head = &src[line_start..begin];
        let culprit = if begin == end { "^" } else { &src[begin..end] };
        let tail = &src[end..line_end];
        let newline_indent = format!("\n{indent}");

        let mut out = if first == last {
            format!("{}, line {}:", self.name, first)
        } else {
            format!("{}, line {}-{}:", self.name, first, last)
        };
        out.push_str(&newline_indent);
        out.push_str(head);
        out.push_str(style::CULPRIT);
        out.push_str(&culprit.replace('\n', &newline_indent));
        out.push_str(style::RESET);
        out.push_str(tail);
        out
    }
}

struct Node {
    frame: SourceContext,
    next: Option<Arc<Node>>,
}

/// Immutable chain of frames, innermost first.
///
/// Chains share their tails: [`Traceback::enter`] is how the evaluator
/// builds its call context, and capturing the context at a raise site is a
/// cheap clone. Nothing in a chain changes once it is built, so it can be
/// read from any thread.
#[derive(Clone, Default)]
pub struct Traceback {
    head: Option<Arc<Node>>,
}

impl Traceback {
    /// The empty chain.
    pub const EMPTY: Traceback = Traceback { head: None };

    /// Build a chain from frames listed innermost first.
    pub fn from_frames(frames: impl IntoIterator<Item = SourceContext>) -> Self {
        let frames: Vec<_> = frames.into_iter().collect();
        let mut head = None;
        for frame in frames.into_iter().rev() {
            head = Some(Arc::new(Node { frame, next: head }));
        }
        Self { head }
    }

    /// A new chain with `frame` as the innermost frame and `self` as its callers.
    pub fn enter(&self, frame: SourceContext) -> Self {
        Self {
            head: Some(Arc::new(Node {
                frame,
                next: self.head.clone(),
            })),
        }
    }

    /// A new chain with `frame` appended after the outermost frame.
    ///
    /// Used while unwinding. `self` is left untouched.
    pub fn push_outer(&self, frame: SourceContext) -> Self {
        Self::from_frames(self.iter().cloned().chain(std::iter::once(frame)))
    }

    /// The innermost frame, if any.
    pub fn innermost(&self) -> Option<&SourceContext> {
        self.head.as_deref().map(|n| &n.frame)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Debug for Traceback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Traceback {
    type Item = &'a SourceContext;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a traceback, innermost frame first.
pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SourceContext;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(&node.frame)
    }
}
