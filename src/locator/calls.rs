use std::sync::OnceLock;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use super::range::LineRange;

static CALL_QUERY: OnceLock<Query> = OnceLock::new();

pub fn grammar() -> Language {
    tree_sitter_rust::LANGUAGE.into()
}

fn call_query() -> &'static Query {
    CALL_QUERY.get_or_init(|| {
        Query::new(&grammar(), include_str!("../../queries/calls.scm"))
            .expect("Failed to compile call query")
    })
}

pub fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&grammar()).ok()?;
    parser.parse(source, None)
}

/// A single call: from its callee (or method name, inside a chain) through
/// the closing parenthesis of its argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSegment {
    pub start_byte: usize,
    pub end_byte: usize,
    /// 1-indexed line of the segment's first token.
    pub start_line: u32,
    /// A whole macro invocation, whose arguments were not parsed.
    pub is_macro: bool,
}

impl CallSegment {
    fn spanning(first: Node<'_>, last: Node<'_>) -> Self {
        Self {
            start_byte: first.start_byte(),
            end_byte: last.end_byte(),
            start_line: first.start_position().row as u32 + 1,
            is_macro: false,
        }
    }

    fn macro_invocation(node: Node<'_>) -> Self {
        Self {
            is_macro: true,
            ..Self::spanning(node, node)
        }
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start_byte..self.end_byte]
    }

    pub fn line_range(&self, source: &str) -> LineRange {
        LineRange::of_text(self.start_line, self.text(source))
    }
}

/// Every call and macro invocation in `tree`, with method chains flattened
/// into one segment per link.
pub fn call_segments(tree: &Tree, source: &str) -> Vec<CallSegment> {
    let mut cursor = QueryCursor::new();
    let mut seen = FxHashSet::default();
    let mut segments = Vec::new();

    let mut matches = cursor.matches(call_query(), tree.root_node(), source.as_bytes());
    while let Some(m) = matches.next() {
        for capture in m.captures {
            for segment in chain_segments(capture.node) {
                if seen.insert(segment) {
                    segments.push(segment);
                }
            }
        }
    }

    segments
}

/// Split `recv.a(1).b(2)` into `b(2)` and `a(1)`. A free call like
/// `f(x)` or `Type::new(x)` is a single segment covering the whole node.
fn chain_segments(call: Node<'_>) -> SmallVec<[CallSegment; 4]> {
    let mut segments = SmallVec::new();
    if call.kind() == "macro_invocation" {
        segments.push(CallSegment::macro_invocation(call));
        return segments;
    }

    let mut current = Some(call);

    while let Some(node) = current.take() {
        if node.kind() != "call_expression" {
            break;
        }
        let Some(arguments) = node.child_by_field_name("arguments") else {
            break;
        };

        match node.child_by_field_name("function").and_then(method_link) {
            Some((name, receiver)) => {
                segments.push(CallSegment::spanning(name, arguments));
                current = Some(receiver);
            }
            None => segments.push(CallSegment::spanning(node, arguments)),
        }
    }

    segments
}

/// For a callee `recv.name` or `recv.name::<T>`, the `name` node and `recv`.
fn method_link(function: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    let field_expression = match function.kind() {
        "field_expression" => function,
        "generic_function" => function
            .child_by_field_name("function")
            .filter(|inner| inner.kind() == "field_expression")?,
        _ => return None,
    };

    Some((
        field_expression.child_by_field_name("field")?,
        field_expression.child_by_field_name("value")?,
    ))
}
