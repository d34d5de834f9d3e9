// ast.rs - Abstract syntax tree produced by the pattern parser.
//
// One node struct carrying a closed operation enum, matched exhaustively
// by the graph builder and the generator. Nodes are immutable once the
// parser returns.

use crate::options::Options;
use crate::runes::RuneSet;

/// Operation performed by an [`AstNode`].
///
/// The two `Pseudo*` variants only live on the parser's operand stack
/// and never appear in a finished tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstOp {
    /// Matches the empty string.
    Empty,
    /// A run of literal runes (`runes`).
    Literal,
    /// A character class (`set`, possibly `negated`).
    CharClass,
    /// `.` excluding newline.
    AnyCharNotNl,
    /// `.` under `DOT_NL`.
    AnyChar,
    /// `^` at a line boundary.
    BeginLine,
    /// `$` at a line boundary.
    EndLine,
    /// `\A` (or `^` under `ONE_LINE`).
    BeginText,
    /// `\z` (or `$` under `ONE_LINE`).
    EndText,
    /// `\b`.
    WordBoundary,
    /// `\B`.
    NoWordBoundary,
    /// Capturing group (`cap`, optional `name`); one child.
    Capture,
    /// `*`; one child.
    Star,
    /// `+`; one child.
    Plus,
    /// `?`; one child.
    Quest,
    /// `{min,max}`; one child.
    Repeat,
    /// Concatenation of children.
    Concat,
    /// Alternation of children.
    Alternate,
    /// `\1`..`\9` (`group`).
    BackRef,
    /// `(?=...)` / `(?!...)`; one child, `negated` for `!`.
    LookAhead,
    /// `(?<=...)` / `(?<!...)`; one child, `negated` for `!`.
    LookBehind,
    /// Parser stack marker for `(`.
    PseudoLeftParen,
    /// Parser stack marker for `|`.
    PseudoVerticalBar,
}

/// A node of the parsed pattern tree.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub op: AstOp,
    /// Options active at the point this node was parsed.
    pub options: Options,
    /// Ordered children (`Concat`, `Alternate`, single-child wrappers).
    pub subs: Vec<AstNode>,
    /// Literal runes for `Literal`.
    pub runes: Vec<u32>,
    /// Resolved set for `CharClass`.
    pub set: RuneSet,
    /// Class or lookaround negation.
    pub negated: bool,
    /// Minimum repeat count for `Repeat`.
    pub min: u32,
    /// Maximum repeat count for `Repeat`; `None` means unbounded.
    pub max: Option<u32>,
    /// Capture index for `Capture` (1-based; 0 on the pseudo `(` marker
    /// means non-capturing).
    pub cap: u32,
    /// Capture name for named groups.
    pub name: Option<String>,
    /// Referenced group for `BackRef`.
    pub group: u32,
    /// Lazy quantifier suffix (`*?`, `+?`, ...).
    pub lazy: bool,
    /// Possessive quantifier suffix (`*+`, `++`, ...).
    pub possessive: bool,
    /// Byte span of the producing pattern text, for diagnostics.
    pub span: (usize, usize),
}

impl AstNode {
    pub fn new(op: AstOp, options: Options, span: (usize, usize)) -> AstNode {
        AstNode {
            op,
            options,
            subs: Vec::new(),
            runes: Vec::new(),
            set: RuneSet::new(),
            negated: false,
            min: 0,
            max: None,
            cap: 0,
            name: None,
            group: 0,
            lazy: false,
            possessive: false,
            span,
        }
    }

    pub fn literal(runes: Vec<u32>, options: Options, span: (usize, usize)) -> AstNode {
        let mut node = AstNode::new(AstOp::Literal, options, span);
        node.runes = runes;
        node
    }

    pub fn char_class(
        set: RuneSet,
        negated: bool,
        options: Options,
        span: (usize, usize),
    ) -> AstNode {
        let mut node = AstNode::new(AstOp::CharClass, options, span);
        node.set = set;
        node.negated = negated;
        node
    }

    /// Wrap `sub` in a single-child operation.
    pub fn wrap(op: AstOp, sub: AstNode, options: Options, span: (usize, usize)) -> AstNode {
        let mut node = AstNode::new(op, options, span);
        node.subs.push(sub);
        node
    }

    /// The span widened to cover `other` as well.
    pub fn span_union(&self, other: &AstNode) -> (usize, usize) {
        (self.span.0.min(other.span.0), self.span.1.max(other.span.1))
    }

    /// Highest capture index anywhere in the tree.
    pub fn max_capture(&self) -> u32 {
        let own = if self.op == AstOp::Capture { self.cap } else { 0 };
        self.subs
            .iter()
            .map(AstNode::max_capture)
            .fold(own, u32::max)
    }

    /// Collect `(index, name)` pairs for all named groups in the tree.
    pub fn capture_names(&self, out: &mut Vec<(u32, String)>) {
        if self.op == AstOp::Capture {
            if let Some(name) = &self.name {
                out.push((self.cap, name.clone()));
            }
        }
        for sub in &self.subs {
            sub.capture_names(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_capture_walks_tree() {
        let mut inner = AstNode::new(AstOp::Capture, Options::default(), (3, 6));
        inner.cap = 2;
        let mut outer = AstNode::new(AstOp::Capture, Options::default(), (0, 7));
        outer.cap = 1;
        outer.subs.push(inner);
        let root = AstNode::wrap(AstOp::Concat, outer, Options::default(), (0, 7));
        assert_eq!(root.max_capture(), 2);
    }

    #[test]
    fn span_union_covers_both() {
        let a = AstNode::new(AstOp::Empty, Options::default(), (2, 4));
        let b = AstNode::new(AstOp::Empty, Options::default(), (6, 9));
        assert_eq!(a.span_union(&b), (2, 9));
    }
}
