// graph.rs - The compiled automaton: arena of nodes with adjacency lists.
//
// The builder recurses bottom-up over the AST, composing fragments by
// splicing: every operator produces a fresh head/tail pair and only adds
// bridging nodes and edges, never rewiring a fragment's interior. After
// composition the graph is compacted (virtual splice points elided) and
// renumbered densely in breadth-first order from the head; the detector
// relies on that ordering.

use smallvec::SmallVec;

use crate::ast::{AstNode, AstOp};
use crate::options::Options;
use crate::runes::{RuneSet, MAX_RUNE};

/// Dense arena index of a node. Ids are scoped to one `build` call.
pub type NodeId = usize;

/// Zero-width assertion evaluated against input context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    BeginText,
    EndText,
    BeginLine,
    EndLine,
    WordBoundary,
    NoWordBoundary,
}

/// What a node does when the frontier reaches it.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Zero-width splice point; only the head, the tail and pinned loop
    /// bridges survive compaction.
    Virtual,
    /// Consumes one code point when the set admits it (or, inverted,
    /// when the set does not contain it).
    Rune { set: RuneSet, inverted: bool },
    /// Zero-width anchor or boundary assertion.
    Indicator(IndicatorKind),
    /// Zero-width lookaround assertion with its own compiled sub-graph.
    Look {
        graph: Box<Graph>,
        behind: bool,
        negated: bool,
    },
    /// Zero-width backreference placeholder, expanded per match attempt.
    BackRef { group: u32 },
}

/// One automaton state.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Predecessors, used for reverse walks and the detector's
    /// back-escape check.
    pub ins: Vec<NodeId>,
    /// Successors.
    pub outs: Vec<NodeId>,
    /// Capture indices that apply at this point.
    pub caps: SmallVec<[u32; 4]>,
    /// Pattern byte span of the producing AST node, for diagnostics.
    pub span: (usize, usize),
    /// Keeps a virtual loop bridge alive through compaction so distinct
    /// cycles stay distinguishable.
    pinned: bool,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, span: (usize, usize)) -> Node {
        Node {
            id,
            kind,
            ins: Vec::new(),
            outs: Vec::new(),
            caps: SmallVec::new(),
            span,
            pinned: false,
        }
    }

    /// A free-standing node for a match attempt's overlay; not part of
    /// any arena.
    pub(crate) fn overlay(id: NodeId, kind: NodeKind, span: (usize, usize)) -> Node {
        Node::new(id, kind, span)
    }

    /// True when the node consumes no input.
    pub fn is_zero_width(&self) -> bool {
        !matches!(self.kind, NodeKind::Rune { .. })
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, NodeKind::Virtual)
    }

    /// Whether this node admits `rune`.
    pub fn admits(&self, rune: u32) -> bool {
        match &self.kind {
            NodeKind::Rune { set, inverted } => set.contains(rune) != *inverted,
            _ => false,
        }
    }
}

/// A compiled automaton fragment with its distinguished entry and exit.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    head: NodeId,
    tail: NodeId,
}

impl Graph {
    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn tail(&self) -> NodeId {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// True when the tail is reachable from the head through zero-width
    /// nodes alone, i.e. the pattern can match the empty string.
    pub fn has_pass_through(&self) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = vec![self.head];
        seen[self.head] = true;
        while let Some(id) = queue.pop() {
            if id == self.tail {
                return true;
            }
            for &next in &self.nodes[id].outs {
                // Indicators and backrefs may hold vacuously; only rune
                // nodes always consume.
                if !seen[next] && self.nodes[next].is_zero_width() {
                    seen[next] = true;
                    queue.push(next);
                }
            }
        }
        false
    }

    /// Rune nodes reachable from the head without consuming input: the
    /// nodes hit-tested first when scanning for a match start.
    pub fn leading_rune_nodes(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = vec![self.head];
        let mut leading = Vec::new();
        seen[self.head] = true;
        while let Some(id) = queue.pop() {
            for &next in &self.nodes[id].outs {
                if seen[next] {
                    continue;
                }
                seen[next] = true;
                if self.nodes[next].is_zero_width() {
                    queue.push(next);
                } else {
                    leading.push(next);
                }
            }
        }
        leading
    }
}

/// Compile an AST into a graph. Total over well-formed trees; malformed
/// input is rejected earlier by the parser.
pub fn build(ast: &AstNode, fold_case: bool) -> Graph {
    let mut builder = GraphBuilder::new(fold_case);
    let fragment = builder.build_node(ast);
    builder.finish(fragment)
}

#[derive(Clone, Copy)]
struct Fragment {
    head: NodeId,
    tail: NodeId,
}

/// Arena-backed builder; ids are handed out per `build` call.
struct GraphBuilder {
    nodes: Vec<Node>,
    fold_case: bool,
}

impl GraphBuilder {
    fn new(fold_case: bool) -> GraphBuilder {
        GraphBuilder {
            nodes: Vec::new(),
            fold_case,
        }
    }

    fn new_node(&mut self, kind: NodeKind, span: (usize, usize)) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, kind, span));
        id
    }

    fn edge(&mut self, from: NodeId, to: NodeId) {
        if !self.nodes[from].outs.contains(&to) {
            self.nodes[from].outs.push(to);
            self.nodes[to].ins.push(from);
        }
    }

    fn virtual_node(&mut self, span: (usize, usize)) -> Fragment {
        let id = self.new_node(NodeKind::Virtual, span);
        Fragment { head: id, tail: id }
    }

    // === Composition operators ===

    fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.edge(a.tail, b.head);
        Fragment {
            head: a.head,
            tail: b.tail,
        }
    }

    fn union(&mut self, parts: &[Fragment], span: (usize, usize)) -> Fragment {
        let head = self.new_node(NodeKind::Virtual, span);
        let tail = self.new_node(NodeKind::Virtual, span);
        for part in parts {
            self.edge(head, part.head);
            self.edge(part.tail, tail);
        }
        Fragment { head, tail }
    }

    /// Embed `f` between a fresh head/tail pair; the repeat and bypass
    /// edges of the quantifiers are added on top.
    fn embed_one(&mut self, f: Fragment, span: (usize, usize)) -> Fragment {
        let head = self.new_node(NodeKind::Virtual, span);
        let tail = self.new_node(NodeKind::Virtual, span);
        self.edge(head, f.head);
        self.edge(f.tail, tail);
        Fragment { head, tail }
    }

    fn quest(&mut self, f: Fragment, span: (usize, usize)) -> Fragment {
        let wrapped = self.embed_one(f, span);
        self.edge(wrapped.head, wrapped.tail);
        wrapped
    }

    fn plus(&mut self, f: Fragment, span: (usize, usize)) -> Fragment {
        let wrapped = self.embed_one(f, span);
        // The repeat edge closes a cycle; pin its endpoints so
        // compaction cannot fuse this loop with a sibling or parent
        // loop.
        self.edge(f.tail, f.head);
        self.nodes[f.head].pinned = true;
        self.nodes[f.tail].pinned = true;
        wrapped
    }

    fn star(&mut self, f: Fragment, span: (usize, usize)) -> Fragment {
        let wrapped = self.plus(f, span);
        self.edge(wrapped.head, wrapped.tail);
        wrapped
    }

    // === AST recursion ===

    fn build_node(&mut self, ast: &AstNode) -> Fragment {
        match ast.op {
            AstOp::Empty => self.virtual_node(ast.span),
            AstOp::Literal => self.literal(ast),
            AstOp::CharClass => self.char_class(ast),
            AstOp::AnyCharNotNl => {
                let set = RuneSet::single('\n' as u32);
                let id = self.new_node(NodeKind::Rune { set, inverted: true }, ast.span);
                Fragment { head: id, tail: id }
            }
            AstOp::AnyChar => {
                let set = RuneSet::from_ranges(&[(0, MAX_RUNE)]);
                let id = self.new_node(NodeKind::Rune { set, inverted: false }, ast.span);
                Fragment { head: id, tail: id }
            }
            AstOp::BeginLine => self.indicator(IndicatorKind::BeginLine, ast.span),
            AstOp::EndLine => self.indicator(IndicatorKind::EndLine, ast.span),
            AstOp::BeginText => self.indicator(IndicatorKind::BeginText, ast.span),
            AstOp::EndText => self.indicator(IndicatorKind::EndText, ast.span),
            AstOp::WordBoundary => self.indicator(IndicatorKind::WordBoundary, ast.span),
            AstOp::NoWordBoundary => self.indicator(IndicatorKind::NoWordBoundary, ast.span),
            AstOp::Capture => {
                let mark = self.nodes.len();
                let inner = self.build_node(&ast.subs[0]);
                for node in &mut self.nodes[mark..] {
                    node.caps.push(ast.cap);
                }
                inner
            }
            AstOp::Star => {
                let inner = self.build_node(&ast.subs[0]);
                self.star(inner, ast.span)
            }
            AstOp::Plus => {
                let inner = self.build_node(&ast.subs[0]);
                self.plus(inner, ast.span)
            }
            AstOp::Quest => {
                let inner = self.build_node(&ast.subs[0]);
                self.quest(inner, ast.span)
            }
            AstOp::Repeat => self.repeat(ast),
            AstOp::Concat => {
                let mut fragment: Option<Fragment> = None;
                for sub in &ast.subs {
                    let next = self.build_node(sub);
                    fragment = Some(match fragment {
                        Some(prev) => self.concat(prev, next),
                        None => next,
                    });
                }
                fragment.unwrap_or_else(|| self.virtual_node(ast.span))
            }
            AstOp::Alternate => {
                if ast.subs.len() == 1 {
                    return self.build_node(&ast.subs[0]);
                }
                let parts: Vec<Fragment> =
                    ast.subs.iter().map(|sub| self.build_node(sub)).collect();
                self.union(&parts, ast.span)
            }
            AstOp::BackRef => {
                let id = self.new_node(NodeKind::BackRef { group: ast.group }, ast.span);
                Fragment { head: id, tail: id }
            }
            AstOp::LookAhead | AstOp::LookBehind => {
                let sub = build(&ast.subs[0], self.fold_case);
                let id = self.new_node(
                    NodeKind::Look {
                        graph: Box::new(sub),
                        behind: ast.op == AstOp::LookBehind,
                        negated: ast.negated,
                    },
                    ast.span,
                );
                Fragment { head: id, tail: id }
            }
            AstOp::PseudoLeftParen | AstOp::PseudoVerticalBar => {
                unreachable!("pseudo ops never leave the parser stack")
            }
        }
    }

    fn indicator(&mut self, kind: IndicatorKind, span: (usize, usize)) -> Fragment {
        let id = self.new_node(NodeKind::Indicator(kind), span);
        Fragment { head: id, tail: id }
    }

    fn literal(&mut self, ast: &AstNode) -> Fragment {
        // An empty literal collapses to a splice point, never to a rune
        // node with an empty set.
        if ast.runes.is_empty() {
            return self.virtual_node(ast.span);
        }
        let fold = self.fold_case || ast.options.contains(Options::FOLD_CASE);
        let mut fragment: Option<Fragment> = None;
        for &rune in &ast.runes {
            let mut set = RuneSet::single(rune);
            if fold {
                set.fold_case();
            }
            let id = self.new_node(NodeKind::Rune { set, inverted: false }, ast.span);
            let next = Fragment { head: id, tail: id };
            fragment = Some(match fragment {
                Some(prev) => self.concat(prev, next),
                None => next,
            });
        }
        fragment.expect("literal has at least one rune")
    }

    fn char_class(&mut self, ast: &AstNode) -> Fragment {
        let mut set = ast.set.clone();
        if ast.negated && !ast.options.contains(Options::CLASS_NL) {
            // Without CLASS_NL a negated class also excludes newline.
            set.add_rune('\n' as u32);
        }
        let id = self.new_node(
            NodeKind::Rune {
                set,
                inverted: ast.negated,
            },
            ast.span,
        );
        Fragment { head: id, tail: id }
    }

    /// `{min,max}` by static unrolling: `min` mandatory copies, then
    /// either optional copies up to `max` or one trailing plus-loop.
    fn repeat(&mut self, ast: &AstNode) -> Fragment {
        let sub = &ast.subs[0];
        let mut fragment: Option<Fragment> = None;
        let append = |builder: &mut Self, next: Fragment, fragment: &mut Option<Fragment>| {
            *fragment = Some(match fragment.take() {
                Some(prev) => builder.concat(prev, next),
                None => next,
            });
        };
        match ast.max {
            None => {
                if ast.min == 0 {
                    let inner = self.build_node(sub);
                    return self.star(inner, ast.span);
                }
                // min-1 plain copies, then the last copy repeats.
                for _ in 1..ast.min {
                    let copy = self.build_node(sub);
                    append(self, copy, &mut fragment);
                }
                let last = self.build_node(sub);
                let looped = self.plus(last, ast.span);
                append(self, looped, &mut fragment);
                fragment.expect("min >= 1")
            }
            Some(max) => {
                for _ in 0..ast.min {
                    let copy = self.build_node(sub);
                    append(self, copy, &mut fragment);
                }
                for _ in ast.min..max {
                    let copy = self.build_node(sub);
                    let optional = self.quest(copy, ast.span);
                    append(self, optional, &mut fragment);
                }
                fragment.unwrap_or_else(|| self.virtual_node(ast.span))
            }
        }
    }

    // === Compaction ===

    /// Wrap the fragment with the graph's own head/tail, splice out
    /// unpinned virtual chains, renumber breadth-first.
    fn finish(mut self, fragment: Fragment) -> Graph {
        let span = (
            self.nodes[fragment.head].span.0,
            self.nodes[fragment.tail].span.1,
        );
        let head = self.new_node(NodeKind::Virtual, (span.0, span.0));
        let tail = self.new_node(NodeKind::Virtual, (span.1, span.1));
        self.edge(head, fragment.head);
        self.edge(fragment.tail, tail);

        self.splice_virtuals(head, tail);
        self.renumber(head, tail)
    }

    fn splice_virtuals(&mut self, head: NodeId, tail: NodeId) {
        let mut removed = vec![false; self.nodes.len()];
        for id in 0..self.nodes.len() {
            if id == head || id == tail || removed[id] {
                continue;
            }
            if !self.nodes[id].is_virtual() || self.nodes[id].pinned {
                continue;
            }
            let ins = self.nodes[id].ins.clone();
            let outs = self.nodes[id].outs.clone();
            // Self-loops on a splice point cannot arise: loop edges pin
            // their endpoints.
            for &from in &ins {
                self.nodes[from].outs.retain(|&n| n != id);
            }
            for &to in &outs {
                self.nodes[to].ins.retain(|&n| n != id);
            }
            for &from in &ins {
                for &to in &outs {
                    self.edge(from, to);
                }
            }
            removed[id] = true;
            self.nodes[id].ins.clear();
            self.nodes[id].outs.clear();
        }
    }

    /// Reassign dense ids in breadth-first order from the head and drop
    /// spliced-out nodes.
    fn renumber(self, head: NodeId, tail: NodeId) -> Graph {
        let mut order: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        let mut new_id = vec![usize::MAX; self.nodes.len()];
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(head);
        new_id[head] = 0;
        order.push(head);
        while let Some(id) = queue.pop_front() {
            for &next in &self.nodes[id].outs {
                if new_id[next] == usize::MAX {
                    new_id[next] = order.len();
                    order.push(next);
                    queue.push_back(next);
                }
            }
        }
        // The tail is reachable by construction, but keep the graph
        // well-formed even if a future operator breaks that.
        if new_id[tail] == usize::MAX {
            new_id[tail] = order.len();
            order.push(tail);
        }

        let mut nodes: Vec<Node> = Vec::with_capacity(order.len());
        for &old in &order {
            let mut node = self.nodes[old].clone();
            node.id = new_id[old];
            node.ins = node
                .ins
                .iter()
                .filter(|&&n| new_id[n] != usize::MAX)
                .map(|&n| new_id[n])
                .collect();
            node.outs = node
                .outs
                .iter()
                .filter(|&&n| new_id[n] != usize::MAX)
                .map(|&n| new_id[n])
                .collect();
            nodes.push(node);
        }
        Graph {
            nodes,
            head: new_id[head],
            tail: new_id[tail],
        }
    }
}
