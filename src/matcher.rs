// matcher.rs - Frontier-based match engine.
//
// The engine simulates the automaton as a set of simultaneously active
// nodes, consuming one input position per step in the requested
// direction (+1 forward, -1 backward for lookbehind). Zero-width nodes
// are closed over at each boundary; rune nodes are hit-tested against
// the current character; everything else is dropped. The shared graph
// is never mutated: backreference expansion lives in a per-attempt
// overlay that is discarded when the walker is dropped.

use std::collections::{BTreeMap, HashMap, HashSet};

use memchr::{memchr, memchr2, memchr3};
use smallvec::SmallVec;

use crate::graph::{Graph, Node, NodeId, NodeKind};
use crate::indicators::Indicators;
use crate::runes::RuneSet;

/// One recorded capture: name, inclusive start, exclusive end (char
/// indices) and the materialized substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    name: String,
    start: usize,
    end: usize,
    text: String,
}

impl Capture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// All captures recorded for one group; a repeated group captures
/// repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    index: u32,
    name: String,
    captures: Vec<Capture>,
}

impl Group {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// The most recent capture, the one replacement references use.
    pub fn last(&self) -> Option<&Capture> {
        self.captures.last()
    }

    /// Text of the most recent capture.
    pub fn as_str(&self) -> &str {
        self.last().map(Capture::as_str).unwrap_or("")
    }
}

/// The root group of one successful match attempt.
///
/// Positions are character indices into the searched input. Groups
/// without any recorded position are omitted entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    start: usize,
    end: usize,
    text: String,
    groups: Vec<Group>,
}

impl Match {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Participating groups, ordered by index.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group by capture index, if it participated.
    pub fn group(&self, index: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.index == index)
    }

    /// Group by capture name, if it participated.
    pub fn group_named(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The participating group with the highest index.
    pub fn last_group(&self) -> Option<&Group> {
        self.groups.last()
    }
}

/// Normalize direction-dependent offset arithmetic: the char index
/// consumed when stepping from boundary `pos` in `direction`.
#[inline]
pub(crate) fn fix_direction(pos: usize, direction: i32) -> usize {
    if direction > 0 {
        pos
    } else {
        pos - 1
    }
}

// === Walker ===

/// One match attempt over a shared, read-only graph. The overlay holds
/// backreference expansions; dropping the walker rolls them back.
pub(crate) struct Walker<'g> {
    graph: &'g Graph,
    chars: &'g [char],
    /// Region bounds (boundaries, not char indices).
    lo: usize,
    hi: usize,
    overlay: Vec<Node>,
    /// Backref node -> (chain head, runes the chain spells). A chain is
    /// rebuilt when the referenced group closes again with new text.
    redirects: HashMap<NodeId, (NodeId, Vec<u32>)>,
    pub(crate) emissions: Vec<(u32, usize)>,
}

fn node_of<'a>(graph: &'a Graph, overlay: &'a [Node], id: NodeId) -> &'a Node {
    if id < graph.len() {
        graph.node(id)
    } else {
        &overlay[id - graph.len()]
    }
}

enum Act {
    Stay,
    Expand,
    Drop,
    BackRef(u32),
}

impl<'g> Walker<'g> {
    pub(crate) fn new(graph: &'g Graph, chars: &'g [char], lo: usize, hi: usize) -> Walker<'g> {
        Walker {
            graph,
            chars,
            lo,
            hi,
            overlay: Vec::new(),
            redirects: HashMap::new(),
            emissions: Vec::new(),
        }
    }

    /// Walk from boundary `start`, consuming positions in `direction`.
    /// Returns the furthest boundary at which the goal node (tail
    /// forward, head backward) was active, i.e. the longest hit at this
    /// start.
    pub(crate) fn walk(&mut self, start: usize, direction: i32) -> Option<usize> {
        let remaining = if direction > 0 {
            self.hi.saturating_sub(start)
        } else {
            start.saturating_sub(self.lo)
        };
        if remaining == 0 && !self.graph.has_pass_through() {
            return None;
        }

        let entry = if direction > 0 {
            self.graph.head()
        } else {
            self.graph.tail()
        };
        let mut frontier: Vec<NodeId> = vec![entry];
        let mut last: Option<usize> = None;
        let mut pos = start;
        loop {
            let (closed, goal_hit) = self.close(&frontier, pos, direction);
            if goal_hit {
                last = Some(pos);
            }
            let in_bounds = if direction > 0 { pos < self.hi } else { pos > self.lo };
            if !in_bounds {
                break;
            }
            let rune = self.chars[fix_direction(pos, direction)] as u32;
            let mut next: Vec<NodeId> = Vec::new();
            let mut queued: HashSet<NodeId> = HashSet::new();
            for &id in &closed {
                let (hit, caps): (bool, SmallVec<[u32; 4]>) = {
                    let node = node_of(self.graph, &self.overlay, id);
                    (node.admits(rune), node.caps.clone())
                };
                if !hit {
                    continue;
                }
                for &cap in &caps {
                    self.emissions.push((cap, fix_direction(pos, direction)));
                }
                let node = node_of(self.graph, &self.overlay, id);
                let nbrs = if direction > 0 { &node.outs } else { &node.ins };
                for &n in nbrs {
                    if queued.insert(n) {
                        next.push(n);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
            pos = (pos as i64 + direction as i64) as usize;
        }
        last
    }

    /// Expand the frontier through satisfied zero-width nodes at
    /// boundary `pos`. Returns the closed node set and whether the goal
    /// node became active.
    fn close(&mut self, frontier: &[NodeId], pos: usize, direction: i32) -> (Vec<NodeId>, bool) {
        let ind = Indicators::at(self.chars, pos);
        let goal = if direction > 0 {
            self.graph.tail()
        } else {
            self.graph.head()
        };
        let mut closed: Vec<NodeId> = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut work: Vec<NodeId> = frontier.to_vec();
        let mut goal_hit = false;
        while let Some(id) = work.pop() {
            if !seen.insert(id) {
                continue;
            }
            closed.push(id);
            if id == goal {
                goal_hit = true;
            }
            let act = {
                let node = node_of(self.graph, &self.overlay, id);
                match &node.kind {
                    NodeKind::Rune { .. } => Act::Stay,
                    NodeKind::Virtual => Act::Expand,
                    NodeKind::Indicator(kind) => {
                        if ind.holds(*kind) {
                            Act::Expand
                        } else {
                            Act::Drop
                        }
                    }
                    NodeKind::Look {
                        graph: sub,
                        behind,
                        negated,
                    } => {
                        // Recursive engine invocation on the captured
                        // sub-graph; no outer position is consumed.
                        let hit = if *behind {
                            Walker::new(sub, self.chars, self.lo, self.hi)
                                .walk(pos, -1)
                                .is_some()
                        } else {
                            Walker::new(sub, self.chars, self.lo, self.hi)
                                .walk(pos, 1)
                                .is_some()
                        };
                        if hit != *negated {
                            Act::Expand
                        } else {
                            Act::Drop
                        }
                    }
                    NodeKind::BackRef { group } => Act::BackRef(*group),
                }
            };
            match act {
                Act::Stay | Act::Drop => {}
                Act::Expand => {
                    let node = node_of(self.graph, &self.overlay, id);
                    let nbrs = if direction > 0 { &node.outs } else { &node.ins };
                    work.extend(nbrs.iter().copied());
                }
                Act::BackRef(group) => {
                    if direction < 0 {
                        // Indeterminate in a reverse walk: skip the
                        // assertion rather than fail the attempt.
                        let node = node_of(self.graph, &self.overlay, id);
                        work.extend(node.ins.iter().copied());
                    } else if let Some(text) = self.latest_capture(group, pos) {
                        match self.redirects.get(&id) {
                            Some((chain, spelled)) if *spelled == text => {
                                work.push(*chain);
                            }
                            _ => {
                                let chain = self.splice(id, &text);
                                work.push(chain);
                            }
                        }
                    } else {
                        // Referenced group has not captured yet:
                        // unresolved, pass through.
                        let node = node_of(self.graph, &self.overlay, id);
                        work.extend(node.outs.iter().copied());
                    }
                }
            }
        }
        (closed, goal_hit)
    }

    /// The most recently completed contiguous capture run for `group`,
    /// as the runes it covered.
    fn latest_capture(&self, group: u32, before: usize) -> Option<Vec<u32>> {
        let mut positions: Vec<usize> = self
            .emissions
            .iter()
            .filter(|&&(cap, p)| cap == group && p < before)
            .map(|&(_, p)| p)
            .collect();
        if positions.is_empty() {
            return None;
        }
        positions.sort_unstable();
        positions.dedup();
        // Take the last contiguous run.
        let mut run_start = positions.len() - 1;
        while run_start > 0 && positions[run_start - 1] + 1 == positions[run_start] {
            run_start -= 1;
        }
        Some(
            positions[run_start..]
                .iter()
                .map(|&p| self.chars[p] as u32)
                .collect(),
        )
    }

    /// Splice a literal chain for a resolved backreference between the
    /// placeholder and its successors - in the overlay, never in the
    /// shared graph.
    fn splice(&mut self, backref: NodeId, text: &[u32]) -> NodeId {
        debug_assert!(!text.is_empty());
        let succ = node_of(self.graph, &self.overlay, backref).outs.clone();
        let span = node_of(self.graph, &self.overlay, backref).span;
        let base = self.graph.len() + self.overlay.len();
        for (i, &rune) in text.iter().enumerate() {
            let mut node = Node::overlay(
                base + i,
                NodeKind::Rune {
                    set: RuneSet::single(rune),
                    inverted: false,
                },
                span,
            );
            if i + 1 < text.len() {
                node.outs.push(base + i + 1);
            } else {
                node.outs = succ.clone();
            }
            self.overlay.push(node);
        }
        self.redirects.insert(backref, (base, text.to_vec()));
        base
    }
}

// === Search entry points ===

/// Scan `[start, start+len)` for the leftmost match, greedily longest
/// at its start position.
pub(crate) fn find(
    graph: &Graph,
    names: &[(u32, String)],
    text: &str,
    chars: &[char],
    start: usize,
    len: usize,
) -> Option<Match> {
    let lo = start;
    let hi = start + len;
    let pass_through = graph.has_pass_through();
    let leading = graph.leading_rune_nodes();
    let prescan = ascii_prescan(graph, &leading, text, pass_through);

    let mut s = start;
    while s <= hi {
        if !pass_through {
            if s == hi {
                break;
            }
            // Leading-edge scan: hit-test the head's reachable rune
            // nodes before paying for a full walk.
            if let Some(ref bytes) = prescan {
                let haystack = &text.as_bytes()[s..hi];
                let jump = match bytes.as_slice() {
                    [a] => memchr(*a, haystack),
                    [a, b] => memchr2(*a, *b, haystack),
                    [a, b, c] => memchr3(*a, *b, *c, haystack),
                    _ => unreachable!("prescan holds at most three bytes"),
                };
                match jump {
                    Some(off) => s += off,
                    None => break,
                }
            } else if !leading
                .iter()
                .any(|&id| graph.node(id).admits(chars[s] as u32))
            {
                s += 1;
                continue;
            }
        }
        let mut walker = Walker::new(graph, chars, lo, hi);
        if let Some(end) = walker.walk(s, 1) {
            return Some(assemble(names, chars, s, end, &walker.emissions));
        }
        s += 1;
    }
    None
}

/// Scan boundaries right-to-left for the match ending furthest right.
pub(crate) fn rfind(
    graph: &Graph,
    names: &[(u32, String)],
    chars: &[char],
    start: usize,
    len: usize,
) -> Option<Match> {
    let lo = start;
    let hi = start + len;
    let mut e = hi;
    loop {
        let mut walker = Walker::new(graph, chars, lo, hi);
        if let Some(match_start) = walker.walk(e, -1) {
            return Some(assemble(names, chars, match_start, e, &walker.emissions));
        }
        if e == lo {
            return None;
        }
        e -= 1;
    }
}

/// Whether the graph matches the region exactly, start to end.
pub(crate) fn fully_matches(graph: &Graph, chars: &[char], start: usize, len: usize) -> bool {
    let hi = start + len;
    let mut walker = Walker::new(graph, chars, start, hi);
    walker.walk(start, 1) == Some(hi)
}

/// Leading bytes for a `memchr` prescan: only usable when the input is
/// ASCII and the head's reachable rune nodes admit at most three ASCII
/// bytes between them.
fn ascii_prescan(
    graph: &Graph,
    leading: &[NodeId],
    text: &str,
    pass_through: bool,
) -> Option<Vec<u8>> {
    if pass_through || !text.is_ascii() || leading.is_empty() {
        return None;
    }
    let mut bytes: Vec<u8> = Vec::new();
    for &id in leading {
        match &graph.node(id).kind {
            NodeKind::Rune { set, inverted } if !*inverted => {
                for &(rlo, rhi) in set.ranges() {
                    if rhi > 0x7F {
                        return None;
                    }
                    for b in rlo..=rhi {
                        if !bytes.contains(&(b as u8)) {
                            bytes.push(b as u8);
                        }
                        if bytes.len() > 3 {
                            return None;
                        }
                    }
                }
            }
            _ => return None,
        }
    }
    Some(bytes)
}

/// Materialize a `Match` from the walk's capture emissions: positions
/// de-duplicated, segmented into contiguous runs, one `Capture` per
/// run. Groups with no recorded position are omitted.
fn assemble(
    names: &[(u32, String)],
    chars: &[char],
    start: usize,
    end: usize,
    emissions: &[(u32, usize)],
) -> Match {
    let mut by_group: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for &(cap, pos) in emissions {
        if pos >= start && pos < end {
            by_group.entry(cap).or_default().push(pos);
        }
    }
    let mut groups = Vec::with_capacity(by_group.len());
    for (index, mut positions) in by_group {
        positions.sort_unstable();
        positions.dedup();
        let name = names
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, n)| n.clone())
            .unwrap_or_else(|| index.to_string());
        let mut captures = Vec::new();
        let mut run_start = positions[0];
        let mut prev = positions[0];
        for &p in &positions[1..] {
            if p != prev + 1 {
                captures.push(capture_run(&name, run_start, prev + 1, chars));
                run_start = p;
            }
            prev = p;
        }
        captures.push(capture_run(&name, run_start, prev + 1, chars));
        groups.push(Group {
            index,
            name,
            captures,
        });
    }
    Match {
        start,
        end,
        text: chars[start..end].iter().collect(),
        groups,
    }
}

fn capture_run(name: &str, start: usize, end: usize, chars: &[char]) -> Capture {
    Capture {
        name: name.to_string(),
        start,
        end,
        text: chars[start..end].iter().collect(),
    }
}

// === Replacement expansion ===

/// Expand the replacement mini-language against one match:
/// `$1`..`$9`, `${name}`, `$$`, `$&`, `` $` ``, `$'`, `$+`, `$_`.
pub(crate) fn expand(template: &str, m: &Match, chars: &[char]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut it = template.chars().peekable();
    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match it.peek().copied() {
            Some('$') => {
                it.next();
                out.push('$');
            }
            Some('&') => {
                it.next();
                out.push_str(m.as_str());
            }
            Some('`') => {
                it.next();
                out.extend(chars[..m.start()].iter());
            }
            Some('\'') => {
                it.next();
                out.extend(chars[m.end()..].iter());
            }
            Some('+') => {
                it.next();
                if let Some(group) = m.last_group() {
                    out.push_str(group.as_str());
                }
            }
            Some('_') => {
                it.next();
                out.extend(chars.iter());
            }
            Some(d @ '1'..='9') => {
                it.next();
                let index = d as u32 - '0' as u32;
                if let Some(group) = m.group(index) {
                    out.push_str(group.as_str());
                }
            }
            Some('{') => {
                it.next();
                let mut name = String::new();
                let mut closed = false;
                for c in it.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    out.push('$');
                    out.push('{');
                    out.push_str(&name);
                    continue;
                }
                let group = name
                    .parse::<u32>()
                    .ok()
                    .and_then(|i| m.group(i))
                    .or_else(|| m.group_named(&name));
                if let Some(group) = group {
                    out.push_str(group.as_str());
                }
            }
            _ => out.push('$'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::options::Options;
    use crate::parser::parse;

    fn compile(pattern: &str) -> Graph {
        build(&parse(pattern, Options::default()).unwrap(), false)
    }

    fn find_str(pattern: &str, input: &str) -> Option<Match> {
        let graph = compile(pattern);
        let chars: Vec<char> = input.chars().collect();
        find(&graph, &[], input, &chars, 0, chars.len())
    }

    fn fully(pattern: &str, input: &str) -> bool {
        let graph = compile(pattern);
        let chars: Vec<char> = input.chars().collect();
        fully_matches(&graph, &chars, 0, chars.len())
    }

    #[test]
    fn literal_find() {
        let m = find_str("bcd", "abcde").unwrap();
        assert_eq!(m.start(), 1);
        assert_eq!(m.end(), 4);
        assert_eq!(m.as_str(), "bcd");
    }

    #[test]
    fn fully_match_boundaries() {
        assert!(fully("abcd", "abcd"));
        assert!(!fully("abcd", "bcda"));
        assert!(fully("a*", ""));
        assert!(!fully("a+", ""));
        assert!(fully("a{2,3}", "aaa"));
        assert!(!fully("a{2,3}", "aaaa"));
    }

    #[test]
    fn binary_union_full_match() {
        assert!(fully("1(0|1)*101", "1101"));
        assert!(!fully("1(0|1)*101", ""));
        assert!(fully("1(0|1)*101", "1010110101"));
    }

    #[test]
    fn greedy_longest_at_start() {
        let m = find_str("[a-c]+", "abcbcdcdedef").unwrap();
        assert_eq!(m.as_str(), "abcbc");
    }

    #[test]
    fn find_skips_nonmatching_prefix() {
        let m = find_str("[a-z]+", "123abc").unwrap();
        assert_eq!(m.start(), 3);
        assert_eq!(m.as_str(), "abc");
    }

    #[test]
    fn anchors_constrain() {
        assert!(find_str("^abc", "xabc").is_none());
        assert!(find_str("^abc", "abcx").is_some());
        assert!(find_str("abc$", "xabc").is_some());
        assert!(find_str("abc$", "abcx").is_none());
    }

    #[test]
    fn word_boundary_nodes() {
        let m = find_str(r"\bcat\b", "a cat sat").unwrap();
        assert_eq!(m.start(), 2);
        assert!(find_str(r"\bcat\b", "concatenate").is_none());
    }

    #[test]
    fn captures_assembled() {
        let m = find_str(r"(\w+) (\w+)", "John Doe").unwrap();
        assert_eq!(m.group(1).unwrap().as_str(), "John");
        assert_eq!(m.group(2).unwrap().as_str(), "Doe");
        assert!(m.group(3).is_none());
    }

    #[test]
    fn unmatched_group_omitted() {
        let m = find_str("(a)(x)?", "ab").unwrap();
        assert!(m.group(1).is_some());
        assert!(m.group(2).is_none());
    }

    #[test]
    fn repeated_group_captures_repeatedly() {
        let m = find_str("(ab)+", "ababab").unwrap();
        let group = m.group(1).unwrap();
        // One run per iteration is ideal; adjacent iterations merge
        // into contiguous runs under shared bookkeeping, but every
        // matched position is covered.
        let covered: usize = group.captures().iter().map(|c| c.end - c.start).sum();
        assert_eq!(covered, 6);
    }

    #[test]
    fn lookahead_constrains() {
        let m = find_str(r"foo(?=bar)", "foobar foobaz").unwrap();
        assert_eq!(m.start(), 0);
        assert_eq!(m.as_str(), "foo");
        assert!(find_str(r"foo(?=bar)", "foobaz").is_none());
    }

    #[test]
    fn negative_lookahead() {
        let m = find_str(r"foo(?!bar)", "foobar foobaz").unwrap();
        assert_eq!(m.start(), 7);
    }

    #[test]
    fn lookbehind_constrains() {
        let m = find_str(r"(?<=\$)\d+", "cost: $42").unwrap();
        assert_eq!(m.as_str(), "42");
        assert!(find_str(r"(?<=\$)\d+", "cost: 42").is_none());
    }

    #[test]
    fn negative_lookbehind() {
        let m = find_str(r"(?<!a)bc", "abc bc").unwrap();
        assert_eq!(m.start(), 4);
    }

    #[test]
    fn backreference_matches_captured_text() {
        assert!(find_str(r"(ab)\1", "abab").is_some());
        assert!(find_str(r"(ab)\1", "abac").is_none());
        let m = find_str(r"(\w+) \1", "hey hey there").unwrap();
        assert_eq!(m.as_str(), "hey hey");
    }

    #[test]
    fn backref_overlay_rolls_back() {
        // Two sequential finds on one graph must not see each other's
        // splices.
        let graph = compile(r"(a+)\1");
        let chars: Vec<char> = "aa aaaa".chars().collect();
        let first = find(&graph, &[], "aa aaaa", &chars, 0, chars.len()).unwrap();
        assert_eq!(first.as_str(), "aa");
        let second = find(&graph, &[], "aa aaaa", &chars, 3, 4).unwrap();
        assert_eq!(second.as_str(), "aaaa");
    }

    #[test]
    fn rfind_reports_rightmost_end() {
        let graph = compile("ab");
        let chars: Vec<char> = "ab ab".chars().collect();
        let m = rfind(&graph, &[], &chars, 0, chars.len()).unwrap();
        assert_eq!(m.start(), 3);
        assert_eq!(m.end(), 5);
    }

    #[test]
    fn empty_region_needs_pass_through() {
        let graph = compile("a+");
        let chars: Vec<char> = vec![];
        assert!(find(&graph, &[], "", &chars, 0, 0).is_none());
        let graph = compile("a*");
        let m = find(&graph, &[], "", &chars, 0, 0).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn prescan_finds_ascii_literal() {
        let m = find_str("xyz", "aaaaaaaaaaaaaaaaaaaaxyzaaa").unwrap();
        assert_eq!(m.start(), 20);
    }

    #[test]
    fn prescan_declines_inverted_and_wide() {
        let graph = compile("[^a]");
        let leading = graph.leading_rune_nodes();
        assert!(ascii_prescan(&graph, &leading, "abc", false).is_none());
    }

    #[test]
    fn fix_direction_normalizes() {
        assert_eq!(fix_direction(3, 1), 3);
        assert_eq!(fix_direction(3, -1), 2);
    }

    #[test]
    fn expand_numbered_and_special() {
        let chars: Vec<char> = "John Doe".chars().collect();
        let graph = compile(r"(\w+) (\w+)");
        let m = find(&graph, &[], "John Doe", &chars, 0, 8).unwrap();
        assert_eq!(expand("$2, $1", &m, &chars), "Doe, John");
        assert_eq!(expand("$&!", &m, &chars), "John Doe!");
        assert_eq!(expand("$$x", &m, &chars), "$x");
        assert_eq!(expand("$+", &m, &chars), "Doe");
        assert_eq!(expand("$_", &m, &chars), "John Doe");
    }

    #[test]
    fn expand_named_and_braced() {
        let chars: Vec<char> = "2026-08".chars().collect();
        let graph = compile(r"(?P<year>\d{4})-(?P<month>\d{2})");
        let names = vec![(1, "year".to_string()), (2, "month".to_string())];
        let m = find(&graph, &names, "2026-08", &chars, 0, 7).unwrap();
        assert_eq!(expand("${month}/${year}", &m, &chars), "08/2026");
        assert_eq!(expand("${1}", &m, &chars), "2026");
        assert_eq!(expand("${missing}", &m, &chars), "");
    }

    #[test]
    fn expand_pre_and_post() {
        let chars: Vec<char> = "abcde".chars().collect();
        let graph = compile("cd");
        let m = find(&graph, &[], "abcde", &chars, 0, 5).unwrap();
        assert_eq!(expand("[$`|$']", &m, &chars), "[ab|e]");
    }
}
