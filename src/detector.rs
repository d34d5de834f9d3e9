// detector.rs - Static catastrophic-backtracking analysis.
//
// Enumerates simple cycles ("circles") by breadth-first path extension
// from the head, then classifies circle pairs and singletons against
// precomputed per-node character sets. Escalating checks, first
// positive wins: parallel, nested, connected, then a single-circle
// back-escape fallback. The analysis is advisory: an inconclusive
// result is reported as Undetected, which is not a safety guarantee.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::thread;

use crate::graph::{Graph, NodeId, NodeKind};
use crate::runes::RuneSet;

/// Pathological shape found in a graph, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CbtKind {
    /// No pathological shape found (not a safety guarantee).
    Undetected,
    /// Two loops connected by a path, consuming overlapping characters.
    ConnectedLoops,
    /// Overlapping disjunction loops sharing an entry, e.g. `(ab|ac|ad){2,}`.
    ParallelLoops,
    /// A loop inside a loop over the same characters, e.g. `(\d+)+`.
    NestedLoops,
    /// A loop an attacker can leave and re-enter from outside.
    SingleEscapedLoop,
}

/// Detector verdict. `position`/`length` locate the offending pattern
/// text; `attacker` is a best-effort pump string for the reported
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbtReport {
    pub kind: CbtKind,
    pub regex: String,
    pub position: usize,
    pub length: usize,
    pub node: Option<NodeId>,
    pub attacker: Option<String>,
}

impl CbtReport {
    fn undetected(regex: &str) -> CbtReport {
        CbtReport {
            kind: CbtKind::Undetected,
            regex: regex.to_string(),
            position: 0,
            length: 0,
            node: None,
            attacker: None,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.kind != CbtKind::Undetected
    }
}

// === Path ===

/// Immutable reverse-linked list of visited nodes: O(1) extension,
/// O(length) membership, shared tails between sibling paths.
struct Path {
    node: NodeId,
    prev: Option<Rc<Path>>,
}

impl Path {
    fn root(node: NodeId) -> Rc<Path> {
        Rc::new(Path { node, prev: None })
    }

    fn extend(prev: &Rc<Path>, node: NodeId) -> Rc<Path> {
        Rc::new(Path {
            node,
            prev: Some(Rc::clone(prev)),
        })
    }

    fn contains(&self, node: NodeId) -> bool {
        let mut cur = self;
        loop {
            if cur.node == node {
                return true;
            }
            match &cur.prev {
                Some(prev) => cur = prev,
                None => return false,
            }
        }
    }

    /// Nodes from the first occurrence of `from` to the end of the
    /// path, in walk order.
    fn cut_circle(&self, from: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        let mut cur = self;
        loop {
            nodes.push(cur.node);
            if cur.node == from {
                break;
            }
            cur = cur.prev.as_ref().expect("`from` is on the path");
        }
        nodes.reverse();
        nodes
    }
}

// === Circles ===

struct Circle {
    /// Cycle node sequence, rotated so the smallest id leads; node ids
    /// are breadth-first after compaction, making this deterministic.
    seq: Vec<NodeId>,
    set: HashSet<NodeId>,
    /// First rune node in cycle order.
    first_rune: Option<NodeId>,
    /// Union of every rune set on the cycle.
    rune_union: RuneSet,
}

impl Circle {
    fn new(mut seq: Vec<NodeId>, sets: &[Option<RuneSet>]) -> Circle {
        // Normalize rotation for deduplication and comparison.
        let min_pos = seq
            .iter()
            .enumerate()
            .min_by_key(|&(_, &id)| id)
            .map(|(i, _)| i)
            .unwrap_or(0);
        seq.rotate_left(min_pos);
        let set: HashSet<NodeId> = seq.iter().copied().collect();
        let first_rune = seq.iter().copied().find(|&id| sets[id].is_some());
        let mut rune_union = RuneSet::new();
        for &id in &seq {
            if let Some(set) = &sets[id] {
                rune_union.union_with(set);
            }
        }
        Circle {
            seq,
            set,
            first_rune,
            rune_union,
        }
    }

    fn first_set<'a>(&self, sets: &'a [Option<RuneSet>]) -> Option<&'a RuneSet> {
        self.first_rune.and_then(|id| sets[id].as_ref())
    }

    fn contains_all(&self, other: &Circle) -> bool {
        other.set.len() < self.set.len() && other.set.iter().all(|id| self.set.contains(id))
    }
}

// Exploration bounds. Circles beyond these are simply not enumerated;
// the single-circle fallback still runs on what was found.
const MAX_EDGE_VISITS: u32 = 4;
const MAX_PATH_POPS: usize = 50_000;

/// Analyze `graph` for catastrophic-backtracking shapes. Never fails.
pub fn detect(graph: &Graph, regex: &str) -> CbtReport {
    let sets = resolve_sets(graph);
    let circles = enumerate_circles(graph, &sets);
    if circles.is_empty() {
        return CbtReport::undetected(regex);
    }

    let pairs: Vec<(usize, usize)> = (0..circles.len())
        .flat_map(|i| (i + 1..circles.len()).map(move |j| (i, j)))
        .collect();

    // Escalating checks; each scans every pair before the next runs.
    if let Some(&(i, _)) = scan_pairs(&pairs, |&(i, j)| {
        is_parallel(&circles[i], &circles[j], &sets)
    }) {
        return report(CbtKind::ParallelLoops, regex, graph, &circles[i], &sets);
    }
    if let Some(&(i, j)) = scan_pairs(&pairs, |&(i, j)| {
        is_nested(&circles[i], &circles[j], &sets) || is_nested(&circles[j], &circles[i], &sets)
    }) {
        let inner = if circles[i].contains_all(&circles[j]) { j } else { i };
        return report(CbtKind::NestedLoops, regex, graph, &circles[inner], &sets);
    }
    if let Some(&(i, _)) = scan_pairs(&pairs, |&(i, j)| {
        is_connected(graph, &circles[i], &circles[j])
    }) {
        return report(CbtKind::ConnectedLoops, regex, graph, &circles[i], &sets);
    }
    for circle in &circles {
        if has_back_escape(graph, circle, &sets) {
            return report(CbtKind::SingleEscapedLoop, regex, graph, circle, &sets);
        }
    }
    CbtReport::undetected(regex)
}

// === Per-node character sets ===

/// Resolve every rune node's admissible set once, up front; inverted
/// sets are complemented against the full alphabet. Fanned out across
/// worker threads for large graphs, gathered into one immutable table
/// before any comparison runs.
fn resolve_sets(graph: &Graph) -> Vec<Option<RuneSet>> {
    let n = graph.len();
    let resolve_one = |id: NodeId| -> Option<RuneSet> {
        match &graph.node(id).kind {
            NodeKind::Rune { set, inverted } => {
                let mut resolved = set.clone();
                if *inverted {
                    resolved.negate();
                }
                Some(resolved)
            }
            _ => None,
        }
    };

    let workers = thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    if n < 64 || workers < 2 {
        return (0..n).map(resolve_one).collect();
    }

    let chunk = n.div_ceil(workers);
    let mut out: Vec<Option<RuneSet>> = vec![None; n];
    thread::scope(|scope| {
        let mut handles = Vec::new();
        for w in 0..workers {
            let lo = w * chunk;
            let hi = ((w + 1) * chunk).min(n);
            if lo >= hi {
                break;
            }
            let resolve_one = &resolve_one;
            handles.push(scope.spawn(move || {
                (lo..hi).map(|id| (id, resolve_one(id))).collect::<Vec<_>>()
            }));
        }
        for handle in handles {
            for (id, set) in handle.join().expect("detector worker panicked") {
                out[id] = set;
            }
        }
    });
    out
}

/// Run `test` over pair batches in parallel, returning the first pair
/// (in input order) that satisfies it. Purely read-only over the
/// precomputed tables.
fn scan_pairs<'p, F>(pairs: &'p [(usize, usize)], test: F) -> Option<&'p (usize, usize)>
where
    F: Fn(&(usize, usize)) -> bool + Sync,
{
    let workers = thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    if pairs.len() < 32 || workers < 2 {
        return pairs.iter().find(|pair| test(pair));
    }
    let chunk = pairs.len().div_ceil(workers);
    thread::scope(|scope| {
        let mut handles = Vec::new();
        for batch in pairs.chunks(chunk) {
            let test = &test;
            handles.push(scope.spawn(move || batch.iter().position(|pair| test(pair))));
        }
        let mut best: Option<usize> = None;
        for (w, handle) in handles.into_iter().enumerate() {
            if let Some(local) = handle.join().expect("detector worker panicked") {
                let global = w * chunk + local;
                best = Some(best.map_or(global, |b| b.min(global)));
            }
        }
        best.map(|i| &pairs[i])
    })
}

// === Circle enumeration ===

/// Breadth-first path extension from the head; a path that revisits a
/// node is cut into a circle instead of being extended further.
fn enumerate_circles(graph: &Graph, sets: &[Option<RuneSet>]) -> Vec<Circle> {
    let mut circles: Vec<Circle> = Vec::new();
    let mut seen_seqs: HashSet<Vec<NodeId>> = HashSet::new();
    let mut edge_visits: HashMap<(NodeId, NodeId), u32> = HashMap::new();
    let mut queue: VecDeque<Rc<Path>> = VecDeque::new();
    queue.push_back(Path::root(graph.head()));
    let mut budget = MAX_PATH_POPS;

    while let Some(path) = queue.pop_front() {
        if budget == 0 {
            break;
        }
        budget -= 1;
        for &next in &graph.node(path.node).outs {
            if path.contains(next) {
                let circle = Circle::new(path.cut_circle(next), sets);
                if seen_seqs.insert(circle.seq.clone()) {
                    circles.push(circle);
                }
                continue;
            }
            let visits = edge_visits.entry((path.node, next)).or_insert(0);
            if *visits >= MAX_EDGE_VISITS {
                continue;
            }
            *visits += 1;
            queue.push_back(Path::extend(&path, next));
        }
    }
    circles
}

// === Classification ===

/// Parallel loops: distinct circles through one entry node whose first
/// rune sets overlap - the exponential overlapping-disjunction shape.
fn is_parallel(a: &Circle, b: &Circle, sets: &[Option<RuneSet>]) -> bool {
    if a.contains_all(b) || b.contains_all(a) {
        return false;
    }
    if a.seq.first() != b.seq.first() {
        return false;
    }
    match (a.first_set(sets), b.first_set(sets)) {
        (Some(sa), Some(sb)) => sa.intersects(sb),
        _ => false,
    }
}

/// Nested loops: `inner` is contained in `outer` and every rune node
/// of the outer circle outside the inner one overlaps the inner's
/// first set - an unbroken passage from outer to inner.
fn is_nested(outer: &Circle, inner: &Circle, sets: &[Option<RuneSet>]) -> bool {
    if !outer.contains_all(inner) {
        return false;
    }
    let Some(inner_first) = inner.first_set(sets) else {
        return false;
    };
    outer
        .seq
        .iter()
        .filter(|&&id| !inner.set.contains(&id))
        .all(|&id| match &sets[id] {
            Some(set) => set.intersects(inner_first),
            None => true,
        })
}

/// Connected loops: disjoint circles with a directed path from one to
/// the other and overlapping character sets along both.
fn is_connected(graph: &Graph, a: &Circle, b: &Circle) -> bool {
    if a.contains_all(b) || b.contains_all(a) {
        return false;
    }
    if !a.rune_union.intersects(&b.rune_union) {
        return false;
    }
    reaches(graph, &a.set, &b.set) || reaches(graph, &b.set, &a.set)
}

/// Single escaped loop: a rune node outside the circle, overlapping
/// its characters, that the circle can escape to and re-enter from -
/// a second way around that path enumeration missed.
fn has_back_escape(graph: &Graph, circle: &Circle, sets: &[Option<RuneSet>]) -> bool {
    let Some(first_rune) = circle.first_rune else {
        return false;
    };
    // Input-side predecessors bounded by node id, so the circle is not
    // re-entered from ahead.
    let bound = first_rune;
    for &member in &circle.seq {
        for &pred in &graph.node(member).ins {
            if circle.set.contains(&pred) || pred >= bound {
                continue;
            }
            let Some(pred_set) = &sets[pred] else {
                continue;
            };
            if !pred_set.intersects(&circle.rune_union) {
                continue;
            }
            let pred_singleton: HashSet<NodeId> = [pred].into_iter().collect();
            if reaches(graph, &circle.set, &pred_singleton) {
                return true;
            }
        }
    }
    false
}

/// Directed reachability from any node of `from` to any node of `to`,
/// leaving `from` through edges that exit the set.
fn reaches(graph: &Graph, from: &HashSet<NodeId>, to: &HashSet<NodeId>) -> bool {
    let mut seen: HashSet<NodeId> = from.clone();
    let mut work: Vec<NodeId> = from.iter().copied().collect();
    while let Some(id) = work.pop() {
        for &next in &graph.node(id).outs {
            if to.contains(&next) && !from.contains(&next) {
                return true;
            }
            if seen.insert(next) {
                work.push(next);
            }
        }
    }
    false
}

// === Reporting ===

fn report(
    kind: CbtKind,
    regex: &str,
    graph: &Graph,
    circle: &Circle,
    sets: &[Option<RuneSet>],
) -> CbtReport {
    let node = circle.first_rune.or_else(|| circle.seq.first().copied());
    let (position, length) = circle_span(graph, circle);
    CbtReport {
        kind,
        regex: regex.to_string(),
        position,
        length,
        node,
        attacker: build_attacker(circle, sets),
    }
}

/// The pattern span covered by the circle, as (position, length).
fn circle_span(graph: &Graph, circle: &Circle) -> (usize, usize) {
    let mut lo = usize::MAX;
    let mut hi = 0;
    for &id in &circle.seq {
        let span = graph.node(id).span;
        lo = lo.min(span.0);
        hi = hi.max(span.1);
    }
    if lo == usize::MAX {
        (0, 0)
    } else {
        (lo, hi - lo)
    }
}

/// A pump string over the circle's characters, terminated by a rune
/// the circle rejects, to drive a backtracking matcher into its worst
/// case.
fn build_attacker(circle: &Circle, sets: &[Option<RuneSet>]) -> Option<String> {
    let set = circle.first_set(sets)?;
    let pump = pick_printable(set)?;
    let stop = ['!', '#', '~', ' ', '\u{1}']
        .into_iter()
        .find(|&c| !set.contains(c as u32))
        .unwrap_or('!');
    let mut attacker = String::with_capacity(33);
    for _ in 0..32 {
        attacker.push(pump);
    }
    attacker.push(stop);
    Some(attacker)
}

fn pick_printable(set: &RuneSet) -> Option<char> {
    for &(lo, hi) in set.ranges() {
        for rune in lo..=hi.min(lo + 128) {
            if (0x21..=0x7E).contains(&rune) {
                return char::from_u32(rune);
            }
        }
    }
    set.min().and_then(char::from_u32)
}
