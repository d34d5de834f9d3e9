// generator.rs - Random strings that match a parsed pattern.
//
// Walks the AST with a seeded RNG: classes pick a uniform member of
// their resolved set, alternations pick a branch, quantifiers pick a
// count within bounds. Anchors and lookarounds emit nothing, so
// patterns relying on them may need post-hoc checking by the caller.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ast::{AstNode, AstOp};
use crate::options::Options;
use crate::runes::RuneSet;

/// Extra iterations granted to unbounded quantifiers.
const UNBOUNDED_EXTRA: u32 = 4;

/// Seeded generator over one pattern's AST. Two generators built with
/// the same seed produce identical output sequences.
pub struct StringGenerator<'r> {
    ast: &'r AstNode,
    rng: StdRng,
    captured: HashMap<u32, String>,
}

impl<'r> StringGenerator<'r> {
    pub(crate) fn new(ast: &'r AstNode, seed: u64) -> StringGenerator<'r> {
        StringGenerator {
            ast,
            rng: StdRng::seed_from_u64(seed),
            captured: HashMap::new(),
        }
    }

    /// Produce one string the pattern matches.
    pub fn generate(&mut self) -> String {
        let mut out = String::new();
        self.captured.clear();
        self.emit(self.ast, &mut out);
        out
    }

    fn emit(&mut self, node: &AstNode, out: &mut String) {
        match node.op {
            AstOp::Empty
            | AstOp::BeginLine
            | AstOp::EndLine
            | AstOp::BeginText
            | AstOp::EndText
            | AstOp::WordBoundary
            | AstOp::NoWordBoundary
            | AstOp::LookAhead
            | AstOp::LookBehind => {}
            AstOp::Literal => {
                let fold = node.options.contains(Options::FOLD_CASE);
                for &rune in &node.runes {
                    let Some(c) = char::from_u32(rune) else { continue };
                    let c = if fold && self.rng.gen_bool(0.5) {
                        flip_case(c)
                    } else {
                        c
                    };
                    out.push(c);
                }
            }
            AstOp::CharClass => {
                let resolved = resolve_class(node);
                if let Some(c) = self.pick(&resolved) {
                    out.push(c);
                }
            }
            AstOp::AnyCharNotNl | AstOp::AnyChar => {
                let printable = RuneSet::from_ranges(&[(0x20, 0x7E)]);
                if let Some(c) = self.pick(&printable) {
                    out.push(c);
                }
            }
            AstOp::Capture => {
                let mark = out.len();
                self.emit(&node.subs[0], out);
                self.captured.insert(node.cap, out[mark..].to_string());
            }
            AstOp::Star => self.repeat_emit(&node.subs[0], 0, None, out),
            AstOp::Plus => self.repeat_emit(&node.subs[0], 1, None, out),
            AstOp::Quest => self.repeat_emit(&node.subs[0], 0, Some(1), out),
            AstOp::Repeat => self.repeat_emit(&node.subs[0], node.min, node.max, out),
            AstOp::Concat => {
                for sub in &node.subs {
                    self.emit(sub, out);
                }
            }
            AstOp::Alternate => {
                let branch = self.rng.gen_range(0..node.subs.len());
                self.emit(&node.subs[branch], out);
            }
            AstOp::BackRef => {
                if let Some(text) = self.captured.get(&node.group) {
                    let text = text.clone();
                    out.push_str(&text);
                }
            }
            AstOp::PseudoLeftParen | AstOp::PseudoVerticalBar => {
                unreachable!("pseudo ops never leave the parser stack")
            }
        }
    }

    fn repeat_emit(&mut self, sub: &AstNode, min: u32, max: Option<u32>, out: &mut String) {
        let cap = max.unwrap_or(min + UNBOUNDED_EXTRA);
        let count = if cap > min {
            self.rng.gen_range(min..=cap)
        } else {
            min
        };
        for _ in 0..count {
            self.emit(sub, out);
        }
    }

    /// Uniform member of `set`, preferring its printable-ASCII subset
    /// and skipping code points that are not valid scalars.
    fn pick(&mut self, set: &RuneSet) -> Option<char> {
        let mut ascii = RuneSet::new();
        for &(lo, hi) in set.ranges() {
            if lo <= 0x7E && hi >= 0x20 {
                ascii.add_range(lo.max(0x20), hi.min(0x7E));
            }
        }
        let pool = if ascii.is_empty() { set } else { &ascii };
        let size = pool.len();
        if size == 0 {
            return None;
        }
        for _ in 0..16 {
            let rune = pool.select(self.rng.gen_range(0..size))?;
            if let Some(c) = char::from_u32(rune) {
                return Some(c);
            }
        }
        // Degenerate sets (surrogate-heavy complements): take the
        // first valid scalar instead of sampling further.
        for &(lo, hi) in pool.ranges() {
            for rune in lo..=hi {
                if let Some(c) = char::from_u32(rune) {
                    return Some(c);
                }
            }
        }
        None
    }
}

impl Iterator for StringGenerator<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.generate())
    }
}

/// The concrete set a class node admits, mirroring the builder's
/// newline and negation handling.
fn resolve_class(node: &AstNode) -> RuneSet {
    let mut set = node.set.clone();
    if node.negated {
        if !node.options.contains(Options::CLASS_NL) {
            set.add_rune('\n' as u32);
        }
        set.negate();
    }
    set
}

fn flip_case(c: char) -> char {
    if c.is_lowercase() {
        let mut upper = c.to_uppercase();
        if let (Some(u), None) = (upper.next(), upper.next()) {
            return u;
        }
        c
    } else {
        let mut lower = c.to_lowercase();
        if let (Some(l), None) = (lower.next(), lower.next()) {
            return l;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn generator(pattern: &str, seed: u64) -> (AstNode, u64) {
        let ast = parse(pattern, Options::default()).unwrap();
        (ast, seed)
    }

    #[test]
    fn same_seed_same_sequence() {
        let (ast, _) = generator("[ab]{4,6}c", 0);
        let a: Vec<String> = StringGenerator::new(&ast, 42).take(20).collect();
        let b: Vec<String> = StringGenerator::new(&ast, 42).take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let (ast, _) = generator("[a-z]{8}", 0);
        let a: Vec<String> = StringGenerator::new(&ast, 1).take(8).collect();
        let b: Vec<String> = StringGenerator::new(&ast, 2).take(8).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn literal_emits_itself() {
        let (ast, _) = generator("hello", 0);
        assert_eq!(StringGenerator::new(&ast, 7).generate(), "hello");
    }

    #[test]
    fn class_members_come_from_the_set() {
        let (ast, _) = generator("[abc]{10}", 0);
        let sample = StringGenerator::new(&ast, 3).generate();
        assert_eq!(sample.len(), 10);
        assert!(sample.chars().all(|c| "abc".contains(c)));
    }

    #[test]
    fn repeat_respects_bounds() {
        let (ast, _) = generator("a{2,5}", 0);
        for (i, sample) in StringGenerator::new(&ast, 9).take(32).enumerate() {
            assert!(
                (2..=5).contains(&sample.len()),
                "sample {} out of bounds: {:?}",
                i,
                sample
            );
        }
    }

    #[test]
    fn backref_repeats_captured_text() {
        let (ast, _) = generator(r"([ab]{3})-\1", 0);
        for sample in StringGenerator::new(&ast, 5).take(16) {
            let (left, right) = sample.split_once('-').unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn anchors_emit_nothing() {
        let (ast, _) = generator("^abc$", 0);
        assert_eq!(StringGenerator::new(&ast, 1).generate(), "abc");
    }
}
