// api.rs - Public API: Regex, RegexBuilder, Matches.
//
// Wraps the internals (parse, build, the frontier engine, the CBT
// detector, the generator) behind one compiled-pattern type. A Regex
// is immutable after construction and safe to share across threads;
// match attempts keep their transient state in per-attempt overlays.

use crate::ast::AstNode;
use crate::detector::{self, CbtReport};
use crate::error::{Error, Result};
use crate::generator::StringGenerator;
use crate::graph::{self, Graph};
use crate::matcher::{self, Match};
use crate::options::Options;
use crate::parser;

/// A compiled regular expression.
///
/// # Examples
///
/// ```
/// use regraph::api::Regex;
///
/// let re = Regex::new(r"\d+").unwrap();
/// assert!(re.is_match("hello 42"));
///
/// let m = re.find("hello 42").unwrap();
/// assert_eq!(m.as_str(), "42");
/// assert_eq!(m.start(), 6);
/// ```
pub struct Regex {
    name: String,
    pattern: String,
    options: Options,
    ast: AstNode,
    graph: Graph,
    names: Vec<(u32, String)>,
}

impl Regex {
    /// Compile a pattern with the default (Perl-flavored) options.
    pub fn new(pattern: &str) -> Result<Regex> {
        Regex::with_options(pattern, Options::default())
    }

    /// Compile a pattern with explicit options.
    pub fn with_options(pattern: &str, options: Options) -> Result<Regex> {
        RegexBuilder::new(pattern).options(options).build()
    }

    /// Create a [`RegexBuilder`] for fine-grained control.
    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// The name given at construction (defaults to the pattern text).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern this regex was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The options the pattern was compiled with.
    pub fn options(&self) -> Options {
        self.options
    }

    /// Number of capture groups in the pattern.
    pub fn capture_count(&self) -> u32 {
        self.ast.max_capture()
    }

    // === Matching ===

    /// Whether the pattern matches anywhere in `input`.
    pub fn is_match(&self, input: &str) -> bool {
        self.find(input).is_some()
    }

    /// Whether the pattern matches anywhere in `input[start..start+length)`
    /// (character indices).
    pub fn is_match_at(&self, input: &str, start: usize, length: usize) -> Result<bool> {
        Ok(self.find_at(input, start, length)?.is_some())
    }

    /// Whether the pattern matches `input` in its entirety.
    ///
    /// ```
    /// use regraph::api::Regex;
    ///
    /// let re = Regex::new("a*").unwrap();
    /// assert!(re.is_fully_match(""));
    /// let re = Regex::new("a+").unwrap();
    /// assert!(!re.is_fully_match(""));
    /// ```
    pub fn is_fully_match(&self, input: &str) -> bool {
        let chars: Vec<char> = input.chars().collect();
        matcher::fully_matches(&self.graph, &chars, 0, chars.len())
    }

    /// Whether the pattern matches exactly the designated region.
    pub fn is_fully_match_at(&self, input: &str, start: usize, length: usize) -> Result<bool> {
        let chars = self.region(input, start, length)?;
        Ok(matcher::fully_matches(&self.graph, &chars, start, length))
    }

    /// The leftmost match, greedily longest at its start position.
    pub fn find(&self, input: &str) -> Option<Match> {
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        matcher::find(&self.graph, &self.names, input, &chars, 0, len)
    }

    /// The leftmost match within a region.
    pub fn find_at(&self, input: &str, start: usize, length: usize) -> Result<Option<Match>> {
        let chars = self.region(input, start, length)?;
        Ok(matcher::find(
            &self.graph,
            &self.names,
            input,
            &chars,
            start,
            length,
        ))
    }

    /// The match ending furthest right, scanning boundaries from the
    /// end of `input` backward.
    pub fn rfind(&self, input: &str) -> Option<Match> {
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        matcher::rfind(&self.graph, &self.names, &chars, 0, len)
    }

    /// Reversed-scan match within a region.
    pub fn rfind_at(&self, input: &str, start: usize, length: usize) -> Result<Option<Match>> {
        let chars = self.region(input, start, length)?;
        Ok(matcher::rfind(
            &self.graph,
            &self.names,
            &chars,
            start,
            length,
        ))
    }

    /// Iterate over all non-overlapping, non-empty matches; each scan
    /// resumes at the previous match's end.
    ///
    /// ```
    /// use regraph::api::Regex;
    ///
    /// let re = Regex::new("[a-zA-Z]*").unwrap();
    /// let words: Vec<String> = re
    ///     .matches("123abc456xyz888tmt")
    ///     .map(|m| m.as_str().to_string())
    ///     .collect();
    /// assert_eq!(words, vec!["abc", "xyz", "tmt"]);
    /// ```
    pub fn matches<'r, 't>(&'r self, input: &'t str) -> Matches<'r, 't> {
        Matches {
            regex: self,
            text: input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    // === Replacement and splitting ===

    /// Replace the first match with the expanded `replacement`
    /// (see the `$`-escapes of the replacement mini-language).
    pub fn replace_first(&self, input: &str, replacement: &str) -> String {
        self.replace_inner(input, |m, chars| matcher::expand(replacement, m, chars), true)
    }

    /// Replace every non-overlapping match.
    ///
    /// ```
    /// use regraph::api::Regex;
    ///
    /// let re = Regex::new("[a-c]+").unwrap();
    /// assert_eq!(re.replace_all("abcbcdcdedef", "x"), "xdxdedef");
    /// ```
    pub fn replace_all(&self, input: &str, replacement: &str) -> String {
        self.replace_inner(input, |m, chars| matcher::expand(replacement, m, chars), false)
    }

    /// Replace every match using an evaluator callback.
    pub fn replace_all_with<F>(&self, input: &str, mut evaluator: F) -> String
    where
        F: FnMut(&Match) -> String,
    {
        self.replace_inner(input, |m, _| evaluator(m), false)
    }

    fn replace_inner<F>(&self, input: &str, mut expand: F, first_only: bool) -> String
    where
        F: FnMut(&Match, &[char]) -> String,
    {
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::with_capacity(input.len());
        let mut pos = 0;
        for m in self.matches(input) {
            out.extend(chars[pos..m.start()].iter());
            out.push_str(&expand(&m, &chars));
            pos = m.end();
            if first_only {
                break;
            }
        }
        out.extend(chars[pos..].iter());
        out
    }

    /// The pieces of `input` between matches; empty pieces are
    /// dropped.
    pub fn split(&self, input: &str) -> Vec<String> {
        let chars: Vec<char> = input.chars().collect();
        let mut pieces = Vec::new();
        let mut pos = 0;
        for m in self.matches(input) {
            if m.start() > pos {
                pieces.push(chars[pos..m.start()].iter().collect());
            }
            pos = m.end();
        }
        if pos < chars.len() {
            pieces.push(chars[pos..].iter().collect());
        }
        pieces
    }

    // === Analysis and generation ===

    /// Statically analyze the compiled graph for catastrophic-
    /// backtracking shapes. Advisory: `Undetected` is not a guarantee.
    ///
    /// ```
    /// use regraph::api::Regex;
    /// use regraph::detector::CbtKind;
    ///
    /// let re = Regex::new(r"(\d+)+").unwrap();
    /// let report = re.detect_catastrophic_backtracking();
    /// assert_eq!(report.kind, CbtKind::NestedLoops);
    /// ```
    pub fn detect_catastrophic_backtracking(&self) -> CbtReport {
        detector::detect(&self.graph, &self.name)
    }

    /// One random string matching the pattern.
    pub fn generate_with_seed(&self, seed: u64) -> String {
        StringGenerator::new(&self.ast, seed).generate()
    }

    /// A seeded generator iterator over matching strings.
    pub fn generator(&self, seed: u64) -> StringGenerator<'_> {
        StringGenerator::new(&self.ast, seed)
    }

    // === Helpers ===

    /// Validate a (start, length) region and return the input as chars.
    fn region(&self, input: &str, start: usize, length: usize) -> Result<Vec<char>> {
        let chars: Vec<char> = input.chars().collect();
        let end = start.checked_add(length);
        match end {
            Some(end) if start <= chars.len() && end <= chars.len() => Ok(chars),
            _ => Err(Error::argument(format!(
                "region {}..{} outside input of length {}",
                start,
                start.saturating_add(length),
                chars.len()
            ))),
        }
    }
}

impl std::fmt::Debug for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regex")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

// === RegexBuilder ===

/// Builder for compiling a [`Regex`] with custom options.
///
/// # Examples
///
/// ```
/// use regraph::api::Regex;
///
/// let re = Regex::builder("hello world")
///     .case_insensitive(true)
///     .build()
///     .unwrap();
/// assert!(re.is_match("Hello World"));
/// ```
pub struct RegexBuilder {
    name: Option<String>,
    pattern: String,
    options: Options,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            name: None,
            pattern: pattern.to_string(),
            options: Options::default(),
        }
    }

    /// Name the regex for diagnostics and CBT reports.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Replace the option set wholesale.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set a single option flag on top of the current set.
    pub fn option(mut self, flag: Options) -> Self {
        self.options |= flag;
        self
    }

    /// Enable or disable case-insensitive matching.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.set(Options::FOLD_CASE, yes);
        self
    }

    /// Enable or disable `.` matching newline.
    pub fn dot_matches_newline(mut self, yes: bool) -> Self {
        self.options.set(Options::DOT_NL, yes);
        self
    }

    /// Enable or disable line-boundary anchors for `^`/`$`.
    pub fn multi_line(mut self, yes: bool) -> Self {
        self.options.set(Options::ONE_LINE, !yes);
        self
    }

    /// Treat the whole pattern as a literal string.
    pub fn literal(mut self, yes: bool) -> Self {
        self.options.set(Options::LITERAL, yes);
        self
    }

    /// Compile the pattern into a [`Regex`].
    pub fn build(self) -> Result<Regex> {
        let ast = parser::parse(&self.pattern, self.options)?;
        let graph = graph::build(&ast, self.options.contains(Options::FOLD_CASE));
        let mut names = Vec::new();
        ast.capture_names(&mut names);
        Ok(Regex {
            name: self.name.unwrap_or_else(|| self.pattern.clone()),
            pattern: self.pattern,
            options: self.options,
            ast,
            graph,
            names,
        })
    }
}

// === Matches ===

/// Iterator over all non-overlapping, non-empty matches in a text.
pub struct Matches<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    chars: Vec<char>,
    pos: usize,
}

impl Iterator for Matches<'_, '_> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        while self.pos <= self.chars.len() {
            let remaining = self.chars.len() - self.pos;
            let m = matcher::find(
                &self.regex.graph,
                &self.regex.names,
                self.text,
                &self.chars,
                self.pos,
                remaining,
            )?;
            if m.is_empty() {
                // Step over empty matches so iteration always advances.
                self.pos = m.start() + 1;
                continue;
            }
            self.pos = m.end();
            return Some(m);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxErrorKind;

    #[test]
    fn new_and_find() {
        let re = Regex::new(r"\d+").unwrap();
        let m = re.find("hello 42 world").unwrap();
        assert_eq!(m.as_str(), "42");
        assert_eq!(m.start(), 6);
        assert_eq!(m.end(), 8);
        assert_eq!(m.range(), 6..8);
    }

    #[test]
    fn no_match_returns_none() {
        let re = Regex::new(r"\d+").unwrap();
        assert!(re.find("no digits here").is_none());
    }

    #[test]
    fn invalid_pattern_errors() {
        let err = Regex::new("(unclosed").unwrap_err();
        assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::MissingParen));
    }

    #[test]
    fn fully_match_agrees_with_whole_span_match() {
        let re = Regex::new("abcd").unwrap();
        assert!(re.is_fully_match("abcd"));
        assert!(!re.is_fully_match("bcda"));
        let m = re.find("abcd").unwrap();
        assert_eq!((m.start(), m.end()), (0, 4));
    }

    #[test]
    fn region_arguments_validated() {
        let re = Regex::new("a").unwrap();
        assert!(re.is_match_at("aaa", 0, 3).is_ok());
        assert!(re.is_match_at("aaa", 2, 1).is_ok());
        let err = re.is_match_at("aaa", 2, 5).unwrap_err();
        assert!(matches!(err, Error::Argument { .. }));
        assert!(re.find_at("aaa", 4, 0).is_err());
    }

    #[test]
    fn match_region_offsets() {
        let re = Regex::new("a+").unwrap();
        let m = re.find_at("baaab", 2, 3).unwrap().unwrap();
        assert_eq!(m.start(), 2);
        assert_eq!(m.end(), 4);
    }

    #[test]
    fn matches_iterator_collects_words() {
        let re = Regex::new("[a-zA-Z]*").unwrap();
        let found: Vec<String> = re
            .matches("123abc456xyz888tmt")
            .map(|m| m.as_str().to_string())
            .collect();
        assert_eq!(found, vec!["abc", "xyz", "tmt"]);
    }

    #[test]
    fn split_drops_empty_pieces() {
        let re = Regex::new("[a-zA-Z]*").unwrap();
        assert_eq!(
            re.split("123abc456xyz888tmt"),
            vec!["123", "456", "888"]
        );
    }

    #[test]
    fn replace_all_scenario() {
        let re = Regex::new("[a-c]+").unwrap();
        assert_eq!(re.replace_all("abcbcdcdedef", "x"), "xdxdedef");
    }

    #[test]
    fn replace_first_only() {
        let re = Regex::new(r"\d+").unwrap();
        assert_eq!(re.replace_first("1 and 2", "n"), "n and 2");
    }

    #[test]
    fn replace_with_group_references() {
        let re = Regex::new(r"(\w+)@(\w+)").unwrap();
        assert_eq!(
            re.replace_all("user@host", "$2 has $1"),
            "host has user"
        );
    }

    #[test]
    fn replace_with_evaluator() {
        let re = Regex::new(r"\d+").unwrap();
        let doubled = re.replace_all_with("2 and 3", |m| {
            (m.as_str().parse::<i64>().unwrap() * 2).to_string()
        });
        assert_eq!(doubled, "4 and 6");
    }

    #[test]
    fn builder_case_insensitive() {
        let re = Regex::builder("hello").case_insensitive(true).build().unwrap();
        assert!(re.is_match("HELLO"));
        assert!(re.is_match("Hello"));
    }

    #[test]
    fn builder_literal_mode() {
        let re = Regex::builder("a*b").literal(true).build().unwrap();
        assert!(re.is_match("xa*by"));
        assert!(!re.is_match("aaab"));
    }

    #[test]
    fn builder_names_regex() {
        let re = Regex::builder("a+").name("alpha-run").build().unwrap();
        assert_eq!(re.name(), "alpha-run");
        assert_eq!(re.detect_catastrophic_backtracking().regex, "alpha-run");
    }

    #[test]
    fn named_groups_surface_in_match() {
        let re = Regex::new(r"(?P<user>\w+)@(?P<host>\w+)").unwrap();
        let m = re.find("joe@example").unwrap();
        assert_eq!(m.group_named("user").unwrap().as_str(), "joe");
        assert_eq!(m.group_named("host").unwrap().as_str(), "example");
        assert_eq!(re.capture_count(), 2);
    }

    #[test]
    fn rfind_scans_backward() {
        let re = Regex::new("ab").unwrap();
        let m = re.rfind("ab ab").unwrap();
        assert_eq!(m.start(), 3);
    }

    #[test]
    fn generator_round_trip() {
        let re = Regex::new("[ab]{4,6}c").unwrap();
        for sample in re.generator(11).take(100) {
            assert!(re.is_fully_match(&sample), "generated {:?}", sample);
        }
    }

    #[test]
    fn debug_does_not_dump_internals() {
        let re = Regex::new("a").unwrap();
        let dbg = format!("{:?}", re);
        assert!(dbg.contains("pattern"));
    }
}
