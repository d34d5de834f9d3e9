// parser.rs - Pattern text to AST.
//
// A single left-to-right scan over the pattern drives an explicit
// operand stack. Literals, classes and completed sub-expressions are
// pushed as operands; `(`, `|` and `)` push pseudo markers and reduce.
// On `)` or end of input the stack is collapsed down to the nearest
// marker, split on alternation markers, each run wrapped in `Concat`
// and the runs in `Alternate` - the shape the graph builder expects at
// every scope level.

use crate::ast::{AstNode, AstOp};
use crate::classes;
use crate::error::{Error, Result, SyntaxErrorKind};
use crate::options::Options;
use crate::runes::{RuneSet, MAX_RUNE};

/// Largest accepted `{m,n}` bound.
pub const MAX_REPEAT: u32 = 1000;

/// Parse `pattern` under `options` into an AST.
pub fn parse(pattern: &str, options: Options) -> Result<AstNode> {
    if options.contains(Options::LITERAL) {
        let runes: Vec<u32> = pattern.chars().map(|c| c as u32).collect();
        let mut lit = AstNode::literal(runes, options, (0, pattern.len()));
        if pattern.is_empty() {
            lit.op = AstOp::Empty;
        }
        return Ok(lit);
    }
    Parser::new(pattern, options).run()
}

// What a `(` marker on the stack stands for, kept on a side stack in
// lockstep with the pseudo node.
enum GroupKind {
    Capture(u32, Option<String>),
    Plain,
    LookAhead(bool),
    LookBehind(bool),
}

struct OpenGroup {
    kind: GroupKind,
    saved_options: Options,
    span_start: usize,
}

struct Parser<'p> {
    pattern: &'p str,
    chars: Vec<(usize, char)>,
    pos: usize,
    options: Options,
    stack: Vec<AstNode>,
    groups: Vec<OpenGroup>,
    num_caps: u32,
    names: Vec<String>,
}

impl<'p> Parser<'p> {
    fn new(pattern: &'p str, options: Options) -> Parser<'p> {
        Parser {
            pattern,
            chars: pattern.char_indices().collect(),
            pos: 0,
            options,
            stack: Vec::new(),
            groups: Vec::new(),
            num_caps: 0,
            names: Vec::new(),
        }
    }

    // === Scanning helpers ===

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Byte offset of the current scan position.
    fn byte_pos(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(b, _)| b)
            .unwrap_or(self.pattern.len())
    }

    fn rest_from(&self, byte_start: usize) -> &str {
        &self.pattern[byte_start..]
    }

    fn err(&self, kind: SyntaxErrorKind, fragment: &str) -> Error {
        Error::syntax(kind, fragment)
    }

    // === Main scan ===

    fn run(mut self) -> Result<AstNode> {
        while let Some(c) = self.peek() {
            let start = self.byte_pos();
            match c {
                '(' => self.open_group(start)?,
                ')' => self.close_group()?,
                '|' => {
                    self.pos += 1;
                    self.stack.push(AstNode::new(
                        AstOp::PseudoVerticalBar,
                        self.options,
                        (start, self.byte_pos()),
                    ));
                }
                '*' | '+' | '?' => self.repeat_op(c, start)?,
                '{' => self.repeat_bounds(start)?,
                '[' => {
                    let node = self.parse_class(start)?;
                    self.stack.push(node);
                }
                '\\' => {
                    let node = self.parse_escape(start)?;
                    self.stack.push(node);
                }
                '.' => {
                    self.pos += 1;
                    let op = if self.options.contains(Options::DOT_NL) {
                        AstOp::AnyChar
                    } else {
                        AstOp::AnyCharNotNl
                    };
                    self.stack
                        .push(AstNode::new(op, self.options, (start, self.byte_pos())));
                }
                '^' => {
                    self.pos += 1;
                    let op = if self.options.contains(Options::ONE_LINE) {
                        AstOp::BeginText
                    } else {
                        AstOp::BeginLine
                    };
                    self.stack
                        .push(AstNode::new(op, self.options, (start, self.byte_pos())));
                }
                '$' => {
                    self.pos += 1;
                    let op = if self.options.contains(Options::ONE_LINE) {
                        AstOp::EndText
                    } else {
                        AstOp::EndLine
                    };
                    self.stack
                        .push(AstNode::new(op, self.options, (start, self.byte_pos())));
                }
                _ => {
                    self.pos += 1;
                    self.stack.push(AstNode::literal(
                        vec![c as u32],
                        self.options,
                        (start, self.byte_pos()),
                    ));
                }
            }
        }

        if !self.groups.is_empty() {
            return Err(self.err(SyntaxErrorKind::MissingParen, self.pattern));
        }
        let node = self.collapse((0, self.pattern.len()))?;
        debug_assert!(self.stack.is_empty());
        Ok(node)
    }

    // === Groups ===

    fn open_group(&mut self, start: usize) -> Result<()> {
        self.pos += 1; // consume '('
        let kind = if self.options.contains(Options::PERL_X) && self.eat('?') {
            self.perl_group(start)?
        } else {
            self.num_caps += 1;
            Some(GroupKind::Capture(self.num_caps, None))
        };
        let Some(kind) = kind else {
            // Inline flag setting such as `(?i)`: no group was opened.
            return Ok(());
        };
        self.groups.push(OpenGroup {
            kind,
            saved_options: self.options,
            span_start: start,
        });
        self.stack.push(AstNode::new(
            AstOp::PseudoLeftParen,
            self.options,
            (start, start + 1),
        ));
        Ok(())
    }

    /// Scan the body of a `(?...` construct. Returns `None` when the
    /// construct only mutated the active options.
    fn perl_group(&mut self, start: usize) -> Result<Option<GroupKind>> {
        match self.peek() {
            Some(':') => {
                self.pos += 1;
                Ok(Some(GroupKind::Plain))
            }
            Some('=') => {
                self.pos += 1;
                Ok(Some(GroupKind::LookAhead(false)))
            }
            Some('!') => {
                self.pos += 1;
                Ok(Some(GroupKind::LookAhead(true)))
            }
            Some('<') => {
                self.pos += 1;
                match self.peek() {
                    Some('=') => {
                        self.pos += 1;
                        Ok(Some(GroupKind::LookBehind(false)))
                    }
                    Some('!') => {
                        self.pos += 1;
                        Ok(Some(GroupKind::LookBehind(true)))
                    }
                    _ => self.named_group(start).map(Some),
                }
            }
            Some('P') => {
                self.pos += 1;
                if !self.eat('<') {
                    return Err(
                        self.err(SyntaxErrorKind::InvalidNamedCapture, self.rest_from(start))
                    );
                }
                self.named_group(start).map(Some)
            }
            Some(c) if c == 'i' || c == 'm' || c == 's' || c == 'U' || c == '-' => {
                self.inline_flags(start)
            }
            _ => Err(self.err(SyntaxErrorKind::InvalidPerlOp, self.rest_from(start))),
        }
    }

    fn named_group(&mut self, start: usize) -> Result<GroupKind> {
        let mut name = String::new();
        loop {
            match self.next_char() {
                Some('>') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                _ => {
                    return Err(
                        self.err(SyntaxErrorKind::InvalidNamedCapture, self.rest_from(start))
                    )
                }
            }
        }
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.err(SyntaxErrorKind::InvalidNamedCapture, self.rest_from(start)));
        }
        if self.names.iter().any(|n| n == &name) {
            return Err(self.err(SyntaxErrorKind::DuplicateCaptureName, self.rest_from(start)));
        }
        self.names.push(name.clone());
        self.num_caps += 1;
        Ok(GroupKind::Capture(self.num_caps, Some(name)))
    }

    /// `(?ims-U)` or `(?ims-U:...)`: toggle options. The bare form
    /// mutates the enclosing scope and opens no group.
    fn inline_flags(&mut self, start: usize) -> Result<Option<GroupKind>> {
        let mut clearing = false;
        let mut options = self.options;
        loop {
            match self.next_char() {
                Some('i') => options.set(Options::FOLD_CASE, !clearing),
                Some('m') => options.set(Options::ONE_LINE, clearing),
                Some('s') => options.set(Options::DOT_NL, !clearing),
                Some('U') => options.set(Options::NON_GREEDY, !clearing),
                Some('-') => {
                    if clearing {
                        return Err(self.err(SyntaxErrorKind::InvalidPerlOp, self.rest_from(start)));
                    }
                    clearing = true;
                }
                Some(':') => {
                    self.options = options;
                    return Ok(Some(GroupKind::Plain));
                }
                Some(')') => {
                    self.options = options;
                    return Ok(None);
                }
                _ => return Err(self.err(SyntaxErrorKind::InvalidPerlOp, self.rest_from(start))),
            }
        }
    }

    fn close_group(&mut self) -> Result<()> {
        self.pos += 1; // consume ')'
        let Some(open) = self.groups.pop() else {
            return Err(self.err(SyntaxErrorKind::UnexpectedParen, self.pattern));
        };
        let body_span = (open.span_start, self.byte_pos());
        let body = self.collapse(body_span)?;
        // Drop the marker left on the stack by open_group.
        match self.stack.pop() {
            Some(marker) if marker.op == AstOp::PseudoLeftParen => {}
            _ => return Err(self.err(SyntaxErrorKind::Internal, self.pattern)),
        }
        self.options = open.saved_options;

        let node = match open.kind {
            GroupKind::Plain => body,
            GroupKind::Capture(cap, name) => {
                let mut node = AstNode::wrap(AstOp::Capture, body, self.options, body_span);
                node.cap = cap;
                node.name = name;
                node
            }
            GroupKind::LookAhead(negated) => {
                let mut node = AstNode::wrap(AstOp::LookAhead, body, self.options, body_span);
                node.negated = negated;
                node
            }
            GroupKind::LookBehind(negated) => {
                let mut node = AstNode::wrap(AstOp::LookBehind, body, self.options, body_span);
                node.negated = negated;
                node
            }
        };
        self.stack.push(node);
        Ok(())
    }

    /// Collapse the stack down to the nearest `(` marker (which is left
    /// in place) into the scope's `Alternate`-of-`Concat` node.
    fn collapse(&mut self, span: (usize, usize)) -> Result<AstNode> {
        let mut alternatives: Vec<Vec<AstNode>> = Vec::new();
        let mut current: Vec<AstNode> = Vec::new();
        loop {
            match self.stack.last() {
                Some(node) if node.op == AstOp::PseudoLeftParen => break,
                None => break,
                Some(node) if node.op == AstOp::PseudoVerticalBar => {
                    self.stack.pop();
                    current.reverse();
                    alternatives.push(std::mem::take(&mut current));
                }
                Some(_) => current.push(self.stack.pop().unwrap()),
            }
        }
        current.reverse();
        alternatives.push(current);
        alternatives.reverse();

        let mut alt = AstNode::new(AstOp::Alternate, self.options, span);
        for operands in alternatives {
            let seq_span = match (operands.first(), operands.last()) {
                (Some(first), Some(last)) => first.span_union(last),
                _ => span,
            };
            let mut seq = AstNode::new(AstOp::Concat, self.options, seq_span);
            seq.subs = operands;
            alt.subs.push(seq);
        }
        Ok(alt)
    }

    // === Repetition ===

    fn repeat_op(&mut self, c: char, start: usize) -> Result<()> {
        self.pos += 1;
        let (op, min, max) = match c {
            '*' => (AstOp::Star, 0, None),
            '+' => (AstOp::Plus, 1, None),
            _ => (AstOp::Quest, 0, Some(1)),
        };
        self.wrap_repeat(op, min, max, start)
    }

    fn repeat_bounds(&mut self, start: usize) -> Result<()> {
        // Scan ahead; a `{` that is not a well-formed repeat is an
        // ordinary literal.
        let Some((min, max, consumed)) = self.scan_bounds()? else {
            self.pos += 1;
            self.stack.push(AstNode::literal(
                vec!['{' as u32],
                self.options,
                (start, self.byte_pos()),
            ));
            return Ok(());
        };
        self.pos += consumed;
        self.wrap_repeat(AstOp::Repeat, min, max, start)
    }

    /// Returns `(min, max, chars consumed)` when a well-formed
    /// `{m}` / `{m,}` / `{m,n}` starts at the current position.
    fn scan_bounds(&mut self) -> Result<Option<(u32, Option<u32>, usize)>> {
        let mut ahead = 1; // past '{'
        let (min, used) = match self.scan_number(ahead) {
            Some(pair) => pair,
            None => return Ok(None),
        };
        ahead += used;
        let (max, shape_ok) = match self.peek_at(ahead) {
            Some('}') => (Some(min), true),
            Some(',') => {
                ahead += 1;
                match self.peek_at(ahead) {
                    Some('}') => (None, true),
                    _ => match self.scan_number(ahead) {
                        Some((n, used)) => {
                            ahead += used;
                            (Some(n), self.peek_at(ahead) == Some('}'))
                        }
                        None => (None, false),
                    },
                }
            }
            _ => (None, false),
        };
        if !shape_ok {
            return Ok(None);
        }
        ahead += 1; // past '}'
        let fragment_start = self.byte_pos();
        // Shape is valid; now validate the sizes. An overflowed bound
        // (more than 8 digits) scans as None from scan_number only when
        // the digits are absent; oversized values are caught here.
        if min > MAX_REPEAT || max.map_or(false, |m| m > MAX_REPEAT || m < min) {
            return Err(self.err(
                SyntaxErrorKind::InvalidRepeatSize,
                self.rest_from(fragment_start),
            ));
        }
        Ok(Some((min, max, ahead)))
    }

    /// Scan a repeat bound at `ahead` chars past the current position.
    /// A number with a leading zero does not scan (the brace falls back
    /// to a literal); more than 8 digits saturates and is rejected as
    /// an invalid size by the caller.
    fn scan_number(&self, mut ahead: usize) -> Option<(u32, usize)> {
        let mut digits = String::new();
        while let Some(c) = self.peek_at(ahead) {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            ahead += 1;
        }
        if digits.is_empty() {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        if digits.len() > 8 {
            return Some((u32::MAX, digits.len()));
        }
        let value: u32 = digits.parse().ok()?;
        Some((value, digits.len()))
    }

    fn wrap_repeat(
        &mut self,
        op: AstOp,
        min: u32,
        max: Option<u32>,
        start: usize,
    ) -> Result<()> {
        let operand = match self.stack.pop() {
            Some(node)
                if node.op != AstOp::PseudoLeftParen && node.op != AstOp::PseudoVerticalBar =>
            {
                node
            }
            other => {
                if let Some(node) = other {
                    self.stack.push(node);
                }
                return Err(self.err(
                    SyntaxErrorKind::MissingRepeatArgument,
                    self.rest_from(start),
                ));
            }
        };
        if matches!(
            operand.op,
            AstOp::Star | AstOp::Plus | AstOp::Quest | AstOp::Repeat
        ) {
            return Err(self.err(SyntaxErrorKind::InvalidRepeatOp, self.rest_from(operand.span.0)));
        }
        let span = (operand.span.0, self.byte_pos());
        let mut node = AstNode::wrap(op, operand, self.options, span);
        node.min = min;
        node.max = max;
        // A trailing `?` flips greediness, a trailing `+` makes the
        // repeat possessive; both are token options, not structure.
        let default_lazy = self.options.contains(Options::NON_GREEDY);
        if self.eat('?') {
            node.lazy = !default_lazy;
            node.span.1 = self.byte_pos();
        } else if self.options.contains(Options::PERL_X) && self.eat('+') {
            node.possessive = true;
            node.span.1 = self.byte_pos();
        } else {
            node.lazy = default_lazy;
        }
        self.stack.push(node);
        Ok(())
    }

    // === Character classes ===

    fn parse_class(&mut self, start: usize) -> Result<AstNode> {
        self.pos += 1; // consume '['
        let negated = self.eat('^');
        let mut set = RuneSet::new();
        let mut first = true;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.err(SyntaxErrorKind::MissingBracket, self.rest_from(start)));
            };
            match c {
                ']' if !first => {
                    self.pos += 1;
                    break;
                }
                '[' if self.peek_at(1) == Some(':') => {
                    self.posix_into(&mut set, start)?;
                }
                _ => {
                    let lo = self.class_atom(&mut set, start)?;
                    // A bare rune may open a range; a sub-class may not.
                    if let Some(lo) = lo {
                        if self.peek() == Some('-')
                            && self.peek_at(1) != Some(']')
                            && self.peek_at(1).is_some()
                        {
                            self.pos += 1; // consume '-'
                            let hi_start = self.byte_pos();
                            let mut hi_set = RuneSet::new();
                            let hi = self.class_atom(&mut hi_set, start)?;
                            let Some(hi) = hi else {
                                return Err(self.err(
                                    SyntaxErrorKind::InvalidCharRange,
                                    self.rest_from(hi_start),
                                ));
                            };
                            if hi < lo {
                                return Err(self.err(
                                    SyntaxErrorKind::InvalidCharRange,
                                    self.rest_from(start),
                                ));
                            }
                            set.add_range(lo, hi);
                        } else {
                            set.add_rune(lo);
                        }
                    }
                }
            }
            first = false;
        }
        if set.is_empty() && !negated {
            return Err(self.err(SyntaxErrorKind::InvalidCharClass, self.rest_from(start)));
        }
        if self.options.contains(Options::FOLD_CASE) {
            set.fold_case();
        }
        let span = (start, self.byte_pos());
        Ok(AstNode::char_class(set, negated, self.options, span))
    }

    /// One class member. Returns `Some(rune)` for a single rune (a
    /// possible range endpoint), or `None` after merging a sub-class
    /// (Perl shorthand or Unicode property) into `set`.
    fn class_atom(&mut self, set: &mut RuneSet, class_start: usize) -> Result<Option<u32>> {
        let c = self.next_char().expect("caller checked for end of input");
        if c != '\\' {
            return Ok(Some(c as u32));
        }
        let Some(esc) = self.next_char() else {
            return Err(self.err(
                SyntaxErrorKind::TrailingBackslash,
                self.rest_from(class_start),
            ));
        };
        match esc {
            'd' | 's' | 'w' => {
                set.union_with(&classes::perl_class(esc).expect("known class letter"));
                Ok(None)
            }
            'D' | 'S' | 'W' => {
                let mut sub = classes::perl_class(esc.to_ascii_lowercase())
                    .expect("known class letter");
                sub.negate();
                set.union_with(&sub);
                Ok(None)
            }
            'p' | 'P' => {
                let sub = self.unicode_class(esc == 'P', class_start)?;
                set.union_with(&sub);
                Ok(None)
            }
            _ => self.escape_rune(esc, class_start).map(Some),
        }
    }

    fn posix_into(&mut self, set: &mut RuneSet, class_start: usize) -> Result<()> {
        self.pos += 2; // consume '[:'
        let negated = self.eat('^');
        let mut name = String::new();
        loop {
            match self.next_char() {
                Some(':') if self.peek() == Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c.is_ascii_lowercase() => name.push(c),
                _ => {
                    return Err(self.err(
                        SyntaxErrorKind::InvalidPosixClass,
                        self.rest_from(class_start),
                    ))
                }
            }
        }
        let Some(mut sub) = classes::posix_class(&name) else {
            return Err(self.err(
                SyntaxErrorKind::InvalidPosixClass,
                self.rest_from(class_start),
            ));
        };
        if negated {
            sub.negate();
        }
        set.union_with(&sub);
        Ok(())
    }

    fn unicode_class(&mut self, negated: bool, start: usize) -> Result<RuneSet> {
        if !self.options.contains(Options::UNICODE_GROUPS) {
            return Err(self.err(SyntaxErrorKind::InvalidEscape, self.rest_from(start)));
        }
        let name = if self.eat('{') {
            let mut name = String::new();
            loop {
                match self.next_char() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => {
                        return Err(self.err(
                            SyntaxErrorKind::InvalidUnicodeProperty,
                            self.rest_from(start),
                        ))
                    }
                }
            }
            name
        } else {
            // Single-letter form such as `\pL`.
            match self.next_char() {
                Some(c) => c.to_string(),
                None => {
                    return Err(self.err(
                        SyntaxErrorKind::InvalidUnicodeProperty,
                        self.rest_from(start),
                    ))
                }
            }
        };
        let Some(mut set) = classes::unicode_property(&name) else {
            return Err(self.err(
                SyntaxErrorKind::InvalidUnicodeProperty,
                self.rest_from(start),
            ));
        };
        if negated {
            set.negate();
        }
        Ok(set)
    }

    // === Escapes ===

    fn parse_escape(&mut self, start: usize) -> Result<AstNode> {
        self.pos += 1; // consume '\'
        let Some(c) = self.peek() else {
            return Err(self.err(SyntaxErrorKind::TrailingBackslash, self.rest_from(start)));
        };
        let span_end = |p: &Parser| p.byte_pos();
        match c {
            '1'..='9' if self.backref_target(c).is_some() => {
                self.pos += 1;
                let group = self.backref_target(c).expect("checked above");
                let mut node =
                    AstNode::new(AstOp::BackRef, self.options, (start, span_end(self)));
                node.group = group;
                Ok(node)
            }
            'A' => {
                self.pos += 1;
                Ok(AstNode::new(
                    AstOp::BeginText,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'z' => {
                self.pos += 1;
                Ok(AstNode::new(
                    AstOp::EndText,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'b' => {
                self.pos += 1;
                Ok(AstNode::new(
                    AstOp::WordBoundary,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'B' => {
                self.pos += 1;
                Ok(AstNode::new(
                    AstOp::NoWordBoundary,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'd' | 's' | 'w' => {
                self.pos += 1;
                let set = classes::perl_class(c).expect("known class letter");
                Ok(AstNode::char_class(
                    set,
                    false,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'D' | 'S' | 'W' => {
                self.pos += 1;
                let set = classes::perl_class(c.to_ascii_lowercase())
                    .expect("known class letter");
                Ok(AstNode::char_class(
                    set,
                    true,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'p' | 'P' => {
                self.pos += 1;
                let set = self.unicode_class(c == 'P', start)?;
                Ok(AstNode::char_class(
                    set,
                    false,
                    self.options,
                    (start, span_end(self)),
                ))
            }
            'Q' => {
                self.pos += 1;
                self.literal_block(start)
            }
            _ => {
                self.pos += 1;
                let rune = self.escape_rune(c, start)?;
                Ok(AstNode::literal(
                    vec![rune],
                    self.options,
                    (start, span_end(self)),
                ))
            }
        }
    }

    /// `\1`..`\9` is a backreference only when that many groups exist.
    fn backref_target(&self, digit: char) -> Option<u32> {
        let group = digit as u32 - '0' as u32;
        (group <= self.num_caps).then_some(group)
    }

    /// `\Q...\E`: everything up to `\E` (or end of input) is literal.
    fn literal_block(&mut self, start: usize) -> Result<AstNode> {
        let mut runes = Vec::new();
        while let Some(c) = self.next_char() {
            if c == '\\' && self.peek() == Some('E') {
                self.pos += 1;
                break;
            }
            runes.push(c as u32);
        }
        let node = AstNode::literal(runes, self.options, (start, self.byte_pos()));
        Ok(node)
    }

    /// Resolve a single-rune escape. The leading `\` and `c` are
    /// already consumed.
    fn escape_rune(&mut self, c: char, start: usize) -> Result<u32> {
        match c {
            'a' => Ok(0x07),
            'f' => Ok(0x0C),
            'n' => Ok('\n' as u32),
            'r' => Ok('\r' as u32),
            't' => Ok('\t' as u32),
            'v' => Ok(0x0B),
            '0'..='7' => {
                // Octal: up to three digits, clamped to the rune range.
                let mut value = c as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ '0'..='7') => {
                            self.pos += 1;
                            value = value * 8 + (d as u32 - '0' as u32);
                        }
                        _ => break,
                    }
                }
                Ok(value.min(MAX_RUNE))
            }
            'x' => {
                if self.eat('{') {
                    let mut value: u32 = 0;
                    let mut any = false;
                    loop {
                        match self.next_char() {
                            Some('}') if any => break,
                            Some(d) if d.is_ascii_hexdigit() => {
                                any = true;
                                value = value
                                    .saturating_mul(16)
                                    .saturating_add(d.to_digit(16).expect("hex digit"));
                            }
                            _ => {
                                return Err(self.err(
                                    SyntaxErrorKind::InvalidEscape,
                                    self.rest_from(start),
                                ))
                            }
                        }
                    }
                    Ok(value.min(MAX_RUNE))
                } else {
                    let mut value = 0u32;
                    for _ in 0..2 {
                        match self.next_char() {
                            Some(d) if d.is_ascii_hexdigit() => {
                                value = value * 16 + d.to_digit(16).expect("hex digit");
                            }
                            _ => {
                                return Err(self.err(
                                    SyntaxErrorKind::InvalidEscape,
                                    self.rest_from(start),
                                ))
                            }
                        }
                    }
                    Ok(value)
                }
            }
            _ if c.is_ascii_punctuation() => Ok(c as u32),
            _ => Err(self.err(SyntaxErrorKind::InvalidEscape, self.rest_from(start))),
        }
    }
}
