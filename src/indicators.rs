// indicators.rs - Zero-width indicator flags.
//
// Recomputed at every input position from the current and adjacent
// characters; indicator nodes advance without consuming input when
// their flag holds. Flags are position-based, so the same computation
// serves forward and backward walks.

use crate::classes::is_word_rune;
use crate::graph::IndicatorKind;

/// The indicator flags at one boundary between input positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicators {
    pub begin_text: bool,
    pub end_text: bool,
    pub begin_line: bool,
    pub end_line: bool,
    pub word_boundary: bool,
}

impl Indicators {
    /// Compute the flags at `pos` (a boundary in `0..=chars.len()`).
    pub fn at(chars: &[char], pos: usize) -> Indicators {
        let prev = pos.checked_sub(1).and_then(|p| chars.get(p)).copied();
        let cur = chars.get(pos).copied();
        let prev_word = prev.map_or(false, |c| is_word_rune(c as u32));
        let cur_word = cur.map_or(false, |c| is_word_rune(c as u32));
        Indicators {
            begin_text: pos == 0,
            end_text: pos == chars.len(),
            begin_line: pos == 0 || prev == Some('\n'),
            end_line: pos == chars.len() || cur == Some('\n'),
            word_boundary: prev_word != cur_word,
        }
    }

    /// Whether the given indicator kind holds here.
    pub fn holds(&self, kind: IndicatorKind) -> bool {
        match kind {
            IndicatorKind::BeginText => self.begin_text,
            IndicatorKind::EndText => self.end_text,
            IndicatorKind::BeginLine => self.begin_line,
            IndicatorKind::EndLine => self.end_line,
            IndicatorKind::WordBoundary => self.word_boundary,
            IndicatorKind::NoWordBoundary => !self.word_boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn text_boundaries() {
        let input = chars("ab");
        assert!(Indicators::at(&input, 0).begin_text);
        assert!(!Indicators::at(&input, 1).begin_text);
        assert!(Indicators::at(&input, 2).end_text);
        assert!(!Indicators::at(&input, 1).end_text);
    }

    #[test]
    fn line_boundaries_at_newlines() {
        let input = chars("a\nb");
        assert!(Indicators::at(&input, 0).begin_line);
        assert!(Indicators::at(&input, 2).begin_line); // after '\n'
        assert!(!Indicators::at(&input, 1).begin_line);
        assert!(Indicators::at(&input, 1).end_line); // before '\n'
        assert!(Indicators::at(&input, 3).end_line);
    }

    #[test]
    fn word_boundaries() {
        let input = chars("hi there");
        assert!(Indicators::at(&input, 0).word_boundary); // ^h
        assert!(!Indicators::at(&input, 1).word_boundary); // h|i
        assert!(Indicators::at(&input, 2).word_boundary); // i|
        assert!(Indicators::at(&input, 3).word_boundary); // |t
        assert!(Indicators::at(&input, 8).word_boundary); // e|$
    }

    #[test]
    fn empty_input_is_all_boundaries() {
        let input = chars("");
        let ind = Indicators::at(&input, 0);
        assert!(ind.begin_text && ind.end_text && ind.begin_line && ind.end_line);
        assert!(!ind.word_boundary);
        assert!(ind.holds(IndicatorKind::NoWordBoundary));
    }
}
