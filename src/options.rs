// options.rs - Parse and match option flags.
//
// One bitmask drives both the parser (syntax surface) and the engine
// (newline and case semantics). Composite presets mirror the classic
// POSIX / Perl flavors.

use bitflags::bitflags;

bitflags! {
    /// Option flags accepted by [`parse`](crate::parser::parse) and
    /// [`Regex`](crate::api::Regex) construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Options: u32 {
        /// Case-insensitive matching; character classes are folded at
        /// parse time, literals are expanded at build time.
        const FOLD_CASE = 1 << 0;
        /// Treat the whole pattern as a literal string.
        const LITERAL = 1 << 1;
        /// Allow character classes like `[^a]` and `[[:space:]]` to
        /// match newline.
        const CLASS_NL = 1 << 2;
        /// Allow `.` to match newline.
        const DOT_NL = 1 << 3;
        /// `^` and `$` only match at the beginning and end of text, not
        /// at line boundaries.
        const ONE_LINE = 1 << 4;
        /// Repetition operators are lazy by default (a trailing `?`
        /// makes them greedy instead).
        const NON_GREEDY = 1 << 5;
        /// Allow Perl extensions: `(?:...)`, inline flags, named groups,
        /// lookaround.
        const PERL_X = 1 << 6;
        /// Allow `\p{Name}` / `\P{Name}` Unicode property classes.
        const UNICODE_GROUPS = 1 << 7;
    }
}

impl Options {
    /// Both `CLASS_NL` and `DOT_NL`.
    pub const MATCH_NL: Options =
        Options::from_bits_truncate(Options::CLASS_NL.bits() | Options::DOT_NL.bits());

    /// Perl-flavored parsing: extensions, Unicode property classes,
    /// text-boundary anchors (use `(?m)` for line anchors).
    pub const PERL: Options = Options::from_bits_truncate(
        Options::CLASS_NL.bits()
            | Options::ONE_LINE.bits()
            | Options::PERL_X.bits()
            | Options::UNICODE_GROUPS.bits(),
    );

    /// POSIX-flavored parsing: no extensions, no flags.
    pub const POSIX: Options = Options::empty();
}

impl Default for Options {
    fn default() -> Self {
        Options::PERL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_compose() {
        assert!(Options::MATCH_NL.contains(Options::CLASS_NL));
        assert!(Options::MATCH_NL.contains(Options::DOT_NL));
        assert!(Options::PERL.contains(Options::PERL_X));
        assert!(Options::PERL.contains(Options::UNICODE_GROUPS));
        assert!(Options::PERL.contains(Options::ONE_LINE));
        assert!(Options::POSIX.is_empty());
    }

    #[test]
    fn default_is_perl() {
        assert_eq!(Options::default(), Options::PERL);
    }
}
