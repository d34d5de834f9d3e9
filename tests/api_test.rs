// api_test.rs - Integration tests for the match API.

use regraph::prelude::*;

// === Regex::new ===

#[test]
fn simple_pattern() {
    let re = Regex::new(r"\d+").unwrap();
    let m = re.find("abc 123 def").unwrap();
    assert_eq!(m.as_str(), "123");
}

#[test]
fn no_match_returns_none() {
    let re = Regex::new("xyz").unwrap();
    assert!(re.find("abc").is_none());
}

#[test]
fn empty_pattern_matches_empty() {
    let re = Regex::new("").unwrap();
    let m = re.find("hello").unwrap();
    assert_eq!(m.start(), 0);
    assert!(m.is_empty());
}

#[test]
fn invalid_pattern_syntax_error() {
    let err = Regex::new("(unclosed").unwrap_err();
    assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::MissingParen));
}

#[test]
fn unicode_property_pattern() {
    let re = Regex::new(r"\p{Hiragana}+").unwrap();
    let m = re.find("hello せかい world").unwrap();
    assert_eq!(m.as_str(), "せかい");
}

// === is_match / is_fully_match ===

#[test]
fn is_match_anywhere() {
    let re = Regex::new("world").unwrap();
    assert!(re.is_match("hello world"));
    assert!(!re.is_match("hello earth"));
}

#[test]
fn fully_match_concrete_scenarios() {
    let re = Regex::new("abcd").unwrap();
    assert!(re.is_fully_match("abcd"));
    assert!(!re.is_fully_match("bcda"));

    let re = Regex::new("1(0|1)*101").unwrap();
    assert!(re.is_fully_match("1101"));
    assert!(!re.is_fully_match(""));

    let re = Regex::new("a*").unwrap();
    assert!(re.is_fully_match(""));
    let re = Regex::new("a+").unwrap();
    assert!(!re.is_fully_match(""));

    let re = Regex::new("a{2,3}").unwrap();
    assert!(re.is_fully_match("aaa"));
    assert!(!re.is_fully_match("aaaa"));
}

#[test]
fn fully_match_agrees_with_find_over_whole_span() {
    for (pattern, input) in [("a+b", "aab"), (r"\w+", "word"), ("[0-9]{3}", "123")] {
        let re = Regex::new(pattern).unwrap();
        let m = re.find(input).unwrap();
        let spans_all = m.start() == 0 && m.end() == input.chars().count();
        assert_eq!(re.is_fully_match(input), spans_all, "pattern {}", pattern);
    }
}

// === find / captures ===

#[test]
fn find_offsets_are_char_indices() {
    let re = Regex::new("b+").unwrap();
    let m = re.find("aaabbbccc").unwrap();
    assert_eq!(m.start(), 3);
    assert_eq!(m.end(), 6);
    assert_eq!(m.as_str(), "bbb");
}

#[test]
fn capture_groups_by_index() {
    let re = Regex::new(r"(\d{4})-(\d{2})").unwrap();
    let m = re.find("date: 2026-08").unwrap();
    assert_eq!(m.group(1).unwrap().as_str(), "2026");
    assert_eq!(m.group(2).unwrap().as_str(), "08");
    assert!(m.group(3).is_none());
}

#[test]
fn named_capture_groups() {
    let re = Regex::new(r"(?P<first>\w+)\s+(?P<last>\w+)").unwrap();
    let m = re.find("John Doe").unwrap();
    assert_eq!(m.group_named("first").unwrap().as_str(), "John");
    assert_eq!(m.group_named("last").unwrap().as_str(), "Doe");
    assert!(m.group_named("middle").is_none());
}

#[test]
fn optional_group_omitted_when_unused() {
    let re = Regex::new("(a)(b)?c").unwrap();
    let m = re.find("ac").unwrap();
    assert!(m.group(1).is_some());
    assert!(m.group(2).is_none());
}

#[test]
fn capture_positions_and_text_agree() {
    let re = Regex::new(r"(\w+)").unwrap();
    let m = re.find("  hello  ").unwrap();
    let cap = m.group(1).unwrap().last().unwrap();
    assert_eq!(cap.start(), 2);
    assert_eq!(cap.end(), 7);
    assert_eq!(cap.as_str(), "hello");
}

// === anchors, boundaries, lookaround, backreferences ===

#[test]
fn text_anchors() {
    let re = Regex::new("^abc$").unwrap();
    assert!(re.is_match("abc"));
    assert!(!re.is_match("xabc"));
    assert!(!re.is_match("abcx"));
}

#[test]
fn multi_line_anchors() {
    let re = Regex::new("(?m)^b").unwrap();
    assert!(re.is_match("a\nb"));
    let re = Regex::new("^b").unwrap();
    assert!(!re.is_match("a\nb"));
}

#[test]
fn word_boundaries() {
    let re = Regex::new(r"\bword\b").unwrap();
    assert!(re.is_match("a word here"));
    assert!(!re.is_match("wordy"));
    let re = Regex::new(r"\Bord\B").unwrap();
    assert!(re.is_match("wordy"));
    assert!(!re.is_match("ord"));
}

#[test]
fn lookahead_and_lookbehind() {
    let re = Regex::new(r"\w+(?=;)").unwrap();
    assert_eq!(re.find("alpha; beta").unwrap().as_str(), "alpha");

    let re = Regex::new(r"(?<=#)\w+").unwrap();
    assert_eq!(re.find("tag #rust now").unwrap().as_str(), "rust");

    let re = Regex::new(r"ab(?!c)").unwrap();
    assert_eq!(re.find("abc abd").unwrap().start(), 4);
}

#[test]
fn backreference_round_trip() {
    let re = Regex::new(r"<(\w+)>.*</\1>").unwrap();
    assert!(re.is_match("<b>bold</b>"));
    assert!(!re.is_match("<b>bold</i>"));
}

// === matches / split / replace ===

#[test]
fn matches_skips_empty_and_resumes_after_each() {
    let re = Regex::new("[a-zA-Z]*").unwrap();
    let words: Vec<String> = re
        .matches("123abc456xyz888tmt")
        .map(|m| m.as_str().to_string())
        .collect();
    assert_eq!(words, vec!["abc", "xyz", "tmt"]);
}

#[test]
fn split_concrete_scenario() {
    let re = Regex::new("[a-zA-Z]*").unwrap();
    assert_eq!(re.split("123abc456xyz888tmt"), vec!["123", "456", "888"]);
}

#[test]
fn replace_all_concrete_scenario() {
    let re = Regex::new("[a-c]+").unwrap();
    assert_eq!(re.replace_all("abcbcdcdedef", "x"), "xdxdedef");
}

#[test]
fn replacement_does_not_rescan_inserted_text() {
    // For a non-self-matching replacement, re-matching the result must
    // not find anything inside what was inserted.
    let re = Regex::new("aa").unwrap();
    let replaced = re.replace_all("aaaa", "za");
    assert_eq!(replaced, "zaza");
    assert!(re.find(&replaced).is_none());

    let re = Regex::new("ab").unwrap();
    let replaced = re.replace_all("abab", "ba");
    assert_eq!(replaced, "baba");
    assert!(re.find(&replaced).map_or(true, |m| {
        // "baba" holds "ab" only across the two insertions, never
        // within one.
        m.start() == 1
    }));
}

#[test]
fn replace_expansion_language() {
    let re = Regex::new(r"(\w+)=(\w+)").unwrap();
    assert_eq!(re.replace_all("k=v", "$2=$1"), "v=k");
    assert_eq!(re.replace_all("k=v", "$$$&$$"), "$k=v$");
    assert_eq!(re.replace_all("k=v", "[$`|$']"), "[|]");
    let re = Regex::new(r"(?P<key>\w+):").unwrap();
    assert_eq!(re.replace_all("a: 1", "${key}="), "= 1");
}

#[test]
fn replace_with_evaluator_callback() {
    let re = Regex::new(r"[a-z]+").unwrap();
    let upper = re.replace_all_with("ab cd", |m| m.as_str().to_uppercase());
    assert_eq!(upper, "AB CD");
}

// === options ===

#[test]
fn fold_case_option() {
    let re = Regex::with_options("abc", Options::default() | Options::FOLD_CASE).unwrap();
    assert!(re.is_match("xAbCy"));
}

#[test]
fn dot_nl_option() {
    let re = Regex::new("a.b").unwrap();
    assert!(!re.is_match("a\nb"));
    let re = Regex::with_options("a.b", Options::default() | Options::DOT_NL).unwrap();
    assert!(re.is_match("a\nb"));
}

#[test]
fn inline_flag_groups() {
    let re = Regex::new("(?i:abc)d").unwrap();
    assert!(re.is_match("ABCd"));
    assert!(!re.is_match("ABCD"));
}

#[test]
fn posix_preset_has_no_perl_extensions() {
    assert!(Regex::with_options("(?:a)", Options::POSIX).is_err());
}

// === region arguments ===

#[test]
fn out_of_range_region_is_an_error() {
    let re = Regex::new("a").unwrap();
    assert!(re.find_at("abc", 1, 2).is_ok());
    assert!(re.find_at("abc", 3, 1).is_err());
    assert!(re.find_at("abc", 9, 0).is_err());
}

#[test]
fn region_constrains_search() {
    let re = Regex::new(r"\d").unwrap();
    let m = re.find_at("1a2b3", 1, 3).unwrap().unwrap();
    assert_eq!(m.start(), 2);
    assert!(re.find_at("1a2b3", 1, 1).unwrap().is_none());
}

// === non-ASCII input ===

#[test]
fn char_indexing_over_multibyte_input() {
    let re = Regex::new("b+").unwrap();
    let m = re.find("ééébbb").unwrap();
    assert_eq!(m.start(), 3);
    assert_eq!(m.end(), 6);
    assert_eq!(m.as_str(), "bbb");
}

#[test]
fn classes_match_multibyte_members() {
    let re = Regex::new("[é-ë]+").unwrap();
    assert_eq!(re.find("xéêëy").unwrap().as_str(), "éêë");
}
