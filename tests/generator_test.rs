// generator_test.rs - Round-trip and determinism properties of the
// random string generator.

use regraph::prelude::*;

// === round trip ===

#[test]
fn every_generated_string_matches() {
    let re = Regex::new("[ab]{4,6}c").unwrap();
    for sample in re.generator(1234).take(100) {
        assert!(re.is_fully_match(&sample), "sample {:?}", sample);
    }
}

#[test]
fn round_trip_across_pattern_shapes() {
    for pattern in [
        "abc",
        "a|bc|def",
        r"\d{2,4}",
        "x[0-9a-f]+y",
        "(ab|cd)*z",
        "a?b?c?d",
        r"(\w{3})-\1",
        "[^x]{3}",
    ] {
        let re = Regex::new(pattern).unwrap();
        for (i, sample) in re.generator(7).take(25).enumerate() {
            assert!(
                re.is_match(&sample) || sample.is_empty() && re.is_fully_match(""),
                "pattern {} sample {} = {:?}",
                pattern,
                i,
                sample
            );
        }
    }
}

#[test]
fn generated_strings_fully_match_anchored_shapes() {
    let re = Regex::new("^[a-d]{8}$").unwrap();
    for sample in re.generator(99).take(50) {
        assert!(re.is_fully_match(&sample));
        assert_eq!(sample.chars().count(), 8);
    }
}

// === determinism ===

#[test]
fn same_seed_identical_sequences() {
    let re = Regex::new(r"[ab]{4,6}c|\d+x").unwrap();
    let a: Vec<String> = re.generator(5).take(50).collect();
    let b: Vec<String> = re.generator(5).take(50).collect();
    assert_eq!(a, b);
}

#[test]
fn two_regex_instances_agree() {
    let first = Regex::new("[a-z]{10}").unwrap();
    let second = Regex::new("[a-z]{10}").unwrap();
    let a: Vec<String> = first.generator(21).take(10).collect();
    let b: Vec<String> = second.generator(21).take(10).collect();
    assert_eq!(a, b);
}

#[test]
fn single_sample_shortcut_agrees_with_iterator() {
    let re = Regex::new("[0-9]{4}").unwrap();
    let direct = re.generate_with_seed(3);
    let iterated = re.generator(3).next().unwrap();
    assert_eq!(direct, iterated);
}

// === structure ===

#[test]
fn backreference_samples_repeat_their_capture() {
    let re = Regex::new(r"(\d{2}):\1").unwrap();
    for sample in re.generator(17).take(20) {
        let (a, b) = sample.split_once(':').unwrap();
        assert_eq!(a, b);
        assert!(re.is_fully_match(&sample));
    }
}

#[test]
fn alternation_eventually_covers_branches() {
    let re = Regex::new("aa|bb").unwrap();
    let samples: Vec<String> = re.generator(2).take(64).collect();
    assert!(samples.iter().any(|s| s == "aa"));
    assert!(samples.iter().any(|s| s == "bb"));
}
