//! # Regraph
//!
//! A self-contained regular-expression engine that compiles patterns
//! into a directed automaton of character-set nodes and walks it with a
//! frontier-based engine. Backtracking-only features (backreferences,
//! lookaround) are supported by design, which is exactly why the crate
//! also ships a static catastrophic-backtracking detector to flag
//! patterns an attacker could exploit.
//!
//! ## Quick Start
//!
//! ```rust
//! use regraph::prelude::*;
//!
//! let re = Regex::new(r"(?P<year>\d{4})-(?P<month>\d{2})").unwrap();
//! let m = re.find("released 2026-08").unwrap();
//! assert_eq!(m.as_str(), "2026-08");
//! assert_eq!(m.group_named("year").unwrap().as_str(), "2026");
//! ```
//!
//! Screening a pattern before exposing it to untrusted input:
//!
//! ```rust
//! use regraph::prelude::*;
//!
//! let re = Regex::new(r"(\d+)+").unwrap();
//! let report = re.detect_catastrophic_backtracking();
//! assert_eq!(report.kind, CbtKind::NestedLoops);
//! ```
//!
//! For fine-grained control, use [`RegexBuilder`](api::RegexBuilder):
//!
//! ```rust
//! use regraph::prelude::*;
//!
//! let re = Regex::builder("hello")
//!     .case_insensitive(true)
//!     .build()
//!     .unwrap();
//! assert!(re.is_match("Hello World"));
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`parser`] | Pattern text to AST (stack-based scan) |
//! | [`ast`] | AST node and operation types |
//! | [`graph`] | AST to automaton: arena, composition, compaction |
//! | [`matcher`] | Frontier engine, match/capture types, replacement |
//! | [`indicators`] | Zero-width anchor and boundary flags |
//! | [`detector`] | Catastrophic-backtracking analysis |
//! | [`generator`] | Seeded random strings matching a pattern |
//! | [`classes`] | POSIX / Perl / Unicode class tables |
//! | [`runes`] | Code-point set algebra |
//! | [`options`] | Parse and match option flags |
//! | [`api`] | `Regex`, `RegexBuilder`, `Matches` |
//!
//! A compiled [`Regex`](api::Regex) is immutable and safe to share
//! across threads; every match attempt keeps its transient state
//! (backreference expansion) in a private overlay.

pub mod api;
pub mod ast;
pub mod classes;
pub mod detector;
pub mod error;
pub mod generator;
pub mod graph;
pub mod indicators;
pub mod matcher;
pub mod options;
pub mod parser;
pub mod prelude;
pub mod runes;
