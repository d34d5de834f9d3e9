// prelude.rs - Convenient re-exports for the common API.
//
//! # Prelude
//!
//! ```
//! use regraph::prelude::*;
//!
//! let re = Regex::new(r"\d+").unwrap();
//! let m = re.find("answer: 42").unwrap();
//! assert_eq!(m.as_str(), "42");
//! ```

pub use crate::api::{Matches, Regex, RegexBuilder};
pub use crate::detector::{CbtKind, CbtReport};
pub use crate::error::{Error, Result, SyntaxErrorKind};
pub use crate::generator::StringGenerator;
pub use crate::matcher::{Capture, Group, Match};
pub use crate::options::Options;
