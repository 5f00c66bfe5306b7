//! Text normalization and per-slot matchers
//!
//! Deterministic extraction for the slots the dialogue collects:
//! - `normalize` - canonicalization every matcher runs on
//! - `fuzzy` - normalized edit similarity with an explicit tie-break
//! - `matchers` - city, bedroom, category, consent, property type
//! - `budget` - spoken budget to a numeric (min, max) range in rupees
//! - `contact` - email and name extraction
//!
//! Matchers return `(Option<value>, confidence)` and are total: bad input
//! means a `None` with zero confidence, never an error.

pub mod budget;
pub mod contact;
pub mod fuzzy;
pub mod matchers;
pub mod normalize;

pub use budget::parse_budget;
pub use contact::{clean_name, extract_email};
pub use fuzzy::similarity;
pub use matchers::SlotMatcher;
pub use normalize::normalize;
