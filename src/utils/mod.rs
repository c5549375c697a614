//! Utility modules for level checking
//!
//! Contains the two input normalizers used ahead of the lookup:
//! - Time parsing: user and reference-table time strings to canonical seconds
//! - Age category: raw age to age-bracket label

pub mod age_category;
pub mod time_parsing;

// Re-export commonly used items
pub use age_category::{resolve_bracket, AgeBracket};
pub use time_parsing::{convert_raw_time, format_time_input, parse_time_to_seconds};
