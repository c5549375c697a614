//! Swim Level Checker
//!
//! Classifies a masters swimmer's time into a level (級) for their age
//! bracket, gender, event and distance, and reports the gap to the next level.
//!
//! Layout:
//! - `utils/`: Time normalization and age-bracket resolution
//! - `data`: Reference table loading and group index
//! - `level_lookup`: Threshold ranking (achieved level, next-level gap)
//! - `checker`: Evaluation boundary mapping failures to user-facing errors
//! - `api_server`: JSON API (feature `api`)

pub mod utils;
pub mod error;
pub mod data;
pub mod level_lookup;
pub mod checker;

pub mod api_server;

// Re-export commonly used types
pub use utils::{convert_raw_time, format_time_input, parse_time_to_seconds, resolve_bracket, AgeBracket};
pub use error::CheckError;
pub use data::{GroupKey, LevelTable, ReferenceRecord};
pub use level_lookup::{find_level, next_level_gap, LevelGap};
pub use checker::{LevelCheckRequest, LevelChecker, LevelReport};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
