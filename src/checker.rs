//! Level Check Evaluation
//!
//! The outermost evaluation boundary: resolves the age bracket, normalizes the
//! time, ranks it, and turns every user-path failure into a `CheckError`.

use serde::{Deserialize, Serialize};

use crate::data::{GroupKey, LevelTable};
use crate::error::CheckError;
use crate::level_lookup::{find_level, next_level_gap, LevelGap};
use crate::utils::time_parsing::{format_time_input, parse_time_to_seconds};

pub const MAX_MINUTES: u32 = 59;
pub const MAX_SECONDS: u32 = 59;
pub const MAX_CENTISECONDS: u32 = 99;

/// One level check as submitted from the input form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCheckRequest {
    pub age: u32,
    pub gender: String,
    pub event: String,
    pub distance: String,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
    #[serde(default)]
    pub centiseconds: u32,
}

impl LevelCheckRequest {
    /// Time string in the "M:S.cc" form the time parser expects
    pub fn time_string(&self) -> String {
        format_time_input(self.minutes, self.seconds, self.centiseconds)
    }

    fn validate_time_fields(&self) -> Result<(), CheckError> {
        if self.minutes > MAX_MINUTES || self.seconds > MAX_SECONDS || self.centiseconds > MAX_CENTISECONDS {
            return Err(CheckError::InvalidTimeFormat(self.time_string()));
        }
        Ok(())
    }
}

/// Successful evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelReport {
    pub age_bracket: String,
    pub time_seconds: f64,
    pub level: u32,
    /// Absent when the swim is already faster than every threshold
    pub next_level: Option<LevelGap>,
}

impl LevelReport {
    /// User-facing result lines
    pub fn messages(&self) -> Vec<String> {
        let mut lines = vec![format!("あなたの級は {} 級です！", self.level)];
        if let Some(gap) = &self.next_level {
            lines.push(format!(
                "あと {:.2} 秒で {} 級に届きます！",
                gap.gap_seconds, gap.level
            ));
        }
        lines
    }
}

/// Runs level checks against an injected, immutable reference table
#[derive(Debug, Clone)]
pub struct LevelChecker {
    table: LevelTable,
}

impl LevelChecker {
    pub fn new(table: LevelTable) -> Self {
        LevelChecker { table }
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    /// Evaluate a form submission
    pub fn check(&self, request: &LevelCheckRequest) -> Result<LevelReport, CheckError> {
        request.validate_time_fields()?;
        self.check_time(
            request.age,
            &request.gender,
            &request.event,
            &request.distance,
            &request.time_string(),
        )
    }

    /// Evaluate with a free-form time string
    ///
    /// Order: bracket, time, level. The next-level gap is only looked up once a
    /// level has been found.
    pub fn check_time(
        &self,
        age: u32,
        gender: &str,
        event: &str,
        distance: &str,
        raw_time: &str,
    ) -> Result<LevelReport, CheckError> {
        let bracket = self
            .table
            .resolve_age_bracket(age)
            .ok_or(CheckError::InvalidAgeBracket { age })?;

        let time_seconds = parse_time_to_seconds(raw_time)?;

        let key = GroupKey::new(&bracket.label, gender, event, distance);
        let level = find_level(&self.table, &key, time_seconds).ok_or_else(|| {
            CheckError::NoMatchingLevel {
                age_bracket: key.age_bracket.clone(),
                gender: key.gender.clone(),
                event: key.event.clone(),
                distance: key.distance.clone(),
                time_seconds,
            }
        })?;
        let next_level = next_level_gap(&self.table, &key, time_seconds);

        tracing::debug!(
            "Level check: {:?} at {}s -> level {} (next: {:?})",
            key,
            time_seconds,
            level,
            next_level
        );

        Ok(LevelReport {
            age_bracket: bracket.label.clone(),
            time_seconds,
            level,
            next_level,
        })
    }
}
