//! User-path errors
//!
//! Every failure a swimmer can trigger from the input form ends up here.
//! Table-loading failures are not part of this type: they are fatal at
//! startup and travel as `anyhow::Error`.

use thiserror::Error;

/// Errors raised while evaluating a single level check
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// Age does not fall into any bracket of the reference table
    #[error("no age bracket contains age {age}")]
    InvalidAgeBracket { age: u32 },

    /// Time string matches neither accepted grammar, or a time field is out of range
    #[error("invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    /// Group is empty or the time beats no threshold
    #[error("no level found for {age_bracket} / {gender} / {event} / {distance}m at {time_seconds}s")]
    NoMatchingLevel {
        age_bracket: String,
        gender: String,
        event: String,
        distance: String,
        time_seconds: f64,
    },
}

impl CheckError {
    /// Stable machine-readable identifier (used in API error bodies)
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::InvalidAgeBracket { .. } => "invalid_age_bracket",
            CheckError::InvalidTimeFormat(_) => "invalid_time_format",
            CheckError::NoMatchingLevel { .. } => "no_matching_level",
        }
    }

    /// Message shown to the swimmer
    ///
    /// Time-format problems are reported generically.
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckError::InvalidAgeBracket { .. } => "該当する年齢カテゴリが見つかりませんでした。",
            CheckError::InvalidTimeFormat(_) => "エラーが発生しました。タイムの形式を確認してください。",
            CheckError::NoMatchingLevel { .. } => "該当する級が見つかりませんでした。",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_user_messages() {
        let bracket = CheckError::InvalidAgeBracket { age: 17 };
        let level = CheckError::NoMatchingLevel {
            age_bracket: "25～29".to_string(),
            gender: "男性".to_string(),
            event: "自由形".to_string(),
            distance: "50".to_string(),
            time_seconds: 20.0,
        };
        let time = CheckError::InvalidTimeFormat("abc".to_string());

        assert_ne!(bracket.user_message(), level.user_message());
        assert_ne!(bracket.user_message(), time.user_message());
        assert_ne!(level.user_message(), time.user_message());
    }

    #[test]
    fn test_kind_and_display() {
        let err = CheckError::InvalidAgeBracket { age: 17 };
        assert_eq!(err.kind(), "invalid_age_bracket");
        assert_eq!(err.to_string(), "no age bracket contains age 17");

        let err = CheckError::InvalidTimeFormat("1:2:3".to_string());
        assert_eq!(err.kind(), "invalid_time_format");
        assert!(err.to_string().contains("1:2:3"));
    }
}
