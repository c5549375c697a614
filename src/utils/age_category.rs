//! Age Bracket Resolution
//!
//! Reference rows are segmented by inclusive age brackets labelled
//! "start～end" (e.g. "25～29"). Source data mixes the full-width tilde
//! (U+FF5E) with the wave dash (U+301C); both are accepted.

use serde::Serialize;

/// Canonical bracket separator (full-width tilde)
pub const BRACKET_SEPARATOR: char = '～';

/// Alternate separator found in source labels (wave dash)
pub const ALT_BRACKET_SEPARATOR: char = '〜';

/// Inclusive integer age range, keeping the label exactly as it appears in the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBracket {
    pub label: String,
    pub start: u32,
    pub end: u32,
}

impl AgeBracket {
    /// Parse a bracket label, returning `None` when it does not follow "start～end"
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.replace(ALT_BRACKET_SEPARATOR, &BRACKET_SEPARATOR.to_string());
        let (start, end) = normalized.split_once(BRACKET_SEPARATOR)?;
        let start: u32 = start.trim().parse().ok()?;
        let end: u32 = end.trim().parse().ok()?;

        Some(AgeBracket {
            label: label.to_string(),
            start,
            end,
        })
    }

    pub fn contains(&self, age: u32) -> bool {
        self.start <= age && age <= self.end
    }
}

/// Parse and order labels by (start, end), dropping unparsable ones
pub fn parse_brackets<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<AgeBracket> {
    let mut brackets: Vec<AgeBracket> = labels.into_iter().filter_map(AgeBracket::parse).collect();
    brackets.sort_by(|a, b| (a.start, a.end, &a.label).cmp(&(b.start, b.end, &b.label)));
    brackets.dedup_by(|a, b| a.label == b.label);
    brackets
}

/// First bracket in an ordered slice that contains `age`
pub fn find_bracket(brackets: &[AgeBracket], age: u32) -> Option<&AgeBracket> {
    brackets.iter().find(|bracket| bracket.contains(age))
}

/// Resolve an age to its bracket label
///
/// Brackets are tried in ascending order of start age so overlapping labels
/// resolve deterministically. Returns `None` when no bracket contains the age.
pub fn resolve_bracket<'a>(age: u32, labels: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut candidates: Vec<(AgeBracket, &'a str)> = labels
        .into_iter()
        .filter_map(|label| AgeBracket::parse(label).map(|bracket| (bracket, label)))
        .collect();
    candidates.sort_by_key(|(bracket, _)| (bracket.start, bracket.end));

    candidates
        .into_iter()
        .find(|(bracket, _)| bracket.contains(age))
        .map(|(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 3] = ["18～24", "25～29", "30～34"];

    #[test]
    fn test_resolve_bracket() {
        assert_eq!(resolve_bracket(27, LABELS), Some("25～29"));
        assert_eq!(resolve_bracket(18, LABELS), Some("18～24"));
        assert_eq!(resolve_bracket(24, LABELS), Some("18～24"));
        assert_eq!(resolve_bracket(34, LABELS), Some("30～34"));
    }

    #[test]
    fn test_resolve_bracket_not_found() {
        assert_eq!(resolve_bracket(17, LABELS), None);
        assert_eq!(resolve_bracket(35, LABELS), None);
        assert_eq!(resolve_bracket(30, std::iter::empty::<&str>()), None);
    }

    #[test]
    fn test_wave_dash_separator() {
        let labels = ["18～24", "25〜29"];
        assert_eq!(resolve_bracket(26, labels), Some("25〜29"));

        let bracket = AgeBracket::parse("35〜39").unwrap();
        assert_eq!(bracket.label, "35〜39");
        assert_eq!((bracket.start, bracket.end), (35, 39));
    }

    #[test]
    fn test_overlap_prefers_lowest_start() {
        // Input order must not matter
        let labels = ["25～34", "20～29"];
        assert_eq!(resolve_bracket(27, labels), Some("20～29"));
    }

    #[test]
    fn test_malformed_labels_skipped() {
        assert_eq!(AgeBracket::parse("25-29"), None);
        assert_eq!(AgeBracket::parse("25～"), None);
        assert_eq!(AgeBracket::parse("abc"), None);
        assert_eq!(resolve_bracket(27, ["25-29", "25～29"]), Some("25～29"));
    }

    #[test]
    fn test_parse_brackets_ordering() {
        let brackets = parse_brackets(["30～34", "18～24", "bad", "25～29", "18～24"]);
        let labels: Vec<&str> = brackets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["18～24", "25～29", "30～34"]);
        assert_eq!(find_bracket(&brackets, 31).map(|b| b.label.as_str()), Some("30～34"));
        assert!(find_bracket(&brackets, 90).is_none());
    }
}
