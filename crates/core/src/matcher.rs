//! String matching for course short names and category id-numbers.
//!
//! A rule pattern is paired with a [`MatchType`]. [`matches`] answers the
//! question in memory; [`Predicate`] is the lowered form a store uses to
//! filter rows itself (prefix/suffix/substring/exact), including the SQL
//! `LIKE` rendering a relational backend would bind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// String-comparison mode used to resolve a rule pattern.
///
/// Stored values that are empty or unrecognised read as [`MatchType::Equals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchType {
    #[default]
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl MatchType {
    pub const ALL: [MatchType; 4] = [
        MatchType::Equals,
        MatchType::Contains,
        MatchType::StartsWith,
        MatchType::EndsWith,
    ];

    /// Stored key, as written to the rule record.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Equals => "equals",
            MatchType::Contains => "contains",
            MatchType::StartsWith => "startswith",
            MatchType::EndsWith => "endswith",
        }
    }

    /// Human-readable label used in rule logs.
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Equals => "equals",
            MatchType::Contains => "contains",
            MatchType::StartsWith => "starts with",
            MatchType::EndsWith => "ends with",
        }
    }

    /// Lenient parse for stored values: anything unknown becomes `Equals`.
    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" => Ok(MatchType::Equals),
            "contains" => Ok(MatchType::Contains),
            "startswith" | "starts-with" | "starts_with" => Ok(MatchType::StartsWith),
            "endswith" | "ends-with" | "ends_with" => Ok(MatchType::EndsWith),
            other => Err(format!("unknown match type: '{}'", other)),
        }
    }
}

impl From<String> for MatchType {
    fn from(s: String) -> Self {
        MatchType::from_stored(&s)
    }
}

impl From<MatchType> for String {
    fn from(m: MatchType) -> Self {
        m.as_str().to_string()
    }
}

/// In-memory check of `candidate` against `pattern` under `match_type`.
///
/// Comparison is literal and case-sensitive. An empty pattern only equals an
/// empty candidate; treating it as a wildcard is a caller decision.
pub fn matches(candidate: &str, pattern: &str, match_type: MatchType) -> bool {
    Predicate::new(pattern, match_type).test(candidate)
}

/// Store-level filter lowered from a `(pattern, match type)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every value.
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl Predicate {
    pub fn new(pattern: &str, match_type: MatchType) -> Self {
        let p = pattern.to_string();
        match match_type {
            MatchType::Equals => Predicate::Exact(p),
            MatchType::Contains => Predicate::Substring(p),
            MatchType::StartsWith => Predicate::Prefix(p),
            MatchType::EndsWith => Predicate::Suffix(p),
        }
    }

    /// Like [`Predicate::new`], but an empty (after trim) pattern matches everything.
    pub fn or_any(pattern: &str, match_type: MatchType) -> Self {
        if pattern.trim().is_empty() {
            Predicate::Any
        } else {
            Self::new(pattern, match_type)
        }
    }

    pub fn test(&self, value: &str) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Exact(p) => value == p,
            Predicate::Prefix(p) => value.starts_with(p.as_str()),
            Predicate::Suffix(p) => value.ends_with(p.as_str()),
            Predicate::Substring(p) => value.contains(p.as_str()),
        }
    }

    /// SQL rendering for `column`: the select fragment and its bound parameter.
    ///
    /// `Any` renders as an always-true fragment with no parameter.
    pub fn to_sql(&self, column: &str) -> (String, Option<String>) {
        match self {
            Predicate::Any => ("1 = 1".to_string(), None),
            Predicate::Exact(p) => (format!("{column} = ?"), Some(p.clone())),
            Predicate::Prefix(p) => (format!("{column} LIKE ?"), Some(format!("{p}%"))),
            Predicate::Suffix(p) => (format!("{column} LIKE ?"), Some(format!("%{p}"))),
            Predicate::Substring(p) => (format!("{column} LIKE ?"), Some(format!("%{p}%"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_types_against_intro101() {
        assert!(matches("intro101", "intro", MatchType::StartsWith));
        assert!(matches("intro101", "101", MatchType::EndsWith));
        assert!(matches("intro101", "ro10", MatchType::Contains));
        assert!(matches("intro101", "intro101", MatchType::Equals));

        assert!(!matches("intro101", "intro", MatchType::Equals));
        assert!(!matches("intro101", "101", MatchType::StartsWith));
        assert!(!matches("intro101", "intro", MatchType::EndsWith));
    }

    #[test]
    fn unrecognised_match_type_behaves_as_equals() {
        let m = MatchType::from_stored("fuzzy");
        assert_eq!(m, MatchType::Equals);
        assert!(matches("intro101", "intro101", m));
        assert!(!matches("intro101", "intro", m));
        assert_eq!(MatchType::from_stored(""), MatchType::Equals);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        assert_eq!("startswith".parse::<MatchType>(), Ok(MatchType::StartsWith));
        assert_eq!("Ends-With".parse::<MatchType>(), Ok(MatchType::EndsWith));
        assert!("regex".parse::<MatchType>().is_err());
    }

    #[test]
    fn empty_pattern_is_only_a_wildcard_via_or_any() {
        assert!(!matches("CS101", "", MatchType::Equals));
        assert!(Predicate::or_any("  ", MatchType::Equals).test("CS101"));
        assert_eq!(Predicate::or_any("CS", MatchType::StartsWith), Predicate::Prefix("CS".into()));
    }

    #[test]
    fn sql_rendering() {
        let (sql, param) = Predicate::new("CS", MatchType::StartsWith).to_sql("shortname");
        assert_eq!(sql, "shortname LIKE ?");
        assert_eq!(param.as_deref(), Some("CS%"));

        let (sql, param) = Predicate::new("A1", MatchType::Equals).to_sql("idnumber");
        assert_eq!(sql, "idnumber = ?");
        assert_eq!(param.as_deref(), Some("A1"));

        let (_, param) = Predicate::new("mid", MatchType::Contains).to_sql("idnumber");
        assert_eq!(param.as_deref(), Some("%mid%"));
    }

    #[test]
    fn serde_round_trips_stored_key() {
        let json = serde_json::to_string(&MatchType::StartsWith).unwrap();
        assert_eq!(json, "\"startswith\"");
        let legacy: MatchType = serde_json::from_str("\"LIKE\"").unwrap();
        assert_eq!(legacy, MatchType::Equals);
    }
}
