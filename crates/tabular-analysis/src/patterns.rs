//! Classification of measure expressions into known DAX idioms.
//!
//! Ordered first-match rules over the trimmed, upper-cased expression text.
//! Confidences are fixed per rule, never computed from the data.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// The idiom an expression was classified as.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaxPattern {
    #[serde(rename = "type")]
    pub pattern_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub confidence: f64,
    pub description: String,
}

impl DaxPattern {
    fn new(pattern_type: &str, subtype: Option<&str>, confidence: f64, description: &str) -> Self {
        DaxPattern {
            pattern_type: pattern_type.to_string(),
            subtype: subtype.map(str::to_string),
            confidence,
            description: description.to_string(),
        }
    }
}

/// Classifies one expression. Total: anything unrecognized comes back as
/// `unknown` with confidence 0.5.
pub fn detect_pattern(expression: &str) -> DaxPattern {
    static BRACKET_DIVISION_RE: OnceLock<Regex> = OnceLock::new();
    let bracket_division =
        BRACKET_DIVISION_RE.get_or_init(|| Regex::new(r"\]\s*/\s*\[").expect("valid regex"));

    let upper = expression.trim().to_uppercase();

    if upper.contains("DATESYTD") || upper.contains("TOTALYTD") {
        return DaxPattern::new(
            "time_intelligence",
            Some("ytd"),
            0.9,
            "Year-to-date calculation",
        );
    }
    if upper.contains("SAMEPERIODLASTYEAR") || upper.contains("DATEADD") {
        return DaxPattern::new(
            "time_intelligence",
            Some("yoy"),
            0.9,
            "Year-over-year comparison",
        );
    }
    if upper.starts_with("SUM(") {
        return DaxPattern::new("aggregation", Some("sum"), 1.0, "Simple sum aggregation");
    }
    if upper.starts_with("SUMX(") {
        return DaxPattern::new(
            "aggregation",
            Some("iterator_sum"),
            1.0,
            "Row-by-row sum over a table expression",
        );
    }
    if upper.contains("DIVIDE(") {
        return DaxPattern::new(
            "ratio",
            Some("safe_division"),
            0.8,
            "Division using the DIVIDE function",
        );
    }
    if bracket_division.is_match(&upper) {
        return DaxPattern::new("ratio", Some("division"), 0.7, "Direct division of measures");
    }
    if upper.contains("SWITCH(") {
        return DaxPattern::new("conditional", Some("switch"), 0.9, "SWITCH-based branching");
    }
    if upper.contains("IF(") {
        return DaxPattern::new("conditional", Some("if"), 0.9, "IF-based branching");
    }
    if upper.contains("FORMAT(") || upper.contains("CONCATENATE(") {
        return DaxPattern::new("text", Some("formatting"), 0.9, "Text formatting");
    }

    DaxPattern::new("unknown", None, 0.5, "Pattern not recognized")
}
