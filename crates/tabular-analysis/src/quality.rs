//! Per-measure anti-pattern checks.
//!
//! Unlike pattern detection these rules are independent: every applicable
//! rule fires, so one measure can collect several issues. Issues are data,
//! never errors; a clean measure simply yields an empty list.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tabular_model::Measure;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
}

/// One finding against a measure expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaxIssue {
    pub severity: IssueSeverity,
    pub message: String,
    pub suggestion: String,
}

impl DaxIssue {
    fn new(severity: IssueSeverity, message: &str, suggestion: &str) -> Self {
        DaxIssue {
            severity,
            message: message.to_string(),
            suggestion: suggestion.to_string(),
        }
    }
}

fn bracket_division_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\]\s*/\s*\[").expect("valid regex"))
}

fn nested_calculate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"CALCULATE\s*\([^)]*CALCULATE\s*\(").expect("valid regex"))
}

fn filter_all_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"FILTER\s*\(\s*ALL\s*\(").expect("valid regex"))
}

fn calculate_in_sumx_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"SUMX\s*\(.*CALCULATE\s*\(").expect("valid regex"))
}

fn division_in_if_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"IF\s*\(.*/").expect("valid regex"))
}

/// Runs every anti-pattern rule against one measure.
pub fn check_measure_quality(measure: &Measure) -> Vec<DaxIssue> {
    let expression = &measure.expression;
    let upper = expression.to_uppercase();
    let mut issues = Vec::new();

    if bracket_division_re().is_match(&upper) && !upper.contains("DIVIDE(") {
        issues.push(DaxIssue::new(
            IssueSeverity::Warning,
            "Direct division used instead of DIVIDE function",
            "Use DIVIDE(numerator, denominator) to handle division by zero gracefully",
        ));
    }

    if nested_calculate_re().is_match(&upper) {
        issues.push(DaxIssue::new(
            IssueSeverity::Warning,
            "Nested CALCULATE detected",
            "Consider flattening the filters into a single CALCULATE call",
        ));
    }

    if filter_all_re().is_match(&upper) {
        issues.push(DaxIssue::new(
            IssueSeverity::Info,
            "FILTER(ALL(...)) removes the existing filter context",
            "Verify that changing the filter context for the whole table is intended",
        ));
    }

    if calculate_in_sumx_re().is_match(&upper) {
        issues.push(DaxIssue::new(
            IssueSeverity::Warning,
            "CALCULATE inside SUMX forces a context transition on every row",
            "Review for performance cost; consider restructuring the iterator",
        ));
    }

    if division_in_if_re().is_match(&upper) && !upper.contains("BLANK(") {
        issues.push(DaxIssue::new(
            IssueSeverity::Info,
            "Division inside IF without BLANK() handling",
            "Consider returning BLANK() on empty results",
        ));
    }

    if expression.len() > 500 {
        issues.push(DaxIssue::new(
            IssueSeverity::Info,
            "Measure expression is very long",
            "Consider decomposing it into intermediate measures",
        ));
    }

    if measure.format_string.is_none()
        && (upper.contains("SUM") || upper.contains("AVERAGE") || upper.contains("DIVIDE"))
    {
        issues.push(DaxIssue::new(
            IssueSeverity::Info,
            "Numeric measure has no format string",
            "Add a formatString so values render consistently across visuals",
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(expression: &str) -> Measure {
        Measure::new("Test", expression)
    }

    fn messages(issues: &[DaxIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn direct_division_warns_but_divide_does_not() {
        let issues = check_measure_quality(&measure("[A]/[B]"));
        assert!(issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Warning
                && i.message.starts_with("Direct division used instead of DIVIDE")));

        let issues = check_measure_quality(&measure("DIVIDE([A],[B])"));
        assert!(!messages(&issues)
            .iter()
            .any(|m| m.starts_with("Direct division")));
    }

    #[test]
    fn multiple_rules_can_fire_on_one_measure() {
        let issues = check_measure_quality(&measure(
            "IF([Cost] > 0, [Sales]/[Cost], 0) + SUMX(Sales, CALCULATE([Margin]))",
        ));
        let messages = messages(&issues);
        assert!(messages.contains(&"Direct division used instead of DIVIDE function"));
        assert!(messages.contains(&"CALCULATE inside SUMX forces a context transition on every row"));
        assert!(messages.contains(&"Division inside IF without BLANK() handling"));
    }

    #[test]
    fn blank_handling_suppresses_the_division_info() {
        let issues = check_measure_quality(&measure(
            "IF([Cost] = 0, BLANK(), [Sales]/[Cost])",
        ));
        assert!(!messages(&issues)
            .iter()
            .any(|m| m.starts_with("Division inside IF")));
    }

    #[test]
    fn missing_format_string_on_numeric_measure_is_info_only() {
        let bare = check_measure_quality(&measure("SUM(Sales[Amount])"));
        assert!(messages(&bare).contains(&"Numeric measure has no format string"));

        let formatted = Measure {
            format_string: Some("#,0".into()),
            ..measure("SUM(Sales[Amount])")
        };
        assert!(check_measure_quality(&formatted).is_empty());
    }

    #[test]
    fn long_expressions_get_a_decomposition_hint() {
        let long = format!("SUM(Sales[Amount]) {}", "+ 0 ".repeat(200));
        let issues = check_measure_quality(&Measure {
            format_string: Some("#,0".into()),
            ..measure(&long)
        });
        assert_eq!(
            messages(&issues),
            vec!["Measure expression is very long"]
        );
    }

    #[test]
    fn clean_measure_yields_no_issues() {
        let clean = Measure {
            format_string: Some("0.0%".into()),
            ..measure("DIVIDE([Profit], [Sales])")
        };
        let issues = check_measure_quality(&clean);
        assert_eq!(issues, Vec::<DaxIssue>::new());
    }
}
