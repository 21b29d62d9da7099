//! Per-measure complexity scoring from raw expression text.

use crate::extract::{measure_references, table_references};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Substrings whose presence marks an expression as iterating row-by-row.
const ITERATOR_FUNCTIONS: &[&str] = &[
    "SUMX",
    "AVERAGEX",
    "COUNTX",
    "FILTER",
    "ADDCOLUMNS",
    "SELECTCOLUMNS",
    "GENERATE",
];

/// The individual signals feeding a complexity score.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityFactors {
    /// Maximum parenthesis depth reached while scanning left to right. On
    /// malformed input the running counter may go negative; the maximum is a
    /// diagnostic signal, not a correctness gate.
    pub nesting_depth: i32,
    pub function_count: usize,
    pub table_references: usize,
    pub measure_references: usize,
    pub has_iterators: bool,
    pub has_context_transition: bool,
}

/// Complexity score and recommendation band for one measure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaxComplexity {
    pub measure_name: String,
    pub score: u32,
    pub factors: ComplexityFactors,
    pub recommendation: String,
}

fn max_nesting_depth(expression: &str) -> i32 {
    let mut depth: i32 = 0;
    let mut max = 0;
    for c in expression.chars() {
        match c {
            '(' => {
                depth += 1;
                max = max.max(depth);
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    max
}

fn function_count(expression: &str) -> usize {
    static FUNCTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = FUNCTION_RE.get_or_init(|| Regex::new(r"\b[A-Z][A-Z0-9_]*\(").expect("valid regex"));
    re.find_iter(expression).count()
}

/// Scores one measure's expression.
///
/// The score is a weighted sum of capped factor contributions:
/// `min(depth*10, 30) + min(functions*2, 20) + min(tables*5, 20) +
/// min(measures*3, 15) + 10 if iterators + 5 if CALCULATE`. It is never
/// clamped or renormalized afterwards.
pub fn analyze_complexity(measure_name: &str, expression: &str) -> DaxComplexity {
    let upper = expression.to_uppercase();
    let factors = ComplexityFactors {
        nesting_depth: max_nesting_depth(expression),
        function_count: function_count(expression),
        table_references: table_references(expression).len(),
        measure_references: measure_references(expression).len(),
        has_iterators: ITERATOR_FUNCTIONS.iter().any(|f| upper.contains(f)),
        has_context_transition: upper.contains("CALCULATE("),
    };

    let mut score = 0u32;
    score += (factors.nesting_depth.max(0) as u32 * 10).min(30);
    score += (factors.function_count as u32 * 2).min(20);
    score += (factors.table_references as u32 * 5).min(20);
    score += (factors.measure_references as u32 * 3).min(15);
    if factors.has_iterators {
        score += 10;
    }
    if factors.has_context_transition {
        score += 5;
    }

    let recommendation = if score < 30 {
        "Simple measure — easy to maintain"
    } else if score < 60 {
        "Moderate complexity — consider adding comments"
    } else if score < 80 {
        "Complex measure — strongly recommend documentation"
    } else {
        "Very complex — consider breaking into smaller measures"
    };

    DaxComplexity {
        measure_name: measure_name.to_string(),
        score,
        factors,
        recommendation: recommendation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_sum_scores_twelve() {
        let complexity = analyze_complexity("Total Sales", "SUM(Sales[Amount])");
        assert_eq!(complexity.factors.nesting_depth, 1);
        assert_eq!(complexity.factors.function_count, 1);
        assert_eq!(complexity.factors.table_references, 0);
        assert_eq!(complexity.factors.measure_references, 0);
        assert!(!complexity.factors.has_iterators);
        assert!(!complexity.factors.has_context_transition);
        assert_eq!(complexity.score, 12);
        assert_eq!(complexity.recommendation, "Simple measure — easy to maintain");
    }

    #[test]
    fn iterators_and_context_transition_add_flat_bonuses() {
        let complexity = analyze_complexity(
            "Filtered",
            "CALCULATE(SUMX(Sales, Sales[Qty] * Sales[Price]), FILTER(ALL(Sales), [Margin] > 0))",
        );
        assert!(complexity.factors.has_iterators);
        assert!(complexity.factors.has_context_transition);
        // depth 3 caps at 30; 4 functions -> 8; one table (`Sales[Qty]` after
        // whitespace) -> 5; one measure ([Margin]) -> 3.
        assert_eq!(complexity.score, 30 + 8 + 5 + 3 + 10 + 5);
    }

    #[test]
    fn empty_expression_degrades_to_zero() {
        let complexity = analyze_complexity("Empty", "");
        assert_eq!(complexity.score, 0);
        assert_eq!(complexity.factors.nesting_depth, 0);
        assert_eq!(complexity.recommendation, "Simple measure — easy to maintain");
    }

    #[test]
    fn unbalanced_parens_do_not_panic() {
        let complexity = analyze_complexity("Odd", ")))(");
        assert_eq!(complexity.factors.nesting_depth, 0);
    }
}
