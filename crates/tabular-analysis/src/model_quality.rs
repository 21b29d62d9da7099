//! Model-wide quality assessment: naming conventions, relationship hygiene,
//! and the aggregated score with recommendations.

use crate::dependencies::{build_dependency_graph, find_unused_measures};
use serde::Serialize;
use tabular_model::{CrossFilterDirection, Relationship, Table};

/// Which kind of model object a naming issue is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ObjectType {
    Table,
    Measure,
    Column,
}

/// A naming-convention violation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingIssue {
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub object: String,
    pub issue: String,
    pub suggestion: String,
}

/// Counts and sub-scores feeding the overall model score.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub measures_without_descriptions: usize,
    pub measures_without_display_folders: usize,
    pub hierarchy_count: usize,
    /// Tracked for contract completeness; no input path populates calculation
    /// groups, so this stays 0 and its score bonus is dormant.
    pub calculation_group_count: usize,
    pub unused_measure_count: usize,
    pub naming_consistency_score: u32,
    pub relationship_quality_score: u32,
}

/// The aggregated assessment for one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelQuality {
    pub overall_score: u32,
    pub metrics: QualityMetrics,
    pub recommendations: Vec<String>,
}

/// Naming predicate for tables and columns: leading uppercase, no `_`/`-`
/// affixes, and not all-uppercase unless short enough to be an acronym.
fn table_or_column_name_ok(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    if name.starts_with(['_', '-']) || name.ends_with(['_', '-']) {
        return false;
    }
    // Acronym allowance: all-caps is fine up to 4 characters (DATE, KPI).
    if name.chars().count() > 4
        && name.chars().any(|c| c.is_alphabetic())
        && !name.chars().any(|c| c.is_lowercase())
    {
        return false;
    }
    true
}

/// Naming predicate for measures: leading uppercase and no underscores.
fn measure_name_ok(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    first.is_uppercase() && !name.contains('_')
}

/// Reports every object whose name fails its naming predicate.
pub fn check_naming_conventions(tables: &[Table]) -> Vec<NamingIssue> {
    let mut issues = Vec::new();
    for table in tables {
        if !table_or_column_name_ok(&table.name) {
            issues.push(NamingIssue {
                object_type: ObjectType::Table,
                object: table.name.clone(),
                issue: "Table name does not follow naming conventions".to_string(),
                suggestion: "Start with an uppercase letter and avoid underscore/dash prefixes, suffixes, and all-caps names".to_string(),
            });
        }
        for measure in &table.measures {
            if !measure_name_ok(&measure.name) {
                issues.push(NamingIssue {
                    object_type: ObjectType::Measure,
                    object: format!("{}[{}]", table.name, measure.name),
                    issue: "Measure name does not follow naming conventions".to_string(),
                    suggestion: "Start with an uppercase letter and use spaces instead of underscores".to_string(),
                });
            }
        }
        for column in &table.columns {
            if !table_or_column_name_ok(&column.name) {
                issues.push(NamingIssue {
                    object_type: ObjectType::Column,
                    object: format!("{}[{}]", table.name, column.name),
                    issue: "Column name does not follow naming conventions".to_string(),
                    suggestion: "Start with an uppercase letter and avoid underscore/dash prefixes, suffixes, and all-caps names".to_string(),
                });
            }
        }
    }
    issues
}

fn naming_consistency_score(tables: &[Table]) -> u32 {
    let mut total = 0usize;
    let mut consistent = 0usize;
    for table in tables {
        total += 1;
        if table_or_column_name_ok(&table.name) {
            consistent += 1;
        }
        for measure in &table.measures {
            total += 1;
            if measure_name_ok(&measure.name) {
                consistent += 1;
            }
        }
        for column in &table.columns {
            total += 1;
            if table_or_column_name_ok(&column.name) {
                consistent += 1;
            }
        }
    }
    if total == 0 {
        return 100;
    }
    (100.0 * consistent as f64 / total as f64).round() as u32
}

/// Scores relationship hygiene. A model with no relationships scores 100.
///
/// Each relationship accrues issue-points: 1 for missing cardinality on
/// either end, 1 for a missing cross-filter direction, 0.5 for bidirectional
/// filtering, 0.5 for a missing name. The deduction is proportional to the
/// points per relationship and capped at 50.
fn relationship_quality_score(relationships: &[Relationship]) -> u32 {
    if relationships.is_empty() {
        return 100;
    }
    let mut points = 0.0f64;
    for rel in relationships {
        if rel.from_cardinality.is_none() || rel.to_cardinality.is_none() {
            points += 1.0;
        }
        if rel.cross_filter_direction.is_none() {
            points += 1.0;
        }
        if rel.cross_filter_direction == Some(CrossFilterDirection::BothDirections) {
            points += 0.5;
        }
        if rel.name.is_none() {
            points += 0.5;
        }
    }
    let deduction = (points / (relationships.len() as f64 * 2.0) * 50.0).min(50.0);
    (100.0 - deduction).round() as u32
}

fn is_missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Aggregates the whole snapshot into an overall score and recommendations.
pub fn assess_model_quality(tables: &[Table], relationships: &[Relationship]) -> ModelQuality {
    let graph = build_dependency_graph(tables);
    let unused_measure_count = find_unused_measures(&graph).len();

    let all_measures = || tables.iter().flat_map(|t| t.measures.iter());
    let measures_without_descriptions = all_measures()
        .filter(|m| is_missing(&m.description))
        .count();
    let measures_without_display_folders = all_measures()
        .filter(|m| is_missing(&m.display_folder))
        .count();
    let hierarchy_count = tables
        .iter()
        .filter_map(|t| t.hierarchies.as_ref())
        .map(Vec::len)
        .sum();
    // Never populated from any input path; see QualityMetrics.
    let calculation_group_count = 0usize;

    let metrics = QualityMetrics {
        measures_without_descriptions,
        measures_without_display_folders,
        hierarchy_count,
        calculation_group_count,
        unused_measure_count,
        naming_consistency_score: naming_consistency_score(tables),
        relationship_quality_score: relationship_quality_score(relationships),
    };

    let mut score = 100.0f64;
    score -= (measures_without_descriptions as f64 * 2.0).min(30.0);
    score -= (measures_without_display_folders as f64).min(20.0);
    score -= (unused_measure_count as f64 * 3.0).min(20.0);
    score = score * 0.7 + metrics.naming_consistency_score as f64 * 0.15;
    score = score * 0.85 + metrics.relationship_quality_score as f64 * 0.15;
    score += (hierarchy_count as f64 * 2.0).min(10.0);
    score += (calculation_group_count as f64 * 5.0).min(10.0);
    let overall_score = score.clamp(0.0, 100.0).round() as u32;

    let mut recommendations = Vec::new();
    if measures_without_descriptions > 0 {
        recommendations.push(format!(
            "Add descriptions to {} measures to improve model documentation",
            measures_without_descriptions
        ));
    }
    if measures_without_display_folders > 5 {
        recommendations
            .push("Organize measures into display folders for better navigation".to_string());
    }
    if unused_measure_count > 0 {
        recommendations.push(format!(
            "Review {} unused measures - consider removing them or documenting why they exist",
            unused_measure_count
        ));
    }
    if metrics.naming_consistency_score < 70 {
        recommendations
            .push("Improve naming consistency across tables, columns, and measures".to_string());
    }
    if metrics.relationship_quality_score < 70 {
        recommendations.push(
            "Review relationship configurations - some are missing cardinality or cross-filter settings"
                .to_string(),
        );
    }
    if hierarchy_count == 0 {
        recommendations
            .push("Consider adding hierarchies for better drill-down experiences".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Model follows best practices - no major issues found".to_string());
    }

    ModelQuality {
        overall_score,
        metrics,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabular_model::Cardinality;

    #[test]
    fn naming_predicate_examples() {
        assert!(!table_or_column_name_ok("tbl_Sales"));
        assert!(table_or_column_name_ok("SalesOrders"));
        assert!(table_or_column_name_ok("Sales Orders"));
        assert!(table_or_column_name_ok("DATE"));
        assert!(!table_or_column_name_ok("SALESDATA"));
        assert!(!table_or_column_name_ok("_Staging"));
        assert!(!table_or_column_name_ok("Staging-"));
        assert!(!table_or_column_name_ok(""));

        assert!(measure_name_ok("Total Sales"));
        assert!(!measure_name_ok("total_sales"));
        assert!(!measure_name_ok("Total_Sales"));
    }

    #[test]
    fn empty_model_scores_one_hundred_on_naming() {
        assert_eq!(naming_consistency_score(&[]), 100);
    }

    #[test]
    fn no_relationships_always_scores_one_hundred() {
        assert_eq!(relationship_quality_score(&[]), 100);
    }

    #[test]
    fn fully_specified_relationship_scores_one_hundred() {
        let rel = Relationship {
            from_cardinality: Some(Cardinality::Many),
            to_cardinality: Some(Cardinality::One),
            cross_filter_direction: Some(CrossFilterDirection::OneDirection),
            name: Some("Sales_Date".into()),
        };
        assert_eq!(relationship_quality_score(&[rel]), 100);
    }

    #[test]
    fn bare_relationship_deduction_caps_at_fifty() {
        // 1 (cardinality) + 1 (direction) + 0.5 (name) = 2.5 points;
        // 2.5 / 2 * 50 = 62.5, capped at 50.
        assert_eq!(relationship_quality_score(&[Relationship::default()]), 50);
    }

    #[test]
    fn bidirectional_filtering_costs_half_a_point() {
        let rel = Relationship {
            from_cardinality: Some(Cardinality::Many),
            to_cardinality: Some(Cardinality::One),
            cross_filter_direction: Some(CrossFilterDirection::BothDirections),
            name: Some("Sales_Date".into()),
        };
        // 0.5 / 2 * 50 = 12.5, rounded to 88.
        assert_eq!(relationship_quality_score(&[rel]), 88);
    }
}
