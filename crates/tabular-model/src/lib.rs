//! In-memory snapshot of a tabular semantic model.
//!
//! These are the input types the analysis engine consumes: tables with their
//! measures, columns and hierarchies, plus model-level relationships. Loading
//! them from TMDL or PBIP-style JSON on disk is the job of an external
//! collaborator; this crate is pure data. Field names serialize in camelCase
//! (`displayFolder`, `formatString`, `sourceColumn`, ...) so a snapshot can be
//! hydrated straight from the on-disk JSON shape.
//!
//! A snapshot is treated as effectively immutable for the duration of an
//! analysis call. Nothing here validates cross-object consistency (duplicate
//! names, dangling references); the analysis layer copes with whatever it is
//! handed.

use serde::{Deserialize, Serialize};

/// A table in the semantic model, owning its measures and columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchies: Option<Vec<Hierarchy>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            ..Table::default()
        }
    }
}

/// A named, reusable calculated expression attached to a table.
///
/// The expression is raw DAX text; it is never parsed into an AST here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub name: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_string: Option<String>,
}

impl Measure {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Measure {
            name: name.into(),
            expression: expression.into(),
            ..Measure::default()
        }
    }
}

/// A column on a table. `source_column` is set when the column mirrors a
/// physical source field rather than being calculated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            source_column: None,
        }
    }
}

/// A drill-down hierarchy. Levels are informational; the analysis layer only
/// counts hierarchies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub name: String,
    #[serde(default)]
    pub levels: Vec<String>,
}

/// Endpoint cardinality of a relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    One,
    Many,
}

/// Which side(s) of a relationship propagate filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossFilterDirection {
    OneDirection,
    BothDirections,
}

/// A relationship between two tables. Every field is optional on input:
/// TMDL files routinely omit metadata, and the quality scoring treats each
/// omission as an issue rather than an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_filter_direction: Option<CrossFilterDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn measure_deserializes_from_camel_case_json() {
        let json = r##"{
            "name": "Total Sales",
            "expression": "SUM(Sales[Amount])",
            "displayFolder": "KPIs",
            "formatString": "#,0"
        }"##;
        let measure: Measure = serde_json::from_str(json).unwrap();
        assert_eq!(measure.name, "Total Sales");
        assert_eq!(measure.display_folder.as_deref(), Some("KPIs"));
        assert_eq!(measure.format_string.as_deref(), Some("#,0"));
        assert_eq!(measure.description, None);
    }

    #[test]
    fn table_tolerates_missing_collections() {
        let table: Table = serde_json::from_str(r#"{"name": "Sales"}"#).unwrap();
        assert!(table.measures.is_empty());
        assert!(table.columns.is_empty());
        assert!(table.hierarchies.is_none());
    }

    #[test]
    fn cross_filter_direction_uses_tmdl_spelling() {
        let rel: Relationship =
            serde_json::from_str(r#"{"crossFilterDirection": "bothDirections"}"#).unwrap();
        assert_eq!(
            rel.cross_filter_direction,
            Some(CrossFilterDirection::BothDirections)
        );
        let back = serde_json::to_string(&rel).unwrap();
        assert_eq!(back, r#"{"crossFilterDirection":"bothDirections"}"#);
    }
}
