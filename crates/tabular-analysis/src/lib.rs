//! DAX measure analysis over a tabular semantic-model snapshot.
//!
//! Given the in-memory tables/measures/columns/relationships of a model
//! (loaded elsewhere; see `tabular-model`), this crate extracts
//! cross-references from measure expressions, builds the measure dependency
//! graph, detects cycles and unused measures, scores expression complexity,
//! classifies expressions into known DAX idioms, flags anti-patterns, and
//! aggregates everything into a model-wide quality score.
//!
//! This is heuristic text analysis, not a DAX grammar: references are pulled
//! out with regexes, DAX is never parsed into an AST or executed, and odd
//! input degrades to empty/zero-valued results instead of errors. Every
//! public function is total, synchronous, and side-effect-free on its inputs;
//! all derived records are rebuilt from scratch per call and serialize to the
//! camelCase JSON shape the tool-dispatch layer emits.

mod complexity;
mod dependencies;
mod extract;
mod model_quality;
mod patterns;
mod quality;

pub use crate::complexity::{analyze_complexity, ComplexityFactors, DaxComplexity};
pub use crate::dependencies::{
    build_dependency_graph, find_circular_dependencies, find_unused_measures, CircularDependency,
    Dependencies, DependencyRecord, UnusedMeasure,
};
pub use crate::extract::{column_references, measure_references, table_references, ColumnRef};
pub use crate::model_quality::{
    assess_model_quality, check_naming_conventions, ModelQuality, NamingIssue, ObjectType,
    QualityMetrics,
};
pub use crate::patterns::{detect_pattern, DaxPattern};
pub use crate::quality::{check_measure_quality, DaxIssue, IssueSeverity};
