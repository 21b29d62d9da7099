//! Measure dependency graph: construction, cycle detection, unused-measure
//! lookup.
//!
//! The graph is rebuilt from scratch on every call from the snapshot it is
//! given; nothing is cached between calls. Forward edges (what a measure
//! references) and reverse edges (`dependents`) are built in two separate
//! passes over an index that is never mutated after construction.

use crate::extract::{column_references, measure_references, table_references, ColumnRef};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tabular_model::Table;

/// Forward references extracted from one measure's expression.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Dependencies {
    pub measures: Vec<String>,
    pub columns: Vec<ColumnRef>,
    pub tables: Vec<String>,
}

/// One node of the dependency graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    pub measure_name: String,
    /// Name of the table owning the measure.
    pub table: String,
    pub dependencies: Dependencies,
    /// Names of measures whose expressions reference this one.
    pub dependents: Vec<String>,
}

/// A cycle in the measure-to-measure edges.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CircularDependency {
    /// The nodes along the cycle, with the entry node repeated at the end to
    /// close the loop.
    pub cycle: Vec<String>,
    pub description: String,
}

/// A measure no other measure references.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnusedMeasure {
    pub table: String,
    pub measure: String,
}

/// Builds the full dependency graph for a snapshot, keyed by measure name.
///
/// Measure names are assumed globally unique; on a collision the later
/// measure (table order, then measure order) shadows the earlier one, and the
/// collision is logged. References to measures that do not exist in the
/// snapshot are dropped silently.
pub fn build_dependency_graph(tables: &[Table]) -> BTreeMap<String, DependencyRecord> {
    // Pass 0: global measure index, built once and read-only afterwards.
    let mut index: HashMap<&str, (&str, &tabular_model::Measure)> = HashMap::new();
    for table in tables {
        for measure in &table.measures {
            if let Some((previous_table, _)) =
                index.insert(measure.name.as_str(), (table.name.as_str(), measure))
            {
                log::warn!(
                    "duplicate measure name '{}' in table '{}' shadows the one in table '{}'",
                    measure.name,
                    table.name,
                    previous_table,
                );
            }
        }
    }

    // Pass 1: forward edges from extracted references.
    let mut graph: BTreeMap<String, DependencyRecord> = BTreeMap::new();
    for (name, (table, measure)) in &index {
        let measures = measure_references(&measure.expression)
            .into_iter()
            .filter(|target| index.contains_key(target.as_str()))
            .collect();
        graph.insert(
            name.to_string(),
            DependencyRecord {
                measure_name: name.to_string(),
                table: table.to_string(),
                dependencies: Dependencies {
                    measures,
                    columns: column_references(&measure.expression),
                    tables: table_references(&measure.expression),
                },
                dependents: Vec::new(),
            },
        );
    }

    // Pass 2: reverse edges.
    let edges: Vec<(String, Vec<String>)> = graph
        .iter()
        .map(|(name, record)| (name.clone(), record.dependencies.measures.clone()))
        .collect();
    for (source, targets) in edges {
        for target in targets {
            if let Some(record) = graph.get_mut(&target) {
                record.dependents.push(source.clone());
            }
        }
    }

    log::debug!("dependency graph built: {} measures", graph.len());
    graph
}

/// Finds cycles in the measure-to-measure edges.
///
/// Iterative depth-first search with an explicit frame stack; the recursion
/// depth of the original formulation is replaced by `(node, next-edge)`
/// frames so large graphs cannot overflow the call stack. The policy is one
/// cycle per DFS root: as soon as a cycle is found, that root's traversal
/// stops. Nodes are marked visited on first entry and never explored again
/// from a different root.
pub fn find_circular_dependencies(
    graph: &BTreeMap<String, DependencyRecord>,
) -> Vec<CircularDependency> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut cycles = Vec::new();

    for root in graph.keys() {
        if visited.contains(root.as_str()) {
            continue;
        }
        let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
        let mut on_stack: HashSet<&str> = HashSet::new();
        let mut path: Vec<&str> = Vec::new();
        visited.insert(root.as_str());
        on_stack.insert(root.as_str());
        path.push(root.as_str());

        'dfs: while let Some(&(node, edge)) = stack.last() {
            let Some(record) = graph.get(node) else {
                stack.pop();
                continue;
            };
            let targets = &record.dependencies.measures;
            if edge >= targets.len() {
                on_stack.remove(node);
                path.pop();
                stack.pop();
                continue;
            }
            if let Some(frame) = stack.last_mut() {
                frame.1 = edge + 1;
            }

            let target = targets[edge].as_str();
            if on_stack.contains(target) {
                let start = path.iter().position(|&n| n == target).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(target.to_string());
                let description = format!("Circular dependency: {}", cycle.join(" → "));
                cycles.push(CircularDependency { cycle, description });
                break 'dfs;
            }
            if !visited.contains(target) {
                visited.insert(target);
                on_stack.insert(target);
                path.push(target);
                stack.push((target, 0));
            }
        }
    }

    cycles
}

/// Measures whose `dependents` list is empty after the full graph is built.
pub fn find_unused_measures(graph: &BTreeMap<String, DependencyRecord>) -> Vec<UnusedMeasure> {
    graph
        .values()
        .filter(|record| record.dependents.is_empty())
        .map(|record| UnusedMeasure {
            table: record.table.clone(),
            measure: record.measure_name.clone(),
        })
        .collect()
}
