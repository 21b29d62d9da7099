//! Best-effort extraction of measure/table/column references from raw DAX
//! expression text.
//!
//! This intentionally never parses DAX into an AST: a handful of compiled
//! regexes plus positional filtering is enough for dependency tracking, and
//! keeps the extractors total. Nested quotes, escaped brackets, or string
//! literals containing `[`/`]` can produce false positives or negatives; the
//! downstream graph builder tolerates both.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// A `Table[Column]` reference pulled out of an expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

/// Common DAX function names that would otherwise look like a bare table name
/// in front of `(`. Compared case-insensitively.
const DAX_FUNCTIONS: &[&str] = &[
    "CALCULATE",
    "CALCULATETABLE",
    "FILTER",
    "ALL",
    "ALLEXCEPT",
    "ALLSELECTED",
    "VALUES",
    "DISTINCT",
    "RELATED",
    "RELATEDTABLE",
    "SUM",
    "SUMX",
    "AVERAGE",
    "AVERAGEX",
    "COUNT",
    "COUNTX",
    "COUNTROWS",
    "MIN",
    "MAX",
    "DIVIDE",
    "IF",
    "SWITCH",
    "SELECTEDVALUE",
    "ISBLANK",
    "FORMAT",
];

/// Every standalone `[Name]` token in the expression, deduplicated in
/// first-seen order.
///
/// A bracket directly preceded by an identifier character or a closing quote
/// is a column position (`Sales[Amount]`, `'Date'[Date]`) and is skipped, as
/// is any token containing `.` or `::` (a namespaced reference).
pub fn measure_references(expression: &str) -> Vec<String> {
    static BRACKET_RE: OnceLock<Regex> = OnceLock::new();
    let re = BRACKET_RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("valid regex"));

    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for caps in re.captures_iter(expression) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let preceding = expression[..whole.start()].chars().next_back();
        if matches!(preceding, Some(c) if c == '\'' || c == '_' || c.is_alphanumeric()) {
            continue;
        }
        let name = name.as_str();
        if name.contains('.') || name.contains("::") {
            continue;
        }
        if seen.insert(name.to_string()) {
            refs.push(name.to_string());
        }
    }
    refs
}

/// Table names referenced by the expression, deduplicated in first-seen order.
///
/// Matches quoted `'Table Name'` tokens in front of `[` or `(` anywhere, and
/// bare identifiers in front of `[` or `(` when at the start of the
/// expression or after whitespace. Bare matches on the [`DAX_FUNCTIONS`]
/// allow-list are dropped so `CALCULATE(` is not mistaken for a table.
pub fn table_references(expression: &str) -> Vec<String> {
    static TABLE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TABLE_RE.get_or_init(|| {
        Regex::new(r"'([^']+)'\s*[\[(]|(?:^|\s)([A-Za-z_][A-Za-z0-9_]*)\s*[\[(]")
            .expect("valid regex")
    });

    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for caps in re.captures_iter(expression) {
        let (bare, name) = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => (false, quoted.as_str()),
            (None, Some(bare)) => (true, bare.as_str()),
            (None, None) => continue,
        };
        if bare && DAX_FUNCTIONS.contains(&name.to_uppercase().as_str()) {
            continue;
        }
        if seen.insert(name.to_string()) {
            refs.push(name.to_string());
        }
    }
    refs
}

/// `Table[Column]` and `'Table Name'[Column]` references, deduplicated by the
/// (table, column) pair in first-seen order.
pub fn column_references(expression: &str) -> Vec<ColumnRef> {
    static COLUMN_RE: OnceLock<Regex> = OnceLock::new();
    let re = COLUMN_RE.get_or_init(|| {
        Regex::new(r"(?:'([^']+)'|([A-Za-z_][A-Za-z0-9_]*))\[([^\[\]]+)\]").expect("valid regex")
    });

    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for caps in re.captures_iter(expression) {
        let table = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => quoted.as_str(),
            (None, Some(bare)) => bare.as_str(),
            (None, None) => continue,
        };
        let Some(column) = caps.get(3) else { continue };
        let column_ref = ColumnRef {
            table: table.to_string(),
            column: column.as_str().to_string(),
        };
        if seen.insert(column_ref.clone()) {
            refs.push(column_ref);
        }
    }
    refs
}
