//! MDX rendering of query definitions.
//!
//! ```text
//! QueryDefinition → render() → SELECT ... ON COLUMNS, ... ON ROWS FROM [Cube] WHERE ...
//! ```
//!
//! Nested hierarchies on one axis become left-deep `CrossJoin`s, outermost
//! hierarchy first. FILTER becomes the `WHERE` slicer.

use crate::model::AxisId;
use crate::planner::{AxisDefinition, HierarchySet, QueryDefinition};

/// Render `definition` as an MDX `SELECT` statement.
pub fn render(definition: &QueryDefinition) -> String {
    let mut out = String::from("SELECT");

    let axes: Vec<String> = definition
        .output_axes()
        .into_iter()
        .map(|axis| {
            let prefix = if definition.non_empty { "NON EMPTY " } else { "" };
            format!("{prefix}{} ON {}", axis_expression(axis), axis.axis)
        })
        .collect();
    if !axes.is_empty() {
        out.push('\n');
        out.push_str(&axes.join(",\n"));
    }

    out.push_str(&format!("\nFROM {}", quote(&definition.cube)));

    if let Some(filter) = definition.axis(AxisId::Filter) {
        out.push_str(&format!("\nWHERE {}", axis_expression(filter)));
    }
    out
}

fn axis_expression(axis: &AxisDefinition) -> String {
    let mut sets = axis.hierarchies.iter().map(set_expression);
    let first = sets.next().unwrap_or_else(|| "{}".to_string());
    sets.fold(first, |acc, next| format!("CrossJoin({acc}, {next})"))
}

fn set_expression(set: &HierarchySet) -> String {
    let members: Vec<String> = set.members.iter().map(|m| m.unique_name()).collect();
    format!("{{{}}}", members.join(", "))
}

fn quote(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}
