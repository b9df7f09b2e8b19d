//! Query planner — turns a `Query` into the definition an engine executes.
//!
//! The planner is engine-agnostic. For every non-empty axis it resolves each
//! hierarchy's selection into an explicit member list, walking the catalog
//! lazily so unreachable subtrees are never expanded.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{AxisId, Member};
use crate::query::Query;
use crate::{Error, Result};

/// A finished query: which members appear, in what nesting, per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub query: String,
    pub cube: String,
    pub non_empty: bool,
    /// Axes in configured order; axes without hierarchies are left out.
    pub axes: Vec<AxisDefinition>,
}

impl QueryDefinition {
    pub fn axis(&self, id: AxisId) -> Option<&AxisDefinition> {
        self.axes.iter().find(|a| a.axis == id)
    }

    /// Output axes (everything but FILTER), by ascending ordinal.
    pub fn output_axes(&self) -> Vec<&AxisDefinition> {
        let mut axes: Vec<_> = self.axes.iter().filter(|a| !a.axis.is_filter()).collect();
        axes.sort_by_key(|a| a.axis.ordinal());
        axes
    }

    pub fn to_mdx(&self) -> String {
        crate::mdx::render(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDefinition {
    pub axis: AxisId,
    /// Outermost hierarchy first.
    pub hierarchies: Vec<HierarchySet>,
}

impl AxisDefinition {
    /// Size of the crossjoin of all hierarchy sets.
    pub fn position_count(&self) -> usize {
        self.hierarchies
            .iter()
            .fold(1usize, |acc, h| acc.saturating_mul(h.members.len()))
    }

    /// Every position of the crossjoin, outermost hierarchy varying slowest.
    pub fn positions(&self) -> Vec<Vec<Member>> {
        let mut positions: Vec<Vec<Member>> = vec![Vec::new()];
        for set in &self.hierarchies {
            positions = positions
                .iter()
                .flat_map(|prefix| {
                    set.members.iter().map(move |m| {
                        let mut next = prefix.clone();
                        next.push(m.clone());
                        next
                    })
                })
                .collect();
        }
        positions
    }
}

/// Included members of one hierarchy, parents before children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchySet {
    pub hierarchy: String,
    pub members: Vec<Member>,
}

/// Build the definition for `query`.
///
/// Fails with `PlanError` when an output axis would exceed the configured
/// position limit.
pub fn plan(query: &Query) -> Result<QueryDefinition> {
    let limit = query.config().max_positions;
    let mut axes = Vec::new();

    for axis in query.axes().iter().filter(|a| !a.is_empty()) {
        let mut hierarchies = Vec::with_capacity(axis.len());
        for name in axis.hierarchies() {
            let qh = query.find_hierarchy(name).ok_or_else(|| {
                Error::PlanError(format!("hierarchy [{name}] on axis {} has no selection", axis.id()))
            })?;
            hierarchies.push(HierarchySet {
                hierarchy: name.clone(),
                members: qh.included_members()?,
            });
        }

        let definition = AxisDefinition { axis: axis.id(), hierarchies };
        let count = definition.position_count();
        if !axis.id().is_filter() && count > limit {
            return Err(Error::PlanError(format!(
                "axis {} has {count} positions, limit is {limit}",
                axis.id()
            )));
        }
        debug!(axis = %axis.id(), positions = count, "planned axis");
        axes.push(definition);
    }

    Ok(QueryDefinition {
        query: query.name().to_string(),
        cube: query.cube().name().to_string(),
        non_empty: query.config().non_empty,
        axes,
    })
}
