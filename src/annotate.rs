//! Selection metadata attached to executed grids.
//!
//! The UI renders include/exclude toggles next to every visible member. For
//! each member and operator it needs to know whether each toggle would do
//! anything, which is what [`MemberState`] carries.
//!
//! [`AnnotatedGrid`] lists every distinct member once; positions refer to
//! members by index into that table.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::execution::ResultGrid;
use crate::model::{AxisId, Member, Operator, Sign};
use crate::query::{Query, QueryHierarchy};
use crate::{Error, Result};

/// Display and toggle state of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberState {
    pub name: String,
    pub unique_name: String,
    pub caption: String,
    pub included: bool,
    pub is_leaf: bool,
    /// Whether an include at each scope would change anything.
    pub include_ops: BTreeMap<Operator, bool>,
    /// Whether an exclude at each scope would change anything.
    pub exclude_ops: BTreeMap<Operator, bool>,
}

impl MemberState {
    pub fn new(qh: &QueryHierarchy, member: &Member) -> Result<Self> {
        let hierarchy = qh.hierarchy();
        let is_leaf = hierarchy.is_leaf(member)?;
        let mut include_ops = BTreeMap::new();
        let mut exclude_ops = BTreeMap::new();

        for op in Operator::ALL {
            // a leaf has nothing below it to toggle
            if op != Operator::Member && is_leaf {
                include_ops.insert(op, false);
                exclude_ops.insert(op, false);
                continue;
            }
            let sign = qh.scope_sign(member, op)?;
            let overridden = match op {
                Operator::Member => false,
                Operator::Children => qh.has_overriding_children(member)?,
                Operator::Descendants => qh.has_overriding_descendants(member)?,
            };
            include_ops.insert(op, sign != Sign::Include || overridden);
            exclude_ops.insert(op, sign != Sign::Exclude || overridden);
        }

        Ok(Self {
            name: member.name().to_string(),
            unique_name: member.unique_name(),
            caption: hierarchy.member_caption(member),
            included: qh.is_included(member)?,
            is_leaf,
            include_ops,
            exclude_ops,
        })
    }

    pub fn can_include(&self, op: Operator) -> bool {
        self.include_ops.get(&op).copied().unwrap_or(false)
    }

    pub fn can_exclude(&self, op: Operator) -> bool {
        self.exclude_ops.get(&op).copied().unwrap_or(false)
    }
}

/// An executed grid with per-member selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedGrid {
    pub grid: ResultGrid,
    /// Distinct members, in order of first appearance.
    pub members: Vec<MemberState>,
    pub axes: Vec<AnnotatedAxis>,
}

impl AnnotatedGrid {
    pub fn axis(&self, id: AxisId) -> Option<&AnnotatedAxis> {
        self.axes.iter().find(|a| a.axis == id)
    }

    /// States of the members at one position.
    pub fn position(&self, id: AxisId, index: usize) -> Option<Vec<&MemberState>> {
        let position = self.axis(id)?.positions.get(index)?;
        position.iter().map(|&i| self.members.get(i)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedAxis {
    pub axis: AxisId,
    /// Indices into [`AnnotatedGrid::members`].
    pub positions: Vec<Vec<usize>>,
}

/// Build the annotated form of `grid` against the current state of `query`.
pub fn annotate(query: &Query, grid: ResultGrid) -> Result<AnnotatedGrid> {
    let mut members = Vec::new();
    let mut index: HashMap<Member, usize> = HashMap::new();
    let mut axes = Vec::with_capacity(grid.axes.len());

    for axis in &grid.axes {
        let mut positions = Vec::with_capacity(axis.positions.len());
        for position in &axis.positions {
            let mut refs = Vec::with_capacity(position.len());
            for member in position {
                let slot = match index.get(member) {
                    Some(&slot) => slot,
                    None => {
                        let qh = query
                            .find_hierarchy(member.hierarchy())
                            .ok_or_else(|| Error::UnknownDimension(member.hierarchy().to_string()))?;
                        members.push(MemberState::new(qh, member)?);
                        index.insert(member.clone(), members.len() - 1);
                        members.len() - 1
                    }
                };
                refs.push(slot);
            }
            positions.push(refs);
        }
        axes.push(AnnotatedAxis { axis: axis.axis, positions });
    }

    Ok(AnnotatedGrid { grid, members, axes })
}
