//! Query axes — hierarchy ordering and position-based drill/undrill.

use tracing::debug;

use crate::model::{AxisId, Member, Operator, Sign};
use crate::{Error, Result};
use super::{Query, QueryHierarchy};

// ============================================================================
// QueryAxis
// ============================================================================

/// Ordered hierarchies on one output axis, outermost first.
///
/// Hierarchies are referenced by name; the owning [`Query`] holds the
/// [`QueryHierarchy`] values themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAxis {
    id: AxisId,
    hierarchies: Vec<String>,
}

impl QueryAxis {
    pub fn new(id: AxisId) -> Self {
        Self { id, hierarchies: Vec::new() }
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn hierarchies(&self) -> &[String] {
        &self.hierarchies
    }

    pub fn len(&self) -> usize {
        self.hierarchies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hierarchies.is_empty()
    }

    pub fn position_of(&self, hierarchy: &str) -> Option<usize> {
        self.hierarchies.iter().position(|h| h == hierarchy)
    }

    pub fn contains(&self, hierarchy: &str) -> bool {
        self.position_of(hierarchy).is_some()
    }

    /// Swap the hierarchy at `index` with the one after it.
    pub fn push_down(&mut self, index: usize) -> Result<()> {
        let len = self.hierarchies.len();
        let next = index
            .checked_add(1)
            .filter(|&next| next < len)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        debug!(axis = %self.id, index, "push down");
        self.hierarchies.swap(index, next);
        Ok(())
    }

    /// Swap the hierarchy at `index` with the one before it.
    pub fn pull_up(&mut self, index: usize) -> Result<()> {
        let len = self.hierarchies.len();
        if index == 0 || index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        debug!(axis = %self.id, index, "pull up");
        self.hierarchies.swap(index - 1, index);
        Ok(())
    }

    pub(crate) fn push(&mut self, hierarchy: String) {
        self.hierarchies.push(hierarchy);
    }

    pub(crate) fn remove(&mut self, hierarchy: &str) -> Result<()> {
        let index = self.position_of(hierarchy).ok_or_else(|| Error::NotPlaced {
            hierarchy: hierarchy.to_string(),
            axis: self.id,
        })?;
        self.hierarchies.remove(index);
        Ok(())
    }
}

// ============================================================================
// AxisMut — axis operations that reach into the rest of the query
// ============================================================================

/// Mutable handle on one axis of a query.
///
/// Placement checks span every axis and drilling edits hierarchy selections,
/// so this borrows the whole query rather than just the axis.
pub struct AxisMut<'q> {
    pub(super) query: &'q mut Query,
    pub(super) index: usize,
}

impl<'q> AxisMut<'q> {
    pub fn id(&self) -> AxisId {
        self.axis().id()
    }

    pub fn axis(&self) -> &QueryAxis {
        &self.query.axes[self.index]
    }

    pub fn hierarchies(&self) -> &[String] {
        self.axis().hierarchies()
    }

    /// Append `hierarchy`, creating its query hierarchy on first use.
    ///
    /// Fails with `AlreadyPlaced` if it is on this or any other axis.
    pub fn add_hierarchy(&mut self, hierarchy: &str) -> Result<()> {
        self.query.hierarchy(hierarchy)?;
        if let Some(axis) = self.query.placement(hierarchy) {
            return Err(Error::AlreadyPlaced { hierarchy: hierarchy.to_string(), axis });
        }
        debug!(axis = %self.id(), hierarchy, "add hierarchy");
        self.query.axes[self.index].push(hierarchy.to_string());
        Ok(())
    }

    /// Take `hierarchy` off this axis. Its selection is kept by the query.
    pub fn remove_hierarchy(&mut self, hierarchy: &str) -> Result<()> {
        self.query.axes[self.index].remove(hierarchy)?;
        debug!(axis = %self.id(), hierarchy, "remove hierarchy");
        Ok(())
    }

    pub fn push_down(&mut self, index: usize) -> Result<()> {
        self.query.axes[self.index].push_down(index)
    }

    pub fn pull_up(&mut self, index: usize) -> Result<()> {
        self.query.axes[self.index].pull_up(index)
    }

    /// Expand the innermost member of `position` into its children.
    ///
    /// The member stops showing as its own row/column (`exclude MEMBER`) and
    /// its children take its place (`include CHILDREN`).
    pub fn drill(&mut self, position: &[Member]) -> Result<()> {
        let member = self.check_position(position)?;
        let qh = self.target(position)?;
        if qh.hierarchy().is_leaf(member)? {
            return Err(Error::NotDrillable(member.unique_name()));
        }
        debug!(hierarchy = qh.name(), %member, "drill");
        qh.include(Operator::Children, member)?;
        qh.exclude(Operator::Member, member)
    }

    /// Collapse the children of the innermost member of `position` back
    /// under it.
    ///
    /// The CHILDREN inclusion a drill introduced is dropped; if the children
    /// would still be included by a broader rule, they are excluded at
    /// CHILDREN scope instead.
    pub fn undrill(&mut self, position: &[Member]) -> Result<()> {
        let member = self.check_position(position)?;
        let qh = self.target(position)?;
        debug!(hierarchy = qh.name(), %member, "undrill");

        qh.include(Operator::Member, member)?;
        let drilled = qh
            .selection()
            .rule_at(member, Operator::Children)
            .is_some_and(|r| r.sign == Sign::Include);
        if drilled {
            qh.remove(Operator::Children, member)?;
        }
        if qh.effective_sign_at(member, Operator::Children)? == Sign::Include {
            qh.exclude(Operator::Children, member)?;
        }
        Ok(())
    }

    /// Validates `position` against the axis layout and returns its innermost member.
    fn check_position<'p>(&self, position: &'p [Member]) -> Result<&'p Member> {
        let axis = self.axis();
        let member = position
            .last()
            .ok_or_else(|| Error::InvalidPosition(format!("empty position on axis {}", axis.id())))?;
        if position.len() > axis.len() {
            return Err(Error::InvalidPosition(format!(
                "{} members for {} hierarchies on axis {}",
                position.len(),
                axis.len(),
                axis.id()
            )));
        }
        for (m, hierarchy) in position.iter().zip(axis.hierarchies()) {
            if m.hierarchy() != hierarchy {
                return Err(Error::InvalidMember {
                    member: m.unique_name(),
                    hierarchy: hierarchy.clone(),
                });
            }
        }
        Ok(member)
    }

    /// Query hierarchy at the depth of the innermost member of `position`.
    fn target(&mut self, position: &[Member]) -> Result<&mut QueryHierarchy> {
        let name = self.axis().hierarchies()[position.len() - 1].clone();
        self.query.hierarchy(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(names: &[&str]) -> QueryAxis {
        let mut axis = QueryAxis::new(AxisId::Rows);
        for name in names {
            axis.push(name.to_string());
        }
        axis
    }

    #[test]
    fn test_push_down_pull_up_roundtrip() {
        let mut a = axis(&["Store", "Product", "Time"]);
        a.push_down(0).unwrap();
        assert_eq!(a.hierarchies(), &["Product", "Store", "Time"]);
        a.pull_up(1).unwrap();
        assert_eq!(a.hierarchies(), &["Store", "Product", "Time"]);
    }

    #[test]
    fn test_swap_bounds() {
        let mut a = axis(&["Store", "Product"]);
        assert!(matches!(a.push_down(1), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(a.pull_up(0), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(a.pull_up(2), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(
            a.push_down(usize::MAX),
            Err(Error::IndexOutOfRange { index: usize::MAX, len: 2 })
        ));
        assert!(matches!(a.pull_up(usize::MAX), Err(Error::IndexOutOfRange { .. })));
        assert_eq!(a.hierarchies(), &["Store", "Product"]);
    }

    #[test]
    fn test_remove_absent() {
        let mut a = axis(&["Store"]);
        assert!(matches!(a.remove("Time"), Err(Error::NotPlaced { .. })));
        a.remove("Store").unwrap();
        assert!(a.is_empty());
    }
}
