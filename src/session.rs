//! Session-level operations.
//!
//! A [`QuerySession`] is what a transport layer holds per client: one query,
//! one engine. Every mutating call edits the query and then re-executes it,
//! returning the refreshed [`AnnotatedGrid`] so the client can redraw.
//! Members arrive as unique names and are resolved through the cube's catalog.

use std::sync::Arc;

use tracing::debug;

use crate::annotate::{AnnotatedGrid, MemberState};
use crate::catalog::HierarchyInfo;
use crate::execution::ExecutionEngine;
use crate::model::{AxisId, Member, Operator, Sign};
use crate::query::Query;
use crate::{Error, Result};

pub struct QuerySession<E: ExecutionEngine> {
    query: Query,
    engine: Arc<E>,
}

impl<E: ExecutionEngine> QuerySession<E> {
    pub fn new(query: Query, engine: Arc<E>) -> Self {
        Self { query, engine }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Execute the query as it stands.
    pub async fn execute(&self) -> Result<AnnotatedGrid> {
        let grid = self.query.execute(self.engine.as_ref()).await?;
        self.query.annotate(grid)
    }

    // ========================================================================
    // Axis layout
    // ========================================================================

    /// Place `hierarchy` at the end of `axis`, including every descendant of
    /// each root member.
    pub async fn add_hierarchy(&mut self, axis: AxisId, hierarchy: &str) -> Result<AnnotatedGrid> {
        self.query.axis(axis)?;
        if let Some(placed) = self.query.placement(hierarchy) {
            return Err(Error::AlreadyPlaced { hierarchy: hierarchy.to_string(), axis: placed });
        }
        let qh = self.query.hierarchy(hierarchy)?;
        for root in qh.hierarchy().root_members()? {
            qh.include(Operator::Descendants, &root)?;
        }
        self.query.axis_mut(axis)?.add_hierarchy(hierarchy)?;
        self.execute().await
    }

    /// Move `hierarchy` to index `target` of `axis`.
    ///
    /// A hierarchy on another axis is taken off it first; one on no axis is
    /// appended. `target` past the end means last.
    pub async fn move_hierarchy(
        &mut self,
        hierarchy: &str,
        axis: AxisId,
        target: usize,
    ) -> Result<AnnotatedGrid> {
        self.query.axis(axis)?;
        match self.query.placement(hierarchy) {
            Some(current) if current == axis => {}
            Some(current) => {
                self.query.axis_mut(current)?.remove_hierarchy(hierarchy)?;
                self.query.axis_mut(axis)?.add_hierarchy(hierarchy)?;
            }
            None => self.query.axis_mut(axis)?.add_hierarchy(hierarchy)?,
        }

        let mut handle = self.query.axis_mut(axis)?;
        let mut pos = handle
            .axis()
            .position_of(hierarchy)
            .ok_or_else(|| Error::NotPlaced { hierarchy: hierarchy.to_string(), axis })?;
        let target = target.min(handle.axis().len() - 1);
        debug!(hierarchy, %axis, from = pos, to = target, "move hierarchy");
        while pos < target {
            handle.push_down(pos)?;
            pos += 1;
        }
        while pos > target {
            handle.pull_up(pos)?;
            pos -= 1;
        }
        self.execute().await
    }

    pub async fn remove_hierarchy(&mut self, axis: AxisId, hierarchy: &str) -> Result<AnnotatedGrid> {
        self.query.axis_mut(axis)?.remove_hierarchy(hierarchy)?;
        self.execute().await
    }

    // ========================================================================
    // Drilling
    // ========================================================================

    pub async fn drill(&mut self, axis: AxisId, position: &[&str]) -> Result<AnnotatedGrid> {
        let members = self.resolve(position)?;
        self.query.axis_mut(axis)?.drill(&members)?;
        self.execute().await
    }

    pub async fn undrill(&mut self, axis: AxisId, position: &[&str]) -> Result<AnnotatedGrid> {
        let members = self.resolve(position)?;
        self.query.axis_mut(axis)?.undrill(&members)?;
        self.execute().await
    }

    // ========================================================================
    // Catalog browsing & selection editing
    // ========================================================================

    pub fn hierarchies(&self) -> Vec<HierarchyInfo> {
        self.query.cube().hierarchies()
    }

    pub fn hierarchy_roots(&mut self, hierarchy: &str) -> Result<Vec<MemberState>> {
        let qh = &*self.query.hierarchy(hierarchy)?;
        qh.hierarchy()
            .root_members()?
            .iter()
            .map(|root| MemberState::new(qh, root))
            .collect()
    }

    pub fn member_children(&mut self, unique_name: &str) -> Result<Vec<MemberState>> {
        let member = self.query.lookup_member(unique_name)?;
        let qh = &*self.query.hierarchy(member.hierarchy())?;
        qh.hierarchy()
            .children(&member)?
            .iter()
            .map(|child| MemberState::new(qh, child))
            .collect()
    }

    /// Issue `(operator, sign)` at `unique_name` and return the refreshed
    /// state of every member from its root down to it.
    pub fn apply_operation(
        &mut self,
        unique_name: &str,
        operator: Operator,
        sign: Sign,
    ) -> Result<Vec<MemberState>> {
        let member = self.query.lookup_member(unique_name)?;
        let qh = self.query.hierarchy(member.hierarchy())?;
        qh.set(operator, &member, sign)?;

        let qh = &*qh;
        let mut path = vec![member];
        while let Some(parent) = qh.hierarchy().parent(&path[path.len() - 1])? {
            path.push(parent);
        }
        path.reverse();
        path.iter().map(|m| MemberState::new(qh, m)).collect()
    }

    fn resolve(&self, position: &[&str]) -> Result<Vec<Member>> {
        position.iter().map(|name| self.query.lookup_member(name)).collect()
    }
}
