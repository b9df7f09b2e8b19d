//! # Query
//!
//! A `Query` owns its axes and one `QueryHierarchy` per dimension the user
//! has touched. Hierarchies outlive their placement: taking one off an axis
//! and putting it back later keeps its selection.
//!
//! A query is a per-session value. It does no internal locking; the session
//! layer serializes access.

pub mod hierarchy;
pub mod axis;

use std::time::Instant;

use chrono::Utc;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::annotate::{self, AnnotatedGrid};
use crate::catalog::Cube;
use crate::config::QueryConfig;
use crate::execution::{ExecutionEngine, ResultGrid};
use crate::model::{AxisId, Member};
use crate::planner::{self, QueryDefinition};
use crate::{Error, Result};

pub use hierarchy::QueryHierarchy;
pub use axis::{AxisMut, QueryAxis};

/// An incrementally edited multidimensional query against one cube.
#[derive(Debug, Clone)]
pub struct Query {
    name: String,
    cube: Cube,
    config: QueryConfig,
    axes: Vec<QueryAxis>,
    hierarchies: HashMap<String, QueryHierarchy>,
}

impl Query {
    /// A query with the default axis set (COLUMNS, ROWS, FILTER).
    pub fn new(name: impl Into<String>, cube: Cube) -> Self {
        Self::with_config(name, cube, QueryConfig::default())
    }

    pub fn with_config(name: impl Into<String>, cube: Cube, config: QueryConfig) -> Self {
        let mut axes: Vec<QueryAxis> = Vec::with_capacity(config.axes.len());
        for id in &config.axes {
            if !axes.iter().any(|a| a.id() == *id) {
                axes.push(QueryAxis::new(*id));
            }
        }
        Self {
            name: name.into(),
            cube,
            config,
            axes,
            hierarchies: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Axes in configured order.
    pub fn axes(&self) -> &[QueryAxis] {
        &self.axes
    }

    pub fn axis(&self, id: AxisId) -> Result<&QueryAxis> {
        self.axes
            .iter()
            .find(|a| a.id() == id)
            .ok_or_else(|| Error::UnknownAxis(id.to_string()))
    }

    /// Mutable handle on an axis; `UnknownAxis` if this query does not expose it.
    pub fn axis_mut(&mut self, id: AxisId) -> Result<AxisMut<'_>> {
        let index = self
            .axes
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| Error::UnknownAxis(id.to_string()))?;
        Ok(AxisMut { query: self, index })
    }

    /// The query hierarchy for `name`, created with an empty selection on
    /// first reference.
    pub fn hierarchy(&mut self, name: &str) -> Result<&mut QueryHierarchy> {
        if !self.hierarchies.contains_key(name) {
            let hierarchy = self.cube.hierarchy(name)?;
            debug!(query = %self.name, hierarchy = name, "create query hierarchy");
            self.hierarchies.insert(name.to_string(), QueryHierarchy::new(hierarchy));
        }
        self.hierarchies
            .get_mut(name)
            .ok_or_else(|| Error::UnknownDimension(name.to_string()))
    }

    /// The query hierarchy for `name`, if one was already created.
    pub fn find_hierarchy(&self, name: &str) -> Option<&QueryHierarchy> {
        self.hierarchies.get(name)
    }

    /// The axis `hierarchy` is currently placed on.
    pub fn placement(&self, hierarchy: &str) -> Option<AxisId> {
        self.axes.iter().find(|a| a.contains(hierarchy)).map(QueryAxis::id)
    }

    /// Resolve a member unique name through the cube's catalog.
    pub fn lookup_member(&self, unique_name: &str) -> Result<Member> {
        self.cube.lookup_member(unique_name)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// The definition the execution engine would receive right now.
    pub fn definition(&self) -> Result<QueryDefinition> {
        planner::plan(self)
    }

    /// Plan the query and hand it to `engine`. Engine errors come back as
    /// `EngineFailure` with the original error as source.
    #[tracing::instrument(skip(self, engine), fields(query = %self.name, cube = %self.cube.name()))]
    pub async fn execute<E>(&self, engine: &E) -> Result<ResultGrid>
    where
        E: ExecutionEngine + ?Sized,
    {
        let definition = self.definition()?;
        let executed_at = Utc::now();
        let started = Instant::now();

        let mut grid = engine.execute(&definition).await.map_err(|source| {
            warn!(error = %source, "execution engine failed");
            Error::EngineFailure(source)
        })?;

        grid.stats.executed_at = Some(executed_at);
        grid.stats.execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(cells = grid.cells.len(), ms = grid.stats.execution_time_ms, "executed");
        Ok(grid)
    }

    /// Attach the current selection state to every member of `grid`.
    pub fn annotate(&self, grid: ResultGrid) -> Result<AnnotatedGrid> {
        annotate::annotate(self, grid)
    }
}
