//! # olap-query — Incremental OLAP Query Model
//!
//! The state behind a pivot-table UI: which members of each hierarchy appear
//! on which axis, how hierarchies nest within an axis, and which rows or
//! columns are drilled open.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `HierarchyCatalog` and `ExecutionEngine` are the
//!    contracts with cube metadata and query execution; both live outside
//!    this crate.
//! 2. **Rules, not member sets**: a `Selection` stores scoped include/exclude
//!    rules and resolves membership on demand, so huge hierarchies never get
//!    materialized.
//! 3. **Derived UI state**: effective signs and override flags are recomputed
//!    from the rule list; nothing denormalized can drift.
//! 4. **One owner per session**: a `Query` is a plain owned value with no
//!    internal locking.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use olap_query::{AxisId, Cube, MemoryCatalog, MemoryEngine, Operator, Query};
//!
//! # async fn example() -> olap_query::Result<()> {
//! let catalog = MemoryCatalog::from_json(r#"{"hierarchies": []}"#)?;
//! let mut query = Query::new("q", Cube::new("Sales", Arc::new(catalog)));
//!
//! let store = query.hierarchy("Store")?;
//! for root in store.hierarchy().root_members()? {
//!     store.include(Operator::Descendants, &root)?;
//! }
//! query.axis_mut(AxisId::Rows)?.add_hierarchy("Store")?;
//!
//! let grid = query.execute(&MemoryEngine::constant(1.0)).await?;
//! println!("{} cells", grid.cells.len());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod catalog;
pub mod selection;
pub mod query;
pub mod planner;
pub mod execution;
pub mod annotate;
pub mod mdx;
pub mod session;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{AxisId, Member, Operator, Rule, Sign};
pub use catalog::{Cube, Hierarchy, HierarchyCatalog, HierarchyInfo, MemoryCatalog};
pub use selection::Selection;
pub use query::{AxisMut, Query, QueryAxis, QueryHierarchy};
pub use planner::{AxisDefinition, HierarchySet, QueryDefinition};
pub use execution::{EngineError, ExecutionEngine, ExecutionStats, GridAxis, MemoryEngine, ResultGrid};
pub use annotate::{AnnotatedAxis, AnnotatedGrid, MemberState};
pub use session::QuerySession;
pub use config::QueryConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid member {member}: not part of hierarchy [{hierarchy}]")]
    InvalidMember { member: String, hierarchy: String },

    #[error("Hierarchy [{hierarchy}] is already placed on axis {axis}")]
    AlreadyPlaced { hierarchy: String, axis: AxisId },

    #[error("Hierarchy [{hierarchy}] is not on axis {axis}")]
    NotPlaced { hierarchy: String, axis: AxisId },

    #[error("Index {index} out of range for axis with {len} hierarchies")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Member {0} is a leaf and cannot be drilled")]
    NotDrillable(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Unknown axis: {0}")]
    UnknownAxis(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Invalid unique name: {0}")]
    InvalidUniqueName(String),

    #[error("Planning error: {0}")]
    PlanError(String),

    #[error("Execution engine failure: {0}")]
    EngineFailure(#[source] EngineError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
