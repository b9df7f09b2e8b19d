//! Query execution — the engine contract and the result grid it returns.
//!
//! Engines receive a finished [`QueryDefinition`] and produce a
//! [`ResultGrid`]. Whatever error an engine reports is carried through to
//! the caller unchanged as [`crate::Error::EngineFailure`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AxisId, Member};
use crate::planner::QueryDefinition;

pub use memory::MemoryEngine;

/// Error type engines report; opaque to this crate.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// ExecutionEngine Trait
// ============================================================================

/// Executes query definitions. May block on I/O; there is no timeout or
/// cancellation at this layer.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    async fn execute(&self, definition: &QueryDefinition) -> Result<ResultGrid, EngineError>;
}

// ============================================================================
// Result grid
// ============================================================================

/// Cells of an executed query plus the positions along each output axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultGrid {
    /// Output axes by ascending ordinal (COLUMNS first).
    pub axes: Vec<GridAxis>,
    /// Members the grid was sliced by.
    pub slicer: Vec<Member>,
    /// Cells in ordinal order: the first axis varies fastest.
    pub cells: Vec<Cell>,
    pub stats: ExecutionStats,
}

impl ResultGrid {
    pub fn axis(&self, id: AxisId) -> Option<&GridAxis> {
        self.axes.iter().find(|a| a.axis == id)
    }

    /// Cell at one coordinate per output axis.
    pub fn cell(&self, coordinates: &[usize]) -> Option<&Cell> {
        if coordinates.len() != self.axes.len() {
            return None;
        }
        let mut ordinal = 0;
        let mut stride = 1;
        for (coord, axis) in coordinates.iter().zip(&self.axes) {
            if *coord >= axis.positions.len() {
                return None;
            }
            ordinal += coord * stride;
            stride *= axis.positions.len();
        }
        self.cells.get(ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub axis: AxisId,
    /// One member per hierarchy on the axis, outermost first.
    pub positions: Vec<Vec<Member>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub ordinal: usize,
    pub value: Option<f64>,
    pub formatted: String,
}

/// Execution statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub executed_at: Option<DateTime<Utc>>,
    pub execution_time_ms: u64,
}
