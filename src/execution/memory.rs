//! In-memory execution engine.
//!
//! This is the reference implementation of `ExecutionEngine`. It expands
//! every output axis into its crossjoin and asks a cell function for each
//! value.
//!
//! ## Limitations
//!
//! - **No aggregation**: values come only from the cell function.
//! - **`non_empty` is ignored**: empty rows and columns are kept.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{AxisId, Member};
use crate::planner::QueryDefinition;
use super::{Cell, EngineError, ExecutionEngine, GridAxis, ResultGrid};

type CellFn = dyn Fn(&[&Member]) -> Option<f64> + Send + Sync;

/// Engine computing cells from a function of their coordinates.
#[derive(Clone)]
pub struct MemoryEngine {
    cell_fn: Arc<CellFn>,
}

impl MemoryEngine {
    /// `cell_fn` receives the members of every output axis position (first
    /// axis first), followed by the slicer members.
    pub fn new<F>(cell_fn: F) -> Self
    where
        F: Fn(&[&Member]) -> Option<f64> + Send + Sync + 'static,
    {
        Self { cell_fn: Arc::new(cell_fn) }
    }

    /// Every cell holds `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(move |_| Some(value))
    }
}

#[async_trait]
impl ExecutionEngine for MemoryEngine {
    async fn execute(&self, definition: &QueryDefinition) -> Result<ResultGrid, EngineError> {
        let slicer: Vec<Member> = definition
            .axis(AxisId::Filter)
            .map(|a| a.hierarchies.iter().flat_map(|h| h.members.iter().cloned()).collect())
            .unwrap_or_default();

        let axes: Vec<GridAxis> = definition
            .output_axes()
            .into_iter()
            .map(|a| GridAxis { axis: a.axis, positions: a.positions() })
            .collect();

        let total: usize = axes.iter().map(|a| a.positions.len()).product();
        let cells = {
            let mut cells = Vec::with_capacity(total);
            let mut coordinates: Vec<&Member> = Vec::new();
            for ordinal in 0..total {
                coordinates.clear();
                let mut rest = ordinal;
                for axis in &axes {
                    let len = axis.positions.len();
                    coordinates.extend(axis.positions[rest % len].iter());
                    rest /= len;
                }
                coordinates.extend(slicer.iter());

                let value = (self.cell_fn)(&coordinates);
                cells.push(Cell {
                    ordinal,
                    value,
                    formatted: value.map(|v| v.to_string()).unwrap_or_default(),
                });
            }
            cells
        };

        Ok(ResultGrid { axes, slicer, cells, ..Default::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{AxisDefinition, HierarchySet};

    fn definition() -> QueryDefinition {
        let set = |h: &str, names: &[&str]| HierarchySet {
            hierarchy: h.to_string(),
            members: names.iter().map(|n| Member::root(h, *n)).collect(),
        };
        QueryDefinition {
            query: "q".into(),
            cube: "Sales".into(),
            non_empty: false,
            axes: vec![
                AxisDefinition { axis: AxisId::Rows, hierarchies: vec![set("Store", &["USA", "Canada"])] },
                AxisDefinition { axis: AxisId::Columns, hierarchies: vec![set("Measures", &["Sales", "Cost"])] },
                AxisDefinition { axis: AxisId::Filter, hierarchies: vec![set("Time", &["1997"])] },
            ],
        }
    }

    #[tokio::test]
    async fn test_cells_follow_coordinates() {
        let engine = MemoryEngine::new(|coords| {
            let names: Vec<_> = coords.iter().map(|m| m.name()).collect();
            match names.as_slice() {
                ["Cost", "Canada", "1997"] => Some(7.0),
                [_, _, "1997"] => Some(1.0),
                _ => None,
            }
        });
        let grid = engine.execute(&definition()).await.unwrap();

        assert_eq!(grid.axes[0].axis, AxisId::Columns);
        assert_eq!(grid.cells.len(), 4);
        assert_eq!(grid.slicer.len(), 1);
        assert_eq!(grid.cell(&[1, 1]).unwrap().value, Some(7.0));
        assert_eq!(grid.cell(&[0, 1]).unwrap().value, Some(1.0));
    }
}
