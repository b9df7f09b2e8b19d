//! Query configuration.

use serde::{Deserialize, Serialize};

use crate::model::AxisId;

/// Per-query settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Axes the query exposes, in display order.
    pub axes: Vec<AxisId>,
    /// Render `NON EMPTY` on every output axis.
    pub non_empty: bool,
    /// Upper bound on positions (crossjoin size) per axis.
    pub max_positions: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            axes: vec![AxisId::Columns, AxisId::Rows, AxisId::Filter],
            non_empty: true,
            max_positions: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: QueryConfig = serde_json::from_str(r#"{"non_empty": false}"#).unwrap();
        assert!(!config.non_empty);
        assert_eq!(config.axes, QueryConfig::default().axes);
        assert_eq!(config.max_positions, 100_000);
    }
}
