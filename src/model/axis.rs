//! Logical output axes of a query.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Axis identifier. Ordinals follow the MDX convention, with the slicer at -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisId {
    Filter,
    Columns,
    Rows,
    Pages,
    Chapters,
    Sections,
}

impl AxisId {
    pub fn from_ordinal(ordinal: i32) -> Result<Self> {
        match ordinal {
            -1 => Ok(AxisId::Filter),
            0 => Ok(AxisId::Columns),
            1 => Ok(AxisId::Rows),
            2 => Ok(AxisId::Pages),
            3 => Ok(AxisId::Chapters),
            4 => Ok(AxisId::Sections),
            other => Err(Error::UnknownAxis(other.to_string())),
        }
    }

    pub fn ordinal(self) -> i32 {
        match self {
            AxisId::Filter => -1,
            AxisId::Columns => 0,
            AxisId::Rows => 1,
            AxisId::Pages => 2,
            AxisId::Chapters => 3,
            AxisId::Sections => 4,
        }
    }

    pub fn is_filter(self) -> bool {
        self == AxisId::Filter
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AxisId::Filter => "FILTER",
            AxisId::Columns => "COLUMNS",
            AxisId::Rows => "ROWS",
            AxisId::Pages => "PAGES",
            AxisId::Chapters => "CHAPTERS",
            AxisId::Sections => "SECTIONS",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        for ordinal in -1..=4 {
            assert_eq!(AxisId::from_ordinal(ordinal).unwrap().ordinal(), ordinal);
        }
        assert!(matches!(AxisId::from_ordinal(9), Err(Error::UnknownAxis(_))));
    }
}
