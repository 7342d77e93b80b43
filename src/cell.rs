//! Cells of a puzzle projected onto its grid.

use ndarray::Array2;

use crate::axis::Axis;
use crate::puzzle::IslandIndex;

/// Placeholder printed for cells holding neither an island nor a bridge.
pub(crate) const EMPTY_GLYPH: char = '·';

/// One cell of a puzzle projected onto its grid, together with whatever bridges a solution lays over it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Field {
    /// An island, by its index in the puzzle, and its desired value.
    Island {
        /// Index in [`Puzzle::islands`](crate::Puzzle::islands).
        index: IslandIndex,
        /// The island's value.
        value: u8,
    },
    /// A cell crossed by a bridge running along `axis`.
    Bridge {
        /// Direction the bridge runs.
        axis: Axis,
        /// 1 or 2.
        weight: u8,
    },
    /// Open water.
    #[default]
    Empty,
}

impl Field {
    pub(crate) fn island(&self) -> Option<IslandIndex> {
        match self {
            Self::Island { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Whether a line-of-sight scan along `scan` is interrupted by this cell.
    ///
    /// Only bridges crossing the scan direction block it; a bridge running with the scan is just the span between two neighbours.
    pub(crate) fn blocks(&self, scan: Axis) -> bool {
        matches!(self, Self::Bridge { axis, .. } if *axis == scan.orthogonal())
    }

    pub(crate) fn glyph(&self) -> char {
        match self {
            Self::Island { value, .. } => char::from_digit(u32::from(*value), 10).unwrap_or('?'),
            Self::Bridge { axis, weight } => axis.glyph(*weight).unwrap_or('?'),
            Self::Empty => EMPTY_GLYPH,
        }
    }
}

/// Dump the specified [`Array2`], one newline-terminated line per row.
pub(crate) fn print(grid: &Array2<Field>) -> String {
    let mut out = String::with_capacity(grid.nrows() * (grid.ncols() + 1));

    for row in grid.rows() {
        for field in row {
            out.push(field.glyph());
        }
        out.push('\n');
    }

    out
}
