//! Bridge orientation.

use serde::{Deserialize, Serialize};
use strum::VariantArray;

use crate::location::Location;

/// The two orientations a bridge may take. Bridges never run diagonally.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Axis {
    /// Along a row.
    Horizontal,
    /// Along a column.
    Vertical,
}

impl Axis {
    /// Determine the axis along which `a` and `b` line up, if they line up along exactly one.
    ///
    /// Returns [`None`] for diagonal pairs and for `a == b`.
    pub fn between(a: Location, b: Location) -> Option<Self> {
        match (a.0 == b.0, a.1 == b.1) {
            (false, true) => Some(Self::Horizontal),
            (true, false) => Some(Self::Vertical),
            _ => None,
        }
    }

    /// The single step taken when walking forward along this axis.
    pub(crate) fn step(&self) -> (isize, isize) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
        }
    }

    pub(crate) fn orthogonal(&self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The glyph painted on every cell a bridge of `weight` crosses, if `weight` is a legal bridge weight.
    pub(crate) fn glyph(&self, weight: u8) -> Option<char> {
        match (self, weight) {
            (Self::Horizontal, 1) => Some('─'),
            (Self::Horizontal, 2) => Some('═'),
            (Self::Vertical, 1) => Some('│'),
            (Self::Vertical, 2) => Some('║'),
            _ => None,
        }
    }

    /// Walk the cells strictly between `a` and `b`, from the lower coordinate to the higher one.
    pub(crate) fn cells_between(&self, a: Location, b: Location) -> impl Iterator<Item = Location> {
        let (start, end) = if a < b { (a, b) } else { (b, a) };
        let step = self.step();
        std::iter::successors(Some(start.offset_by(step)), move |cursor| Some(cursor.offset_by(step)))
            .take_while(move |cursor| *cursor != end)
    }
}
