use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::{Array2, AssignElem};
use serde::{Deserialize, Serialize};

use crate::builder::{BuilderInvalidReason, PuzzleBuilder};
use crate::cell::{self, Field};
use crate::location::{Dimension, Location};

/// Islands are identified by their position in [`Puzzle::islands`].
pub type IslandIndex = usize;

/// A numbered island, asking for bridges of total weight `value` to touch it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Island {
    /// Cell the island sits on.
    pub location: Location,
    /// 1 through 8.
    pub value: u8,
}

/// A board: its dimensions and the islands placed on it. Puzzles are immutable once built.
///
/// [`Puzzle`]s are built using a [`PuzzleBuilder`], with [`Puzzle::new`], or decoded from text with [`Puzzle::decode`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Puzzle {
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) islands: Vec<Island>,
}

impl Puzzle {
    /// Build a puzzle from `islands` on a board of `dims`, rejecting islands off the board, sharing a cell or carrying an impossible value.
    pub fn new(dims: (Dimension, Dimension), islands: impl IntoIterator<Item = Island>) -> Result<Self, Vec<BuilderInvalidReason>> {
        PuzzleBuilder::with_dims(dims)
            .add_islands(islands)
            .build()
    }

    /// Decode a row-major text grid.
    ///
    /// Whitespace is ignored. The digits `1` to `8` place an island of that value; any other character is open water.
    pub fn decode(text: &str, dims: (Dimension, Dimension)) -> Result<Self, Vec<BuilderInvalidReason>> {
        let mut builder = PuzzleBuilder::with_dims(dims);

        for (i, ch) in text.chars().filter(|ch| !ch.is_whitespace()).enumerate() {
            let value = match ch.to_digit(10) {
                Some(value @ 1..=8) => value as u8,
                _ => continue,
            };
            builder.add_island(Location(i % dims.0.get(), i / dims.0.get()), value);
        }

        builder.build()
    }

    /// Board width.
    pub fn width(&self) -> usize {
        self.dims.0.get()
    }

    /// Board height.
    pub fn height(&self) -> usize {
        self.dims.1.get()
    }

    /// All islands, in index order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// The island with the given `index`, if there is one.
    pub fn island(&self, index: IslandIndex) -> Option<&Island> {
        self.islands.get(index)
    }

    /// Project the islands, and nothing else, onto the grid.
    pub(crate) fn as_matrix(&self) -> Array2<Field> {
        let mut ret = Array2::from_shape_simple_fn((self.height(), self.width()), Field::default);

        for (index, island) in self.islands.iter().enumerate() {
            if let Some(ptr) = ret.get_mut(island.location.as_index()) {
                ptr.assign_elem(Field::Island { index, value: island.value });
            }
        }

        ret
    }

    /// Render the board with its islands and no bridges.
    pub fn render_empty(&self) -> String {
        cell::print(&self.as_matrix())
    }

    /// The sum of all island values; twice the total bridge weight of any correct solution.
    pub fn total_value(&self) -> usize {
        self.islands.iter().map(|island| usize::from(island.value)).sum()
    }
}

impl Display for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_empty())
    }
}

/// The compact text notation puzzles are distributed in, e.g. as JSON.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PuzzleData {
    /// Board width; must be non-zero.
    pub width: usize,
    /// Board height; must be non-zero.
    pub height: usize,
    /// Rows concatenated top to bottom; see [`Puzzle::decode`].
    pub data: String,
}

impl TryFrom<&PuzzleData> for Puzzle {
    type Error = Vec<BuilderInvalidReason>;

    fn try_from(value: &PuzzleData) -> Result<Self, Self::Error> {
        match (NonZero::new(value.width), NonZero::new(value.height)) {
            (Some(width), Some(height)) => Self::decode(&value.data, (width, height)),
            _ => Err(vec![BuilderInvalidReason::ZeroDimension]),
        }
    }
}
