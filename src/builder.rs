//! Validated construction of [`Puzzle`]s.

use std::collections::HashSet;

use thiserror::Error;

use crate::location::{Dimension, Location};
use crate::puzzle::{Island, Puzzle};

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum BuilderInvalidReason {
    /// An island was placed outside the bounds specified by `dims` on the builder.
    #[error("island at x={} y={} lies outside the board", location.0, location.1)]
    OutOfBounds {
        /// Where the island was placed.
        location: Location,
    },
    /// Two islands were placed on the same cell.
    #[error("more than one island at x={} y={}", location.0, location.1)]
    DuplicatePosition {
        /// The cell placed on twice.
        location: Location,
    },
    /// An island asked for a total bridge weight no island can carry; valid values are 1 through 8.
    #[error("island at x={} y={} has impossible value {value}", location.0, location.1)]
    InvalidValue {
        /// Where the island was placed.
        location: Location,
        /// The rejected value.
        value: u8,
    },
    /// A board was described with a width or height of zero.
    #[error("board dimensions must be non-zero")]
    ZeroDimension,
}

/// A builder for [`Puzzle`]s, checking every island as it is placed.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Once a builder is invalid it ignores further islands; [`build`](Self::build) reports why.
#[derive(Clone, Debug)]
pub struct PuzzleBuilder {
    // width, height
    dims: (Dimension, Dimension),
    islands: Vec<Island>,
    occupied: HashSet<Location>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl PuzzleBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(x, y)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            islands: Default::default(),
            occupied: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    /// Add an island requiring a total bridge weight of `value` at `location`.
    /// Islands are indexed in the order they are added.
    ///
    /// May cause the builder to enter an invalid state if `location` is out of bounds or taken, or if `value` is not within `1..=8`.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_island(&mut self, location: Location, value: u8) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !location.within(self.dims) {
            self.invalid_reasons.push(BuilderInvalidReason::OutOfBounds { location });
            return self;
        }

        if !(1..=8).contains(&value) {
            self.invalid_reasons.push(BuilderInvalidReason::InvalidValue { location, value });
            return self;
        }

        if !self.occupied.insert(location) {
            self.invalid_reasons.push(BuilderInvalidReason::DuplicatePosition { location });
            return self;
        }

        self.islands.push(Island { location, value });
        self
    }

    /// Shorthand for multiple calls to [`Self::add_island`], with the same conditions.
    pub fn add_islands(&mut self, islands: impl IntoIterator<Item = Island>) -> &mut Self {
        for island in islands {
            self.add_island(island.location, island.value);
        }

        self
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Puzzle`].
    /// If the builder is invalid for any reason, the [`BuilderInvalidReason`]s will indicate why.
    pub fn build(&self) -> Result<Puzzle, Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons.clone());
        }

        Ok(Puzzle {
            dims: self.dims,
            islands: self.islands.clone(),
        })
    }
}
