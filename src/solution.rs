use std::collections::HashSet;

use itertools::Itertools;
use ndarray::{Array2, AssignElem};
use petgraph::algo::connected_components;
use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::axis::Axis;
use crate::cell::{self, Field};
use crate::location::Location;
use crate::puzzle::{IslandIndex, Puzzle};

/// Reasons a [`Solution`] may be illegal for a given [`Puzzle`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum SolutionError {
    /// A bridge names an island the puzzle does not have.
    #[error("no such island: {index}")]
    UnknownIsland {
        /// The index with no island behind it.
        index: IslandIndex,
    },
    /// A bridge does not have `from < to`.
    #[error("bridge {from}-{to} is not normalized")]
    UnnormalizedBridge {
        /// The stored `from`, not less than `to`.
        from: IslandIndex,
        /// The stored `to`.
        to: IslandIndex,
    },
    /// A bridge carries a weight other than 1 or 2.
    #[error("bridge {from}-{to} has invalid weight {value}")]
    InvalidWeight {
        /// Lower island of the bridge.
        from: IslandIndex,
        /// Higher island of the bridge.
        to: IslandIndex,
        /// The offending weight.
        value: u8,
    },
    /// A bridge joins two islands sharing neither a row nor a column, or an island to itself.
    #[error("bridge {from}-{to} is neither horizontal nor vertical")]
    InvalidBridge {
        /// Lower island of the bridge.
        from: IslandIndex,
        /// Higher island of the bridge.
        to: IslandIndex,
    },
    /// The same pair of islands appears in more than one bridge.
    #[error("bridge {from}-{to} appears more than once")]
    DuplicateBridge {
        /// Lower island of the repeated pair.
        from: IslandIndex,
        /// Higher island of the repeated pair.
        to: IslandIndex,
    },
    /// A bridge runs over an island or over another bridge.
    #[error("bridges crossing at x={} y={}", location.0, location.1)]
    Crossing {
        /// The first cell found painted twice.
        location: Location,
    },
}

/// A straight connection of weight 1 or 2 between two islands, stored with `from < to`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    /// The lower island index.
    pub from: IslandIndex,
    /// The higher island index.
    pub to: IslandIndex,
    /// Weight, 1 for a single bridge and 2 for a double.
    pub value: u8,
}

impl Bridge {
    /// A bridge between `a` and `b` in either order, normalized so that `from < to`.
    pub fn new(a: IslandIndex, b: IslandIndex, value: u8) -> Self {
        let (from, to) = if a < b { (a, b) } else { (b, a) };
        Self { from, to, value }
    }

    /// The unordered pair of islands this bridge connects.
    pub fn key(&self) -> UnorderedPair<IslandIndex> {
        UnorderedPair(self.from, self.to)
    }

    fn joins(&self, a: IslandIndex, b: IslandIndex) -> bool {
        self.key() == UnorderedPair(a, b)
    }
}

/// A set of bridges laid over a puzzle, possibly partial, possibly illegal.
///
/// An empty solution is a legal solution too. Solving never edits a solution in place; every step works on a [`Clone`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    bridges: Vec<Bridge>,
}

impl Solution {
    /// Wrap `bridges` as given, without checking them; see [`Self::validate`].
    pub fn new(bridges: Vec<Bridge>) -> Self {
        Self { bridges }
    }

    /// The bridges, in the order they were placed.
    pub fn bridges(&self) -> &[Bridge] {
        &self.bridges
    }

    /// The weight currently connecting `a` and `b`, 0 if none.
    pub fn weight_between(&self, a: IslandIndex, b: IslandIndex) -> u8 {
        self.bridges.iter()
            .find(|bridge| bridge.joins(a, b))
            .map_or(0, |bridge| bridge.value)
    }

    /// Sum of bridge weights touching each island, indexed like [`Puzzle::islands`].
    pub fn weights(&self, puzzle: &Puzzle) -> Vec<usize> {
        let mut weights = vec![0; puzzle.islands.len()];
        for bridge in &self.bridges {
            for end in [bridge.from, bridge.to] {
                if let Some(weight) = weights.get_mut(end) {
                    *weight += usize::from(bridge.value);
                }
            }
        }

        weights
    }

    /// Total weight over all bridges.
    pub fn total_weight(&self) -> usize {
        self.bridges.iter().map(|bridge| usize::from(bridge.value)).sum()
    }

    /// Check every bridge in order, then the projection of the whole set, returning the first problem found.
    ///
    /// Per bridge: both islands exist, `from < to`, the weight is 1 or 2, the islands share exactly one axis and the pair is not repeated.
    pub fn validate(&self, puzzle: &Puzzle) -> Result<(), SolutionError> {
        self.legal_matrix(puzzle).map(|_| ())
    }

    /// [`Self::validate`], keeping the projection it builds on success.
    pub(crate) fn legal_matrix(&self, puzzle: &Puzzle) -> Result<Array2<Field>, SolutionError> {
        let mut seen = HashSet::with_capacity(self.bridges.len());

        for &Bridge { from, to, value } in &self.bridges {
            let (Some(a), Some(b)) = (puzzle.island(from), puzzle.island(to)) else {
                let index = if puzzle.island(from).is_none() { from } else { to };
                return Err(SolutionError::UnknownIsland { index });
            };
            if from >= to {
                return Err(SolutionError::UnnormalizedBridge { from, to });
            }
            if !(1..=2).contains(&value) {
                return Err(SolutionError::InvalidWeight { from, to, value });
            }
            if Axis::between(a.location, b.location).is_none() {
                return Err(SolutionError::InvalidBridge { from, to });
            }
            if !seen.insert(UnorderedPair(from, to)) {
                return Err(SolutionError::DuplicateBridge { from, to });
            }
        }

        self.to_matrix(puzzle)
    }

    /// Shorthand for [`Self::validate`] succeeding.
    pub fn is_legal(&self, puzzle: &Puzzle) -> bool {
        self.validate(puzzle).is_ok()
    }

    /// Project `puzzle` and these bridges onto the grid.
    ///
    /// Every bridge paints the cells strictly between its islands; running into anything already painted is a [`Crossing`](SolutionError::Crossing).
    /// A bridge weighing anything but 1 or 2 is an [`InvalidWeight`](SolutionError::InvalidWeight).
    /// Nothing is returned unless every bridge fits.
    pub fn to_matrix(&self, puzzle: &Puzzle) -> Result<Array2<Field>, SolutionError> {
        let mut matrix = puzzle.as_matrix();

        for bridge in &self.bridges {
            let a = puzzle.island(bridge.from).ok_or(SolutionError::UnknownIsland { index: bridge.from })?;
            let b = puzzle.island(bridge.to).ok_or(SolutionError::UnknownIsland { index: bridge.to })?;
            let axis = Axis::between(a.location, b.location)
                .ok_or(SolutionError::InvalidBridge { from: bridge.from, to: bridge.to })?;
            if !(1..=2).contains(&bridge.value) {
                return Err(SolutionError::InvalidWeight { from: bridge.from, to: bridge.to, value: bridge.value });
            }

            for location in axis.cells_between(a.location, b.location) {
                let ptr = &mut matrix[location.as_index()];
                if *ptr != Field::Empty {
                    return Err(SolutionError::Crossing { location });
                }
                ptr.assign_elem(Field::Bridge { axis, weight: bridge.value });
            }
        }

        Ok(matrix)
    }

    /// Render the board as text: island digits, a glyph per bridge cell (`─ ═ │ ║`) and `·` elsewhere.
    pub fn render(&self, puzzle: &Puzzle) -> Result<String, SolutionError> {
        self.to_matrix(puzzle).map(|matrix| cell::print(&matrix))
    }

    /// Whether this solution solves `puzzle`: it is legal, every island carries exactly its value, and all islands are connected.
    pub fn is_correct(&self, puzzle: &Puzzle) -> bool {
        if !self.is_legal(puzzle) {
            return false;
        }

        let satisfied = self.weights(puzzle).iter()
            .zip_eq(puzzle.islands.iter())
            .all(|(weight, island)| *weight == usize::from(island.value));

        satisfied && (puzzle.islands.is_empty() || connected_components(&self.graph(puzzle)) == 1)
    }

    /// The islands as nodes, joined by an edge per bridge weighted by its value.
    pub(crate) fn graph(&self, puzzle: &Puzzle) -> UnGraphMap<IslandIndex, u8> {
        let mut graph = UnGraphMap::with_capacity(puzzle.islands.len(), self.bridges.len());
        for index in 0..puzzle.islands.len() {
            graph.add_node(index);
        }
        for bridge in &self.bridges {
            graph.add_edge(bridge.from, bridge.to, bridge.value);
        }

        graph
    }

    fn position(&self, a: IslandIndex, b: IslandIndex) -> Option<usize> {
        self.bridges.iter().position(|bridge| bridge.joins(a, b))
    }

    /// Make sure at least one bridge joins `a` and `b`. Returns whether anything changed.
    pub fn ensure_one_bridge(&mut self, a: IslandIndex, b: IslandIndex) -> bool {
        if self.position(a, b).is_some() {
            return false;
        }

        self.bridges.push(Bridge::new(a, b, 1));
        true
    }

    /// Make sure a double bridge joins `a` and `b`. Returns whether anything changed.
    pub fn ensure_two_bridges(&mut self, a: IslandIndex, b: IslandIndex) -> bool {
        match self.position(a, b) {
            Some(i) if self.bridges[i].value >= 2 => false,
            Some(i) => {
                self.bridges[i] = Bridge::new(a, b, 2);
                true
            }
            None => {
                self.bridges.push(Bridge::new(a, b, 2));
                true
            }
        }
    }

    /// Add one unit of weight between `a` and `b`, upgrading a single bridge to a double.
    ///
    /// Fails with [`InvalidWeight`](SolutionError::InvalidWeight) if a double bridge is already there.
    pub fn add_bridge(&mut self, a: IslandIndex, b: IslandIndex) -> Result<(), SolutionError> {
        match self.position(a, b) {
            Some(i) if self.bridges[i].value >= 2 => {
                let bridge = self.bridges[i];
                Err(SolutionError::InvalidWeight { from: bridge.from, to: bridge.to, value: bridge.value + 1 })
            }
            Some(i) => {
                self.bridges[i] = Bridge::new(a, b, 2);
                Ok(())
            }
            None => {
                self.bridges.push(Bridge::new(a, b, 1));
                Ok(())
            }
        }
    }

    /// Cycle the connection between `a` and `b` through none, single, double and back to none.
    pub fn toggle_bridge(&mut self, a: IslandIndex, b: IslandIndex) {
        match self.position(a, b) {
            Some(i) if self.bridges[i].value >= 2 => {
                self.bridges.remove(i);
            }
            Some(i) => self.bridges[i] = Bridge::new(a, b, 2),
            None => self.bridges.push(Bridge::new(a, b, 1)),
        }
    }

    /// A copy of this solution with the connection between `a` and `b` toggled; see [`Self::toggle_bridge`].
    pub fn toggled(&self, a: IslandIndex, b: IslandIndex) -> Self {
        let mut ret = self.clone();
        ret.toggle_bridge(a, b);
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_keeps_bridges_normalized() {
        let mut solution = Solution::default();
        assert!(solution.ensure_one_bridge(4, 2));
        assert!(!solution.ensure_one_bridge(2, 4));
        assert_eq!(solution.bridges(), &[Bridge { from: 2, to: 4, value: 1 }]);

        assert!(solution.ensure_two_bridges(4, 2));
        assert!(!solution.ensure_two_bridges(2, 4));
        assert_eq!(solution.weight_between(4, 2), 2);
        assert_eq!(
            solution.add_bridge(2, 4),
            Err(SolutionError::InvalidWeight { from: 2, to: 4, value: 3 })
        );
    }

    #[test]
    fn toggle_cycles_back_to_nothing() {
        let none = Solution::default();
        let single = none.toggled(1, 0);
        let double = single.toggled(0, 1);
        let back = double.toggled(0, 1);

        assert_eq!(single.weight_between(0, 1), 1);
        assert_eq!(double.weight_between(0, 1), 2);
        assert_eq!(back, none);
        assert!(none.bridges().is_empty());
    }
}
