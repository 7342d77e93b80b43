//! Per-island and per-component facts derived from a partial solution.

use std::collections::HashMap;

use itertools::Itertools;
use log::trace;
use ndarray::Array2;
use petgraph::visit::{Dfs, VisitMap};
use strum::VariantArray;
use unordered_pair::UnorderedPair;

use crate::axis::Axis;
use crate::cell::Field;
use crate::puzzle::{IslandIndex, Puzzle};
use crate::solution::{Solution, SolutionError};

/// One end of an existing bridge, seen from the island it is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BridgeEnd {
    /// The island at the far end.
    pub to: IslandIndex,
    /// Weight of the bridge.
    pub value: u8,
}

/// What is known about one island under a particular partial solution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IslandMeta {
    /// Index of the island in [`Puzzle::islands`].
    pub index: IslandIndex,
    /// Total weight of the bridges already attached.
    pub current_value: usize,
    /// The island's value.
    pub desired_value: usize,
    /// `desired_value - current_value`, floored at zero.
    pub remaining_value: usize,
    /// Islands in direct line of sight, whether or not a bridge to them could still be added.
    pub neighbours: Vec<IslandIndex>,
    /// The subset of [`Self::neighbours`] which can still take another unit of weight from this island.
    pub active_neighbours: Vec<IslandIndex>,
    /// Existing bridges touching this island.
    pub bridges: Vec<BridgeEnd>,
    /// Index into [`Analysis::dragons`] of the component this island belongs to.
    pub dragon: usize,
}

impl IslandMeta {
    /// Weight of the existing bridge to `other`, 0 if none.
    pub fn weight_to(&self, other: IslandIndex) -> u8 {
        self.bridges.iter()
            .find(|end| end.to == other)
            .map_or(0, |end| end.value)
    }

    /// Whether the island carries exactly its value.
    pub fn is_satisfied(&self) -> bool {
        self.current_value == self.desired_value
    }

    /// Whether the island carries more than its value.
    pub fn is_overfilled(&self) -> bool {
        self.current_value > self.desired_value
    }
}

/// A connected component ("dragon") of islands already joined by bridges.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DragonMeta {
    /// Number of member islands.
    pub size: usize,
    /// Members still short of their value; a dragon without heads can never grow again.
    pub heads: usize,
    /// Member islands in index order.
    pub members: Vec<IslandIndex>,
}

/// Derived state of a puzzle under a partial solution, rebuilt from scratch by [`analyze`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Analysis {
    /// One per island, in index order.
    pub metas: Vec<IslandMeta>,
    /// Connected components over the existing bridges, in order of their lowest island.
    pub dragons: Vec<DragonMeta>,
}

impl Analysis {
    /// The first island which still needs weight but has nobody left to take it from.
    pub fn stranded(&self) -> Option<IslandIndex> {
        self.metas.iter()
            .find(|meta| meta.remaining_value > 0 && meta.active_neighbours.is_empty())
            .map(|meta| meta.index)
    }

    /// The first island carrying more weight than its value.
    pub fn overfilled(&self) -> Option<IslandIndex> {
        self.metas.iter()
            .find(|meta| meta.is_overfilled())
            .map(|meta| meta.index)
    }

    /// The dragon `index` belongs to.
    pub(crate) fn dragon_of(&self, index: IslandIndex) -> &DragonMeta {
        &self.dragons[self.metas[index].dragon]
    }
}

/// Analyze `solution` as laid over `puzzle`.
///
/// The solution must be legal; otherwise the first [`SolutionError`] found is returned and nothing is analyzed.
pub fn analyze(puzzle: &Puzzle, solution: &Solution) -> Result<Analysis, SolutionError> {
    let matrix = solution.legal_matrix(puzzle)?;

    let mut metas = puzzle.islands().iter()
        .enumerate()
        .map(|(index, island)| IslandMeta {
            index,
            current_value: 0,
            desired_value: usize::from(island.value),
            remaining_value: 0,
            neighbours: Vec::new(),
            active_neighbours: Vec::new(),
            bridges: Vec::new(),
            dragon: 0,
        })
        .collect_vec();

    let mut weights = HashMap::with_capacity(solution.bridges().len());
    for bridge in solution.bridges() {
        for (this, other) in [(bridge.from, bridge.to), (bridge.to, bridge.from)] {
            metas[this].current_value += usize::from(bridge.value);
            metas[this].bridges.push(BridgeEnd { to: other, value: bridge.value });
        }
        weights.insert(bridge.key(), bridge.value);
    }
    for meta in metas.iter_mut() {
        meta.remaining_value = meta.desired_value.saturating_sub(meta.current_value);
    }

    for (a, b) in neighbour_pairs(&matrix) {
        let weight = weights.get(&UnorderedPair(a, b)).copied().unwrap_or(0);
        let (a_open, b_open) = (metas[a].remaining_value > 0, metas[b].remaining_value > 0);

        metas[a].neighbours.push(b);
        metas[b].neighbours.push(a);
        if weight < 2 {
            if b_open {
                metas[a].active_neighbours.push(b);
            }
            if a_open {
                metas[b].active_neighbours.push(a);
            }
        }
    }

    let dragons = label_dragons(puzzle, solution, &mut metas);

    trace!(
        target: "solver",
        "analyzed {} islands: {} dragons, {} still open",
        metas.len(),
        dragons.len(),
        dragons.iter().filter(|dragon| dragon.heads > 0).count()
    );

    Ok(Analysis { metas, dragons })
}

/// Scan every row left to right and every column top to bottom, pairing each island with the last one seen.
///
/// A bridge crossing the scan hides everything before it.
fn neighbour_pairs(matrix: &Array2<Field>) -> Vec<(IslandIndex, IslandIndex)> {
    let mut pairs = Vec::new();

    for scan in Axis::VARIANTS {
        let lanes = match scan {
            Axis::Horizontal => matrix.rows(),
            Axis::Vertical => matrix.columns(),
        };

        for lane in lanes {
            let mut last_seen = None;
            for field in lane {
                if field.blocks(*scan) {
                    last_seen = None;
                } else if let Some(current) = field.island() {
                    if let Some(previous) = last_seen {
                        pairs.push((previous, current));
                    }
                    last_seen = Some(current);
                }
            }
        }
    }

    pairs
}

/// Partition the islands into connected components over the existing bridges only.
fn label_dragons(puzzle: &Puzzle, solution: &Solution, metas: &mut [IslandMeta]) -> Vec<DragonMeta> {
    let graph = solution.graph(puzzle);
    let mut dfs = Dfs::empty(&graph);
    let mut dragons = Vec::new();

    for start in 0..metas.len() {
        if dfs.discovered.is_visited(&start) {
            continue;
        }

        dfs.move_to(start);
        let mut members = Vec::new();
        while let Some(index) = dfs.next(&graph) {
            metas[index].dragon = dragons.len();
            members.push(index);
        }
        members.sort_unstable();

        dragons.push(DragonMeta {
            size: members.len(),
            heads: members.iter().filter(|index| !metas[**index].is_satisfied()).count(),
            members,
        });
    }

    dragons
}
