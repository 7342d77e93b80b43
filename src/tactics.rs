//! The ordered catalog of deduction rules.
//!
//! Every tactic looks at one island at a time. It only ever adds bridges or upgrades single bridges to doubles,
//! so a solve can take no more steps than the puzzle has units of bridge weight.

use std::fmt::{Debug, Formatter};

use crate::analyzer::{Analysis, IslandMeta};
use crate::puzzle::{IslandIndex, Puzzle};
use crate::solution::Solution;
use crate::solver::SolverFailure;

/// Everything a tactic may look at: the puzzle, the analysis of the current solution, and the island under consideration.
pub struct TacticQuery<'a> {
    /// The puzzle being solved.
    pub puzzle: &'a Puzzle,
    /// The analysis of the solution the tactic is applied to.
    pub analysis: &'a Analysis,
    /// The island under consideration.
    pub index: IslandIndex,
    /// Shorthand for `analysis.metas[index]`.
    pub meta: &'a IslandMeta,
}

impl<'a> TacticQuery<'a> {
    /// Build the query for island `index`.
    pub(crate) fn new(puzzle: &'a Puzzle, analysis: &'a Analysis, index: IslandIndex) -> Self {
        Self {
            puzzle,
            analysis,
            index,
            meta: &analysis.metas[index],
        }
    }

    fn other(&self, index: IslandIndex) -> &IslandMeta {
        &self.analysis.metas[index]
    }

    /// How much more weight the bridge to `other` could carry, bounded by both what `other` still needs and the double-bridge limit.
    fn capacity(&self, other: IslandIndex) -> usize {
        let open_lanes = 2 - usize::from(self.meta.weight_to(other).min(2));
        self.other(other).remaining_value.min(open_lanes)
    }

    /// Whether adding `units` between this island and `other` would finish off every head of the merged dragon
    /// while islands outside it remain.
    fn isolates(&self, other: IslandIndex, units: usize) -> bool {
        let theirs = self.other(other);
        let mine = self.analysis.dragon_of(self.index);
        let (size, heads) = if theirs.dragon == self.meta.dragon {
            (mine.size, mine.heads)
        } else {
            let dragon = self.analysis.dragon_of(other);
            (mine.size + dragon.size, mine.heads + dragon.heads)
        };
        let closed = usize::from(self.meta.remaining_value == units) + usize::from(theirs.remaining_value == units);

        size < self.analysis.metas.len() && heads == closed
    }

    /// [`Self::capacity`], less whatever would leave a finished dragon cut off from the rest of the board.
    fn open_capacity(&self, other: IslandIndex) -> usize {
        (1..=self.capacity(other))
            .take_while(|units| !self.isolates(other, *units))
            .last()
            .unwrap_or(0)
    }

    fn contradiction(&self, reason: &'static str) -> SolverFailure {
        SolverFailure::Contradiction { island: self.index, reason }
    }
}

/// A named deduction rule.
///
/// [`is_applicable`](Self::is_applicable) is a cheap precondition on the island; [`apply`](Self::apply) edits the solution it is given
/// and reports whether it added anything. A tactic whose precondition holds may still find nothing to add.
pub struct Tactic {
    /// Human-readable description of the rule.
    pub label: &'static str,
    is_applicable: fn(&TacticQuery) -> bool,
    apply: fn(&TacticQuery, &mut Solution) -> Result<bool, SolverFailure>,
}

impl Tactic {
    /// Whether the rule's precondition holds for the queried island.
    pub fn is_applicable(&self, query: &TacticQuery) -> bool {
        (self.is_applicable)(query)
    }

    /// Add whatever the rule proves to `solution`, returning whether anything was added.
    pub fn apply(&self, query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
        (self.apply)(query, solution)
    }
}

impl Debug for Tactic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tactic").field("label", &self.label).finish()
    }
}

/// The canonical catalog, cheapest and safest rules first.
pub static TACTICS: &[Tactic] = &[
    Tactic {
        label: "Add remaining bridges for an island with one active neighbour",
        is_applicable: |q| q.meta.active_neighbours.len() == 1 && q.meta.remaining_value > 0,
        apply: complete_single_neighbour,
    },
    Tactic {
        label: "A '3' with two neighbours must have at least one bridge to each",
        is_applicable: covers_every_neighbour::<3, 2>,
        apply: bridge_every_neighbour::<3, 2>,
    },
    Tactic {
        label: "A '4' with two neighbours must have two bridges to each",
        is_applicable: covers_every_neighbour::<4, 2>,
        apply: bridge_every_neighbour::<4, 2>,
    },
    Tactic {
        label: "A '5' with three neighbours must have at least one bridge to each",
        is_applicable: covers_every_neighbour::<5, 3>,
        apply: bridge_every_neighbour::<5, 3>,
    },
    Tactic {
        label: "A '6' with three neighbours must have two bridges to each",
        is_applicable: covers_every_neighbour::<6, 3>,
        apply: bridge_every_neighbour::<6, 3>,
    },
    Tactic {
        label: "A '7' with four neighbours must have at least one bridge to each",
        is_applicable: covers_every_neighbour::<7, 4>,
        apply: bridge_every_neighbour::<7, 4>,
    },
    Tactic {
        label: "An '8' with four neighbours must have two bridges to each",
        is_applicable: covers_every_neighbour::<8, 4>,
        apply: bridge_every_neighbour::<8, 4>,
    },
    Tactic {
        label: "A '4' with three neighbours and a single bridge to a finished one must bridge the other two",
        is_applicable: four_beside_finished_neighbour,
        apply: bridge_every_neighbour::<4, 3>,
    },
    Tactic {
        label: "A '3' with three neighbours, two of them a '1' and a '2', must bridge the third",
        is_applicable: |q| q.meta.neighbours.len() == 3 && q.meta.desired_value == 3,
        apply: three_beside_one_and_two,
    },
    Tactic {
        label: "A '2' with two neighbours, one of them a '1' or a '2', must bridge the other",
        is_applicable: |q| q.meta.neighbours.len() == 2 && q.meta.desired_value == 2,
        apply: two_beside_small_neighbour,
    },
    Tactic {
        label: "An island needing two or more with two active neighbours must bridge B if A can only take one",
        is_applicable: |q| q.meta.active_neighbours.len() == 2 && q.meta.remaining_value > 1,
        apply: two_active_neighbours,
    },
    Tactic {
        label: "An island needing more than its other active neighbours can give must bridge the rest",
        is_applicable: |q| q.meta.remaining_value > 0 && !q.meta.active_neighbours.is_empty(),
        apply: exceed_other_capacity,
    },
    Tactic {
        label: "Do not close off a finished group of islands while others remain",
        is_applicable: |q| q.meta.remaining_value > 0 && q.analysis.dragons.len() > 1,
        apply: avoid_isolation,
    },
];

fn add_units(query: &TacticQuery, solution: &mut Solution, other: IslandIndex, units: usize) -> Result<(), SolverFailure> {
    for _ in 0..units {
        solution.add_bridge(query.index, other)
            .map_err(|_| query.contradiction("needs a third bridge to one neighbour"))?;
    }

    Ok(())
}

fn complete_single_neighbour(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    let other = query.meta.active_neighbours[0];
    let needed = query.meta.remaining_value;
    if needed > query.capacity(other) {
        return Err(query.contradiction("needs more than its only active neighbour can take"));
    }

    add_units(query, solution, other, needed)?;
    Ok(true)
}

fn covers_every_neighbour<const VALUE: usize, const NEIGHBOURS: usize>(query: &TacticQuery) -> bool {
    query.meta.neighbours.len() == NEIGHBOURS && query.meta.desired_value == VALUE
}

/// Bridge every neighbour, doubly when `VALUE` leaves no slack over `NEIGHBOURS` double bridges.
fn bridge_every_neighbour<const VALUE: usize, const NEIGHBOURS: usize>(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    let double = VALUE >= 2 * NEIGHBOURS;
    Ok(query.meta.neighbours.iter().fold(false, |changed, other| {
        let added = if double {
            solution.ensure_two_bridges(query.index, *other)
        } else {
            solution.ensure_one_bridge(query.index, *other)
        };
        changed | added
    }))
}

fn four_beside_finished_neighbour(query: &TacticQuery) -> bool {
    covers_every_neighbour::<4, 3>(query)
        && query.meta.bridges.iter().any(|end| end.value == 1 && query.other(end.to).is_satisfied())
}

fn three_beside_one_and_two(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    // a '3' giving 1 to the '1' and 2 to the '2' would seal all three off
    let others: Vec<_> = query.meta.neighbours.iter()
        .copied()
        .filter(|other| query.other(*other).desired_value != 1)
        .collect();
    let [first, second] = others[..] else {
        return Ok(false);
    };

    let mut changed = false;
    if query.other(first).desired_value == 2 {
        changed |= solution.ensure_one_bridge(query.index, second);
    }
    if query.other(second).desired_value == 2 {
        changed |= solution.ensure_one_bridge(query.index, first);
    }

    Ok(changed)
}

fn two_beside_small_neighbour(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    let [first, second] = query.meta.neighbours[..] else {
        return Ok(false);
    };

    let mut changed = false;
    if query.other(first).desired_value <= 2 {
        changed |= solution.ensure_one_bridge(query.index, second);
    }
    if query.other(second).desired_value <= 2 {
        changed |= solution.ensure_one_bridge(query.index, first);
    }

    Ok(changed)
}

fn two_active_neighbours(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    let [first, second] = query.meta.active_neighbours[..] else {
        return Ok(false);
    };

    for (limited, other) in [(first, second), (second, first)] {
        if query.capacity(limited) == 1 {
            add_units(query, solution, other, 1)?;
            return Ok(true);
        }
    }

    Ok(false)
}

/// Give every neighbour whatever the others cannot cover between them, given per-neighbour limits from `capacity`.
fn cover_shortfall(
    query: &TacticQuery,
    solution: &mut Solution,
    capacity: impl Fn(IslandIndex) -> usize,
    reason: &'static str,
) -> Result<bool, SolverFailure> {
    let capacities: Vec<_> = query.meta.active_neighbours.iter()
        .map(|other| (*other, capacity(*other)))
        .collect();
    let total: usize = capacities.iter().map(|(_, capacity)| capacity).sum();
    let needed = query.meta.remaining_value;
    if total < needed {
        return Err(query.contradiction(reason));
    }

    let mut changed = false;
    for (other, capacity) in capacities {
        let elsewhere = total - capacity;
        if needed > elsewhere {
            add_units(query, solution, other, needed - elsewhere)?;
            changed = true;
        }
    }

    Ok(changed)
}

fn exceed_other_capacity(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    cover_shortfall(query, solution, |other| query.capacity(other), "needs more than all its neighbours can take")
}

fn avoid_isolation(query: &TacticQuery, solution: &mut Solution) -> Result<bool, SolverFailure> {
    cover_shortfall(
        query,
        solution,
        |other| query.open_capacity(other),
        "cannot be finished without cutting a group of islands off",
    )
}
