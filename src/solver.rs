//! The step loop driving the tactic catalog.

use log::{debug, trace, warn};
use thiserror::Error;

use crate::analyzer::analyze;
use crate::puzzle::{IslandIndex, Puzzle};
use crate::solution::{Solution, SolutionError};
use crate::tactics::{Tactic, TacticQuery, TACTICS};

/// Reasons a [`Solver`] may fail.
///
/// Running out of applicable tactics is not a failure; the solver hands back whatever it proved.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum SolverFailure {
    /// The solution to continue from is not legal for the puzzle.
    #[error("illegal solution: {0}")]
    Illegal(#[from] SolutionError),
    /// The partial solution cannot be completed: some island can no longer reach its value, or has passed it.
    #[error("contradiction at island {island}: {reason}")]
    Contradiction {
        /// The island the contradiction was found at.
        island: IslandIndex,
        /// What went wrong there.
        reason: &'static str,
    },
}

/// The outcome of one successful step: the new solution and the tactic which produced it.
#[derive(Clone, Debug)]
pub struct SolveStep {
    /// The solution after the step, a clone of the one stepped from plus whatever the tactic added.
    pub solution: Solution,
    /// The tactic that made progress.
    pub tactic: &'static Tactic,
    /// The island the tactic was applied to.
    pub island: IslandIndex,
}

/// A deductive solver, configured with the ordered tactics it tries and an optional cap on the number of steps.
///
/// The default solver uses [`TACTICS`] and no cap; every tactic in the catalog only adds weight, so solving always ends.
#[derive(Clone, Copy, Debug)]
pub struct Solver {
    tactics: &'static [Tactic],
    step_limit: Option<usize>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// A solver with the canonical catalog and no step limit.
    pub fn new() -> Self {
        Self {
            tactics: TACTICS,
            step_limit: None,
        }
    }

    /// Use `tactics`, in order, instead of the canonical catalog.
    pub fn with_tactics(mut self, tactics: &'static [Tactic]) -> Self {
        self.tactics = tactics;
        self
    }

    /// Stop [`solve_from`](Self::solve_from) after `limit` steps even if more progress could be made.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Run the first tactic which makes progress, trying tactics in catalog order and, within a tactic, islands in index order.
    ///
    /// `solution` is left untouched; on progress a new solution is returned. Returns `Ok(None)` once no tactic applies.
    pub fn solve_step(&self, puzzle: &Puzzle, solution: &Solution) -> Result<Option<SolveStep>, SolverFailure> {
        let analysis = analyze(puzzle, solution)?;

        if let Some(island) = analysis.overfilled() {
            return Err(SolverFailure::Contradiction { island, reason: "carries more than its value" });
        }
        if let Some(island) = analysis.stranded() {
            return Err(SolverFailure::Contradiction { island, reason: "needs more but has no active neighbours" });
        }

        for tactic in self.tactics {
            for index in 0..analysis.metas.len() {
                let query = TacticQuery::new(puzzle, &analysis, index);
                if !tactic.is_applicable(&query) {
                    continue;
                }

                let mut next = solution.clone();
                if !tactic.apply(&query, &mut next)? {
                    continue;
                }

                debug_assert!(next.is_legal(puzzle), "tactic {:?} produced an illegal solution", tactic.label);
                let overfilled = next.weights(puzzle).iter()
                    .zip(puzzle.islands())
                    .position(|(weight, island)| *weight > usize::from(island.value));
                if let Some(island) = overfilled {
                    return Err(SolverFailure::Contradiction { island, reason: "would carry more than its value" });
                }

                debug!(target: "solver", "island {}: {}", index, tactic.label);
                return Ok(Some(SolveStep {
                    solution: next,
                    tactic,
                    island: index,
                }));
            }
        }

        trace!(target: "solver", "no tactic applies");
        Ok(None)
    }

    /// Iterate over successive steps starting from `solution`, ending at the fixpoint or after the first failure.
    pub fn steps<'a>(&'a self, puzzle: &'a Puzzle, solution: Solution) -> Steps<'a> {
        Steps {
            solver: self,
            puzzle,
            current: Some(solution),
        }
    }

    /// Step from `solution` until no tactic applies (or the step limit is hit) and return the possibly incomplete result.
    pub fn solve_from(&self, puzzle: &Puzzle, solution: &Solution) -> Result<Solution, SolverFailure> {
        let mut current = solution.clone();
        let mut taken = 0;

        for step in self.steps(puzzle, solution.clone()) {
            if self.step_limit.is_some_and(|limit| taken >= limit) {
                warn!(target: "solver", "step limit of {} reached with progress left", taken);
                break;
            }
            current = step?.solution;
            taken += 1;
        }

        trace!(
            target: "solver",
            "took {} steps, weight {} of {}",
            taken,
            current.total_weight(),
            puzzle.total_value() / 2
        );
        Ok(current)
    }

    /// Solve `puzzle` from scratch.
    pub fn solve(&self, puzzle: &Puzzle) -> Result<Solution, SolverFailure> {
        self.solve_from(puzzle, &Solution::default())
    }
}

/// Iterator over the steps of a solve; see [`Solver::steps`].
pub struct Steps<'a> {
    solver: &'a Solver,
    puzzle: &'a Puzzle,
    current: Option<Solution>,
}

impl Iterator for Steps<'_> {
    type Item = Result<SolveStep, SolverFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        match self.solver.solve_step(self.puzzle, &current) {
            Ok(Some(step)) => {
                self.current = Some(step.solution.clone());
                Some(Ok(step))
            }
            Ok(None) => None,
            Err(failure) => Some(Err(failure)),
        }
    }
}

/// [`Solver::solve_step`] with the default solver.
pub fn solve_step(puzzle: &Puzzle, solution: &Solution) -> Result<Option<SolveStep>, SolverFailure> {
    Solver::default().solve_step(puzzle, solution)
}

/// [`Solver::solve_from`] with the default solver.
pub fn solve_from(puzzle: &Puzzle, solution: &Solution) -> Result<Solution, SolverFailure> {
    Solver::default().solve_from(puzzle, solution)
}

/// [`Solver::solve`] with the default solver.
pub fn solve(puzzle: &Puzzle) -> Result<Solution, SolverFailure> {
    Solver::default().solve(puzzle)
}
