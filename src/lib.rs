#![warn(missing_docs)]

//! # `hashi`
//!
//! A deductive solver for [Hashiwokakero](https://en.wikipedia.org/wiki/Hashiwokakero), also sold as "Bridges".
//! Begin by building a [`Puzzle`] with a [`PuzzleBuilder`], with [`Puzzle::new`], or by decoding text with [`Puzzle::decode`].
//! Then call [`solve()`], yielding a [`Solution`] which can be rendered back to text with [`Solution::render`].
//!
//! # Internals
//! The solver never guesses. Each step re-derives everything it knows about the current partial solution from scratch,
//! then proves one more piece of it:
//!
//! 1. The solution is projected onto the grid, where every bridge paints the cells it crosses.
//! Projection is also how crossings are found; a solution which cannot be projected is illegal.
//! 2. From the projection, the [`analyzer`] collects per island how much weight it has and needs, which islands it can see,
//! and which of those could still take another bridge from it.
//! It also groups islands already joined by bridges into connected components ("dragons") and counts the unfinished members ("heads") of each.
//! 3. The [`tactics`] are tried in a fixed order, each against every island in index order.
//! The first one to add a bridge (or upgrade a single bridge to a double) ends the step.
//!
//! Tactics only ever add weight, so repeating steps reaches a fixpoint in at most half the sum of all island values.
//! That fixpoint is a full solution for most easy puzzles; harder ones may stall with some bridges still unknown.

pub use builder::{BuilderInvalidReason, PuzzleBuilder};
pub use location::{Dimension, Location};
pub use puzzle::{Island, IslandIndex, Puzzle, PuzzleData};
pub use solution::{Bridge, Solution, SolutionError};
pub use solver::{solve, solve_from, solve_step, SolveStep, Solver, SolverFailure, Steps};

pub(crate) mod location;
mod tests;
pub mod analyzer;
pub mod axis;
pub mod builder;
pub mod cell;
pub(crate) mod puzzle;
pub(crate) mod solution;
pub mod solver;
pub mod tactics;
#[cfg(feature = "wasm")]
pub mod wasm;
