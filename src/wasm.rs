//! JavaScript bindings.
//!
//! Puzzles come in as the flat text notation of [`PuzzleData`]; errors go back out as strings.

use itertools::Itertools;
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::puzzle::{Puzzle, PuzzleData};
use crate::solution::Solution;
use crate::solver::solve;

fn solve_data(width: usize, height: usize, data: String) -> Result<(Puzzle, Solution), JsValue> {
    let puzzle = Puzzle::try_from(&PuzzleData { width, height, data })
        .map_err(|reasons| JsValue::from_str(&reasons.iter().join("; ")))?;
    let solution = solve(&puzzle).map_err(|failure| JsValue::from_str(&failure.to_string()))?;

    Ok((puzzle, solution))
}

/// Solve a puzzle as far as deduction allows and render the board.
#[wasm_bindgen(js_name = "solvePuzzle")]
pub fn solve_puzzle(width: usize, height: usize, data: String) -> Result<String, JsValue> {
    let (puzzle, solution) = solve_data(width, height, data)?;
    solution.render(&puzzle).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Solve a puzzle as far as deduction allows.
/// Returns an array of `{ from, to, value }` objects, islands numbered in row-major order.
#[wasm_bindgen(js_name = "solveBridges")]
pub fn solve_bridges(width: usize, height: usize, data: String) -> Result<Array, JsValue> {
    let (_, solution) = solve_data(width, height, data)?;

    let ret = Array::new();
    for bridge in solution.bridges() {
        let obj = Object::new();
        Reflect::set(&obj, &"from".into(), &(bridge.from as u32).into())?;
        Reflect::set(&obj, &"to".into(), &(bridge.to as u32).into())?;
        Reflect::set(&obj, &"value".into(), &bridge.value.into())?;
        ret.push(&obj);
    }

    Ok(ret)
}
