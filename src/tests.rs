#[cfg(test)]
mod tests {
    use std::num::NonZero;
    use std::sync::Once;

    use serde_json::json;

    use crate::analyzer::analyze;
    use crate::builder::{BuilderInvalidReason, PuzzleBuilder};
    use crate::location::{Dimension, Location};
    use crate::puzzle::{Island, Puzzle, PuzzleData};
    use crate::solution::{Bridge, Solution, SolutionError};
    use crate::solver::{solve, solve_from, solve_step, SolveStep, Solver, SolverFailure};
    use crate::tactics::TACTICS;

    static INIT_LOGGER: Once = Once::new();

    fn init_logger() {
        INIT_LOGGER.call_once(|| {
            env_logger::builder().is_test(true).init();
        });
    }

    fn dims(width: usize, height: usize) -> (Dimension, Dimension) {
        (NonZero::new(width).unwrap(), NonZero::new(height).unwrap())
    }

    fn island(x: usize, y: usize, value: u8) -> Island {
        Island { location: Location(x, y), value }
    }

    /// ```text
    /// ·················
    /// ··0····1····2····
    /// ···············3·
    /// ············4····
    /// ·······5·······6·
    /// ·················
    /// ```
    fn seven_islands() -> Puzzle {
        Puzzle::new(dims(17, 6), [
            island(2, 1, 2),
            island(7, 1, 4),
            island(12, 1, 3),
            island(15, 2, 1),
            island(12, 3, 2),
            island(7, 4, 3),
            island(15, 4, 3),
        ]).unwrap()
    }

    const SEVEN_ISLANDS: &str = "·················
··2····4····3····
···············1·
············2····
·······3·······3·
·················
";

    /// Four corners; the two `1`s can see each other but joining them would cut them off.
    fn four_corners() -> Puzzle {
        Puzzle::decode("1·1
···
2·2", dims(3, 3)).unwrap()
    }

    /// Two `1`s on either side of a column of two more.
    fn plus() -> Puzzle {
        Puzzle::decode("·1·
1·1
·1·", dims(3, 3)).unwrap()
    }

    #[test]
    fn render_empty() {
        let puzzle = seven_islands();
        let solution = Solution::default();

        assert!(solution.is_legal(&puzzle));
        assert_eq!(solution.render(&puzzle).unwrap(), SEVEN_ISLANDS);
        assert_eq!(format!("{}", puzzle), SEVEN_ISLANDS);
    }

    #[test]
    fn decode_matches_constructed() {
        let decoded = Puzzle::decode(SEVEN_ISLANDS, dims(17, 6)).unwrap();

        assert_eq!(decoded, seven_islands());
        assert_eq!(decoded.render_empty(), SEVEN_ISLANDS);
        assert_eq!(decoded.total_value(), 18);
    }

    #[test]
    fn render_simple() {
        let puzzle = seven_islands();
        let solution = Solution::new(vec![
            Bridge { from: 0, to: 1, value: 1 },
            Bridge { from: 2, to: 4, value: 2 },
        ]);

        assert_eq!(solution.validate(&puzzle), Ok(()));
        assert_eq!(solution.render(&puzzle).unwrap(), "·················
··2────4····3····
············║··1·
············2····
·······3·······3·
·················
");
    }

    #[test]
    fn partial_is_legal_but_not_correct() {
        let puzzle = seven_islands();
        let solution = Solution::new(vec![
            Bridge { from: 0, to: 1, value: 2 },
            Bridge { from: 2, to: 4, value: 2 },
        ]);

        assert!(solution.is_legal(&puzzle));
        assert!(!solution.is_correct(&puzzle));
        assert!(!Solution::default().is_correct(&puzzle));
    }

    #[test]
    fn solve_seven_islands() {
        init_logger();
        let puzzle = seven_islands();
        let solution = solve(&puzzle).unwrap();

        assert!(solution.is_legal(&puzzle));
        assert!(solution.is_correct(&puzzle));
        assert_eq!(solution.render(&puzzle).unwrap(), "·················
··2════4────3····
·······│····║··1·
·······│····2··│·
·······3═══════3·
·················
");
    }

    #[test]
    fn steps_only_add_weight() {
        init_logger();
        let puzzle = seven_islands();
        let solver = Solver::new();

        let mut previous = Solution::default();
        let mut count = 0;
        for step in solver.steps(&puzzle, Solution::default()) {
            let step = step.unwrap();
            assert!(step.solution.total_weight() > previous.total_weight());
            for bridge in previous.bridges() {
                assert!(step.solution.weight_between(bridge.from, bridge.to) >= bridge.value);
            }

            previous = step.solution;
            count += 1;
        }

        assert_eq!(count, 6);
        assert!(previous.is_correct(&puzzle));
    }

    #[test]
    fn first_step_completes_lonely_island() {
        let puzzle = seven_islands();
        let step = solve_step(&puzzle, &Solution::default()).unwrap().unwrap();

        assert_eq!(step.island, 0);
        assert_eq!(step.tactic.label, TACTICS[0].label);
        assert_eq!(step.solution.bridges(), &[Bridge { from: 0, to: 1, value: 2 }]);
    }

    #[test]
    fn no_step_once_solved() {
        let puzzle = seven_islands();
        let solved = solve(&puzzle).unwrap();

        assert!(solve_step(&puzzle, &solved).unwrap().is_none());
        assert_eq!(solve_from(&puzzle, &solved).unwrap(), solved);
    }

    #[test]
    fn step_limit() {
        init_logger();
        let puzzle = seven_islands();
        let partial = Solver::new().with_step_limit(2).solve(&puzzle).unwrap();

        assert_eq!(partial.bridges(), &[
            Bridge { from: 0, to: 1, value: 2 },
            Bridge { from: 3, to: 6, value: 1 },
        ]);
        assert!(!partial.is_correct(&puzzle));

        let resumed = solve_from(&puzzle, &partial).unwrap();
        assert!(resumed.is_correct(&puzzle));
        assert_eq!(solve_from(&puzzle, &resumed).unwrap(), resumed);
    }

    #[test]
    fn empty_catalog_stalls() {
        let puzzle = seven_islands();
        let solution = Solver::new().with_tactics(&[]).solve(&puzzle).unwrap();

        assert_eq!(solution, Solution::default());
    }

    #[test]
    fn validate_reports_first_problem() {
        let puzzle = seven_islands();
        let check = |bridges: Vec<Bridge>| Solution::new(bridges).validate(&puzzle);

        assert_eq!(check(vec![Bridge { from: 0, to: 9, value: 1 }]), Err(SolutionError::UnknownIsland { index: 9 }));
        assert_eq!(check(vec![Bridge { from: 1, to: 0, value: 1 }]), Err(SolutionError::UnnormalizedBridge { from: 1, to: 0 }));
        assert_eq!(check(vec![Bridge { from: 0, to: 1, value: 3 }]), Err(SolutionError::InvalidWeight { from: 0, to: 1, value: 3 }));
        assert_eq!(check(vec![Bridge { from: 0, to: 1, value: 0 }]), Err(SolutionError::InvalidWeight { from: 0, to: 1, value: 0 }));
        assert_eq!(check(vec![Bridge { from: 0, to: 3, value: 1 }]), Err(SolutionError::InvalidBridge { from: 0, to: 3 }));
        assert_eq!(
            check(vec![Bridge { from: 0, to: 1, value: 1 }, Bridge { from: 0, to: 1, value: 1 }]),
            Err(SolutionError::DuplicateBridge { from: 0, to: 1 })
        );
        // runs straight over island 1
        assert_eq!(check(vec![Bridge { from: 0, to: 2, value: 1 }]), Err(SolutionError::Crossing { location: Location(7, 1) }));
        assert_eq!(
            check(vec![Bridge { from: 0, to: 9, value: 1 }, Bridge { from: 1, to: 0, value: 1 }]),
            Err(SolutionError::UnknownIsland { index: 9 })
        );
    }

    #[test]
    fn crossing_bridges() {
        let puzzle = plus();
        let solution = Solution::new(vec![
            Bridge { from: 0, to: 3, value: 1 },
            Bridge { from: 1, to: 2, value: 2 },
        ]);

        assert_eq!(solution.validate(&puzzle), Err(SolutionError::Crossing { location: Location(1, 1) }));
        assert!(!solution.is_legal(&puzzle));
        assert!(solution.render(&puzzle).is_err());
        assert_eq!(analyze(&puzzle, &solution), Err(SolutionError::Crossing { location: Location(1, 1) }));
    }

    #[test]
    fn bridge_hides_neighbours() {
        let puzzle = plus();
        let solution = Solution::new(vec![Bridge { from: 0, to: 3, value: 1 }]);
        assert_eq!(solution.render(&puzzle).unwrap(), "·1·
1│1
·1·
");

        let before = analyze(&puzzle, &Solution::default()).unwrap();
        assert_eq!(before.metas[1].neighbours, vec![2]);
        assert_eq!(before.metas[0].neighbours, vec![3]);

        let after = analyze(&puzzle, &solution).unwrap();
        assert!(after.metas[1].neighbours.is_empty());
        assert!(after.metas[2].neighbours.is_empty());
        assert_eq!(after.metas[0].neighbours, vec![3]);
        assert!(after.metas[0].active_neighbours.is_empty());
        assert_eq!(after.stranded(), Some(1));
    }

    #[test]
    fn stranded_island_is_a_contradiction() {
        let puzzle = plus();
        let solution = Solution::new(vec![Bridge { from: 0, to: 3, value: 1 }]);

        assert!(matches!(
            solve_step(&puzzle, &solution),
            Err(SolverFailure::Contradiction { island: 1, .. })
        ));
        assert!(solve(&puzzle).is_err());
    }

    #[test]
    fn illegal_start_is_rejected() {
        let puzzle = seven_islands();
        let solution = Solution::new(vec![Bridge { from: 1, to: 0, value: 1 }]);

        assert_eq!(
            solve_from(&puzzle, &solution),
            Err(SolverFailure::Illegal(SolutionError::UnnormalizedBridge { from: 1, to: 0 }))
        );
    }

    #[test]
    fn analyze_seven_islands() {
        let puzzle = seven_islands();

        let empty = analyze(&puzzle, &Solution::default()).unwrap();
        assert_eq!(empty.metas[0].neighbours, vec![1]);
        assert_eq!(empty.metas[1].neighbours, vec![0, 2, 5]);
        assert_eq!(empty.metas[5].neighbours, vec![6, 1]);
        assert_eq!(empty.metas[6].neighbours, vec![5, 3]);
        assert_eq!(empty.dragons.len(), 7);
        assert!(empty.dragons.iter().all(|dragon| dragon.size == 1 && dragon.heads == 1));
        assert_eq!(empty.stranded(), None);

        let solution = Solution::new(vec![Bridge { from: 0, to: 1, value: 2 }]);
        let analysis = analyze(&puzzle, &solution).unwrap();
        let (zero, one) = (&analysis.metas[0], &analysis.metas[1]);
        assert!(zero.is_satisfied());
        assert!(zero.active_neighbours.is_empty());
        assert_eq!((one.current_value, one.remaining_value), (2, 2));
        assert_eq!(one.active_neighbours, vec![2, 5]);
        assert_eq!(one.weight_to(0), 2);

        assert_eq!(analysis.dragons.len(), 6);
        let dragon = analysis.dragon_of(1);
        assert_eq!(dragon.members, vec![0, 1]);
        assert_eq!((dragon.size, dragon.heads), (2, 1));
        assert_eq!(analysis.metas[0].dragon, analysis.metas[1].dragon);
    }

    #[test]
    fn overfilled_island_is_a_contradiction() {
        let puzzle = four_corners();
        let solution = Solution::new(vec![Bridge { from: 0, to: 1, value: 2 }]);

        assert!(solution.is_legal(&puzzle));
        assert_eq!(analyze(&puzzle, &solution).unwrap().overfilled(), Some(0));
        assert!(matches!(
            solve_step(&puzzle, &solution),
            Err(SolverFailure::Contradiction { island: 0, .. })
        ));
    }

    #[test]
    fn avoid_isolating_pair() {
        init_logger();
        let puzzle = four_corners();
        let isolation = &TACTICS[TACTICS.len() - 1..];

        let step = Solver::new()
            .with_tactics(isolation)
            .solve_step(&puzzle, &Solution::default())
            .unwrap()
            .unwrap();
        assert_eq!(step.island, 0);
        assert_eq!(step.solution.bridges(), &[Bridge { from: 0, to: 2, value: 1 }]);

        let solution = solve(&puzzle).unwrap();
        assert!(solution.is_correct(&puzzle));
        assert_eq!(solution.render(&puzzle).unwrap(), "1·1
│·│
2─2
");
    }

    #[test]
    fn builder_rejects_bad_islands() {
        let builder = PuzzleBuilder::with_dims(dims(4, 3));

        assert_eq!(
            builder.clone().add_island(Location(4, 0), 1).build(),
            Err(vec![BuilderInvalidReason::OutOfBounds { location: Location(4, 0) }])
        );
        assert_eq!(
            builder.clone().add_island(Location(1, 1), 2).add_island(Location(1, 1), 3).build(),
            Err(vec![BuilderInvalidReason::DuplicatePosition { location: Location(1, 1) }])
        );
        assert_eq!(
            builder.clone().add_island(Location(0, 0), 9).build(),
            Err(vec![BuilderInvalidReason::InvalidValue { location: Location(0, 0), value: 9 }])
        );

        // invalid builders ignore everything after the first problem
        let mut invalid = builder.clone();
        invalid.add_island(Location(0, 5), 1).add_island(Location(0, 6), 1);
        assert_eq!(invalid.is_valid().map(Vec::len), Some(1));

        assert_eq!(builder.is_valid(), None);
        assert!(builder.build().unwrap().islands().is_empty());
    }

    #[test]
    fn empty_board_is_solved() {
        let puzzle = PuzzleBuilder::with_dims(dims(3, 2)).build().unwrap();
        let solution = solve(&puzzle).unwrap();

        assert!(solution.is_correct(&puzzle));
        assert_eq!(solution.render(&puzzle).unwrap(), "···
···
");
    }

    #[test]
    fn puzzle_data_from_json() {
        let value = json!({
            "width": 17,
            "height": 6,
            "data": SEVEN_ISLANDS.replace('\n', ""),
        });
        let data: PuzzleData = serde_json::from_value(value).unwrap();
        assert_eq!(Puzzle::try_from(&data).unwrap(), seven_islands());

        let empty = PuzzleData { width: 0, height: 6, data: String::new() };
        assert_eq!(Puzzle::try_from(&empty), Err(vec![BuilderInvalidReason::ZeroDimension]));
    }

    #[test]
    fn solution_as_json() {
        let solution = Solution::new(vec![Bridge::new(3, 1, 2)]);

        assert_eq!(
            serde_json::to_value(&solution).unwrap(),
            json!({ "bridges": [{ "from": 1, "to": 3, "value": 2 }] })
        );
    }

    #[test]
    fn projection_rejects_bad_weights() {
        let puzzle = Puzzle::decode("2·2", dims(3, 1)).unwrap();

        for value in [0, 3, 7] {
            let solution = Solution::new(vec![Bridge { from: 0, to: 1, value }]);
            let expected = Err(SolutionError::InvalidWeight { from: 0, to: 1, value });

            assert_eq!(solution.validate(&puzzle), expected);
            assert_eq!(solution.to_matrix(&puzzle).map(|_| ()), expected);
            assert_eq!(solution.render(&puzzle), expected.map(|_| String::new()));
        }

        let double = Solution::new(vec![Bridge { from: 0, to: 1, value: 2 }]);
        assert_eq!(double.render(&puzzle).unwrap(), "2═2\n");
    }

    #[test]
    fn step_limit_matching_step_count() {
        init_logger();
        let puzzle = seven_islands();

        let exact = Solver::new().with_step_limit(6).solve(&puzzle).unwrap();
        assert!(exact.is_correct(&puzzle));
        assert_eq!(exact, solve(&puzzle).unwrap());

        let short = Solver::new().with_step_limit(5).solve(&puzzle).unwrap();
        assert!(!short.is_correct(&puzzle));
        assert_eq!(short.total_weight(), 7);
    }

    fn board(text: &str, width: usize, height: usize) -> Puzzle {
        Puzzle::decode(text, dims(width, height)).unwrap()
    }

    /// One step using only the tactic at `index` in the catalog.
    fn step_with(index: usize, puzzle: &Puzzle, solution: &Solution) -> SolveStep {
        let step = Solver::new()
            .with_tactics(&TACTICS[index..=index])
            .solve_step(puzzle, solution)
            .unwrap()
            .unwrap();
        assert_eq!(step.tactic.label, TACTICS[index].label);
        step
    }

    fn bridges_after(index: usize, puzzle: &Puzzle) -> Vec<Bridge> {
        step_with(index, puzzle, &Solution::default()).solution.bridges().to_vec()
    }

    #[test]
    fn exact_coverage_two_neighbours() {
        let three = board("3.2
...
1..", 3, 3);
        assert_eq!(bridges_after(1, &three), vec![
            Bridge { from: 0, to: 1, value: 1 },
            Bridge { from: 0, to: 2, value: 1 },
        ]);

        let four = board("4.2
...
2..", 3, 3);
        assert_eq!(bridges_after(2, &four), vec![
            Bridge { from: 0, to: 1, value: 2 },
            Bridge { from: 0, to: 2, value: 2 },
        ]);
    }

    #[test]
    fn exact_coverage_three_neighbours() {
        let five = board(".2.
251
...", 3, 3);
        assert_eq!(bridges_after(3, &five), vec![
            Bridge { from: 1, to: 2, value: 1 },
            Bridge { from: 2, to: 3, value: 1 },
            Bridge { from: 0, to: 2, value: 1 },
        ]);

        let six = board(".2.
262
...", 3, 3);
        assert_eq!(bridges_after(4, &six), vec![
            Bridge { from: 1, to: 2, value: 2 },
            Bridge { from: 2, to: 3, value: 2 },
            Bridge { from: 0, to: 2, value: 2 },
        ]);
    }

    #[test]
    fn exact_coverage_four_neighbours() {
        let seven = board(".2.
272
.1.", 3, 3);
        let step = step_with(5, &seven, &Solution::default());
        assert_eq!(step.island, 2);
        assert_eq!(step.solution.bridges(), &[
            Bridge { from: 1, to: 2, value: 1 },
            Bridge { from: 2, to: 3, value: 1 },
            Bridge { from: 0, to: 2, value: 1 },
            Bridge { from: 2, to: 4, value: 1 },
        ]);

        let eight = board(".2.
282
.2.", 3, 3);
        let solution = step_with(6, &eight, &Solution::default()).solution;
        assert!(solution.is_correct(&eight));
        assert_eq!(solution.render(&eight).unwrap(), "·2·
282
·2·
");
    }

    #[test]
    fn four_beside_finished_neighbour() {
        let puzzle = board(".1.
241
...", 3, 3);
        let start = Solution::new(vec![Bridge { from: 0, to: 2, value: 1 }]);

        let step = step_with(7, &puzzle, &start);
        assert_eq!(step.island, 2);
        assert_eq!(step.solution.bridges(), &[
            Bridge { from: 0, to: 2, value: 1 },
            Bridge { from: 1, to: 2, value: 1 },
            Bridge { from: 2, to: 3, value: 1 },
        ]);
    }

    #[test]
    fn three_beside_one_and_two() {
        let puzzle = board(".1..
23.2
....
1..1", 4, 4);

        let step = step_with(8, &puzzle, &Solution::default());
        assert_eq!(step.island, 2);
        assert_eq!(step.solution.bridges(), &[
            Bridge { from: 2, to: 3, value: 1 },
            Bridge { from: 1, to: 2, value: 1 },
        ]);
        assert!(solve(&puzzle).unwrap().is_correct(&puzzle));
    }

    #[test]
    fn two_beside_small_neighbour() {
        let puzzle = four_corners();

        let step = step_with(9, &puzzle, &Solution::default());
        assert_eq!(step.island, 2);
        assert_eq!(step.solution.bridges(), &[
            Bridge { from: 0, to: 2, value: 1 },
            Bridge { from: 2, to: 3, value: 1 },
        ]);
    }

    #[test]
    fn two_active_neighbours() {
        let puzzle = board("1.3.2", 5, 1);

        let step = step_with(10, &puzzle, &Solution::default());
        assert_eq!(step.island, 1);
        assert_eq!(step.solution.bridges(), &[Bridge { from: 1, to: 2, value: 1 }]);
    }

    #[test]
    fn exceed_other_capacity() {
        let puzzle = board("3.1
...
2..", 3, 3);

        let step = step_with(11, &puzzle, &Solution::default());
        assert_eq!(step.island, 0);
        assert_eq!(step.solution.bridges(), &[
            Bridge { from: 0, to: 1, value: 1 },
            Bridge { from: 0, to: 2, value: 2 },
        ]);
        assert!(step.solution.is_correct(&puzzle));
    }

    #[test]
    fn more_needed_than_neighbours_can_take() {
        let puzzle = board("4.1
...
2..", 3, 3);

        let failure = Solver::new()
            .with_tactics(&TACTICS[11..=11])
            .solve_step(&puzzle, &Solution::default());
        assert_eq!(failure.map(|_| ()), Err(SolverFailure::Contradiction {
            island: 0,
            reason: "needs more than all its neighbours can take",
        }));
    }

    #[test]
    fn more_needed_than_single_neighbour_can_take() {
        let puzzle = board("2.1", 3, 1);

        let failure = Solver::new()
            .with_tactics(&TACTICS[..1])
            .solve_step(&puzzle, &Solution::default());
        assert_eq!(failure.map(|_| ()), Err(SolverFailure::Contradiction {
            island: 0,
            reason: "needs more than its only active neighbour can take",
        }));
        assert!(solve(&puzzle).is_err());
    }
}
