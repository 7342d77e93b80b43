use std::num::NonZero;
use std::process::ExitCode;

use hashi::{Puzzle, Solver};
use log::error;

const PUZZLE: &str = "
2.4.3.1.2..1.
.........3..1
....2.3.2....
2.3..2...3.1.
....2.5.3.4..
1.5..2.1...2.
......2.2.4.2
..4.4..3...3.
.............
2.2.3...3.2.3
.....2.4.4.3.
..1.2........
3....3.1.2..2
";

fn main() -> ExitCode {
    env_logger::init();

    let Some(side) = NonZero::new(13) else {
        return ExitCode::FAILURE;
    };
    let puzzle = match Puzzle::decode(PUZZLE, (side, side)) {
        Ok(puzzle) => puzzle,
        Err(reasons) => {
            for reason in reasons {
                error!("{}", reason);
            }
            return ExitCode::FAILURE;
        }
    };
    println!("{}", puzzle);

    let solver = Solver::new();
    let mut last = None;
    for (n, step) in solver.steps(&puzzle, Default::default()).enumerate() {
        match step {
            Ok(step) => {
                println!("{:>3}: island {:>2}: {}", n + 1, step.island, step.tactic.label);
                last = Some(step.solution);
            }
            Err(failure) => {
                error!("{}", failure);
                return ExitCode::FAILURE;
            }
        }
    }

    let solution = last.unwrap_or_default();
    match solution.render(&puzzle) {
        Ok(rendered) => println!("\n{}", rendered),
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    }
    println!("{}", if solution.is_correct(&puzzle) { "solved" } else { "stalled" });

    ExitCode::SUCCESS
}
