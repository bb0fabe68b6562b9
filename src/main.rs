use log::{error, info};

use mathsynth::datagen::ProgramGen;
use mathsynth::{Config, Session};

fn main() {
    colog::init();

    let mut session = Session::new(Config::default());
    let examples = vec![(vec![1, 2, 3, 4], 7), (vec![2, 4, 6, 8], 14)];
    for (input, output) in examples {
        match session.learn(input, output) {
            Ok(programs) => {
                for (i, ranked) in programs.iter().enumerate() {
                    info!("program {} (score {}): {}", i + 1, ranked.score, ranked.program);
                }
            }
            Err(e) => error!("{}", e),
        }
    }

    for input in [vec![10, 20, 30, 40], vec![1]] {
        match session.run(&input) {
            Ok(out) => info!("{:?} -> {}", input, out),
            Err(e) => error!("{:?}: {}", input, e),
        }
    }

    let mut gen = ProgramGen::new(5, 9);
    for _ in 0..3 {
        let task = gen.gen_simple_task(2);
        let mut session = Session::new(Config::default().with_top_k(1));
        let learned = task
            .examples
            .iter()
            .try_for_each(|(input, output)| session.learn(input.clone(), *output).map(|_| ()));
        match (learned, session.top()) {
            (Ok(()), Some(top)) => info!("hidden {} learned as {}", task.program, top),
            (Err(e), _) => error!("hidden {}: {}", task.program, e),
            (Ok(()), None) => error!("hidden {}: nothing learned", task.program),
        }
    }
}
