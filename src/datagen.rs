//! Random synthesis tasks: a hidden program plus inputs, with the outputs the
//! program produces on them.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::lang::{Fun, Value, AST};

#[derive(Clone, Debug)]
pub struct Task {
    pub program: AST,
    pub examples: Vec<(Vec<Value>, Value)>,
}

pub struct ProgramGen {
    pub rng: StdRng,
    /// Length of every generated input array
    pub len: usize,
    /// Array elements are drawn from `1..=max_value`
    pub max_value: Value,
}

impl ProgramGen {
    pub fn new(len: usize, max_value: Value) -> Self {
        Self::with_rng(StdRng::from_entropy(), len, max_value)
    }

    pub fn seeded(seed: u64, len: usize, max_value: Value) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), len, max_value)
    }

    fn with_rng(rng: StdRng, len: usize, max_value: Value) -> Self {
        ProgramGen {
            rng,
            len: len.max(2),
            max_value: max_value.max(1),
        }
    }

    pub fn gen_array(&mut self) -> Vec<Value> {
        (0..self.len)
            .map(|_| self.rng.gen_range(1..=self.max_value))
            .collect()
    }

    fn gen_pos(&mut self) -> Value {
        self.rng.gen_range(0..self.len) as Value
    }

    /// Two distinct positions, the shape pair witnesses can recover.
    fn gen_pair(&mut self) -> (Value, Value) {
        let mut idx = (0..self.len as Value).collect::<Vec<_>>();
        idx.shuffle(&mut self.rng);
        (idx[0], idx[1])
    }

    /// Any well-formed program with at most `depth` nested operators.
    pub fn gen_program(&mut self, depth: usize) -> AST {
        if depth == 0 {
            return AST::Lit(self.rng.gen_range(0..=self.max_value));
        }
        match self.rng.gen_range(0..5) {
            0 => AST::element_at(self.gen_pos()),
            1 => AST::Lit(self.rng.gen_range(0..=self.max_value)),
            n => {
                let fun = [Fun::Sum, Fun::Mul, Fun::Div][n - 2];
                let lhs = self.gen_program(depth - 1);
                let rhs = self.gen_program(depth - 1);
                AST::app(fun, [lhs, rhs])
            }
        }
    }

    /// A one-operator program over two distinct elements, or a plain
    /// ElementAt, with inputs on which it is defined.
    pub fn gen_simple_task(&mut self, n_examples: usize) -> Task {
        let fun = *[Fun::Sum, Fun::Mul, Fun::Div, Fun::ElementAt]
            .choose(&mut self.rng)
            .unwrap_or(&Fun::Sum);
        let (i, j) = self.gen_pair();
        let program = match fun {
            Fun::ElementAt => AST::element_at(i),
            _ => AST::app(fun, [AST::element_at(i), AST::element_at(j)]),
        };

        let examples = (0..n_examples)
            .map(|_| {
                let mut input = self.gen_array();
                if fun == Fun::Div {
                    // make the numerator an exact multiple of the denominator
                    let q = self.rng.gen_range(1..=self.max_value);
                    input[i as usize] = input[j as usize] * q;
                }
                let output = program.run(&input).unwrap_or_default();
                (input, output)
            })
            .collect();

        Task { program, examples }
    }

    /// A random program together with inputs it runs on without faulting.
    /// Gives up after `attempts` tries.
    pub fn gen_task(&mut self, depth: usize, n_examples: usize, attempts: usize) -> Option<Task> {
        for _ in 0..attempts {
            let program = self.gen_program(depth);
            let examples = (0..n_examples)
                .map(|_| {
                    let input = self.gen_array();
                    program.run(&input).ok().map(|out| (input, out))
                })
                .collect::<Option<Vec<_>>>();
            if let Some(examples) = examples {
                return Some(Task { program, examples });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_are_consistent_with_their_program() {
        let mut gen = ProgramGen::seeded(7, 5, 9);
        for _ in 0..50 {
            let task = gen.gen_simple_task(3);
            for (input, output) in &task.examples {
                assert_eq!(task.program.run(input), Ok(*output));
            }
        }
        for _ in 0..50 {
            if let Some(task) = gen.gen_task(3, 2, 20) {
                for (input, output) in &task.examples {
                    assert_eq!(task.program.run(input), Ok(*output));
                }
            }
        }
    }

    #[test]
    fn seeded_is_reproducible() {
        let a = ProgramGen::seeded(1, 4, 9).gen_simple_task(2);
        let b = ProgramGen::seeded(1, 4, 9).gen_simple_task(2);
        assert_eq!(a.program, b.program);
        assert_eq!(a.examples, b.examples);
    }
}
