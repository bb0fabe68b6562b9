use log::info;

use crate::deductive::{synthesize, Config};
use crate::error::{SessionError, SynthesisError};
use crate::lang::{Value, AST};
use crate::rank::Ranked;

/// The long-lived state of an interactive run: the accepted examples and the
/// programs learned from them.
#[derive(Debug, Default)]
pub struct Session {
    config: Config,
    examples: Vec<(Vec<Value>, Value)>,
    programs: Vec<Ranked>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Session {
            config,
            examples: Vec::new(),
            programs: Vec::new(),
        }
    }

    /// Offers a new example and relearns over all accepted ones. The example
    /// is kept only if learning succeeds; otherwise the session is unchanged.
    pub fn learn(&mut self, input: Vec<Value>, output: Value) -> Result<&[Ranked], SynthesisError> {
        self.examples.push((input, output));
        match synthesize(&self.examples, &self.config) {
            Ok(programs) => {
                info!("learned {} programs from {} examples", programs.len(), self.examples.len());
                if let Some(top) = programs.first() {
                    info!("top: {}", top.program);
                }
                self.programs = programs;
                Ok(self.programs.as_slice())
            }
            Err(e) => {
                if let Some((input, output)) = self.examples.pop() {
                    info!("rejected example {:?} -> {}: {}", input, output, e);
                }
                Err(e)
            }
        }
    }

    /// Runs the top program on a new input.
    pub fn run(&self, input: &[Value]) -> Result<Value, SessionError> {
        let top = self.top().ok_or(SessionError::NoProgramAvailable)?;
        Ok(top.run(input)?)
    }

    pub fn top(&self) -> Option<&AST> {
        self.programs.first().map(|r| &r.program)
    }

    pub fn programs(&self) -> &[Ranked] {
        &self.programs
    }

    pub fn examples(&self) -> &[(Vec<Value>, Value)] {
        &self.examples
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn reset(&mut self) {
        self.examples.clear();
        self.programs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;

    #[test]
    fn run_before_learning() {
        let session = Session::default();
        assert_eq!(session.run(&[1, 2]), Err(SessionError::NoProgramAvailable));
    }

    #[test]
    fn rejected_example_is_rolled_back() {
        let mut session = Session::default();
        session.learn(vec![1, 2], 3).unwrap();
        let before = session.programs().to_vec();

        let res = session.learn(vec![1, 2], 4);
        assert_eq!(res, Err(SynthesisError::Unsatisfiable));
        assert_eq!(session.examples(), &[(vec![1, 2], 3)]);
        assert_eq!(session.programs(), before.as_slice());
    }

    #[test]
    fn consistent_example_keeps_program_valid() {
        let mut session = Session::default();
        session.learn(vec![1, 2, 3, 4], 7).unwrap();
        let top = session.top().cloned().unwrap();

        // any input where the top program yields the output is consistent
        let out = top.run(&[10, 20, 30, 40]).unwrap();
        session.learn(vec![10, 20, 30, 40], out).unwrap();
        for (input, output) in session.examples() {
            for ranked in session.programs() {
                assert_eq!(ranked.program.run(input), Ok(*output));
            }
        }
        assert!(session.programs().iter().any(|r| r.program == top));
    }

    #[test]
    fn zero_operand_keeps_program_valid() {
        let mut session = Session::default();
        session.learn(vec![2, 3, 5], 6).unwrap();
        let top = session.top().cloned().unwrap();
        assert_eq!(top.run(&[0, 5, 1]), Ok(0));

        session.learn(vec![0, 5, 1], 0).unwrap();
        assert!(
            session.programs().iter().any(|r| r.program == top),
            "{} dropped",
            top
        );
    }

    #[test]
    fn zero_top_k_commits_examples() {
        let mut session = Session::new(Config::default().with_top_k(0));
        assert_eq!(session.learn(vec![1, 2, 3, 4], 7), Ok(&[][..]));
        assert_eq!(session.examples().len(), 1);
        assert_eq!(session.run(&[1, 2]), Err(SessionError::NoProgramAvailable));
    }

    #[test]
    fn execution_fault_keeps_program() {
        let mut session = Session::default();
        session.learn(vec![5, 1, 9], 9).unwrap();
        session.learn(vec![0, 0, 4], 4).unwrap();
        let top = session.top().cloned().unwrap();
        assert_eq!(top, AST::element_at(2));

        assert_eq!(
            session.run(&[1]),
            Err(SessionError::Execution(ExecutionError::IndexOutOfBounds { index: 2, len: 1 }))
        );
        assert_eq!(session.top(), Some(&top));
        assert_eq!(session.run(&[7, 8, 6]), Ok(6));
    }

    #[test]
    fn reset_clears_state() {
        let mut session = Session::default();
        session.learn(vec![2, 3, 5], 6).unwrap();
        session.reset();
        assert!(session.examples().is_empty());
        assert!(session.top().is_none());
    }
}
