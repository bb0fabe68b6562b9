use thiserror::Error;

use crate::lang::{Fun, Value};

/// Failures of a learning call. None of them are fatal; the caller keeps its
/// previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("no examples were provided")]
    NoExamples,

    #[error("no program in the DSL is consistent with the examples")]
    Unsatisfiable,

    #[error("search budget exceeded: {limit} reached {value}")]
    BudgetExceeded { limit: &'static str, value: u64 },
}

/// Runtime faults raised while executing a concrete program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("ElementAt: index {index} is out of bounds for an input of length {len}")]
    IndexOutOfBounds { index: Value, len: usize },

    #[error("Div: {numerator} divided by zero")]
    DivisionByZero { numerator: Value },

    #[error("{}: {lhs} and {rhs} overflow", .fun.name())]
    Overflow { fun: Fun, lhs: Value, rhs: Value },

    #[error("{}: expected {expected} arguments, found {found}", .fun.name())]
    Arity { fun: Fun, expected: usize, found: usize },

    #[error("the input array is not an integer result")]
    NotAnInteger,

    #[error("the program produced no value")]
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("no program was synthesized; provide examples first")]
    NoProgramAvailable,
}
