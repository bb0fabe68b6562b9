use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::lang::Fun;
use crate::witness::{self, Witness};

/// Grammar symbols of the arithmetic DSL:
///
/// ```text
/// Start := Sum(Input, Start, Start) | Mul(Input, Start, Start)
///        | Div(Input, Start, Start) | ElementAt(Input, K) | K
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Input,
    K,
    Start,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Production {
    Op(Fun),
    Literal,
}

/// One row of the operator table: forward semantics live on `Fun::apply`,
/// the inverse ones here, next to the parameter symbols they produce specs for.
pub struct Operator {
    pub fun: Fun,
    /// Parameter symbols, `Input` first.
    pub params: Vec<Symbol>,
    /// `witnesses[i]` derives the spec of `params[i + 1]`.
    pub witnesses: Vec<Witness>,
}

lazy_static! {
    static ref OPERATORS: HashMap<Fun, Operator> = {
        use Symbol::*;
        use Witness::*;

        let binary = |fun: Fun, lhs: witness::FreeWitness, rhs: witness::DependentWitness| Operator {
            fun,
            params: vec![Input, Start, Start],
            witnesses: vec![Free(lhs), Dependent { on: 1, f: rhs }],
        };

        let mut table = HashMap::new();
        table.insert(Fun::Sum, binary(Fun::Sum, witness::sum_lhs, witness::sum_rhs));
        table.insert(Fun::Mul, binary(Fun::Mul, witness::mul_lhs, witness::mul_rhs));
        table.insert(Fun::Div, binary(Fun::Div, witness::div_lhs, witness::div_rhs));
        table.insert(
            Fun::ElementAt,
            Operator {
                fun: Fun::ElementAt,
                params: vec![Input, K],
                witnesses: vec![Free(witness::element_at_pos)],
            },
        );
        table
    };
}

impl Operator {
    pub fn get(fun: Fun) -> &'static Operator {
        &OPERATORS[&fun]
    }

    /// Searched parameters, i.e. everything after `Input`.
    pub fn searched(&self) -> impl Iterator<Item = (usize, Symbol, Witness)> + '_ {
        self.params
            .iter()
            .enumerate()
            .skip(1)
            .zip(self.witnesses.iter())
            .map(|((i, sym), w)| (i, *sym, *w))
    }

    /// Whether some later parameter's witness consumes parameter `i`.
    pub fn is_dependency(&self, i: usize) -> bool {
        self.witnesses.iter().any(|w| w.depends_on() == Some(i))
    }
}

#[derive(Clone, Debug)]
pub struct Grammar {
    pub start: Symbol,
    pub productions: Vec<Production>,
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar {
            start: Symbol::Start,
            productions: Fun::ALL
                .iter()
                .map(|f| Production::Op(*f))
                .chain(std::iter::once(Production::Literal))
                .collect(),
        }
    }
}

impl Grammar {
    /// Productions whose left-hand side is `sym`.
    pub fn productions_of(&self, sym: Symbol) -> &[Production] {
        match sym {
            Symbol::Start => &self.productions,
            Symbol::Input | Symbol::K => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_searched_parameter_has_a_witness() {
        for fun in Fun::ALL {
            let op = Operator::get(fun);
            assert_eq!(op.fun, fun);
            assert_eq!(op.params[0], Symbol::Input);
            assert_eq!(op.params.len(), fun.arity() + 1);
            assert_eq!(op.witnesses.len(), fun.arity());
        }
    }

    #[test]
    fn dependencies_point_backwards() {
        for fun in Fun::ALL {
            for (i, _, w) in Operator::get(fun).searched() {
                if let Some(on) = w.depends_on() {
                    assert!(on < i && on >= 1);
                }
            }
        }
        assert!(Operator::get(Fun::Sum).is_dependency(1));
        assert!(!Operator::get(Fun::ElementAt).is_dependency(1));
    }
}
