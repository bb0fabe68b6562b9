use std::fmt;

use crate::error::ExecutionError;

pub type Value = i64;

/// The optional integer domain every operator computes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lit {
    Defined(Value),
    Undefined,
}

impl Lit {
    pub fn defined(self) -> Option<Value> {
        match self {
            Lit::Defined(n) => Some(n),
            Lit::Undefined => None,
        }
    }
}

impl From<Value> for Lit {
    fn from(n: Value) -> Self {
        Lit::Defined(n)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fun {
    Sum,
    Mul,
    Div,
    ElementAt,
}

impl Fun {
    pub const ALL: [Fun; 4] = [Fun::Sum, Fun::Mul, Fun::Div, Fun::ElementAt];

    pub fn name(self) -> &'static str {
        match self {
            Fun::Sum => "Sum",
            Fun::Mul => "Mul",
            Fun::Div => "Div",
            Fun::ElementAt => "ElementAt",
        }
    }

    /// Forward semantics. `v` is the bound input array, `args` the searched
    /// parameters in order.
    ///
    /// Any undefined operand makes the result undefined. Division by zero, an
    /// out of range index and arithmetic overflow are faults, never undefined.
    pub fn apply(self, v: &[Value], args: &[Lit]) -> Result<Lit, ExecutionError> {
        let mut vals = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Lit::Defined(n) => vals.push(*n),
                Lit::Undefined => return Ok(Lit::Undefined),
            }
        }

        let res = match (self, vals.as_slice()) {
            (Fun::Sum, &[a, b]) => a.checked_add(b).ok_or(ExecutionError::Overflow {
                fun: self,
                lhs: a,
                rhs: b,
            })?,
            (Fun::Mul, &[a, b]) => a.checked_mul(b).ok_or(ExecutionError::Overflow {
                fun: self,
                lhs: a,
                rhs: b,
            })?,
            (Fun::Div, &[_, 0]) => {
                return Err(ExecutionError::DivisionByZero { numerator: vals[0] })
            }
            // i64::MIN / -1 is the only overflowing division
            (Fun::Div, &[a, b]) => a.checked_div(b).ok_or(ExecutionError::Overflow {
                fun: self,
                lhs: a,
                rhs: b,
            })?,
            (Fun::ElementAt, &[pos]) => match usize::try_from(pos).ok().and_then(|i| v.get(i)) {
                Some(n) => *n,
                None => {
                    return Err(ExecutionError::IndexOutOfBounds {
                        index: pos,
                        len: v.len(),
                    })
                }
            },
            _ => {
                return Err(ExecutionError::Arity {
                    fun: self,
                    expected: self.arity(),
                    found: args.len(),
                })
            }
        };

        Ok(Lit::Defined(res))
    }

    /// Number of searched parameters, not counting the implicit input.
    pub fn arity(self) -> usize {
        match self {
            Fun::Sum | Fun::Mul | Fun::Div => 2,
            Fun::ElementAt => 1,
        }
    }
}

/// A concrete program. Operator applications always carry `Input` as their
/// first argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AST {
    Input,
    Lit(Value),
    App { fun: Fun, args: Vec<AST> },
}

impl AST {
    pub fn app(fun: Fun, params: impl IntoIterator<Item = AST>) -> AST {
        AST::App {
            fun,
            args: std::iter::once(AST::Input).chain(params).collect(),
        }
    }

    pub fn sum(lhs: AST, rhs: AST) -> AST {
        AST::app(Fun::Sum, [lhs, rhs])
    }

    pub fn mul(lhs: AST, rhs: AST) -> AST {
        AST::app(Fun::Mul, [lhs, rhs])
    }

    pub fn div(lhs: AST, rhs: AST) -> AST {
        AST::app(Fun::Div, [lhs, rhs])
    }

    pub fn element_at(pos: Value) -> AST {
        AST::app(Fun::ElementAt, [AST::Lit(pos)])
    }

    pub fn eval(&self, input: &[Value]) -> Result<Lit, ExecutionError> {
        match self {
            AST::Input => Err(ExecutionError::NotAnInteger),
            AST::Lit(n) => Ok(Lit::Defined(*n)),
            AST::App { fun, args } => {
                let params = match args.split_first() {
                    Some((AST::Input, params)) => params,
                    _ => return Err(ExecutionError::NotAnInteger),
                };
                let vals = params
                    .iter()
                    .map(|p| p.eval(input))
                    .collect::<Result<Vec<_>, _>>()?;
                fun.apply(input, &vals)
            }
        }
    }

    /// Runs the program on a new input; an undefined result is an error here.
    pub fn run(&self, input: &[Value]) -> Result<Value, ExecutionError> {
        self.eval(input)?.defined().ok_or(ExecutionError::Undefined)
    }

    pub fn size(&self) -> usize {
        match self {
            AST::Input | AST::Lit(_) => 1,
            AST::App { args, .. } => 1 + args.iter().map(AST::size).sum::<usize>(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            AST::Input | AST::Lit(_) => 0,
            AST::App { args, .. } => 1 + args.iter().map(AST::depth).max().unwrap_or(0),
        }
    }
}

impl fmt::Display for AST {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AST::Input => f.write_str("v"),
            AST::Lit(n) => write!(f, "{}", n),
            AST::App { fun, args } => {
                write!(f, "{}(", fun.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Defined(n) => write!(f, "{}", n),
            Lit::Undefined => f.write_str("undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_propagates_through_every_operator() {
        for fun in Fun::ALL {
            let args = vec![Lit::Undefined; fun.arity()];
            assert_eq!(fun.apply(&[1, 2, 3], &args), Ok(Lit::Undefined));
        }
        assert_eq!(
            Fun::Sum.apply(&[], &[Lit::Defined(1), Lit::Undefined]),
            Ok(Lit::Undefined)
        );
    }

    #[test]
    fn div_truncates_toward_zero() {
        assert_eq!(AST::div(AST::Lit(-7), AST::Lit(2)).run(&[]), Ok(-3));
        assert_eq!(AST::div(AST::Lit(7), AST::Lit(2)).run(&[]), Ok(3));
    }

    #[test]
    fn faults_are_not_undefined() {
        assert_eq!(
            AST::div(AST::Lit(1), AST::Lit(0)).eval(&[]),
            Err(ExecutionError::DivisionByZero { numerator: 1 })
        );
        assert_eq!(
            AST::element_at(3).eval(&[1, 2]),
            Err(ExecutionError::IndexOutOfBounds { index: 3, len: 2 })
        );
        assert_eq!(
            AST::element_at(-1).eval(&[1, 2]),
            Err(ExecutionError::IndexOutOfBounds { index: -1, len: 2 })
        );
        assert!(matches!(
            AST::mul(AST::Lit(Value::MAX), AST::Lit(2)).eval(&[]),
            Err(ExecutionError::Overflow { fun: Fun::Mul, .. })
        ));
    }

    #[test]
    fn display() {
        let prog = AST::sum(AST::element_at(2), AST::Lit(4));
        assert_eq!(prog.to_string(), "Sum(v, ElementAt(v, 2), 4)");
        assert_eq!(prog.depth(), 2);
        assert_eq!(prog.size(), 6);
    }
}
