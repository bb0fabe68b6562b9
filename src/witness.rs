//! Inverse semantics. Each witness turns the spec of an operator's result into
//! the spec one of its parameters has to satisfy.
//!
//! Witnesses work one state at a time and return an empty set when nothing
//! fits, which the engine treats as a pruned branch.

use im::OrdSet;

use crate::lang::Value;
use crate::spec::{Examples, Spec};

pub type FreeWitness = fn(&[Value], &OrdSet<Value>) -> OrdSet<Value>;
pub type DependentWitness = fn(&[Value], &OrdSet<Value>, Value) -> OrdSet<Value>;

#[derive(Clone, Copy)]
pub enum Witness {
    /// Depends only on the operator's spec.
    Free(FreeWitness),
    /// Also consumes the concrete per-state value already chosen for the
    /// parameter at index `on`.
    Dependent { on: usize, f: DependentWitness },
}

impl Witness {
    pub fn depends_on(&self) -> Option<usize> {
        match self {
            Witness::Free(_) => None,
            Witness::Dependent { on, .. } => Some(*on),
        }
    }

    pub fn free(f: FreeWitness, examples: &Examples, spec: &Spec) -> Spec {
        Spec::disjunctive(
            examples
                .iter()
                .zip(spec.iter())
                .map(|(v, outs)| f(v, outs)),
        )
    }

    /// `chosen[s]` is the value the dependency takes on state `s`.
    pub fn dependent(f: DependentWitness, examples: &Examples, spec: &Spec, chosen: &[Value]) -> Spec {
        Spec::disjunctive(
            examples
                .iter()
                .zip(spec.iter())
                .zip(chosen)
                .map(|((v, outs), dep)| f(v, outs, *dep)),
        )
    }
}

/// Unordered index pairs `i < j` with `arr[i] + arr[j] == target`.
pub fn sum_pairs(arr: &[Value], target: Value) -> Vec<(Value, Value)> {
    let mut pairs = Vec::new();
    for i in 0..arr.len() {
        for j in i + 1..arr.len() {
            if arr[i].checked_add(arr[j]) == Some(target) {
                pairs.push((arr[i], arr[j]));
            }
        }
    }
    pairs
}

/// Unordered index pairs `i < j` with `arr[i] * arr[j] == target`.
pub fn mul_pairs(arr: &[Value], target: Value) -> Vec<(Value, Value)> {
    let mut pairs = Vec::new();
    for i in 0..arr.len() {
        for j in i + 1..arr.len() {
            if arr[i].checked_mul(arr[j]) == Some(target) {
                pairs.push((arr[i], arr[j]));
            }
        }
    }
    pairs
}

/// Ordered `(numerator, denominator)` pairs over distinct indices that divide
/// exactly to `target`.
pub fn div_pairs(arr: &[Value], target: Value) -> Vec<(Value, Value)> {
    let mut pairs = Vec::new();
    for i in 0..arr.len() {
        for j in 0..arr.len() {
            if i != j && exact_div(arr[i], arr[j]) == Some(target) {
                pairs.push((arr[i], arr[j]));
            }
        }
    }
    pairs
}

fn exact_div(num: Value, den: Value) -> Option<Value> {
    match num.checked_rem(den) {
        Some(0) => num.checked_div(den),
        _ => None,
    }
}

/// Every index holding `val`, not only the first.
pub fn indices_of(arr: &[Value], val: Value) -> impl Iterator<Item = Value> + '_ {
    arr.iter()
        .enumerate()
        .filter(move |(_, n)| **n == val)
        .filter_map(|(i, _)| Value::try_from(i).ok())
}

pub fn sum_lhs(v: &[Value], outs: &OrdSet<Value>) -> OrdSet<Value> {
    outs.iter()
        .flat_map(|o| sum_pairs(v, *o))
        .flat_map(|(a, b)| [a, b])
        .collect()
}

pub fn sum_rhs(_v: &[Value], outs: &OrdSet<Value>, lhs: Value) -> OrdSet<Value> {
    outs.iter().filter_map(|o| o.checked_sub(lhs)).collect()
}

pub fn mul_lhs(v: &[Value], outs: &OrdSet<Value>) -> OrdSet<Value> {
    outs.iter()
        .flat_map(|o| mul_pairs(v, *o))
        .flat_map(|(a, b)| [a, b])
        .collect()
}

pub fn mul_rhs(v: &[Value], outs: &OrdSet<Value>, lhs: Value) -> OrdSet<Value> {
    // 0 * b is 0 for every b; the array's values stand in for "anything"
    if lhs == 0 {
        return if outs.contains(&0) {
            v.iter().copied().collect()
        } else {
            OrdSet::new()
        };
    }
    outs.iter()
        .filter_map(|o| exact_div(*o, lhs))
        .filter(|rhs| lhs.checked_mul(*rhs).map_or(false, |o| outs.contains(&o)))
        .collect()
}

pub fn div_lhs(v: &[Value], outs: &OrdSet<Value>) -> OrdSet<Value> {
    outs.iter()
        .flat_map(|o| div_pairs(v, *o))
        .map(|(num, _)| num)
        .collect()
}

pub fn div_rhs(v: &[Value], outs: &OrdSet<Value>, lhs: Value) -> OrdSet<Value> {
    // 0 / b is exactly 0 for every nonzero b
    if lhs == 0 {
        return if outs.contains(&0) {
            v.iter().copied().filter(|n| *n != 0).collect()
        } else {
            OrdSet::new()
        };
    }
    outs.iter()
        .filter_map(|o| exact_div(lhs, *o))
        .filter(|rhs| exact_div(lhs, *rhs).map_or(false, |o| outs.contains(&o)))
        .collect()
}

pub fn element_at_pos(v: &[Value], outs: &OrdSet<Value>) -> OrdSet<Value> {
    outs.iter().flat_map(|o| indices_of(v, *o)).collect()
}
