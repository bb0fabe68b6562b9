use std::rc::Rc;

use im::{OrdSet, Vector};
use itertools::Itertools;

use crate::lang::{Value, AST};

/// The input states of one learning call. Every `Spec` built during that
/// call is index-aligned with it.
#[derive(Clone, Debug, Default)]
pub struct Examples {
    states: Vec<Rc<[Value]>>,
}

impl Examples {
    pub fn new(states: impl IntoIterator<Item = Vec<Value>>) -> Self {
        Examples {
            states: states.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, i: usize) -> &[Value] {
        &self.states[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.states.iter().map(|s| &**s)
    }
}

/// Disjunctive example spec: per state, the set of acceptable outputs. An
/// example spec is the special case where every set is a singleton.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Spec {
    outputs: Vector<OrdSet<Value>>,
}

impl Spec {
    pub fn exact(outputs: impl IntoIterator<Item = Value>) -> Self {
        Spec {
            outputs: outputs.into_iter().map(OrdSet::unit).collect(),
        }
    }

    pub fn disjunctive(outputs: impl IntoIterator<Item = OrdSet<Value>>) -> Self {
        Spec {
            outputs: outputs.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn outputs(&self, state: usize) -> &OrdSet<Value> {
        &self.outputs[state]
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrdSet<Value>> + '_ {
        self.outputs.iter()
    }

    /// Some state accepts nothing, so no program can satisfy the spec.
    pub fn is_unsatisfiable(&self) -> bool {
        self.outputs.iter().any(OrdSet::is_empty)
    }

    pub fn is_exact(&self) -> bool {
        self.outputs.iter().all(|o| o.len() == 1)
    }

    /// Values accepted by every state at once.
    pub fn common(&self) -> OrdSet<Value> {
        let mut iter = self.outputs.iter();
        match iter.next() {
            Some(first) => iter.fold(first.clone(), |acc, o| acc.intersection(o.clone())),
            None => OrdSet::new(),
        }
    }

    /// Every way of picking one acceptable value per state, as exact specs.
    pub fn combinations(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.outputs
            .iter()
            .map(|o| o.iter().copied().collect::<Vec<_>>())
            .multi_cartesian_product()
    }

    pub fn satisfied_by(&self, prog: &AST, examples: &Examples) -> bool {
        examples.iter().zip(self.outputs.iter()).all(|(inp, out)| {
            prog.eval(inp)
                .ok()
                .and_then(|l| l.defined())
                .map_or(false, |n| out.contains(&n))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::ordset;

    #[test]
    fn combinations_pick_one_per_state() {
        let spec = Spec::disjunctive(vec![
            ordset![1, 2],
            ordset![3],
            ordset![4, 5],
        ]);
        let combos = spec.combinations().collect::<Vec<_>>();
        assert_eq!(
            combos,
            vec![vec![1, 3, 4], vec![1, 3, 5], vec![2, 3, 4], vec![2, 3, 5]]
        );
    }

    #[test]
    fn common_values() {
        let spec = Spec::disjunctive(vec![ordset![1, 2, 3], ordset![2, 3, 4]]);
        assert_eq!(spec.common(), ordset![2, 3]);
        assert!(!spec.is_unsatisfiable());
        assert!(Spec::disjunctive(vec![OrdSet::new()]).is_unsatisfiable());
    }

    #[test]
    fn satisfied_by_membership_per_state() {
        let examples = Examples::new(vec![vec![1, 2], vec![5, 6]]);
        let spec = Spec::disjunctive(vec![ordset![2, 9], ordset![6]]);
        assert!(spec.satisfied_by(&AST::element_at(1), &examples));
        assert!(!spec.satisfied_by(&AST::element_at(0), &examples));
        assert!(!spec.satisfied_by(&AST::element_at(4), &examples));
    }
}
