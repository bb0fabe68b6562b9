use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use im::OrdSet;
use itertools::Itertools;

use crate::lang::{Fun, Lit, Value, AST};
use crate::rank::{self, Ranked};
use crate::spec::Examples;

/// A version space: every program of some symbol that satisfies some spec,
/// kept as a graph of unions and joins instead of a list.
#[derive(Debug)]
pub enum VSA {
    /// Terminal programs (`Input` and literals).
    Leaf(OrdSet<AST>),
    Union(Vec<Rc<VSA>>),
    /// Cross product of the children, each the space of one argument of `fun`.
    Join { fun: Fun, children: Vec<Rc<VSA>> },
}

impl Default for VSA {
    fn default() -> Self {
        VSA::empty()
    }
}

impl VSA {
    pub fn empty() -> Self {
        VSA::Union(Vec::new())
    }

    pub fn singleton(prog: AST) -> Self {
        VSA::Leaf(OrdSet::unit(prog))
    }

    pub fn input() -> Self {
        VSA::singleton(AST::Input)
    }

    /// Union that drops empty members and collapses trivial cases.
    pub fn union(members: Vec<Rc<VSA>>) -> Self {
        let mut members = members
            .into_iter()
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>();
        match members.len() {
            0 => VSA::empty(),
            1 => match Rc::try_unwrap(members.remove(0)) {
                Ok(vsa) => vsa,
                Err(rc) => VSA::Union(vec![rc]),
            },
            _ => VSA::Union(members),
        }
    }

    /// Join that is empty as soon as one argument space is.
    pub fn join(fun: Fun, children: Vec<Rc<VSA>>) -> Self {
        if children.iter().any(|c| c.is_empty()) {
            VSA::empty()
        } else {
            VSA::Join { fun, children }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            VSA::Leaf(progs) => progs.is_empty(),
            VSA::Union(members) => members.iter().all(|m| m.is_empty()),
            VSA::Join { children, .. } => children.iter().any(|c| c.is_empty()),
        }
    }

    /// Number of programs represented, counting shared ones once per path.
    pub fn count(&self) -> u128 {
        match self {
            VSA::Leaf(progs) => progs.len() as u128,
            VSA::Union(members) => members
                .iter()
                .fold(0u128, |acc, m| acc.saturating_add(m.count())),
            VSA::Join { children, .. } => children
                .iter()
                .fold(1u128, |acc, c| acc.saturating_mul(c.count())),
        }
    }

    /// Number of nodes in the graph, counting shared nodes once.
    pub fn size(self: &Rc<Self>) -> usize {
        fn go(node: &Rc<VSA>, seen: &mut HashSet<*const VSA>) -> usize {
            if !seen.insert(Rc::as_ptr(node)) {
                return 0;
            }
            1 + match &**node {
                VSA::Leaf(_) => 0,
                VSA::Union(cs) | VSA::Join { children: cs, .. } => {
                    cs.iter().map(|c| go(c, seen)).sum()
                }
            }
        }
        go(self, &mut HashSet::new())
    }

    /// Membership test that walks the graph instead of enumerating it.
    pub fn contains(&self, prog: &AST) -> bool {
        match (self, prog) {
            (VSA::Leaf(progs), _) => progs.contains(prog),
            (VSA::Union(members), _) => members.iter().any(|m| m.contains(prog)),
            (VSA::Join { fun, children }, AST::App { fun: f, args }) => {
                fun == f
                    && children.len() == args.len()
                    && children.iter().zip(args).all(|(c, a)| c.contains(a))
            }
            (VSA::Join { .. }, _) => false,
        }
    }

    /// Up to `limit` programs in enumeration order.
    pub fn programs(&self, limit: usize) -> Vec<AST> {
        match self {
            VSA::Leaf(progs) => progs.iter().take(limit).cloned().collect(),
            VSA::Union(members) => {
                let mut res = Vec::new();
                for m in members {
                    if res.len() >= limit {
                        break;
                    }
                    res.extend(m.programs(limit - res.len()));
                }
                res
            }
            VSA::Join { fun, children } => children
                .iter()
                .map(|c| c.programs(limit))
                .multi_cartesian_product()
                .take(limit)
                .map(|args| AST::App { fun: *fun, args })
                .collect(),
        }
    }

    /// The `k` best distinct programs, highest score first. Equal scores keep
    /// enumeration order.
    pub fn top_k(self: &Rc<Self>, k: usize) -> Vec<Ranked> {
        if k == 0 {
            return Vec::new();
        }
        let mut extractor = Extractor {
            k,
            memo: HashMap::new(),
        };
        extractor.extract(self).as_ref().clone()
    }

    pub fn pick_one(self: &Rc<Self>) -> Option<AST> {
        self.top_k(1).into_iter().next().map(|r| r.program)
    }
}

struct Extractor {
    k: usize,
    memo: HashMap<*const VSA, Rc<Vec<Ranked>>>,
}

impl Extractor {
    fn extract(&mut self, node: &Rc<VSA>) -> Rc<Vec<Ranked>> {
        let key = Rc::as_ptr(node);
        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }

        let ranked = match &**node {
            // not truncated: ElementAt ranks its position by value, not score
            VSA::Leaf(progs) => progs
                .iter()
                .map(|p| Ranked {
                    score: rank::score(p),
                    program: p.clone(),
                })
                .collect(),
            VSA::Union(members) => {
                let all = members
                    .iter()
                    .flat_map(|m| self.extract(m).as_ref().clone())
                    .collect();
                self.best(all)
            }
            VSA::Join { fun, children } => {
                let lists = children.iter().map(|c| self.extract(c)).collect::<Vec<_>>();
                let all = lists
                    .iter()
                    .map(|l| l.iter())
                    .multi_cartesian_product()
                    .map(|args| Ranked {
                        score: rank::combine(*fun, &args),
                        program: AST::App {
                            fun: *fun,
                            args: args.iter().map(|a| a.program.clone()).collect(),
                        },
                    })
                    .collect();
                self.best(all)
            }
        };

        let ranked = Rc::new(ranked);
        self.memo.insert(key, ranked.clone());
        ranked
    }

    fn best(&self, mut all: Vec<Ranked>) -> Vec<Ranked> {
        all.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut seen = HashSet::new();
        all.into_iter()
            .filter(|r| seen.insert(r.program.clone()))
            .take(self.k)
            .collect()
    }
}

/// Sub-spaces grouped by the values their programs produce on each state.
pub type Clusters = Rc<Vec<(Vec<Value>, Rc<VSA>)>>;

/// Splits version spaces into clusters of programs that agree on every state.
///
/// Joins are expected to carry the `Input` leaf as their first child, the
/// same layout `AST::App` uses.
pub struct Clusterer<'a> {
    examples: &'a Examples,
    // the node is kept alive so its address cannot be reused
    memo: HashMap<*const VSA, (Rc<VSA>, Clusters)>,
}

impl<'a> Clusterer<'a> {
    pub fn new(examples: &'a Examples) -> Self {
        Clusterer {
            examples,
            memo: HashMap::new(),
        }
    }

    pub fn cluster(&mut self, node: &Rc<VSA>) -> Clusters {
        let key = Rc::as_ptr(node);
        if let Some((_, hit)) = self.memo.get(&key) {
            return hit.clone();
        }

        let clusters: Vec<(Vec<Value>, Rc<VSA>)> = match &**node {
            VSA::Leaf(progs) => {
                let mut groups: BTreeMap<Vec<Value>, OrdSet<AST>> = BTreeMap::new();
                for prog in progs {
                    if let Some(outs) = self.outputs(prog) {
                        groups.entry(outs).or_default().insert(prog.clone());
                    }
                }
                groups
                    .into_iter()
                    .map(|(outs, progs)| (outs, Rc::new(VSA::Leaf(progs))))
                    .collect()
            }
            VSA::Union(members) => {
                let mut groups: BTreeMap<Vec<Value>, Vec<Rc<VSA>>> = BTreeMap::new();
                for m in members {
                    for (outs, sub) in self.cluster(m).iter() {
                        groups.entry(outs.clone()).or_default().push(sub.clone());
                    }
                }
                union_groups(groups)
            }
            VSA::Join { fun, children } => match children.split_first() {
                Some((input, params)) => {
                    let lists = params.iter().map(|c| self.cluster(c)).collect::<Vec<_>>();
                    let mut groups: BTreeMap<Vec<Value>, Vec<Rc<VSA>>> = BTreeMap::new();
                    for combo in lists.iter().map(|l| l.iter()).multi_cartesian_product() {
                        let outs = (0..self.examples.len())
                            .map(|s| {
                                let args = combo
                                    .iter()
                                    .map(|(vals, _)| Lit::Defined(vals[s]))
                                    .collect::<Vec<_>>();
                                fun.apply(self.examples.state(s), &args)
                                    .ok()
                                    .and_then(Lit::defined)
                            })
                            .collect::<Option<Vec<_>>>();
                        if let Some(outs) = outs {
                            let children = std::iter::once(input.clone())
                                .chain(combo.iter().map(|(_, sub)| sub.clone()))
                                .collect();
                            groups
                                .entry(outs)
                                .or_default()
                                .push(Rc::new(VSA::Join { fun: *fun, children }));
                        }
                    }
                    union_groups(groups)
                }
                None => Vec::new(),
            },
        };

        let clusters = Rc::new(clusters);
        self.memo.insert(key, (node.clone(), clusters.clone()));
        clusters
    }

    fn outputs(&self, prog: &AST) -> Option<Vec<Value>> {
        self.examples
            .iter()
            .map(|inp| prog.eval(inp).ok().and_then(Lit::defined))
            .collect()
    }
}

fn union_groups(groups: BTreeMap<Vec<Value>, Vec<Rc<VSA>>>) -> Vec<(Vec<Value>, Rc<VSA>)> {
    groups
        .into_iter()
        .map(|(outs, members)| (outs, Rc::new(VSA::union(members))))
        .filter(|(_, vsa)| !vsa.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(ps: &[i64]) -> Rc<VSA> {
        Rc::new(VSA::Leaf(ps.iter().map(|p| AST::Lit(*p)).collect()))
    }

    fn element_at(ps: &[i64]) -> Rc<VSA> {
        Rc::new(VSA::join(Fun::ElementAt, vec![Rc::new(VSA::input()), positions(ps)]))
    }

    #[test]
    fn empty_join_prunes() {
        let vsa = VSA::join(Fun::Sum, vec![Rc::new(VSA::input()), element_at(&[1]), Rc::new(VSA::empty())]);
        assert!(vsa.is_empty());
        assert_eq!(vsa.count(), 0);
    }

    #[test]
    fn count_is_lazy_cross_product() {
        let vsa = VSA::join(Fun::Sum, vec![Rc::new(VSA::input()), element_at(&[0, 1, 2]), element_at(&[3, 4])]);
        assert_eq!(vsa.count(), 6);
        assert_eq!(vsa.programs(100).len(), 6);
        assert_eq!(vsa.programs(4).len(), 4);
    }

    #[test]
    fn top_k_orders_by_score_then_enumeration() {
        let vsa = Rc::new(VSA::union(vec![
            Rc::new(VSA::singleton(AST::Lit(7))),
            element_at(&[0, 2, 1]),
        ]));
        let top = vsa.top_k(4);
        let progs = top.iter().map(|r| r.program.clone()).collect::<Vec<_>>();
        assert_eq!(
            progs,
            vec![AST::element_at(2), AST::element_at(1), AST::Lit(7), AST::element_at(0)]
        );
        assert_eq!(top[0].score, 2.0);
    }

    #[test]
    fn top_k_is_distinct() {
        let shared = element_at(&[1]);
        let vsa = Rc::new(VSA::Union(vec![shared.clone(), shared]));
        assert_eq!(vsa.top_k(4).len(), 1);
        assert_eq!(vsa.pick_one(), Some(AST::element_at(1)));
    }

    #[test]
    fn contains_walks_joins() {
        let vsa = VSA::join(Fun::Sum, vec![Rc::new(VSA::input()), element_at(&[0, 1]), element_at(&[2])]);
        assert!(vsa.contains(&AST::sum(AST::element_at(1), AST::element_at(2))));
        assert!(!vsa.contains(&AST::sum(AST::element_at(2), AST::element_at(1))));
        assert!(!vsa.contains(&AST::mul(AST::element_at(1), AST::element_at(2))));
        assert!(!vsa.contains(&AST::Lit(1)));
    }

    #[test]
    fn empty_space_yields_nothing() {
        let vsa = Rc::new(VSA::empty());
        assert!(vsa.top_k(4).is_empty());
        assert_eq!(vsa.pick_one(), None);
    }

    #[test]
    fn shared_nodes_counted_once_in_size() {
        let shared = element_at(&[1, 2]);
        let vsa = Rc::new(VSA::join(Fun::Mul, vec![Rc::new(VSA::input()), shared.clone(), shared]));
        // join, input leaf, element_at join, its input leaf, positions leaf
        assert_eq!(vsa.size(), 5);
    }

    #[test]
    fn cluster_groups_by_outputs() {
        let examples = Examples::new(vec![vec![5, 5, 9], vec![7, 7, 7]]);
        let mut clusterer = Clusterer::new(&examples);
        let vsa = Rc::new(VSA::union(vec![
            element_at(&[0, 1, 2]),
            Rc::new(VSA::singleton(AST::Lit(5))),
        ]));
        let clusters = clusterer.cluster(&vsa);
        let keys = clusters.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>();
        assert_eq!(keys, vec![vec![5, 5], vec![5, 7], vec![9, 7]]);
        assert_eq!(clusters[0].1.pick_one(), Some(AST::Lit(5)));
        // ElementAt(0) and ElementAt(1) agree on both states
        assert_eq!(clusters[1].1.count(), 2);
        assert_eq!(clusters[2].1.pick_one(), Some(AST::element_at(2)));
    }

    #[test]
    fn cluster_drops_faulting_programs() {
        let examples = Examples::new(vec![vec![1, 2, 3], vec![4]]);
        let mut clusterer = Clusterer::new(&examples);
        let clusters = clusterer.cluster(&element_at(&[0, 2]));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].0, vec![1, 4]);
    }
}
