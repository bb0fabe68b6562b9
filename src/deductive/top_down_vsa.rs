use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::rc::Rc;

use log::{debug, info, warn};
use lru::LruCache;

use super::limits::{Budget, Config};
use crate::error::SynthesisError;
use crate::grammar::{Grammar, Operator, Production, Symbol};
use crate::lang::{Value, AST};
use crate::rank::Ranked;
use crate::spec::{Examples, Spec};
use crate::vsa::{Clusterer, VSA};
use crate::witness::Witness;

type CacheKey = (Symbol, usize, Spec);

/// Top-down deductive search over the grammar. One synthesizer serves one
/// learning call: the memo and the budget are scoped to it.
pub struct Synthesizer<'a> {
    grammar: Grammar,
    examples: &'a Examples,
    budget: Budget,
    cache: LruCache<CacheKey, Rc<VSA>>,
    clusterer: Clusterer<'a>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(examples: &'a Examples, config: &Config) -> Self {
        let capacity = NonZeroUsize::new(config.limits.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Synthesizer {
            grammar: Grammar::default(),
            examples,
            budget: Budget::new(&config.limits),
            cache: LruCache::new(capacity),
            clusterer: Clusterer::new(examples),
        }
    }

    pub fn expansions(&self) -> u64 {
        self.budget.expansions()
    }

    /// Version space of every program derivable from `sym` with at most
    /// `depth` nested operators that satisfies `spec`.
    pub fn learn(&mut self, sym: Symbol, spec: &Spec, depth: usize) -> Result<Rc<VSA>, SynthesisError> {
        if spec.is_unsatisfiable() {
            return Ok(Rc::new(VSA::empty()));
        }

        let key = (sym, depth, spec.clone());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        self.budget.tick()?;

        let vsa = match sym {
            // specs range over integers, which the input array never is
            Symbol::Input => VSA::empty(),
            Symbol::K => {
                let lits = spec.common().into_iter().map(AST::Lit).collect();
                VSA::Leaf(lits)
            }
            Symbol::Start => {
                let mut members = Vec::new();
                for prod in self.grammar.productions_of(sym).to_vec() {
                    let space = match prod {
                        Production::Literal => self.learn(Symbol::K, spec, depth)?,
                        Production::Op(_) if depth == 0 => continue,
                        Production::Op(fun) => {
                            Rc::new(self.learn_op(Operator::get(fun), spec, depth - 1)?)
                        }
                    };
                    if !space.is_empty() {
                        members.push(space);
                    }
                }
                VSA::union(members)
            }
        };

        let vsa = Rc::new(vsa);
        self.cache.put(key, vsa.clone());
        Ok(vsa)
    }

    fn learn_op(&mut self, op: &Operator, spec: &Spec, depth: usize) -> Result<VSA, SynthesisError> {
        let joins = self.learn_params(op, spec, depth, vec![Rc::new(VSA::input())], &HashMap::new())?;
        if !joins.is_empty() {
            debug!("{}: {} branches for {:?}", op.fun.name(), joins.len(), spec);
        }
        Ok(VSA::union(joins))
    }

    /// Learns parameter `children.len()` onwards. `chosen` holds the concrete
    /// per-state values fixed for dependency parameters so far.
    fn learn_params(
        &mut self,
        op: &Operator,
        spec: &Spec,
        depth: usize,
        children: Vec<Rc<VSA>>,
        chosen: &HashMap<usize, Vec<Value>>,
    ) -> Result<Vec<Rc<VSA>>, SynthesisError> {
        let i = children.len();
        if i == op.params.len() {
            return Ok(vec![Rc::new(VSA::join(op.fun, children))]);
        }

        let param_spec = match op.witnesses[i - 1] {
            Witness::Free(f) => Witness::free(f, self.examples, spec),
            Witness::Dependent { on, f } => match chosen.get(&on) {
                Some(vals) => Witness::dependent(f, self.examples, spec, vals),
                None => {
                    warn!("{}: parameter {} depends on unbound parameter {}", op.fun.name(), i, on);
                    return Ok(Vec::new());
                }
            },
        };
        if param_spec.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let space = self.learn(op.params[i], &param_spec, depth)?;
        if space.is_empty() {
            return Ok(Vec::new());
        }

        if !op.is_dependency(i) {
            let mut next = children;
            next.push(space);
            return self.learn_params(op, spec, depth, next, chosen);
        }

        // Each cluster fixes one value per state. That exact spec is both
        // what the cluster satisfies and what later witnesses consume.
        let mut joins = Vec::new();
        let clusters = self.clusterer.cluster(&space);
        for (vals, cluster) in clusters.iter() {
            self.budget.tick()?;
            let mut next = children.clone();
            next.push(cluster.clone());
            let mut bound = chosen.clone();
            bound.insert(i, vals.clone());
            joins.extend(self.learn_params(op, spec, depth, next, &bound)?);
        }
        Ok(joins)
    }
}

/// The whole version space for `examples`, empty when nothing fits.
pub fn version_space(examples: &[(Vec<Value>, Value)], config: &Config) -> Result<Rc<VSA>, SynthesisError> {
    if examples.is_empty() {
        return Err(SynthesisError::NoExamples);
    }

    let states = Examples::new(examples.iter().map(|(inp, _)| inp.clone()));
    let spec = Spec::exact(examples.iter().map(|(_, out)| *out));

    let mut synth = Synthesizer::new(&states, config);
    let start = synth.grammar.start;
    let vsa = synth.learn(start, &spec, config.limits.max_depth)?;
    debug!(
        "version space: {} nodes, {} programs, {} expansions",
        vsa.size(),
        vsa.count(),
        synth.expansions()
    );
    Ok(vsa)
}

/// Learns the top programs for `examples`, best first. Every returned program
/// reproduces every example. With `top_k == 0` this only checks that some
/// program exists.
pub fn synthesize(examples: &[(Vec<Value>, Value)], config: &Config) -> Result<Vec<Ranked>, SynthesisError> {
    let vsa = version_space(examples, config)?;
    if vsa.is_empty() {
        info!("no program for {} examples", examples.len());
        return Err(SynthesisError::Unsatisfiable);
    }
    if config.top_k == 0 {
        return Ok(Vec::new());
    }

    let states = Examples::new(examples.iter().map(|(inp, _)| inp.clone()));
    let spec = Spec::exact(examples.iter().map(|(_, out)| *out));
    let ranked = vsa
        .top_k(config.top_k)
        .into_iter()
        .filter(|r| {
            let ok = spec.satisfied_by(&r.program, &states);
            if !ok {
                warn!("dropping unsound candidate {}", r.program);
            }
            ok
        })
        .collect::<Vec<_>>();

    if ranked.is_empty() {
        return Err(SynthesisError::Unsatisfiable);
    }
    Ok(ranked)
}
