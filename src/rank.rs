use crate::lang::{Fun, AST};

/// A concrete program pulled out of a version space, with its rank score.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranked {
    pub score: f64,
    pub program: AST,
}

// Scores never go negative: leaves are 0, ElementAt scores its index, and
// sums/products of non-negative scores stay non-negative. Every rule is thus
// monotone in its children, which is what lets extraction keep only the top
// entries of each child.

/// Score of a whole program, computed bottom-up.
pub fn score(prog: &AST) -> f64 {
    match prog {
        AST::Input | AST::Lit(_) => 0.0,
        AST::App { fun, args } => {
            let scored = args
                .iter()
                .map(|a| Ranked {
                    score: score(a),
                    program: a.clone(),
                })
                .collect::<Vec<_>>();
            combine(*fun, &scored.iter().collect::<Vec<_>>())
        }
    }
}

/// Score of `fun` applied to already scored arguments (`Input` included).
pub fn combine(fun: Fun, args: &[&Ranked]) -> f64 {
    let param = |i: usize| args.get(i).map_or(0.0, |r| r.score);
    match fun {
        Fun::Sum => param(1) + param(2),
        Fun::Mul | Fun::Div => param(1) * param(2),
        Fun::ElementAt => match args.get(1) {
            Some(Ranked { program: AST::Lit(pos), .. }) => (*pos).max(0) as f64,
            _ => param(1),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_score_zero() {
        assert_eq!(score(&AST::Lit(42)), 0.0);
        assert_eq!(score(&AST::Input), 0.0);
    }

    #[test]
    fn element_at_scores_its_index() {
        assert_eq!(score(&AST::element_at(2)), 2.0);
    }

    #[test]
    fn sum_adds_and_mul_multiplies() {
        let (a, b) = (AST::element_at(2), AST::element_at(3));
        assert_eq!(score(&AST::sum(a.clone(), b.clone())), 5.0);
        assert_eq!(score(&AST::mul(a.clone(), b.clone())), 6.0);
        assert_eq!(score(&AST::div(a.clone(), b)), 6.0);
        assert_eq!(score(&AST::sum(a, AST::Lit(4))), 2.0);
    }
}
