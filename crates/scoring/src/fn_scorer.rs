//! Closure-backed scoring model.

use crate::traits::{Prediction, ScoringModel};
use data_loader::RawId;

/// Adapts any `Fn(&RawId, &RawId) -> f64` into a [`ScoringModel`].
///
/// ```ignore
/// let scorer = FnScorer::new("constant", |_, _| 3.0);
/// assert_eq!(scorer.predict(&1u32.into(), &2u32.into()).estimate, 3.0);
/// ```
pub struct FnScorer<F> {
    name: String,
    score: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&RawId, &RawId) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, score: F) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

impl<F> ScoringModel for FnScorer<F>
where
    F: Fn(&RawId, &RawId) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, user: &RawId, item: &RawId) -> Prediction {
        Prediction::new(user.clone(), item.clone(), (self.score)(user, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_scorer() {
        let scorer = FnScorer::new("sum", |u: &RawId, i: &RawId| match (u, i) {
            (RawId::Int(u), RawId::Int(i)) => (*u + *i) as f64,
            _ => 0.0,
        });

        let pred = scorer.predict(&RawId::Int(2), &RawId::Int(5));
        assert_eq!(scorer.name(), "sum");
        assert_eq!(pred.user, RawId::Int(2));
        assert_eq!(pred.item, RawId::Int(5));
        assert_eq!(pred.estimate, 7.0);
        assert!(pred.impossible.is_none());
    }
}
