use derive_more::Deref;
use log::{trace, warn};
use ndarray::{s, Array1};
use serde::{Deserialize, Serialize};

use crate::{
    config::LearnerConfig,
    features::{difference, dot, view_or_empty, zero_padded, FeatureVector},
    utils::sigmoid,
};

/// The global taste weights, one per feature dimension.
///
/// Grows with zero padding up to the largest feature dimension seen and never shrinks.
#[derive(Clone, Debug, Default, Deref, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f32>", into = "Vec<f32>")]
pub struct Weights(Array1<f32>);

impl Weights {
    /// Scores the features with the learned taste, `w · features`.
    pub fn score(&self, features: Option<&FeatureVector>) -> f32 {
        dot(self.0.view(), view_or_empty(features))
    }

    /// Right-pads the weights with zeros up to `len`.
    fn grow(&mut self, len: usize) {
        if len > self.0.len() {
            self.0 = zero_padded(self.0.view(), len);
        }
    }
}

impl From<Vec<f32>> for Weights {
    fn from(weights: Vec<f32>) -> Self {
        Self(Array1::from(weights))
    }
}

impl From<Weights> for Vec<f32> {
    fn from(weights: Weights) -> Self {
        weights.0.to_vec()
    }
}

/// Online logistic regression over the difference of two feature vectors.
#[derive(Clone, Debug)]
pub(crate) struct WeightLearner {
    config: LearnerConfig,
}

impl WeightLearner {
    pub(crate) fn new(config: LearnerConfig) -> Self {
        Self { config }
    }

    /// Takes a single gradient step for the pair `(a, b)`, where `a_won` tells which side was
    /// picked.
    pub(crate) fn update(
        &self,
        weights: &mut Weights,
        a: Option<&FeatureVector>,
        b: Option<&FeatureVector>,
        a_won: bool,
    ) {
        let delta = self.capped(difference(view_or_empty(a), view_or_empty(b)));
        weights.grow(delta.len());

        let target = if a_won { 1. } else { 0. };
        let p = sigmoid(dot(weights.view(), delta.view()));
        let delta = zero_padded(delta.view(), weights.len());
        let gradient = delta * (target - p) - &weights.0 * self.config.l2();
        weights.0.scaled_add(self.config.learning_rate(), &gradient);

        trace!("learner step: p = {}, target = {}", p, target);
    }

    /// Drops the dimensions beyond the configured maximum.
    fn capped(&self, delta: Array1<f32>) -> Array1<f32> {
        let max_dimension = self.config.max_dimension();
        if delta.len() > max_dimension {
            warn!(
                "feature dimension {} exceeds the maximum of {}, extra dimensions are ignored",
                delta.len(),
                max_dimension,
            );
            delta.slice(s![..max_dimension]).to_owned()
        } else {
            delta
        }
    }
}
