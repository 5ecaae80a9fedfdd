use displaydoc::Display;
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

/// Potential errors of the engine configuration.
#[derive(Copy, Clone, Debug, Display, Error, PartialEq)]
pub enum ConfigError {
    /// Invalid learning rate, expected positive finite value
    LearningRate,
    /// Invalid regularization, expected non-negative finite value
    Regularization,
    /// Invalid Elo initial rating, expected finite value
    EloInitial,
    /// Invalid Elo k-factor, expected positive finite value
    EloK,
    /// Invalid Elo scale, expected positive finite value
    EloScale,
    /// Invalid maximum feature dimension, expected positive value
    MaxDimension,
    /// Invalid boundary window, expected positive value
    Window,
    /// Invalid pivot noise scale, expected non-negative finite value
    PivotScale,
    /// Invalid MMR lambda, expected value from the unit interval
    Lambda,
    /// Invalid relevance weight, expected finite value
    RelevanceWeight,
}

fn positive(value: f32, error: ConfigError) -> Result<f32, ConfigError> {
    (value.is_finite() && value > 0.)
        .then(|| value)
        .ok_or(error)
}

fn non_negative(value: f32, error: ConfigError) -> Result<f32, ConfigError> {
    (value.is_finite() && value >= 0.)
        .then(|| value)
        .ok_or(error)
}

fn finite(value: f32, error: ConfigError) -> Result<f32, ConfigError> {
    value.is_finite().then(|| value).ok_or(error)
}

/// Selects how item strengths are learned from the comparison outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum StrengthStrategy {
    /// Bradley-Terry-Luce parameters with accumulated Fisher information.
    Btl = 0,
    /// Elo ratings with an experience decaying k-factor.
    Elo = 1,
}

impl Default for StrengthStrategy {
    fn default() -> Self {
        Self::Btl
    }
}

/// The configuration of the Bradley-Terry-Luce strength model.
#[derive(Clone, Debug, PartialEq)]
pub struct BtlConfig {
    learning_rate: f32,
    shrinkage: f32,
}

impl BtlConfig {
    /// The step size of a single update.
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Sets the learning rate.
    ///
    /// # Errors
    /// Fails if the learning rate is not positive.
    pub fn with_learning_rate(self, learning_rate: f32) -> Result<Self, ConfigError> {
        positive(learning_rate, ConfigError::LearningRate).map(|learning_rate| Self {
            learning_rate,
            ..self
        })
    }

    /// The L2 shrinkage of the strengths towards zero.
    pub fn shrinkage(&self) -> f32 {
        self.shrinkage
    }

    /// Sets the shrinkage.
    ///
    /// # Errors
    /// Fails if the shrinkage is negative.
    pub fn with_shrinkage(self, shrinkage: f32) -> Result<Self, ConfigError> {
        non_negative(shrinkage, ConfigError::Regularization)
            .map(|shrinkage| Self { shrinkage, ..self })
    }
}

impl Default for BtlConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.35,
            shrinkage: 1e-3,
        }
    }
}

/// The configuration of the Elo strength model.
#[derive(Clone, Debug, PartialEq)]
pub struct EloConfig {
    initial: f32,
    base_k: f32,
    scale: f32,
}

impl EloConfig {
    /// The rating of an item which was never compared.
    pub fn initial(&self) -> f32 {
        self.initial
    }

    /// Sets the initial rating.
    ///
    /// # Errors
    /// Fails if the initial rating is not finite.
    pub fn with_initial(self, initial: f32) -> Result<Self, ConfigError> {
        finite(initial, ConfigError::EloInitial).map(|initial| Self { initial, ..self })
    }

    /// The k-factor of an item which was never compared.
    ///
    /// The effective k-factor decays with `1 / sqrt(1 + comparisons)`.
    pub fn base_k(&self) -> f32 {
        self.base_k
    }

    /// Sets the base k-factor.
    ///
    /// # Errors
    /// Fails if the k-factor is not positive.
    pub fn with_base_k(self, base_k: f32) -> Result<Self, ConfigError> {
        positive(base_k, ConfigError::EloK).map(|base_k| Self { base_k, ..self })
    }

    /// The rating difference at which the stronger item is expected to win 10 out of 11 times.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the scale.
    ///
    /// # Errors
    /// Fails if the scale is not positive.
    pub fn with_scale(self, scale: f32) -> Result<Self, ConfigError> {
        positive(scale, ConfigError::EloScale).map(|scale| Self { scale, ..self })
    }
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial: 1200.,
            base_k: 32.,
            scale: 400.,
        }
    }
}

/// The configuration of the content weight learner.
#[derive(Clone, Debug, PartialEq)]
pub struct LearnerConfig {
    learning_rate: f32,
    l2: f32,
    max_dimension: usize,
}

impl LearnerConfig {
    /// The constants used by the interactive client.
    pub fn client() -> Self {
        Self {
            learning_rate: 0.6,
            l2: 1e-3,
            ..Self::default()
        }
    }

    /// The constants used by the server side mirror.
    pub fn server() -> Self {
        Self::default()
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Sets the learning rate.
    ///
    /// # Errors
    /// Fails if the learning rate is not positive.
    pub fn with_learning_rate(self, learning_rate: f32) -> Result<Self, ConfigError> {
        positive(learning_rate, ConfigError::LearningRate).map(|learning_rate| Self {
            learning_rate,
            ..self
        })
    }

    pub fn l2(&self) -> f32 {
        self.l2
    }

    /// Sets the L2 regularization.
    ///
    /// # Errors
    /// Fails if the regularization is negative.
    pub fn with_l2(self, l2: f32) -> Result<Self, ConfigError> {
        non_negative(l2, ConfigError::Regularization).map(|l2| Self { l2, ..self })
    }

    /// The maximum length the weight vector may grow to.
    ///
    /// Feature dimensions beyond it are ignored by the learner.
    pub fn max_dimension(&self) -> usize {
        self.max_dimension
    }

    /// Sets the maximum dimension.
    ///
    /// # Errors
    /// Fails if the maximum dimension is zero.
    pub fn with_max_dimension(self, max_dimension: usize) -> Result<Self, ConfigError> {
        if max_dimension > 0 {
            Ok(Self {
                max_dimension,
                ..self
            })
        } else {
            Err(ConfigError::MaxDimension)
        }
    }
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.08,
            l2: 1e-4,
            max_dimension: 4096,
        }
    }
}

/// How the pivot of the next pair is picked from the boundary window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PivotPolicy {
    /// The most uncertain item, ties are broken by the window order.
    MostUncertain,
    /// The item with the largest strength draw `strength + scale * uncertainty * N(0, 1)`.
    Sampled { scale: f32 },
}

impl Default for PivotPolicy {
    fn default() -> Self {
        Self::MostUncertain
    }
}

/// The configuration of the active learning pair selector.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorConfig {
    window: usize,
    allow_repeats: bool,
    pivot: PivotPolicy,
}

impl SelectorConfig {
    /// The number of items around the median strength from which the pivot is picked.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Sets the window.
    ///
    /// # Errors
    /// Fails if the window is zero.
    pub fn with_window(self, window: usize) -> Result<Self, ConfigError> {
        if window > 0 {
            Ok(Self { window, ..self })
        } else {
            Err(ConfigError::Window)
        }
    }

    /// Whether an already shown pair may be offered again once all pairs have been shown.
    pub fn allow_repeats(&self) -> bool {
        self.allow_repeats
    }

    /// Sets whether repeats are allowed.
    pub fn with_allow_repeats(self, allow_repeats: bool) -> Self {
        Self {
            allow_repeats,
            ..self
        }
    }

    pub fn pivot(&self) -> PivotPolicy {
        self.pivot
    }

    /// Sets the pivot policy.
    ///
    /// # Errors
    /// Fails if the scale of a sampled policy is negative.
    pub fn with_pivot(self, pivot: PivotPolicy) -> Result<Self, ConfigError> {
        if let PivotPolicy::Sampled { scale } = pivot {
            non_negative(scale, ConfigError::PivotScale)?;
        }
        Ok(Self { pivot, ..self })
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            window: 24,
            allow_repeats: false,
            pivot: PivotPolicy::default(),
        }
    }
}

/// The configuration of the diversity aware top-k selection.
#[derive(Clone, Debug, PartialEq)]
pub struct MmrConfig {
    lambda: f32,
    weight_score: f32,
    weight_strength: f32,
    reason: String,
}

impl MmrConfig {
    /// The trade-off between relevance (`1`) and diversity (`0`).
    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    /// Sets the lambda.
    ///
    /// # Errors
    /// Fails if the lambda is outside of the unit interval.
    pub fn with_lambda(self, lambda: f32) -> Result<Self, ConfigError> {
        check_lambda(lambda).map(|lambda| Self { lambda, ..self })
    }

    /// The weight of the content score `w · features` in the relevance.
    pub fn weight_score(&self) -> f32 {
        self.weight_score
    }

    /// The weight of the pairwise strength in the relevance.
    pub fn weight_strength(&self) -> f32 {
        self.weight_strength
    }

    /// Sets the relevance weights.
    ///
    /// # Errors
    /// Fails if any weight is not finite.
    pub fn with_relevance_weights(
        self,
        weight_score: f32,
        weight_strength: f32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            weight_score: finite(weight_score, ConfigError::RelevanceWeight)?,
            weight_strength: finite(weight_strength, ConfigError::RelevanceWeight)?,
            ..self
        })
    }

    /// The fixed explanation attached to every recommendation.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Sets the reason.
    pub fn with_reason(self, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..self
        }
    }
}

impl Default for MmrConfig {
    fn default() -> Self {
        Self {
            lambda: 0.75,
            weight_score: 0.5,
            weight_strength: 0.4,
            reason: "Matches the picks you made".to_string(),
        }
    }
}

pub(crate) fn check_lambda(lambda: f32) -> Result<f32, ConfigError> {
    (0. ..=1.)
        .contains(&lambda)
        .then(|| lambda)
        .ok_or(ConfigError::Lambda)
}

/// The configuration of the engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    strategy: StrengthStrategy,
    btl: BtlConfig,
    elo: EloConfig,
    learner: LearnerConfig,
    selector: SelectorConfig,
    mmr: MmrConfig,
}

impl Config {
    pub fn strategy(&self) -> StrengthStrategy {
        self.strategy
    }

    /// Sets the strength strategy.
    pub fn with_strategy(self, strategy: StrengthStrategy) -> Self {
        Self { strategy, ..self }
    }

    pub fn btl(&self) -> &BtlConfig {
        &self.btl
    }

    pub fn with_btl(self, btl: BtlConfig) -> Self {
        Self { btl, ..self }
    }

    pub fn elo(&self) -> &EloConfig {
        &self.elo
    }

    pub fn with_elo(self, elo: EloConfig) -> Self {
        Self { elo, ..self }
    }

    pub fn learner(&self) -> &LearnerConfig {
        &self.learner
    }

    pub fn with_learner(self, learner: LearnerConfig) -> Self {
        Self { learner, ..self }
    }

    pub fn selector(&self) -> &SelectorConfig {
        &self.selector
    }

    pub fn with_selector(self, selector: SelectorConfig) -> Self {
        Self { selector, ..self }
    }

    pub fn mmr(&self) -> &MmrConfig {
        &self.mmr
    }

    pub fn with_mmr(self, mmr: MmrConfig) -> Self {
        Self { mmr, ..self }
    }
}
