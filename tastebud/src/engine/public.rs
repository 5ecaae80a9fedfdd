use crate::{
    config::{Config, ConfigError},
    engine::OutcomeError,
    error::Error,
    features::FeatureVector,
    item::{FeatureLookup, Item, ItemId},
    observer::{ObserverHandle, PreferenceObserver},
    recommend::Recommendation,
    selector::{NoiseSource, Pair, SeededNoise},
    state::{Phase, UserState},
    strength::Rating,
};

/// Learns the taste of one user from pairwise comparisons.
pub struct Engine(super::system::Engine);

impl Engine {
    pub fn config(&self) -> &Config {
        self.0.config()
    }

    /// The current user state.
    pub fn state(&self) -> &UserState {
        self.0.state()
    }

    pub fn phase(&self) -> Phase {
        self.0.phase()
    }

    /// Creates a byte representation of the user state.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        self.0.serialize()
    }

    /// Learns from the user preferring `winner` over `loser`.
    ///
    /// Missing features are treated as the all-zero vector.
    ///
    /// # Errors
    /// Fails if the winner and the loser are the same item, the state is left untouched then.
    pub fn apply_outcome(
        &mut self,
        winner: &ItemId,
        loser: &ItemId,
        winner_features: Option<&FeatureVector>,
        loser_features: Option<&FeatureVector>,
    ) -> Result<(), OutcomeError> {
        self.0
            .apply_outcome(winner, loser, winner_features, loser_features)
    }

    /// Selects the next pair to show from the eligible ids and records it as shown.
    ///
    /// The eligible ids are expected to be filtered by the caller already. Returns `None` when no
    /// further pair is available, the session is exhausted then.
    pub fn select_next_pair(
        &mut self,
        eligible: &[ItemId],
        features: &impl FeatureLookup,
    ) -> Option<Pair> {
        self.0.select_next_pair(eligible, features)
    }

    /// Selects the next pair to show from the items of the pool which are neither blocked nor
    /// seen.
    pub fn next_pair(&mut self, pool: &[Item]) -> Option<Pair> {
        self.0.next_pair(pool)
    }

    /// The ids of the pool which are neither blocked nor seen, in pool order.
    pub fn eligible(&self, pool: &[Item]) -> Vec<ItemId> {
        self.0.eligible(pool)
    }

    /// Selects up to `k` relevant but mutually diverse recommendations from the pool.
    ///
    /// # Errors
    /// Fails if `lambda` is outside of the unit interval.
    pub fn select_recommendations(
        &mut self,
        pool: &[Item],
        k: usize,
        lambda: f32,
    ) -> Result<Vec<Recommendation>, ConfigError> {
        self.0.select_recommendations(pool, k, lambda)
    }

    /// Same as [`select_recommendations()`](Self::select_recommendations) with the configured
    /// lambda.
    pub fn recommend(&mut self, pool: &[Item], k: usize) -> Vec<Recommendation> {
        self.0.recommend(pool, k)
    }

    /// All compared items by descending strength.
    pub fn ranking(&self) -> Vec<(ItemId, Rating)> {
        self.0.ranking()
    }

    /// Excludes the item from all further pairs and recommendations.
    pub fn block(&mut self, id: impl Into<ItemId>) {
        self.0.block(id.into())
    }

    /// Marks the item as already watched.
    pub fn mark_seen(&mut self, id: impl Into<ItemId>) {
        self.0.mark_seen(id.into())
    }

    /// Forgets everything learned so far.
    pub fn reset(&mut self) {
        self.0.reset()
    }

    /// Registers an observer which is notified after every applied outcome.
    pub fn register_observer(
        &mut self,
        observer: impl PreferenceObserver + Send + 'static,
    ) -> ObserverHandle {
        self.0.register_observer(Box::new(observer))
    }

    /// Removes the observer, returns `false` if it wasn't registered.
    pub fn remove_observer(&mut self, handle: ObserverHandle) -> bool {
        self.0.remove_observer(handle)
    }
}

/// Builds an [`Engine`].
#[derive(Default)]
pub struct Builder {
    config: Config,
    state: UserState,
    noise: Option<Box<dyn NoiseSource + Send>>,
}

impl Builder {
    /// Sets the [`Config`] to use.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the serialized state to use.
    ///
    /// # Errors
    ///
    /// Fails if the state cannot be deserialized.
    pub fn with_serialized_state(mut self, bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        self.state = UserState::deserialize(bytes.as_ref())?;
        Ok(self)
    }

    pub fn with_state(mut self, state: UserState) -> Self {
        self.state = state;
        self
    }

    /// Sets the source of the pivot noise, defaults to an entropy seeded [`SeededNoise`].
    pub fn with_noise(mut self, noise: impl NoiseSource + Send + 'static) -> Self {
        self.noise = Some(Box::new(noise));
        self
    }

    /// Seeds the pivot noise for reproducible sessions.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_noise(SeededNoise::from_seed(seed))
    }

    /// Creates an [`Engine`].
    pub fn build(self) -> Engine {
        let noise = self
            .noise
            .unwrap_or_else(|| Box::new(SeededNoise::from_entropy()));

        Engine(super::system::Engine::new(self.config, self.state, noise))
    }
}
