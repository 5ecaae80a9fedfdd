use itertools::Itertools;
use log::{debug, info};

use crate::{
    config::{check_lambda, Config, ConfigError},
    engine::OutcomeError,
    error::Error,
    features::FeatureVector,
    item::{index_features, FeatureLookup, Item, ItemId},
    learner::WeightLearner,
    observer::{ObserverHandle, Observers, PreferenceObserver, PreferenceUpdate},
    recommend::{Recommendation, Recommender},
    selector::{NoiseSource, Pair, PairSelector},
    state::{Phase, UserState},
    strength::{Rating, Strength, StrengthModel},
    utils::nan_safe_f32_cmp_desc,
};

/// The preference engine of a single session.
pub(crate) struct Engine {
    config: Config,
    strength: Strength,
    learner: WeightLearner,
    selector: PairSelector,
    recommender: Recommender,
    state: UserState,
    noise: Box<dyn NoiseSource + Send>,
    observers: Observers,
}

impl Engine {
    pub(crate) fn new(config: Config, state: UserState, noise: Box<dyn NoiseSource + Send>) -> Self {
        Self {
            strength: Strength::from_config(&config),
            learner: WeightLearner::new(config.learner().clone()),
            selector: PairSelector::new(config.selector().clone()),
            recommender: Recommender::new(config.mmr().clone()),
            config,
            state,
            noise,
            observers: Observers::default(),
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn state(&self) -> &UserState {
        &self.state
    }

    pub(crate) fn phase(&self) -> Phase {
        self.state.phase
    }

    pub(crate) fn serialize(&self) -> Result<Vec<u8>, Error> {
        self.state.serialize()
    }

    pub(crate) fn apply_outcome(
        &mut self,
        winner: &ItemId,
        loser: &ItemId,
        winner_features: Option<&FeatureVector>,
        loser_features: Option<&FeatureVector>,
    ) -> Result<(), OutcomeError> {
        if winner == loser {
            return Err(OutcomeError::SelfComparison(winner.clone()));
        }

        self.strength.update(&mut self.state.ratings, winner, loser);
        self.learner
            .update(&mut self.state.weights, winner_features, loser_features, true);
        self.state.rounds += 1;
        self.state.phase = Phase::Eliciting;
        debug!(
            "applied outcome {} > {} in round {}",
            winner, loser, self.state.rounds,
        );

        let strength_of = |id| {
            self.state
                .ratings
                .get(id)
                .map_or(self.strength.initial_strength(), |rating| rating.strength)
        };
        let update = PreferenceUpdate {
            winner: winner.clone(),
            loser: loser.clone(),
            winner_strength: strength_of(winner),
            loser_strength: strength_of(loser),
            rounds: self.state.rounds,
        };
        self.observers.notify(&update);

        Ok(())
    }

    pub(crate) fn select_next_pair(
        &mut self,
        eligible: &[ItemId],
        features: &impl FeatureLookup,
    ) -> Option<Pair> {
        let pair = self.selector.select(
            &mut self.state,
            &self.strength,
            eligible,
            features,
            self.noise.as_mut(),
        );
        self.state.phase = if pair.is_some() {
            Phase::Eliciting
        } else {
            info!("elicitation exhausted after {} rounds", self.state.rounds);
            Phase::Exhausted
        };

        pair
    }

    pub(crate) fn eligible(&self, pool: &[Item]) -> Vec<ItemId> {
        pool.iter()
            .map(|item| &item.id)
            .filter(|id| self.state.is_eligible(id))
            .unique()
            .cloned()
            .collect()
    }

    pub(crate) fn next_pair(&mut self, pool: &[Item]) -> Option<Pair> {
        let eligible = self.eligible(pool);
        self.select_next_pair(&eligible, &index_features(pool))
    }

    pub(crate) fn select_recommendations(
        &mut self,
        pool: &[Item],
        k: usize,
        lambda: f32,
    ) -> Result<Vec<Recommendation>, ConfigError> {
        let lambda = check_lambda(lambda)?;
        self.state.phase = Phase::Recommending;

        Ok(self
            .recommender
            .recommend(&self.state, &self.strength, pool, k, lambda))
    }

    pub(crate) fn recommend(&mut self, pool: &[Item], k: usize) -> Vec<Recommendation> {
        self.state.phase = Phase::Recommending;
        self.recommender
            .recommend(&self.state, &self.strength, pool, k, self.config.mmr().lambda())
    }

    pub(crate) fn ranking(&self) -> Vec<(ItemId, Rating)> {
        self.state
            .ratings
            .iter()
            .sorted_by(|(a_id, a), (b_id, b)| {
                nan_safe_f32_cmp_desc(&a.strength, &b.strength).then_with(|| a_id.cmp(b_id))
            })
            .map(|(id, rating)| (id.clone(), *rating))
            .collect()
    }

    pub(crate) fn block(&mut self, id: ItemId) {
        debug!("blocked {}", id);
        self.state.blocked.insert(id);
    }

    pub(crate) fn mark_seen(&mut self, id: ItemId) {
        self.state.seen.insert(id);
    }

    pub(crate) fn reset(&mut self) {
        info!("resetting the user state after {} rounds", self.state.rounds);
        self.state.reset();
    }

    pub(crate) fn register_observer(
        &mut self,
        observer: Box<dyn PreferenceObserver + Send>,
    ) -> ObserverHandle {
        self.observers.register(observer)
    }

    pub(crate) fn remove_observer(&mut self, handle: ObserverHandle) -> bool {
        self.observers.remove(handle)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::function;
    use rstest::rstest;
    use test_utils::assert_approx_eq;

    use super::*;
    use crate::{
        config::StrengthStrategy,
        observer::MockPreferenceObserver,
        selector::{MockNoiseSource, SeededNoise},
    };

    fn engine(config: Config) -> Engine {
        Engine::new(config, UserState::default(), Box::new(SeededNoise::from_seed(0)))
    }

    fn pool() -> Vec<Item> {
        vec![
            Item::new("x", vec![1., 0.]),
            Item::new("y", vec![0., 1.]),
            Item::new("z", vec![0.5, 0.5]),
        ]
    }

    fn features_of<'a>(pool: &'a [Item], id: &str) -> Option<&'a FeatureVector> {
        pool.iter()
            .find(|item| item.id.as_str() == id)
            .and_then(|item| item.features.as_ref())
    }

    #[test]
    fn test_apply_outcome_under_btl() {
        let mut engine = engine(Config::default());
        let pool = pool();

        engine
            .apply_outcome(
                &"x".into(),
                &"y".into(),
                features_of(&pool, "x"),
                features_of(&pool, "y"),
            )
            .unwrap();

        let ratings = engine.state().ratings();
        assert_approx_eq!(f32, ratings.get(&"x".into()).unwrap().strength, 0.175);
        assert_approx_eq!(f32, ratings.get(&"y".into()).unwrap().strength, -0.175);
        assert_approx_eq!(f32, ratings.info(&"x".into()), 0.25);
        assert_approx_eq!(f32, engine.state().weights().view(), [0.04, -0.04]);
        assert_eq!(engine.state().rounds(), 1);
        assert_eq!(engine.phase(), Phase::Eliciting);
    }

    #[test]
    fn test_self_comparison_is_rejected() {
        let mut engine = engine(Config::default());

        let error = engine
            .apply_outcome(&"x".into(), &"x".into(), None, None)
            .unwrap_err();

        assert_eq!(error, OutcomeError::SelfComparison("x".into()));
        assert!(engine.state().ratings().is_empty());
        assert_eq!(engine.state().rounds(), 0);
        assert_eq!(engine.phase(), Phase::Fresh);
    }

    #[rstest]
    #[case(StrengthStrategy::Btl)]
    #[case(StrengthStrategy::Elo)]
    fn test_consistent_winner_tops_the_ranking(#[case] strategy: StrengthStrategy) {
        let mut engine = engine(Config::default().with_strategy(strategy));

        for _ in 0..5 {
            engine.apply_outcome(&"x".into(), &"y".into(), None, None).unwrap();
            engine.apply_outcome(&"y".into(), &"z".into(), None, None).unwrap();
        }

        let ranking = engine
            .ranking()
            .into_iter()
            .map(|(id, _)| id)
            .collect_vec();
        assert_eq!(ranking, [ItemId::from("x"), "y".into(), "z".into()]);
    }

    #[test]
    fn test_lifecycle() {
        let mut engine = engine(Config::default());
        let pool = vec![Item::new("x", vec![1., 0.]), Item::new("y", vec![0., 1.])];
        assert_eq!(engine.phase(), Phase::Fresh);

        let pair = engine.next_pair(&pool).unwrap();
        assert_eq!(engine.phase(), Phase::Eliciting);
        let (a, b) = (pair.a.as_str(), pair.b.as_str());
        engine
            .apply_outcome(&pair.a, &pair.b, features_of(&pool, a), features_of(&pool, b))
            .unwrap();

        assert!(engine.next_pair(&pool).is_none());
        assert_eq!(engine.phase(), Phase::Exhausted);

        let recommendations = engine.recommend(&pool, 1);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].id, pair.a);
        assert_eq!(engine.phase(), Phase::Recommending);

        engine.reset();
        assert_eq!(engine.phase(), Phase::Fresh);
        assert_eq!(engine.state(), &UserState::default());
        assert!(engine.next_pair(&pool).is_some());
    }

    #[test]
    fn test_blocked_and_seen_items_are_not_eligible() {
        let mut engine = engine(Config::default());
        let pool = pool();

        engine.block("x".into());
        assert_eq!(engine.eligible(&pool), [ItemId::from("y"), "z".into()]);

        engine.mark_seen("z".into());
        assert_eq!(engine.eligible(&pool), [ItemId::from("y")]);
        assert!(engine.next_pair(&pool).is_none());
        assert!(engine.recommend(&pool, 3).iter().all(|r| r.id == ItemId::from("y")));
    }

    #[test]
    fn test_invalid_lambda() {
        let mut engine = engine(Config::default());

        for lambda in [-0.1, 1.1, f32::NAN] {
            let result = engine.select_recommendations(&pool(), 2, lambda);
            assert_eq!(result, Err(ConfigError::Lambda));
        }
        assert_eq!(engine.phase(), Phase::Fresh);
        assert_eq!(engine.select_recommendations(&pool(), 2, 0.7).unwrap().len(), 2);
    }

    #[test]
    fn test_observers_see_each_outcome() {
        let mut engine = engine(Config::default());
        let mut observer = MockPreferenceObserver::new();
        observer
            .expect_preferences_updated()
            .with(function(|update: &PreferenceUpdate| {
                update.winner == ItemId::from("x") && update.winner_strength > update.loser_strength
            }))
            .times(2)
            .return_const(());
        let handle = engine.register_observer(Box::new(observer));

        engine.apply_outcome(&"x".into(), &"y".into(), None, None).unwrap();
        engine.apply_outcome(&"x".into(), &"z".into(), None, None).unwrap();
        assert!(engine.remove_observer(handle));
        engine.apply_outcome(&"y".into(), &"z".into(), None, None).unwrap();
    }

    #[test]
    fn test_noise_is_only_drawn_by_the_sampled_policy() {
        let mut noise = MockNoiseSource::new();
        noise.expect_standard_normal().never();
        let mut engine = Engine::new(Config::default(), UserState::default(), Box::new(noise));

        assert!(engine.next_pair(&pool()).is_some());
    }
}
