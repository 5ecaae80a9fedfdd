//! A preference engine which learns the taste of a user from "A vs B" comparisons of movies.
//!
//! The [`Engine`] picks the most informative next pair, learns per item strengths and a global
//! content weight vector from each outcome and finally recommends a relevant but diverse top-k
//! list.

mod config;
mod engine;
mod error;
mod features;
mod item;
mod learner;
mod observer;
mod recommend;
mod selector;
mod session;
mod state;
mod strength;
mod utils;

pub use crate::{
    config::{
        BtlConfig,
        Config,
        ConfigError,
        EloConfig,
        LearnerConfig,
        MmrConfig,
        PivotPolicy,
        SelectorConfig,
        StrengthStrategy,
    },
    engine::{Builder, Engine, OutcomeError},
    error::Error,
    features::FeatureVector,
    item::{FeatureLookup, Item, ItemId},
    learner::Weights,
    observer::{ObserverHandle, PreferenceObserver, PreferenceUpdate},
    recommend::{select_diverse, Recommendation},
    selector::{NoiseSource, Pair, PairKey, SeededNoise},
    session::{SessionId, Sessions},
    state::{Phase, RecentlyShown, StateError, UserState, RECENTLY_SHOWN},
    strength::{Rating, Ratings},
};
