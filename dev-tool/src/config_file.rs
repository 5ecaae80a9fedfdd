use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Error};
use serde::Deserialize;
use tastebud::{
    BtlConfig,
    Config,
    EloConfig,
    LearnerConfig,
    MmrConfig,
    PivotPolicy,
    SelectorConfig,
    StrengthStrategy,
};

/// The JSON representation of a [`Config`], all fields are optional and default to the engine
/// defaults.
///
/// ```json
/// {
///     "strategy": "elo",
///     "learner": { "preset": "client" },
///     "selector": { "pivot_scale": 0.5 },
///     "mmr": { "lambda": 0.7 }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    strategy: Strategy,
    btl: BtlSection,
    elo: EloSection,
    learner: LearnerSection,
    selector: SelectorSection,
    mmr: MmrSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Strategy {
    Btl,
    Elo,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Btl
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BtlSection {
    learning_rate: Option<f32>,
    shrinkage: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EloSection {
    initial: Option<f32>,
    base_k: Option<f32>,
    scale: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Preset {
    Client,
    Server,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LearnerSection {
    preset: Option<Preset>,
    learning_rate: Option<f32>,
    l2: Option<f32>,
    max_dimension: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SelectorSection {
    window: Option<usize>,
    allow_repeats: Option<bool>,
    /// Switches to the sampled pivot policy with this scale.
    pivot_scale: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MmrSection {
    lambda: Option<f32>,
    weight_score: Option<f32>,
    weight_strength: Option<f32>,
    reason: Option<String>,
}

impl ConfigFile {
    /// Loads the config file.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Opening the config file {} failed", path.display()))?;

        serde_json::from_reader(BufReader::new(file)).context("Parsing the config file failed")
    }

    /// Loads the config file if one is given, the default config otherwise.
    pub(crate) fn load_config(path: Option<impl AsRef<Path>>) -> Result<Config, Error> {
        path.map_or_else(|| Ok(Config::default()), |path| Self::load(path)?.into_config())
    }

    /// Validates the values and builds the [`Config`].
    pub(crate) fn into_config(self) -> Result<Config, Error> {
        let strategy = match self.strategy {
            Strategy::Btl => StrengthStrategy::Btl,
            Strategy::Elo => StrengthStrategy::Elo,
        };

        let mut btl = BtlConfig::default();
        if let Some(learning_rate) = self.btl.learning_rate {
            btl = btl.with_learning_rate(learning_rate)?;
        }
        if let Some(shrinkage) = self.btl.shrinkage {
            btl = btl.with_shrinkage(shrinkage)?;
        }

        let mut elo = EloConfig::default();
        if let Some(initial) = self.elo.initial {
            elo = elo.with_initial(initial)?;
        }
        if let Some(base_k) = self.elo.base_k {
            elo = elo.with_base_k(base_k)?;
        }
        if let Some(scale) = self.elo.scale {
            elo = elo.with_scale(scale)?;
        }

        let mut learner = match self.learner.preset {
            Some(Preset::Client) => LearnerConfig::client(),
            Some(Preset::Server) | None => LearnerConfig::server(),
        };
        if let Some(learning_rate) = self.learner.learning_rate {
            learner = learner.with_learning_rate(learning_rate)?;
        }
        if let Some(l2) = self.learner.l2 {
            learner = learner.with_l2(l2)?;
        }
        if let Some(max_dimension) = self.learner.max_dimension {
            learner = learner.with_max_dimension(max_dimension)?;
        }

        let mut selector = SelectorConfig::default();
        if let Some(window) = self.selector.window {
            selector = selector.with_window(window)?;
        }
        if let Some(allow_repeats) = self.selector.allow_repeats {
            selector = selector.with_allow_repeats(allow_repeats);
        }
        if let Some(scale) = self.selector.pivot_scale {
            selector = selector.with_pivot(PivotPolicy::Sampled { scale })?;
        }

        let mut mmr = MmrConfig::default();
        if let Some(lambda) = self.mmr.lambda {
            mmr = mmr.with_lambda(lambda)?;
        }
        if self.mmr.weight_score.is_some() || self.mmr.weight_strength.is_some() {
            mmr = mmr.clone().with_relevance_weights(
                self.mmr.weight_score.unwrap_or_else(|| mmr.weight_score()),
                self.mmr
                    .weight_strength
                    .unwrap_or_else(|| mmr.weight_strength()),
            )?;
        }
        if let Some(reason) = self.mmr.reason {
            mmr = mmr.with_reason(reason);
        }

        Ok(Config::default()
            .with_strategy(strategy)
            .with_btl(btl)
            .with_elo(elo)
            .with_learner(learner)
            .with_selector(selector)
            .with_mmr(mmr))
    }
}

#[cfg(test)]
mod tests {
    use tastebud::ConfigError;
    use test_utils::assert_approx_eq;

    use super::*;

    fn parse(json: &str) -> Result<Config, Error> {
        serde_json::from_str::<ConfigFile>(json)?.into_config()
    }

    #[test]
    fn test_empty_file_is_the_default() {
        assert_eq!(parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_sections() {
        let config = parse(
            r#"{
                "strategy": "elo",
                "elo": { "base_k": 16 },
                "learner": { "preset": "client", "l2": 0.01 },
                "selector": { "window": 8, "pivot_scale": 0.5 },
                "mmr": { "lambda": 0.7, "weight_strength": 1.0, "reason": "For you" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.strategy(), StrengthStrategy::Elo);
        assert_approx_eq!(f32, config.elo().base_k(), 16.);
        assert_approx_eq!(f32, config.learner().learning_rate(), 0.6);
        assert_approx_eq!(f32, config.learner().l2(), 0.01);
        assert_eq!(config.selector().window(), 8);
        assert_eq!(config.selector().pivot(), PivotPolicy::Sampled { scale: 0.5 });
        assert_approx_eq!(f32, config.mmr().lambda(), 0.7);
        assert_approx_eq!(f32, config.mmr().weight_score(), 0.5);
        assert_approx_eq!(f32, config.mmr().weight_strength(), 1.);
        assert_eq!(config.mmr().reason(), "For you");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let error = parse(r#"{ "mmr": { "lambda": 2.0 } }"#).unwrap_err();
        assert_eq!(error.downcast_ref::<ConfigError>(), Some(&ConfigError::Lambda));

        let error = parse(r#"{ "selector": { "window": 0 } }"#).unwrap_err();
        assert_eq!(error.downcast_ref::<ConfigError>(), Some(&ConfigError::Window));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(parse(r#"{ "mmr": { "lamda": 0.5 } }"#).is_err());
    }
}
