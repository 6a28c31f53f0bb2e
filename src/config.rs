use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::aggregate::DEFAULT_SAFE_KEY;
use crate::entitlement::{Tier, DEFAULT_FREE_LIMIT};
use crate::ranking::DEFAULT_LIMIT;
use crate::{AnalysisError, ToxicityCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    #[serde(alias = "topN")]
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_n: DEFAULT_LIMIT }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToxicityConfig {
    #[serde(alias = "toxicitySafeKey")]
    pub safe_key: String,
}

impl Default for ToxicityConfig {
    fn default() -> Self {
        Self {
            safe_key: DEFAULT_SAFE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitlementConfig {
    #[serde(alias = "freeLimit")]
    pub free_limit: usize,
    /// Tier applied when a gate request does not name one.
    #[serde(alias = "defaultTier")]
    pub default_tier: String,
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            free_limit: DEFAULT_FREE_LIMIT,
            default_tier: Tier::Free.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub ranking: RankingConfig,
    pub toxicity: ToxicityConfig,
    pub entitlement: EntitlementConfig,
}

impl AnalysisConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                Self::from_toml(&contents)?
            }
            _ => AnalysisConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|err| format!("failed to parse config: {}", err))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    pub fn default_tier(&self) -> Result<Tier, AnalysisError> {
        self.entitlement.default_tier.parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.default_tier().map_err(|err| err.to_string())?;
        if self.toxicity.safe_key.trim().is_empty() {
            return Err("toxicity safe key must not be empty".to_string());
        }
        if ToxicityCategory::parse_label(&self.toxicity.safe_key).is_some() {
            return Err(format!(
                "toxicity safe key collides with a toxicity category: {}",
                self.toxicity.safe_key
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("FREE_LIMIT").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.entitlement.free_limit = value;
        }
        if let Some(value) = lookup("TOP_N").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.ranking.top_n = value;
        }
        if let Some(value) = lookup("TOXICITY_SAFE_KEY") {
            if !value.trim().is_empty() {
                self.toxicity.safe_key = value.trim().to_string();
            }
        }
        if let Some(value) = lookup("DEFAULT_TIER") {
            if !value.trim().is_empty() {
                self.entitlement.default_tier = value.trim().to_string();
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("COMMENT_PULSE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/analysis.toml")))
}
