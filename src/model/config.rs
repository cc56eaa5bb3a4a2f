//! Environment and file configuration for the agent suite.
//!
//! Endpoints, keys, models, and timeouts come from per-service environment
//! variables; detection thresholds can be tuned through an optional YAML
//! file named by `DEPO_AGENTS_CONFIG`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

const ENV_CONFIG_PATH: &str = "DEPO_AGENTS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_NIA_BASE_URL: &str = "NIA_BASE_URL";
const ENV_NIA_API_KEY: &str = "NIA_API_KEY";
const ENV_NIA_TIMEOUT_MS: &str = "NIA_TIMEOUT_MS";
const ENV_NIA_FRE_INDEX_ID: &str = "NIA_FRE_INDEX_ID";

const ENV_NEMOTRON_BASE_URL: &str = "NEMOTRON_BASE_URL";
const ENV_NEMOTRON_API_KEY: &str = "NEMOTRON_API_KEY";
const ENV_NEMOTRON_MODEL: &str = "NEMOTRON_MODEL";
const ENV_NEMOTRON_TIMEOUT_MS: &str = "NEMOTRON_TIMEOUT_MS";

const ENV_ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
const ENV_ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
const ENV_ANTHROPIC_TIMEOUT_MS: &str = "ANTHROPIC_TIMEOUT_MS";
const ENV_SCREENING_TIMEOUT_MS: &str = "SCREENING_TIMEOUT_MS";

const DEFAULT_NEMOTRON_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
const DEFAULT_NEMOTRON_MODEL: &str = "nvidia/llama-3.1-nemotron-ultra-253b-v1";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

const DEFAULT_NIA_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_NEMOTRON_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ANTHROPIC_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_SCREENING_TIMEOUT_MS: u64 = 1_500;

/// Default confidence required to fire a live alert mid-session.
pub const DEFAULT_LIVE_FIRE: f64 = 0.75;
/// Default floor below which no flag is recorded at all.
pub const DEFAULT_FLAG_FLOOR: f64 = 0.5;
/// Default live threshold when the fallback scorer produced the verdict.
pub const DEFAULT_FALLBACK_LIVE_FIRE: f64 = 0.85;

/// Detection threshold policy.
///
/// `flag_floor` must not exceed either live threshold; otherwise a verdict
/// could live-fire without leaving a flag on the record.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DetectionThresholds {
    #[serde(default = "default_live_fire")]
    pub live_fire: f64,
    #[serde(default = "default_flag_floor")]
    pub flag_floor: f64,
    #[serde(default = "default_fallback_live_fire")]
    pub fallback_live_fire: f64,
}

fn default_live_fire() -> f64 {
    DEFAULT_LIVE_FIRE
}

fn default_flag_floor() -> f64 {
    DEFAULT_FLAG_FLOOR
}

fn default_fallback_live_fire() -> f64 {
    DEFAULT_FALLBACK_LIVE_FIRE
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            live_fire: DEFAULT_LIVE_FIRE,
            flag_floor: DEFAULT_FLAG_FLOOR,
            fallback_live_fire: DEFAULT_FALLBACK_LIVE_FIRE,
        }
    }
}

impl DetectionThresholds {
    /// Check threshold ranges and ordering.
    pub fn validate(&self) -> Result<(), &'static str> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.live_fire) || !in_range(self.flag_floor) || !in_range(self.fallback_live_fire)
        {
            return Err("detection thresholds must be within 0.0..=1.0");
        }
        if self.flag_floor > self.live_fire {
            return Err("flag_floor must not exceed live_fire");
        }
        if self.flag_floor > self.fallback_live_fire {
            return Err("flag_floor must not exceed fallback_live_fire");
        }
        Ok(())
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub thresholds: Option<DetectionThresholds>,
}

/// Statement index (retrieval proxy) settings.
#[derive(Debug, Clone)]
pub struct NiaConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    /// Index holding the annotated FRE corpus; screening runs without rule
    /// context when unset.
    pub fre_index_id: Option<String>,
}

/// Contradiction judge endpoint settings (OpenAI-compatible).
#[derive(Debug, Clone)]
pub struct NemotronConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

/// Chat model settings (Anthropic-compatible Messages API).
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
    /// Tighter budget for objection screening, which runs between question
    /// and answer.
    pub screening_timeout_ms: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub nia: NiaConfig,
    pub nemotron: NemotronConfig,
    pub chat: ChatConfig,
    pub thresholds: DetectionThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nia: NiaConfig {
                base_url: None,
                api_key: None,
                timeout_ms: DEFAULT_NIA_TIMEOUT_MS,
                fre_index_id: None,
            },
            nemotron: NemotronConfig {
                base_url: DEFAULT_NEMOTRON_BASE_URL.to_string(),
                api_key: None,
                model: DEFAULT_NEMOTRON_MODEL.to_string(),
                timeout_ms: DEFAULT_NEMOTRON_TIMEOUT_MS,
            },
            chat: ChatConfig {
                base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
                api_key: None,
                model: DEFAULT_ANTHROPIC_MODEL.to_string(),
                timeout_ms: DEFAULT_ANTHROPIC_TIMEOUT_MS,
                screening_timeout_ms: DEFAULT_SCREENING_TIMEOUT_MS,
            },
            thresholds: DetectionThresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let nia = NiaConfig {
            base_url: std::env::var(ENV_NIA_BASE_URL).ok(),
            api_key: std::env::var(ENV_NIA_API_KEY).ok(),
            timeout_ms: env_millis(ENV_NIA_TIMEOUT_MS, DEFAULT_NIA_TIMEOUT_MS),
            fre_index_id: std::env::var(ENV_NIA_FRE_INDEX_ID).ok(),
        };

        let nemotron = NemotronConfig {
            base_url: std::env::var(ENV_NEMOTRON_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_NEMOTRON_BASE_URL.to_string()),
            api_key: std::env::var(ENV_NEMOTRON_API_KEY).ok(),
            model: std::env::var(ENV_NEMOTRON_MODEL)
                .unwrap_or_else(|_| DEFAULT_NEMOTRON_MODEL.to_string()),
            timeout_ms: env_millis(ENV_NEMOTRON_TIMEOUT_MS, DEFAULT_NEMOTRON_TIMEOUT_MS),
        };

        let chat = ChatConfig {
            base_url: std::env::var(ENV_ANTHROPIC_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            api_key: std::env::var(ENV_ANTHROPIC_API_KEY).ok(),
            model: std::env::var(ENV_ANTHROPIC_MODEL)
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string()),
            timeout_ms: env_millis(ENV_ANTHROPIC_TIMEOUT_MS, DEFAULT_ANTHROPIC_TIMEOUT_MS),
            screening_timeout_ms: env_millis(ENV_SCREENING_TIMEOUT_MS, DEFAULT_SCREENING_TIMEOUT_MS),
        };

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let thresholds = Self::load_config_file(&config_path)
            .and_then(|cf| cf.thresholds)
            .unwrap_or_default();

        Self {
            nia,
            nemotron,
            chat,
            thresholds,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }
}

fn env_millis(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let thresholds = DetectionThresholds::default();
        assert_eq!(thresholds.live_fire, 0.75);
        assert_eq!(thresholds.flag_floor, 0.5);
        assert_eq!(thresholds.fallback_live_fire, 0.85);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn test_thresholds_from_yaml_override() {
        let file: ConfigFile = serde_yaml::from_str(
            "thresholds:\n  live_fire: 0.8\n  flag_floor: 0.4\n",
        )
        .unwrap();
        let thresholds = file.thresholds.unwrap();
        assert_eq!(thresholds.live_fire, 0.8);
        assert_eq!(thresholds.flag_floor, 0.4);
        // Unset keys keep their defaults.
        assert_eq!(thresholds.fallback_live_fire, 0.85);
    }

    #[test]
    fn test_validate_rejects_floor_above_live() {
        let thresholds = DetectionThresholds {
            live_fire: 0.6,
            flag_floor: 0.7,
            fallback_live_fire: 0.85,
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let thresholds = DetectionThresholds {
            live_fire: 1.5,
            flag_floor: 0.5,
            fallback_live_fire: 0.85,
        };
        assert!(thresholds.validate().is_err());
    }
}
