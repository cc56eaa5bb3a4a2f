//! Service wiring.
//!
//! Centralizes configuration checks and dependency injection so the session
//! layer receives ready-to-use agents sharing one HTTP connection pool.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::model::Config;
use crate::retriever::NiaClient;
use crate::service::{
    BriefGenerator, ChatClient, FallbackScorer, InconsistencyDetector, Interrogator,
    NemotronScorer, ObjectionScreener,
};

/// The assembled agent suite for one deployment.
pub struct DepositionAgents {
    /// Inconsistency detection over the session statement index.
    pub detector: Arc<InconsistencyDetector>,
    /// Streaming question generation.
    pub interrogator: Arc<Interrogator>,
    /// FRE objection screening.
    pub screener: Arc<ObjectionScreener>,
    /// Post-session coaching brief generation.
    pub brief_generator: Arc<BriefGenerator>,
}

impl DepositionAgents {
    /// Build from the process environment and the optional config file.
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(Config::from_env())
    }

    /// Validate the configuration and build the service graph.
    pub fn new(config: Config) -> Result<Self, AppError> {
        config
            .thresholds
            .validate()
            .map_err(AppError::InvalidConfig)?;

        let nia_base_url = config
            .nia
            .base_url
            .ok_or(AppError::MissingConfig("NIA_BASE_URL"))?;
        let nia_api_key = config
            .nia
            .api_key
            .ok_or(AppError::MissingConfig("NIA_API_KEY"))?;
        let nemotron_api_key = config
            .nemotron
            .api_key
            .ok_or(AppError::MissingConfig("NEMOTRON_API_KEY"))?;
        let chat_api_key = config
            .chat
            .api_key
            .ok_or(AppError::MissingConfig("ANTHROPIC_API_KEY"))?;

        Url::parse(&nia_base_url)
            .map_err(|_| AppError::InvalidConfig("NIA_BASE_URL is not a valid URL"))?;
        Url::parse(&config.nemotron.base_url)
            .map_err(|_| AppError::InvalidConfig("NEMOTRON_BASE_URL is not a valid URL"))?;
        Url::parse(&config.chat.base_url)
            .map_err(|_| AppError::InvalidConfig("ANTHROPIC_BASE_URL is not a valid URL"))?;

        let http = Client::new();

        let search = Arc::new(NiaClient::new(
            http.clone(),
            nia_base_url,
            nia_api_key,
            Duration::from_millis(config.nia.timeout_ms),
        ));

        let primary = Arc::new(NemotronScorer::new(
            http.clone(),
            config.nemotron.base_url,
            nemotron_api_key,
            config.nemotron.model,
            Duration::from_millis(config.nemotron.timeout_ms),
        ));

        let chat = Arc::new(ChatClient::new(
            http.clone(),
            config.chat.base_url.clone(),
            chat_api_key.clone(),
            config.chat.model.clone(),
            Duration::from_millis(config.chat.timeout_ms),
        ));

        // Screening rides the same endpoint on a tighter transport budget,
        // since its verdict has to land while the question is still being
        // read.
        let screening_chat = Arc::new(ChatClient::new(
            http,
            config.chat.base_url,
            chat_api_key,
            config.chat.model,
            Duration::from_millis(config.chat.screening_timeout_ms),
        ));

        let fallback = Arc::new(FallbackScorer::new(chat.clone()));

        let detector = Arc::new(InconsistencyDetector::new(
            search.clone(),
            primary,
            fallback,
            config.thresholds,
        ));
        let interrogator = Arc::new(Interrogator::new(chat.clone(), search.clone()));
        let screener = Arc::new(ObjectionScreener::new(
            screening_chat,
            search,
            config.nia.fre_index_id,
        ));
        let brief_generator = Arc::new(BriefGenerator::new(chat));

        tracing::info!("Deposition agent suite initialized");

        Ok(Self {
            detector,
            interrogator,
            screener,
            brief_generator,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChatConfig, NemotronConfig, NiaConfig};

    fn config() -> Config {
        Config {
            nia: NiaConfig {
                base_url: Some("https://nia.example.com/v2".to_string()),
                api_key: Some("nia-key".to_string()),
                timeout_ms: 10_000,
                fre_index_id: Some("fre-corpus".to_string()),
            },
            nemotron: NemotronConfig {
                api_key: Some("nv-key".to_string()),
                ..Config::default().nemotron
            },
            chat: ChatConfig {
                api_key: Some("sk-ant".to_string()),
                ..Config::default().chat
            },
            thresholds: Default::default(),
        }
    }

    #[test]
    fn test_builds_from_complete_config() {
        assert!(DepositionAgents::new(config()).is_ok());
    }

    #[test]
    fn test_missing_index_key_is_reported_by_name() {
        let mut config = config();
        config.nia.api_key = None;

        match DepositionAgents::new(config) {
            Err(AppError::MissingConfig(name)) => assert_eq!(name, "NIA_API_KEY"),
            other => panic!("expected missing-config error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let mut config = config();
        config.nia.base_url = Some("not a url".to_string());

        assert!(matches!(
            DepositionAgents::new(config),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_thresholds_are_rejected() {
        let mut config = config();
        config.thresholds.flag_floor = 0.9;

        assert!(matches!(
            DepositionAgents::new(config),
            Err(AppError::InvalidConfig(_))
        ));
    }
}
