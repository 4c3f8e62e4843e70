//! Configuration system for Citeguard.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment -> explicit overrides. Configuration
//! is loaded from `~/.config/citeguard/config.toml` and/or
//! `.citeguard/config.toml` in the workspace directory, then validated once
//! before an [`crate::assistant::Assistant`] is constructed.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level configuration for the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub verification: VerificationConfig,
    pub conversation: ConversationConfig,
    pub collection: CollectionConfig,
}

/// Configuration for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name sent to the backend.
    pub model: String,
    /// Base URL of an OpenAI-compatible endpoint.
    pub base_url: String,
    /// API key. If unset, read from the environment variable in `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: String,
    /// Sampling temperature. Grounded answering wants 0.0.
    pub temperature: f32,
    /// Maximum tokens to generate per answer.
    pub max_tokens: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.0,
            max_tokens: 512,
            timeout_secs: 60,
        }
    }
}

/// Configuration for retrieval over the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents to retrieve per query.
    pub top_k: usize,
    /// Similarity floor below which a retrieved document is discarded.
    pub min_score: f32,
    /// Path of the persisted vector index.
    pub index_path: PathBuf,
    /// Dimensionality of the hashed term-frequency embeddings.
    pub embedding_dimensions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            min_score: 0.1,
            index_path: PathBuf::from("vectorstore.json"),
            embedding_dimensions: 256,
        }
    }
}

/// Configuration for answer verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Per-statement support threshold: a statement counts as supported when
    /// its similarity against the retrieved context reaches this value.
    pub similarity_threshold: f32,
    /// Aggregate validity threshold: the answer is valid when the supported
    /// fraction reaches this value. Defaults to `similarity_threshold` when
    /// unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_threshold: Option<f32>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            validity_threshold: None,
        }
    }
}

/// Configuration for the conversation memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Whether prior turns are kept and fed back into generation.
    pub enabled: bool,
    /// Maximum number of turns retained; oldest turns are evicted first.
    pub max_turns: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_turns: 5,
        }
    }
}

/// Configuration for Wikipedia corpus collection and chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Directory where collected articles are written (under `raw/`).
    pub data_dir: PathBuf,
    /// Wikipedia language edition.
    pub language: String,
    /// User-Agent header sent to the MediaWiki API.
    pub user_agent: String,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            language: "en".to_string(),
            user_agent: "citeguard/0.3 (https://github.com/citeguard/citeguard)".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl AssistantConfig {
    /// Validate invariants once, before the assistant is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.conversation.max_turns < 1 {
            return Err(ConfigError::Invalid {
                message: "conversation.max_turns must be at least 1".to_string(),
            });
        }
        if self.retrieval.top_k < 1 {
            return Err(ConfigError::Invalid {
                message: "retrieval.top_k must be at least 1".to_string(),
            });
        }
        if self.retrieval.embedding_dimensions < 1 {
            return Err(ConfigError::Invalid {
                message: "retrieval.embedding_dimensions must be at least 1".to_string(),
            });
        }
        check_threshold(
            "verification.similarity_threshold",
            self.verification.similarity_threshold,
        )?;
        if let Some(t) = self.verification.validity_threshold {
            check_threshold("verification.validity_threshold", t)?;
        }
        if self.collection.chunk_overlap >= self.collection.chunk_size {
            return Err(ConfigError::Invalid {
                message: format!(
                    "collection.chunk_overlap ({}) must be smaller than collection.chunk_size ({})",
                    self.collection.chunk_overlap, self.collection.chunk_size
                ),
            });
        }
        Ok(())
    }
}

fn check_threshold(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::Invalid {
            message: format!("{field} must be in (0, 1], got {value}"),
        });
    }
    Ok(())
}

/// Load configuration with layered precedence (highest wins):
///
/// 1. Explicit overrides
/// 2. Environment variables (`CITEGUARD_RETRIEVAL__TOP_K`, etc.)
/// 3. Workspace config (`<workspace>/.citeguard/config.toml`)
/// 4. User config (`~/.config/citeguard/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&AssistantConfig>,
) -> Result<AssistantConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AssistantConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "citeguard", "citeguard") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".citeguard").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (CITEGUARD_VERIFICATION__SIMILARITY_THRESHOLD, etc.)
    figment = figment.merge(Env::prefixed("CITEGUARD_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(|e| ConfigError::Parse {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.conversation.max_turns, 5);
        assert_eq!(config.retrieval.top_k, 4);
        assert!((config.verification.similarity_threshold - 0.3).abs() < f32::EPSILON);
        assert!(config.verification.validity_threshold.is_none());
        assert_eq!(config.collection.chunk_size, 1000);
        assert_eq!(config.collection.chunk_overlap, 200);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_zero_max_turns() {
        let mut config = AssistantConfig::default();
        config.conversation.max_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_out_of_range() {
        let mut config = AssistantConfig::default();
        config.verification.similarity_threshold = 1.5;
        assert!(config.validate().is_err());

        config.verification.similarity_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_must_be_under_chunk_size() {
        let mut config = AssistantConfig::default();
        config.collection.chunk_overlap = config.collection.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AssistantConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: AssistantConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.retrieval.top_k, config.retrieval.top_k);
        assert_eq!(restored.llm.model, config.llm.model);
    }

    #[test]
    fn test_workspace_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cg_dir = dir.path().join(".citeguard");
        std::fs::create_dir_all(&cg_dir).unwrap();
        std::fs::write(
            cg_dir.join("config.toml"),
            "[retrieval]\ntop_k = 9\n\n[conversation]\nmax_turns = 2\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.retrieval.top_k, 9);
        assert_eq!(config.conversation.max_turns, 2);
        // Untouched sections keep their defaults.
        assert_eq!(config.collection.chunk_size, 1000);
    }

    #[test]
    fn test_explicit_overrides_win() {
        let mut overrides = AssistantConfig::default();
        overrides.retrieval.top_k = 7;
        let config = load_config(None, Some(&overrides)).unwrap();
        assert_eq!(config.retrieval.top_k, 7);
    }
}
