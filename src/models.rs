#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Static registry of the language models the grader can route to.

use serde::Serialize;
use tabled::Tabled;

/// Model key used for every grading call unless overridden at startup.
pub const DEFAULT_GRADING_MODEL: &str = "claude-3-5-sonnet-20241022";

/// One registry entry: how a model key maps onto the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Tabled)]
pub struct ModelConfig {
    /// Internal model key.
    #[tabled(rename = "Key")]
    pub key:        &'static str,
    /// Display name.
    #[tabled(rename = "Name")]
    pub name:       &'static str,
    /// Upstream provider.
    #[tabled(rename = "Provider")]
    pub provider:   &'static str,
    /// Provider-qualified identifier understood by the gateway.
    #[tabled(rename = "Gateway ID")]
    pub gateway_id: &'static str,
}

/// Known models.
const MODELS: &[ModelConfig] = &[
    ModelConfig {
        key:        "gpt-4o",
        name:       "GPT-4o",
        provider:   "OpenAI",
        gateway_id: "openai/gpt-4o",
    },
    ModelConfig {
        key:        "gpt-4o-mini",
        name:       "GPT-4o Mini",
        provider:   "OpenAI",
        gateway_id: "openai/gpt-4o-mini",
    },
    ModelConfig {
        key:        "claude-3-5-sonnet-20241022",
        name:       "Claude 3.5 Sonnet",
        provider:   "Anthropic",
        gateway_id: "anthropic/claude-3-5-sonnet-20241022",
    },
    ModelConfig {
        key:        "claude-3-haiku-20240307",
        name:       "Claude 3 Haiku",
        provider:   "Anthropic",
        gateway_id: "anthropic/claude-3-haiku-20240307",
    },
];

/// Read-only view over the model table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelRegistry;

impl ModelRegistry {
    /// Looks up a model by its internal key.
    pub fn resolve(&self, key: &str) -> Option<&'static ModelConfig> {
        MODELS.iter().find(|model| model.key == key)
    }

    /// Returns every registered model.
    pub fn all(&self) -> &'static [ModelConfig] {
        MODELS
    }

    /// Returns true when `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }
}
