#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use anyhow::{Context, Result};
use reqwest::Client;

use crate::{
    models::{DEFAULT_GRADING_MODEL, ModelRegistry},
    prompts::GradingPrompts,
};

/// Base URL of the OpenAI-compatible AI gateway.
pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://ai-gateway.vercel.sh/v1";

/// Default bound on a single remote grading call.
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

/// Default HTTP listen address.
const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

/// Gateway credentials sourced from the environment.
#[derive(Clone)]
pub struct GatewayEnv {
    /// Base URL for the OpenAI-compatible gateway endpoint.
    api_base: String,
    /// API key used to authenticate gateway requests.
    api_key:  String,
}

impl GatewayEnv {
    /// Builds a credential bundle from explicit values.
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            api_key:  api_key.into(),
        }
    }

    /// Construct a `GatewayEnv` from environment variables; returns `None` if
    /// the API key is missing.
    fn from_env() -> Option<Self> {
        let api_key = std::env::var("AI_GATEWAY_API_KEY").ok()?.trim().to_owned();
        if api_key.is_empty() {
            return None;
        }

        let api_base = std::env::var("AI_GATEWAY_BASE_URL")
            .map(|value| value.trim().to_owned())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_BASE_URL.to_string());

        Some(Self::new(api_base, api_key))
    }

    /// Returns the API base URL used for gateway requests.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key used for gateway requests.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for GatewayEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayEnv")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Runtime and prompt configuration shared across the crate.
pub struct ConfigState {
    /// Gateway credentials, if configured.
    gateway:         Option<GatewayEnv>,
    /// Shared reqwest HTTP client reused by the gateway client.
    http_client:     Client,
    /// Static model table.
    models:          ModelRegistry,
    /// Model key used for all grading calls.
    default_model:   String,
    /// Upper bound on one remote generation.
    gateway_timeout: Duration,
    /// Address the HTTP boundary listens on.
    bind_addr:       SocketAddr,
    /// Prompt templates.
    prompts:         GradingPrompts,
}

impl ConfigState {
    /// Construct a new configuration instance by reading the environment and
    /// prompt assets.
    fn new() -> Result<Self> {
        let http_client = Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .build()
            .context("Failed to construct shared HTTP client")?;

        let models = ModelRegistry;
        let default_model = std::env::var("GRADER_MODEL")
            .map(|value| value.trim().to_owned())
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_GRADING_MODEL.to_string());
        if !models.contains(&default_model) {
            tracing::warn!(
                model = %default_model,
                "GRADER_MODEL is not a registered model key; remote grading will fall back"
            );
        }

        let gateway = GatewayEnv::from_env();
        if gateway.is_none() {
            tracing::warn!("AI_GATEWAY_API_KEY is not set; all grading will use heuristics");
        }

        Ok(Self {
            gateway,
            http_client,
            models,
            default_model,
            gateway_timeout: read_timeout_secs(
                "GRADER_GATEWAY_TIMEOUT_SECS",
                DEFAULT_GATEWAY_TIMEOUT_SECS,
            ),
            bind_addr: read_socket_addr("GRADER_BIND_ADDR", DEFAULT_BIND_ADDR),
            prompts: GradingPrompts::load(),
        })
    }

    /// Returns the gateway credentials, if configured.
    pub fn gateway(&self) -> Option<&GatewayEnv> {
        self.gateway.as_ref()
    }

    /// Returns a clone of the shared reqwest HTTP client.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Returns the model registry.
    pub fn models(&self) -> ModelRegistry {
        self.models
    }

    /// Returns the model key used for grading.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the remote call timeout.
    pub fn gateway_timeout(&self) -> Duration {
        self.gateway_timeout
    }

    /// Returns the HTTP listen address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Returns the prompt templates.
    pub fn prompts(&self) -> &GradingPrompts {
        &self.prompts
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot()
        .lock()
        .map_err(|_| anyhow::anyhow!("config slot poisoned"))?;
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

/// Parses an environment variable into a `SocketAddr`, warning and falling
/// back to `default` when the value is not a valid address.
fn read_socket_addr(env: &str, default: SocketAddr) -> SocketAddr {
    let Ok(value) = std::env::var(env) else {
        return default;
    };

    value.trim().parse::<SocketAddr>().unwrap_or_else(|err| {
        tracing::warn!(
            variable = env,
            value = %value,
            error = %err,
            fallback = %default,
            "invalid socket address; using default"
        );
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets a variable only this module reads.
    fn set(env: &str, value: &str) {
        // SAFETY: each test uses its own variable name.
        unsafe { std::env::set_var(env, value) };
    }

    #[test]
    fn timeout_defaults_when_unset() {
        assert_eq!(
            read_timeout_secs("CEFR_TEST_TIMEOUT_UNSET", DEFAULT_GATEWAY_TIMEOUT_SECS),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn timeout_ignores_garbage_and_zero() {
        set("CEFR_TEST_TIMEOUT_GARBAGE", "soon");
        set("CEFR_TEST_TIMEOUT_ZERO", "0");

        assert_eq!(
            read_timeout_secs("CEFR_TEST_TIMEOUT_GARBAGE", DEFAULT_GATEWAY_TIMEOUT_SECS),
            Duration::from_secs(30)
        );
        assert_eq!(
            read_timeout_secs("CEFR_TEST_TIMEOUT_ZERO", DEFAULT_GATEWAY_TIMEOUT_SECS),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn timeout_reads_seconds() {
        set("CEFR_TEST_TIMEOUT_SET", " 5 ");
        assert_eq!(
            read_timeout_secs("CEFR_TEST_TIMEOUT_SET", DEFAULT_GATEWAY_TIMEOUT_SECS),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn bad_bind_addr_falls_back() {
        set("CEFR_TEST_BIND_BAD", "localhost:eighty");
        assert_eq!(
            read_socket_addr("CEFR_TEST_BIND_BAD", DEFAULT_BIND_ADDR),
            DEFAULT_BIND_ADDR
        );
        assert_eq!(DEFAULT_BIND_ADDR.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn bind_addr_reads_value() {
        set("CEFR_TEST_BIND_SET", "0.0.0.0:8080");
        assert_eq!(
            read_socket_addr("CEFR_TEST_BIND_SET", DEFAULT_BIND_ADDR),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }
}
