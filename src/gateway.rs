#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Streaming text generation through the AI gateway.

use std::time::{Duration, Instant};

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use bon::Builder;
use futures::{FutureExt, StreamExt, future::BoxFuture, stream::BoxStream};

use crate::{
    config::{ConfigState, GatewayEnv},
    models::ModelRegistry,
};

/// Sampling temperature for grading; low for consistency between runs.
pub const GRADING_TEMPERATURE: f32 = 0.3;

/// Output ceiling for single-task grading.
pub const RUBRIC_MAX_OUTPUT_TOKENS: u32 = 800;

/// Output ceiling for whole-exam grading.
pub const EXAM_MAX_OUTPUT_TOKENS: u32 = 1000;

/// Transport-level failures of a generation call.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// The model key is not in the registry.
    #[error("Model `{0}` is not registered")]
    UnknownModel(String),
    /// No gateway credential was configured.
    #[error("AI gateway credentials are not configured")]
    Unconfigured,
    /// The gateway rejected the request or the stream aborted.
    #[error("Gateway request failed: {0}")]
    Request(#[from] OpenAIError),
    /// Failure reported by an alternative [`TextGenerator`] backend.
    #[error("Transport failed: {0}")]
    Transport(String),
    /// No complete reply arrived in time.
    #[error("Generation did not finish within {0:?}")]
    Timeout(Duration),
}

/// Finite, non-restartable sequence of text fragments.
pub type ChunkStream = BoxStream<'static, Result<String, GatewayError>>;

/// Parameters of one generation call.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct GenerationRequest {
    /// Internal model key, resolved through the registry.
    model_key:         String,
    /// Full prompt text.
    prompt:            String,
    /// Output token ceiling.
    max_output_tokens: u32,
    /// Sampling temperature.
    #[builder(default = GRADING_TEMPERATURE)]
    temperature:       f32,
}

impl GenerationRequest {
    /// Returns the model key.
    pub fn model_key(&self) -> &str {
        &self.model_key
    }

    /// Returns the prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the output token ceiling.
    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    /// Returns the sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// A backend that turns a prompt into a stream of text chunks.
///
/// A buffered backend can return a single-item stream.
pub trait TextGenerator: Send + Sync {
    /// Opens one generation call.
    fn open_stream(
        &self,
        request: GenerationRequest,
    ) -> BoxFuture<'_, Result<ChunkStream, GatewayError>>;
}

/// Timing of a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationMetrics {
    /// Time until the first chunk carrying text, if any did.
    pub time_to_first_chunk: Option<Duration>,
    /// Time from opening the call to the end of the stream.
    pub total:               Duration,
    /// Number of chunks received, including empty ones.
    pub chunk_count:         usize,
}

/// The concatenated reply and how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Full reply text.
    pub text:    String,
    /// Timing of the call.
    pub metrics: GenerationMetrics,
}

/// Opens a generation and reads it to the end, bounded by `timeout`.
///
/// Any error item in the stream fails the whole call, even after text has
/// arrived. Dropping the returned future cancels the call.
pub async fn generate(
    generator: &dyn TextGenerator,
    request: GenerationRequest,
    timeout: Duration,
) -> Result<Generation, GatewayError> {
    tokio::time::timeout(timeout, collect(generator, request))
        .await
        .map_err(|_| GatewayError::Timeout(timeout))?
}

/// Concatenates every chunk of one generation.
async fn collect(
    generator: &dyn TextGenerator,
    request: GenerationRequest,
) -> Result<Generation, GatewayError> {
    let model_key = request.model_key().to_owned();
    let started = Instant::now();
    let mut stream = generator.open_stream(request).await?;

    let mut text = String::new();
    let mut metrics = GenerationMetrics::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        metrics.chunk_count += 1;
        if metrics.time_to_first_chunk.is_none() && !chunk.is_empty() {
            let elapsed = started.elapsed();
            metrics.time_to_first_chunk = Some(elapsed);
            tracing::debug!(
                model = %model_key,
                elapsed_ms = elapsed.as_millis() as u64,
                "first chunk"
            );
        }
        text.push_str(&chunk);
    }

    metrics.total = started.elapsed();
    tracing::info!(
        model = %model_key,
        first_chunk_ms = metrics.time_to_first_chunk.map(|d| d.as_millis() as u64),
        total_ms = metrics.total.as_millis() as u64,
        chunks = metrics.chunk_count,
        "generation completed"
    );

    Ok(Generation { text, metrics })
}

/// Streams chat completions from the OpenAI-compatible AI gateway.
#[derive(Clone)]
pub struct GatewayClient {
    /// Authenticated client; `None` when no credential is configured.
    client: Option<OpenAIClient<OpenAIConfig>>,
    /// Registry used to resolve model keys.
    models: ModelRegistry,
}

impl GatewayClient {
    /// Creates a client. Without credentials every call fails with
    /// [`GatewayError::Unconfigured`].
    pub fn new(
        gateway: Option<&GatewayEnv>,
        http_client: reqwest::Client,
        models: ModelRegistry,
    ) -> Self {
        let client = gateway.map(|env| {
            OpenAIClient::with_config(
                OpenAIConfig::new()
                    .with_api_base(env.api_base().to_owned())
                    .with_api_key(env.api_key().to_owned()),
            )
            .with_http_client(http_client)
        });

        Self { client, models }
    }

    /// Creates a client from the process configuration.
    pub fn from_config(config: &ConfigState) -> Self {
        Self::new(config.gateway(), config.http_client(), config.models())
    }
}

impl TextGenerator for GatewayClient {
    fn open_stream(
        &self,
        request: GenerationRequest,
    ) -> BoxFuture<'_, Result<ChunkStream, GatewayError>> {
        async move {
            let model = self
                .models
                .resolve(request.model_key())
                .ok_or_else(|| GatewayError::UnknownModel(request.model_key().to_owned()))?;
            let client = self.client.as_ref().ok_or(GatewayError::Unconfigured)?;

            let chat_request = CreateChatCompletionRequestArgs::default()
                .model(model.gateway_id)
                .messages(vec![
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(request.prompt)
                        .build()?
                        .into(),
                ])
                .max_completion_tokens(request.max_output_tokens)
                .temperature(request.temperature)
                .stream(true)
                .build()?;

            tracing::debug!(model = model.key, gateway_id = model.gateway_id, "opening stream");
            let stream = client.chat().create_stream(chat_request).await?;

            let chunks = stream.map(|item| {
                item.map(|response| {
                    response
                        .choices
                        .into_iter()
                        .filter_map(|choice| choice.delta.content)
                        .collect::<String>()
                })
                .map_err(GatewayError::from)
            });

            Ok(chunks.boxed())
        }
        .boxed()
    }
}
