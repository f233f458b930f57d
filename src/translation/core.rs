/*!
 * Core translation service implementation.
 *
 * `TranslationService` wraps one provider client and implements
 * `TranslationBackend` on top of it: a batch of texts is numbered with
 * `<<ENTRY_i>>` markers, sent as a single prompt, and the reply is split back
 * on the same markers.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::Provider;

use super::backend::TranslationBackend;

/// Marker closing the last entry of a batch prompt
const END_MARKER: &str = "<<END>>";

/// Common prefix of every entry marker
const ENTRY_PREFIX: &str = "<<ENTRY_";

/// Maximum tokens requested from providers that need an explicit cap
const MAX_RESPONSE_TOKENS: u32 = 4096;

/// Instructions appended to every system prompt
const BATCH_INSTRUCTIONS: &str = "The input is a list of entries. Each entry starts with a marker such as <<ENTRY_0>> and the list ends with <<END>>. \
Reply with every marker exactly as given, each followed by the translation of its entry, and finish with <<END>>. \
Copy tokens wrapped in special brackets, such as \u{27E6}TERM_0\u{27E7}, unchanged. \
Only respond with the marked translations, without any explanations or notes.";

fn entry_marker(index: usize) -> String {
    format!("{}{}>>", ENTRY_PREFIX, index)
}

/// Parse an endpoint string into host and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;

    let host = if url.scheme() == "https" {
        format!("https://{}", host)
    } else {
        host.to_string()
    };

    let port = url.port_or_known_default().unwrap_or(80);

    Ok((host, port))
}

/// Build the user prompt for one batch
pub fn build_batch_prompt(texts: &[String]) -> String {
    let mut prompt = String::new();
    for (index, text) in texts.iter().enumerate() {
        prompt.push_str(&entry_marker(index));
        prompt.push('\n');
        prompt.push_str(text);
        prompt.push('\n');
    }
    prompt.push_str(END_MARKER);
    prompt
}

/// Split a marked response into at most `expected` entries.
///
/// Parsing stops at the first missing entry marker, so a response that lost
/// markers yields a shorter list instead of misaligned entries.
pub fn parse_batch_response(response: &str, expected: usize) -> Vec<String> {
    let mut entries = Vec::with_capacity(expected);
    let mut cursor = 0;

    for index in 0..expected {
        let start_marker = entry_marker(index);
        let Some(found) = response[cursor..].find(&start_marker) else {
            break;
        };
        let start = cursor + found + start_marker.len();

        let rest = &response[start..];
        let end = [rest.find(ENTRY_PREFIX), rest.find(END_MARKER)]
            .into_iter()
            .flatten()
            .min()
            .map_or(response.len(), |offset| start + offset);

        entries.push(response[start..end].trim().to_string());
        cursor = end;
    }

    entries
}

/// Provider client variants
#[derive(Debug)]
enum ProviderClient {
    /// Ollama LLM service
    Ollama(Ollama),
    /// Anthropic API service
    Anthropic(Anthropic),
}

/// Translation backend backed by an LLM provider
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    client: ProviderClient,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// System prompt with languages filled in
    system_prompt: String,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig, source_language: &str, target_language: &str) -> Result<Self> {
        let model = config.get_model();
        let timeout_secs = config.get_timeout_secs();

        let client = match config.provider {
            TranslationProvider::Ollama => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                ProviderClient::Ollama(Ollama::new(host, port, model, timeout_secs))
            }
            TranslationProvider::Anthropic => ProviderClient::Anthropic(Anthropic::new(
                config.get_api_key(),
                config.get_endpoint(),
                model,
                timeout_secs,
            )),
        };

        let source_name = language_utils::get_language_name(source_language)
            .unwrap_or_else(|_| source_language.to_string());
        let target_name = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());
        let system_prompt = format!(
            "{}\n\n{}",
            config.render_system_prompt(&source_name, &target_name),
            BATCH_INSTRUCTIONS
        );

        Ok(Self {
            client,
            config,
            system_prompt,
        })
    }

    /// The full system prompt sent with every request
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        info!(
            "Testing connection to {} with model {}",
            self.config.provider.display_name(),
            self.config.get_model()
        );

        let result = match &self.client {
            ProviderClient::Ollama(client) => client.test_connection().await,
            ProviderClient::Anthropic(client) => client.test_connection().await,
        };

        result.map_err(|e| {
            anyhow!(
                "Failed to connect to {}: {}",
                self.config.provider.display_name(),
                e
            )
        })
    }

    /// Send one prompt to the provider
    async fn complete_once(&self, prompt: &str) -> Result<String, ProviderError> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;

        match &self.client {
            ProviderClient::Ollama(client) => {
                let request = GenerationRequest::new(model, prompt)
                    .system(&self.system_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            ProviderClient::Anthropic(client) => {
                let request = AnthropicRequest::new(model, MAX_RESPONSE_TOKENS)
                    .system(&self.system_prompt)
                    .add_message("user", prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                if response.stop_reason.as_deref() == Some("max_tokens") {
                    warn!("Anthropic response hit the token limit; the batch may come back short");
                }
                Ok(Anthropic::extract_text(&response))
            }
        }
    }

    /// Send one prompt, retrying transient failures with exponential backoff
    async fn complete_with_retry(&self, prompt: &str) -> Result<String, ProviderError> {
        let max_retries = self.config.common.retry_count;
        let backoff_base_ms = self.config.common.retry_backoff_ms;
        let mut attempt = 0;

        loop {
            match self.complete_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < max_retries => {
                    let backoff_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
                    attempt += 1;
                    warn!(
                        "{} request failed ({}), retrying in {} ms - attempt {}/{}",
                        self.config.provider.display_name(),
                        e,
                        backoff_ms,
                        attempt,
                        max_retries
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl TranslationBackend for TranslationService {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        let prompt = build_batch_prompt(texts);
        let response = self.complete_with_retry(&prompt).await?;
        let entries = parse_batch_response(&response, texts.len());

        debug!(
            "{} answered {} of {} entries in {:?}",
            self.config.provider.display_name(),
            entries.len(),
            texts.len(),
            start_time.elapsed()
        );

        Ok(entries)
    }
}
