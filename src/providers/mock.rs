/*!
 * Mock translation backend for dry runs and testing.
 *
 * `MockBackend` never leaves the process. Each behavior simulates one way a
 * real provider can act:
 * - `MockBackend::echo()` - returns every text unchanged
 * - `MockBackend::tagged(tag)` - prefixes every text with `tag`
 * - `MockBackend::reverse_words()` - reverses word order, moving placeholders around
 * - `MockBackend::failing_on(k)` - fails on the k-th call (1-based)
 * - `MockBackend::short_on(k)` - drops the last translation on the k-th call
 *
 * Every submitted batch is recorded and can be inspected with `calls()`.
 */

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::translation::backend::TranslationBackend;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Returns the input unchanged
    Echo,
    /// Prefixes every text with a tag
    Tagged(String),
    /// Reverses the order of whitespace-separated words
    ReverseWords,
    /// Fails on the given call number (1-based), echoes otherwise
    FailOnCall(usize),
    /// Returns one translation too few on the given call number (1-based)
    ShortOnCall(usize),
}

/// In-process translation backend
#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Identity backend
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Backend that prefixes every text with `tag`
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self::new(MockBehavior::Tagged(tag.into()))
    }

    /// Backend that reverses word order
    pub fn reverse_words() -> Self {
        Self::new(MockBehavior::ReverseWords)
    }

    /// Backend failing on call `call` (1-based)
    pub fn failing_on(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall(call))
    }

    /// Backend returning a short list on call `call` (1-based)
    pub fn short_on(call: usize) -> Self {
        Self::new(MockBehavior::ShortOnCall(call))
    }

    /// Every batch submitted so far, in call order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Number of `translate_batch` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn translate_one(&self, text: &str) -> String {
        match &self.behavior {
            MockBehavior::Tagged(tag) => format!("{}{}", tag, text),
            MockBehavior::ReverseWords => text.split_whitespace().rev().collect::<Vec<_>>().join(" "),
            _ => text.to_string(),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(texts.to_vec());
            calls.len()
        };

        if self.behavior == MockBehavior::FailOnCall(call) {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure on call {}", call),
            });
        }

        let mut translated: Vec<String> = texts.iter().map(|text| self.translate_one(text)).collect();

        if self.behavior == MockBehavior::ShortOnCall(call) {
            translated.pop();
        }

        Ok(translated)
    }
}
