use async_trait::async_trait;

use crate::errors::ProviderError;

/// Something that turns a list of source strings into translated strings.
///
/// Implementations must return exactly one output per input, in input order,
/// and an empty list for an empty input. A failure carries no partial result.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate every text of one batch
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError>;
}

#[async_trait]
impl<T: TranslationBackend + ?Sized> TranslationBackend for Box<T> {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        (**self).translate_batch(texts).await
    }
}

#[async_trait]
impl<T: TranslationBackend + ?Sized> TranslationBackend for std::sync::Arc<T> {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        (**self).translate_batch(texts).await
    }
}
