/*!
 * Translation of document text through an AI provider.
 *
 * - `backend`: the `TranslationBackend` seam between the pipeline and providers
 * - `batch`: the batched, order-preserving pipeline over text positions
 * - `core`: the provider-backed translation service
 */

pub use self::backend::TranslationBackend;
pub use self::batch::{BatchPipeline, ProcessReport, TextPosition};
pub use self::core::TranslationService;

pub mod backend;
pub mod batch;
pub mod core;
