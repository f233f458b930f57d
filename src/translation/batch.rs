/*!
 * Batched, order-preserving translation of text positions.
 *
 * `BatchPipeline::process` walks a document's text positions in order,
 * protects glossary terms, groups the protected texts into fixed-size batches
 * and sends each batch to the backend in a single call. Translations are
 * restored and written back to the position they came from.
 *
 * Batches are processed strictly one after the other. When a batch fails,
 * everything written by earlier batches stays written and nothing of the
 * failing batch or later positions is touched.
 */

use log::{debug, trace};
use std::sync::Arc;

use crate::errors::PipelineError;
use crate::glossary::{ProtectedText, TermGuard};

use super::backend::TranslationBackend;

/// A text-bearing location in a document
pub trait TextPosition {
    /// Current text of the position
    fn read(&self) -> String;

    /// Replace the text of the position
    fn write(&mut self, text: String);
}

/// Counters collected while processing one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Positions produced by the iterator
    pub positions_seen: usize,
    /// Positions skipped because their text was blank
    pub positions_skipped: usize,
    /// Positions written with a translation
    pub positions_written: usize,
    /// Backend calls made
    pub batches: usize,
}

impl ProcessReport {
    /// Add the counters of another report to this one
    pub fn merge(&mut self, other: &ProcessReport) {
        self.positions_seen += other.positions_seen;
        self.positions_skipped += other.positions_skipped;
        self.positions_written += other.positions_written;
        self.batches += other.batches;
    }
}

/// Drives protect, translate and restore over a stream of text positions
#[derive(Debug, Clone)]
pub struct BatchPipeline {
    guard: Arc<TermGuard>,
    batch_size: usize,
}

impl BatchPipeline {
    /// Create a pipeline. A batch size of zero is rejected.
    pub fn new(guard: Arc<TermGuard>, batch_size: usize) -> Result<Self, PipelineError> {
        if batch_size == 0 {
            return Err(PipelineError::InvalidBatchSize(batch_size));
        }
        Ok(Self { guard, batch_size })
    }

    /// Maximum number of texts per backend call
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The glossary guard used for every text
    pub fn guard(&self) -> &TermGuard {
        &self.guard
    }

    /// Translate every non-blank position of `positions` in place
    pub async fn process<I, P, B>(&self, positions: I, backend: &B) -> Result<ProcessReport, PipelineError>
    where
        I: IntoIterator<Item = P>,
        P: TextPosition,
        B: TranslationBackend + ?Sized,
    {
        let mut report = ProcessReport::default();
        let mut batch: Vec<(P, ProtectedText)> = Vec::with_capacity(self.batch_size);

        for position in positions {
            report.positions_seen += 1;

            let text = position.read();
            if text.trim().is_empty() {
                report.positions_skipped += 1;
                continue;
            }

            let protected = self.guard.protect(&text);
            batch.push((position, protected));

            if batch.len() == self.batch_size {
                self.flush(&mut batch, backend, &mut report).await?;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, backend, &mut report).await?;
        }

        Ok(report)
    }

    /// Send one batch to the backend and write the restored translations back.
    /// The batch buffer is left empty whatever the outcome.
    async fn flush<P, B>(
        &self,
        batch: &mut Vec<(P, ProtectedText)>,
        backend: &B,
        report: &mut ProcessReport,
    ) -> Result<(), PipelineError>
    where
        P: TextPosition,
        B: TranslationBackend + ?Sized,
    {
        let batch_index = report.batches;
        let pending: Vec<(P, ProtectedText)> = batch.drain(..).collect();
        let texts: Vec<String> = pending.iter().map(|(_, protected)| protected.text.clone()).collect();

        debug!("Sending batch {} with {} texts", batch_index, texts.len());

        let translations = backend
            .translate_batch(&texts)
            .await
            .map_err(|source| PipelineError::Backend {
                batch_index,
                completed_positions: report.positions_written,
                source,
            })?;

        if translations.len() != texts.len() {
            return Err(PipelineError::ContractViolation {
                batch_index,
                expected: texts.len(),
                actual: translations.len(),
                completed_positions: report.positions_written,
            });
        }

        for ((mut position, protected), translated) in pending.into_iter().zip(translations) {
            let restored = self.guard.restore(&translated, &protected.placeholders);
            trace!("Batch {}: {:?} -> {:?}", batch_index, protected.text, restored);
            position.write(restored);
            report.positions_written += 1;
        }

        report.batches += 1;
        Ok(())
    }
}
