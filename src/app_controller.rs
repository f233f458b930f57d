use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::epub::{EpubPackage, MetadataUpdate, XhtmlDocument};
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::glossary::{load_terms, TermGuard};
use crate::language_utils;
use crate::providers::mock::MockBackend;
use crate::translation::{BatchPipeline, ProcessReport, TranslationBackend, TranslationService};

// @module: Application controller for book translation

/// Counters for one translated book
#[derive(Debug, Clone, Default)]
pub struct BookReport {
    /// Content documents that were changed
    pub parts_translated: usize,
    /// Content documents left untouched
    pub parts_skipped: usize,
    /// Text positions processed across the book
    pub positions: ProcessReport,
    /// Wall time spent on the book
    pub duration: Duration,
}

/// Main application controller for EPUB translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Glossary shared by every pipeline
    guard: Arc<TermGuard>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let mut terms = config.glossary.terms.clone();
        terms.extend(load_terms(&config.glossary.files).context("Failed to load glossary files")?);

        let guard = if config.glossary.use_default_terms {
            TermGuard::with_defaults(&terms)
        } else {
            TermGuard::new(&terms)
        }
        .context("Failed to build glossary")?;

        info!("Glossary: {} preserved terms", guard.terms().len());

        Ok(Self {
            config,
            guard: Arc::new(guard),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Glossary guard shared by every book
    pub fn term_guard(&self) -> Arc<TermGuard> {
        Arc::clone(&self.guard)
    }

    /// Translate a single book or every book under a directory.
    ///
    /// For a directory, `output` is the directory receiving the translated books.
    pub async fn run(&self, input: PathBuf, output: Option<PathBuf>, force_overwrite: bool, dry_run: bool) -> Result<()> {
        if !input.exists() {
            return Err(anyhow!("Input path does not exist: {:?}", input));
        }

        let backend: Box<dyn TranslationBackend> = if dry_run {
            info!("Dry run: text is passed through unchanged");
            Box::new(MockBackend::echo())
        } else {
            let service = TranslationService::new(
                self.config.translation.clone(),
                &self.config.source_language,
                &self.config.target_language,
            )?;
            if let Err(e) = service.test_connection().await {
                warn!("Provider connection test failed: {}", e);
            }
            Box::new(service)
        };

        if FileManager::dir_exists(&input) {
            self.run_folder(&input, output.as_deref(), force_overwrite, backend.as_ref()).await
        } else {
            let output_path = output.unwrap_or_else(|| {
                FileManager::generate_output_path(&input, &self.config.target_language)
            });
            if output_path.exists() && !force_overwrite {
                warn!("Skipping file, translation already exists (use -f to force overwrite)");
                return Ok(());
            }
            let report = self.translate_book(&input, &output_path, backend.as_ref()).await?;
            self.log_report(&output_path, &report);
            Ok(())
        }
    }

    async fn run_folder(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        force_overwrite: bool,
        backend: &dyn TranslationBackend,
    ) -> Result<()> {
        let target_language = &self.config.target_language;
        let books: Vec<PathBuf> = FileManager::find_files(input_dir, "epub")?
            .into_iter()
            .filter(|path| !FileManager::is_translation_output(path, target_language))
            .collect();

        if books.is_empty() {
            warn!("No EPUB files found in {:?}", input_dir);
            return Ok(());
        }

        info!("Found {} books in {:?}", books.len(), input_dir);

        let start_time = Instant::now();
        let mut translated = 0;
        let mut skipped = 0;
        let mut failed = 0;

        for book in &books {
            let output_path = Self::folder_output_path(book, input_dir, output_dir, target_language);

            if output_path.exists() && !force_overwrite {
                warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", book);
                skipped += 1;
                continue;
            }

            match self.translate_book(book, &output_path, backend).await {
                Ok(report) => {
                    self.log_report(&output_path, &report);
                    translated += 1;
                }
                Err(e) => {
                    error!("Error processing {:?}: {:#}", book, e);
                    failed += 1;
                }
            }
        }

        info!(
            "Processed {} books in {}: {} translated, {} skipped, {} failed",
            books.len(),
            Self::format_duration(start_time.elapsed()),
            translated,
            skipped,
            failed
        );

        if failed > 0 {
            return Err(anyhow!("{} of {} books failed to translate", failed, books.len()));
        }
        Ok(())
    }

    /// Output path for a book found under `input_dir`.
    ///
    /// With an output directory the book's subdirectory below `input_dir` is kept,
    /// so books sharing a file name in different folders do not collide.
    pub fn folder_output_path(book: &Path, input_dir: &Path, output_dir: Option<&Path>, target_language: &str) -> PathBuf {
        let default_output = FileManager::generate_output_path(book, target_language);
        let (Some(dir), Some(name)) = (output_dir, default_output.file_name()) else {
            return default_output;
        };

        let relative_dir = book
            .strip_prefix(input_dir)
            .ok()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        dir.join(relative_dir).join(name)
    }

    /// Translate one book and write it to `output`.
    ///
    /// Nothing is written when any content document fails.
    pub async fn translate_book<B>(&self, input: &Path, output: &Path, backend: &B) -> Result<BookReport>
    where
        B: TranslationBackend + ?Sized,
    {
        let start_time = Instant::now();
        let pipeline = BatchPipeline::new(self.term_guard(), self.config.translation.common.batch_size)?;

        let mut package = EpubPackage::open(input)
            .map_err(TranslationError::from)
            .with_context(|| format!("Failed to open EPUB {:?}", input))?;
        let documents = package.documents();

        info!(
            "Translating {:?}: {} documents, {} -> {}",
            input,
            documents.len(),
            self.config.source_language,
            self.config.target_language
        );

        let multi_progress = MultiProgress::new();
        let progress_bar = multi_progress.add(ProgressBar::new(documents.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} parts ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let mut report = BookReport::default();

        for part in &documents {
            progress_bar.set_message(part.clone());

            let Some(content) = package.entry(part).and_then(|data| std::str::from_utf8(data).ok()) else {
                warn!("Skipping {}: content is not UTF-8", part);
                report.parts_skipped += 1;
                progress_bar.inc(1);
                continue;
            };

            let mut document = XhtmlDocument::parse(part, content).map_err(TranslationError::from)?;

            let part_report = match pipeline.process(document.text_positions(), backend).await {
                Ok(part_report) => part_report,
                Err(source) => {
                    progress_bar.abandon_with_message(format!("failed on {}", part));
                    return Err(TranslationError::Part {
                        part: part.clone(),
                        source,
                    }
                    .into());
                }
            };
            report.positions.merge(&part_report);

            if document.is_modified() {
                package
                    .replace_entry(part, document.to_xhtml().into_bytes())
                    .map_err(TranslationError::from)?;
                report.parts_translated += 1;
            } else {
                report.parts_skipped += 1;
            }

            debug!(
                "{}: {} positions, {} written in {} batches",
                part, part_report.positions_seen, part_report.positions_written, part_report.batches
            );
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("done");

        if self.config.epub.update_metadata {
            let update = self.metadata_update(&package, input);
            package.update_metadata(&update).map_err(TranslationError::from)?;
        }

        if let Some(parent) = output.parent() {
            FileManager::ensure_dir(parent)?;
        }
        package
            .save(output)
            .map_err(TranslationError::from)
            .with_context(|| format!("Failed to write EPUB {:?}", output))?;

        report.duration = start_time.elapsed();
        Ok(report)
    }

    /// Identifier, title and language for the translated book
    fn metadata_update(&self, package: &EpubPackage, input: &Path) -> MetadataUpdate {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = package.metadata();
        let target = &self.config.target_language;

        let identifier = metadata.identifier.clone().unwrap_or_else(|| stem.clone());
        let title = metadata.title.clone().unwrap_or(stem);
        let language = language_utils::normalize_to_part1_or_part2t(target).unwrap_or_else(|_| target.clone());

        MetadataUpdate {
            identifier: Some(format!("{}-translated", identifier)),
            title: Some(format!("{} ({} Translation)", title, target.to_uppercase())),
            language: Some(language),
        }
    }

    fn log_report(&self, output: &Path, report: &BookReport) {
        info!(
            "Success: {} ({} parts translated, {} positions in {} batches, {})",
            output.display(),
            report.parts_translated,
            report.positions.positions_written,
            report.positions.batches,
            Self::format_duration(report.duration)
        );
    }

    /// Format a duration as `1h 2m 3s`, `2m 3s` or `3.4s`
    pub fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }
}
