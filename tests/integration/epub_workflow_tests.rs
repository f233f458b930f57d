/*!
 * End-to-end tests: translating whole books through the controller
 */

use anyhow::Result;
use epub_translator::app_config::Config;
use epub_translator::app_controller::Controller;
use epub_translator::epub::EpubPackage;
use epub_translator::providers::mock::MockBackend;
use crate::common;

/// Test a full book translation with a tagging backend
#[tokio::test]
async fn test_translateBook_withTaggingBackend_shouldTranslateTextOnly() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("dragon.epub");
    let output = temp_dir.path().join("out/dragon.id.epub");
    common::build_sample_epub(&input)?;

    let controller = Controller::with_config(Config::default())?;
    let backend = MockBackend::tagged("[id] ");
    let report = controller.translate_book(&input, &output, &backend).await?;

    assert_eq!(report.parts_translated, 2);
    assert_eq!(report.positions.positions_written, 8);
    assert_eq!(report.positions.batches, 2);
    assert_eq!(backend.call_count(), 2);

    let chapter1 = common::read_entry(&output, "OEBPS/text/chapter1.xhtml")?;
    assert!(chapter1.contains("<title>[id] Chapter One</title>"));
    assert!(chapter1.contains("<p>[id] The dragon slept in the hall.</p>"));
    assert!(chapter1.contains("<p>[id] A fox &amp; a wolf kept watch.</p>"));
    assert!(chapter1.contains("<style>p { margin: 0; }</style>"));

    let chapter2 = common::read_entry(&output, "OEBPS/text/chapter 2.xhtml")?;
    assert!(chapter2.contains("<p>[id] The <em>[id] samurai</em> [id] drew his katana.</p>"));
    assert!(chapter2.contains("<script>var x = \"do not translate\";</script>"));

    assert_eq!(common::read_entry(&output, "OEBPS/style.css")?, common::STYLE_CSS);
    assert_eq!(common::entry_names(&output)?[0], "mimetype");
    Ok(())
}

/// Test that glossary terms never reach the backend
#[tokio::test]
async fn test_translateBook_shouldHideGlossaryTermsFromBackend() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("dragon.epub");
    let output = temp_dir.path().join("dragon.id.epub");
    common::build_sample_epub(&input)?;

    let controller = Controller::with_config(Config::default())?;
    let backend = MockBackend::echo();
    controller.translate_book(&input, &output, &backend).await?;

    for text in backend.calls().concat() {
        let lower = text.to_lowercase();
        for term in ["dragon", "fox", "wolf", "samurai", "katana"] {
            assert!(!lower.contains(term), "{:?} leaked in {:?}", term, text);
        }
    }
    Ok(())
}

/// Test the rewritten metadata of the translated book
#[tokio::test]
async fn test_translateBook_shouldUpdateMetadata() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("dragon.epub");
    let output = temp_dir.path().join("dragon.id.epub");
    common::build_sample_epub(&input)?;

    let controller = Controller::with_config(Config::default())?;
    controller.translate_book(&input, &output, &MockBackend::echo()).await?;

    let translated = EpubPackage::open(&output)?;
    let metadata = translated.metadata();
    assert_eq!(metadata.identifier.as_deref(), Some("urn:uuid:sample-book-translated"));
    assert_eq!(metadata.title.as_deref(), Some("The Dragon Road (ID Translation)"));
    assert_eq!(metadata.language.as_deref(), Some("id"));
    Ok(())
}

/// Test that metadata is kept when updates are disabled
#[tokio::test]
async fn test_translateBook_withMetadataDisabled_shouldKeepOpf() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("dragon.epub");
    let output = temp_dir.path().join("dragon.id.epub");
    common::build_sample_epub(&input)?;

    let mut config = Config::default();
    config.epub.update_metadata = false;
    let controller = Controller::with_config(config)?;
    controller.translate_book(&input, &output, &MockBackend::echo()).await?;

    assert_eq!(common::read_entry(&output, "OEBPS/content.opf")?, common::CONTENT_OPF);
    Ok(())
}

/// Test that a failing part aborts the book, names the part and writes nothing
#[tokio::test]
async fn test_translateBook_withBackendFailure_shouldNotWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("dragon.epub");
    let output = temp_dir.path().join("dragon.id.epub");
    common::build_sample_epub(&input)?;

    let controller = Controller::with_config(Config::default())?;
    let error = controller
        .translate_book(&input, &output, &MockBackend::failing_on(2))
        .await
        .unwrap_err();

    let message = format!("{:#}", error);
    assert!(message.contains("OEBPS/text/chapter 2.xhtml"), "{}", message);
    assert!(message.contains("batch 0"), "{}", message);
    assert!(!output.exists());
    Ok(())
}

/// Test that a zero batch size fails before anything is read
#[tokio::test]
async fn test_translateBook_withZeroBatchSize_shouldFailFast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("never.id.epub");

    let mut config = Config::default();
    config.translation.common.batch_size = 0;
    let controller = Controller::with_config(config)?;
    let backend = MockBackend::echo();

    let result = controller
        .translate_book(&temp_dir.path().join("missing.epub"), &output, &backend)
        .await;

    assert!(format!("{:#}", result.unwrap_err()).contains("Invalid batch size 0"));
    assert_eq!(backend.call_count(), 0);
    Ok(())
}

/// Test folder processing with a dry run, skipping outputs and existing translations
#[tokio::test]
async fn test_run_withFolderDryRun_shouldTranslateEachBookOnce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::build_sample_epub(&temp_dir.path().join("first.epub"))?;
    common::build_sample_epub(&temp_dir.path().join("series/second.epub"))?;

    let controller = Controller::with_config(Config::default())?;
    controller.run(temp_dir.path().to_path_buf(), None, false, true).await?;

    let first_output = temp_dir.path().join("first.id.epub");
    let second_output = temp_dir.path().join("series/second.id.epub");
    assert!(first_output.exists());
    assert!(second_output.exists());
    assert!(!temp_dir.path().join("first.id.id.epub").exists());

    // Existing outputs are kept unless forced
    std::fs::write(&first_output, "stale")?;
    controller.run(temp_dir.path().to_path_buf(), None, false, true).await?;
    assert_eq!(std::fs::read_to_string(&first_output)?, "stale");

    controller.run(temp_dir.path().to_path_buf(), None, true, true).await?;
    assert!(EpubPackage::open(&first_output).is_ok());
    assert!(!temp_dir.path().join("first.id.id.epub").exists());
    Ok(())
}

/// Test a single-file dry run with an explicit output path
#[tokio::test]
async fn test_run_withSingleFileAndOutput_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("dragon.epub");
    let output = temp_dir.path().join("translated/book.epub");
    common::build_sample_epub(&input)?;

    let controller = Controller::with_config(Config::default())?;
    controller.run(input, Some(output.clone()), false, true).await?;

    assert!(output.exists());
    Ok(())
}

/// Test that books with the same file name in different folders keep their folders under -o
#[tokio::test]
async fn test_run_withFolderAndOutputDir_shouldKeepSubdirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("library");
    let output_dir = temp_dir.path().join("translated");
    common::build_sample_epub(&input_dir.join("a/book.epub"))?;
    common::build_sample_epub(&input_dir.join("b/book.epub"))?;
    common::build_sample_epub(&input_dir.join("top.epub"))?;

    let controller = Controller::with_config(Config::default())?;
    controller.run(input_dir.clone(), Some(output_dir.clone()), false, true).await?;

    assert!(EpubPackage::open(output_dir.join("a/book.id.epub")).is_ok());
    assert!(EpubPackage::open(output_dir.join("b/book.id.epub")).is_ok());
    assert!(EpubPackage::open(output_dir.join("top.id.epub")).is_ok());
    assert!(!output_dir.join("book.id.epub").exists());
    Ok(())
}
