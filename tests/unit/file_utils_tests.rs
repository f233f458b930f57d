/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::Path;
use epub_translator::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.tmp")));
    Ok(())
}

/// Test that an EPUB input gets the language inserted before the extension
#[test]
fn test_generate_output_path_withEpub_shouldInsertLanguage() {
    let output = FileManager::generate_output_path(Path::new("/books/novel.epub"), "id");
    assert_eq!(output, Path::new("/books/novel.id.epub"));

    let upper = FileManager::generate_output_path(Path::new("/books/NOVEL.EPUB"), "fr");
    assert_eq!(upper, Path::new("/books/NOVEL.fr.epub"));
}

/// Test that other inputs keep their full name
#[test]
fn test_generate_output_path_withOtherExtension_shouldAppend() {
    let output = FileManager::generate_output_path(Path::new("/books/novel.zip"), "id");
    assert_eq!(output, Path::new("/books/novel.zip.id.epub"));
}

/// Test recognition of translation outputs
#[test]
fn test_is_translation_output_shouldMatchLanguageSuffix() {
    assert!(FileManager::is_translation_output("novel.id.epub", "id"));
    assert!(FileManager::is_translation_output("novel.ID.epub", "id"));
    assert!(!FileManager::is_translation_output("novel.epub", "id"));
    assert!(!FileManager::is_translation_output("novel.fr.epub", "id"));
}

/// Test that find_files walks recursively and returns sorted results
#[test]
fn test_find_files_shouldWalkRecursivelyInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.epub", "")?;
    common::create_test_file(temp_dir.path(), "a.EPUB", "")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;
    common::create_test_file(temp_dir.path(), "series/c.epub", "")?;

    let found = FileManager::find_files(temp_dir.path(), "epub")?;
    let names: Vec<String> = found
        .iter()
        .map(|path| path.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.EPUB", "b.epub", "series/c.epub"]);
    Ok(())
}

/// Test that write_to_file creates missing parent directories
#[test]
fn test_write_to_file_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested/dir/conf.json");

    FileManager::write_to_file(&path, "{}")?;

    assert_eq!(FileManager::read_to_string(&path)?, "{}");
    assert!(FileManager::dir_exists(temp_dir.path().join("nested/dir")));
    Ok(())
}
