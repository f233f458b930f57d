/*!
 * Tests for application configuration
 */

use anyhow::Result;
use epub_translator::app_config::{Config, LogLevel, TranslationProvider};
use crate::common;

/// Test the default configuration values
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "id");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.common.batch_size, 8);
    assert!(config.glossary.use_default_terms);
    assert!(config.epub.update_metadata);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test that a partial JSON file is filled with defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "target_language": "fr",
            "glossary": { "terms": ["Aragorn"], "use_default_terms": false },
            "log_level": "debug"
        }"#,
    )?;

    let config: Config = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.glossary.terms, vec!["Aragorn"]);
    assert!(!config.glossary.use_default_terms);
    assert!(config.glossary.files.is_empty());
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.translation.common.batch_size, 8);
    Ok(())
}

/// Test that the configuration survives a JSON round trip
#[test]
fn test_serialize_shouldRoundTripThroughJson() -> Result<()> {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    config.translation.common.batch_size = 16;

    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;

    assert_eq!(parsed.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(parsed.translation.common.batch_size, 16);
    assert!(json.contains("\"anthropic\""));
    Ok(())
}

/// Test that invalid language codes are rejected
#[test]
fn test_validate_withInvalidLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());
}

/// Test that a zero batch size is rejected
#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = Config::default();
    config.translation.common.batch_size = 0;
    assert!(config.validate().is_err());
}

/// Test that Anthropic needs an API key
#[test]
fn test_validate_anthropicWithoutApiKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    config.translation.provider_config_mut(TranslationProvider::Anthropic).api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

/// Test provider getters and their fallbacks
#[test]
fn test_providerGetters_shouldFallBackToDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();

    assert_eq!(config.translation.get_model(), "llama3.2");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_timeout_secs(), 120);

    config.translation.provider_config_mut(TranslationProvider::Ollama).model = "qwen2.5".to_string();
    assert_eq!(config.translation.get_model(), "qwen2.5");
    assert_eq!(config.translation.available_providers.len(), 1);
}

/// Test provider name parsing
#[test]
fn test_translationProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!("Anthropic".parse::<TranslationProvider>().ok(), Some(TranslationProvider::Anthropic));
    assert_eq!("ollama".parse::<TranslationProvider>().ok(), Some(TranslationProvider::Ollama));
    assert!("openai".parse::<TranslationProvider>().is_err());
}

/// Test system prompt placeholder rendering
#[test]
fn test_renderSystemPrompt_shouldFillLanguages() {
    let config = Config::default();
    let prompt = config.translation.render_system_prompt("English", "Indonesian");
    assert!(prompt.contains("from English to Indonesian"));
}
