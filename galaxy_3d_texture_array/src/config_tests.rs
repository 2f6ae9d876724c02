//! Unit tests for config.rs

use crate::config::{TextureArrayConfig, TextureQuality};
use crate::error::Error;

// ============================================================================
// DEFAULTS
// ============================================================================

#[test]
fn test_default_config() {
    let config = TextureArrayConfig::default();
    assert_eq!(config.mips_to_skip, [2, 1, 0]);
    assert_eq!(config.default_quality, TextureQuality::High);
    assert!(config.texture_budget.is_none());
}

#[test]
fn test_mips_to_skip_per_quality() {
    let config = TextureArrayConfig::default();
    assert_eq!(config.mips_to_skip(TextureQuality::Low), 2);
    assert_eq!(config.mips_to_skip(TextureQuality::Medium), 1);
    assert_eq!(config.mips_to_skip(TextureQuality::High), 0);
}

// ============================================================================
// JSON
// ============================================================================

#[test]
fn test_from_json_partial_keeps_defaults() {
    let config = TextureArrayConfig::from_json(r#"{ "default_quality": "low" }"#).unwrap();
    assert_eq!(config.default_quality, TextureQuality::Low);
    assert_eq!(config.mips_to_skip, [2, 1, 0]);
}

#[test]
fn test_from_json_full() {
    let config = TextureArrayConfig::from_json(
        r#"{ "mips_to_skip": [3, 2, 1], "default_quality": "medium", "texture_budget": 1048576 }"#,
    )
    .unwrap();
    assert_eq!(config.mips_to_skip, [3, 2, 1]);
    assert_eq!(config.mips_to_skip(TextureQuality::Medium), 2);
    assert_eq!(config.texture_budget, Some(1048576));
}

#[test]
fn test_from_json_invalid() {
    let result = TextureArrayConfig::from_json("{ not json");
    assert!(matches!(result, Err(Error::BackendError(_))));
}
