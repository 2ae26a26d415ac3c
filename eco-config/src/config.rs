use anyhow::{Context, Result};
use eco_types::ModelConfig;
use std::path::{Path, PathBuf};

const DEFAULT_MODEL_CONFIG_REL_PATH: &str = "default.toml";

pub fn model_config_from_toml_str(raw: &str) -> Result<ModelConfig, toml::de::Error> {
    toml::from_str(raw)
}

pub fn default_model_config() -> ModelConfig {
    model_config_from_toml_str(include_str!("../default.toml"))
        .expect("default model config TOML must deserialize")
}

pub fn default_model_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_MODEL_CONFIG_REL_PATH)
}

pub fn load_default_model_config() -> Result<ModelConfig> {
    load_model_config_from_path(&default_model_config_path())
}

pub fn load_model_config_from_path(path: &Path) -> Result<ModelConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model config from {}", path.display()))?;
    model_config_from_toml_str(&raw)
        .context("model config TOML failed schema deserialization")
        .with_context(|| format!("failed to parse model config from {}", path.display()))
}

/// Loads `path` when given, otherwise the bundled defaults.
pub fn load_model_config(path: Option<&Path>) -> Result<ModelConfig> {
    match path {
        Some(path) => load_model_config_from_path(path),
        None => Ok(default_model_config()),
    }
}
