use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "minutes.yaml";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinutesConfig {
    pub provider: ProviderConfig,
    pub generator: GeneratorConfig,
    pub judge: JudgeConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Openai,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Base URL of an OpenAI-compatible API (no trailing `/chat/completions`).
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: Option<u64>,
    /// Canned responses used when `kind: fake`.
    pub fake: FakeResponses,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Openai,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: None,
            fake: FakeResponses::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeResponses {
    pub summary: Option<String>,
    pub evaluation: Option<String>,
}

/// Drafting model: fast, slightly creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// Judging model: stronger, near-deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Tell the judge to treat transcript and summary as data only.
    pub hijack_defense: bool,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.1,
            max_tokens: 1024,
            hijack_defense: true,
        }
    }
}

impl MinutesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_stage(
            "generator",
            &self.generator.model,
            self.generator.temperature,
            self.generator.max_tokens,
        )?;
        check_stage(
            "judge",
            &self.judge.model,
            self.judge.temperature,
            self.judge.max_tokens,
        )?;
        if self.provider.kind == ProviderKind::Openai {
            if self.provider.base_url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "provider.base_url must not be empty".into(),
                ));
            }
            if self.provider.api_key_env.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "provider.api_key_env must not be empty".into(),
                ));
            }
        }
        if self.provider.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("provider.timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

fn check_stage(
    stage: &str,
    model: &str,
    temperature: f32,
    max_tokens: u32,
) -> Result<(), ConfigError> {
    if model.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{}.model must not be empty", stage)));
    }
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::Invalid(format!(
            "{}.temperature must be within [0, 2], got {}",
            stage, temperature
        )));
    }
    if max_tokens == 0 {
        return Err(ConfigError::Invalid(format!("{}.max_tokens must be > 0", stage)));
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<MinutesConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: MinutesConfig = serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    cfg.validate()?;
    tracing::debug!(path = %path.display(), provider = ?cfg.provider.kind, "loaded config");
    Ok(cfg)
}

/// Load `path` if given, else `minutes.yaml` in the working directory if it
/// exists, else defaults. An explicitly given path must exist.
pub fn load_or_default(path: Option<&Path>) -> Result<MinutesConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                load_config(fallback)
            } else {
                Ok(MinutesConfig::default())
            }
        }
    }
}
