use serde::{Deserialize, Serialize};

/// Default model identifier; keep in sync with existing callers.
pub const DEFAULT_MODEL_ID: &str = "PhantomAjusshi/phi3-auditor-merged";

/// Main configuration structure loaded from auditor.toml and environment variables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Model selection: which provider serves generation and which weights it uses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// "auto" | "local" | "http" | "fake"
    pub provider: String,
    pub model_id: String,
    pub revision: String,
    /// OpenAI-compatible endpoint for the http provider
    pub endpoint: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: "main".to_string(),
            endpoint: None,
        }
    }
}

/// Generation parameters. The defaults are the fixed constants existing
/// callers depend on; change them only behind explicit config.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub max_new_tokens: usize,
    pub temperature: f64,
    pub do_sample: bool,
    /// When false the full context is re-fed every step (no KV reuse)
    pub use_cache: bool,
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: 0.1,
            do_sample: true,
            use_cache: false,
            seed: 299792458,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_key: Option<String>,
    pub http_timeout_ms: u64,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            http_timeout_ms: 120_000,
            log_level: "drift_auditor=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn load_from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("AUDITOR_API_KEY")
            && !key.trim().is_empty()
        {
            config.api_key = Some(key);
        }

        if let Some(timeout) = std::env::var("AUDITOR_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            && timeout > 0
        {
            config.http_timeout_ms = timeout;
        }

        if let Ok(level) = std::env::var("AUDITOR_LOG")
            && !level.trim().is_empty()
        {
            config.log_level = level;
        }

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    /// Uses AUDITOR_CONFIG environment variable or defaults to "auditor.toml".
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var("AUDITOR_CONFIG").unwrap_or_else(|_| "auditor.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        // Apply env overrides (env-first)
        if let Ok(provider) = std::env::var("AUDITOR_PROVIDER") {
            config.model.provider = provider;
        }
        if let Ok(model_id) = std::env::var("AUDITOR_MODEL_ID") {
            config.model.model_id = model_id;
        }
        if let Ok(endpoint) = std::env::var("AUDITOR_ENDPOINT")
            && !endpoint.trim().is_empty()
        {
            config.model.endpoint = Some(endpoint);
        }
        if let Some(max) = std::env::var("AUDITOR_MAX_NEW_TOKENS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.generation.max_new_tokens = max;
        }
        if let Some(temp) = std::env::var("AUDITOR_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
        {
            config.generation.temperature = temp;
        }

        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.model.provider.as_str() {
            "auto" | "local" | "http" | "fake" => {}
            other => anyhow::bail!(
                "unknown provider '{other}' (expected auto, local, http, or fake)"
            ),
        }
        if self.model.model_id.trim().is_empty() {
            anyhow::bail!("model.model_id must not be empty");
        }
        if self.generation.max_new_tokens == 0 {
            anyhow::bail!("generation.max_new_tokens must be > 0");
        }
        if self.generation.do_sample && self.generation.temperature <= 0.0 {
            anyhow::bail!("generation.temperature must be > 0 when do_sample is enabled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let config = Config::default();
        assert_eq!(config.model.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.generation.max_new_tokens, 256);
        assert!((config.generation.temperature - 0.1).abs() < f64::EPSILON);
        assert!(config.generation.do_sample);
        assert!(!config.generation.use_cache);
    }

    #[test]
    fn validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.model.provider = "quantum".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_temperature_when_sampling() {
        let mut config = Config::default();
        config.generation.temperature = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [model]
            provider = "fake"
            model_id = "test/model"
            revision = "main"
            "#,
        )
        .unwrap();
        assert_eq!(config.model.provider, "fake");
        assert_eq!(config.generation.max_new_tokens, 256);
    }
}
