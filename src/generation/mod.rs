//! Generation providers: the opaque text-generation function behind the auditor.

pub mod fake;
pub mod http;
pub mod local;

pub use fake::FakeGenerator;
pub use http::HttpGenerator;
pub use local::CandleGenerator;

use crate::config::Config;
use crate::error::{AuditorError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn model_id(&self) -> &str;
}

/// Factory function to create a generator based on configuration.
///
/// Provider selection order:
/// 1) Respect model.provider if set to an explicit provider
/// 2) "auto": use the http provider when an endpoint is configured
/// 3) Else load the model locally
pub async fn create_generator(config: &Config) -> Result<Arc<dyn Generator>> {
    let provider = config.model.provider.as_str();
    let use_http = match provider {
        "http" => true,
        "local" => false,
        "fake" => {
            info!("Using FakeGenerator (deterministic)");
            return Ok(Arc::new(FakeGenerator::new(None)));
        }
        "auto" | "" => config.model.endpoint.is_some(),
        other => {
            return Err(AuditorError::Config {
                message: format!("unknown provider '{}'", other),
            });
        }
    };

    if use_http {
        info!("Using HTTP generation (model={})", config.model.model_id);
        return Ok(Arc::new(HttpGenerator::new(config)?));
    }

    info!("Loading local model {}", config.model.model_id);
    let cfg = config.clone();
    let generator = tokio::task::spawn_blocking(move || CandleGenerator::load(&cfg))
        .await
        .map_err(|e| AuditorError::Internal {
            message: format!("model load task failed: {}", e),
        })??;
    Ok(Arc::new(generator))
}
