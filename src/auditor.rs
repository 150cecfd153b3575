//! Audit entry point: prompt rendering, generation, interpretation.

use crate::config::Config;
use crate::error::Result;
use crate::generation::{self, Generator};
use crate::interpret::interpret_generation;
use crate::metrics::MetricsReport;
use crate::prompt::render_audit_prompt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error};

pub struct Auditor {
    config: Config,
    // Lazy generator handle; OnceCell keeps concurrent first calls from
    // loading the model twice.
    generator: OnceCell<Arc<dyn Generator>>,
}

impl Auditor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            generator: OnceCell::new(),
        }
    }

    /// Construct with an already-initialized generator (tests, embedding callers)
    pub fn with_generator(config: Config, generator: Arc<dyn Generator>) -> Self {
        Self {
            config,
            generator: OnceCell::new_with(Some(generator)),
        }
    }

    async fn generator(&self) -> Result<&Arc<dyn Generator>> {
        self.generator
            .get_or_try_init(|| async {
                generation::create_generator(&self.config)
                    .await
                    .inspect_err(|e| error!("Error loading model: {}", e))
            })
            .await
    }

    /// Analyze a metrics report. Model-loading failures propagate; malformed
    /// generation output never does (it becomes a fallback result).
    pub async fn analyze(&self, metrics: &MetricsReport) -> Result<serde_json::Value> {
        let generator = self.generator().await?;

        let prompt = render_audit_prompt(metrics);
        debug!(
            model = generator.model_id(),
            prompt_chars = prompt.len(),
            "running audit generation"
        );

        let raw = generator.generate(&prompt).await?;
        Ok(interpret_generation(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::FakeGenerator;

    fn fake_auditor(raw: &str) -> Auditor {
        let mut config = Config::default();
        config.model.provider = "fake".to_string();
        Auditor::with_generator(config, Arc::new(FakeGenerator::with_response(raw)))
    }

    fn sample_report() -> MetricsReport {
        let mut report = MetricsReport::new();
        report.insert("accuracy", 0.72);
        report.insert("latency_ms", 340.0);
        report
    }

    #[tokio::test]
    async fn analyze_passes_parsed_fields_through() {
        let auditor =
            fake_auditor(r#"Analysis: {"label": "No Drift", "explanation": "Stable"}"#);
        let result = auditor.analyze(&sample_report()).await.unwrap();
        assert_eq!(result["label"], "No Drift");
        assert_eq!(result["explanation"], "Stable");
    }

    #[tokio::test]
    async fn analyze_recovers_from_unparseable_output() {
        let auditor = fake_auditor("{definitely not json}");
        let result = auditor.analyze(&sample_report()).await.unwrap();
        assert_eq!(result["label"], "Parsing Error");
    }

    #[tokio::test]
    async fn analyze_recovers_when_no_json_present() {
        let auditor = fake_auditor("  The metrics look healthy overall.  ");
        let result = auditor.analyze(&sample_report()).await.unwrap();
        assert_eq!(result["label"], "Analysis Generated");
        assert_eq!(result["explanation"], "The metrics look healthy overall.");
    }

    #[tokio::test]
    async fn lazy_init_uses_configured_provider() {
        let mut config = Config::default();
        config.model.provider = "fake".to_string();
        let auditor = Auditor::new(config);
        // First analyze triggers generator creation through the factory
        let result = auditor.analyze(&sample_report()).await.unwrap();
        assert!(result.get("label").is_some());
    }
}
