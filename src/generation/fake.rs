//! Deterministic, local FakeGenerator for testing/dev (no model, no network)

use crate::error::Result;
use crate::generation::Generator;
use async_trait::async_trait;

pub struct FakeGenerator {
    canned: Option<String>,
}

impl FakeGenerator {
    pub fn new(canned: Option<String>) -> Self {
        Self { canned }
    }

    /// Always answer with the given raw text
    pub fn with_response(raw: impl Into<String>) -> Self {
        Self::new(Some(raw.into()))
    }

    // Stable output derived from the prompt so dev runs vary by input
    // but stay reproducible.
    fn synthesize(&self, prompt: &str) -> String {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(prompt.as_bytes());
        let labels = ["No Drift", "Minor Drift", "Major Drift"];
        let label = labels[digest[0] as usize % labels.len()];
        let body = serde_json::json!({
            "label": label,
            "explanation": "Deterministic placeholder analysis (fake provider).",
        });
        format!("Analysis: {}", body)
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match &self.canned {
            Some(raw) => Ok(raw.clone()),
            None => Ok(self.synthesize(prompt)),
        }
    }

    fn model_id(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_generator_is_deterministic() {
        let generator = FakeGenerator::new(None);
        let a = generator.generate("metrics prompt").await.unwrap();
        let b = generator.generate("metrics prompt").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn canned_response_wins() {
        let generator = FakeGenerator::with_response("not json at all");
        let out = generator.generate("anything").await.unwrap();
        assert_eq!(out, "not json at all");
    }
}
