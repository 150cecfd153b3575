//! Local causal-LM generation with candle (phi3 architecture).
//!
//! Weights and tokenizer come from the hf-hub cache. Sampling uses the
//! fixed generation constants from the config.

use crate::config::Config;
use crate::error::{AuditorError, Result};
use crate::generation::Generator;
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::phi3::{Config as Phi3Config, Model as Phi3};
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use std::sync::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

pub struct CandleGenerator {
    // KV cache lives inside the model, so forward needs &mut
    model: Mutex<Phi3>,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    eos_tokens: Vec<u32>,
    max_new_tokens: usize,
    temperature: f64,
    do_sample: bool,
    use_cache: bool,
    seed: u64,
}

impl CandleGenerator {
    pub fn load(config: &Config) -> Result<Self> {
        let device = Self::select_device();
        info!("Using device: {:?}", device);

        let model_id = config.model.model_id.clone();
        let api = Api::new().map_err(|e| AuditorError::Model {
            message: format!("hf-hub init failed: {}", e),
        })?;
        let repo = api.repo(Repo::with_revision(
            model_id.clone(),
            RepoType::Model,
            config.model.revision.clone(),
        ));

        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| AuditorError::Model {
            message: format!("Failed to fetch tokenizer.json: {}", e),
        })?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| AuditorError::Model {
            message: format!("Failed to load tokenizer: {}", e),
        })?;

        let config_path = repo.get("config.json").map_err(|e| AuditorError::Model {
            message: format!("Failed to fetch config.json: {}", e),
        })?;
        let config_str =
            std::fs::read_to_string(&config_path).map_err(|e| AuditorError::Model {
                message: format!("Failed to read config.json: {}", e),
            })?;
        let model_config: Phi3Config = serde_json::from_str(&config_str)?;

        let weight_files = Self::weight_files(&repo)?;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&weight_files, DType::F32, &device)?
        };
        let model = Phi3::new(&model_config, vb)?;
        info!("Model loaded successfully.");

        let eos_tokens = ["<|end|>", "<|endoftext|>", "</s>"]
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            model_id,
            eos_tokens,
            max_new_tokens: config.generation.max_new_tokens,
            temperature: config.generation.temperature,
            do_sample: config.generation.do_sample,
            use_cache: config.generation.use_cache,
            seed: config.generation.seed,
        })
    }

    // Prefer Metal on macOS if available and AUDITOR_USE_METAL != "false"
    fn select_device() -> Device {
        #[cfg(target_os = "macos")]
        {
            let use_metal = std::env::var("AUDITOR_USE_METAL")
                .ok()
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true);
            if use_metal {
                match Device::new_metal(0) {
                    Ok(d) => return d,
                    Err(_e) => return Device::Cpu,
                }
            }
        }
        Device::Cpu
    }

    // Single model.safetensors, or sharded weights via the index file
    fn weight_files(repo: &ApiRepo) -> Result<Vec<PathBuf>> {
        if let Ok(single) = repo.get("model.safetensors") {
            return Ok(vec![single]);
        }
        let index_path =
            repo.get("model.safetensors.index.json")
                .map_err(|e| AuditorError::Model {
                    message: format!("Failed to fetch safetensors index: {}", e),
                })?;
        let index_str =
            std::fs::read_to_string(&index_path).map_err(|e| AuditorError::Model {
                message: format!("Failed to read safetensors index: {}", e),
            })?;
        let index: serde_json::Value = serde_json::from_str(&index_str)?;

        let mut names: Vec<String> = index["weight_map"]
            .as_object()
            .map(|m| {
                m.values()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names.dedup();
        if names.is_empty() {
            return Err(AuditorError::Model {
                message: "safetensors index lists no weight files".to_string(),
            });
        }

        names
            .into_iter()
            .map(|name| {
                repo.get(&name).map_err(|e| AuditorError::Model {
                    message: format!("Failed to fetch {}: {}", name, e),
                })
            })
            .collect()
    }

    fn run(&self, prompt: &str) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| AuditorError::Generation {
                message: format!("Tokenization failed: {}", e),
            })?;
        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        if tokens.is_empty() {
            return Err(AuditorError::Generation {
                message: "prompt tokenized to zero tokens".to_string(),
            });
        }
        debug!(prompt_tokens = tokens.len(), "starting generation");

        let temperature = if self.do_sample {
            Some(self.temperature)
        } else {
            None
        };
        let mut logits_processor = LogitsProcessor::new(self.seed, temperature, None);

        let mut model = self.model.lock().map_err(|_| AuditorError::Internal {
            message: "model mutex poisoned".to_string(),
        })?;
        model.clear_kv_cache();

        let mut generated: Vec<u32> = Vec::new();
        for index in 0..self.max_new_tokens {
            let (context, offset) = if self.use_cache && index > 0 {
                (&tokens[tokens.len() - 1..], tokens.len() - 1)
            } else {
                // No cache reuse: re-feed the full context every step
                if !self.use_cache {
                    model.clear_kv_cache();
                }
                (&tokens[..], 0usize)
            };

            let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
            let logits = model.forward(&input, offset)?;
            let logits = logits.i((.., 0, ..))?.squeeze(0)?.to_dtype(DType::F32)?;

            let next = logits_processor.sample(&logits)?;
            tokens.push(next);
            if self.eos_tokens.contains(&next) {
                break;
            }
            generated.push(next);
        }

        // Decode only the continuation (the prompt is not echoed back)
        let text = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| AuditorError::Generation {
                message: format!("Decoding failed: {}", e),
            })?;
        debug!(new_tokens = generated.len(), "generation finished");
        Ok(text)
    }
}

#[async_trait]
impl Generator for CandleGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.run(prompt)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
