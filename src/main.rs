use anyhow::{Context, Result};
use clap::Parser;
use drift_auditor::auditor::Auditor;
use drift_auditor::config::Config;
use drift_auditor::metrics::{MetricValue, MetricsReport};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Audit model performance metrics with a causal-LM analyst
#[derive(Parser, Debug)]
#[command(name = "drift-auditor", version)]
struct Args {
    /// Metric as NAME=VALUE; repeatable. Numeric values are parsed as numbers.
    #[arg(long = "metric", value_name = "NAME=VALUE")]
    metrics: Vec<String>,

    /// JSON file containing an object of metric name -> value
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
}

fn parse_metric_flag(pair: &str) -> Result<(String, MetricValue)> {
    let (name, value) = pair
        .split_once('=')
        .with_context(|| format!("metric '{}' is not NAME=VALUE", pair))?;
    if name.is_empty() {
        anyhow::bail!("metric '{}' has an empty name", pair);
    }
    let value = match value.parse::<f64>() {
        Ok(n) => MetricValue::Number(n),
        Err(_) => MetricValue::Text(value.to_string()),
    };
    Ok((name.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    drift_auditor::load_env();
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("AUDITOR_LOG")
                .unwrap_or_else(|_| EnvFilter::new(&config.runtime.log_level)),
        )
        .init();

    let args = Args::parse();

    let mut report = MetricsReport::new();
    if let Some(path) = &args.input {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        report = MetricsReport::from_json_object(&value)?;
    }
    for pair in &args.metrics {
        let (name, value) = parse_metric_flag(pair)?;
        report.insert(name, value);
    }
    if report.is_empty() {
        anyhow::bail!("no metrics provided; use --metric NAME=VALUE or --input PATH");
    }

    info!(metrics = report.len(), "starting audit");
    let auditor = Auditor::new(config);
    let analysis = auditor.analyze(&report).await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_flag_parses_numbers_and_text() {
        let (name, value) = parse_metric_flag("accuracy=0.72").unwrap();
        assert_eq!(name, "accuracy");
        assert_eq!(value, MetricValue::Number(0.72));

        let (_, value) = parse_metric_flag("status=degraded").unwrap();
        assert_eq!(value, MetricValue::Text("degraded".to_string()));
    }

    #[test]
    fn metric_flag_rejects_malformed_input() {
        assert!(parse_metric_flag("no-equals-sign").is_err());
        assert!(parse_metric_flag("=0.5").is_err());
    }
}
