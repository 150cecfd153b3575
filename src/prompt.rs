//! Static prompt construction for the auditor model.

use crate::metrics::MetricsReport;

/// Render the audit prompt for a metrics report. Pure string formatting;
/// metrics appear one per line in report order.
pub fn render_audit_prompt(metrics: &MetricsReport) -> String {
    let metrics_block = metrics
        .iter()
        .map(|(name, value)| format!("- {}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert AI model auditor. precise and critical.
Analyze the following model performance metrics and determine if there is a drift or issue.

Metrics:
{metrics_block}

Provide your analysis in the following JSON format:
{{
    "label": "Status Label (e.g., No Drift, Major Drift, Critical Failure)",
    "explanation": "Detailed explanation of why you assigned this label."
}}

Analysis:
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_metrics_in_report_order() {
        let mut report = MetricsReport::new();
        report.insert("latency_ms", 340.0);
        report.insert("accuracy", 0.72);
        let prompt = render_audit_prompt(&report);
        let latency_pos = prompt.find("- latency_ms: 340").unwrap();
        let accuracy_pos = prompt.find("- accuracy: 0.72").unwrap();
        assert!(latency_pos < accuracy_pos);
    }

    #[test]
    fn prompt_requests_json_shape() {
        let report = MetricsReport::new();
        let prompt = render_audit_prompt(&report);
        assert!(prompt.contains("\"label\""));
        assert!(prompt.contains("\"explanation\""));
        assert!(prompt.trim_end().ends_with("Analysis:"));
    }
}
