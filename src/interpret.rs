//! Response interpreter: turns raw generated text into a structured result.
//!
//! The extraction is a bracket-scanning heuristic (first `{` to last `}`).
//! It is deliberately not strengthened: stray braces around the intended
//! JSON produce a malformed span and land in the parsing-error branch.

use serde_json::{Value, json};

/// Label used when a brace span exists but does not parse as JSON
pub const PARSING_ERROR_LABEL: &str = "Parsing Error";
/// Label used when no JSON object is found in the output
pub const FALLBACK_LABEL: &str = "Analysis Generated";

/// Interpret raw generated text.
///
/// - A non-empty `{...}` span that parses as JSON is returned as-is, with
///   no schema validation (an empty object stays an empty object; callers
///   must tolerate missing keys).
/// - A span that fails to parse yields a `"Parsing Error"` result carrying
///   the original, untrimmed text.
/// - No span at all yields an `"Analysis Generated"` result carrying the
///   trimmed text.
///
/// Pure function of its argument.
pub fn interpret_generation(raw: &str) -> Value {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return json!({
                "label": FALLBACK_LABEL,
                "explanation": raw.trim(),
            });
        }
    };

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(parsed) => parsed,
        Err(_) => json!({
            "label": PARSING_ERROR_LABEL,
            "explanation": format!("Could not parse model output as JSON. Raw output: {raw}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_object_passes_through() {
        let raw = r#"Analysis: {"label": "No Drift", "explanation": "Stable"}"#;
        let result = interpret_generation(raw);
        assert_eq!(result["label"], "No Drift");
        assert_eq!(result["explanation"], "Stable");
    }

    #[test]
    fn no_braces_falls_back_to_trimmed_text() {
        let result = interpret_generation("  Looks fine.  ");
        assert_eq!(result["label"], FALLBACK_LABEL);
        assert_eq!(result["explanation"], "Looks fine.");
    }

    #[test]
    fn malformed_span_reports_parsing_error_with_original_text() {
        let raw = "{not json}";
        let result = interpret_generation(raw);
        assert_eq!(result["label"], PARSING_ERROR_LABEL);
        let explanation = result["explanation"].as_str().unwrap();
        assert!(explanation.contains(raw));
    }

    #[test]
    fn empty_object_returned_unchanged() {
        let result = interpret_generation("{}");
        assert_eq!(result, json!({}));
        assert!(result.get("label").is_none());
    }

    #[test]
    fn inverted_braces_fall_back() {
        // '}' before '{' forms no span at all
        let result = interpret_generation("} oops {");
        assert_eq!(result["label"], FALLBACK_LABEL);
        assert_eq!(result["explanation"], "} oops {");
    }

    #[test]
    fn stray_brace_before_json_hits_parse_error_branch() {
        // Known fragility: the span runs from the first '{' to the last '}'
        let raw = r#"notes {draft} then {"label": "No Drift", "explanation": "ok"}"#;
        let result = interpret_generation(raw);
        assert_eq!(result["label"], PARSING_ERROR_LABEL);
    }

    #[test]
    fn interpreter_is_idempotent() {
        let raw = r#"{"label": "Minor Drift", "explanation": "slow creep"}"#;
        assert_eq!(interpret_generation(raw), interpret_generation(raw));
    }
}
