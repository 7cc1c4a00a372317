//! Conflict-finding extraction from raw audit output.
//!
//! The audit endpoint returns findings as opaque strings produced by an
//! upstream generative model. A finding *usually* contains one JSON object
//! describing the contradiction, but the model is free to wrap it in prose
//! ("Here is my analysis: {...} Let me know if..."), or to return no JSON
//! at all. [`parse`] recovers a structured [`ConflictFinding`] from that
//! noise and never fails: when no object can be located or decoded it
//! degrades to a record carrying only the raw text.

use serde::Deserialize;
use tracing::debug;

/// Severity assigned when the decoded object carries none.
const DEFAULT_SEVERITY: &str = "Critical";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Normalized result of parsing one raw finding string.
///
/// Invariant: `parse_failed == true` implies `contradiction == false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictFinding {
    /// True only if a conflict object was recovered and its
    /// `contradiction` field is true.
    pub contradiction: bool,
    /// Severity label, `"Critical"` when the object carries none.
    pub severity: String,
    /// Human explanation of the conflict.
    pub reason: Option<String>,
    /// Fragment from the older document.
    pub old_quote: Option<String>,
    /// Fragment from the newer document.
    pub new_quote: Option<String>,
    /// Suggested remediation text.
    pub fix: Option<String>,
    /// No JSON object could be located or decoded; only `raw` is usable.
    pub parse_failed: bool,
    /// The original finding text, kept for fallback display.
    pub raw: String,
}

/// Wire shape of the conflict object embedded in a raw finding.
/// Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ConflictPayload {
    #[serde(default)]
    contradiction: bool,
    severity: Option<String>,
    reason: Option<String>,
    old_quote: Option<String>,
    new_quote: Option<String>,
    fix: Option<String>,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Extract a [`ConflictFinding`] from one raw finding string.
///
/// Scans for the span from the first `{` to the last `}` (the model may
/// emit commentary before and after the object), then decodes that span
/// as a single JSON object. Pure function: no I/O, no hidden state.
pub fn parse(raw: &str) -> ConflictFinding {
    let Some(span) = json_span(raw) else {
        debug!("no JSON object span in finding, degrading to raw text");
        return degraded(raw);
    };

    match serde_json::from_str::<ConflictPayload>(span) {
        Ok(payload) => ConflictFinding {
            contradiction: payload.contradiction,
            severity: payload
                .severity
                .unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
            reason: payload.reason,
            old_quote: payload.old_quote,
            new_quote: payload.new_quote,
            fix: payload.fix,
            parse_failed: false,
            raw: raw.to_string(),
        },
        Err(e) => {
            debug!(error = %e, "finding span is not a decodable conflict object");
            degraded(raw)
        }
    }
}

/// The inclusive substring from the first `{` to the last `}`, or `None`
/// if either brace is missing or they are not in order.
///
/// Deliberately greedy: a finding with several JSON-like regions yields
/// one span covering all of them. That mirrors the deployed extraction
/// behavior and keeps the scan linear-time.
fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(&raw[start..=end])
}

/// Degraded record for findings with no recoverable conflict object.
fn degraded(raw: &str) -> ConflictFinding {
    ConflictFinding {
        contradiction: false,
        severity: DEFAULT_SEVERITY.to_string(),
        reason: None,
        old_quote: None,
        new_quote: None,
        fix: None,
        parse_failed: true,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_object_with_all_fields() {
        let raw = std::fs::read_to_string("../../../fixtures/findings/stripe-contradiction.txt")
            .expect("read fixture");
        let finding = parse(&raw);

        assert!(!finding.parse_failed);
        assert!(finding.contradiction);
        assert_eq!(finding.severity, "Critical");
        assert_eq!(finding.reason.as_deref(), Some("Charges API deprecated"));
        assert_eq!(finding.old_quote.as_deref(), Some("Use charges.create"));
        assert_eq!(finding.new_quote.as_deref(), Some("Use paymentIntents.create"));
        assert_eq!(finding.fix.as_deref(), Some("Migrate to PaymentIntents"));
    }

    #[test]
    fn surrounding_prose_is_tolerated() {
        let raw = r#"noise {"contradiction":true,"severity":"High"} trailing"#;
        let finding = parse(raw);

        assert!(!finding.parse_failed);
        assert!(finding.contradiction);
        assert_eq!(finding.severity, "High");
        assert_eq!(finding.raw, raw);
    }

    #[test]
    fn no_json_degrades() {
        let finding = parse("no json here");
        assert!(finding.parse_failed);
        assert!(!finding.contradiction);
        assert_eq!(finding.raw, "no json here");
    }

    #[test]
    fn brace_order_matters() {
        // `}` before `{` — no valid span
        let finding = parse("} backwards {");
        assert!(finding.parse_failed);
        assert!(!finding.contradiction);
    }

    #[test]
    fn lone_braces_degrade() {
        assert!(parse("only open {").parse_failed);
        assert!(parse("only close }").parse_failed);
        assert!(parse("").parse_failed);
    }

    #[test]
    fn undecodable_span_degrades() {
        let finding = parse("prefix {this is not json} suffix");
        assert!(finding.parse_failed);
        assert!(!finding.contradiction);
    }

    #[test]
    fn missing_contradiction_is_false() {
        let finding = parse(r#"{"severity":"Low","reason":"nothing conflicts"}"#);
        assert!(!finding.parse_failed);
        assert!(!finding.contradiction);
        assert_eq!(finding.severity, "Low");
    }

    #[test]
    fn explicit_false_contradiction() {
        let finding = parse(r#"{"contradiction": false}"#);
        assert!(!finding.parse_failed);
        assert!(!finding.contradiction);
        assert_eq!(finding.severity, "Critical");
    }

    #[test]
    fn missing_severity_defaults_to_critical() {
        let finding = parse(r#"{"contradiction":true,"reason":"r"}"#);
        assert_eq!(finding.severity, "Critical");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"{"contradiction":true,"text_a_snippet":"a","confidence":0.9}"#;
        let finding = parse(raw);
        assert!(!finding.parse_failed);
        assert!(finding.contradiction);
    }

    #[test]
    fn non_bool_contradiction_degrades() {
        // A decodable-looking span with the wrong type fails the object
        // decode and takes the degraded path.
        let finding = parse(r#"{"contradiction":"yes"}"#);
        assert!(finding.parse_failed);
        assert!(!finding.contradiction);
    }

    #[test]
    fn multiple_json_regions_span_greedily() {
        // The span covers both objects; the combined text is not one valid
        // object, so this degrades rather than picking either region.
        let finding = parse(r#"{"contradiction":true} and {"contradiction":false}"#);
        assert!(finding.parse_failed);
    }

    #[test]
    fn nested_objects_decode() {
        let raw = r#"analysis: {"contradiction":true,"fix":"use {placeholders} carefully"}"#;
        let finding = parse(raw);
        assert!(!finding.parse_failed);
        assert_eq!(finding.fix.as_deref(), Some("use {placeholders} carefully"));
    }

    #[test]
    fn parse_is_pure() {
        let raw = std::fs::read_to_string("../../../fixtures/findings/noisy-contradiction.txt")
            .expect("read fixture");
        assert_eq!(parse(&raw), parse(&raw));
    }

    #[test]
    fn degraded_never_reports_contradiction() {
        for raw in ["", "{", "}", "} {", "plain prose", "{broken"] {
            let finding = parse(raw);
            assert!(finding.parse_failed);
            assert!(!finding.contradiction, "degraded finding claimed contradiction: {raw:?}");
        }
    }
}
