//! Text rendering for audit findings and user-facing error messages.

use docauditor_core::{AuditReport, AuditWorkflowState};
use docauditor_findings::ConflictFinding;
use docauditor_shared::AuditError;

/// Render the outcome of an audit run: summary line, one block per
/// confirmed contradiction, and a raw-text fallback for findings the
/// parser could not decode.
pub(crate) fn render_audit(state: &AuditWorkflowState, report: &AuditReport) {
    println!();

    if state.findings.is_empty() && report.degraded.is_empty() {
        println!("  System healthy — no documentation conflicts detected.");
        println!();
        return;
    }

    if !state.findings.is_empty() {
        println!(
            "  Found {} inconsistenc{} between docs and changelogs.",
            state.findings.len(),
            if state.findings.len() == 1 { "y" } else { "ies" }
        );
        println!();

        for finding in &state.findings {
            render_finding(finding);
        }
    }

    for degraded in &report.degraded {
        println!("  Raw finding (could not be parsed):");
        for line in degraded.raw.lines() {
            println!("    {line}");
        }
        println!();
    }
}

/// One contradiction block: severity badge, analysis, quotes, fix.
fn render_finding(finding: &ConflictFinding) {
    println!("  ── Outdated documentation detected ── [{} severity]", finding.severity);

    if let Some(reason) = &finding.reason {
        println!("  Analysis: {reason}");
    }
    if let Some(old_quote) = &finding.old_quote {
        println!("  Docs say:      {old_quote}");
    }
    if let Some(new_quote) = &finding.new_quote {
        println!("  Changelog says: {new_quote}");
    }
    if let Some(fix) = &finding.fix {
        println!("  Suggested fix: {fix}");
    }
    println!();
}

/// Map an error kind to the message shown to the user.
pub(crate) fn user_message(e: &AuditError) -> String {
    match e {
        AuditError::Network(_) => {
            "Unable to connect to the server. Please ensure the backend is running.".to_string()
        }
        AuditError::Server { status } => format!("The server returned HTTP {status}."),
        AuditError::InvalidResponse { .. } => {
            "The server sent an unexpectedly formatted response. Please try again.".to_string()
        }
        other => other.to_string(),
    }
}
