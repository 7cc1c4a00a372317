//! Workflow orchestration for the documentation-audit client.
//!
//! [`AuditSession`] owns the in-memory workflow state and sequences the
//! remote operations: scenario load → audit → chat. Raw findings from the
//! audit endpoint are normalized through `docauditor-findings` and only
//! confirmed contradictions are retained for rendering.

pub mod session;

pub use session::{AuditReport, AuditSession, AuditWorkflowState, BusyFlags};
