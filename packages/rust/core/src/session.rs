//! The audit session: workflow state plus the operations that mutate it.
//!
//! Each concern (ingest, scenario load, audit, chat) has its own busy
//! flag with lifecycle `idle -> in flight -> idle`, entered on operation
//! start and exited on completion, success or failure. A call whose flag
//! is already in flight is rejected with [`AuditError::Busy`] instead of
//! relying on the presentation layer to prevent re-entry.
//!
//! Failure paths never touch unrelated state: a failed scenario load
//! keeps the previously active scenario, a failed audit leaves `findings`
//! empty, a failed chat leaves `last_answer` empty.

use tracing::{debug, info, instrument, warn};

use docauditor_client::AuditClient;
use docauditor_findings::ConflictFinding;
use docauditor_shared::{AuditError, Result, find_scenario};

// ---------------------------------------------------------------------------
// Workflow state
// ---------------------------------------------------------------------------

/// One in-flight flag per orchestrated concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlags {
    /// Global knowledge-base ingestion in flight.
    pub ingesting: bool,
    /// Scenario load in flight.
    pub loading_scenario: bool,
    /// Audit run in flight.
    pub auditing: bool,
    /// Chat request in flight.
    pub chatting: bool,
}

/// In-memory state of the audit workflow, mutated only by [`AuditSession`].
#[derive(Debug, Clone, Default)]
pub struct AuditWorkflowState {
    /// Id of the scenario most recently loaded with success, if any.
    pub active_scenario: Option<String>,
    /// Confirmed contradictions from the most recent audit run.
    pub findings: Vec<ConflictFinding>,
    /// Answer text from the most recent chat call.
    pub last_answer: String,
    /// Whether a global ingest has completed this session.
    pub docs_ingested: bool,
    /// Per-concern in-flight flags.
    pub busy: BusyFlags,
}

impl AuditWorkflowState {
    /// Fresh state for a new session.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Outcome of one audit run, alongside the findings stored in the state.
///
/// Degraded records (no JSON object recovered) are excluded from
/// `AuditWorkflowState::findings` but handed back here so the
/// presentation layer can show their raw text as a fallback.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Number of raw findings the backend returned.
    pub total_raw: usize,
    /// Findings that could not be parsed into a conflict object.
    pub degraded: Vec<ConflictFinding>,
}

// ---------------------------------------------------------------------------
// AuditSession
// ---------------------------------------------------------------------------

/// Orchestrator owning the workflow state and sequencing client calls.
pub struct AuditSession {
    client: AuditClient,
    state: AuditWorkflowState,
}

impl AuditSession {
    /// Create a session with fresh workflow state.
    pub fn new(client: AuditClient) -> Self {
        Self::with_state(client, AuditWorkflowState::new())
    }

    /// Create a session over an existing state (isolated instances for tests).
    pub fn with_state(client: AuditClient, state: AuditWorkflowState) -> Self {
        Self { client, state }
    }

    /// Read access to the workflow state.
    pub fn state(&self) -> &AuditWorkflowState {
        &self.state
    }

    /// Ingest the global knowledge base (session-agnostic mode).
    #[instrument(skip_all)]
    pub async fn ingest(&mut self) -> Result<()> {
        if self.state.busy.ingesting {
            return Err(AuditError::Busy { operation: "ingest" });
        }
        self.state.busy.ingesting = true;

        let result = self.client.ingest().await;
        self.state.busy.ingesting = false;

        result?;
        self.state.docs_ingested = true;
        info!("knowledge base ingested");
        Ok(())
    }

    /// Select a scenario from the catalog and load it server-side.
    ///
    /// Clears previous findings and the last answer before the call. On
    /// failure the previously active scenario (if any) stays active.
    #[instrument(skip_all, fields(scenario_id = %scenario_id))]
    pub async fn select_and_load(&mut self, scenario_id: &str) -> Result<()> {
        if find_scenario(scenario_id).is_none() {
            return Err(AuditError::validation(format!(
                "unknown scenario '{scenario_id}' (see `docauditor scenarios`)"
            )));
        }

        if self.state.busy.loading_scenario {
            return Err(AuditError::Busy {
                operation: "load scenario",
            });
        }
        self.state.busy.loading_scenario = true;
        self.state.findings.clear();
        self.state.last_answer.clear();

        let result = self.client.load_scenario(scenario_id).await;
        self.state.busy.loading_scenario = false;

        match result {
            Ok(()) => {
                self.state.active_scenario = Some(scenario_id.to_string());
                info!(scenario_id, "scenario active");
                Ok(())
            }
            Err(e) => {
                warn!(scenario_id, error = %e, "scenario load failed");
                Err(e)
            }
        }
    }

    /// Run the audit and normalize its findings.
    ///
    /// Retains only confirmed contradictions in the state; degraded
    /// records come back in the [`AuditReport`]. On failure `findings`
    /// stays empty.
    #[instrument(skip_all)]
    pub async fn run_audit(&mut self) -> Result<AuditReport> {
        if self.state.busy.auditing {
            return Err(AuditError::Busy { operation: "audit" });
        }
        self.state.busy.auditing = true;
        self.state.findings.clear();

        let result = self.client.run_audit().await;
        self.state.busy.auditing = false;

        let raw_findings = result?;
        let total_raw = raw_findings.len();

        let mut degraded = Vec::new();
        for raw in &raw_findings {
            let finding = docauditor_findings::parse(raw);
            if finding.contradiction {
                self.state.findings.push(finding);
            } else if finding.parse_failed {
                degraded.push(finding);
            } else {
                // Decoded cleanly but no contradiction: suppressed.
                debug!("finding without contradiction suppressed");
            }
        }

        info!(
            total_raw,
            contradictions = self.state.findings.len(),
            degraded = degraded.len(),
            "audit normalized"
        );

        Ok(AuditReport {
            total_raw,
            degraded,
        })
    }

    /// Ask a free-form question.
    ///
    /// Empty or whitespace-only input is a no-op returning `false` with
    /// no network call and `last_answer` untouched. On success the answer
    /// is stored and `true` returned; on failure `last_answer` stays empty.
    #[instrument(skip_all)]
    pub async fn ask(&mut self, message: &str) -> Result<bool> {
        if message.trim().is_empty() {
            debug!("empty question, skipping chat call");
            return Ok(false);
        }

        if self.state.busy.chatting {
            return Err(AuditError::Busy { operation: "chat" });
        }
        self.state.busy.chatting = true;
        self.state.last_answer.clear();

        let result = self.client.chat(message).await;
        self.state.busy.chatting = false;

        match result {
            Ok(answer) => {
                self.state.last_answer = answer;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "chat failed");
                Err(e)
            }
        }
    }
}
