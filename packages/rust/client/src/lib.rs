//! HTTP client for the documentation-audit backend.
//!
//! [`AuditClient`] wraps the four remote operations (ingest, load
//! scenario, run audit, chat) behind a uniform request/response/error
//! contract. Session-scoped requests carry the client's session
//! identifier in the [`SESSION_HEADER`] header; `ingest` is the one
//! session-agnostic operation (global knowledge-base mode).
//!
//! The client performs no retries and enforces no call ordering: invoking
//! `run_audit` before a successful `load_scenario` or `ingest` simply
//! returns whatever findings the backend currently holds.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use docauditor_shared::{AuditError, Result, SessionId};

/// Header carrying the session identifier on session-scoped requests.
pub const SESSION_HEADER: &str = "X-Session-ID";

/// User-Agent string for backend requests.
const USER_AGENT: &str = concat!("DocAuditor/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Success body of `GET /maintenance`. `issues` is optional on the wire.
#[derive(Debug, Deserialize)]
struct MaintenanceResponse {
    #[serde(default)]
    issues: Vec<String>,
}

/// Success body of `POST /chat`. `response` is required; a decodable body
/// without it is an invalid response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

// ---------------------------------------------------------------------------
// AuditClient
// ---------------------------------------------------------------------------

/// Client for the audit backend, bound to one base URL and session.
#[derive(Debug, Clone)]
pub struct AuditClient {
    http: Client,
    base_url: Url,
    session_id: SessionId,
}

impl AuditClient {
    /// Create a client for `base_url` with the given session identifier.
    pub fn new(base_url: Url, session_id: SessionId, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AuditError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            session_id,
        })
    }

    /// The session identifier attached to session-scoped requests.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AuditError::Network(format!("invalid endpoint {path}: {e}")))
    }

    /// Trigger ingestion of the global knowledge base.
    ///
    /// Session-agnostic: no session header is sent.
    #[instrument(skip_all)]
    pub async fn ingest(&self) -> Result<()> {
        let url = self.endpoint("/ingest")?;
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(&response)?;
        debug!("ingest accepted");
        Ok(())
    }

    /// Load the demo scenario with the given id server-side.
    #[instrument(skip_all, fields(scenario_id = %scenario_id))]
    pub async fn load_scenario(&self, scenario_id: &str) -> Result<()> {
        let url = self.endpoint("/load-scenario")?;
        let response = self
            .http
            .post(url)
            .header(SESSION_HEADER, self.session_id.to_string())
            .json(&serde_json::json!({ "scenario_id": scenario_id }))
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(&response)?;
        debug!(scenario_id, "scenario loaded");
        Ok(())
    }

    /// Run the audit and return the raw finding strings.
    ///
    /// An absent `issues` field decodes as an empty list.
    #[instrument(skip_all)]
    pub async fn run_audit(&self) -> Result<Vec<String>> {
        let url = self.endpoint("/maintenance")?;
        let response = self
            .http
            .get(url)
            .header(SESSION_HEADER, self.session_id.to_string())
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(&response)?;

        let body: MaintenanceResponse = response
            .json()
            .await
            .map_err(|e| AuditError::invalid_response(format!("maintenance body: {e}")))?;

        debug!(issues = body.issues.len(), "audit complete");
        Ok(body.issues)
    }

    /// Ask a free-form question against the loaded knowledge base.
    #[instrument(skip_all)]
    pub async fn chat(&self, message: &str) -> Result<String> {
        let url = self.endpoint("/chat")?;
        let response = self
            .http
            .post(url)
            .header(SESSION_HEADER, self.session_id.to_string())
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(&response)?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AuditError::invalid_response(format!("chat body: {e}")))?;

        body.response
            .ok_or_else(|| AuditError::invalid_response("chat body has no 'response' field"))
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map a reqwest transport failure to the client error taxonomy.
fn map_transport_error(e: reqwest::Error) -> AuditError {
    AuditError::Network(e.to_string())
}

/// Reject non-success HTTP statuses.
fn check_status(response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(AuditError::Server {
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> AuditClient {
        let base = Url::parse(&server.uri()).expect("server uri");
        AuditClient::new(base, SessionId::new(), 5).expect("build client")
    }

    #[tokio::test]
    async fn ingest_posts_without_session_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ingest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "Ingested 12 chunks."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.ingest().await.expect("ingest succeeds");

        // The mock did not require the session header; verify none was sent.
        let requests = server.received_requests().await.expect("requests");
        assert!(requests[0].headers.get(SESSION_HEADER).is_none());
    }

    #[tokio::test]
    async fn load_scenario_sends_body_and_session_header() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        let session = client.session_id().to_string();

        Mock::given(method("POST"))
            .and(path("/load-scenario"))
            .and(header(SESSION_HEADER, session.as_str()))
            .and(body_json(serde_json::json!({ "scenario_id": "stripe" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "loaded"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client.load_scenario("stripe").await.expect("load succeeds");
    }

    #[tokio::test]
    async fn run_audit_returns_issues() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/maintenance"))
            .and(header(SESSION_HEADER, client.session_id().to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "issues": ["first finding", "second finding"]
            })))
            .mount(&server)
            .await;

        let issues = client.run_audit().await.expect("audit succeeds");
        assert_eq!(issues, vec!["first finding", "second finding"]);
    }

    #[tokio::test]
    async fn run_audit_defaults_missing_issues_to_empty() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/maintenance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let issues = client.run_audit().await.expect("audit succeeds");
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn chat_returns_response_text() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(serde_json::json!({ "message": "How do I authenticate?" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Use the v2 token endpoint."
            })))
            .mount(&server)
            .await;

        let answer = client.chat("How do I authenticate?").await.expect("chat succeeds");
        assert_eq!(answer, "Use the v2 token endpoint.");
    }

    #[tokio::test]
    async fn chat_without_response_field_is_invalid() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "answer": "wrong field"
            })))
            .mount(&server)
            .await;

        let err = client.chat("hi").await.expect_err("missing field rejected");
        assert!(matches!(err, AuditError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_server_error() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/maintenance"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client.run_audit().await.expect_err("500 rejected");
        assert!(matches!(err, AuditError::Server { status: 500 }));
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_network_error() {
        // Port 1 is reserved and should refuse connections.
        let base = Url::parse("http://127.0.0.1:1").unwrap();
        let client = AuditClient::new(base, SessionId::new(), 1).expect("build client");

        let err = client.ingest().await.expect_err("connection refused");
        assert!(matches!(err, AuditError::Network(_)));
    }
}
