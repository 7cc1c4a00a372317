//! Core domain types for the DocAuditor client.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// A UUID v4 wrapper for the client session identifier.
///
/// Generated once per installation, persisted indefinitely, and attached
/// to every session-scoped request so the backend can keep per-client
/// audit/chat state apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Scenario catalog
// ---------------------------------------------------------------------------

/// A demo dataset of conflicting documentation/changelog content,
/// loadable server-side by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    /// Stable identifier sent to the backend.
    pub id: &'static str,
    /// Human-readable name for display.
    pub name: &'static str,
}

/// The built-in scenario catalog. Fixed at build time, never fetched
/// remotely; ids match the datasets the reference backend ships.
const SCENARIOS: &[Scenario] = &[
    Scenario { id: "stripe", name: "Stripe: Charges → PaymentIntents" },
    Scenario { id: "react", name: "React: Event Delegation (17 → 18)" },
    Scenario { id: "nextjs", name: "Next.js: Pages → App Router" },
    Scenario { id: "aws_s3", name: "AWS SDK: S3 Upload (v2 → v3)" },
    Scenario { id: "python", name: "Python: print Statement → Function" },
    Scenario { id: "openai", name: "OpenAI: Global Client → Instance" },
    Scenario { id: "tailwind", name: "Tailwind: Dark Mode Strategy" },
    Scenario { id: "kubernetes", name: "Kubernetes: Dockershim Removal" },
    Scenario { id: "github_actions", name: "GitHub Actions: set-output Deprecation" },
    Scenario { id: "flutter", name: "Flutter: WillPopScope → PopScope" },
];

/// All known scenarios, in catalog order.
pub fn scenario_catalog() -> &'static [Scenario] {
    SCENARIOS
}

/// Look up a scenario by id.
pub fn find_scenario(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}
