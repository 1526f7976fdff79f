/// The decision boundary.
///
/// A `DecisionService` is a black box `state -> action`: it receives the
/// perception snapshot serialized as JSON and answers `{"action": token}`.
/// The call is blocking from the service's point of view; the driver runs
/// it on a worker thread so the game loop never waits on it.
///
/// `HeuristicService` is the zero-dependency local implementation used
/// when no remote backend is configured; the same heuristic also backs
/// every failure path at the driver level.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::perception::PerceptionSnapshot;
use crate::domain::policy::{self, Action};

/// Read-only diagnostics: is a backend configured, and which one.
/// Consumed by the HUD only, never gameplay-critical.
#[derive(Clone, Debug)]
pub struct ServiceStatus {
    pub configured: bool,
    pub backend: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DecisionError {
    /// The backend cannot be reached or is not set up.
    Unavailable(String),
    /// The request or reply could not be understood.
    Malformed(String),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionError::Unavailable(why) => write!(f, "decision service unavailable: {why}"),
            DecisionError::Malformed(why) => write!(f, "malformed decision payload: {why}"),
        }
    }
}

impl std::error::Error for DecisionError {}

pub trait DecisionService: Send {
    /// Map a serialized `PerceptionSnapshot` to a serialized
    /// `{"action": token}` reply. Blocking; executed off the loop thread.
    fn decide(&mut self, request: &str) -> Result<String, DecisionError>;

    fn status(&self) -> ServiceStatus;
}

/// The wire reply shape.
#[derive(Serialize, Deserialize, Debug)]
pub struct DecisionReply {
    pub action: String,
}

/// Parse a service reply into an action.
///
/// Tolerates code-fenced output (some backends wrap JSON in ``` fences)
/// and any token casing. Anything else is None, which the caller resolves
/// to the fallback.
pub fn extract_action(text: &str) -> Option<Action> {
    let body = strip_fences(text);
    let reply: DecisionReply = serde_json::from_str(body).ok()?;
    Action::parse(&reply.action)
}

/// Cut a fenced block down to the first `{...}` span inside it.
fn strip_fences(text: &str) -> &str {
    let t = text.trim();
    if !t.starts_with("```") {
        return t;
    }
    let open = t.find('{');
    let close = t.rfind('}');
    match (open, close) {
        (Some(i), Some(j)) if j > i => &t[i..=j],
        _ => "",
    }
}

/// Local fallback policy wrapped as a service. Always available.
pub struct HeuristicService;

impl DecisionService for HeuristicService {
    fn decide(&mut self, request: &str) -> Result<String, DecisionError> {
        let snapshot: PerceptionSnapshot = serde_json::from_str(request)
            .map_err(|e| DecisionError::Malformed(e.to_string()))?;
        let action = policy::fallback(&snapshot);
        serde_json::to_string(&DecisionReply { action: action.as_str().to_string() })
            .map_err(|e| DecisionError::Malformed(e.to_string()))
    }

    fn status(&self) -> ServiceStatus {
        ServiceStatus {
            configured: true,
            backend: "local-heuristic".to_string(),
        }
    }
}
