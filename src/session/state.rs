//! Session phase tracking
//!
//! `SessionPhase` carries its data inside the variant, so a result can only
//! exist in `Succeeded` and an error message only in `Failed`.

use chrono::Utc;

use crate::models::ResultRef;

/// Phase of the analysis session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// Nothing in flight, no result
    Idle,
    /// One request in flight
    Submitting,
    /// Last request succeeded
    Succeeded { result: ResultRef, confidence: f64 },
    /// Last request failed; alert pending acknowledgement
    Failed { message: String },
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

impl SessionPhase {
    /// Get the human-readable name for this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Succeeded { .. } => "succeeded",
            SessionPhase::Failed { .. } => "failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SessionPhase::Submitting)
    }

    pub fn result(&self) -> Option<&ResultRef> {
        match self {
            SessionPhase::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            SessionPhase::Succeeded { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }
}

/// Source of cache-busting tokens.
///
/// Tokens are wall-clock milliseconds, bumped past the previous token when
/// the clock has not moved (or went backwards), so every token is distinct.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: Option<i64>,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&mut self) -> i64 {
        self.next_from(Utc::now().timestamp_millis())
    }

    fn next_from(&mut self, now: i64) -> i64 {
        let token = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(token);
        token
    }
}
