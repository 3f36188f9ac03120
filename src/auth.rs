//! Password gate in front of a run

use crate::error::{SearchError, SearchResult};

/// Where a session stands with respect to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Nothing submitted yet
    #[default]
    Unauthenticated,
    /// The last submission matched
    Authenticated,
    /// The last submission did not match; another attempt may follow
    Rejected,
}

/// Per-user gate state, passed explicitly to the gate
///
/// Submitted passwords are compared and dropped, never stored.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: AuthState,
    attempts: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for a deployment without a gate password
    pub fn unguarded() -> Self {
        Self {
            state: AuthState::Authenticated,
            attempts: 0,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn require_authenticated(&self) -> SearchResult<()> {
        match self.state {
            AuthState::Authenticated => Ok(()),
            AuthState::Unauthenticated => Err(SearchError::AccessDenied(
                "Password required".to_string(),
            )),
            AuthState::Rejected => Err(SearchError::AccessDenied(
                "Password incorrect".to_string(),
            )),
        }
    }
}

/// Checks submissions against the configured password
#[derive(Clone)]
pub struct PasswordGate {
    expected: String,
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate")
            .field("expected", &"***")
            .finish()
    }
}

impl PasswordGate {
    pub fn new(expected: &str) -> SearchResult<Self> {
        if expected.is_empty() {
            return Err(SearchError::ConfigError(
                "Gate password must not be empty".to_string(),
            ));
        }
        Ok(Self {
            expected: expected.to_string(),
        })
    }

    /// Compare `attempt` and move the session to Authenticated or Rejected
    pub fn submit(&self, session: &mut Session, attempt: &str) -> AuthState {
        session.attempts += 1;
        session.state = if constant_time_eq(self.expected.as_bytes(), attempt.as_bytes()) {
            AuthState::Authenticated
        } else {
            log::warn!("Password rejected (attempt {})", session.attempts);
            AuthState::Rejected
        };
        session.state
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
