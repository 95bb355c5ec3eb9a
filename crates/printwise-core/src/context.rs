//! Request context passed explicitly into every service operation.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Who is acting on a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// Authenticated staff member, identified upstream.
    Staff { user_id: i64 },
    /// Anyone presenting a quote's capability token.
    TokenHolder,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Staff { user_id } => write!(f, "staff:{}", user_id),
            Actor::TokenHolder => f.write_str("token-holder"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlates log lines of one request.
    pub request_id: Uuid,
    pub actor: Actor,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        RequestContext {
            request_id: Uuid::new_v4(),
            actor,
        }
    }

    pub fn staff(user_id: i64) -> Self {
        Self::new(Actor::Staff { user_id })
    }

    pub fn token_holder() -> Self {
        Self::new(Actor::TokenHolder)
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }
}
