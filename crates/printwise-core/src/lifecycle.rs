//! # Quote Lifecycle
//!
//! The quote state machine. Every status change in the system goes through
//! [`QuoteStatus::apply`].
//!
//! ## States
//! ```text
//!                  approve (token)            complete (waste reconciled)
//!   ┌─────────┐ ─────────────────► ┌──────────┐ ───────────────► ┌───────────┐
//!   │ pending │                    │ approved │                  │ completed │
//!   └─────────┘ ─────────┐         └──────────┘                  └───────────┘
//!     │    ▲             │ reject (token)                          terminal
//!     └────┘ revise      ▼
//!                   ┌──────────┐
//!                   │ rejected │  terminal
//!                   └──────────┘
//!
//!   delete: allowed from pending and rejected only
//! ```
//!
//! Status never moves backwards. Anything not drawn above fails with
//! [`CoreError::InvalidStateTransition`].

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Quote Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Awaiting the client's decision. Initial state.
    Pending,
    /// Client accepted through the share link.
    Approved,
    /// Client declined through the share link.
    Rejected,
    /// Produced and waste reconciled.
    Completed,
}

impl QuoteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Completed => "completed",
        }
    }

    /// Rejected and completed quotes accept no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Rejected | QuoteStatus::Completed)
    }

    /// Applies `action` and returns the resulting status.
    ///
    /// `Revise` and `Delete` are checks only: when permitted they return the
    /// current status unchanged.
    ///
    /// ## Example
    /// ```rust
    /// use printwise_core::lifecycle::{QuoteAction, QuoteStatus};
    ///
    /// let next = QuoteStatus::Pending.apply(QuoteAction::Approve).unwrap();
    /// assert_eq!(next, QuoteStatus::Approved);
    ///
    /// assert!(QuoteStatus::Approved.apply(QuoteAction::Approve).is_err());
    /// ```
    pub fn apply(self, action: QuoteAction) -> CoreResult<QuoteStatus> {
        use QuoteAction as A;
        use QuoteStatus as S;

        match (self, action) {
            (S::Pending, A::Approve) => Ok(S::Approved),
            (S::Pending, A::Reject) => Ok(S::Rejected),
            (S::Approved, A::Complete) => Ok(S::Completed),
            (S::Pending, A::Revise) => Ok(S::Pending),
            (S::Pending | S::Rejected, A::Delete) => Ok(self),
            (from, action) => Err(CoreError::InvalidStateTransition { from, action }),
        }
    }
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Pending
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Quote Action
// =============================================================================

/// Something a caller asks to do to a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteAction {
    /// Client accepts (public link).
    Approve,
    /// Client declines (public link).
    Reject,
    /// Waste reconciliation finished.
    Complete,
    /// Staff edit of parameters and finishings.
    Revise,
    /// Staff removal.
    Delete,
}

impl QuoteAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuoteAction::Approve => "approve",
            QuoteAction::Reject => "reject",
            QuoteAction::Complete => "complete",
            QuoteAction::Revise => "revise",
            QuoteAction::Delete => "delete",
        }
    }
}

impl fmt::Display for QuoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
