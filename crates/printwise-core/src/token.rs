//! # Capability Tokens
//!
//! The opaque secret behind a quote's public share link. Holding the token is
//! the only authorization needed to view, approve or reject that one quote.
//!
//! ## Token Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_quote                                                           │
//! │     CapabilityToken::issue()   32 bytes OsRng ──► 64 lowercase hex      │
//! │     store: hash = token, hash_digest = sha256(token)                    │
//! │                                                                         │
//! │  GET /quotes/view/{presented}                                           │
//! │     CapabilityToken::parse()   wrong length/alphabet ──► not found      │
//! │     lookup by hash_digest      (indexed, equality on a digest)          │
//! │     stored.matches(presented)  constant-time compare                    │
//! │     TokenPolicy expiry         expired ──► not found                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tokens never appear in `Debug` output or logs.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Bytes of entropy per token.
pub const TOKEN_BYTES: usize = 32;

/// Rendered token length (hex, two characters per byte).
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Longest configurable token lifetime (about a century).
pub const MAX_TOKEN_TTL_DAYS: u32 = 36_500;

// =============================================================================
// Capability Token
// =============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct CapabilityToken(String);

impl CapabilityToken {
    /// Mints a fresh token from the OS CSPRNG.
    pub fn issue() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        CapabilityToken(hex::encode(bytes))
    }

    /// Accepts a presented token if it is syntactically a token.
    ///
    /// Returns `None` for anything that could not have been issued here, so
    /// malformed input never reaches the database.
    ///
    /// ## Example
    /// ```rust
    /// use printwise_core::token::CapabilityToken;
    ///
    /// let token = CapabilityToken::issue();
    /// assert!(CapabilityToken::parse(token.as_str()).is_some());
    /// assert!(CapabilityToken::parse("not-a-token").is_none());
    /// ```
    pub fn parse(presented: &str) -> Option<Self> {
        let well_formed = presented.len() == TOKEN_LEN
            && presented
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        well_formed.then(|| CapabilityToken(presented.to_string()))
    }

    /// Wraps a token read back from storage.
    pub fn from_stored(stored: String) -> Self {
        CapabilityToken(stored)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 of the token, hex encoded. Used as the indexed lookup key.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }

    /// Constant-time comparison against another token.
    pub fn matches(&self, other: &CapabilityToken) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CapabilityToken(<redacted>)")
    }
}

// =============================================================================
// Token Policy
// =============================================================================

/// Lifetime rule for newly issued tokens.
///
/// The default is unlimited, which keeps links that were already shared
/// working. A configured TTL stamps `token_expires_at` at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenPolicy {
    ttl: Option<Duration>,
}

impl TokenPolicy {
    pub fn unlimited() -> Self {
        TokenPolicy { ttl: None }
    }

    pub fn with_ttl_days(days: u32) -> Self {
        TokenPolicy {
            ttl: Some(Duration::days(i64::from(days))),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Expiry for a token issued at `issued_at`, if any.
    ///
    /// An expiry past the end of the calendar is no expiry at all.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.ttl.and_then(|ttl| issued_at.checked_add_signed(ttl))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
