//! # Domain Types
//!
//! Core domain types used throughout PrintWise.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Quote       │   │  WasteRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  format         │◄──│  product_id     │◄──│  quote_id (1:1) │       │
//! │  │  base_price     │   │  job (PrintJob) │   │  expected/actual│       │
//! │  └─────────────────┘   │  unit/total     │   │  waste_%        │       │
//! │                        │  status, token  │   └─────────────────┘       │
//! │  ┌─────────────────┐   └────────┬────────┘                              │
//! │  │   Finishing     │◄───────────┘ quote_finishings (n:m)                │
//! │  │  ─────────────  │                                                    │
//! │  │  is_multiplier  │   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  price_factor   │   │    PrintJob     │   │  ProductFormat  │       │
//! │  │  applicability  │   │  Small{qty,col} │   │  Small | Large  │       │
//! │  └─────────────────┘   │  Large{qty,w,h} │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record is keyed by an integer newtype (`QuoteId`, `ProductId`, ...)
//! matching SQLite `INTEGER PRIMARY KEY`. The newtypes keep a finishing id
//! from ever being passed where a product id is expected.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::lifecycle::QuoteStatus;
use crate::money::Money;
use crate::token::CapabilityToken;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                $name(raw)
            }
        }
    };
}

integer_id!(
    /// Client (customer) identifier.
    ClientId
);
integer_id!(
    /// Catalog product identifier.
    ProductId
);
integer_id!(
    /// Finishing identifier. Finishing chains apply in ascending id order.
    FinishingId
);
integer_id!(
    /// Quote identifier.
    QuoteId
);
integer_id!(
    /// Waste record identifier.
    WasteRecordId
);

// =============================================================================
// Product Format
// =============================================================================

/// The two product families, priced by different rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductFormat {
    /// Per-unit pricing by quantity and color tier (cards, flyers).
    Small,
    /// Per-area pricing by physical dimensions (banners, posters).
    Large,
}

impl ProductFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductFormat::Small => "small",
            ProductFormat::Large => "large",
        }
    }
}

impl fmt::Display for ProductFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which product formats a finishing may be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    Small,
    Large,
    Both,
}

impl Applicability {
    /// Checks whether a finishing with this applicability fits `format`.
    pub const fn allows(&self, format: ProductFormat) -> bool {
        matches!(
            (self, format),
            (Applicability::Both, _)
                | (Applicability::Small, ProductFormat::Small)
                | (Applicability::Large, ProductFormat::Large)
        )
    }
}

// =============================================================================
// Catalog Records
// =============================================================================

/// A client of the print shop. Owned by the client collaborator; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: Option<String>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,

    /// Display name shown on quotes.
    pub name: String,

    /// Which pricing rule applies.
    pub format: ProductFormat,

    /// Per unit for small format, per square meter for large format.
    pub base_price: Money,

    /// Whether the product is offered for new quotes.
    pub active: bool,
}

/// An optional post-processing step (lamination, eyelets, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Finishing {
    pub id: FinishingId,
    pub name: String,

    /// `true`: `price *= price_factor`. `false`: `price += price_factor`.
    pub is_multiplier: bool,

    /// Multiplier or additive amount in EUR, depending on `is_multiplier`.
    #[ts(as = "String")]
    pub price_factor: Decimal,

    pub applicability: Applicability,
    pub active: bool,
}

// =============================================================================
// Print Job
// =============================================================================

fn default_colors() -> i64 {
    4
}

/// Format-specific job parameters. Exactly one variant per quote.
///
/// Serialized with a `format` tag so a request reads naturally:
/// `{"format": "large", "quantity": 3, "width_cm": 100, "height_cm": 50}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum PrintJob {
    Small {
        quantity: i64,
        /// Number of ink colors. Defaults to 4 (CMYK).
        #[serde(default = "default_colors")]
        colors: i64,
    },
    Large {
        quantity: i64,
        #[ts(as = "String")]
        width_cm: Decimal,
        #[ts(as = "String")]
        height_cm: Decimal,
    },
}

impl PrintJob {
    pub fn format(&self) -> ProductFormat {
        match self {
            PrintJob::Small { .. } => ProductFormat::Small,
            PrintJob::Large { .. } => ProductFormat::Large,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            PrintJob::Small { quantity, .. } | PrintJob::Large { quantity, .. } => *quantity,
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A priced proposal for a print job.
///
/// ## Invariants
/// - `total_price == unit_price × quantity` (also a CHECK constraint)
/// - `status` only moves forward (see [`crate::lifecycle`])
/// - `token` is unique across all quotes and never serialized
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Quote {
    pub id: QuoteId,
    pub client_id: ClientId,
    pub product_id: ProductId,
    pub title: String,
    pub description: Option<String>,

    #[serde(flatten)]
    pub job: PrintJob,

    pub unit_price: Money,
    pub total_price: Money,
    pub status: QuoteStatus,

    /// Capability token behind the share link. Staff responses expose it only
    /// as part of the share URL.
    #[serde(skip)]
    #[ts(skip)]
    pub token: CapabilityToken,

    pub reject_reason: Option<String>,

    #[ts(as = "Option<String>")]
    pub token_expires_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    #[inline]
    pub fn quantity(&self) -> i64 {
        self.job.quantity()
    }

    #[inline]
    pub fn format(&self) -> ProductFormat {
        self.job.format()
    }

    /// Checks the token expiry against `now`. Quotes without expiry never expire.
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_some_and(|expires| now >= expires)
    }
}

/// A quote together with its finishings in applied (ascending id) order.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct QuoteDetails {
    #[serde(flatten)]
    pub quote: Quote,
    pub finishings: Vec<Finishing>,
}

/// What a client sees behind a share link: the quote plus the names its ids
/// stand for.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PublicQuoteView {
    #[serde(flatten)]
    pub details: QuoteDetails,
    pub product_name: String,
    pub client_name: String,
}

// =============================================================================
// Waste
// =============================================================================

/// Post-production reconciliation of a quote. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WasteRecord {
    pub id: WasteRecordId,
    pub quote_id: QuoteId,
    pub expected_quantity: i64,
    pub actual_quantity: i64,
    #[ts(as = "String")]
    pub waste_percentage: Decimal,
    pub justification: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One line of the waste report screen.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct WasteReportEntry {
    #[serde(flatten)]
    pub record: WasteRecord,
    pub quote_title: String,
    pub product_name: String,
    pub client_name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
