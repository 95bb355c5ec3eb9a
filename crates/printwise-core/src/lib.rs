//! # printwise-core: Pure Business Logic for PrintWise Quoting
//!
//! This crate holds the quoting rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PrintWise Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    quote-api (axum)                             │   │
//! │  │   /admin/quotes/*  (staff)      /quotes/{view,approve,reject}   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 printwise-db (QuoteService)                     │   │
//! │  │        transactions, repositories, catalog snapshots            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ printwise-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │ pricing  │ │ finishing │ │  token   │ │lifecycle │         │   │
//! │  │   │ factors  │ │   chain   │ │  OsRng   │ │  states  │         │   │
//! │  │   └──────────┘ └───────────┘ └──────────┘ └──────────┘         │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │  waste   │ │   money   │ │  types   │ │validation│         │   │
//! │  │   └──────────┘ └───────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - Small/large format unit prices
//! - [`finishing`] - Ordered finishing effects
//! - [`catalog`] - Product/finishing lookup seam
//! - [`token`] - Capability tokens for share links
//! - [`lifecycle`] - Quote state machine
//! - [`waste`] - Waste percentage and justification policy
//! - [`money`] - Integer-cent money with the single rounding rule
//! - [`types`] - Domain records
//! - [`validation`] - Field rules
//! - [`context`] - Request id and actor
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use printwise_core::catalog::CatalogSnapshot;
//! use printwise_core::pricing::{PriceRequest, PricingCalculator};
//! use printwise_core::{Money, PrintJob, Product, ProductFormat, ProductId};
//!
//! let catalog = CatalogSnapshot::new().with_product(Product {
//!     id: ProductId(1),
//!     name: "Flyer A5".to_string(),
//!     format: ProductFormat::Small,
//!     base_price: Money::from_cents(1000),
//!     active: true,
//! });
//!
//! let request = PriceRequest {
//!     product_id: ProductId(1),
//!     job: PrintJob::Small { quantity: 600, colors: 1 },
//!     finishing_ids: vec![],
//! };
//!
//! let quote = PricingCalculator::price(&catalog, &request).unwrap();
//! assert_eq!(quote.unit_price.cents(), 640);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod context;
pub mod error;
pub mod finishing;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod token;
pub mod types;
pub mod validation;
pub mod waste;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, CatalogSnapshot};
pub use context::{Actor, RequestContext};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use lifecycle::{QuoteAction, QuoteStatus};
pub use money::Money;
pub use pricing::{PriceQuote, PriceRequest, PricingCalculator};
pub use token::{CapabilityToken, TokenPolicy};
pub use types::*;
pub use waste::{WasteAssessment, WasteInput, WastePolicy};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Waste percentage above which a justification is mandatory.
pub const DEFAULT_WASTE_THRESHOLD_PERCENT: i64 = 5;

/// Largest quantity a single quote may carry.
///
/// ## Business Reason
/// Catches typos (an extra zero or three) before they become a priced quote.
pub const MAX_QUOTE_QUANTITY: i64 = 1_000_000;
