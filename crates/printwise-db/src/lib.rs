//! # printwise-db: Database Layer for PrintWise
//!
//! This crate provides database access for the PrintWise quoting workflow.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PrintWise Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /quotes/approve/{token})                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   printwise-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ QuoteService  │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (service.rs)  │───►│               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogRepo   │    │              │  │   │
//! │  │   │ one tx per    │    │ QuoteRepo     │    │ 001_initial  │  │   │
//! │  │   │ operation     │    │ WasteRepo     │    │   _schema    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           ▼  pricing, lifecycle, waste rules                   │   │
//! │  │     printwise-core                                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations (catalog, quote, waste)
//! - [`service`] - The quoting workflow, one transaction per operation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use printwise_core::RequestContext;
//! use printwise_db::{Database, DbConfig, QuoteService};
//!
//! let db = Database::new(DbConfig::new("printwise.db")).await?;
//! let service = QuoteService::new(db);
//!
//! let quote = service.create_quote(&RequestContext::staff(1), &draft).await?;
//! println!("share: /quotes/view/{}", quote.quote.token.as_str());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};
pub use service::{QuoteDraft, QuoteService, WasteReport};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::quote::{QuoteRecord, QuoteRepository};
pub use repository::waste::WasteRepository;
