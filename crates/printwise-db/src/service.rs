//! # Quote Service
//!
//! The quoting workflow: every operation the HTTP layer exposes, each one a
//! single unit of work against the database.
//!
//! ## Transaction Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  operation          reads (same tx)               writes                │
//! │  ─────────────────  ────────────────────────────  ──────────────────── │
//! │  preview            catalog snapshot              (none)                │
//! │  create_quote       snapshot, client              quote + finishings    │
//! │  update_quote       quote, snapshot, client       quote + finishings    │
//! │  delete_quote       quote                         finishings + quote    │
//! │  approve / reject   quote by token digest         status (CAS)          │
//! │  reconcile_waste    quote, existing record        waste row + status    │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction: nothing is written.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain decisions come from printwise-core (`PricingCalculator`,
//! `QuoteStatus::apply`, `WastePolicy`); this module only sequences them
//! around storage.

use chrono::{DateTime, Utc};
use printwise_core::validation::{normalize_optional_text, validate_title, validate_waste_quantities};
use printwise_core::{
    CapabilityToken, ClientId, CoreError, Finishing, PriceQuote, PriceRequest, PricingCalculator,
    ProductFormat, PublicQuoteView, Quote, QuoteAction, QuoteDetails, QuoteId, QuoteStatus,
    RequestContext, TokenPolicy, ValidationError, WasteInput, WastePolicy, WasteRecord,
    WasteReportEntry,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info, instrument, warn};

use crate::error::{DbError, ServiceError, ServiceResult};
use crate::pool::Database;
use crate::repository::catalog::CatalogRepository;
use crate::repository::quote::{QuoteRecord, QuoteRepository};
use crate::repository::waste::WasteRepository;

/// What a not-found token lookup reports. The token itself is never echoed.
const UNKNOWN_LINK: &str = "invalid or expired link";

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// Staff input for creating or revising a quote.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteDraft {
    pub client_id: ClientId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub pricing: PriceRequest,
}

/// The waste report screen: every record plus the active threshold.
#[derive(Debug, Clone, Serialize)]
pub struct WasteReport {
    pub threshold: Decimal,
    pub entries: Vec<WasteReportEntry>,
}

// =============================================================================
// Quote Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct QuoteService {
    db: Database,
    waste_policy: WastePolicy,
    token_policy: TokenPolicy,
}

impl QuoteService {
    /// Creates a service with the default policies (5% waste threshold,
    /// tokens without expiry).
    pub fn new(db: Database) -> Self {
        QuoteService {
            db,
            waste_policy: WastePolicy::default(),
            token_policy: TokenPolicy::default(),
        }
    }

    pub fn with_waste_policy(mut self, policy: WastePolicy) -> Self {
        self.waste_policy = policy;
        self
    }

    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn waste_policy(&self) -> WastePolicy {
        self.waste_policy
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    /// Prices a request without persisting anything.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor, product_id = %request.product_id))]
    pub async fn preview(
        &self,
        ctx: &RequestContext,
        request: &PriceRequest,
    ) -> ServiceResult<PriceQuote> {
        let mut conn = self.db.pool().acquire().await?;
        let catalog =
            CatalogRepository::snapshot(&mut conn, request.product_id, &request.finishing_ids)
                .await?;

        let priced = PricingCalculator::price(&catalog, request)?;
        debug!(
            unit_price = %priced.unit_price,
            total_price = %priced.total_price,
            "Priced preview"
        );

        Ok(priced)
    }

    // -------------------------------------------------------------------------
    // Staff operations
    // -------------------------------------------------------------------------

    /// Prices and stores a new pending quote with a fresh capability token.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor, client_id = %draft.client_id))]
    pub async fn create_quote(
        &self,
        ctx: &RequestContext,
        draft: &QuoteDraft,
    ) -> ServiceResult<QuoteDetails> {
        let title = validate_title(&draft.title)?;
        let description = normalize_optional_text("description", draft.description.as_deref())?;

        let mut tx = self.db.begin().await?;

        let priced = price_in(&mut tx, &draft.pricing).await?;
        ensure_client(&mut tx, draft.client_id).await?;

        let now = Utc::now();
        let token = CapabilityToken::issue();
        let record = QuoteRecord {
            client_id: draft.client_id,
            product_id: draft.pricing.product_id,
            title: &title,
            description: description.as_deref(),
            job: &draft.pricing.job,
            unit_price: priced.unit_price,
            total_price: priced.total_price,
        };

        let id =
            QuoteRepository::insert(&mut tx, &record, &token, self.token_policy.expires_at(now), now)
                .await?;
        QuoteRepository::replace_finishings(&mut tx, id, &priced.finishing_ids).await?;

        let details = load_details(&mut tx, id).await?;
        tx.commit().await?;

        info!(
            quote_id = %id,
            unit_price = %priced.unit_price,
            total_price = %priced.total_price,
            "Quote created"
        );
        Ok(details)
    }

    /// Re-prices a pending quote with new parameters and finishings.
    ///
    /// The quote keeps its id, status and capability token.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor, quote_id = %id))]
    pub async fn update_quote(
        &self,
        ctx: &RequestContext,
        id: QuoteId,
        draft: &QuoteDraft,
    ) -> ServiceResult<QuoteDetails> {
        let title = validate_title(&draft.title)?;
        let description = normalize_optional_text("description", draft.description.as_deref())?;

        let mut tx = self.db.begin().await?;

        let current = find_quote(&mut tx, id).await?;
        check_transition(&current, QuoteAction::Revise)?;

        let priced = price_in(&mut tx, &draft.pricing).await?;
        ensure_client(&mut tx, draft.client_id).await?;

        let record = QuoteRecord {
            client_id: draft.client_id,
            product_id: draft.pricing.product_id,
            title: &title,
            description: description.as_deref(),
            job: &draft.pricing.job,
            unit_price: priced.unit_price,
            total_price: priced.total_price,
        };

        if !QuoteRepository::revise(&mut tx, id, &record, Utc::now()).await? {
            return Err(stale_transition(&mut tx, id, QuoteAction::Revise).await);
        }
        QuoteRepository::replace_finishings(&mut tx, id, &priced.finishing_ids).await?;

        let details = load_details(&mut tx, id).await?;
        tx.commit().await?;

        info!(total_price = %priced.total_price, "Quote revised");
        Ok(details)
    }

    /// Deletes a pending or rejected quote with its finishing associations.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor, quote_id = %id))]
    pub async fn delete_quote(&self, ctx: &RequestContext, id: QuoteId) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;

        let current = find_quote(&mut tx, id).await?;
        check_transition(&current, QuoteAction::Delete)?;

        if !QuoteRepository::delete(&mut tx, id).await? {
            return Err(stale_transition(&mut tx, id, QuoteAction::Delete).await);
        }
        tx.commit().await?;

        info!(status = %current.status, "Quote deleted");
        Ok(())
    }

    /// Gets a quote with its finishings.
    pub async fn get_quote(&self, id: QuoteId) -> ServiceResult<QuoteDetails> {
        let mut conn = self.db.pool().acquire().await?;
        load_details(&mut conn, id).await
    }

    /// Lists quotes, newest first.
    pub async fn list_quotes(&self, status: Option<QuoteStatus>) -> ServiceResult<Vec<Quote>> {
        Ok(self.db.quotes().list(status).await?)
    }

    /// Active finishings a staff member may pick for `format`.
    pub async fn finishings_for_format(&self, format: ProductFormat) -> ServiceResult<Vec<Finishing>> {
        Ok(self.db.catalog().finishings_for_format(format).await?)
    }

    // -------------------------------------------------------------------------
    // Public (token holder) operations
    // -------------------------------------------------------------------------

    /// Resolves a share link to its quote.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor))]
    pub async fn view_by_token(
        &self,
        ctx: &RequestContext,
        presented: &str,
    ) -> ServiceResult<PublicQuoteView> {
        let mut conn = self.db.pool().acquire().await?;

        let quote = resolve_token(&mut conn, presented, Utc::now()).await?;
        let (product_name, client_name) = CatalogRepository::names_for_quote(&mut conn, quote.id)
            .await?
            .ok_or_else(|| CoreError::QuoteNotFound(quote.id.to_string()))?;
        let finishings = CatalogRepository::finishings_for_quote(&mut conn, quote.id).await?;

        debug!(quote_id = %quote.id, "Quote viewed through share link");
        Ok(PublicQuoteView {
            details: QuoteDetails { quote, finishings },
            product_name,
            client_name,
        })
    }

    /// Client accepts the quote: `pending → approved`.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor))]
    pub async fn approve(&self, ctx: &RequestContext, presented: &str) -> ServiceResult<Quote> {
        self.decide(presented, QuoteAction::Approve, None).await
    }

    /// Client declines the quote: `pending → rejected`, with an optional reason.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor))]
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        presented: &str,
        reason: Option<&str>,
    ) -> ServiceResult<Quote> {
        let reason = normalize_optional_text("reason", reason)?;
        self.decide(presented, QuoteAction::Reject, reason.as_deref())
            .await
    }

    async fn decide(
        &self,
        presented: &str,
        action: QuoteAction,
        reason: Option<&str>,
    ) -> ServiceResult<Quote> {
        let mut tx = self.db.begin().await?;
        let now = Utc::now();

        let quote = resolve_token(&mut tx, presented, now).await?;
        let next = check_transition(&quote, action)?;

        if !QuoteRepository::transition(&mut tx, quote.id, quote.status, next, reason, now).await? {
            return Err(stale_transition(&mut tx, quote.id, action).await);
        }

        let updated = find_quote(&mut tx, quote.id).await?;
        tx.commit().await?;

        info!(
            quote_id = %quote.id,
            from = %quote.status,
            to = %updated.status,
            "Quote status changed"
        );
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Waste reconciliation
    // -------------------------------------------------------------------------

    /// Records production waste for an approved quote and completes it.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, actor = %ctx.actor, quote_id = %input.quote_id))]
    pub async fn reconcile_waste(
        &self,
        ctx: &RequestContext,
        input: &WasteInput,
    ) -> ServiceResult<WasteRecord> {
        validate_waste_quantities(input.expected_quantity, input.actual_quantity)?;

        let mut tx = self.db.begin().await?;

        let quote = find_quote(&mut tx, input.quote_id).await?;
        let already_reconciled = WasteRepository::exists_for_quote(&mut tx, quote.id).await?;

        let assessment = self
            .waste_policy
            .reconcile(input, quote.status, already_reconciled)
            .inspect_err(|err| {
                warn!(status = %quote.status, error = %err, "Waste reconciliation refused");
            })?;

        let now = Utc::now();
        let record = WasteRepository::insert(
            &mut tx,
            quote.id,
            input.expected_quantity,
            input.actual_quantity,
            &assessment,
            now,
        )
        .await
        .map_err(|err| duplicate_waste(err, quote.id))?;

        if !QuoteRepository::transition(
            &mut tx,
            quote.id,
            quote.status,
            assessment.next_status,
            None,
            now,
        )
        .await?
        {
            return Err(stale_transition(&mut tx, quote.id, QuoteAction::Complete).await);
        }

        tx.commit().await?;

        info!(
            waste_percentage = %assessment.waste_percentage,
            justified = assessment.justification.is_some(),
            "Waste reconciled, quote completed"
        );
        Ok(record)
    }

    /// All waste records with their quote, product and client names.
    pub async fn waste_report(&self) -> ServiceResult<WasteReport> {
        Ok(WasteReport {
            threshold: self.waste_policy.threshold(),
            entries: self.db.waste().report().await?,
        })
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn price_in(conn: &mut SqliteConnection, request: &PriceRequest) -> ServiceResult<PriceQuote> {
    let catalog =
        CatalogRepository::snapshot(conn, request.product_id, &request.finishing_ids).await?;
    Ok(PricingCalculator::price(&catalog, request)?)
}

async fn ensure_client(conn: &mut SqliteConnection, id: ClientId) -> ServiceResult<()> {
    if CatalogRepository::client_exists(conn, id).await? {
        Ok(())
    } else {
        Err(CoreError::ClientNotFound(id).into())
    }
}

async fn find_quote(conn: &mut SqliteConnection, id: QuoteId) -> ServiceResult<Quote> {
    QuoteRepository::find(conn, id)
        .await?
        .ok_or_else(|| CoreError::QuoteNotFound(id.to_string()).into())
}

async fn load_details(conn: &mut SqliteConnection, id: QuoteId) -> ServiceResult<QuoteDetails> {
    let quote = find_quote(conn, id).await?;
    let finishings = CatalogRepository::finishings_for_quote(conn, id).await?;
    Ok(QuoteDetails { quote, finishings })
}

/// Checks `action` against the quote's current status, logging refusals.
fn check_transition(quote: &Quote, action: QuoteAction) -> ServiceResult<QuoteStatus> {
    quote.status.apply(action).map_err(|err| {
        warn!(quote_id = %quote.id, status = %quote.status, %action, "Transition refused");
        err.into()
    })
}

/// Parse, digest lookup, constant-time compare, expiry. Every failure is the
/// same not-found.
async fn resolve_token(
    conn: &mut SqliteConnection,
    presented: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Quote> {
    let unknown = || ServiceError::from(CoreError::QuoteNotFound(UNKNOWN_LINK.to_string()));

    let token = CapabilityToken::parse(presented).ok_or_else(unknown)?;
    let quote = QuoteRepository::find_by_token_digest(conn, &token.digest())
        .await?
        .ok_or_else(unknown)?;

    if !quote.token.matches(&token) {
        return Err(unknown());
    }

    if quote.token_expired(now) {
        debug!(quote_id = %quote.id, "Expired share link presented");
        return Err(unknown());
    }

    Ok(quote)
}

/// A compare-and-set update found the quote in another state: report what
/// it actually is now.
async fn stale_transition(conn: &mut SqliteConnection, id: QuoteId, action: QuoteAction) -> ServiceError {
    match QuoteRepository::find(conn, id).await {
        Ok(Some(quote)) => {
            warn!(quote_id = %id, status = %quote.status, %action, "Concurrent status change");
            CoreError::InvalidStateTransition {
                from: quote.status,
                action,
            }
            .into()
        }
        Ok(None) => CoreError::QuoteNotFound(id.to_string()).into(),
        Err(err) => err.into(),
    }
}

/// A concurrent reconciliation won the UNIQUE(quote_id) race.
fn duplicate_waste(err: DbError, quote_id: QuoteId) -> ServiceError {
    match err {
        DbError::UniqueViolation { .. } => ValidationError::Duplicate {
            field: "waste record for quote".to_string(),
            value: quote_id.to_string(),
        }
        .into(),
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
