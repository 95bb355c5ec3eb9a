//! Request/response bodies that exist only on the HTTP surface.

use printwise_core::{FinishingId, PriceQuote, ProductFormat, QuoteDetails, QuoteStatus};
use serde::{Deserialize, Serialize};

/// Price preview, with amounts as decimal strings and in display form.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub unit_price: String,
    pub total_price: String,
    pub formatted_unit_price: String,
    pub formatted_total_price: String,
    pub finishing_ids: Vec<FinishingId>,
}

impl From<PriceQuote> for PreviewResponse {
    fn from(quote: PriceQuote) -> Self {
        PreviewResponse {
            unit_price: quote.unit_price.to_string(),
            total_price: quote.total_price.to_string(),
            formatted_unit_price: quote.unit_price.format_eur(),
            formatted_total_price: quote.total_price.format_eur(),
            finishing_ids: quote.finishing_ids,
        }
    }
}

/// A quote as staff see it: details plus the link to send the client.
#[derive(Debug, Serialize)]
pub struct StaffQuoteResponse {
    #[serde(flatten)]
    pub details: QuoteDetails,
    pub share_url: String,
}

/// `POST /quotes/reject/{token}` body. The body itself may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuotesParams {
    pub status: Option<QuoteStatus>,
}

#[derive(Debug, Deserialize)]
pub struct FinishingsParams {
    pub format: ProductFormat,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use printwise_core::Money;

    #[test]
    fn test_preview_amounts() {
        let response = PreviewResponse::from(PriceQuote {
            unit_price: Money::from_cents(640),
            total_price: Money::from_cents(384_000),
            finishing_ids: vec![FinishingId(2), FinishingId(5)],
        });

        assert_eq!(response.unit_price, "6.40");
        assert_eq!(response.total_price, "3840.00");
        assert_eq!(response.formatted_total_price, "3.840,00 €");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["finishing_ids"], serde_json::json!([2, 5]));
    }
}
