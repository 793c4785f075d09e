// src/services/product_resolver.rs
//
// Product Resolver - tiered product-metadata lookup
//
// CRITICAL RULES:
// - Never fails: every outcome is a ProductQueryResult
// - Mirrors are tried strictly in order, one at a time
// - Each attempt is bounded by the configured timeout
// - A malformed barcode never reaches the network

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::ProductQueryConfig;
use crate::domain::{validate_barcode, ProductQueryResult, ProductSource};
use crate::error::AppError;
use crate::events::{EventBus, ProductQueryCompleted};
use crate::integrations::openfoodfacts::{parse_product_response, product_url};
use crate::integrations::JsonFetcher;

pub const INVALID_FORMAT_MESSAGE: &str = "invalid format";
pub const NOT_FOUND_MESSAGE: &str = "product not found";
pub const TIMEOUT_MESSAGE: &str = "request timed out";
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Observable lookup state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverState {
    pub loading: bool,
    pub result: Option<ProductQueryResult>,
    pub error: Option<String>,
}

pub struct ProductResolver {
    fetcher: Arc<dyn JsonFetcher>,
    endpoints: Vec<String>,
    timeout: Duration,
    event_bus: Arc<EventBus>,
    state: watch::Sender<ResolverState>,
}

impl ProductResolver {
    pub fn new(
        fetcher: Arc<dyn JsonFetcher>,
        config: &ProductQueryConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let (state, _) = watch::channel(ResolverState::default());

        Self {
            fetcher,
            endpoints: config.endpoints.clone(),
            timeout: config.timeout(),
            event_bus,
            state,
        }
    }

    /// Look up `barcode`
    pub async fn query(&self, barcode: &str) -> ProductQueryResult {
        self.query_with_cancel(barcode, &CancellationToken::new()).await
    }

    /// Look up `barcode`; cancelling `cancel` abandons the remaining attempts
    pub async fn query_with_cancel(
        &self,
        barcode: &str,
        cancel: &CancellationToken,
    ) -> ProductQueryResult {
        if let Err(e) = validate_barcode(barcode) {
            log::debug!("Skipping product lookup: {}", e);
            let result = ProductQueryResult::not_found(
                ProductSource::Unknown,
                Some(INVALID_FORMAT_MESSAGE.to_string()),
            );
            self.settle(&result);
            return result;
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.resolve(barcode, cancel).await;

        log::info!(
            "Product lookup for {}: found={} error={:?}",
            barcode,
            result.found,
            result.error
        );
        self.settle(&result);
        self.event_bus.emit(ProductQueryCompleted::new(
            barcode.to_string(),
            result.found,
            result.source,
            result.error.clone(),
        ));

        result
    }

    async fn resolve(&self, barcode: &str, cancel: &CancellationToken) -> ProductQueryResult {
        let mut last_error: Option<String> = None;

        for mirror in &self.endpoints {
            let url = product_url(mirror, barcode);
            log::debug!("Querying {}", url);

            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    last_error = Some(CANCELLED_MESSAGE.to_string());
                    break;
                }
                attempt = tokio::time::timeout(self.timeout, self.fetcher.get_json(&url)) => attempt,
            };

            let body = match attempt {
                Err(_elapsed) => Err(TIMEOUT_MESSAGE.to_string()),
                Ok(Err(e)) => Err(describe_failure(&e)),
                Ok(Ok(body)) => Ok(body),
            };

            let outcome = body.and_then(|body| match parse_product_response(body) {
                Ok(Some(product)) => Ok(product),
                Ok(None) => Err(NOT_FOUND_MESSAGE.to_string()),
                Err(e) => Err(describe_failure(&e)),
            });

            match outcome {
                Ok(product) => {
                    return ProductQueryResult::found(product, ProductSource::OpenFoodFacts);
                }
                Err(message) => {
                    log::warn!("Product lookup via {} failed: {}", mirror, message);
                    last_error = Some(message);
                }
            }
        }

        ProductQueryResult::not_found(ProductSource::OpenFoodFacts, last_error)
    }

    fn settle(&self, result: &ProductQueryResult) {
        self.state.send_replace(ResolverState {
            loading: false,
            result: Some(result.clone()),
            error: result.error.clone(),
        });
    }

    /// Forget the last lookup
    pub fn clear(&self) {
        self.state.send_replace(ResolverState::default());
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_result(&self) -> Option<ProductQueryResult> {
        self.state.borrow().result.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolverState> {
        self.state.subscribe()
    }
}

/// Short, user-facing reason for a failed attempt
fn describe_failure(error: &AppError) -> String {
    match error {
        AppError::Http(message) => message.clone(),
        AppError::Timeout => TIMEOUT_MESSAGE.to_string(),
        AppError::Serialization(e) => e.to_string(),
        other => other.to_string(),
    }
}
