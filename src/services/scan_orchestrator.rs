// src/services/scan_orchestrator.rs
//
// Scan Orchestrator - scan + conditional product lookup + history
//
// FLOW:
// 1. Clear the previous lookup state; the published result stays until the
//    new scan publishes, so a rejected call leaves it alone
// 2. Delegate to ScanEngine for the raw ScanResult
// 3. Publish phase one (scan known, lookup pending)
// 4. Look the product up when auto-query is on and the code is retail-shaped
// 5. Phase two flips product_query_done; that moment, and only that moment,
//    inserts the result into history and wakes the waiting caller

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::domain::{BarcodeScanResult, ProductInfo, ScanError, ScanHistory, ScanResult};
use crate::events::{BarcodeScanCompleted, EventBus, HistoryCleared};
use crate::integrations::ImageInput;
use crate::services::product_resolver::ProductResolver;
use crate::services::scan_backend::lock;
use crate::services::scan_engine::ScanEngine;

/// Published composite result, tagged with the scan it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedResult {
    pub id: u64,
    pub result: BarcodeScanResult,
}

/// State shared with background lookup tasks
struct Shared {
    published: watch::Sender<Option<TrackedResult>>,
    history: Mutex<ScanHistory>,
    generation: AtomicU64,
    event_bus: Arc<EventBus>,
}

impl Shared {
    fn publish(&self, id: u64, result: &BarcodeScanResult) {
        self.published.send_if_modified(|current| {
            // A clear() or newer scan since `id` started wins
            if self.generation.load(Ordering::SeqCst) != id {
                return false;
            }
            *current = Some(TrackedResult {
                id,
                result: result.clone(),
            });
            true
        });
    }

    /// Phase two. The single place a result enters history.
    fn complete(
        &self,
        id: u64,
        mut result: BarcodeScanResult,
        product: Option<ProductInfo>,
    ) -> BarcodeScanResult {
        result.complete(product);

        let history_len = {
            let mut history = lock(&self.history);
            history.push(result.clone());
            history.len()
        };

        self.publish(id, &result);
        self.event_bus.emit(BarcodeScanCompleted::new(
            result.scan.content.clone(),
            result.is_product_barcode,
            result.product.is_some(),
            history_len,
        ));

        result
    }
}

pub struct ScanOrchestrator {
    engine: Arc<ScanEngine>,
    resolver: Arc<ProductResolver>,
    shared: Arc<Shared>,
    auto_query: AtomicBool,
    /// Cancelled on drop so background lookups do not outlive the orchestrator
    lookups: CancellationToken,
}

impl ScanOrchestrator {
    pub fn new(
        engine: Arc<ScanEngine>,
        resolver: Arc<ProductResolver>,
        event_bus: Arc<EventBus>,
        max_history: usize,
        auto_query: bool,
    ) -> Self {
        let (published, _) = watch::channel(None);

        Self {
            engine,
            resolver,
            shared: Arc::new(Shared {
                published,
                history: Mutex::new(ScanHistory::new(max_history)),
                generation: AtomicU64::new(0),
                event_bus,
            }),
            auto_query: AtomicBool::new(auto_query),
            lookups: CancellationToken::new(),
        }
    }

    /// Live scan, then product lookup when applicable
    pub async fn start_scan(&self) -> Result<BarcodeScanResult, ScanError> {
        self.resolver.clear();
        let scan = self.engine.start_scan().await?;
        Ok(self.compose(scan).await)
    }

    /// Still-image scan, then product lookup when applicable
    pub async fn scan_from_image(
        &self,
        input: Option<ImageInput>,
    ) -> Result<BarcodeScanResult, ScanError> {
        self.resolver.clear();
        let scan = self.engine.scan_from_image(input).await?;
        Ok(self.compose(scan).await)
    }

    async fn compose(&self, scan: ScanResult) -> BarcodeScanResult {
        let id = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let pending = BarcodeScanResult::pending(scan);
        self.shared.publish(id, &pending);

        if !(self.auto_query() && pending.is_product_barcode) {
            return self.shared.complete(id, pending, None);
        }

        let (done_tx, done_rx) = oneshot::channel();
        let resolver = Arc::clone(&self.resolver);
        let shared = Arc::clone(&self.shared);
        let cancel = self.lookups.child_token();
        let barcode = pending.scan.content.clone();
        let fallback = pending.clone();

        tokio::spawn(async move {
            let lookup = resolver.query_with_cancel(&barcode, &cancel).await;
            let completed = shared.complete(id, pending, lookup.product);
            // The caller may have gone away; history already has the result
            let _ = done_tx.send(completed);
        });

        match done_rx.await {
            Ok(completed) => completed,
            Err(_) => {
                log::error!("Product lookup task for scan {} ended without completing", id);
                self.shared.complete(id, fallback, None)
            }
        }
    }

    /// Reset the composite result and the resolver. History is untouched.
    pub fn clear(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.published.send_replace(None);
        self.resolver.clear();
    }

    pub fn clear_history(&self) {
        let removed = {
            let mut history = lock(&self.shared.history);
            let removed = history.len();
            history.clear();
            removed
        };

        log::info!("Scan history cleared ({} entries)", removed);
        self.shared.event_bus.emit(HistoryCleared::new(removed));
    }

    /// Newest first
    pub fn history(&self) -> Vec<BarcodeScanResult> {
        lock(&self.shared.history).to_vec()
    }

    pub fn current(&self) -> Option<BarcodeScanResult> {
        self.shared
            .published
            .borrow()
            .as_ref()
            .map(|t| t.result.clone())
    }

    /// Phase-one and phase-two notifications
    pub fn subscribe(&self) -> watch::Receiver<Option<TrackedResult>> {
        self.shared.published.subscribe()
    }

    pub fn auto_query(&self) -> bool {
        self.auto_query.load(Ordering::SeqCst)
    }

    pub fn set_auto_query(&self, enabled: bool) {
        self.auto_query.store(enabled, Ordering::SeqCst);
    }

    pub fn engine(&self) -> &Arc<ScanEngine> {
        &self.engine
    }

    pub fn resolver(&self) -> &Arc<ProductResolver> {
        &self.resolver
    }
}

impl Drop for ScanOrchestrator {
    fn drop(&mut self) {
        self.lookups.cancel();
    }
}
