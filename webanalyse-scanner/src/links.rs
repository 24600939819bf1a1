use crate::classifier::{LinkClass, page_host, try_classify};
use crate::pool::{TaskId, WorkerPool};
use crate::prober::Prober;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector is valid"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounters {
    pub internal: usize,
    pub external: usize,
    pub inaccessible: usize,
}

/// Raw `href` strings already handled in one analysis run.
///
/// Matching is exact: `/about` and `/about/` are different references.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, reference: &str) -> bool {
        self.seen.contains(reference)
    }

    pub fn mark_seen(&mut self, reference: &str) {
        self.seen.insert(reference.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Walks anchors, counts internal and external links, and hands external
/// ones to the worker pool for probing.
///
/// Counters and the dedup set are only touched by the scanning caller;
/// workers report back exclusively through the pool.
pub struct LinkAggregator {
    page_host: String,
    dedup: Deduplicator,
    counters: LinkCounters,
    pending: HashMap<TaskId, String>,
    probe_timeout: Duration,
}

impl LinkAggregator {
    pub fn new(page_url: &str, probe_timeout: Duration) -> Self {
        Self {
            page_host: page_host(page_url),
            dedup: Deduplicator::new(),
            counters: LinkCounters::default(),
            pending: HashMap::new(),
            probe_timeout,
        }
    }

    pub fn counters(&self) -> LinkCounters {
        self.counters
    }

    /// Feeds a single raw reference through dedup and classification.
    pub fn observe(
        &mut self,
        reference: &str,
        pool: &mut WorkerPool<bool>,
        prober: &Prober,
    ) -> Option<LinkClass> {
        if self.dedup.seen(reference) {
            return None;
        }
        self.dedup.mark_seen(reference);

        let class = match try_classify(&self.page_host, reference) {
            Ok(class) => class,
            Err(e) => {
                warn!("Invalid url: {} ({})", reference, e);
                return Some(LinkClass::Ignored);
            }
        };

        match class {
            LinkClass::Internal => self.counters.internal += 1,
            LinkClass::External => {
                self.counters.external += 1;
                let prober = prober.clone();
                let url = reference.to_string();
                let timeout = self.probe_timeout;
                match pool.submit(async move { prober.probe(&url, timeout).await }) {
                    Ok(id) => {
                        self.pending.insert(id, reference.to_string());
                    }
                    Err(e) => warn!("Could not queue probe for {}: {}", reference, e),
                }
            }
            LinkClass::Ignored => debug!("Ignoring reference: {}", reference),
        }

        Some(class)
    }

    /// Scans every anchor of `document` in document order. Anchors without an
    /// `href` are skipped.
    pub fn scan(&mut self, document: &Html, pool: &mut WorkerPool<bool>, prober: &Prober) {
        for element in document.select(&ANCHOR_SELECTOR) {
            if let Some(href) = element.value().attr("href") {
                self.observe(href, pool, prober);
            }
        }
        debug!(
            "Scanned {} distinct references, {} probes queued",
            self.dedup.len(),
            self.pending.len()
        );
    }

    /// Waits for every queued probe and folds the outcomes into the counters.
    /// Probes whose task failed count neither as accessible nor inaccessible.
    pub async fn collect(mut self, pool: &mut WorkerPool<bool>) -> LinkCounters {
        for outcome in pool.drain_all().await {
            let reference = self.pending.remove(&outcome.id).unwrap_or_default();
            match outcome.result {
                Ok(true) => {}
                Ok(false) => self.counters.inaccessible += 1,
                Err(e) => warn!("Probe task for {} failed: {}", reference, e),
            }
        }

        for reference in self.pending.values() {
            warn!("No probe result for {}", reference);
        }

        info!(
            "Links: {} internal, {} external, {} inaccessible",
            self.counters.internal, self.counters.external, self.counters.inaccessible
        );
        self.counters
    }
}

/// One link pass with its own pool. [`LinkScan::start`] needs the parsed
/// document; [`LinkScan::finish`] does not, so the document can be dropped
/// before awaiting the probes.
pub struct LinkScan {
    aggregator: LinkAggregator,
    pool: WorkerPool<bool>,
}

impl LinkScan {
    /// Creates a pool of `workers` and classifies every anchor of `document`,
    /// queueing probes for the external ones.
    pub fn start(
        document: &Html,
        page_url: &str,
        prober: &Prober,
        probe_timeout: Duration,
        workers: usize,
    ) -> Self {
        let mut pool = WorkerPool::new(workers);
        let mut aggregator = LinkAggregator::new(page_url, probe_timeout);
        aggregator.scan(document, &mut pool, prober);
        Self { aggregator, pool }
    }

    /// Waits for the probes, then shuts the pool down.
    pub async fn finish(self) -> LinkCounters {
        let Self {
            aggregator,
            mut pool,
        } = self;
        let counters = aggregator.collect(&mut pool).await;
        if let Err(e) = pool.shutdown().await {
            warn!("Worker pool shutdown failed: {}", e);
        }
        counters
    }
}

/// Classifies and probes every anchor of `document`, using a fresh pool of
/// `workers` that is shut down before returning.
pub async fn aggregate(
    document: &Html,
    page_url: &str,
    prober: &Prober,
    probe_timeout: Duration,
    workers: usize,
) -> LinkCounters {
    LinkScan::start(document, page_url, prober, probe_timeout, workers)
        .finish()
        .await
}
