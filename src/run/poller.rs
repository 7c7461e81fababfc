use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::broker::{self, Broker};
use crate::error::PollError;
use crate::model::expiry::ResolvedExpiry;
use crate::model::index::Index;
use crate::model::quote::QuoteSnapshot;
use crate::premium::{self, PremiumTable};
use crate::render::{self, CycleOutput};
use crate::strikes;

use super::sink::RenderSink;

/// How the indices of one cycle are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// One task per index, all awaited before rendering.
    Parallel,
    /// A single index, awaited before anything else starts.
    Sequential,
}

impl PollMode {
    pub fn for_count(indices: usize) -> Self {
        if indices > 1 {
            PollMode::Parallel
        } else {
            PollMode::Sequential
        }
    }
}

/// Everything produced for one index in one cycle.
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub quotes: QuoteSnapshot,
    pub table: PremiumTable,
    pub html: String,
}

pub type CycleResults = BTreeMap<Index, Result<IndexReport, PollError>>;

type Workers = JoinSet<(Index, Result<IndexReport, PollError>)>;

/// Fetch, compute and render one index.
pub async fn process_index<B: Broker + ?Sized>(
    broker: &B,
    index: Index,
    expiry: &ResolvedExpiry,
) -> Result<IndexReport, PollError> {
    let quotes = broker::fetch_snapshot(broker, index, expiry).await?;
    let window = strikes::select(index, quotes.spot);
    let table = premium::compute(index, quotes.spot, &window, &quotes.chain)?;
    let html = render::fragment(&table, &quotes);
    Ok(IndexReport {
        quotes,
        table,
        html,
    })
}

/// Resolves once the cancel flag is raised. Never resolves if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub struct Poller<B: Broker + 'static> {
    broker: Arc<B>,
    plan: BTreeMap<Index, ResolvedExpiry>,
    mode: PollMode,
    interval: Duration,
}

impl<B: Broker + 'static> Poller<B> {
    pub fn new(broker: Arc<B>, plan: BTreeMap<Index, ResolvedExpiry>) -> Self {
        let mode = PollMode::for_count(plan.len());
        Poller {
            broker,
            plan,
            mode,
            interval: Duration::ZERO,
        }
    }

    /// Pause between the end of one cycle and the start of the next.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    fn spawn_worker(&self, workers: &mut Workers, index: Index, expiry: &ResolvedExpiry) {
        let broker = Arc::clone(&self.broker);
        let expiry = expiry.clone();
        workers.spawn(async move {
            let result = process_index(broker.as_ref(), index, &expiry).await;
            (index, result)
        });
    }

    async fn drain(workers: &mut Workers, results: &mut CycleResults) {
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, result)) => {
                    results.insert(index, result);
                }
                Err(e) => warn!(error = %e, "worker failed"),
            }
        }
    }

    /// Run every index once, tracking the workers in `workers`.
    ///
    /// Every index runs as its own task, so a panic is contained in both
    /// modes. Sequential mode waits for each task before spawning the next.
    async fn cycle_in(&self, workers: &mut Workers) -> CycleResults {
        let mut results = CycleResults::new();

        match self.mode {
            PollMode::Sequential => {
                for (&index, expiry) in &self.plan {
                    self.spawn_worker(workers, index, expiry);
                    Self::drain(workers, &mut results).await;
                }
            }
            PollMode::Parallel => {
                for (&index, expiry) in &self.plan {
                    self.spawn_worker(workers, index, expiry);
                }
                Self::drain(workers, &mut results).await;
            }
        }

        // A worker that panicked never reported back.
        for &index in self.plan.keys() {
            results
                .entry(index)
                .or_insert(Err(PollError::WorkerPanicked(index)));
        }
        results
    }

    /// Run every index once and collect the results.
    pub async fn cycle(&self) -> CycleResults {
        let mut workers = Workers::new();
        self.cycle_in(&mut workers).await
    }

    /// Poll until `cycles` have completed or `cancel` is raised.
    ///
    /// Returns the number of completed cycles, or `PollError::Interrupted` if
    /// cancelled. On cancel every outstanding worker is aborted and reaped
    /// before returning.
    pub async fn run(
        &self,
        sink: &mut dyn RenderSink,
        cycles: Option<u64>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<u64, PollError> {
        let mut completed = 0u64;
        let mut workers = Workers::new();

        loop {
            if cycles.is_some_and(|max| completed >= max) {
                return Ok(completed);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => None,
                results = self.cycle_in(&mut workers) => Some(results),
            };
            let Some(results) = outcome else {
                workers.abort_all();
                while workers.join_next().await.is_some() {}
                return Err(PollError::Interrupted);
            };
            completed += 1;

            let output = summarize(completed, &results);
            if let Err(e) = sink.publish(&output) {
                warn!(error = ?e, "failed to publish cycle output");
            }

            if !self.interval.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel) => return Err(PollError::Interrupted),
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        }
    }
}

/// Log the cycle and reduce it to the rendered output.
pub fn summarize(cycle: u64, results: &CycleResults) -> CycleOutput {
    let mut output = CycleOutput::new();
    for (&index, result) in results {
        match result {
            Ok(report) => {
                let atm = &report.table.atm;
                info!(
                    cycle,
                    %index,
                    spot = report.quotes.spot,
                    futures = report.quotes.futures,
                    atm = report.table.reference,
                    ce_premium = atm.call_premium,
                    pe_premium = atm.put_premium,
                    difference = atm.difference,
                    "premiums updated"
                );
                output.insert(index, Some(report.html.clone()));
            }
            Err(e) => {
                warn!(cycle, %index, kind = ?e.kind(), error = %e, "no data this cycle");
                output.insert(index, None);
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_follows_index_count() {
        assert_eq!(PollMode::for_count(1), PollMode::Sequential);
        assert_eq!(PollMode::for_count(2), PollMode::Parallel);
        assert_eq!(PollMode::for_count(3), PollMode::Parallel);
    }
}
