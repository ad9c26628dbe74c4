use crate::domain::entities::SyncReport;
use crate::domain::value_objects::SyncTrigger;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub total_passes: u64,
    pub total_synced: u64,
    pub total_retried: u64,
    pub total_failed: u64,
    /// Passes in a row that ended with at least one failed item or an abort.
    pub consecutive_failures: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_outcome: Option<PassOutcome>,
    pub last_trigger: Option<SyncTrigger>,
    pub last_duration_ms: Option<u64>,
}

#[derive(Default, Clone)]
struct LastPass {
    outcome: Option<PassOutcome>,
    trigger: Option<SyncTrigger>,
    duration_ms: Option<u64>,
}

pub(crate) struct SyncMetrics {
    passes: AtomicU64,
    synced: AtomicU64,
    retried: AtomicU64,
    failed: AtomicU64,
    consecutive_failures: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    last: Mutex<LastPass>,
}

impl SyncMetrics {
    pub(crate) fn new() -> Self {
        Self {
            passes: AtomicU64::new(0),
            synced: AtomicU64::new(0),
            retried: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            consecutive_failures: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            last: Mutex::new(LastPass::default()),
        }
    }

    pub(crate) fn record(&self, report: &SyncReport, aborted: bool) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.synced
            .fetch_add(u64::from(report.synced), Ordering::Relaxed);
        self.retried
            .fetch_add(u64::from(report.retried), Ordering::Relaxed);
        self.failed
            .fetch_add(u64::from(report.failed), Ordering::Relaxed);

        let finished_ms = report.finished_at.timestamp_millis().max(0) as u64;
        let outcome = if aborted || report.has_failures() {
            self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
            self.last_failure_ms.store(finished_ms, Ordering::Relaxed);
            PassOutcome::Failure
        } else {
            self.consecutive_failures.store(0, Ordering::Relaxed);
            self.last_success_ms.store(finished_ms, Ordering::Relaxed);
            PassOutcome::Success
        };

        if let Ok(mut guard) = self.last.lock() {
            guard.outcome = Some(outcome);
            guard.trigger = Some(report.trigger);
            guard.duration_ms = Some(report.duration_ms());
        }
    }

    pub(crate) fn snapshot(&self) -> SyncMetricsSnapshot {
        let last = self
            .last
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        SyncMetricsSnapshot {
            total_passes: self.passes.load(Ordering::Relaxed),
            total_synced: self.synced.load(Ordering::Relaxed),
            total_retried: self.retried.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
            last_success_ms: to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: to_option(self.last_failure_ms.load(Ordering::Relaxed)),
            last_outcome: last.outcome,
            last_trigger: last.trigger,
            last_duration_ms: last.duration_ms,
        }
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn report(synced: u32, failed: u32) -> SyncReport {
        let mut report = SyncReport::new(SyncTrigger::Manual, Utc::now());
        report.synced = synced;
        report.failed = failed;
        report.finished_at = report.started_at + Duration::milliseconds(40);
        report
    }

    #[test]
    fn record_success_and_failure() {
        let metrics = SyncMetrics::new();

        metrics.record(&report(2, 0), false);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_passes, 1);
        assert_eq!(snapshot.total_synced, 2);
        assert_eq!(snapshot.last_outcome, Some(PassOutcome::Success));
        assert_eq!(snapshot.last_duration_ms, Some(40));
        assert!(snapshot.last_success_ms.is_some());

        metrics.record(&report(0, 1), false);
        metrics.record(&report(0, 0), true);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_passes, 3);
        assert_eq!(snapshot.total_failed, 1);
        assert_eq!(snapshot.consecutive_failures, 2);
        assert_eq!(snapshot.last_outcome, Some(PassOutcome::Failure));

        metrics.record(&report(1, 0), false);
        assert_eq!(metrics.snapshot().consecutive_failures, 0);
    }
}
