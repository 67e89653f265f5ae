use std::sync::Arc;
use std::time::Duration;

use super::monthly_report::{run_monthly_batch, BatchMode};
use super::store::DreamStore;
use crate::month::MonthKey;
use crate::strategy::ClassificationStrategy;

/// Month whose batch is due, if it has not run yet.
fn due_month(last_run: Option<MonthKey>, now: MonthKey) -> Option<MonthKey> {
    let target = now.months_back(1);
    (last_run != Some(target)).then_some(target)
}

/// Runs the previous month's report batch once per calendar month.
///
/// `last_run` is process-local, so a restart or a second replica runs the
/// month again. Those runs use `BatchMode::MissingOnly` and only fill in
/// users without a stored report.
pub fn spawn_monthly_report_worker(
    store: Arc<dyn DreamStore>,
    strategy: ClassificationStrategy,
    interval_secs: u64,
    concurrency: usize,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(60)));
        let mut last_run: Option<MonthKey> = None;
        loop {
            interval.tick().await;
            let Some(month) = due_month(last_run, MonthKey::current()) else {
                continue;
            };
            let result = run_monthly_batch(
                store.as_ref(),
                &strategy,
                month,
                concurrency,
                BatchMode::MissingOnly,
            )
            .await;
            match result {
                Ok(summary) => {
                    last_run = Some(month);
                    if summary.failed > 0 {
                        tracing::warn!(%month, failed = summary.failed, "Report worker: batch had failures");
                    }
                }
                Err(e) => {
                    tracing::error!(%month, error = %e, "Report worker error");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_month_runs_once() {
        let march: MonthKey = "2026-03".parse().unwrap();
        let feb: MonthKey = "2026-02".parse().unwrap();
        assert_eq!(due_month(None, march), Some(feb));
        assert_eq!(due_month(Some(feb), march), None);
        assert_eq!(due_month(Some(feb), "2026-04".parse().unwrap()), Some(march));
    }
}
