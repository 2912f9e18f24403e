use std::future::Future;

use crate::error::{DhtError, Result};

/// Per-target outcome of a best-effort fan-out.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, DhtError)>,
}

impl FanOutReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// One line per failed target at `warn`, then a summary at `info`.
    pub fn log(&self, what: &str) {
        for (target, err) in &self.failed {
            tracing::warn!("[{}] {} skipped: {}", what, target, err);
        }
        tracing::info!(
            "[{}] {}/{} targets acknowledged",
            what,
            self.succeeded.len(),
            self.attempted()
        );
    }
}

/// Invokes `op` on every target in order, one call in flight at a time.
///
/// A failed target is recorded and the batch continues; the batch itself never fails.
pub async fn fan_out<T, F, Fut>(targets: Vec<(String, T)>, mut op: F) -> FanOutReport
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut report = FanOutReport::default();

    for (label, target) in targets {
        match op(target).await {
            Ok(()) => report.succeeded.push(label),
            Err(e) => report.failed.push((label, e)),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_continues_past_failures() {
        let targets = vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 3),
        ];

        let report = fan_out(targets, |n| async move {
            if n == 2 {
                Err(DhtError::connection("127.0.0.1:1", "refused"))
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(report.succeeded, vec!["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(!report.all_succeeded());
        assert_eq!(report.attempted(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_empty() {
        let report = fan_out(Vec::<(String, ())>::new(), |_| async { Ok(()) }).await;

        assert!(report.all_succeeded());
        assert_eq!(report.attempted(), 0);
    }
}
