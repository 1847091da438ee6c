//! Run options shared by every orchestrator

use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

/// Knobs common to reconcile, audit and batch runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Report planned mutations without issuing them
    #[serde(default)]
    pub dry_run: bool,
    /// Maximum number of per-item calls in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    1
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: default_concurrency(),
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable check mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the fan-out width; zero is treated as one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Run `f` over `items` with at most `concurrency` futures in flight,
/// returning outputs in input order.
pub(crate) fn map_ordered<'a, I, T, F, Fut>(
    items: I,
    concurrency: usize,
    f: F,
) -> BoxFuture<'a, Vec<T>>
where
    I: IntoIterator + 'a,
    I::IntoIter: Send + 'a,
    F: FnMut(I::Item) -> Fut + Send + 'a,
    Fut: Future<Output = T> + Send + 'a,
    T: Send + 'a,
{
    stream::iter(items)
        .map(f)
        .buffered(concurrency.max(1))
        .collect()
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let options = RunOptions::default();
        assert!(!options.dry_run);
        assert_eq!(options.concurrency, 1);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        assert_eq!(RunOptions::new().with_concurrency(0).concurrency, 1);
    }

    #[tokio::test]
    async fn test_map_ordered_keeps_input_order() {
        // later items finish first
        let out = map_ordered(vec![30u64, 20, 10, 0], 4, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            ms
        })
        .await;
        assert_eq!(out, vec![30, 20, 10, 0]);
    }
}
