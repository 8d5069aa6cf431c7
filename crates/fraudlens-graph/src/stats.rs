//! Global statistics cache.

use crate::graph::TransactionGraph;
use std::collections::HashMap;

/// One-pass aggregates over the whole batch.
///
/// Computed exactly once per analysis and read-only afterwards. Variance
/// uses the two-pass form to stay stable at high amount magnitudes.
#[derive(Debug, Clone)]
pub struct GraphStats {
    /// Mean transaction amount.
    pub amount_mean: f64,
    /// Population standard deviation of amounts.
    pub amount_stddev: f64,
    /// First quartile of amounts.
    pub amount_q1: f64,
    /// Median amount.
    pub amount_median: f64,
    /// Third quartile of amounts.
    pub amount_q3: f64,
    /// Total transactions in the batch.
    pub total_transactions: usize,
    /// Per-account combined (incoming + outgoing) transaction count.
    pub activity: HashMap<String, usize>,
    /// Earliest timestamp in the batch, epoch milliseconds.
    pub min_timestamp_ms: i64,
    /// Latest timestamp in the batch, epoch milliseconds.
    pub max_timestamp_ms: i64,
}

impl GraphStats {
    /// Compute the cache from a constructed graph.
    #[must_use]
    pub fn compute(graph: &TransactionGraph) -> Self {
        let mut amounts: Vec<f64> = Vec::with_capacity(graph.transaction_count());
        let mut min_ts = i64::MAX;
        let mut max_ts = i64::MIN;

        for tx in graph.transactions_ordered() {
            amounts.push(tx.amount);
            min_ts = min_ts.min(tx.timestamp_ms);
            max_ts = max_ts.max(tx.timestamp_ms);
        }

        let total = amounts.len();
        let mean = if total == 0 {
            0.0
        } else {
            amounts.iter().sum::<f64>() / total as f64
        };
        let stddev = if total == 0 {
            0.0
        } else {
            let var = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / total as f64;
            var.sqrt()
        };

        amounts.sort_by(|a, b| a.partial_cmp(b).expect("amounts are finite"));
        let quartile = |idx: usize| -> f64 {
            if amounts.is_empty() {
                0.0
            } else {
                amounts[idx.min(amounts.len() - 1)]
            }
        };
        let q1 = quartile(total / 4);
        let median = quartile(total / 2);
        let q3 = quartile(3 * total / 4);

        let mut activity = HashMap::with_capacity(graph.account_count());
        for account in graph.accounts() {
            activity.insert(account.clone(), graph.degree(account));
        }

        Self {
            amount_mean: mean,
            amount_stddev: stddev,
            amount_q1: q1,
            amount_median: median,
            amount_q3: q3,
            total_transactions: total,
            activity,
            min_timestamp_ms: if total == 0 { 0 } else { min_ts },
            max_timestamp_ms: if total == 0 { 0 } else { max_ts },
        }
    }

    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.amount_q3 - self.amount_q1
    }

    /// IQR outlier fences `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
    #[must_use]
    pub fn outlier_fences(&self) -> (f64, f64) {
        let iqr = self.iqr();
        (self.amount_q1 - 1.5 * iqr, self.amount_q3 + 1.5 * iqr)
    }

    /// Combined activity count of an account.
    #[must_use]
    pub fn activity_of(&self, account: &str) -> usize {
        self.activity.get(account).copied().unwrap_or(0)
    }

    /// Observed time span of the batch in milliseconds.
    #[must_use]
    pub fn span_ms(&self) -> i64 {
        self.max_timestamp_ms.saturating_sub(self.min_timestamp_ms)
    }
}
