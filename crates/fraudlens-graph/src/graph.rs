//! Directed transaction multigraph.

use fraudlens_core::Transaction;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Directed multigraph over accounts.
///
/// Per-account adjacency keeps transactions in insertion order; callers
/// that need temporal order use the `*_sorted` accessors, which sort on
/// demand. Every transaction appears exactly once in its sender's
/// outgoing list and exactly once in its receiver's incoming list;
/// self-loops land in both lists of the same account. Lists are never
/// deduplicated.
#[derive(Debug, Default)]
pub struct TransactionGraph {
    outgoing: HashMap<String, Vec<Arc<Transaction>>>,
    incoming: HashMap<String, Vec<Arc<Transaction>>>,
    by_id: HashMap<String, Arc<Transaction>>,
    /// Sorted union of senders and receivers; fixes iteration order for
    /// every downstream scan so runs are reproducible.
    accounts: Vec<String>,
}

impl TransactionGraph {
    /// Build the graph from a validated batch.
    #[must_use]
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut outgoing: HashMap<String, Vec<Arc<Transaction>>> = HashMap::new();
        let mut incoming: HashMap<String, Vec<Arc<Transaction>>> = HashMap::new();
        let mut by_id = HashMap::with_capacity(transactions.len());
        let mut account_set = HashSet::new();

        for tx in transactions {
            let tx = Arc::new(tx.clone());
            account_set.insert(tx.sender_id.clone());
            account_set.insert(tx.receiver_id.clone());
            outgoing
                .entry(tx.sender_id.clone())
                .or_default()
                .push(Arc::clone(&tx));
            incoming
                .entry(tx.receiver_id.clone())
                .or_default()
                .push(Arc::clone(&tx));
            by_id.insert(tx.transaction_id.clone(), tx);
        }

        let mut accounts: Vec<String> = account_set.into_iter().collect();
        accounts.sort_unstable();

        Self {
            outgoing,
            incoming,
            by_id,
            accounts,
        }
    }

    /// All account ids, sorted ascending.
    #[must_use]
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// Number of distinct accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.by_id.len()
    }

    /// Outgoing transactions of an account, insertion order.
    #[must_use]
    pub fn outgoing(&self, account: &str) -> &[Arc<Transaction>] {
        self.outgoing.get(account).map_or(&[], Vec::as_slice)
    }

    /// Incoming transactions of an account, insertion order.
    #[must_use]
    pub fn incoming(&self, account: &str) -> &[Arc<Transaction>] {
        self.incoming.get(account).map_or(&[], Vec::as_slice)
    }

    /// Outgoing transactions sorted by timestamp.
    #[must_use]
    pub fn outgoing_sorted(&self, account: &str) -> Vec<Arc<Transaction>> {
        let mut txs: Vec<_> = self.outgoing(account).to_vec();
        txs.sort_by_key(|tx| tx.timestamp_ms);
        txs
    }

    /// Incoming transactions sorted by timestamp.
    #[must_use]
    pub fn incoming_sorted(&self, account: &str) -> Vec<Arc<Transaction>> {
        let mut txs: Vec<_> = self.incoming(account).to_vec();
        txs.sort_by_key(|tx| tx.timestamp_ms);
        txs
    }

    /// Combined incoming and outgoing transactions sorted by timestamp.
    ///
    /// A self-loop appears twice, once per direction, matching the
    /// adjacency invariant.
    #[must_use]
    pub fn merged_timeline(&self, account: &str) -> Vec<Arc<Transaction>> {
        let mut txs: Vec<_> = self
            .outgoing(account)
            .iter()
            .chain(self.incoming(account))
            .cloned()
            .collect();
        txs.sort_by_key(|tx| tx.timestamp_ms);
        txs
    }

    /// Combined degree: outgoing count + incoming count.
    #[must_use]
    pub fn degree(&self, account: &str) -> usize {
        self.outgoing(account).len() + self.incoming(account).len()
    }

    /// Look up a transaction by id.
    #[must_use]
    pub fn transaction(&self, transaction_id: &str) -> Option<&Arc<Transaction>> {
        self.by_id.get(transaction_id)
    }

    /// Iterate over every transaction once, in unspecified order.
    pub fn transactions(&self) -> impl Iterator<Item = &Arc<Transaction>> {
        self.by_id.values()
    }

    /// Iterate over every transaction once, in a reproducible order
    /// (senders ascending, then batch order). Float accumulations over
    /// the whole batch use this so repeated runs agree bit-for-bit.
    pub fn transactions_ordered(&self) -> impl Iterator<Item = &Arc<Transaction>> {
        self.accounts.iter().flat_map(|account| self.outgoing(account))
    }

    /// Distinct counterparties of an account across both directions.
    #[must_use]
    pub fn unique_counterparties(&self, account: &str) -> HashSet<&str> {
        let mut parties = HashSet::new();
        for tx in self.outgoing(account) {
            parties.insert(tx.receiver_id.as_str());
        }
        for tx in self.incoming(account) {
            parties.insert(tx.sender_id.as_str());
        }
        parties
    }

    /// Transaction count per counterparty across both directions.
    #[must_use]
    pub fn counterparty_counts(&self, account: &str) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tx in self.outgoing(account) {
            *counts.entry(tx.receiver_id.as_str()).or_default() += 1;
        }
        for tx in self.incoming(account) {
            *counts.entry(tx.sender_id.as_str()).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, from: &str, to: &str, amount: f64, ts: i64) -> Transaction {
        Transaction::new(id, from, to, amount, ts)
    }

    #[test]
    fn test_adjacency_invariant() {
        let graph = TransactionGraph::from_transactions(&[
            tx("t1", "A", "B", 100.0, 10),
            tx("t2", "B", "C", 100.0, 20),
            tx("t3", "A", "C", 100.0, 30),
        ]);

        assert_eq!(graph.account_count(), 3);
        assert_eq!(graph.transaction_count(), 3);
        assert_eq!(graph.outgoing("A").len(), 2);
        assert_eq!(graph.incoming("A").len(), 0);
        assert_eq!(graph.incoming("C").len(), 2);
        assert_eq!(graph.degree("B"), 2);
        assert!(graph.transaction("t2").is_some());
        assert!(graph.transaction("missing").is_none());
    }

    #[test]
    fn test_accounts_sorted() {
        let graph = TransactionGraph::from_transactions(&[
            tx("t1", "Z", "M", 1.0, 0),
            tx("t2", "A", "Z", 1.0, 0),
        ]);
        assert_eq!(graph.accounts(), &["A", "M", "Z"]);
    }

    #[test]
    fn test_self_loop_in_both_lists() {
        let graph = TransactionGraph::from_transactions(&[tx("t1", "A", "A", 5.0, 0)]);
        assert_eq!(graph.outgoing("A").len(), 1);
        assert_eq!(graph.incoming("A").len(), 1);
        assert_eq!(graph.degree("A"), 2);
        assert_eq!(graph.merged_timeline("A").len(), 2);
    }

    #[test]
    fn test_multi_edges_retained() {
        let graph = TransactionGraph::from_transactions(&[
            tx("t1", "A", "B", 5.0, 2),
            tx("t2", "A", "B", 5.0, 1),
        ]);
        assert_eq!(graph.outgoing("A").len(), 2);
        let sorted = graph.outgoing_sorted("A");
        assert_eq!(sorted[0].transaction_id, "t2");
        assert_eq!(sorted[1].transaction_id, "t1");
    }

    #[test]
    fn test_counterparties() {
        let graph = TransactionGraph::from_transactions(&[
            tx("t1", "A", "B", 5.0, 0),
            tx("t2", "A", "B", 5.0, 1),
            tx("t3", "C", "A", 5.0, 2),
        ]);
        let parties = graph.unique_counterparties("A");
        assert_eq!(parties.len(), 2);
        assert_eq!(graph.counterparty_counts("A")["B"], 2);
    }

    #[test]
    fn test_unknown_account_is_empty() {
        let graph = TransactionGraph::from_transactions(&[tx("t1", "A", "B", 1.0, 0)]);
        assert!(graph.outgoing("X").is_empty());
        assert!(graph.incoming("X").is_empty());
        assert_eq!(graph.degree("X"), 0);
    }
}
