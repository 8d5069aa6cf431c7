//! # Fraudlens Graph
//!
//! Graph substrate for the analysis engine:
//! - [`TransactionGraph`](graph::TransactionGraph) - directed multigraph over accounts
//! - [`GraphStats`](stats::GraphStats) - one-pass global statistics cache
//! - [`WeightedProjection`](projection::WeightedProjection) - undirected weighted projection
//! - [`louvain`] - simplified Louvain community detection and smurfing analysis
//!
//! Everything here is built once per analysis and read-only afterwards,
//! so detectors can scan concurrently without locking.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod louvain;
pub mod projection;
pub mod stats;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::graph::TransactionGraph;
    pub use crate::louvain::{CommunityAnalysis, LouvainCommunities, SmurfingClass};
    pub use crate::projection::WeightedProjection;
    pub use crate::stats::GraphStats;
}

pub use graph::TransactionGraph;
pub use louvain::{CommunityAnalysis, LouvainCommunities, SmurfingClass};
pub use projection::WeightedProjection;
pub use stats::GraphStats;
