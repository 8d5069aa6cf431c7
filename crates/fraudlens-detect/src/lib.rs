//! # Fraudlens Detect
//!
//! The pattern detector family. Each detector consumes the immutable
//! transaction graph plus the global statistics cache and emits a signal
//! map: account id to a fixed-shape payload. Detectors never raise; they
//! either fire or stay silent, and resource caps truncate silently.
//!
//! ## Detectors
//!
//! ### Structural
//! - `CycleScan` - simple directed cycles of length 3-5
//! - `FanOutScan` / `FanInScan` - windowed counterparty bursts
//! - `ShellAccountScan` - near-dormant relay accounts
//! - `PassthroughScan` - funds forwarded within hours
//!
//! ### Amount-driven
//! - `StructuringScan`, `ThresholdAvoidanceScan`, `AmountAnomalyScan`,
//!   `AmountSplittingScan`, `AmountProgressionScan`, `SmurfingClusterScan`
//!
//! ### Temporal
//! - `VelocityScan`, `UnusualTimingScan`, `BurstScan`, `DormancyScan`,
//!   `FrequencyScan`, `TemporalClusteringScan`
//!
//! ### Network
//! - `NetworkInfluenceScan`, `RoundTripScan`, `LayeringScan`,
//!   `DiversityScan`, `LaunderingChainScan`, `WashTradingScan`
//!
//! ### Behavioral
//! - `CoordinatedBehaviorScan`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod amounts;
pub mod coordination;
pub mod cycles;
pub mod detector;
pub mod flow;
pub mod network;
pub mod timing;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::detector::{
        build_registry, DetectorMetadata, PatternDetector, ProgressionTrend, Signal, SignalMap,
        DETECTOR_COUNT,
    };
}

pub use detector::{
    build_registry, DetectorMetadata, PatternDetector, ProgressionTrend, Signal, SignalMap,
    DETECTOR_COUNT,
};
