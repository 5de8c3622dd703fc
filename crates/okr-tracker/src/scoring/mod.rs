pub mod classify;
pub mod evaluation;
pub mod levels;
pub mod metrics;
pub mod rollup;
pub mod store;
pub mod thresholds;

pub use classify::{classify, ScoreResult};
pub use levels::{ScoreLevel, ScoreLevelSet};
pub use metrics::MetricType;
pub use rollup::{roll_up, ScoreStatus};
pub use thresholds::Threshold;
