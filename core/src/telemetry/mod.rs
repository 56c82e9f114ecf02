pub mod log;
pub mod metrics;

pub use log::{MessageLevel, MessageLog, UserMessage};
pub use metrics::{MetricsSnapshot, SolveMetrics};
