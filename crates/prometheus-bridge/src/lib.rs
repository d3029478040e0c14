pub mod guards;
pub mod metrics;

pub use guards::{halt_guard, observe_record};
pub use metrics::EngineMetrics;
