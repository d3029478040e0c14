pub mod evaluator;
pub mod state;
pub mod thresholds;
#[cfg(test)]
mod tests;

pub use evaluator::*;
pub use state::*;
pub use thresholds::*;
