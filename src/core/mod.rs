//! Core conversion logic and abstractions

pub mod config;
pub mod engine;
pub mod log;
pub mod rates;
pub mod refresh;
pub mod sanitize;

// Re-export main types for cleaner imports
pub use engine::{AmountState, Conversion, ConversionEngine, ConversionPair, RateStatus, Side};
pub use rates::{RateProvider, RateTable};
