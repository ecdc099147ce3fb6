//! Terminal front end: one-shot commands and the interactive converter

pub mod convert;
pub mod interactive;
pub mod rates;
pub mod setup;
pub mod ui;

pub use crate::core::rates::normalize_code;
