//! Converters for models trained by external frameworks.

pub mod sklearn;
