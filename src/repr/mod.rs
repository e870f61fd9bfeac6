//! Canonical model representations.

pub mod pmml;
