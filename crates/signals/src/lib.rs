//! Signal runner: executes independent signal probes concurrently.
//!
//! This crate provides:
//! - The [`SignalProvider`] capability implemented by external probes
//! - An immutable per-run [`SignalContext`]
//! - [`SignalRunner`], which time-boxes every probe, converts failures into
//!   neutral-low results and folds scores into a weighted [`BundleResult`]
//! - [`ProviderSet`], a registration-time validated list of providers
//!
//! [`BundleResult`]: leadgate_core::BundleResult

pub mod context;
pub mod provider;
pub mod registry;
pub mod runner;

pub use context::SignalContext;
pub use provider::{SignalError, SignalProvider};
pub use registry::ProviderSet;
pub use runner::SignalRunner;
