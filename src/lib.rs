//! Sensito - sensitometric gamma tracking
//!
//! Curve store, measurement files, history analysis and the catalog of
//! persisted measurements, built around the `sensito-gamma` analyzer.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod services;
