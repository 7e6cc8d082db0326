//! GES Harness: scores, configuration and artifact bundles around the engine.
//!
//! The harness turns a covariance matrix and a JSON run configuration into a
//! verified artifact bundle (`run_ges`). It supplies the Gaussian BIC score
//! the engine consumes through `LocalScore`, and a linear-SEM generator for
//! noise-free test data.
//!
//! The harness does NOT implement search logic; it delegates to
//! `ges_search`. It owns numeric inputs, configuration and persistence.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle;
pub mod bundle_dir;
pub mod config;
pub mod covariance;
mod linalg;
pub mod linear_sem;
pub mod runner;
pub mod sem_bic;
