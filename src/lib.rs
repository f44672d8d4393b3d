//! Symptom-driven mental health screening prototype
//!
//! A fixed symptom catalog, a tiny labeled training table and a random forest
//! classifier, exposed through an HTTP API and a terminal client.

pub mod api;
pub mod assessment;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod display;
pub mod error;
pub mod ml;
pub mod models;

pub use assessment::AssessmentEngine;
pub use catalog::FeatureCatalog;
pub use error::{AppError, Result};
