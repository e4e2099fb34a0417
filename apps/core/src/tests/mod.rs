//! Test Module
//!
//! Cross-component test suite for the sentiment engine.
//!
//! ## Test Categories
//! - `engine_tests`: analysis pipeline, determinism, sarcasm, hybrid agreement
//! - `learning_tests`: feedback loop, incremental training, learning actor
//! - `evaluation_tests`: metrics, Kappa, erf, model comparison, dataset reports
//! - `integration_tests`: configuration, snapshots and batch workflows end to end
//! - `concurrency_test`: concurrent readers, writers and feedback producers

pub mod concurrency_test;
pub mod evaluation_tests;
