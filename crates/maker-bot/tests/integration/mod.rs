//! Integration tests for maker-bot.
//!
//! These tests drive the polling loop against in-memory collaborators:
//! - Scripted strategy batches
//! - Mock chain executors and query client sharing one call log
//! - Paused tokio time for delay accounting

pub mod common;
