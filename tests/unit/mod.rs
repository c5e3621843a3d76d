// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for the certificate admission hook
//!
//! This module contains tests for:
//! - The end-to-end decision pipeline
//! - ClusterIssuer authorization rules
//! - Response encoding for admission.k8s.io hosts

#[path = "../common/mod.rs"]
mod common;

mod review;
mod webhooks;
