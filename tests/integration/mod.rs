//! Integration test suite for the `explorer` preview binary
//!
//! Every test runs the compiled binary against `tests/fixtures/explorer.json`
//! with an isolated config path.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **config**: `config init`, `config path` and `config show`
//! - **filter**: Token encoding and decoding
//! - **views**: `list`, `show` and `resolve` over the fixture

mod common;
mod config;
mod filter;
