//! Unit test suite for the explorer engine
//!
//! Exercises the public library API against the sample fixture.
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! # Test Organization
//!
//! - **filter_tokens**: Filter token encoding, decoding and row matching
//! - **renderer_resolution**: Registry lookup, type defaults and fallback warnings
//! - **target_cache**: Single-flight fetches, replay, retirement and failures
//! - **renderer_hosts**: Mount/patch/teardown lifecycle and entity forms
//! - **views**: List and detail views over the sample fixture

mod filter_tokens;
mod renderer_hosts;
mod renderer_resolution;
mod target_cache;
mod views;
