//! # Agent Feed Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── feed_benchmarks.rs   # Normalizer and feed throughput
//! └── src/
//!     └── integration/         # LiveFeed + in-memory broker flows
//!         ├── feed_flows.rs
//!         └── telemetry_init.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p feed-tests
//!
//! # Only the feed flows
//! cargo test -p feed-tests integration::feed_flows
//!
//! # Benchmarks
//! cargo bench -p feed-tests
//! ```

pub mod integration;
