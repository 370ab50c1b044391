//! Integration tests for Meeplemart.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p meeplemart-cli -- migrate
//! cargo run -p meeplemart-cli -- seed
//!
//! # Start the storefront
//! cargo run -p meeplemart-storefront
//!
//! # Run integration tests (ignored by default)
//! cargo test -p meeplemart-integration-tests -- --ignored
//! ```
//!
//! The tests drive the HTTP API end-to-end: guest add-to-cart, totals
//! invariants, and the merge-on-login flow. They require a running server
//! (`STOREFRONT_BASE_URL`, default `http://localhost:3000`) with a seeded
//! database, and are `#[ignore]`-gated so `cargo test` stays hermetic.
