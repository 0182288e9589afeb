//! # statecoll testkit
//!
//! Testing utilities for statecoll.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Layout vectors**: exact bytes that encoders and collections must write
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: a fee-share registry indexed by deployer and withdrawer
//!
//! ## Layout Vectors
//!
//! ```rust
//! use statecoll_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, actual) in verify_all_vectors() {
//!     assert!(ok, "{name}: {actual}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use statecoll_testkit::generators::fee_share_ops;
//!
//! proptest! {
//!     #[test]
//!     fn indexes_follow_records(ops in fee_share_ops(32)) {
//!         // replay ops against a fixture and a model
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use statecoll_testkit::fixtures::{FeeShare, TestFixture};
//!
//! let fixture = TestFixture::new().unwrap();
//! fixture.register(&FeeShare::new("ctr1", "dep1", "wd1")).unwrap();
//! assert_eq!(fixture.contracts_by_withdrawer("wd1").unwrap(), vec!["ctr1"]);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fee_shares, sample_fee_shares, FeeShare, FeeShares, TestFixture};
pub use generators::{fee_share, fee_share_ops, FeeShareOp};
pub use vectors::{all_vectors, verify_all_vectors, LayoutVector};
