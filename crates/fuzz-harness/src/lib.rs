//! Rendezvous Fuzz Harness
//!
//! Shared property-based testing strategies for the guidance crates:
//! separations, unit axes, orthonormal frames, orbit states and controller
//! gains.
//!
//! # Usage
//!
//! ```rust
//! use fuzz_harness::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_fuzz_test(axis in unit_vector()) {
//!         prop_assert!((axis.norm() - 1.0).abs() < 1e-12);
//!     }
//! }
//! ```

pub mod generators;

pub mod prelude {
    pub use crate::generators::*;
    pub use proptest::prelude::*;
}

// Re-export proptest for convenience
pub use proptest;
